//! Tesseract TSV output → [`TextSegment`]s.
//!
//! Each TSV row is one layout element: `level page block par line word left
//! top width height conf text`. Only word rows (level 5) carry text; words
//! are grouped by paragraph or by line depending on [`Grouping`].

use super::segment::{BoundingBox, TextSegment};

const WORD_LEVEL: u32 = 5;
const COLUMNS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Paragraph,
    Line,
}

impl Grouping {
    pub fn from_paragraph_flag(paragraph: bool) -> Self {
        if paragraph {
            Grouping::Paragraph
        } else {
            Grouping::Line
        }
    }
}

#[derive(Debug)]
struct Word<'a> {
    key: (u32, u32, u32, u32),
    bbox: BoundingBox,
    conf: f32,
    text: &'a str,
}

fn parse_word(row: &str) -> Option<Word<'_>> {
    let fields: Vec<&str> = row.splitn(COLUMNS, '\t').collect();
    if fields.len() < COLUMNS {
        return None;
    }

    // Header rows and malformed rows fail here.
    let level: u32 = fields[0].parse().ok()?;
    if level != WORD_LEVEL {
        return None;
    }

    let text = fields[11].trim_end_matches(['\r', '\n']);
    if text.trim().is_empty() {
        return None;
    }

    let conf: f32 = fields[10].parse().ok()?;
    if conf < 0.0 {
        return None;
    }

    Some(Word {
        key: (
            fields[1].parse().ok()?,
            fields[2].parse().ok()?,
            fields[3].parse().ok()?,
            fields[4].parse().ok()?,
        ),
        bbox: BoundingBox::new(
            fields[6].parse().ok()?,
            fields[7].parse().ok()?,
            fields[8].parse().ok()?,
            fields[9].parse().ok()?,
        ),
        conf,
        text,
    })
}

struct Builder {
    key: (u32, u32, u32, u32),
    words: Vec<String>,
    bbox: BoundingBox,
    conf_sum: f32,
}

impl Builder {
    fn start(key: (u32, u32, u32, u32), word: &Word<'_>) -> Self {
        Self {
            key,
            words: vec![word.text.to_string()],
            bbox: word.bbox,
            conf_sum: word.conf,
        }
    }

    fn push(&mut self, word: &Word<'_>) {
        self.words.push(word.text.to_string());
        self.bbox = self.bbox.union(&word.bbox);
        self.conf_sum += word.conf;
    }

    fn finish(self) -> TextSegment {
        let confidence = self.conf_sum / self.words.len() as f32 / 100.0;
        TextSegment::new(self.words.join(" "), self.bbox, confidence)
    }
}

/// Group the word rows of a TSV dump into segments, preserving reading order.
pub fn parse_tsv(tsv: &str, grouping: Grouping) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut current: Option<Builder> = None;

    for word in tsv.lines().filter_map(parse_word) {
        let (page, block, par, line) = word.key;
        let key = match grouping {
            Grouping::Paragraph => (page, block, par, 0),
            Grouping::Line => (page, block, par, line),
        };

        match current.as_mut() {
            Some(builder) if builder.key == key => builder.push(&word),
            _ => {
                if let Some(done) = current.take() {
                    segments.push(done.finish());
                }
                current = Some(Builder::start(key, &word));
            }
        }
    }

    if let Some(done) = current {
        segments.push(done.finish());
    }

    segments
}
