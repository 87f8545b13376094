/// Axis-aligned box in image pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(left, top, right - left, bottom - top)
    }
}

/// One unit of detected text.
///
/// Only `text` reaches the wire; geometry and confidence stay server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    pub text: String,
    pub bbox: BoundingBox,
    /// Engine confidence in `0.0..=1.0`.
    pub confidence: f32,
}

impl TextSegment {
    pub fn new(text: impl Into<String>, bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence,
        }
    }

    /// Segment with no geometry, for engines that only report text.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(text, BoundingBox::default(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_covers_both_boxes() {
        let a = BoundingBox::new(10, 10, 20, 5);
        let b = BoundingBox::new(5, 12, 10, 10);
        assert_eq!(a.union(&b), BoundingBox::new(5, 10, 25, 12));
    }

    #[test]
    fn test_text_only_segment() {
        let segment = TextSegment::text_only("hello");
        assert_eq!(segment.text, "hello");
        assert_eq!(segment.bbox, BoundingBox::default());
    }
}
