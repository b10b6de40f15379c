use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in integer pixel coordinates, stored as edges.
///
/// A rect is empty when either span is zero or negative; empty rects never
/// appear in rendered layout output.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub const fn width(&self) -> i32 { self.right - self.left }

    pub const fn height(&self) -> i32 { self.bottom - self.top }

    pub const fn is_empty(&self) -> bool { self.width() <= 0 || self.height() <= 0 }

    pub const fn center_x(&self) -> i32 { self.left + self.width() / 2 }

    pub const fn center_y(&self) -> i32 { self.top + self.height() / 2 }

    pub const fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    pub const fn inset(&self, left: i32, top: i32, right: i32, bottom: i32) -> Rect {
        Rect::new(self.left + left, self.top + top, self.right - right, self.bottom - bottom)
    }

    /// Smallest rect covering both operands. Empty operands contribute
    /// nothing, so the union of an empty rect with `r` is `r`.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// True when the interiors overlap. Rects that merely share an edge do
    /// not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn contains(&self, other: &Rect) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_and_emptiness() {
        let r = Rect::new(10, 20, 110, 70);
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 50);
        assert!(!r.is_empty());
        assert!(Rect::new(5, 5, 5, 50).is_empty());
        assert!(Rect::new(5, 5, 50, 0).is_empty());
    }

    #[test]
    fn centers_round_toward_left_and_top() {
        let r = Rect::new(0, 0, 5, 5);
        assert_eq!(r.center_x(), 2);
        assert_eq!(r.center_y(), 2);
    }

    #[test]
    fn union_ignores_empty_operands() {
        let a = Rect::new(0, 0, 10, 10);
        let empty = Rect::new(50, 50, 50, 50);
        assert_eq!(a.union(&empty), a);
        assert_eq!(empty.union(&a), a);
        assert_eq!(
            a.union(&Rect::new(-5, 2, 3, 20)),
            Rect::new(-5, 0, 10, 20)
        );
    }

    #[test]
    fn shared_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.intersects(&Rect::new(10, 0, 20, 10)));
        assert!(!a.intersects(&Rect::new(0, 10, 10, 20)));
        assert!(a.intersects(&Rect::new(9, 9, 20, 20)));
    }

    #[test]
    fn offset_and_inset() {
        let r = Rect::new(0, 0, 10, 10);
        assert_eq!(r.offset(3, -2), Rect::new(3, -2, 13, 8));
        assert_eq!(r.inset(1, 2, 3, 4), Rect::new(1, 2, 7, 6));
    }
}
