//! Minimal integer geometry for gesture hit-testing in terminal cells.

/// A point in global terminal coordinates (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// An axis-aligned cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect { x: 2, y: 3, w: 4, h: 2 };
        assert!(r.contains(Point { x: 2, y: 3 }));
        assert!(r.contains(Point { x: 5, y: 4 }));
        assert!(!r.contains(Point { x: 6, y: 4 }));
        assert!(!r.contains(Point { x: 5, y: 5 }));
        assert!(!r.contains(Point { x: 1, y: 3 }));
    }
}
