//! Integer rectangles and per-pixel opacity masks
//!
//! Masks are stored row-major and indexed `(row, col)`, matching screen
//! orientation (row grows with y, col grows with x).

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::HULL_SIZE;

/// Axis-aligned integer rectangle (`x`,`y` is the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of size `w`×`h` centred on `center`
    pub fn centered(center: IVec2, w: i32, h: i32) -> Self {
        Self::new(center.x - w / 2, center.y - h / 2, w, h)
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Overlapping region, `None` when the rectangles do not overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersect(other).is_some()
    }

    pub fn offset(&mut self, by: IVec2) {
        self.x += by.x;
        self.y += by.y;
    }
}

/// Fixed boolean occupancy grid derived from a sprite's alpha channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpacityMask {
    width: i32,
    height: i32,
    bits: Vec<bool>,
}

impl OpacityMask {
    /// Mask from row-major alpha values; any non-zero alpha is opaque
    pub fn from_alpha(width: i32, height: i32, alpha: &[u8]) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        let mut bits: Vec<bool> = alpha.iter().take(len).map(|&a| a != 0).collect();
        bits.resize(len, false);
        Self {
            width,
            height,
            bits,
        }
    }

    /// Hull template from a nose-up sprite, turned to face -x
    pub fn from_sprite(width: i32, height: i32, alpha: &[u8]) -> Self {
        Self::from_alpha(width, height, alpha).rotated()
    }

    /// Built-in hull used when no sprite catalog is supplied: a wedge
    /// pointing toward -x
    pub fn wedge(size: i32) -> Self {
        let mut mask = Self {
            width: size,
            height: size,
            bits: vec![false; (size.max(0) * size.max(0)) as usize],
        };
        let mid = size / 2;
        for row in 0..size {
            // Nose at col 0, widening toward the back
            for col in 0..size {
                if (row - mid).abs() * 2 <= col {
                    mask.bits[(row * size + col) as usize] = true;
                }
            }
        }
        mask
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Opacity at local coordinates; out-of-range is transparent
    #[inline]
    pub fn is_opaque(&self, row: i32, col: i32) -> bool {
        if row < 0 || col < 0 || row >= self.height || col >= self.width {
            return false;
        }
        self.bits[(row * self.width + col) as usize]
    }

    pub fn opaque_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Quarter turn counter-clockwise (sprites are authored nose-up and
    /// drawn rotated onto the horizontal axis)
    pub fn rotated(&self) -> Self {
        let (w, h) = (self.width, self.height);
        let mut bits = vec![false; self.bits.len()];
        for row in 0..h {
            for col in 0..w {
                // (row, col) -> (w - 1 - col, row) in a h-wide result
                let new_row = w - 1 - col;
                let new_col = row;
                bits[(new_row * h + new_col) as usize] = self.is_opaque(row, col);
            }
        }
        Self {
            width: h,
            height: w,
            bits,
        }
    }

    /// Horizontal mirror, used for ships that face +x
    pub fn mirrored(&self) -> Self {
        let mut bits = self.bits.clone();
        for row in 0..self.height {
            let start = (row * self.width) as usize;
            bits[start..start + self.width as usize].reverse();
        }
        Self {
            width: self.width,
            height: self.height,
            bits,
        }
    }
}

impl Default for OpacityMask {
    fn default() -> Self {
        Self::wedge(HULL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 5, 5, 5)));

        // Touching edges do not overlap
        let c = Rect::new(10, 0, 5, 5);
        assert_eq!(a.intersect(&c), None);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_rect_centered() {
        let r = Rect::centered(IVec2::new(100, 50), 96, 96);
        assert_eq!(r, Rect::new(52, 2, 96, 96));
        assert_eq!(r.center(), IVec2::new(100, 50));
    }

    #[test]
    fn test_from_alpha() {
        let mask = OpacityMask::from_alpha(2, 2, &[0, 255, 1, 0]);
        assert!(!mask.is_opaque(0, 0));
        assert!(mask.is_opaque(0, 1));
        assert!(mask.is_opaque(1, 0));
        assert!(!mask.is_opaque(1, 1));
        assert!(!mask.is_opaque(2, 0));
    }

    #[test]
    fn test_mirrored() {
        // Single opaque pixel in the left column
        let mask = OpacityMask::from_alpha(3, 1, &[255, 0, 0]);
        let mirrored = mask.mirrored();
        assert!(!mirrored.is_opaque(0, 0));
        assert!(mirrored.is_opaque(0, 2));
        assert_eq!(mirrored.mirrored(), mask);
    }

    #[test]
    fn test_rotated() {
        // 3 wide, 2 tall; opaque at top-right
        let mask = OpacityMask::from_alpha(3, 2, &[0, 0, 255, 0, 0, 0]);
        let rot = mask.rotated();
        assert_eq!(rot.width(), 2);
        assert_eq!(rot.height(), 3);
        // Top-right corner rotates to top-left
        assert!(rot.is_opaque(0, 0));
        assert_eq!(rot.opaque_count(), 1);
    }

    #[test]
    fn test_from_sprite_faces_left() {
        #[rustfmt::skip]
        let alpha = [
            0, 255, 0,
            255, 255, 255,
            255, 0, 255,
        ];
        let hull = OpacityMask::from_sprite(3, 3, &alpha);
        // Nose ends up in the middle of the left column
        assert!(hull.is_opaque(1, 0));
        assert!(!hull.is_opaque(0, 0));
        assert!(!hull.is_opaque(2, 0));
        assert!(!hull.is_opaque(1, 2));
        assert_eq!(hull.opaque_count(), 6);
    }

    #[test]
    fn test_wedge_has_nose_and_body() {
        let mask = OpacityMask::wedge(96);
        assert!(mask.is_opaque(48, 0));
        assert!(!mask.is_opaque(0, 0));
        assert!(mask.is_opaque(48, 95));
        assert!(mask.opaque_count() > 96 * 96 / 4);
    }
}
