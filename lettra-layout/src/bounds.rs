//! Axis-aligned content box accumulated over positioned glyphs.
//!
//! The two axes grow independently: blank glyphs (whitespace) extend the
//! box horizontally but carry no vertical extent of their own.

/// Compact AABB stored as min/max corners (16 bytes total).
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Inverted box that any extent will replace.
    pub const fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    #[inline]
    pub fn include_x(&mut self, min: f32, max: f32) {
        self.min_x = self.min_x.min(min);
        self.max_x = self.max_x.max(max);
    }

    #[inline]
    pub fn include_y(&mut self, min: f32, max: f32) {
        self.min_y = self.min_y.min(min);
        self.max_y = self.max_y.max(max);
    }

    /// Whether nothing was included along x.
    #[inline(always)]
    pub fn is_empty_x(&self) -> bool {
        self.min_x > self.max_x
    }

    /// Whether nothing was included along y.
    #[inline(always)]
    pub fn is_empty_y(&self) -> bool {
        self.min_y > self.max_y
    }

    /// Width, or 0 for an empty axis.
    #[inline(always)]
    pub fn width(&self) -> f32 {
        if self.is_empty_x() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    /// Height, or 0 for an empty axis.
    #[inline(always)]
    pub fn height(&self) -> f32 {
        if self.is_empty_y() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// Left edge, or 0 for an empty axis.
    #[inline]
    pub fn left(&self) -> f32 {
        if self.is_empty_x() {
            0.0
        } else {
            self.min_x
        }
    }

    /// Top edge, or 0 for an empty axis.
    #[inline]
    pub fn top(&self) -> f32 {
        if self.is_empty_y() {
            0.0
        } else {
            self.min_y
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_box_has_zero_extent() {
        let b = Aabb::empty();
        assert!(b.is_empty_x() && b.is_empty_y());
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
        assert_eq!(b.left(), 0.0);
        assert_eq!(b.top(), 0.0);
    }

    #[test]
    fn test_axes_grow_independently() {
        let mut b = Aabb::empty();
        b.include_x(-10.0, 70.0);
        assert_eq!(b.width(), 80.0);
        assert!(b.is_empty_y());

        b.include_y(5.0, 195.0);
        b.include_x(40.0, 120.0);
        assert_eq!(b.left(), -10.0);
        assert_eq!(b.width(), 130.0);
        assert_eq!(b.height(), 190.0);
    }
}
