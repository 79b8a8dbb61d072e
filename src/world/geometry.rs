use glam::{DVec2, DVec3};

/// Axis-aligned integer rectangle, `min` inclusive, `max` exclusive.
///
/// Coordinates are signed: projected wall slices routinely start above
/// the top of the viewport or end below its bottom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// One pixel wide vertical strip at column `x`.
    #[inline]
    pub const fn column(x: i32, y0: i32, y1: i32) -> Self {
        Self::new(x, y0, x + 1, y1)
    }

    /// Widened to `i64`: saturated wall slices span the whole `i32` range.
    #[inline]
    pub const fn width(&self) -> i64 {
        self.x1 as i64 - self.x0 as i64
    }

    #[inline]
    pub const fn height(&self) -> i64 {
        self.y1 as i64 - self.y0 as i64
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }
}

/// End point of a 3-D line that starts at `base`, runs `xy_len` along
/// `heading` on the ground plane and climbs at `pitch`.
///
/// Returns the end point and the full 3-D length of the line.
pub fn line_from_base_angle(base: DVec3, heading: f64, pitch: f64, xy_len: f64) -> (DVec3, f64) {
    let ground = DVec2::from_angle(heading) * xy_len;
    let end = base + DVec3::new(ground.x, ground.y, xy_len * pitch.tan());
    (end, base.distance(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn rect_extents() {
        let r = Rect::column(3, -10, 40);
        assert_eq!(r.width(), 1);
        assert_eq!(r.height(), 50);
        assert!(!r.is_empty());
        assert!(Rect::new(0, 5, 4, 5).is_empty());
    }

    #[test]
    fn full_range_extents_do_not_overflow() {
        let r = Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(r.width(), u32::MAX as i64);
        assert_eq!(r.height(), u32::MAX as i64);
    }

    #[test]
    fn level_line_keeps_height() {
        let (end, len) = line_from_base_angle(DVec3::new(1.0, 1.0, 0.5), 0.0, 0.0, 3.0);
        assert!((end - DVec3::new(4.0, 1.0, 0.5)).length() < 1e-12);
        assert!((len - 3.0).abs() < 1e-12);
    }

    #[test]
    fn pitched_line_climbs() {
        let (end, len) = line_from_base_angle(DVec3::ZERO, 0.0, FRAC_PI_4, 2.0);
        assert!((end.z - 2.0).abs() < 1e-12);
        assert!((len - 8.0_f64.sqrt()).abs() < 1e-12);
    }
}
