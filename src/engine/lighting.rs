//! Distance lighting shared by the wall, floor and sprite casters.
//!
//! ```text
//! channel = clamp(255 + sqrt(distance) * falloff + illumination, min, max)
//! ```
//!
//! The square root gives the torch a soft tail; keep it.

use crate::renderer::Rgba;

/// Per-channel colour multiplier, 255 = unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Tint {
    pub const WHITE: Tint = Tint::new(255, 255, 255);
    pub const BLACK: Tint = Tint::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Every channel lowered by `amount`, stopping at zero.
    #[inline]
    pub const fn darken(self, amount: u8) -> Self {
        Self::new(
            self.r.saturating_sub(amount),
            self.g.saturating_sub(amount),
            self.b.saturating_sub(amount),
        )
    }

    /// Modulate an ARGB pixel; alpha passes through.
    #[inline]
    pub fn apply(self, px: Rgba) -> Rgba {
        let [a, r, g, b] = px.to_be_bytes();
        let scale = |c: u8, t: u8| ((c as u32 * t as u32) / 256) as u8;
        Rgba::from_be_bytes([a, scale(r, self.r), scale(g, self.g), scale(b, self.b)])
    }
}

/// Light parameters, owned by the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub falloff: f64,
    pub global_illumination: f64,
    pub min: Tint,
    pub max: Tint,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            falloff: -100.0,
            global_illumination: 300.0,
            min: Tint::BLACK,
            max: Tint::WHITE,
        }
    }
}

impl Lighting {
    /// Tint for a surface `distance` away (perpendicular wall distance,
    /// floor row distance or sprite depth).
    #[inline]
    pub fn tint(&self, distance: f64) -> Tint {
        self.tint_with(distance, 0.0)
    }

    /// As [`Lighting::tint`] with an extra flat illumination term.
    pub fn tint_with(&self, distance: f64, extra: f64) -> Tint {
        let shadow = distance.max(0.0).sqrt() * self.falloff;
        let level = 255.0 + shadow + self.global_illumination + extra;
        Tint::new(
            clamp_channel(level, self.min.r, self.max.r),
            clamp_channel(level, self.min.g, self.max.g),
            clamp_channel(level, self.min.b, self.max.b),
        )
    }
}

/// Truncate to an integer level, then clamp. With `lo > hi` the upper bound
/// wins rather than panicking.
#[inline]
fn clamp_channel(level: f64, lo: u8, hi: u8) -> u8 {
    (level as i32).max(lo as i32).min(hi as i32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn defaults_saturate_close_up() {
        let l = Lighting::default();
        // 255 - 100*sqrt(4) + 300 = 355 -> 255
        assert_eq!(l.tint(4.0), Tint::WHITE);
        // 255 - 100*sqrt(49) + 300 = -145 -> 0
        assert_eq!(l.tint(49.0), Tint::BLACK);
        // 255 - 100*sqrt(25) + 300 = 55
        assert_eq!(l.tint(25.0), Tint::new(55, 55, 55));
    }

    #[test]
    fn falloff_follows_square_root() {
        let l = Lighting {
            falloff: -10.0,
            global_illumination: 0.0,
            ..Lighting::default()
        };
        assert_eq!(l.tint(0.0).r, 255);
        assert_eq!(l.tint(1.0).r, 245);
        assert_eq!(l.tint(4.0).r, 235);
        assert_eq!(l.tint(16.0).r, 215);
    }

    #[test]
    fn extra_illumination_is_additive() {
        let l = Lighting {
            falloff: -10.0,
            global_illumination: -100.0,
            ..Lighting::default()
        };
        assert_eq!(l.tint_with(4.0, 30.0).r, l.tint(4.0).r + 30);
    }

    #[test]
    fn channels_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5_000 {
            let lo = Tint::new(rng.random(), rng.random(), rng.random());
            let hi = Tint::new(
                rng.random_range(lo.r..=255),
                rng.random_range(lo.g..=255),
                rng.random_range(lo.b..=255),
            );
            let l = Lighting {
                falloff: rng.random_range(-500.0..0.0),
                global_illumination: rng.random_range(-500.0..1000.0),
                min: lo,
                max: hi,
            };
            let t = l.tint(rng.random_range(0.0..1.0e4));
            assert!((lo.r..=hi.r).contains(&t.r));
            assert!((lo.g..=hi.g).contains(&t.g));
            assert!((lo.b..=hi.b).contains(&t.b));
        }
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let l = Lighting {
            min: Tint::new(200, 200, 200),
            max: Tint::new(100, 100, 100),
            ..Lighting::default()
        };
        assert_eq!(l.tint(1.0), Tint::new(100, 100, 100));
    }

    #[test]
    fn apply_modulates_rgb_only() {
        let px: Rgba = 0x80_FF8040;
        assert_eq!(Tint::WHITE.apply(px), 0x80_FE7F3F);
        assert_eq!(Tint::BLACK.apply(px), 0x80_000000);
        assert_eq!(Tint::new(12, 12, 12).darken(20), Tint::BLACK);
    }
}
