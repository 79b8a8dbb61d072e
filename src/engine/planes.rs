//! Perspective floor caster.
//!
//! Works per screen column, below the ground-level wall slice. Each row maps
//! to one distance from the eye, and the world point for that row lies on
//! the line from the camera to the wall hit:
//!
//! ```text
//! row_dist = (h + 2 * cam_z) / (2 * (y - pitch) - h)
//! point    = pos + (wall_hit - pos) * row_dist / perp_wall_dist
//! ```

use crate::{
    engine::{types::FloorColumn, walls::WallSlice},
    world::{Camera, Grid, TextureSource},
};

/// Distance from the eye to the floor seen at screen row `y`.
///
/// `None` at or above the horizon, and past the render distance.
#[inline]
pub fn row_distance(cam: &Camera, y: i32) -> Option<f64> {
    let h = cam.view_size().1 as f64;
    let denom = 2.0 * (y as f64 - cam.pitch() as f64) - h;
    if denom <= 0.0 {
        return None;
    }
    let dist = (h + 2.0 * cam.cam_z()) / denom;
    (dist.is_finite() && dist > 0.0 && dist <= cam.render_distance()).then_some(dist)
}

/// Fill the floor rows of one column, from the wall's `draw_end` down to
/// the bottom of the screen.
///
/// Returns the floor distance at `probe_row` if that pixel was written.
pub fn cast_column<T: TextureSource>(
    cam: &Camera,
    slice: &WallSlice,
    grid: &Grid,
    textures: &T,
    out: &mut FloorColumn<'_>,
    probe_row: Option<i32>,
) -> Option<f64> {
    let perp = slice.depth?;
    let h = cam.view_size().1 as i32;
    let size = cam.texture_size() as i64;
    let lighting = cam.lighting();

    let pos = slice.ray.origin;
    let wall = slice.hit_point();

    let mut probed = None;
    for y in slice.draw_end.clamp(0, h)..h {
        let Some(dist) = row_distance(cam, y) else {
            continue;
        };

        let weight = dist / perp;
        let p = wall * weight + pos * (1.0 - weight);
        let (cx, cy) = (p.x.floor() as i32, p.y.floor() as i32);
        if !grid.contains(cx, cy) {
            continue;
        }

        let Some(tex) = textures
            .floor_texture(cx, cy)
            .and_then(|id| textures.texture(id))
        else {
            continue;
        };
        let tx = ((p.x * size as f64) as i64).rem_euclid(size) as i32;
        let ty = ((p.y * size as f64) as i64).rem_euclid(size) as i32;
        let Some(texel) = tex.texel(tx, ty) else {
            continue;
        };

        out.set(y as usize, lighting.tint(dist).apply(texel));
        if probe_row == Some(y) {
            probed = Some(dist);
        }
    }
    probed
}
