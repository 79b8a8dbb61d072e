use glam::DVec2;

use crate::{
    engine::{
        Convergence,
        dda::{self, HitKind, Ray, RayHit, Side},
        types::{Column, ColumnFlags},
    },
    world::{Camera, Grid, Rect, TextureSource, line_from_base_angle},
};

/// Channel offset subtracted from Y-side faces so corners read clearly.
pub const SIDE_SHADE: u8 = 12;

/// Geometry of one cast column on one level, shared with the floor caster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSlice {
    pub ray: Ray,
    pub hit: RayHit,
    /// `None` when the perpendicular distance is zero or not finite.
    pub depth: Option<f64>,
    pub draw_start: i32,
    pub draw_end: i32,
}

impl WallSlice {
    /// World point where the ray met the wall (or the cutoff).
    #[inline]
    pub fn hit_point(&self) -> DVec2 {
        self.ray.origin + self.ray.dir * self.hit.perp_dist
    }
}

/// Cast column `x` of grid `level` and overwrite `out` with its slice.
pub fn cast_column<T: TextureSource>(
    cam: &Camera,
    grid: &Grid,
    level: usize,
    x: usize,
    textures: &T,
    out: &mut Column,
) -> WallSlice {
    let ray = Ray::for_column(cam, x);
    let hit = dda::cast(&ray, grid, cam.render_distance());
    let perp = hit.perp_dist;

    *out = Column::EMPTY;

    if !(perp.is_finite() && perp > 0.0) {
        return WallSlice {
            ray,
            hit,
            depth: None,
            draw_start: 0,
            draw_end: 0,
        };
    }

    let (_, h) = cam.view_size();
    let (draw_start, draw_end) = slice_bounds(h, perp, cam.pitch(), cam.cam_z(), level);
    out.dst = Rect::column(x as i32, draw_start, draw_end);

    match hit.kind {
        HitKind::Wall => {
            let tex = textures
                .wall_texture(hit.map_x, hit.map_y, level, hit.side)
                .filter(|&id| textures.texture(id).is_some());
            if let Some(tex) = tex {
                let size = cam.texture_size() as i32;
                let mut tex_x = ((hit.wall_x * size as f64) as i32).clamp(0, size - 1);
                let mirrored = match hit.side {
                    Side::X => ray.dir.x > 0.0,
                    Side::Y => ray.dir.y < 0.0,
                };
                if mirrored {
                    tex_x = size - tex_x - 1;
                }

                let mut tint = cam.lighting().tint(perp);
                if hit.side == Side::Y {
                    tint = tint.darken(SIDE_SHADE);
                }

                out.src = Rect::column(tex_x, 0, size);
                out.tint = tint;
                out.tex = tex;
                out.flags = ColumnFlags::VALID;
            }
        }
        HitKind::Cutoff => out.flags = ColumnFlags::CUTOFF,
        HitKind::Edge => {}
    }

    WallSlice {
        ray,
        hit,
        depth: Some(perp),
        draw_start,
        draw_end,
    }
}

/// Screen rows `[start, end)` of a wall `perp` away on `level`.
///
/// Not clipped to the viewport; very close walls saturate at the `i32`
/// range instead of overflowing.
pub fn slice_bounds(h: usize, perp: f64, pitch: i32, cam_z: f64, level: usize) -> (i32, i32) {
    let h = h as i64;
    let line = (h as f64 / perp) as i64;
    let start = (-line / 2)
        .saturating_add(h / 2)
        .saturating_add(pitch as i64)
        .saturating_add((cam_z / perp) as i64)
        .saturating_sub(line.saturating_mul(level as i64));
    let end = start.saturating_add(line);
    (saturate(start), saturate(end))
}

#[inline]
fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Convergence candidate if this slice covers screen row `row`.
pub fn convergence(cam: &Camera, slice: &WallSlice, out: &Column, row: i32) -> Option<Convergence> {
    if !out.is_drawn() || row < slice.draw_start || row >= slice.draw_end {
        return None;
    }
    slice.depth.map(|d| converge_at(cam, d))
}

/// 3-D point straight ahead at view depth `depth`, following the pitch.
pub(crate) fn converge_at(cam: &Camera, depth: f64) -> Convergence {
    let (point, distance) = line_from_base_angle(
        cam.eye(),
        cam.heading_angle(),
        cam.pitch_angle(),
        depth * cam.fov_depth(),
    );
    Convergence { distance, point }
}
