//! Billboard sprites: camera-space transform, depth sort and per-column
//! slices gated by the ground-level z-buffer.

use crate::{
    engine::{
        Convergence,
        types::{Column, ColumnFlags, Level},
        walls::converge_at,
    },
    world::{Camera, Rect, Sprite, TextureSource},
};

/// Sprites nearer than this (in view depth) are skipped; they would
/// cover the screen many times over.
const NEAR: f64 = 1e-4;

/// Screen placement of a sprite before occlusion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// View depth (distance along the view direction).
    pub depth: f64,
    /// Unclipped horizontal centre and size in pixels.
    pub screen_x: i64,
    pub width: i64,
    pub height: i64,
    /// Vertical shift of the sprite centre (anchor, Z, pitch, eye height).
    pub v_move: i64,
    /// Drawn area, clipped to the viewport: columns `x0..x1`, rows `y0..y1`.
    pub x0: i32,
    pub x1: i32,
    pub y0: i32,
    pub y1: i32,
}

/// Transform `sprite` with the inverse camera matrix
/// `[[plane.x, dir.x], [plane.y, dir.y]]` and size it on screen.
///
/// `None` when it is behind or on the camera, past the render distance,
/// or smaller than a pixel.
pub fn project<S: Sprite + ?Sized>(cam: &Camera, sprite: &S) -> Option<Projection> {
    let (w, h) = cam.view_size();
    let (w, h) = (w as i64, h as i64);
    if w == 0 || h == 0 {
        return None;
    }

    let frame = sprite.texture_rect();
    if frame.is_empty() {
        return None;
    }

    let rel = sprite.pos() - cam.position();
    let dir = cam.direction();
    let plane = cam.plane();

    let inv_det = 1.0 / (plane.x * dir.y - dir.x * plane.y);
    let transform_x = inv_det * (dir.y * rel.x - dir.x * rel.y);
    let transform_y = inv_det * (-plane.y * rel.x + plane.x * rel.y);

    if !(transform_y > NEAR && transform_x.is_finite()) || transform_y > cam.render_distance() {
        return None;
    }
    let depth = transform_y;

    let hf = h as f64;
    let screen_x = ((w / 2) as f64 * (1.0 + transform_x / depth)) as i64;

    let scale = sprite.scale();
    let offset = sprite.vertical_anchor().vertical_offset(scale, h as usize);
    let v_move = -sprite.pos_z() * hf + offset;
    let v_move = ((v_move / depth) as i64)
        .saturating_add(cam.pitch() as i64)
        .saturating_add((cam.cam_z() / depth) as i64);

    let size = (hf / depth).abs() * scale;
    let height = size as i64;
    let width = (size * frame.width() as f64 / frame.height() as f64) as i64;
    if width <= 0 || height <= 0 {
        return None;
    }

    let y0 = (h / 2).saturating_add(v_move).saturating_sub(height / 2).clamp(0, h - 1);
    let y1 = (h / 2).saturating_add(v_move).saturating_add(height / 2).clamp(0, h - 1);
    let x0 = screen_x.saturating_sub(width / 2).max(0);
    let x1 = screen_x.saturating_add(width / 2).min(w);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(Projection {
        depth,
        screen_x,
        width,
        height,
        v_move,
        x0: x0 as i32,
        x1: x1 as i32,
        y0: y0 as i32,
        y1: y1 as i32,
    })
}

impl Projection {
    /// Texture row (relative to the frame) drawn at screen row `y`.
    ///
    /// Fixed point, `256` = one pixel, as in the wall row mapping.
    #[inline]
    fn tex_row(&self, y: i32, view_h: i64, tex_h: i64) -> i32 {
        let d = (y as i128 - self.v_move as i128) * 256 - view_h as i128 * 128
            + self.height as i128 * 128;
        ((d * tex_h as i128 / self.height as i128) / 256).clamp(0, tex_h as i128) as i32
    }

    /// Texture column (relative to the frame) drawn at screen column `x`.
    #[inline]
    fn tex_col(&self, x: i32, tex_w: i64) -> i32 {
        let left = self.screen_x as i128 - (self.width / 2) as i128;
        let u = (256 * (x as i128 - left) * tex_w as i128 / self.width as i128) / 256;
        u.clamp(0, tex_w as i128 - 1) as i32
    }
}

/// Cast one sprite into `slot` and report its screen rectangle back.
///
/// `slot` is allocated the first time a column survives occlusion and set
/// to `None` when none does. Returns a convergence candidate when the
/// sprite is focusable and covers pixel `probe`.
pub fn cast_sprite<S: Sprite, T: TextureSource>(
    cam: &Camera,
    textures: &T,
    z_buffer: &[f64],
    sprite: &mut S,
    slot: &mut Option<Level>,
    probe: (i32, i32),
) -> Option<Convergence> {
    let visible = sprite
        .texture()
        .filter(|&id| textures.texture(id).is_some())
        .and_then(|tex| Some((tex, project(cam, &*sprite)?)));
    let Some((tex, p)) = visible else {
        *slot = None;
        sprite.set_screen_rect(None);
        return None;
    };

    let (w, h) = cam.view_size();
    let frame = sprite.texture_rect();
    let (tex_w, tex_h) = (frame.width(), frame.height());
    let src_y0 = frame.y0 + p.tex_row(p.y0, h as i64, tex_h);
    let src_y1 = frame.y0 + p.tex_row(p.y1, h as i64, tex_h);
    let tint = cam.lighting().tint_with(p.depth, sprite.illumination());

    let mut any = false;
    for x in p.x0..p.x1 {
        let occluded = z_buffer.get(x as usize).is_none_or(|&z| p.depth >= z);
        if occluded {
            continue;
        }
        if !any {
            any = true;
            match slot {
                Some(level) if level.width() == w => level.reset(),
                _ => *slot = Some(Level::new(w)),
            }
        }
        let Some(level) = slot.as_mut() else {
            continue;
        };
        let tx = frame.x0 + p.tex_col(x, tex_w);
        level.columns_mut()[x as usize] = Column {
            dst: Rect::column(x, p.y0, p.y1),
            src: Rect::new(tx, src_y0, tx + 1, src_y1),
            tint,
            tex,
            flags: ColumnFlags::VALID,
        };
    }

    if !any {
        *slot = None;
        sprite.set_screen_rect(None);
        return None;
    }
    sprite.set_screen_rect(Some(Rect::new(p.x0, p.y0, p.x1, p.y1)));

    let (px, py) = probe;
    let covers = slot
        .as_ref()
        .and_then(|l| l.columns().get(px as usize))
        .is_some_and(|c| px >= 0 && c.is_drawn() && (p.y0..p.y1).contains(&py));
    (sprite.is_focusable() && covers).then(|| converge_at(cam, p.depth))
}

/// Sort `order` and `dist` together so `dist` is non-increasing (far to
/// near).
///
/// Comb sort: shrink factor 1.3 and gaps 9 and 10 bumped to 11. Sprite
/// order barely changes between frames, which this handles in a pass or
/// two without allocating.
pub fn comb_sort(order: &mut [usize], dist: &mut [f64]) {
    let amount = order.len().min(dist.len());
    let mut gap = amount;
    let mut swapped = false;
    while gap > 1 || swapped {
        gap = (gap * 10) / 13;
        if gap == 9 || gap == 10 {
            gap = 11;
        }
        gap = gap.max(1);
        swapped = false;
        for i in 0..amount.saturating_sub(gap) {
            let j = i + gap;
            if dist[i] < dist[j] {
                dist.swap(i, j);
                order.swap(i, j);
                swapped = true;
            }
        }
    }
}
