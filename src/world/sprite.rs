use glam::{DVec2, DVec3};

use crate::world::{
    geometry::{Rect, line_from_base_angle},
    texture::TextureId,
};

/// Which part of a scaled sprite sits at its Z position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpriteAnchor {
    #[default]
    Bottom,
    Center,
    Top,
}

impl SpriteAnchor {
    /// Screen-space shift (before the perspective divide) that keeps the
    /// anchored edge in place when the sprite is scaled.
    pub fn vertical_offset(self, scale: f64, view_height: usize) -> f64 {
        let half = view_height as f64 / 2.0;
        match self {
            SpriteAnchor::Bottom => half - scale * half,
            SpriteAnchor::Center => half,
            SpriteAnchor::Top => half + scale * half,
        }
    }
}

/// A billboard the game layer wants drawn.
///
/// The engine only reads from a sprite, except for handing back the
/// screen rectangle it covered this frame.
pub trait Sprite: Send {
    /// X,Y map position.
    fn pos(&self) -> DVec2;

    /// Height above the floor in grid units.
    fn pos_z(&self) -> f64 {
        0.0
    }

    fn scale(&self) -> f64 {
        1.0
    }

    fn vertical_anchor(&self) -> SpriteAnchor {
        SpriteAnchor::Bottom
    }

    /// Facing angle on the ground plane, radians.
    fn angle(&self) -> f64 {
        0.0
    }

    /// Climb angle, radians.
    fn pitch(&self) -> f64 {
        0.0
    }

    /// `0` (or less) disables collision with this sprite.
    fn collision_radius(&self) -> f64 {
        0.0
    }

    /// Current animation frame; `None` hides the sprite.
    fn texture(&self) -> Option<TextureId>;

    /// Texel rectangle of the current frame inside the texture.
    fn texture_rect(&self) -> Rect;

    /// Added to the global illumination for this sprite only.
    fn illumination(&self) -> f64 {
        0.0
    }

    /// Receives the screen area covered this frame (`None` if not visible).
    fn set_screen_rect(&mut self, rect: Option<Rect>);

    /// Whether the centre-of-view convergence point may land on this sprite.
    fn is_focusable(&self) -> bool {
        false
    }

    fn set_focusable(&mut self, focusable: bool);

    /// Point `distance` ahead along [`Sprite::angle`] and [`Sprite::pitch`],
    /// as X, Y and grid Z.
    fn ahead(&self, distance: f64) -> DVec3 {
        let pos = self.pos();
        let base = DVec3::new(pos.x, pos.y, self.pos_z());
        line_from_base_angle(base, self.angle(), self.pitch(), distance).0
    }

    /// True if a circle of `radius` at `point` touches this sprite's
    /// collision circle.
    fn collides_with(&self, point: DVec2, radius: f64) -> bool {
        let r = self.collision_radius();
        r > 0.0 && self.pos().distance(point) < r + radius
    }
}

/// Plain-data [`Sprite`] for callers without their own entity type.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicSprite {
    pub pos: DVec2,
    pub pos_z: f64,
    pub angle: f64,
    pub pitch: f64,
    pub scale: f64,
    pub anchor: SpriteAnchor,
    pub texture: Option<TextureId>,
    pub texture_rect: Rect,
    pub collision_radius: f64,
    pub illumination: f64,
    pub focusable: bool,
    pub screen_rect: Option<Rect>,
}

impl BasicSprite {
    /// Unscaled, bottom-anchored sprite showing all of a `w`×`h` texture.
    pub fn new(pos: DVec2, texture: TextureId, w: usize, h: usize) -> Self {
        Self {
            pos,
            pos_z: 0.0,
            angle: 0.0,
            pitch: 0.0,
            scale: 1.0,
            anchor: SpriteAnchor::Bottom,
            texture: Some(texture),
            texture_rect: Rect::new(0, 0, w as i32, h as i32),
            collision_radius: 0.0,
            illumination: 0.0,
            focusable: false,
            screen_rect: None,
        }
    }
}

impl Sprite for BasicSprite {
    fn pos(&self) -> DVec2 {
        self.pos
    }
    fn pos_z(&self) -> f64 {
        self.pos_z
    }
    fn scale(&self) -> f64 {
        self.scale
    }
    fn vertical_anchor(&self) -> SpriteAnchor {
        self.anchor
    }
    fn angle(&self) -> f64 {
        self.angle
    }
    fn pitch(&self) -> f64 {
        self.pitch
    }
    fn collision_radius(&self) -> f64 {
        self.collision_radius
    }
    fn texture(&self) -> Option<TextureId> {
        self.texture
    }
    fn texture_rect(&self) -> Rect {
        self.texture_rect
    }
    fn illumination(&self) -> f64 {
        self.illumination
    }
    fn set_screen_rect(&mut self, rect: Option<Rect>) {
        self.screen_rect = rect;
    }
    fn is_focusable(&self) -> bool {
        self.focusable
    }
    fn set_focusable(&mut self, focusable: bool) {
        self.focusable = focusable;
    }
}
