mod camera;
mod geometry;
mod map;
mod sprite;
mod texture;

pub use camera::Camera;

pub use geometry::{Rect, line_from_base_angle};

pub use map::{EMPTY, Grid, TileId, TileMap, WorldMap};

pub use sprite::{BasicSprite, Sprite, SpriteAnchor};

pub use texture::{NO_TEXTURE, Texture, TextureBank, TextureError, TextureId, TextureSource, TileTextures};

pub(crate) use map::validate_levels;
