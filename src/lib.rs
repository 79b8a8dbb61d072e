//! Tile-grid raycasting renderer.
//!
//! A [`engine::Engine`] owns the camera and the per-frame render targets,
//! casts one ray per screen column through every level of a
//! [`world::TileMap`], projects floors and billboard sprites against the
//! shared z-buffer, and leaves the results for a [`renderer::Renderer`] to
//! composite.

pub mod config;
pub mod engine;
pub mod error;
pub mod renderer;
pub mod world;

pub use config::RenderConfig;
pub use engine::Engine;
pub use error::EngineError;
