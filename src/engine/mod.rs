pub mod dda;
mod engine;
pub mod lighting;
pub mod planes;
pub mod scheduler;
pub mod sprites;
pub mod types;
pub mod walls;

pub use dda::{HitKind, Ray, RayHit, Side};
pub use engine::Engine;
pub use lighting::{Lighting, Tint};
pub use scheduler::{MAX_CONCURRENT, Scheduler};
pub use types::{Column, ColumnFlags, Convergence, FloorBuffer, FloorColumn, Level};
