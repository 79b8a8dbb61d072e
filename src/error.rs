use crate::world::TextureError;

/// Everything that can go wrong while *building* an engine.
///
/// Casting a frame never fails; degenerate geometry just produces
/// columns that are not drawn.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("map has no levels")]
    EmptyMap,

    #[error("level {0} has a zero-sized grid")]
    EmptyLevel(usize),

    #[error("level {level} is {found_w}x{found_h}, expected {expected_w}x{expected_h}")]
    LevelSizeMismatch {
        level: usize,
        expected_w: usize,
        expected_h: usize,
        found_w: usize,
        found_h: usize,
    },

    #[error("grid of {width}x{height} needs {expected} tiles, got {found}")]
    TileCount {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },

    #[error("viewport {0}x{1} has no pixels")]
    ZeroViewport(usize, usize),

    #[error("texture size must be positive")]
    ZeroTextureSize,

    #[error("field of view {0}° outside (0, 180)")]
    BadFov(f64),

    #[error("field of view depth {0} must be positive")]
    BadFovDepth(f64),

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}
