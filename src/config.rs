use crate::{EngineError, engine::Tint, engine::scheduler::MAX_CONCURRENT};

/// Start-up parameters for an [`crate::Engine`].
///
/// Everything here can also be changed later through the camera setters;
/// the struct only fixes the initial state.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Edge length of the square wall/floor textures in texels.
    pub texture_size: usize,
    pub fov_degrees: f64,
    pub fov_depth: f64,
    /// `None` renders as far as the grid reaches.
    pub render_distance: Option<f64>,
    /// Negative: torch light dims with distance.
    pub light_falloff: f64,
    pub global_illumination: f64,
    pub min_light: Tint,
    pub max_light: Tint,
    /// Size of the worker pool casting columns and sprites.
    pub workers: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(MAX_CONCURRENT);

        Self {
            width: 640,
            height: 400,
            texture_size: 64,
            fov_degrees: 70.0,
            fov_depth: 1.0,
            render_distance: None,
            light_falloff: -100.0,
            global_illumination: 300.0,
            min_light: Tint::BLACK,
            max_light: Tint::WHITE,
            workers,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::ZeroViewport(self.width, self.height));
        }
        if self.texture_size == 0 {
            return Err(EngineError::ZeroTextureSize);
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(EngineError::BadFov(self.fov_degrees));
        }
        if !(self.fov_depth > 0.0) {
            return Err(EngineError::BadFovDepth(self.fov_depth));
        }
        if self.workers == 0 {
            return Err(EngineError::NoWorkers);
        }
        Ok(())
    }
}
