//! Compositing layer.
//!
//! *The casters never touch a frame-buffer.* They leave per-column slices
//! and a floor pixel buffer in the [`Engine`]; a type implementing
//! [`Renderer`] turns those into pixels.
//!
//! * Back-ends (`renderer::software`, a GPU one, …) plug in without
//!   touching the engine.
//! * The blanket [`RendererExt`] adds `draw_frame`, which walks the engine
//!   output back-to-front so call-sites stay short.

use crate::{
    engine::{Column, Engine, FloorBuffer, Level},
    world::{Texture, TextureSource, WorldMap},
};

/// Pixel format of the software frame-buffer and of every texture
/// (0xAARRGGBB).
pub type Rgba = u32;

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager;
/// GPU back-ends can ignore the slice because they never allocate it.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Sky above row `horizon`, ground from it downward.
    fn draw_backdrop(&mut self, horizon: i32);

    /// Stretch `col.src` of `tex` over `col.dst`, clipped to the screen.
    fn draw_column(&mut self, col: &Column, tex: &Texture);

    /// Overlay the non-zero pixels of the floor buffer.
    fn draw_floor(&mut self, floor: &FloorBuffer);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    /// Composite the last [`Engine::update`]: backdrop, levels from the
    /// top one down, floor, then sprites far to near.
    fn draw_frame<M, T, F>(&mut self, engine: &Engine<M, T>, submit: F)
    where
        M: WorldMap,
        T: TextureSource,
        F: FnOnce(&[Rgba], usize, usize),
    {
        let cam = engine.camera();
        let (w, h) = cam.view_size();
        let textures = engine.textures();

        self.begin_frame(w, h);
        self.draw_backdrop(h as i32 / 2 + cam.pitch());

        for level in engine.levels().iter().rev() {
            draw_level(self, level, textures);
        }
        self.draw_floor(engine.floor());
        for &i in engine.sprite_order() {
            if let Some(Some(level)) = engine.sprite_levels().get(i) {
                draw_level(self, level, textures);
            }
        }

        self.end_frame(submit);
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

fn draw_level<R, T>(renderer: &mut R, level: &Level, textures: &T)
where
    R: Renderer + ?Sized,
    T: TextureSource,
{
    for col in level.columns().iter().filter(|c| c.is_drawn()) {
        if let Some(tex) = textures.texture(col.tex) {
            renderer.draw_column(col, tex);
        }
    }
}

pub mod software;
