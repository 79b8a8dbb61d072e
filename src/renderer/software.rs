//! ---------------------------------------------------------------------------
//! Software (CPU) column compositor
//!
//! * Fills an internal `Vec<u32>` frame-buffer in **0xAARRGGBB** format.
//! * Relies on [`RendererExt::draw_frame`](crate::renderer::RendererExt) to
//!   feed slices back-to-front; later slices simply overwrite earlier ones.
//! * Slices may extend past the screen edges; they are clipped here.
//! ---------------------------------------------------------------------------

use crate::{
    engine::{Column, FloorBuffer},
    renderer::{Renderer, Rgba},
    world::Texture,
};

/// Nearest-neighbour column renderer.
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
    sky: Rgba,
    ground: Rgba,
}

impl Default for Software {
    fn default() -> Self {
        Self::new(0xFF_404858, 0xFF_202020)
    }
}

impl Software {
    pub fn new(sky: Rgba, ground: Rgba) -> Self {
        Self {
            scratch: Vec::new(),
            width: 0,
            height: 0,
            sky,
            ground,
        }
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, px: Rgba) {
        self.scratch[y * self.width + x] = px;
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }
    }

    fn draw_backdrop(&mut self, horizon: i32) {
        let split = horizon.clamp(0, self.height as i32) as usize * self.width;
        let (sky, ground) = self.scratch.split_at_mut(split);
        sky.fill(self.sky);
        ground.fill(self.ground);
    }

    fn draw_column(&mut self, col: &Column, tex: &Texture) {
        let dst = col.dst;
        let src = col.src;
        if dst.x0 < 0 || dst.x0 as usize >= self.width || dst.is_empty() {
            return;
        }

        /* clip to integer pixel rows */
        let y0 = dst.y0.max(0);
        let y1 = dst.y1.min(self.height as i32);

        let span = dst.height();
        let tex_span = src.height();
        for y in y0..y1 {
            // nearest texel for this row, same mapping for on- and off-screen parts
            let v = src.y0 as i64 + (y as i64 - dst.y0 as i64) * tex_span / span;
            let Some(texel) = tex.texel(src.x0, v as i32) else {
                continue;
            };
            if texel >> 24 == 0 {
                continue; // transparent
            }
            self.put(dst.x0 as usize, y as usize, col.tint.apply(texel));
        }
    }

    fn draw_floor(&mut self, floor: &FloorBuffer) {
        if floor.width() != self.width || floor.height() != self.height {
            return;
        }
        for (dst, &px) in self.scratch.iter_mut().zip(floor.pixels()) {
            if px != 0 {
                *dst = px;
            }
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        RenderConfig,
        engine::{ColumnFlags, Engine, Tint},
        renderer::RendererExt,
        world::{BasicSprite, EMPTY, Grid, Rect, TextureBank, TileMap, TileTextures},
    };
    use glam::DVec2;
    use std::sync::Arc;

    /* tiny helpers ---------------------------------------------------*/
    fn stripes() -> Texture {
        // row y has blue = y, row 0 transparent
        Texture::from_fn("STRIPES", 1, 4, |_, y| if y == 0 { 0 } else { 0xFF_000000 | y as u32 })
    }

    fn frame(sw: &mut Software) -> Vec<Rgba> {
        let mut out = Vec::new();
        sw.end_frame(|fb, _, _| out = fb.to_vec());
        out
    }

    #[test]
    fn backdrop_splits_at_horizon() {
        let mut sw = Software::new(1, 2);
        sw.begin_frame(3, 4);
        sw.draw_backdrop(1);
        assert_eq!(frame(&mut sw), vec![1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2]);
        sw.draw_backdrop(-5);
        assert!(frame(&mut sw).iter().all(|&p| p == 2));
    }

    #[test]
    fn column_is_stretched_and_clipped() {
        let mut sw = Software::new(0, 0);
        sw.begin_frame(2, 4);
        sw.draw_backdrop(0);
        let col = Column {
            // 8 rows tall, starting 4 rows above the screen
            dst: Rect::column(1, -4, 4),
            src: Rect::column(0, 0, 4),
            tint: Tint::WHITE,
            tex: 1,
            flags: ColumnFlags::VALID,
        };
        sw.draw_column(&col, &stripes());
        let fb = frame(&mut sw);
        // on-screen rows map to texels 2, 2, 3, 3 (white tint scales by 255/256)
        assert_eq!(fb[1], 0xFF_000001);
        assert_eq!(fb[3], 0xFF_000001);
        assert_eq!(fb[5], 0xFF_000002);
        assert_eq!(fb[7], 0xFF_000002);
        assert!(fb.iter().step_by(2).all(|&p| p == 0));

        // off to the side: ignored
        sw.draw_column(&Column { dst: Rect::column(5, 0, 4), ..col }, &stripes());
        sw.draw_column(&Column { dst: Rect::column(-1, 0, 4), ..col }, &stripes());
    }

    #[test]
    fn transparent_texels_are_skipped() {
        let mut sw = Software::new(7, 7);
        sw.begin_frame(1, 4);
        sw.draw_backdrop(0);
        let col = Column {
            dst: Rect::column(0, 0, 4),
            src: Rect::column(0, 0, 4),
            tint: Tint::WHITE,
            tex: 1,
            flags: ColumnFlags::VALID,
        };
        sw.draw_column(&col, &stripes());
        let fb = frame(&mut sw);
        assert_eq!(fb[0], 7);
        assert_eq!(fb[3], 0xFF_000002);
    }

    #[test]
    fn software_renders_engine_frame() {
        let room = Grid::from_fn(6, 6, |x, y| {
            if x == 0 || y == 0 || x == 5 || y == 5 { 1 } else { EMPTY }
        });
        let map = Arc::new(TileMap::new(vec![room]).unwrap());
        let mut bank = TextureBank::default_with_checker();
        let blue = bank.insert("BLUE", Texture::from_fn("BLUE", 8, 8, |_, _| 0xFF_0000FF)).unwrap();
        let red = bank.insert("RED", Texture::from_fn("RED", 8, 8, |_, _| 0xFF_FF0000)).unwrap();
        let green = bank.insert("GREEN", Texture::from_fn("GREEN", 8, 8, |_, _| 0xFF_00FF00)).unwrap();
        let mut tex = TileTextures::new(map.clone(), bank);
        tex.bind_tile(1, blue).unwrap();
        tex.set_floor(Some(red)).unwrap();

        let cfg = RenderConfig {
            width: 64,
            height: 48,
            texture_size: 8,
            workers: 2,
            global_illumination: 1000.0,
            ..RenderConfig::default()
        };
        let mut engine = Engine::new(&cfg, map, tex).unwrap();
        engine.camera_mut().set_position(DVec2::new(1.5, 2.5));
        let mut sprites = vec![BasicSprite::new(DVec2::new(3.5, 2.5), green, 8, 8)];
        engine.update(&mut sprites);

        let mut sw = Software::default();
        let mut fb = Vec::new();
        sw.draw_frame(&engine, |buf, w, h| {
            assert_eq!((w, h), (64, 48));
            fb = buf.to_vec();
        });

        let count = |c: Rgba| fb.iter().filter(|&&p| p & 0x00FF_FFFF == c).count();
        assert!(count(0x0000FE) > 0, "no wall pixels");
        assert!(count(0xFE0000) > 0, "no floor pixels");
        assert!(count(0x00FE00) > 0, "no sprite pixels");
        // sprite sits in front of the wall at the screen centre
        assert_eq!(fb[24 * 64 + 32] & 0x00FF_FFFF, 0x00FE00);
    }

    #[test]
    fn wall_touching_camera_fills_columns() {
        let room = Grid::from_fn(5, 5, |x, y| {
            if x == 0 || y == 0 || x == 4 || y == 4 { 1 } else { EMPTY }
        });
        let map = Arc::new(TileMap::new(vec![room]).unwrap());
        let mut bank = TextureBank::default_with_checker();
        let blue = bank.insert("BLUE", Texture::from_fn("BLUE", 8, 8, |_, _| 0xFF_0000FF)).unwrap();
        let mut tex = TileTextures::new(map.clone(), bank);
        tex.bind_tile(1, blue).unwrap();

        let cfg = RenderConfig {
            width: 64,
            height: 48,
            texture_size: 8,
            workers: 2,
            ..RenderConfig::default()
        };
        let mut engine = Engine::new(&cfg, map, tex).unwrap();
        // facing east, a hair in front of the east wall face
        engine.camera_mut().set_position(DVec2::new(4.0 - 1e-8, 2.5));
        engine.update::<BasicSprite>(&mut []);

        let col = engine.levels()[0].columns()[32];
        assert!(col.is_drawn());
        assert_eq!((col.dst.y0, col.dst.y1), (i32::MIN, i32::MAX));

        let mut fb = Vec::new();
        Software::default().draw_frame(&engine, |buf, _, _| fb = buf.to_vec());
        for y in 0..48 {
            assert_eq!(fb[y * 64 + 32] & 0x00FF_FFFF, 0x0000FE, "row {y}");
        }
    }
}
