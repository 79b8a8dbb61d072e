//! Render targets filled by the casters and read by the compositor.

use std::marker::PhantomData;

use bitflags::bitflags;
use glam::DVec3;
use rayon::prelude::*;

use crate::{
    engine::Tint,
    renderer::Rgba,
    world::{NO_TEXTURE, Rect, TextureId},
};

bitflags! {
    /// State of one column slot after a cast.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ColumnFlags: u8 {
        /// Slice has a texture and should be drawn.
        const VALID  = 1 << 0;
        /// Ray stopped at the render distance; geometry only.
        const CUTOFF = 1 << 1;
    }
}

/// One vertical textured slice: `src` texels stretched onto `dst` pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Column {
    pub dst: Rect,
    pub src: Rect,
    pub tint: Tint,
    pub tex: TextureId,
    pub flags: ColumnFlags,
}

impl Column {
    /// Slot that draws nothing.
    pub const EMPTY: Column = Column {
        dst: Rect::new(0, 0, 0, 0),
        src: Rect::new(0, 0, 0, 0),
        tint: Tint::WHITE,
        tex: NO_TEXTURE,
        flags: ColumnFlags::empty(),
    };

    #[inline]
    pub fn is_drawn(&self) -> bool {
        self.flags.contains(ColumnFlags::VALID)
    }
}

/// Per-column slices for one grid level or one sprite.
///
/// Allocated once per viewport width; casters overwrite every slot in
/// place each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    columns: Vec<Column>,
}

impl Level {
    pub fn new(width: usize) -> Self {
        Self {
            columns: vec![Column::EMPTY; width],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[inline]
    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Mark every slot as not drawn.
    pub fn reset(&mut self) {
        self.columns.fill(Column::EMPTY);
    }

    pub fn any_drawn(&self) -> bool {
        self.columns.iter().any(Column::is_drawn)
    }
}

/*──────────────────────── floor pixel buffer ─────────────────────────*/

/// Shaded floor pixels, row-major, `0` where nothing was cast.
#[derive(Clone, Debug, PartialEq)]
pub struct FloorBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl FloorBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// One writer per screen column, for the parallel floor cast.
    pub fn par_columns_mut(&mut self) -> impl IndexedParallelIterator<Item = FloorColumn<'_>> {
        let (width, height) = (self.width, self.height);
        let base = PixelPtr(self.pixels.as_mut_ptr());
        (0..width).into_par_iter().map(move |x| FloorColumn {
            base,
            x,
            width,
            height,
            _buf: PhantomData,
        })
    }

    /// Sequential counterpart of [`FloorBuffer::par_columns_mut`].
    pub fn column_mut(&mut self, x: usize) -> Option<FloorColumn<'_>> {
        (x < self.width).then(|| FloorColumn {
            base: PixelPtr(self.pixels.as_mut_ptr()),
            x,
            width: self.width,
            height: self.height,
            _buf: PhantomData,
        })
    }
}

#[derive(Clone, Copy)]
struct PixelPtr(*mut Rgba);

// Each FloorColumn only ever touches its own `x`, so columns handed to
// different threads never alias.
unsafe impl Send for PixelPtr {}
unsafe impl Sync for PixelPtr {}

impl PixelPtr {
    #[inline]
    fn at(self, offset: usize) -> *mut Rgba {
        // SAFETY: callers pass `y * width + x` with `y < height`, `x < width`,
        // which is inside the `width * height` allocation.
        unsafe { self.0.add(offset) }
    }
}

/// Exclusive write access to column `x` of a [`FloorBuffer`].
pub struct FloorColumn<'a> {
    base: PixelPtr,
    x: usize,
    width: usize,
    height: usize,
    _buf: PhantomData<&'a mut [Rgba]>,
}

impl FloorColumn<'_> {
    #[inline]
    pub fn x(&self) -> usize {
        self.x
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Write row `y`; rows outside the buffer are ignored.
    #[inline]
    pub fn set(&mut self, y: usize, px: Rgba) {
        if y < self.height {
            // SAFETY: in bounds (see `PixelPtr::at`), and no other
            // FloorColumn alive for this buffer shares column `x`.
            unsafe { *self.base.at(y * self.width + self.x) = px };
        }
    }
}

/*──────────────────────── convergence ────────────────────────────────*/

/// Where the screen-centre ray first met a wall, the floor or a sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convergence {
    /// 3-D distance from the eye.
    pub distance: f64,
    pub point: DVec3,
}

impl Convergence {
    /// Reducer keeping the closer of two candidates.
    pub fn nearer(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.distance < a.distance { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}
