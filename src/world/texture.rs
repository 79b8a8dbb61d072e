// Format-agnostic repository of decoded textures, plus the lookup the
// casters use to pick a texture for a wall face or floor cell.
// The engine and world logic interact through `TextureId` only.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{
    engine::Side,
    renderer::Rgba,
    world::map::{EMPTY, TileId, TileMap, WorldMap},
};

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// CPU-side storage: 32-bit **ARGB** (0xAARRGGBB) in row-major order.
/// Alpha 0 marks a transparent texel (sprite cut-outs).
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Rgba>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT: Rgba = 0xFF_A0A0A0;
        const DARK: Rgba = 0xFF_505050;
        Texture::from_fn("CHECKER", 8, 8, |x, y| if (x ^ y) & 1 == 0 { LIGHT } else { DARK })
    }
}

impl Texture {
    pub fn new<S: Into<String>>(
        name: S,
        w: usize,
        h: usize,
        pixels: Vec<Rgba>,
    ) -> Result<Self, TextureError> {
        let name = name.into();
        if pixels.len() != w * h || w == 0 || h == 0 {
            return Err(TextureError::PixelCount {
                name,
                expected: w * h,
                found: pixels.len(),
            });
        }
        Ok(Self { name, w, h, pixels })
    }

    /// Generate a texture texel by texel (procedural assets, tests).
    pub fn from_fn<S: Into<String>>(
        name: S,
        w: usize,
        h: usize,
        mut f: impl FnMut(usize, usize) -> Rgba,
    ) -> Self {
        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                pixels.push(f(x, y));
            }
        }
        Self {
            name: name.into(),
            w,
            h,
            pixels,
        }
    }

    /// Bounds-checked texel fetch.
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> Option<Rgba> {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return None;
        }
        Some(self.pixels[y as usize * self.w + x as usize])
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID was never handed out by `insert`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    #[error("texture `{name}` needs {expected} pixels, got {found}")]
    PixelCount {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// A format-agnostic cache of textures.
///
/// * Does **not** know about PNG or sprite sheets; that is the loader's job.
/// * Stores exactly one copy of every name.
/// * ID **0** is always the “missing” checkerboard.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**.
    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![missing_tex],
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Obtain the id for a *loaded* texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a texture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.data.len() as TextureId;
        self.data.push(tex);
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*======================================================================*/
/*                        Caster-facing lookup                           */
/*======================================================================*/

/// Where the casters get their textures from.
///
/// Every lookup may come back empty; the caster then skips that column
/// or pixel instead of drawing garbage.
pub trait TextureSource: Sync {
    /// Texture for the wall face of cell `(x, y)` on `level`, seen from `side`.
    fn wall_texture(&self, x: i32, y: i32, level: usize, side: Side) -> Option<TextureId>;

    /// Texture for the floor of cell `(x, y)`.
    fn floor_texture(&self, x: i32, y: i32) -> Option<TextureId>;

    fn texture(&self, id: TextureId) -> Option<&Texture>;
}

/// House walls whose texture is not symmetric: when seen across an
/// X-side the face shows the opposite half of the facade.
///
/// `(raw tile, side) -> tile actually textured`
const HOUSE_WALLS: &[((TileId, Side), TileId)] = &[
    ((2, Side::X), 5),
    ((3, Side::X), 4),
    ((4, Side::X), 5),
    ((5, Side::X), 4),
];

static HOUSE_REMAP: Lazy<HashMap<(TileId, Side), TileId>> =
    Lazy::new(|| HOUSE_WALLS.iter().copied().collect());

/// [`TextureSource`] driven by the tile ids of a [`TileMap`].
///
/// Tile `n` is textured with `by_tile[n]` after the `(tile, side)` remap
/// table has been applied; the floor uses a single texture everywhere.
pub struct TileTextures {
    map: Arc<TileMap>,
    bank: TextureBank,
    by_tile: Vec<Option<TextureId>>,
    remap: HashMap<(TileId, Side), TileId>,
    floor: Option<TextureId>,
}

impl TileTextures {
    pub fn new(map: Arc<TileMap>, bank: TextureBank) -> Self {
        Self {
            map,
            bank,
            by_tile: Vec::new(),
            remap: HashMap::new(),
            floor: None,
        }
    }

    /// Texture wall tile `tile` with `id`.
    pub fn bind_tile(&mut self, tile: TileId, id: TextureId) -> Result<(), TextureError> {
        self.bank.texture(id)?;
        let idx = tile as usize;
        if self.by_tile.len() <= idx {
            self.by_tile.resize(idx + 1, None);
        }
        self.by_tile[idx] = Some(id);
        Ok(())
    }

    pub fn set_floor(&mut self, id: Option<TextureId>) -> Result<(), TextureError> {
        if let Some(id) = id {
            self.bank.texture(id)?;
        }
        self.floor = id;
        Ok(())
    }

    /// Replace the `(tile, side)` remap table.
    pub fn with_remap(mut self, remap: HashMap<(TileId, Side), TileId>) -> Self {
        self.remap = remap;
        self
    }

    /// Use the stock table for the asymmetric house facades.
    pub fn with_house_remap(self) -> Self {
        self.with_remap(HOUSE_REMAP.clone())
    }

    pub fn bank(&self) -> &TextureBank {
        &self.bank
    }

    /// Tile id after the side remap.
    #[inline]
    pub fn resolve(&self, tile: TileId, side: Side) -> TileId {
        self.remap.get(&(tile, side)).copied().unwrap_or(tile)
    }
}

impl TextureSource for TileTextures {
    fn wall_texture(&self, x: i32, y: i32, level: usize, side: Side) -> Option<TextureId> {
        if level >= self.map.num_levels() {
            return None;
        }
        let tile = self.map.level(level).tile(x, y)?;
        if tile == EMPTY {
            return None;
        }
        let tile = self.resolve(tile, side);
        self.by_tile.get(tile as usize).copied().flatten()
    }

    fn floor_texture(&self, x: i32, y: i32) -> Option<TextureId> {
        self.map.level(0).contains(x, y).then_some(self.floor?)
    }

    fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.bank.texture(id).ok()
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::map::Grid;

    fn dummy_tex(color: Rgba) -> Texture {
        Texture::from_fn("Dummy", 2, 2, |_, _| color)
    }

    #[test]
    fn insert_and_lookup() {
        let mut bank = TextureBank::default_with_checker();
        let red = bank.insert("RED", dummy_tex(0xFF_FF0000)).unwrap();
        let blue = bank.insert("BLUE", dummy_tex(0xFF_0000FF)).unwrap();

        assert_ne!(red, NO_TEXTURE);
        assert_ne!(blue, red);
        assert_eq!(bank.id("RED"), Some(red));
        assert_eq!(bank.id("BLUE"), Some(blue));
        assert_eq!(bank.id("NOPE"), None);
        assert_eq!(bank.id_or_missing("NOPE"), NO_TEXTURE);

        assert_eq!(bank.texture(red).unwrap().pixels[0], 0xFF_FF0000);
        assert_eq!(bank.texture(blue).unwrap().pixels[0], 0xFF_0000FF);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut bank = TextureBank::default_with_checker();
        bank.insert("WOOD", dummy_tex(1)).unwrap();
        let err = bank.insert("WOOD", dummy_tex(2)).unwrap_err();
        assert_eq!(err, TextureError::Duplicate("WOOD".into()));
        // the first WOOD is kept
        let wood = bank.id("WOOD").unwrap();
        assert_eq!(bank.texture(wood).unwrap().pixels[0], 1);
        assert!(bank.texture(wood + 1).is_err());
    }

    #[test]
    fn bad_id_guard() {
        let bank = TextureBank::default_with_checker();
        let bad = TextureId::MAX;
        assert_eq!(bank.texture(bad).unwrap_err(), TextureError::BadId(bad));
    }

    #[test]
    fn pixel_count_checked() {
        let err = Texture::new("SHORT", 4, 4, vec![0; 15]).unwrap_err();
        assert!(matches!(err, TextureError::PixelCount { expected: 16, found: 15, .. }));
        assert!(Texture::default().texel(8, 0).is_none());
        assert!(Texture::default().texel(7, 7).is_some());
    }

    fn house_textures() -> TileTextures {
        let grid = Grid::from_columns(&[vec![2, 3, 4, 5, 0, 9]]);
        let map = Arc::new(TileMap::new(vec![grid]).unwrap());
        let mut bank = TextureBank::default_with_checker();
        let ids: Vec<_> = (1..=5)
            .map(|tile| bank.insert(format!("T{tile}"), dummy_tex(tile)).unwrap())
            .collect();
        let mut tex = TileTextures::new(map, bank);
        for (tile, id) in (1..=5).zip(ids) {
            tex.bind_tile(tile, id).unwrap();
        }
        tex.with_house_remap()
    }

    #[test]
    fn house_walls_remap_on_x_side_only() {
        let tex = house_textures();
        let id = |tile: Rgba| tex.bank().id(&format!("T{tile}"));

        // tile 2 at (0,0), tile 3 at (0,1), tile 4 at (0,2), tile 5 at (0,3)
        assert_eq!(tex.wall_texture(0, 0, 0, Side::X), id(5));
        assert_eq!(tex.wall_texture(0, 1, 0, Side::X), id(4));
        assert_eq!(tex.wall_texture(0, 2, 0, Side::X), id(5));
        assert_eq!(tex.wall_texture(0, 3, 0, Side::X), id(4));

        assert_eq!(tex.wall_texture(0, 0, 0, Side::Y), id(2));
        assert_eq!(tex.wall_texture(0, 2, 0, Side::Y), id(4));
    }

    #[test]
    fn missing_lookups_are_none() {
        let tex = house_textures();
        // empty tile, unbound tile, outside grid, missing level
        assert_eq!(tex.wall_texture(0, 4, 0, Side::X), None);
        assert_eq!(tex.wall_texture(0, 5, 0, Side::X), None);
        assert_eq!(tex.wall_texture(3, 0, 0, Side::X), None);
        assert_eq!(tex.wall_texture(0, 0, 1, Side::X), None);
        // no floor texture configured
        assert_eq!(tex.floor_texture(0, 4), None);
    }
}
