use glam::DVec3;
use rayon::prelude::*;
use tracing::{debug, info, trace_span};

use crate::{
    EngineError, RenderConfig,
    engine::{
        planes,
        scheduler::Scheduler,
        sprites::{cast_sprite, comb_sort},
        types::{Convergence, FloorBuffer, Level},
        walls,
    },
    world::{BasicSprite, Camera, Sprite, TextureSource, WorldMap, validate_levels},
};

/// Owns the camera and every per-frame render target.
///
/// `update` runs two barrier-separated phases on the worker pool:
/// 1. walls on every level, the ground z-buffer and the floor;
/// 2. sprites, depth-tested against the finished z-buffer.
pub struct Engine<M: WorldMap, T: TextureSource> {
    camera: Camera,
    map: M,
    textures: T,
    scheduler: Scheduler,

    levels: Vec<Level>,
    z_buffer: Vec<f64>,
    floor: FloorBuffer,

    sprite_levels: Vec<Option<Level>>,
    sprite_order: Vec<usize>,
    sprite_distance: Vec<f64>,

    convergence: Option<Convergence>,
}

impl<M: WorldMap, T: TextureSource> Engine<M, T> {
    pub fn new(config: &RenderConfig, map: M, textures: T) -> Result<Self, EngineError> {
        config.validate()?;
        validate_levels(map.num_levels(), |n| map.level(n))?;

        let mut camera = Camera::new(
            config.width,
            config.height,
            config.texture_size,
            config.fov_degrees,
            config.fov_depth,
        );
        camera.set_render_distance(config.render_distance.unwrap_or(-1.0));
        camera.set_light_falloff(config.light_falloff);
        camera.set_global_illumination(config.global_illumination);
        camera.set_light_rgb(config.min_light, config.max_light);

        let scheduler = Scheduler::new(config.workers)?;
        let (w, h) = (config.width, config.height);
        info!(
            width = w,
            height = h,
            levels = map.num_levels(),
            workers = scheduler.workers(),
            "raycaster ready"
        );

        let mut engine = Self {
            camera,
            levels: (0..map.num_levels()).map(|_| Level::new(w)).collect(),
            map,
            textures,
            scheduler,
            z_buffer: vec![0.0; w],
            floor: FloorBuffer::new(w, h),
            sprite_levels: Vec::new(),
            sprite_order: Vec::new(),
            sprite_distance: Vec::new(),
            convergence: None,
        };
        engine.update::<BasicSprite>(&mut []);
        Ok(engine)
    }

    /*──────────────────────── frame ────────────────────────────────────*/

    /// Re-cast the whole view for the current camera and `sprites`.
    ///
    /// Each sprite gets its screen rectangle (or `None`) written back.
    pub fn update<S: Sprite>(&mut self, sprites: &mut [S]) {
        let _frame = trace_span!("frame", sprites = sprites.len()).entered();

        let Self {
            camera,
            map,
            textures,
            scheduler,
            levels,
            z_buffer,
            floor,
            sprite_levels,
            sprite_order,
            sprite_distance,
            convergence,
        } = self;
        let cam = &*camera;
        let map = &*map;
        let textures = &*textures;

        let (w, h) = cam.view_size();
        let probe = (w as i32 / 2 - 1, h as i32 / 2 - 1);

        // fresh buffer: nothing from the previous frame can bleed through
        *floor = FloorBuffer::new(w, h);

        /* phase 1: walls, z-buffer, floor ---------------------------------*/
        let wall_focus = scheduler.phase("walls", || {
            let Some((ground, upper)) = levels.split_first_mut() else {
                return None;
            };
            let grid0 = map.level(0);

            let (near, far) = rayon::join(
                || {
                    ground
                        .columns_mut()
                        .par_iter_mut()
                        .zip(z_buffer.par_iter_mut())
                        .zip(floor.par_columns_mut())
                        .enumerate()
                        .map(|(x, ((col, z), mut floor_col))| {
                            let slice = walls::cast_column(cam, grid0, 0, x, textures, col);
                            *z = slice.depth.unwrap_or(0.0);

                            let on_probe = x as i32 == probe.0;
                            let floor_dist = planes::cast_column(
                                cam,
                                &slice,
                                grid0,
                                textures,
                                &mut floor_col,
                                on_probe.then_some(probe.1),
                            );
                            if !on_probe {
                                return None;
                            }
                            Convergence::nearer(
                                walls::convergence(cam, &slice, col, probe.1),
                                floor_dist.map(|d| walls::converge_at(cam, d)),
                            )
                        })
                        .reduce(|| None, Convergence::nearer)
                },
                || {
                    upper
                        .par_iter_mut()
                        .enumerate()
                        .map(|(i, level)| {
                            let n = i + 1;
                            let grid = map.level(n);
                            level
                                .columns_mut()
                                .par_iter_mut()
                                .enumerate()
                                .map(|(x, col)| {
                                    let slice = walls::cast_column(cam, grid, n, x, textures, col);
                                    if x as i32 != probe.0 {
                                        return None;
                                    }
                                    walls::convergence(cam, &slice, col, probe.1)
                                })
                                .reduce(|| None, Convergence::nearer)
                        })
                        .reduce(|| None, Convergence::nearer)
                },
            );
            Convergence::nearer(near, far)
        });

        /* phase 2: sprites -------------------------------------------------*/
        let eye = cam.position();
        sprite_distance.clear();
        sprite_distance.extend(sprites.iter().map(|s| eye.distance_squared(s.pos())));
        sprite_order.clear();
        sprite_order.extend(0..sprites.len());
        comb_sort(sprite_order, sprite_distance);

        if sprite_levels.len() < sprites.len() {
            debug!(from = sprite_levels.len(), to = sprites.len(), "growing sprite slots");
        }
        sprite_levels.resize_with(sprites.len(), || None);

        let z = &*z_buffer;
        let sprite_focus = scheduler.phase("sprites", || {
            sprites
                .par_iter_mut()
                .zip(sprite_levels.par_iter_mut())
                .map(|(sprite, slot)| cast_sprite(cam, textures, z, sprite, slot, probe))
                .reduce(|| None, Convergence::nearer)
        });

        *convergence = Convergence::nearer(wall_focus, sprite_focus);
    }

    /*──────────────────────── camera / viewport ────────────────────────*/

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Movement and light setters; picked up by the next `update`.
    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Resize the viewport and every buffer that depends on it.
    pub fn set_view_size(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::ZeroViewport(width, height));
        }
        debug!(width, height, "viewport resized");
        self.camera.set_view_size(width, height);
        self.levels.iter_mut().for_each(|l| *l = Level::new(width));
        self.z_buffer = vec![0.0; width];
        self.floor = FloorBuffer::new(width, height);
        self.sprite_levels.clear();
        Ok(())
    }

    /*──────────────────────── results ──────────────────────────────────*/

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn textures(&self) -> &T {
        &self.textures
    }

    pub fn workers(&self) -> usize {
        self.scheduler.workers()
    }

    /// Wall slices per grid level, ground first.
    #[inline]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[inline]
    pub fn floor(&self) -> &FloorBuffer {
        &self.floor
    }

    /// Perpendicular depth of the ground-level wall in every column.
    #[inline]
    pub fn z_buffer(&self) -> &[f64] {
        &self.z_buffer
    }

    /// Slices of sprite `i` from the last `update`, `None` if not visible.
    #[inline]
    pub fn sprite_levels(&self) -> &[Option<Level>] {
        &self.sprite_levels
    }

    /// Sprite indices, farthest first.
    #[inline]
    pub fn sprite_order(&self) -> &[usize] {
        &self.sprite_order
    }

    /// Squared distances matching [`Engine::sprite_order`].
    #[inline]
    pub fn sprite_distances(&self) -> &[f64] {
        &self.sprite_distance
    }

    /// 3-D distance to whatever the screen centre rests on.
    pub fn convergence_distance(&self) -> Option<f64> {
        self.convergence.map(|c| c.distance)
    }

    pub fn convergence_point(&self) -> Option<DVec3> {
        self.convergence.map(|c| c.point)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
