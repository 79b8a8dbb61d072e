//! Walk around a small procedurally textured two-level map.
//!
//! ```bash
//! cargo run --release -- --width 960 --height 600 --fov 70
//! ```
//!
//! W/S or ↑/↓ move, ←/→ turn, A/D strafe, PageUp/PageDown look up/down,
//! Space jumps, C crouches, F prints what the crosshair rests on.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::DVec2;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing_subscriber::EnvFilter;

use raycaster_rs::{
    RenderConfig,
    engine::{Engine, Tint},
    renderer::{RendererExt, Rgba, software::Software},
    world::{
        BasicSprite, EMPTY, Grid, Rect, Sprite, SpriteAnchor, Texture, TextureBank, TextureId,
        TileId, TileMap, TileTextures,
    },
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    #[arg(long, default_value_t = 960)]
    width: usize,

    #[arg(long, default_value_t = 600)]
    height: usize,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 70.0)]
    fov: f64,

    /// Zoom factor applied to the view direction
    #[arg(long, default_value_t = 1.0)]
    fov_depth: f64,

    /// Stop casting past this many tiles (unlimited if omitted)
    #[arg(long)]
    render_distance: Option<f64>,

    #[arg(long, default_value_t = -100.0, allow_hyphen_values = true)]
    light_falloff: f64,

    #[arg(long, default_value_t = 300.0, allow_hyphen_values = true)]
    illumination: f64,

    /// Worker threads (defaults to the available cores)
    #[arg(long)]
    workers: Option<usize>,
}

const TEX: usize = 64;
const PLAYER_RADIUS: f64 = 0.2;
const ORB_SPEED: f64 = 0.8;

/// Wall tile → texture name.
const TILE_TEXTURES: &[(TileId, &str)] = &[
    (1, "BRICK"),
    (2, "HOUSE_A_L"),
    (3, "HOUSE_A_R"),
    (4, "HOUSE_B_L"),
    (5, "HOUSE_B_R"),
    (6, "STONE"),
];
const MOVE_SPEED: f64 = 3.0; // tiles per second
const TURN_SPEED: f64 = 2.0; // radians per second
const PITCH_SPEED: f64 = 1.0;
const EYE: f64 = 0.5;
const CROUCH: f64 = 0.3;
const JUMP_SPEED: f64 = 2.2;
const GRAVITY: f64 = 7.0;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opts = Opts::parse();
    let defaults = RenderConfig::default();
    let config = RenderConfig {
        width: opts.width,
        height: opts.height,
        texture_size: TEX,
        fov_degrees: opts.fov,
        fov_depth: opts.fov_depth,
        render_distance: opts.render_distance,
        light_falloff: opts.light_falloff,
        global_illumination: opts.illumination,
        min_light: Tint::new(0, 0, 8),
        max_light: Tint::WHITE,
        workers: opts.workers.unwrap_or(defaults.workers),
    };

    // ─────────── world & assets ───────
    let map = Arc::new(TileMap::new(vec![ground_level(), upper_level()])?);
    let mut bank = TextureBank::default_with_checker();
    for tex in [
        brick(),
        stone(),
        facade("HOUSE_A_L", 0xFF_A05030, false),
        facade("HOUSE_A_R", 0xFF_A05030, true),
        facade("HOUSE_B_L", 0xFF_806040, false),
        facade("HOUSE_B_R", 0xFF_806040, true),
        floor(),
        barrel(),
        orb_sheet(),
        lamp(),
    ] {
        bank.insert(tex.name.clone(), tex)?;
    }
    let barrel_id = bank.id_or_missing("BARREL");
    let orb_id = bank.id_or_missing("ORB");
    let lamp_id = bank.id_or_missing("LAMP");
    let floor_id = bank.id_or_missing("FLOOR");
    let tile_tex: Vec<(TileId, TextureId)> = TILE_TEXTURES
        .iter()
        .map(|&(tile, name)| (tile, bank.id_or_missing(name)))
        .collect();

    let mut textures = TileTextures::new(map.clone(), bank).with_house_remap();
    for (tile, id) in tile_tex {
        textures.bind_tile(tile, id)?;
    }
    textures.set_floor(Some(floor_id))?;

    let mut engine = Engine::new(&config, map.clone(), textures)?;
    engine.camera_mut().set_position(DVec2::new(2.5, 2.5));
    engine.camera_mut().set_heading_angle(std::f64::consts::FRAC_PI_4);

    let mut sprites = scatter_sprites(barrel_id, orb_id, lamp_id);
    let mut renderer = Software::new(0xFF_5070A0, 0xFF_202020);

    let mut win = Window::new(
        "raycaster",
        config.width,
        config.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(60);

    // ────────────────── player state ────────────────────────────────────
    let mut pitch = 0.0_f64;
    let mut z = EYE;
    let mut vz = 0.0_f64;

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO; // cumulated render time
    let mut acc_frames = 0usize; // frames in the current window
    let mut last_print = Instant::now(); // when we printed last
    let mut last_tick = Instant::now();
    let start = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let dt = last_tick.elapsed().as_secs_f64().min(0.1);
        last_tick = Instant::now();

        /* movement --------------------------------------------------------- */
        let cam = *engine.camera();
        let mut heading = cam.heading_angle();
        if win.is_key_down(Key::Left) {
            heading += TURN_SPEED * dt;
        }
        if win.is_key_down(Key::Right) {
            heading -= TURN_SPEED * dt;
        }

        let fwd = DVec2::from_angle(heading);
        let mut step = DVec2::ZERO;
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            step += fwd;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            step -= fwd;
        }
        if win.is_key_down(Key::A) {
            step += fwd.perp();
        }
        if win.is_key_down(Key::D) {
            step -= fwd.perp();
        }
        let pos = slide(&map, &sprites, cam.position(), step.normalize_or_zero() * MOVE_SPEED * dt);

        if win.is_key_down(Key::PageUp) {
            pitch = (pitch + PITCH_SPEED * dt).min(0.8);
        }
        if win.is_key_down(Key::PageDown) {
            pitch = (pitch - PITCH_SPEED * dt).max(-0.8);
        }

        /* jump / crouch ---------------------------------------------------- */
        let floor_z = if win.is_key_down(Key::C) { CROUCH } else { EYE };
        if win.is_key_pressed(Key::Space, KeyRepeat::No) && z <= floor_z {
            vz = JUMP_SPEED;
        }
        vz -= GRAVITY * dt;
        z += vz * dt;
        if z <= floor_z {
            z = floor_z;
            vz = 0.0;
        }

        {
            let cam = engine.camera_mut();
            cam.set_position(pos);
            cam.set_heading_angle(heading);
            cam.set_pitch_angle(pitch);
            cam.set_position_z(z);
        }

        /* animate ---------------------------------------------------------- */
        let frame = ((start.elapsed().as_secs_f64() * 2.0) as i32) % 2;
        for s in sprites.iter_mut().filter(|s| s.texture == Some(orb_id)) {
            s.texture_rect = Rect::new(frame * 16, 0, frame * 16 + 16, 16);
            drift(&map, s, ORB_SPEED * dt);
        }

        /* draw ------------------------------------------------------------- */
        let t0 = Instant::now(); // ┌─ frame timer start
        engine.update(&mut sprites);
        renderer.draw_frame(&engine, |fb, w, h| {
            // ─────────── accumulate & report every ~3 s ────────────────────
            acc_time += t0.elapsed();
            acc_frames += 1;
            if let Err(e) = win.update_with_buffer(fb, w, h) {
                tracing::warn!("window update failed: {e}");
            }
        });

        if win.is_key_pressed(Key::F, KeyRepeat::No) {
            match (engine.convergence_distance(), engine.convergence_point()) {
                (Some(d), Some(p)) => println!(
                    "crosshair: {d:.2} tiles at ({:.2}, {:.2}, {:.2})",
                    p.x, p.y, p.z
                ),
                _ => println!("crosshair: nothing"),
            }
        }

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            let fps = 1000.0 / avg_ms;
            println!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, fps);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

/// Move by `delta`, one axis at a time, so walls and solid sprites can be
/// slid along.
fn slide<S: Sprite>(map: &TileMap, sprites: &[S], pos: DVec2, delta: DVec2) -> DVec2 {
    let free = |p: DVec2, pad: DVec2| {
        map.is_open(p.x + pad.x, p.y + pad.y)
            && !sprites.iter().any(|s| s.collides_with(p, PLAYER_RADIUS))
    };
    let mut out = pos;
    if delta.x != 0.0 {
        let next = out + DVec2::new(delta.x, 0.0);
        if free(next, DVec2::new(PLAYER_RADIUS.copysign(delta.x), 0.0)) {
            out = next;
        }
    }
    if delta.y != 0.0 {
        let next = out + DVec2::new(0.0, delta.y);
        if free(next, DVec2::new(0.0, PLAYER_RADIUS.copysign(delta.y))) {
            out = next;
        }
    }
    out
}

/// Float `distance` along the sprite's heading; turn a quarter when a wall
/// is in the way.
fn drift(map: &TileMap, sprite: &mut BasicSprite, distance: f64) {
    let next = sprite.ahead(distance);
    if map.is_open(next.x, next.y) {
        sprite.pos = next.truncate();
        sprite.pos_z = next.z.clamp(0.1, 0.9);
    } else {
        sprite.angle += std::f64::consts::FRAC_PI_2;
    }
}

/*──────────────────────── map ────────────────────────────────────────*/

const SIZE: usize = 24;

fn ground_level() -> Grid {
    Grid::from_fn(SIZE, SIZE, |x, y| match (x, y) {
        (0 | 23, _) | (_, 0 | 23) => 1,
        // house: facades on the south and north walls
        (8..=13, 8) => if x % 2 == 0 { 2 } else { 3 },
        (8..=13, 13) => if x % 2 == 0 { 4 } else { 5 },
        (8 | 13, 9..=12) if y != 11 => 6,
        // pillars
        (4, 16) | (6, 18) | (17, 5) | (19, 5) | (17, 18) => 6,
        _ => EMPTY,
    })
}

fn upper_level() -> Grid {
    Grid::from_fn(SIZE, SIZE, |x, y| match (x, y) {
        // the outer wall gets a crenellated second storey
        (0 | 23, _) | (_, 0 | 23) if (x + y) % 3 != 0 => 1,
        // roof line of the house
        (8..=13, 8 | 13) | (8 | 13, 9..=12) => 6,
        (17, 18) => 6,
        _ => EMPTY,
    })
}

fn scatter_sprites(barrel: TextureId, orb: TextureId, lamp: TextureId) -> Vec<BasicSprite> {
    let mut sprites = Vec::new();
    for (x, y) in [(3.5, 6.5), (4.5, 7.2), (15.5, 15.5), (20.5, 20.5), (10.5, 18.5)] {
        let mut s = BasicSprite::new(DVec2::new(x, y), barrel, 32, 32);
        s.scale = 0.6;
        s.collision_radius = 0.3;
        s.set_focusable(true);
        sprites.push(s);
    }
    for (x, y, angle) in [(6.5, 3.5, 0.3), (18.5, 12.5, 2.0)] {
        let mut s = BasicSprite::new(DVec2::new(x, y), orb, 16, 16);
        s.scale = 0.4;
        s.pos_z = 0.5;
        s.angle = angle;
        s.anchor = SpriteAnchor::Center;
        s.illumination = 120.0;
        s.set_focusable(true);
        sprites.push(s);
    }
    for (x, y) in [(5.5, 5.5), (11.5, 5.5), (11.5, 16.5), (18.5, 8.5)] {
        let mut s = BasicSprite::new(DVec2::new(x, y), lamp, 16, 32);
        s.scale = 0.5;
        s.pos_z = 1.0;
        s.anchor = SpriteAnchor::Top;
        s.illumination = 200.0;
        sprites.push(s);
    }
    sprites
}

/*──────────────────────── procedural textures ────────────────────────*/

fn shade(c: Rgba, f: f64) -> Rgba {
    let [a, r, g, b] = c.to_be_bytes();
    let s = |v: u8| (v as f64 * f).clamp(0.0, 255.0) as u8;
    Rgba::from_be_bytes([a, s(r), s(g), s(b)])
}

/// Cheap deterministic noise in `0.0..1.0`.
fn noise(x: usize, y: usize, seed: usize) -> f64 {
    let mut h = (x as u32).wrapping_mul(0x9E37_79B1) ^ (y as u32).wrapping_mul(0x85EB_CA77) ^ seed as u32;
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & 0xFFFF) as f64 / 65536.0
}

fn brick() -> Texture {
    Texture::from_fn("BRICK", TEX, TEX, |x, y| {
        let row = y / 8;
        let off = if row % 2 == 0 { 0 } else { 8 };
        let mortar = y % 8 == 7 || (x + off) % 16 == 15;
        if mortar {
            0xFF_707070
        } else {
            shade(0xFF_9A3B2A, 0.8 + 0.3 * noise(x / 2, y / 2, 1))
        }
    })
}

fn stone() -> Texture {
    Texture::from_fn("STONE", TEX, TEX, |x, y| {
        let edge = x % 32 == 0 || y % 32 == 0;
        let base = if edge { 0xFF_505050 } else { 0xFF_8A8A8A };
        shade(base, 0.75 + 0.4 * noise(x, y, 2))
    })
}

fn floor() -> Texture {
    Texture::from_fn("FLOOR", TEX, TEX, |x, y| {
        let tile = (x / 32 + y / 32) % 2 == 0;
        let base = if tile { 0xFF_6A5A48 } else { 0xFF_584838 };
        shade(base, 0.85 + 0.3 * noise(x, y, 3))
    })
}

/// One half of a house front; `right` draws the half with the door.
fn facade(name: &str, wall: Rgba, right: bool) -> Texture {
    Texture::from_fn(name, TEX, TEX, |x, y| {
        let window = !right && (16..48).contains(&x) && (16..40).contains(&y);
        let door = right && (8..40).contains(&x) && y >= 24;
        if window {
            if x % 16 == 0 || y % 12 == 4 { 0xFF_3A2A1A } else { 0xFF_9FC8E8 }
        } else if door {
            shade(0xFF_5A3A20, 0.9 + 0.2 * noise(x, y / 8, 4))
        } else {
            shade(wall, 0.85 + 0.25 * noise(x / 4, y, 5))
        }
    })
}

fn barrel() -> Texture {
    Texture::from_fn("BARREL", 32, 32, |x, y| {
        let dx = x as i32 - 16;
        let body = dx.abs() < 11 && y >= 4;
        if !body {
            return 0; // transparent
        }
        let hoop = y % 9 == 0;
        let c = if hoop { 0xFF_404040 } else { 0xFF_2E6B2E };
        shade(c, 1.1 - (dx.abs() as f64 / 11.0) * 0.5)
    })
}

/// Two 16×16 frames side by side.
fn orb_sheet() -> Texture {
    Texture::from_fn("ORB", 32, 16, |x, y| {
        let frame = x / 16;
        let (dx, dy) = ((x % 16) as f64 - 7.5, y as f64 - 7.5);
        let r = (dx * dx + dy * dy).sqrt();
        let radius = if frame == 0 { 7.0 } else { 5.5 };
        if r > radius {
            0
        } else {
            shade(0xFF_60C0FF, 1.3 - r / radius * 0.6)
        }
    })
}

fn lamp() -> Texture {
    Texture::from_fn("LAMP", 16, 32, |x, y| {
        let cord = (7..9).contains(&x) && y < 20;
        let shade_cone = y >= 20 && (x as i32 - 8).abs() <= (y as i32 - 18) / 2 + 1;
        if cord {
            0xFF_202020
        } else if shade_cone {
            0xFF_F0D070
        } else {
            0
        }
    })
}
