use glam::{DVec2, DVec3};

use crate::engine::{Lighting, Tint};

/// Player view-point in grid space.
///
/// * `dir` has length `fov_depth`; `plane` is perpendicular to it and its
///   length encodes the horizontal FoV (`|plane| = |dir| * tan(fov/2)`).
/// * Only mutated between frames, never while a cast is running.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pos: DVec2,
    pos_z: f64, // grid units, 0.5 = eye at mid-wall
    cam_z: f64, // same height as a screen-space offset in pixels

    dir: DVec2,
    plane: DVec2,
    heading: f64, // radians (0 = +X, counter-clockwise)

    pitch: i32, // horizon shift in pixels
    pitch_angle: f64,

    fov_angle: f64, // radians
    fov_depth: f64,

    render_distance: f64,
    lighting: Lighting,

    width: usize,
    height: usize,
    texture_size: usize,
}

impl Camera {
    pub fn new(
        width: usize,
        height: usize,
        texture_size: usize,
        fov_degrees: f64,
        fov_depth: f64,
    ) -> Self {
        let mut cam = Self {
            pos: DVec2::new(1.0, 1.0),
            pos_z: 0.5,
            cam_z: 0.0,
            dir: DVec2::X,
            plane: DVec2::ZERO,
            heading: 0.0,
            pitch: 0,
            pitch_angle: 0.0,
            fov_angle: fov_degrees.to_radians(),
            fov_depth,
            render_distance: f64::INFINITY,
            lighting: Lighting::default(),
            width,
            height,
            texture_size,
        };
        cam.set_heading_angle(0.0);
        cam
    }

    /*──────────────────────── position / orientation ───────────────────*/

    pub fn set_position(&mut self, pos: DVec2) {
        self.pos = pos;
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        self.pos
    }

    /// Eye height in grid units (0 = floor, 1 = top of a ground-level wall).
    pub fn set_position_z(&mut self, grid_z: f64) {
        self.pos_z = grid_z;
        self.cam_z = (grid_z - 0.5) * self.height as f64;
    }

    #[inline]
    pub fn position_z(&self) -> f64 {
        self.pos_z
    }

    /// Eye height as a vertical pixel offset at unit distance.
    #[inline]
    pub fn cam_z(&self) -> f64 {
        self.cam_z
    }

    /// Point the camera at `angle` radians and rebuild dir/plane.
    pub fn set_heading_angle(&mut self, angle: f64) {
        self.heading = angle;
        self.dir = DVec2::from_angle(angle) * self.fov_depth;
        self.plane = self.plane_for(self.dir);
    }

    #[inline]
    pub fn heading_angle(&self) -> f64 {
        self.heading
    }

    /// Tilt the view; the horizon shift is clamped because looking too far
    /// up or down warps walls and tears the floor.
    pub fn set_pitch_angle(&mut self, angle: f64) {
        self.pitch_angle = angle;
        let h = self.height as f64;
        let shift = angle.tan() * h * self.fov_depth;
        let lo = -(self.height as i32) / 2;
        let hi = (h * self.fov_depth) as i32;
        self.pitch = (shift as i32).max(lo).min(hi);
    }

    #[inline]
    pub fn pitch(&self) -> i32 {
        self.pitch
    }

    #[inline]
    pub fn pitch_angle(&self) -> f64 {
        self.pitch_angle
    }

    /// Change the FoV (degrees) and zoom depth, keeping the heading.
    pub fn set_fov_angle(&mut self, fov_degrees: f64, fov_depth: f64) {
        self.fov_angle = fov_degrees.to_radians();
        self.fov_depth = fov_depth;
        self.set_heading_angle(self.dir.to_angle());
        self.set_pitch_angle(self.pitch_angle);
    }

    /// Horizontal FoV in degrees.
    pub fn fov_angle(&self) -> f64 {
        self.fov_angle.to_degrees()
    }

    pub fn fov_depth(&self) -> f64 {
        self.fov_depth
    }

    #[inline]
    pub fn direction(&self) -> DVec2 {
        self.dir
    }

    #[inline]
    pub fn plane(&self) -> DVec2 {
        self.plane
    }

    /// Plane vector for `dir`: from the tip of `dir` to the right edge of
    /// the view cone.
    fn plane_for(&self, dir: DVec2) -> DVec2 {
        let half = self.fov_angle / 2.0;
        let hypotenuse = dir.length() / half.cos();
        dir - DVec2::from_angle(dir.to_angle() + half) * hypotenuse
    }

    /*──────────────────────── render parameters ────────────────────────*/

    /// Maximum cast distance; negative or non-finite means unlimited.
    pub fn set_render_distance(&mut self, distance: f64) {
        self.render_distance = if distance < 0.0 || !distance.is_finite() {
            f64::INFINITY
        } else {
            distance
        };
    }

    #[inline]
    pub fn render_distance(&self) -> f64 {
        self.render_distance
    }

    /// Torch light strength; more negative is dimmer.
    pub fn set_light_falloff(&mut self, falloff: f64) {
        self.lighting.falloff = falloff;
    }

    /// Flat light added everywhere (sun brightness).
    pub fn set_global_illumination(&mut self, illumination: f64) {
        self.lighting.global_illumination = illumination;
    }

    /// Tint bounds when fully shadowed (`min`) and fully lit (`max`).
    pub fn set_light_rgb(&mut self, min: Tint, max: Tint) {
        self.lighting.min = min;
        self.lighting.max = max;
    }

    #[inline]
    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    /*──────────────────────── viewport ─────────────────────────────────*/

    pub fn set_view_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.set_position_z(self.pos_z);
        self.set_pitch_angle(self.pitch_angle);
    }

    #[inline]
    pub fn view_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn texture_size(&self) -> usize {
        self.texture_size
    }

    /// Camera position with its grid height as Z.
    #[inline]
    pub fn eye(&self) -> DVec3 {
        self.pos.extend(self.pos_z)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
