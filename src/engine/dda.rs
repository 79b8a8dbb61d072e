//! Grid traversal: one ray per screen column, stepped cell by cell.
//!
//! Classic DDA as described at <https://lodev.org/cgtutor/raycasting.html>.

use glam::DVec2;

use crate::world::{Camera, EMPTY, Grid};

/// Which kind of grid line the ray crossed last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Stepped along X (crossed a vertical grid line): an east/west face.
    X,
    /// Stepped along Y: a north/south face.
    Y,
}

/// How the traversal ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    /// Entered a non-empty tile within the render distance.
    Wall,
    /// Travelled further than the render distance first.
    Cutoff,
    /// Left the grid.
    Edge,
}

/// Direction of a single ray from the camera position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: DVec2,
    pub dir: DVec2,
}

impl Ray {
    /// Ray through screen column `x` (`cameraX = 2x/width - 1`).
    #[inline]
    pub fn for_column(cam: &Camera, x: usize) -> Self {
        let (w, _) = cam.view_size();
        let camera_x = 2.0 * x as f64 / w as f64 - 1.0;
        Self {
            origin: cam.position(),
            dir: cam.direction() + cam.plane() * camera_x,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub kind: HitKind,
    /// Distance projected onto the view direction (no fisheye).
    pub perp_dist: f64,
    pub side: Side,
    /// Cell the ray stopped in, clamped into the grid.
    pub map_x: i32,
    pub map_y: i32,
    /// Fractional position along the struck face, `0.0..1.0`.
    pub wall_x: f64,
}

/// Stand-in for `1 / 0` when a ray runs parallel to an axis; large enough to
/// never win the side comparison, small enough to stay finite when summed.
const PARALLEL: f64 = 1e30;

/// Walk `ray` through `grid` until it enters a wall, passes
/// `render_distance`, or leaves the grid.
pub fn cast(ray: &Ray, grid: &Grid, render_distance: f64) -> RayHit {
    let pos = ray.origin;
    let dir = ray.dir;

    // which box of the map we're in
    let mut map_x = pos.x.floor() as i32;
    let mut map_y = pos.y.floor() as i32;

    // length of ray from one x or y-side to the next
    let delta_x = if dir.x == 0.0 { PARALLEL } else { (1.0 / dir.x).abs() };
    let delta_y = if dir.y == 0.0 { PARALLEL } else { (1.0 / dir.y).abs() };

    // step direction and distance to the first x/y grid line
    let (step_x, mut side_x) = if dir.x < 0.0 {
        (-1, (pos.x - map_x as f64) * delta_x)
    } else {
        (1, (map_x as f64 + 1.0 - pos.x) * delta_x)
    };
    let (step_y, mut side_y) = if dir.y < 0.0 {
        (-1, (pos.y - map_y as f64) * delta_y)
    } else {
        (1, (map_y as f64 + 1.0 - pos.y) * delta_y)
    };

    let mut side;
    let mut perp_dist;
    let kind = loop {
        // jump to next map square, either in x-direction, or in y-direction
        if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            side = Side::X;
            perp_dist = side_x - delta_x;
        } else {
            side_y += delta_y;
            map_y += step_y;
            side = Side::Y;
            perp_dist = side_y - delta_y;
        }

        match grid.tile(map_x, map_y) {
            None => break HitKind::Edge,
            Some(_) if perp_dist > render_distance => break HitKind::Cutoff,
            Some(EMPTY) => {}
            Some(_) => break HitKind::Wall,
        }
    };

    // never index outside the grid from here on
    map_x = map_x.clamp(0, grid.width() as i32 - 1);
    map_y = map_y.clamp(0, grid.height() as i32 - 1);

    let hit_along = match side {
        Side::X => pos.y + perp_dist * dir.y,
        Side::Y => pos.x + perp_dist * dir.x,
    };

    RayHit {
        kind,
        perp_dist,
        side,
        map_x,
        map_y,
        wall_x: hit_along - hit_along.floor(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// `w`×`h` room: border tiles are `1`, interior empty.
    fn room(w: usize, h: usize) -> Grid {
        Grid::from_fn(w, h, |x, y| {
            if x == 0 || y == 0 || x == w - 1 || y == h - 1 { 1 } else { EMPTY }
        })
    }

    fn ray(origin: (f64, f64), dir: (f64, f64)) -> Ray {
        Ray {
            origin: DVec2::new(origin.0, origin.1),
            dir: DVec2::new(dir.0, dir.1),
        }
    }

    #[test]
    fn east_wall_of_room() {
        let hit = cast(&ray((2.5, 2.5), (1.0, 0.0)), &room(5, 5), f64::INFINITY);
        assert_eq!(hit.kind, HitKind::Wall);
        assert_eq!(hit.side, Side::X);
        assert_eq!((hit.map_x, hit.map_y), (4, 2));
        assert!((hit.perp_dist - 1.5).abs() < 1e-12);
        assert!((hit.wall_x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn north_and_south_faces_use_y_side() {
        let g = room(5, 5);
        let up = cast(&ray((2.25, 2.5), (0.0, -1.0)), &g, f64::INFINITY);
        assert_eq!((up.side, up.map_y), (Side::Y, 0));
        assert!((up.perp_dist - 1.5).abs() < 1e-12);
        assert!((up.wall_x - 0.25).abs() < 1e-12);

        let down = cast(&ray((2.25, 2.5), (0.0, 1.0)), &g, f64::INFINITY);
        assert_eq!((down.side, down.map_y), (Side::Y, 4));
        assert!((down.perp_dist - 1.5).abs() < 1e-12);
    }

    /// Single wall cell at (6, 6) in an open 13×13 grid; the camera looks
    /// straight at it from every compass direction at a known offset.
    #[test]
    fn perpendicular_distance_has_no_fisheye() {
        let g = Grid::from_fn(13, 13, |x, y| if (x, y) == (6, 6) { 1 } else { EMPTY });
        for (i, offset) in [1.0, 2.25, 3.75].into_iter().enumerate() {
            for quarter in 0..4 {
                let a = quarter as f64 * PI / 2.0;
                let dir = DVec2::from_angle(a);
                // nearest face of the cell is 0.5 from its centre
                let origin = DVec2::new(6.5, 6.5) - dir * (offset + 0.5);
                // aim at the wall through an off-centre column of a wide FoV
                let plane = dir.perp() * -0.7;
                for camera_x in [-0.2, 0.0, 0.3] {
                    let r = Ray {
                        origin,
                        dir: dir + plane * camera_x,
                    };
                    let hit = cast(&r, &g, f64::INFINITY);
                    assert_eq!(hit.kind, HitKind::Wall, "case {i}/{quarter}/{camera_x}");
                    assert!(
                        (hit.perp_dist - offset).abs() < 1e-9,
                        "offset {offset} heading {a}: got {}",
                        hit.perp_dist
                    );
                }
            }
        }
    }

    #[test]
    fn render_distance_cuts_off() {
        let hit = cast(&ray((1.5, 2.5), (1.0, 0.0)), &room(30, 5), 4.0);
        assert_eq!(hit.kind, HitKind::Cutoff);
        assert!(hit.perp_dist > 4.0);
        assert!(hit.perp_dist <= 5.0);
    }

    #[test]
    fn open_grid_ends_at_edge_with_clamped_cell() {
        let open = Grid::from_fn(4, 4, |_, _| EMPTY);
        let hit = cast(&ray((1.5, 1.5), (-1.0, -0.3)), &open, f64::INFINITY);
        assert_eq!(hit.kind, HitKind::Edge);
        assert!(open.contains(hit.map_x, hit.map_y));
        assert!(hit.perp_dist.is_finite());
    }

    #[test]
    fn axis_parallel_rays_stay_finite() {
        // origin exactly on grid lines, ray exactly along each axis
        let g = room(6, 6);
        for d in [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
            let hit = cast(&ray((3.0, 3.0), d), &g, f64::INFINITY);
            assert_eq!(hit.kind, HitKind::Wall);
            assert!(hit.perp_dist.is_finite() && hit.perp_dist > 0.0);
            assert!(hit.wall_x.is_finite());
        }
    }

    #[test]
    fn camera_outside_grid_does_not_panic() {
        let g = room(5, 5);
        for origin in [(-3.0, 2.5), (9.0, 9.0), (2.5, -0.01), (5.0, 5.0)] {
            let hit = cast(&ray(origin, (0.7, 0.7)), &g, f64::INFINITY);
            assert!(g.contains(hit.map_x, hit.map_y));
        }
    }
}
