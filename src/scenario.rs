//! Canned obstacle fields for the demo binary and the end-to-end tests.
//!
//! Obstacles are integer grid coordinates of occupied cells, the planner's
//! native input format.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::Pose2D;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub start: Pose2D,
    pub goal: Pose2D,
    pub ox: Vec<i32>,
    pub oy: Vec<i32>,
}

/// Rectangular border of occupied cells, inclusive of the corners.
pub fn bounding_frame(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> (Vec<i32>, Vec<i32>) {
    let mut ox = Vec::new();
    let mut oy = Vec::new();
    for x in min_x..=max_x {
        ox.push(x);
        oy.push(min_y);
        ox.push(x);
        oy.push(max_y);
    }
    for y in (min_y + 1)..max_y {
        ox.push(min_x);
        oy.push(y);
        ox.push(max_x);
        oy.push(y);
    }
    (ox, oy)
}

/// A square yard with an interior divider wall rising from the bottom edge
/// to the yard center: the planner has to swing over the divider's top.
pub fn walled_yard() -> Scenario {
    // Yard spans [-2, 5] x [-2, 5] meters at 0.2m resolution.
    let (g_min, g_max) = (-10, 25);
    let (mut ox, mut oy) = bounding_frame(g_min, g_max, g_min, g_max);

    let center = (g_min + g_max) / 2;
    let divider_x = center + 2;
    for y in (g_min + 1)..=center {
        ox.push(divider_x);
        oy.push(y);
    }

    Scenario {
        name: "walled_yard",
        start: Pose2D::new(-0.5, 2.0, PI / 2.0),
        goal: Pose2D::new(3.0, 0.0, PI),
        ox,
        oy,
    }
}

/// Obstacle-free interior, border only. A straight run for the planner.
pub fn open_field() -> Scenario {
    let (ox, oy) = bounding_frame(-10, 30, -10, 10);
    Scenario {
        name: "open_field",
        start: Pose2D::new(0.0, 0.0, 0.0),
        goal: Pose2D::new(4.0, 0.0, 0.0),
        ox,
        oy,
    }
}

/// Turn in place: same position, opposite heading.
pub fn u_turn() -> Scenario {
    let (ox, oy) = bounding_frame(-10, 10, -10, 10);
    Scenario {
        name: "u_turn",
        start: Pose2D::new(0.0, 0.0, 0.0),
        goal: Pose2D::new(0.0, 0.0, PI),
        ox,
        oy,
    }
}

/// The goal sits inside a closed ring of obstacles with no gap the vehicle
/// fits through. Planning must fail.
pub fn sealed_goal() -> Scenario {
    let (mut ox, mut oy) = bounding_frame(-12, 12, -12, 12);
    for i in -6..=6_i32 {
        for j in -6..=6_i32 {
            let r = ((i * i + j * j) as f64).sqrt();
            if (4.5..=5.5).contains(&r) {
                ox.push(i);
                oy.push(j);
            }
        }
    }
    Scenario {
        name: "sealed_goal",
        start: Pose2D::new(-1.9, 0.0, 0.0),
        goal: Pose2D::new(0.0, 0.0, 0.0),
        ox,
        oy,
    }
}

/// Randomly scattered obstacle cells inside a framed square, keeping a
/// clear neighborhood around the start and goal poses.
pub fn scatter(seed: u64, count: usize) -> Scenario {
    let (g_min, g_max) = (-15, 15);
    let (mut ox, mut oy) = bounding_frame(g_min, g_max, g_min, g_max);

    let start = Pose2D::new(-2.0, -2.0, 0.0);
    let goal = Pose2D::new(2.0, 2.0, PI / 2.0);
    let keep_out = [(-10, -10), (10, 10)];

    let mut rng = StdRng::seed_from_u64(seed);
    let mut placed = 0;
    let mut attempts = 0;
    while placed < count && attempts < count * 10 {
        attempts += 1;
        let x = rng.gen_range((g_min + 2)..(g_max - 1));
        let y = rng.gen_range((g_min + 2)..(g_max - 1));
        let too_close = keep_out
            .iter()
            .any(|&(kx, ky)| ((x - kx).pow(2) + (y - ky).pow(2)) <= 36);
        if too_close {
            continue;
        }
        ox.push(x);
        oy.push(y);
        placed += 1;
    }

    Scenario {
        name: "scatter",
        start,
        goal,
        ox,
        oy,
    }
}

/// Scenario lookup used by the demo binary.
pub fn by_name(name: &str, seed: u64, num_obstacles: usize) -> Option<Scenario> {
    match name {
        "walled_yard" => Some(walled_yard()),
        "open_field" => Some(open_field()),
        "u_turn" => Some(u_turn()),
        "sealed_goal" => Some(sealed_goal()),
        "scatter" => Some(scatter(seed, num_obstacles)),
        _ => None,
    }
}
