use ordered_float::OrderedFloat;
use pathfinding::prelude::dijkstra_all;

use crate::grid::SpatialGrid;
use crate::obstacles::ObstacleField;

/// 8-connected neighborhood, cost of each move is its Euclidean length in
/// grid units.
const MOTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Obstacle-aware lower bound on travel cost, computed once per plan.
///
/// A Dijkstra sweep from the goal cell over the inflated 2D obstacle grid.
/// Entries are grid-unit distances; cells the sweep never reached stay at
/// infinity. Holonomic moves ignore the curvature constraint, so every
/// entry is a lower bound on the arc length of any feasible motion between
/// the same cells.
pub struct HolonomicHeuristic {
    costs: Vec<f64>,
    blocked: Vec<bool>,
    min_x: i32,
    min_y: i32,
    x_width: i32,
    y_width: i32,
    goal_blocked: bool,
}

impl HolonomicHeuristic {
    /// Computes the cost map from `goal_cell` outward.
    ///
    /// A cell is blocked when any obstacle point lies within
    /// `clearance_radius` of its center; blocked cells are never relaxed.
    pub fn compute(
        goal_cell: (i32, i32),
        grid: &SpatialGrid,
        obstacles: &ObstacleField,
        clearance_radius: f64,
    ) -> Self {
        let (x_width, y_width) = (grid.x_width, grid.y_width);
        let cells = (x_width * y_width).max(0) as usize;

        let mut blocked = vec![false; cells];
        for xi in 0..x_width {
            for yi in 0..y_width {
                let (wx, wy) = grid.world_of(xi + grid.min_x, yi + grid.min_y);
                if obstacles.any_within([wx, wy], clearance_radius) {
                    blocked[(xi * y_width + yi) as usize] = true;
                }
            }
        }

        let flat = |xi: i32, yi: i32| ((xi - grid.min_x) * y_width + (yi - grid.min_y)) as usize;
        let in_map = |xi: i32, yi: i32| grid.contains(xi, yi);
        let passable = |xi: i32, yi: i32| in_map(xi, yi) && !blocked[flat(xi, yi)];

        let goal_blocked = !in_map(goal_cell.0, goal_cell.1) || !passable(goal_cell.0, goal_cell.1);

        let reached = dijkstra_all(&goal_cell, |&(xi, yi)| {
            MOTIONS
                .iter()
                .map(move |&(dx, dy)| (xi + dx, yi + dy))
                .filter(|&(nx, ny)| passable(nx, ny))
                .map(|next| {
                    let cost = ((next.0 - xi) as f64).hypot((next.1 - yi) as f64);
                    (next, OrderedFloat(cost))
                })
                .collect::<Vec<_>>()
        });

        let mut costs = vec![f64::INFINITY; cells];
        if in_map(goal_cell.0, goal_cell.1) {
            costs[flat(goal_cell.0, goal_cell.1)] = 0.0;
        }
        for ((xi, yi), (_, cost)) in reached {
            costs[flat(xi, yi)] = cost.into_inner();
        }

        HolonomicHeuristic {
            costs,
            blocked,
            min_x: grid.min_x,
            min_y: grid.min_y,
            x_width,
            y_width,
            goal_blocked,
        }
    }

    /// Heuristic value for a planar grid index, infinity when unreachable
    /// or outside the map.
    pub fn cost_at(&self, xi: i32, yi: i32) -> f64 {
        let (cx, cy) = (xi - self.min_x, yi - self.min_y);
        if cx < 0 || cx >= self.x_width || cy < 0 || cy >= self.y_width {
            return f64::INFINITY;
        }
        self.costs[(cx * self.y_width + cy) as usize]
    }

    /// True when the cell is inside the inflated obstacle map.
    pub fn is_blocked(&self, xi: i32, yi: i32) -> bool {
        let (cx, cy) = (xi - self.min_x, yi - self.min_y);
        if cx < 0 || cx >= self.x_width || cy < 0 || cy >= self.y_width {
            return true;
        }
        self.blocked[(cx * self.y_width + cy) as usize]
    }

    /// True when the goal cell itself was blocked; no finite entry exists
    /// anywhere in that case except the goal's own zero.
    pub fn goal_blocked(&self) -> bool {
        self.goal_blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::SQRT_2;

    fn frame(half: i32) -> (Vec<i32>, Vec<i32>) {
        let mut ox = Vec::new();
        let mut oy = Vec::new();
        for i in -half..=half {
            for &j in &[-half, half] {
                ox.push(i);
                oy.push(j);
                ox.push(j);
                oy.push(i);
            }
        }
        (ox, oy)
    }

    fn build(ox: &[i32], oy: &[i32], goal: (i32, i32)) -> HolonomicHeuristic {
        let grid = SpatialGrid::from_obstacle_grid(ox, oy, 0.2, 15.0_f64.to_radians()).unwrap();
        let obstacles = ObstacleField::from_grid_coords(ox, oy, 0.2);
        HolonomicHeuristic::compute(goal, &grid, &obstacles, 0.4)
    }

    #[test]
    fn goal_cell_costs_zero() {
        let (ox, oy) = frame(20);
        let h = build(&ox, &oy, (0, 0));
        assert_eq!(h.cost_at(0, 0), 0.0);
    }

    #[test]
    fn open_map_matches_euclidean_up_to_octile_error() {
        let (ox, oy) = frame(20);
        let h = build(&ox, &oy, (0, 0));

        for &(xi, yi) in &[(10, 0), (7, 7), (-5, 10), (12, -3)] {
            let euclid = (xi as f64).hypot(yi as f64);
            let got = h.cost_at(xi, yi);
            assert!(got + 1e-9 >= euclid, "heuristic below Euclidean at ({xi},{yi})");
            assert!(
                got <= euclid + SQRT_2 + 1e-9,
                "heuristic {got} too far above Euclidean {euclid}"
            );
        }
    }

    #[test]
    fn cells_behind_a_wall_pay_the_detour() {
        // Vertical wall splitting the frame, gap near the top.
        let (mut ox, mut oy) = frame(20);
        for y in -20..=10 {
            ox.push(0);
            oy.push(y);
        }
        let h = build(&ox, &oy, (10, 0));

        let direct = 20.0;
        let detoured = h.cost_at(-10, 0);
        assert!(detoured.is_finite());
        assert!(
            detoured > direct + 5.0,
            "wall detour not reflected: {detoured}"
        );
    }

    #[test]
    fn adding_obstacles_never_lowers_costs() {
        let (ox, oy) = frame(20);
        let base = build(&ox, &oy, (0, 0));

        let (mut ox2, mut oy2) = (ox.clone(), oy.clone());
        for y in -10..=10 {
            ox2.push(5);
            oy2.push(y);
        }
        let denser = build(&ox2, &oy2, (0, 0));

        for xi in -19..=19 {
            for yi in -19..=19 {
                let a = base.cost_at(xi, yi);
                let b = denser.cost_at(xi, yi);
                assert!(b + 1e-9 >= a, "cost dropped at ({xi},{yi}): {a} -> {b}");
            }
        }
    }

    #[test]
    fn blocked_goal_is_reported() {
        let (mut ox, mut oy) = frame(20);
        ox.push(1);
        oy.push(0);
        let h = build(&ox, &oy, (0, 0)); // within 0.4m of the (1, 0) point
        assert!(h.goal_blocked());
    }

    #[test]
    fn unreached_cells_stay_infinite() {
        let (ox, oy) = frame(20);
        let h = build(&ox, &oy, (0, 0));
        // Cells hugging the frame are inside the inflation radius.
        assert!(h.cost_at(19, 19).is_infinite());
        assert!(h.is_blocked(19, 19));
    }
}
