//! Hybrid A* search over the (x, y, yaw) lattice.
//!
//! States expand by forward-simulating the motion model under a discrete
//! primitive set; a Reeds-Shepp shortcut to the goal is attempted at every
//! iteration and ends the search as soon as one is collision-free.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use log::debug;
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use crate::collision::CollisionChecker;
use crate::config::PlannerConfig;
use crate::errors::PlanningError;
use crate::geometry::{wrap_angle, Pose2D};
use crate::grid::{Cell, SpatialGrid};
use crate::heuristic::HolonomicHeuristic;
use crate::models::{Gear, MotionModel, SingleTrackModel, VehicleState};
use crate::obstacles::ObstacleField;
use crate::reeds_shepp::{calc_all_paths, RsPath};

/// A planned trajectory: parallel pose and gear sequences plus the
/// accumulated cost of the winning search chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yaw: Vec<f64>,
    pub direction: Vec<Gear>,
    pub cost: f64,
}

impl Path {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn pose(&self, i: usize) -> Pose2D {
        Pose2D::new(self.x[i], self.y[i], self.yaw[i])
    }

    /// Sum of chord lengths between consecutive samples.
    pub fn arc_length(&self) -> f64 {
        (1..self.len())
            .map(|i| (self.x[i] - self.x[i - 1]).hypot(self.y[i] - self.y[i - 1]))
            .sum()
    }
}

/// One lattice cell of the search tree.
struct SearchNode {
    cell: Cell,
    gear: Gear,
    /// Samples from the parent's terminus to this cell's terminus.
    states: Vec<VehicleState>,
    /// Per-sample gear, parallel to `states`.
    gears: Vec<Gear>,
    /// Steering term that produced this node.
    steer: f64,
    /// Accumulated cost from the start node.
    cost: f64,
    parent: Option<Cell>,
}

impl SearchNode {
    fn terminal_state(&self) -> VehicleState {
        self.states[self.states.len() - 1]
    }
}

/// Hybrid A* planner facade.
///
/// Owns the configuration and the motion model; each [`plan`] call builds
/// its own spatial parameters, obstacle index and heuristic, and releases
/// them on return. Planning is deterministic for identical inputs.
///
/// [`plan`]: HybridAStarPlanner::plan
pub struct HybridAStarPlanner {
    config: PlannerConfig,
    model: Box<dyn MotionModel>,
}

impl HybridAStarPlanner {
    /// Planner with the single-track model built from the configured
    /// vehicle geometry.
    pub fn new(config: PlannerConfig) -> Result<Self, PlanningError> {
        config.validate()?;
        let model = Box::new(SingleTrackModel::new(config.vehicle));
        Ok(HybridAStarPlanner { config, model })
    }

    /// Planner with a caller-supplied motion model.
    pub fn with_model(
        config: PlannerConfig,
        model: Box<dyn MotionModel>,
    ) -> Result<Self, PlanningError> {
        config.validate()?;
        Ok(HybridAStarPlanner { config, model })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans from `start` to `goal` through the obstacle field given as
    /// integer grid coordinates of occupied cells.
    pub fn plan(
        &self,
        start: Pose2D,
        goal: Pose2D,
        ox_grid: &[i32],
        oy_grid: &[i32],
    ) -> Result<Path, PlanningError> {
        self.plan_with_cancel(start, goal, ox_grid, oy_grid, None)
    }

    /// Like [`plan`], but checks `cancel` once per search iteration and
    /// returns [`PlanningError::Cancelled`] as soon as it is set.
    ///
    /// [`plan`]: HybridAStarPlanner::plan
    pub fn plan_with_cancel(
        &self,
        start: Pose2D,
        goal: Pose2D,
        ox_grid: &[i32],
        oy_grid: &[i32],
        cancel: Option<&AtomicBool>,
    ) -> Result<Path, PlanningError> {
        if !start.is_finite() || !goal.is_finite() {
            return Err(PlanningError::NonFinitePose);
        }
        let start = Pose2D::new(start.x, start.y, wrap_angle(start.yaw));
        let goal = Pose2D::new(goal.x, goal.y, wrap_angle(goal.yaw));

        let grid = SpatialGrid::from_obstacle_grid(
            ox_grid,
            oy_grid,
            self.config.xy_resolution,
            self.config.yaw_resolution,
        )?;

        let start_cell = grid.cell_of(&start);
        let goal_cell = grid.cell_of(&goal);
        if !grid.contains(start_cell.xi, start_cell.yi) {
            return Err(PlanningError::PoseOutOfBounds { which: "start" });
        }
        if !grid.contains(goal_cell.xi, goal_cell.yi) {
            return Err(PlanningError::PoseOutOfBounds { which: "goal" });
        }

        let obstacles =
            ObstacleField::from_grid_coords(ox_grid, oy_grid, self.config.xy_resolution);
        let checker = CollisionChecker::new(&obstacles, self.config.xy_resolution);

        let start_state = VehicleState::from_pose(start);
        let goal_state = VehicleState::from_pose(goal);
        if checker.segment_blocked(&[start_state], self.model.as_ref(), 1) {
            return Err(PlanningError::PoseInCollision { which: "start" });
        }
        if checker.segment_blocked(&[goal_state], self.model.as_ref(), 1) {
            return Err(PlanningError::PoseInCollision { which: "goal" });
        }

        if start_cell == goal_cell {
            // Degenerate request: already there up to lattice resolution.
            return Ok(Path {
                x: vec![start.x],
                y: vec![start.y],
                yaw: vec![start.yaw],
                direction: vec![Gear::Forward],
                cost: 0.0,
            });
        }

        let heuristic = HolonomicHeuristic::compute(
            (goal_cell.xi, goal_cell.yi),
            &grid,
            &obstacles,
            self.config.vehicle.radius,
        );
        if heuristic.goal_blocked() {
            debug!("goal cell is inside the inflated obstacle map");
            return Err(PlanningError::NoPath);
        }

        self.search(
            start_state, start_cell, goal, &grid, &checker, &heuristic, cancel,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn search(
        &self,
        start_state: VehicleState,
        start_cell: Cell,
        goal: Pose2D,
        grid: &SpatialGrid,
        checker: &CollisionChecker,
        heuristic: &HolonomicHeuristic,
        cancel: Option<&AtomicBool>,
    ) -> Result<Path, PlanningError> {
        let cfg = &self.config;
        let primitives = motion_primitives(cfg);

        let mut open: FxHashMap<Cell, SearchNode> = FxHashMap::default();
        let mut closed: FxHashMap<Cell, SearchNode> = FxHashMap::default();
        // Min-heap over (f, insertion sequence); stale entries are skipped
        // on pop, so the heap always mirrors the open set's keys.
        let mut queue: BinaryHeap<std::cmp::Reverse<(OrderedFloat<f64>, u64, Cell)>> =
            BinaryHeap::new();
        let mut seq: u64 = 0;

        let root = SearchNode {
            cell: start_cell,
            gear: Gear::Forward,
            states: vec![start_state],
            gears: vec![Gear::Forward],
            steer: 0.0,
            cost: 0.0,
            parent: None,
        };
        let root_f = self.f_value(&root, heuristic);
        queue.push(std::cmp::Reverse((OrderedFloat(root_f), seq, start_cell)));
        open.insert(start_cell, root);

        let mut iterations: usize = 0;
        loop {
            if let Some(flag) = cancel {
                if flag.load(AtomicOrdering::Relaxed) {
                    return Err(PlanningError::Cancelled);
                }
            }
            iterations += 1;

            // Pop the lowest-f key still present in the open set.
            let (cell, current) = loop {
                let Some(std::cmp::Reverse((_, _, cell))) = queue.pop() else {
                    return Err(PlanningError::NoPath);
                };
                if let Some(node) = open.remove(&cell) {
                    break (cell, node);
                }
            };

            if let Some(rs_path) = self.analytic_expansion(&current, &goal, grid, checker) {
                debug!("reeds-shepp shortcut accepted after {iterations} iterations");
                let terminal = self.terminal_node(&current, &rs_path);
                closed.insert(cell, current);
                return extract_path(&closed, terminal);
            }

            for &(u, gear) in &primitives {
                let Some(child) = self.next_node(&current, u, gear, grid, checker) else {
                    continue;
                };
                if closed.contains_key(&child.cell) {
                    continue;
                }

                let f = self.f_value(&child, heuristic);
                match open.entry(child.cell) {
                    Entry::Vacant(slot) => {
                        seq += 1;
                        queue.push(std::cmp::Reverse((OrderedFloat(f), seq, child.cell)));
                        slot.insert(child);
                    }
                    Entry::Occupied(mut slot) => {
                        if slot.get().cost > child.cost {
                            seq += 1;
                            queue.push(std::cmp::Reverse((OrderedFloat(f), seq, child.cell)));
                            slot.insert(child);
                        }
                    }
                }
            }

            closed.insert(cell, current);
        }
    }

    fn f_value(&self, node: &SearchNode, heuristic: &HolonomicHeuristic) -> f64 {
        node.cost + self.config.heuristic_weight * heuristic.cost_at(node.cell.xi, node.cell.yi)
    }

    /// Applies one control primitive from the node's terminal state.
    /// Returns `None` when the segment leaves the lattice or collides.
    fn next_node(
        &self,
        current: &SearchNode,
        u: f64,
        gear: Gear,
        grid: &SpatialGrid,
        checker: &CollisionChecker,
    ) -> Option<SearchNode> {
        let cfg = &self.config;
        let step = 2.0 * cfg.xy_resolution;
        let n = (step / cfg.move_step).ceil() as usize;

        let simulated = self
            .model
            .integrate_primitive(&current.terminal_state(), u, gear, cfg.move_step, n);
        let states: Vec<VehicleState> = simulated[1..].to_vec();

        let cell = grid.cell_of(&states[states.len() - 1].pose);
        if !grid.contains(cell.xi, cell.yi) {
            return None;
        }
        if checker.segment_blocked(&states, self.model.as_ref(), cfg.collision_check_step) {
            return None;
        }

        let mut cost = match gear {
            Gear::Forward => step,
            Gear::Reverse => step * cfg.backward_cost,
        };
        if gear != current.gear {
            cost += cfg.gear_cost;
        }
        cost += cfg.steer_change_cost * (current.steer - u).abs();

        Some(SearchNode {
            cell,
            gear,
            gears: vec![gear; states.len()],
            states,
            steer: u,
            cost: current.cost + cost,
            parent: Some(current.cell),
        })
    }

    /// Tries to shortcut straight to the goal with a Reeds-Shepp path.
    /// Candidates are scored with [`rs_cost`] and the cheapest
    /// collision-free one wins.
    ///
    /// [`rs_cost`]: HybridAStarPlanner::rs_cost
    fn analytic_expansion(
        &self,
        current: &SearchNode,
        goal: &Pose2D,
        grid: &SpatialGrid,
        checker: &CollisionChecker,
    ) -> Option<RsPath> {
        let from = current.terminal_state();
        let paths = calc_all_paths(
            &from.pose,
            goal,
            self.config.turning_radius,
            self.config.move_step,
        );
        if paths.is_empty() {
            return None;
        }

        let mut scored: Vec<(f64, RsPath)> =
            paths.into_iter().map(|p| (self.rs_cost(&p), p)).collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .map(|(_, path)| path)
            .find(|path| self.rs_path_clear(path, from.hitch, grid, checker))
    }

    /// Collision and bounds check over a sampled Reeds-Shepp candidate.
    /// A sample outside the lattice counts as blocked.
    fn rs_path_clear(
        &self,
        path: &RsPath,
        hitch: f64,
        grid: &SpatialGrid,
        checker: &CollisionChecker,
    ) -> bool {
        let stride = self.config.collision_check_step.max(1);
        for i in (0..path.len()).step_by(stride) {
            let pose = Pose2D::new(path.x[i], path.y[i], path.yaw[i]);
            let cell = grid.cell_of(&pose);
            if !grid.contains(cell.xi, cell.yi) {
                return false;
            }
            let state = VehicleState { pose, hitch };
            if checker.segment_blocked(&[state], self.model.as_ref(), 1) {
                return false;
            }
        }
        true
    }

    /// Cost of a Reeds-Shepp candidate under the planner's cost shaping:
    /// reverse arcs are scaled up and every cusp pays the gear penalty.
    fn rs_cost(&self, path: &RsPath) -> f64 {
        let cfg = &self.config;
        let mut cost = 0.0;
        for &length in &path.lengths {
            if length >= 0.0 {
                cost += length;
            } else {
                cost += length.abs() * cfg.backward_cost;
            }
        }
        for pair in path.lengths.windows(2) {
            if pair[0] * pair[1] < 0.0 {
                cost += cfg.gear_cost;
            }
        }
        cost
    }

    /// Terminal node holding the accepted shortcut. Shares the current
    /// node's cell and points back at it; the first shortcut sample is the
    /// current terminus and is dropped to avoid duplication.
    fn terminal_node(&self, current: &SearchNode, rs_path: &RsPath) -> SearchNode {
        let hitch = current.terminal_state().hitch;
        let states: Vec<VehicleState> = (1..rs_path.len())
            .map(|i| VehicleState {
                pose: Pose2D::new(rs_path.x[i], rs_path.y[i], rs_path.yaw[i]),
                hitch,
            })
            .collect();
        let gears = rs_path.directions[1..].to_vec();

        SearchNode {
            cell: current.cell,
            gear: current.gear,
            states,
            gears,
            steer: 0.0,
            cost: current.cost + self.rs_cost(rs_path),
            parent: Some(current.cell),
        }
    }
}

/// The symmetric primitive set: `n_steer` samples swept across the
/// steering range, zero appended, the whole set mirrored, and every
/// steering value paired with both gears.
fn motion_primitives(cfg: &PlannerConfig) -> Vec<(f64, Gear)> {
    let span = cfg.max_angular_velocity - cfg.min_angular_velocity;
    let base: Vec<f64> = (0..cfg.n_steer)
        .map(|i| cfg.min_angular_velocity + i as f64 * span / cfg.n_steer as f64)
        .collect();

    let mut steer = base.clone();
    steer.push(0.0);
    steer.extend(base.iter().map(|u| -u));

    let mut primitives = Vec::with_capacity(2 * steer.len());
    for gear in [Gear::Forward, Gear::Reverse] {
        for &u in &steer {
            primitives.push((u, gear));
        }
    }
    primitives
}

/// Walks parent links from the terminal node back to the root and stitches
/// the stored segments into one forward path.
fn extract_path(
    closed: &FxHashMap<Cell, SearchNode>,
    terminal: SearchNode,
) -> Result<Path, PlanningError> {
    let cost = terminal.cost;
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut yaw = Vec::new();
    let mut direction = Vec::new();

    let mut node = &terminal;
    loop {
        for (state, gear) in node.states.iter().zip(&node.gears).rev() {
            x.push(state.pose.x);
            y.push(state.pose.y);
            yaw.push(state.pose.yaw);
            direction.push(*gear);
        }
        match node.parent {
            Some(parent_cell) => {
                node = closed
                    .get(&parent_cell)
                    .ok_or(PlanningError::NoPath)?;
            }
            None => break,
        }
    }

    x.reverse();
    y.reverse();
    yaw.reverse();
    direction.reverse();

    // The root's gear is a placeholder; take it from the first real move.
    if direction.len() >= 2 {
        direction[0] = direction[1];
    }

    Ok(Path {
        x,
        y,
        yaw,
        direction,
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_set_is_symmetric_and_sized() {
        let cfg = PlannerConfig::default();
        let prims = motion_primitives(&cfg);
        assert_eq!(prims.len(), 2 * (2 * cfg.n_steer + 1));

        let forward: Vec<f64> = prims
            .iter()
            .filter(|(_, g)| *g == Gear::Forward)
            .map(|(u, _)| *u)
            .collect();
        // Every steering value has its mirror in the set.
        for &u in &forward {
            assert!(forward.iter().any(|&v| (v + u).abs() < 1e-12));
        }
    }

    #[test]
    fn rs_cost_penalizes_reverse_and_cusps() {
        let planner = HybridAStarPlanner::new(PlannerConfig::default()).unwrap();
        let mut path = RsPath {
            lengths: vec![1.0, -0.5, 2.0],
            kinds: vec![
                crate::reeds_shepp::SegmentKind::Left,
                crate::reeds_shepp::SegmentKind::Straight,
                crate::reeds_shepp::SegmentKind::Left,
            ],
            total_length: 3.5,
            x: vec![],
            y: vec![],
            yaw: vec![],
            directions: vec![],
        };
        // 1.0 + 0.5 * 50 + 2.0, plus two cusps at 100 each.
        assert_eq!(planner.rs_cost(&path), 228.0);

        path.lengths = vec![1.0, 0.5];
        assert_eq!(planner.rs_cost(&path), 1.5);
    }

    #[test]
    fn rs_cost_scales_linearly_with_gear_penalty() {
        let mut cfg = PlannerConfig::default();
        let base = HybridAStarPlanner::new(cfg.clone()).unwrap();
        cfg.gear_cost += 1000.0;
        let bumped = HybridAStarPlanner::new(cfg).unwrap();

        let path = RsPath {
            lengths: vec![0.5, -0.5, 0.5],
            kinds: vec![
                crate::reeds_shepp::SegmentKind::Left,
                crate::reeds_shepp::SegmentKind::Right,
                crate::reeds_shepp::SegmentKind::Left,
            ],
            total_length: 1.5,
            x: vec![],
            y: vec![],
            yaw: vec![],
            directions: vec![],
        };
        assert_eq!(bumped.rs_cost(&path) - base.rs_cost(&path), 2000.0);
    }
}
