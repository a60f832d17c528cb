//! Kinodynamic pathfinding for car-like vehicles.
//!
//! A Hybrid A* planner: the search expands lattice cells in (x, y, yaw) by
//! forward-simulating a motion model under discrete steering primitives,
//! guides itself with an obstacle-aware 2D Dijkstra heuristic, and tries a
//! Reeds-Shepp shortcut to the goal at every iteration. Collision checking
//! runs oriented-rectangle footprints against an R-tree of obstacle points.

pub mod collision;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod grid;
pub mod heuristic;
pub mod models;
pub mod obstacles;
pub mod planner;
pub mod reeds_shepp;
pub mod scenario;
pub mod statistics;

pub use config::{PlannerConfig, VehicleGeometry};
pub use errors::PlanningError;
pub use geometry::Pose2D;
pub use models::{Gear, MotionModel, SingleTrackModel, TractorTrailerModel, VehicleState};
pub use planner::{HybridAStarPlanner, Path};
