use clap::Parser;

use crate::errors::PlanningError;

/// Command-line options for the demo planner binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliConfig {
    /// Scenario to plan: walled_yard, open_field, u_turn, sealed_goal, scatter
    #[arg(long, default_value = "walled_yard")]
    pub scenario: String,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of scattered obstacle points for the scatter scenario
    #[arg(long, default_value_t = 40)]
    pub num_obstacles: usize,

    /// Override the gear-switch penalty
    #[arg(long)]
    pub gear_cost: Option<f64>,

    /// Plan with the tractor-trailer motion model instead of the single-track one
    #[arg(long, default_value_t = false)]
    pub trailer: bool,

    #[arg(long, default_value_t = false)]
    pub no_render: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

/// Rigid-body outline of one vehicle body, measured from the rear axle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleGeometry {
    /// Bounding-circle radius used to inflate the holonomic obstacle map [m].
    pub radius: f64,
    /// Distance from the rear axle to the front end [m].
    pub front_length: f64,
    /// Distance from the rear axle to the back end [m].
    pub back_length: f64,
    /// Body width [m].
    pub width: f64,
    /// Wheel base [m].
    pub wheel_base: f64,
}

impl Default for VehicleGeometry {
    fn default() -> Self {
        VehicleGeometry {
            radius: 0.4,
            front_length: 0.6,
            back_length: 0.2,
            width: 0.6,
            wheel_base: 0.6,
        }
    }
}

impl VehicleGeometry {
    /// Half of the body length.
    pub fn half_length(&self) -> f64 {
        (self.front_length + self.back_length) / 2.0
    }

    /// Longitudinal offset of the body center forward of the rear axle.
    pub fn center_offset(&self) -> f64 {
        (self.front_length - self.back_length) / 2.0
    }

    fn validate(&self) -> Result<(), PlanningError> {
        if !(self.front_length + self.back_length > 0.0) {
            return Err(PlanningError::InvalidVehicle(
                "front_length + back_length must be positive",
            ));
        }
        if !(self.width > 0.0) {
            return Err(PlanningError::InvalidVehicle("width must be positive"));
        }
        if !(self.radius > 0.0) {
            return Err(PlanningError::InvalidVehicle("radius must be positive"));
        }
        Ok(())
    }
}

/// Immutable parameter set consumed by one planning request.
///
/// Costs are dimensional; the caller keeps units consistent between poses,
/// obstacle coordinates and these parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Lattice resolution in x and y [m].
    pub xy_resolution: f64,
    /// Lattice resolution in yaw [rad].
    pub yaw_resolution: f64,
    /// Sample spacing along simulated segments [m].
    pub move_step: f64,
    /// Number of angular-velocity samples on each side of zero.
    pub n_steer: usize,
    /// Steering bounds [rad per unit arc].
    pub max_angular_velocity: f64,
    pub min_angular_velocity: f64,
    /// Turning radius handed to the Reeds-Shepp generator [m].
    pub turning_radius: f64,
    /// Collision-check every k-th sample of a segment.
    pub collision_check_step: usize,
    /// Penalty for switching gear.
    pub gear_cost: f64,
    /// Multiplier on arc length driven in reverse.
    pub backward_cost: f64,
    /// Penalty per unit change of the steering term between segments.
    pub steer_change_cost: f64,
    /// Weight on the holonomic heuristic. Values above 1 trade optimality
    /// for speed: returned paths are bounded-suboptimal by this factor.
    pub heuristic_weight: f64,
    pub vehicle: VehicleGeometry,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            xy_resolution: 0.2,
            yaw_resolution: 15.0_f64.to_radians(),
            move_step: 0.2,
            n_steer: 10,
            max_angular_velocity: 0.5,
            min_angular_velocity: -0.5,
            turning_radius: 0.5,
            collision_check_step: 2,
            gear_cost: 100.0,
            backward_cost: 50.0,
            steer_change_cost: 2.0,
            heuristic_weight: 10.0,
            vehicle: VehicleGeometry::default(),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), PlanningError> {
        for reso in [self.xy_resolution, self.yaw_resolution, self.move_step] {
            if !(reso > 0.0) || !reso.is_finite() {
                return Err(PlanningError::InvalidResolution(reso));
            }
        }
        if !(self.turning_radius > 0.0) {
            return Err(PlanningError::InvalidResolution(self.turning_radius));
        }
        if self.n_steer == 0 {
            return Err(PlanningError::InvalidVehicle("n_steer must be at least 1"));
        }
        if self.collision_check_step == 0 {
            return Err(PlanningError::InvalidVehicle(
                "collision_check_step must be at least 1",
            ));
        }
        self.vehicle.validate()
    }
}
