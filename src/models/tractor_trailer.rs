use crate::config::VehicleGeometry;
use crate::errors::PlanningError;
use crate::geometry::{wrap_angle, Pose2D};
use crate::models::common::{Gear, MotionModel, VehicleState};

/// Tractor pulling a single trailer through a passive hitch joint.
///
/// The planner-facing state is the tractor pose plus the hitch angle
/// `gamma = trailer_yaw - tractor_yaw`; the full 6-component state
/// (both body poses) is also accepted by [`dynamics`].
///
/// [`dynamics`]: TractorTrailerModel::dynamics
pub struct TractorTrailerModel {
    bodies: [VehicleGeometry; 2],
    /// Tractor center to hitch point [m].
    hitch_to_tractor: f64,
    /// Trailer center to hitch point [m].
    hitch_to_trailer: f64,
}

impl TractorTrailerModel {
    pub fn new(
        tractor: VehicleGeometry,
        trailer: VehicleGeometry,
        hitch_to_tractor: f64,
        hitch_to_trailer: f64,
    ) -> Result<Self, PlanningError> {
        if !(hitch_to_trailer > 0.0) {
            return Err(PlanningError::InvalidVehicle(
                "hitch_to_trailer must be positive",
            ));
        }
        if hitch_to_tractor < 0.0 {
            return Err(PlanningError::InvalidVehicle(
                "hitch_to_tractor must be non-negative",
            ));
        }
        Ok(TractorTrailerModel {
            bodies: [tractor, trailer],
            hitch_to_tractor,
            hitch_to_trailer,
        })
    }

    /// Time derivative of the state under input `(v, w)`.
    ///
    /// Accepts the 4-component state `(x1, y1, theta1, gamma)` or the
    /// 6-component state `(x1, y1, theta1, x2, y2, theta2)`.
    pub fn dynamics(&self, state: &[f64], input: [f64; 2]) -> Result<Vec<f64>, PlanningError> {
        let [v, w] = input;
        let lb = self.hitch_to_tractor;
        let lf = self.hitch_to_trailer;

        match state {
            [x1, y1, theta1, gamma] => {
                let d = self.dynamics4(&[*x1, *y1, *theta1, *gamma], input);
                Ok(d.to_vec())
            }
            [_, _, theta1, _, _, theta2] => {
                let gamma = theta2 - theta1;
                let (sin_g, cos_g) = gamma.sin_cos();
                Ok(vec![
                    v * theta1.cos(),
                    v * theta1.sin(),
                    w,
                    v * theta2.cos() * cos_g - w * lb * theta2.cos() * sin_g,
                    v * theta2.sin() * cos_g - w * lb * theta2.sin() * sin_g,
                    -v * sin_g / lf - w * (lb / lf) * cos_g,
                ])
            }
            _ => Err(PlanningError::StateSizeMismatch {
                expected: self.state_size(),
                actual: state.len(),
            }),
        }
    }

    /// Derivative of the reduced `(x1, y1, theta1, gamma)` state.
    fn dynamics4(&self, state: &[f64; 4], input: [f64; 2]) -> [f64; 4] {
        let [v, w] = input;
        let theta1 = state[2];
        let (sin_g, cos_g) = state[3].sin_cos();
        let lb = self.hitch_to_tractor;
        let lf = self.hitch_to_trailer;
        [
            v * theta1.cos(),
            v * theta1.sin(),
            w,
            -v * sin_g / lf - w * (lb / lf * cos_g + 1.0),
        ]
    }

    /// One 4th-order Runge-Kutta step of size `h`.
    fn rk4_step(&self, state: &[f64; 4], input: [f64; 2], h: f64) -> [f64; 4] {
        let eval = |s: &[f64; 4]| -> [f64; 4] { self.dynamics4(s, input) };
        let shift = |s: &[f64; 4], k: &[f64; 4], f: f64| -> [f64; 4] {
            [
                s[0] + f * k[0],
                s[1] + f * k[1],
                s[2] + f * k[2],
                s[3] + f * k[3],
            ]
        };

        let k1 = eval(state);
        let k2 = eval(&shift(state, &k1, 0.5 * h));
        let k3 = eval(&shift(state, &k2, 0.5 * h));
        let k4 = eval(&shift(state, &k3, h));

        let mut next = *state;
        for i in 0..4 {
            next[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }
        next
    }

    /// Trailer pose implied by the tractor pose and hitch angle.
    pub fn trailer_pose(&self, state: &VehicleState) -> Pose2D {
        let theta1 = state.pose.yaw;
        let theta2 = wrap_angle(theta1 + state.hitch);
        Pose2D {
            x: state.pose.x - self.hitch_to_tractor * theta1.cos() - self.hitch_to_trailer * theta2.cos(),
            y: state.pose.y - self.hitch_to_tractor * theta1.sin() - self.hitch_to_trailer * theta2.sin(),
            yaw: theta2,
        }
    }
}

impl MotionModel for TractorTrailerModel {
    fn state_size(&self) -> usize {
        4
    }

    fn integrate_primitive(
        &self,
        start: &VehicleState,
        u: f64,
        gear: Gear,
        step: f64,
        n: usize,
    ) -> Vec<VehicleState> {
        let d = gear.signum();
        // Unit longitudinal speed makes the time step equal the arc step.
        let input = [d, d * u];

        let mut states = Vec::with_capacity(n + 1);
        states.push(*start);

        let mut s = [start.pose.x, start.pose.y, start.pose.yaw, start.hitch];
        for _ in 0..n {
            s = self.rk4_step(&s, input, step);
            s[2] = wrap_angle(s[2]);
            s[3] = wrap_angle(s[3]);
            states.push(VehicleState {
                pose: Pose2D::new(s[0], s[1], s[2]),
                hitch: s[3],
            });
        }
        states
    }

    fn bodies(&self) -> &[VehicleGeometry] {
        &self.bodies
    }

    fn footprint_poses(&self, state: &VehicleState) -> Vec<Pose2D> {
        vec![state.pose, self.trailer_pose(state)]
    }
}
