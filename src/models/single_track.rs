use crate::config::VehicleGeometry;
use crate::geometry::wrap_angle;
use crate::models::common::{Gear, MotionModel, VehicleState};

/// Bicycle-like single-body model.
///
/// The state advances by arc length: one step of `step` meters moves the
/// rear axle along the heading and turns the heading by `step * u`.
pub struct SingleTrackModel {
    bodies: [VehicleGeometry; 1],
}

impl SingleTrackModel {
    pub fn new(geometry: VehicleGeometry) -> Self {
        SingleTrackModel { bodies: [geometry] }
    }
}

impl MotionModel for SingleTrackModel {
    fn state_size(&self) -> usize {
        3
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
        let mut states = Vec::with_capacity(n + 1);
        states.push(*start);

        let mut pose = start.pose;
        for _ in 0..n {
            pose.x += d * step * pose.yaw.cos();
            pose.y += d * step * pose.yaw.sin();
            pose.yaw = wrap_angle(pose.yaw + d * step * u);
            states.push(VehicleState {
                pose,
                hitch: start.hitch,
            });
        }
        states
    }

    fn bodies(&self) -> &[VehicleGeometry] {
        &self.bodies
    }

    fn footprint_poses(&self, state: &VehicleState) -> Vec<crate::geometry::Pose2D> {
        vec![state.pose]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Pose2D;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn model() -> SingleTrackModel {
        SingleTrackModel::new(VehicleGeometry::default())
    }

    #[test]
    fn straight_forward_advances_along_heading() {
        let start = VehicleState::from_pose(Pose2D::new(1.0, 2.0, PI / 2.0));
        let states = model().integrate_primitive(&start, 0.0, Gear::Forward, 0.2, 3);

        assert_eq!(states.len(), 4);
        assert_eq!(states[0], start);
        let last = states[3].pose;
        assert_relative_eq!(last.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(last.y, 2.6, epsilon = 1e-12);
        assert_relative_eq!(last.yaw, PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn reverse_mirrors_forward() {
        let start = VehicleState::from_pose(Pose2D::new(0.0, 0.0, 0.0));
        let fwd = model().integrate_primitive(&start, 0.3, Gear::Forward, 0.2, 2);
        let rev = model().integrate_primitive(&start, 0.3, Gear::Reverse, 0.2, 2);

        assert_relative_eq!(fwd[1].pose.x, -rev[1].pose.x, epsilon = 1e-12);
        assert_relative_eq!(fwd[2].pose.yaw, -rev[2].pose.yaw, epsilon = 1e-12);
    }

    #[test]
    fn heading_stays_wrapped() {
        let start = VehicleState::from_pose(Pose2D::new(0.0, 0.0, 3.0));
        let states = model().integrate_primitive(&start, 0.5, Gear::Forward, 0.2, 50);
        for s in &states {
            assert!(s.pose.yaw > -PI && s.pose.yaw <= PI);
        }
    }
}
