use crate::config::VehicleGeometry;
use crate::geometry::{into_frame, Pose2D};
use crate::models::{MotionModel, VehicleState};
use crate::obstacles::ObstacleField;

/// Footprint-versus-obstacle test along simulated trajectory segments.
///
/// Each body is tested as an oriented rectangle against the obstacle points
/// returned by a radius query around the footprint center. The longitudinal
/// bound uses the circumscribed radius rather than the half-length; the
/// extra slack is intentional and matched by the tests.
pub struct CollisionChecker<'a> {
    obstacles: &'a ObstacleField,
    /// Extra clearance on every side, one grid cell.
    safety_margin: f64,
}

impl<'a> CollisionChecker<'a> {
    pub fn new(obstacles: &'a ObstacleField, safety_margin: f64) -> Self {
        CollisionChecker {
            obstacles,
            safety_margin,
        }
    }

    /// True when the body overlaps any obstacle point at `pose`.
    pub fn pose_blocked(&self, pose: &Pose2D, body: &VehicleGeometry) -> bool {
        let r = body.half_length().max(body.width / 2.0) + self.safety_margin;
        let dl = body.center_offset();

        let cx = pose.x + dl * pose.yaw.cos();
        let cy = pose.y + dl * pose.yaw.sin();

        for point in self.obstacles.neighbors_within([cx, cy], r) {
            let (dx, dy) = into_frame(point[0] - cx, point[1] - cy, pose.yaw);
            if dx.abs() < r && dy.abs() < body.width / 2.0 + self.safety_margin {
                return true;
            }
        }
        false
    }

    /// True when any checked sample of the segment is blocked. Samples are
    /// tested every `stride`-th state, starting at the first.
    pub fn segment_blocked(
        &self,
        states: &[VehicleState],
        model: &dyn MotionModel,
        stride: usize,
    ) -> bool {
        for state in states.iter().step_by(stride.max(1)) {
            let poses = model.footprint_poses(state);
            for (pose, body) in poses.iter().zip(model.bodies()) {
                if self.pose_blocked(pose, body) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleGeometry;
    use crate::models::SingleTrackModel;
    use std::f64::consts::PI;

    fn field_with_point(x_grid: i32, y_grid: i32) -> ObstacleField {
        ObstacleField::from_grid_coords(&[x_grid], &[y_grid], 0.2)
    }

    #[test]
    fn obstacle_inside_footprint_is_hit() {
        let field = field_with_point(1, 0); // (0.2, 0.0)
        let checker = CollisionChecker::new(&field, 0.2);
        let body = VehicleGeometry::default();

        assert!(checker.pose_blocked(&Pose2D::new(0.0, 0.0, 0.0), &body));
    }

    #[test]
    fn distant_obstacle_is_clear() {
        let field = field_with_point(10, 10); // (2.0, 2.0)
        let checker = CollisionChecker::new(&field, 0.2);
        let body = VehicleGeometry::default();

        assert!(!checker.pose_blocked(&Pose2D::new(0.0, 0.0, 0.0), &body));
    }

    #[test]
    fn lateral_clearance_respects_orientation() {
        // Obstacle 0.8m to the side of the body axis: outside the lateral
        // bound (0.3 + 0.2) but within the circumscribed query radius only
        // when the vehicle turns toward it.
        let field = field_with_point(0, 4); // (0.0, 0.8)
        let checker = CollisionChecker::new(&field, 0.2);
        let body = VehicleGeometry::default();

        assert!(!checker.pose_blocked(&Pose2D::new(0.0, 0.0, 0.0), &body));
        assert!(checker.pose_blocked(&Pose2D::new(0.0, 0.2, PI / 2.0), &body));
    }

    #[test]
    fn stride_still_checks_first_sample() {
        let field = field_with_point(0, 0);
        let checker = CollisionChecker::new(&field, 0.2);
        let model = SingleTrackModel::new(VehicleGeometry::default());
        let states = vec![VehicleState::from_pose(Pose2D::new(0.0, 0.0, 0.0))];

        assert!(checker.segment_blocked(&states, &model, 2));
    }
}
