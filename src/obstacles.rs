use rstar::RTree;

/// Spatial index over the obstacle point set.
///
/// Built once per planning request and read-only afterwards; radius queries
/// answer in logarithmic average time.
pub struct ObstacleField {
    tree: RTree<[f64; 2]>,
    len: usize,
}

impl ObstacleField {
    /// Builds the index from integer grid coordinates, scaling them into
    /// world units.
    pub fn from_grid_coords(ox_grid: &[i32], oy_grid: &[i32], xy_resolution: f64) -> Self {
        let points: Vec<[f64; 2]> = ox_grid
            .iter()
            .zip(oy_grid)
            .map(|(&x, &y)| [x as f64 * xy_resolution, y as f64 * xy_resolution])
            .collect();
        let len = points.len();
        ObstacleField {
            tree: RTree::bulk_load(points),
            len,
        }
    }

    /// All obstacle points within `radius` of `center`.
    pub fn neighbors_within(
        &self,
        center: [f64; 2],
        radius: f64,
    ) -> impl Iterator<Item = &[f64; 2]> {
        self.tree.locate_within_distance(center, radius * radius)
    }

    /// True when any obstacle point lies within `radius` of `center`.
    pub fn any_within(&self, center: [f64; 2], radius: f64) -> bool {
        self.neighbors_within(center, radius).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_query_finds_only_nearby_points() {
        let ox = vec![0, 10, 20];
        let oy = vec![0, 0, 0];
        let field = ObstacleField::from_grid_coords(&ox, &oy, 0.2);

        let near: Vec<_> = field.neighbors_within([0.1, 0.0], 0.5).collect();
        assert_eq!(near.len(), 1);
        assert_eq!(*near[0], [0.0, 0.0]);

        assert!(field.any_within([2.0, 0.1], 0.2));
        assert!(!field.any_within([1.0, 0.0], 0.5));
    }

    #[test]
    fn boundary_distance_is_inclusive() {
        let field = ObstacleField::from_grid_coords(&[5], &[0], 0.2);
        // Point at exactly 1.0m from the query center.
        assert!(field.any_within([0.0, 0.0], 1.0));
    }
}
