use std::fmt;

use crate::models::Gear;
use crate::planner::Path;

/// Summary figures for a planned path.
#[derive(Debug, Clone)]
pub struct PathStats {
    pub samples: usize,
    pub arc_length: f64,
    pub gear_switches: usize,
    pub reverse_samples: usize,
    pub cost: f64,
}

impl PathStats {
    pub fn of(path: &Path) -> Self {
        let gear_switches = path
            .direction
            .windows(2)
            .filter(|pair| pair[0] != pair[1])
            .count();
        let reverse_samples = path
            .direction
            .iter()
            .filter(|&&g| g == Gear::Reverse)
            .count();

        PathStats {
            samples: path.len(),
            arc_length: path.arc_length(),
            gear_switches,
            reverse_samples,
            cost: path.cost,
        }
    }

    /// Fraction of samples driven in reverse.
    pub fn reverse_fraction(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.reverse_samples as f64 / self.samples as f64
        }
    }
}

impl fmt::Display for PathStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Path samples: {}", self.samples)?;
        writeln!(f, "Arc length: {:.3} m", self.arc_length)?;
        writeln!(f, "Gear switches: {}", self.gear_switches)?;
        writeln!(
            f,
            "Reverse driving: {} samples ({:.1}%)",
            self.reverse_samples,
            self.reverse_fraction() * 100.0
        )?;
        writeln!(f, "Search cost: {:.3}", self.cost)?;
        Ok(())
    }
}
