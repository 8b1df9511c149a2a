use serde::{Deserialize, Serialize};

/// Cumulative distance and altitude per route point, parallel arrays ready
/// for the elevation chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSeries {
    pub cumulative_distance_km: Vec<f64>,
    pub altitude_m: Vec<f64>,
}

impl ProgressSeries {
    pub fn len(&self) -> usize {
        self.cumulative_distance_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative_distance_km.is_empty()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.cumulative_distance_km.last().copied().unwrap_or(0.0)
    }

    /// Fewer than two points leave nothing worth drawing.
    pub fn is_chartable(&self) -> bool {
        self.len() >= 2
    }
}
