// Peripheral normalization: advanced metrics scaled onto 0-100 against fixed
// reference ranges and averaged into one process score.

use crate::config::{Direction, PeripheralMetric, PeripheralReference};
use crate::player::PlayerRow;
use crate::valuation::EvaluationError;
use serde::Serialize;

/// Ranges narrower than this are treated as a single point.
const RANGE_EPSILON: f64 = 1e-9;

/// Linear min-max scaling of `value` onto 0-100, clamped.
///
/// Values outside `[low, high]` saturate at the bounds. A degenerate range
/// maps everything to the midpoint 50.
pub fn minmax_scale(value: f64, low: f64, high: f64) -> f64 {
    if (high - low).abs() < RANGE_EPSILON {
        return 50.0;
    }
    ((value - low) / (high - low) * 100.0).clamp(0.0, 100.0)
}

/// Normalize one raw metric value, inverting lower-is-better metrics so
/// 100 is always the good end.
pub fn normalize_metric(value: f64, metric: &PeripheralMetric) -> f64 {
    let scaled = minmax_scale(value, metric.low, metric.high);
    match metric.direction {
        Direction::Higher => scaled,
        Direction::Lower => 100.0 - scaled,
    }
}

/// A single metric's contribution to the peripheral score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricScore {
    pub metric: String,
    pub label: String,
    pub raw: f64,
    pub normalized: f64,
}

/// Aggregate process score for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeripheralScore {
    /// Per-metric scores in reference-table order.
    pub components: Vec<MetricScore>,
    /// Mean of `components`, or `None` when no metric was available.
    pub aggregate: Option<f64>,
    pub used: usize,
    pub expected: usize,
}

/// Score a player's advanced metrics against the role's reference table.
///
/// Metrics missing from the row are left out of the mean rather than counted
/// as zero.
pub fn score_peripherals(
    row: &PlayerRow,
    reference: &PeripheralReference,
) -> Result<PeripheralScore, EvaluationError> {
    let role = row.role().map_err(|reason| EvaluationError::InvalidRole {
        player: row.name.clone(),
        reason,
    })?;
    if role != reference.role() {
        return Err(EvaluationError::InvalidRole {
            player: row.name.clone(),
            reason: format!(
                "{role} row scored against {} reference ranges",
                reference.role()
            ),
        });
    }

    let components: Vec<MetricScore> = reference
        .metrics()
        .iter()
        .filter_map(|metric| {
            row.stat(&metric.name).map(|raw| MetricScore {
                metric: metric.name.clone(),
                label: metric.label.clone(),
                raw,
                normalized: normalize_metric(raw, metric),
            })
        })
        .collect();

    let used = components.len();
    let aggregate = if used == 0 {
        None
    } else {
        Some(components.iter().map(|c| c.normalized).sum::<f64>() / used as f64)
    };

    Ok(PeripheralScore {
        components,
        aggregate,
        used,
        expected: reference.metrics().len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
