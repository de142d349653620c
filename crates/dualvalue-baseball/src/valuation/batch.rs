// Batch evaluation over a roster or player pool, with ranked buy-low and
// sell-high candidate lists.

use crate::config::{EngineConfig, Thresholds};
use crate::player::{PlayerRow, Role};
use crate::valuation::divergence::Signal;
use crate::valuation::record::{evaluate_player, EvaluationRecord};
use crate::valuation::EvaluationError;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Caller-supplied knobs for a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// When set, rows of any other role are reported as unevaluated.
    pub role: Option<Role>,
    /// Floor for the ranked candidate lists.
    pub min_confidence: f64,
    /// Maximum length of each ranked list. `None` keeps every candidate.
    pub limit: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            role: None,
            min_confidence: 0.5,
            limit: None,
        }
    }
}

impl BatchOptions {
    /// Options seeded from the configured thresholds.
    pub fn from_thresholds(thresholds: &Thresholds) -> Self {
        BatchOptions {
            min_confidence: thresholds.min_confidence,
            ..Self::default()
        }
    }
}

/// A row that could not be evaluated, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unevaluated {
    pub name: String,
    pub external_id: Option<String>,
    pub position: String,
    pub reason: String,
}

impl Unevaluated {
    fn from_row(row: &PlayerRow, reason: String) -> Self {
        Unevaluated {
            name: row.name.clone(),
            external_id: row.external_id.clone(),
            position: row.position.clone(),
            reason,
        }
    }
}

/// Output of a batch run. Every input row lands in exactly one of
/// `records` or `unevaluated`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// One record per evaluable row, in input order.
    pub records: Vec<EvaluationRecord>,
    /// Underperformers above the confidence floor, largest delta first.
    pub buy_low: Vec<EvaluationRecord>,
    /// Overperformers above the confidence floor, most negative delta first.
    pub sell_high: Vec<EvaluationRecord>,
    pub unevaluated: Vec<Unevaluated>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.records.len() + self.unevaluated.len()
    }
}

fn evaluate_row(
    row: &PlayerRow,
    config: &EngineConfig,
    expected: Option<Role>,
) -> Result<EvaluationRecord, Unevaluated> {
    if let Some(expected) = expected {
        match row.role() {
            Ok(role) if role != expected => {
                return Err(Unevaluated::from_row(
                    row,
                    format!("expected a {expected}, found a {role}"),
                ));
            }
            _ => {}
        }
    }

    evaluate_player(row, config).map_err(|e: EvaluationError| Unevaluated::from_row(row, e.to_string()))
}

/// Order by delta (via `by_delta`), then name and external ID so ties do not
/// depend on input order.
fn rank(records: &mut [EvaluationRecord], by_delta: impl Fn(f64, f64) -> Ordering) {
    records.sort_by(|a, b| {
        by_delta(a.delta.unwrap_or(0.0), b.delta.unwrap_or(0.0))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.external_id.cmp(&b.external_id))
    });
}

fn candidates(records: &[EvaluationRecord], signal: Signal, min_confidence: f64) -> Vec<EvaluationRecord> {
    records
        .iter()
        .filter(|r| r.signal == signal && r.confidence >= min_confidence)
        .cloned()
        .collect()
}

/// Evaluate every row and build the ranked candidate lists.
///
/// Rows whose role cannot be resolved (or does not match `options.role`) are
/// collected in `unevaluated` with a reason; they never abort the batch.
/// There is no internal cap on input size; `options.limit` only trims the
/// ranked lists.
pub fn evaluate_batch(rows: &[PlayerRow], config: &EngineConfig, options: &BatchOptions) -> BatchReport {
    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<EvaluationRecord, Unevaluated>> = rows
        .par_iter()
        .map(|row| evaluate_row(row, config, options.role))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<EvaluationRecord, Unevaluated>> = rows
        .iter()
        .map(|row| evaluate_row(row, config, options.role))
        .collect();

    let mut records = Vec::with_capacity(rows.len());
    let mut unevaluated = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(skipped) => {
                warn!("skipping {}: {}", skipped.name, skipped.reason);
                unevaluated.push(skipped);
            }
        }
    }

    let mut buy_low = candidates(&records, Signal::BuyLow, options.min_confidence);
    rank(&mut buy_low, |a, b| b.total_cmp(&a));

    let mut sell_high = candidates(&records, Signal::SellHigh, options.min_confidence);
    rank(&mut sell_high, |a, b| a.total_cmp(&b));

    if let Some(limit) = options.limit {
        buy_low.truncate(limit);
        sell_high.truncate(limit);
    }

    info!(
        "Evaluated {} of {} players: {} buy-low, {} sell-high, {} unevaluated",
        records.len(),
        rows.len(),
        buy_low.len(),
        sell_high.len(),
        unevaluated.len()
    );

    BatchReport {
        records,
        buy_low,
        sell_high,
        unevaluated,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
