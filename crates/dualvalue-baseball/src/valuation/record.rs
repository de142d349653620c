// Single-player evaluation: both scores, the classification, and the
// resulting immutable record.

use crate::config::EngineConfig;
use crate::player::{PlayerRow, Role};
use crate::valuation::divergence::{self, Coverage, Signal};
use crate::valuation::fantasy::{score_fantasy, FantasyScore};
use crate::valuation::peripheral::{score_peripherals, PeripheralScore};
use crate::valuation::EvaluationError;
use serde::Serialize;
use tracing::debug;

/// The two independently computed scores for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePair {
    pub fantasy: FantasyScore,
    pub peripheral: PeripheralScore,
}

impl ScorePair {
    pub fn coverage(&self) -> Coverage {
        Coverage {
            fantasy_used: self.fantasy.used,
            fantasy_expected: self.fantasy.expected,
            peripheral_used: self.peripheral.used,
            peripheral_expected: self.peripheral.expected,
        }
    }
}

/// Result of evaluating one player. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    pub name: String,
    pub external_id: Option<String>,
    pub position: String,
    pub role: Role,
    pub scores: ScorePair,
    /// `peripheral - fantasy` on the 0-100 scale; `None` when unevaluable.
    pub delta: Option<f64>,
    pub signal: Signal,
    pub confidence: f64,
    pub flags: Vec<String>,
    /// Why the player could not be classified.
    pub reason: Option<String>,
}

impl EvaluationRecord {
    pub fn fantasy_score(&self) -> Option<f64> {
        self.scores.fantasy.normalized
    }

    pub fn peripheral_score(&self) -> Option<f64> {
        self.scores.peripheral.aggregate
    }
}

/// Evaluate a single player.
///
/// Fails only when the row's role cannot be resolved. A player with no usable
/// categories on either side comes back as `Signal::Unevaluable` with zero
/// confidence and the reason attached.
pub fn evaluate_player(
    row: &PlayerRow,
    config: &EngineConfig,
) -> Result<EvaluationRecord, EvaluationError> {
    let role = row.role().map_err(|reason| EvaluationError::InvalidRole {
        player: row.name.clone(),
        reason,
    })?;
    let role_config = config.for_role(role);
    let thresholds = &config.thresholds;

    let scores = ScorePair {
        fantasy: score_fantasy(row, &role_config.weights)?,
        peripheral: score_peripherals(row, &role_config.reference)?,
    };
    let coverage = scores.coverage();

    let (Some(fantasy), Some(peripheral)) = (scores.fantasy.normalized, scores.peripheral.aggregate)
    else {
        let detail = match (scores.fantasy.used, scores.peripheral.used) {
            (0, 0) => "no league categories or peripheral metrics",
            (0, _) => "no weighted league categories",
            _ => "no peripheral metrics",
        };
        let reason = EvaluationError::InsufficientData {
            player: row.name.clone(),
            detail: detail.into(),
        };
        debug!("{}: unevaluable ({})", row.name, detail);

        return Ok(EvaluationRecord {
            name: row.name.clone(),
            external_id: row.external_id.clone(),
            position: row.position.clone(),
            role,
            flags: divergence::coverage_flags(&coverage),
            scores,
            delta: None,
            signal: Signal::Unevaluable,
            confidence: 0.0,
            reason: Some(reason.to_string()),
        });
    };

    let class = divergence::classify(fantasy, peripheral, &coverage, thresholds);

    let mut flags = divergence::metric_flags(&scores.peripheral.components, peripheral, thresholds);
    flags.extend(divergence::luck_flags(row, &role_config.luck_checks));
    flags.extend(divergence::stat_flags(row, &role_config.stat_flags));
    if class.low_sample {
        flags.extend(divergence::coverage_flags(&coverage));
    }

    let mut confidence = class.confidence;
    if let Some(sample) = &role_config.sample {
        if let Some(playing_time) = row.stat(&sample.stat) {
            let factor = sample.factor(playing_time);
            confidence = (confidence * factor).clamp(0.0, 1.0);
            if factor < 1.0 {
                flags.push(format!("limited playing time ({playing_time:.0} {})", sample.stat));
            }
        }
    }

    debug!(
        "{}: fantasy={:.1} peripheral={:.1} delta={:+.1} -> {} ({:.2})",
        row.name,
        fantasy,
        peripheral,
        class.delta,
        class.signal.label(),
        confidence
    );

    Ok(EvaluationRecord {
        name: row.name.clone(),
        external_id: row.external_id.clone(),
        position: row.position.clone(),
        role,
        scores,
        delta: Some(class.delta),
        signal: class.signal,
        confidence,
        flags,
        reason: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
