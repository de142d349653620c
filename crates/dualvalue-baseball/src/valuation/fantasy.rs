// Fantasy scoring: league categories weighted by the role's scoring table.

use crate::config::ScoringWeights;
use crate::player::PlayerRow;
use crate::valuation::peripheral::minmax_scale;
use crate::valuation::EvaluationError;
use serde::Serialize;

/// Points earned from one league category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryContribution {
    pub category: String,
    pub raw: f64,
    /// Raw value oriented so larger is better (ceiling-inverted for ERA etc.).
    pub effective: f64,
    pub points: f64,
}

/// League-scoring value for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FantasyScore {
    pub raw: f64,
    /// `raw` scaled onto 0-100 against the role's fantasy range, or `None`
    /// when no weighted category was present.
    pub normalized: Option<f64>,
    pub contributions: Vec<CategoryContribution>,
    pub used: usize,
    pub expected: usize,
}

/// Compute `sum(weight * effective_value)` over categories present in both
/// the row and the weight table.
///
/// Absent categories are skipped and only reduce `used`; stats the table
/// does not weight are ignored.
pub fn score_fantasy(
    row: &PlayerRow,
    weights: &ScoringWeights,
) -> Result<FantasyScore, EvaluationError> {
    let role = row.role().map_err(|reason| EvaluationError::InvalidRole {
        player: row.name.clone(),
        reason,
    })?;
    if role != weights.role() {
        return Err(EvaluationError::InvalidRole {
            player: row.name.clone(),
            reason: format!("{role} row scored with {} weights", weights.role()),
        });
    }

    let contributions: Vec<CategoryContribution> = weights
        .categories()
        .iter()
        .filter_map(|cat| {
            cat.names().find_map(|name| row.stat(name)).map(|raw| {
                let effective = cat.effective_value(raw);
                CategoryContribution {
                    category: cat.name.clone(),
                    raw,
                    effective,
                    points: cat.weight * effective,
                }
            })
        })
        .collect();

    let raw: f64 = contributions.iter().map(|c| c.points).sum();
    let used = contributions.len();
    let range = weights.range();
    let normalized = (used > 0).then(|| minmax_scale(raw, range.low, range.high));

    Ok(FantasyScore {
        raw,
        normalized,
        contributions,
        used,
        expected: weights.categories().len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
