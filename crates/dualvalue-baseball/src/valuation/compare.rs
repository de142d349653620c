// Head-to-head comparison of two same-role players.

use crate::config::EngineConfig;
use crate::player::PlayerRow;
use crate::valuation::divergence::Signal;
use crate::valuation::record::{evaluate_player, EvaluationRecord};
use crate::valuation::EvaluationError;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Scores closer than this are a wash.
const EDGE_EPSILON: f64 = 0.5;

/// Which side of the comparison holds the higher score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    First,
    Second,
    Even,
}

impl Edge {
    fn between(first: Option<f64>, second: Option<f64>) -> Self {
        match (first, second) {
            (Some(a), Some(b)) if (a - b).abs() < EDGE_EPSILON => Edge::Even,
            (Some(a), Some(b)) if a > b => Edge::First,
            (Some(_), Some(_)) => Edge::Second,
            (Some(_), None) => Edge::First,
            (None, Some(_)) => Edge::Second,
            (None, None) => Edge::Even,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    TradeFirstForSecond,
    TradeSecondForFirst,
    PreferFirst,
    PreferSecond,
    NoClearEdge,
}

/// Side-by-side verdict for two players.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub first: EvaluationRecord,
    pub second: EvaluationRecord,
    pub fantasy_edge: Edge,
    pub peripheral_edge: Edge,
    pub recommendation: Recommendation,
    pub summary: String,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// Buy-low ahead of aligned ahead of sell-high.
fn outlook_rank(signal: Signal) -> u8 {
    match signal {
        Signal::BuyLow => 2,
        Signal::Aligned => 1,
        Signal::SellHigh | Signal::Unevaluable => 0,
    }
}

fn recommend(first: &EvaluationRecord, second: &EvaluationRecord) -> Recommendation {
    match (first.signal, second.signal) {
        (Signal::Unevaluable, _) | (_, Signal::Unevaluable) => Recommendation::NoClearEdge,
        (Signal::SellHigh, Signal::BuyLow) => Recommendation::TradeFirstForSecond,
        (Signal::BuyLow, Signal::SellHigh) => Recommendation::TradeSecondForFirst,
        (a, b) => {
            let by_outlook = outlook_rank(a).cmp(&outlook_rank(b));
            let by_delta = || {
                let da = first.delta.unwrap_or(0.0);
                let db = second.delta.unwrap_or(0.0);
                if (da - db).abs() < EDGE_EPSILON {
                    Ordering::Equal
                } else {
                    da.total_cmp(&db)
                }
            };
            match by_outlook.then_with(by_delta) {
                Ordering::Greater => Recommendation::PreferFirst,
                Ordering::Less => Recommendation::PreferSecond,
                Ordering::Equal => Recommendation::NoClearEdge,
            }
        }
    }
}

fn summarize(first: &EvaluationRecord, second: &EvaluationRecord, rec: Recommendation) -> String {
    let verdict = match rec {
        Recommendation::TradeFirstForSecond => {
            format!("consider trading {} for {}", first.name, second.name)
        }
        Recommendation::TradeSecondForFirst => {
            format!("consider trading {} for {}", second.name, first.name)
        }
        Recommendation::PreferFirst => format!("prefer {}", first.name),
        Recommendation::PreferSecond => format!("prefer {}", second.name),
        Recommendation::NoClearEdge => "no clear edge".to_string(),
    };
    format!(
        "{}: {}; {}: {}; {}",
        first.name,
        first.signal.outlook(),
        second.name,
        second.signal.outlook(),
        verdict
    )
}

/// Run the full pipeline on two players and produce a verdict.
///
/// Both rows must resolve to the same role. The recommendation depends only
/// on each player's signal and delta; raw fantasy totals never break ties.
pub fn compare_players(
    first: &PlayerRow,
    second: &PlayerRow,
    config: &EngineConfig,
) -> Result<Comparison, EvaluationError> {
    let invalid = |row: &PlayerRow, reason: String| EvaluationError::InvalidRole {
        player: row.name.clone(),
        reason,
    };
    let first_role = first.role().map_err(|r| invalid(first, r))?;
    let second_role = second.role().map_err(|r| invalid(second, r))?;
    if first_role != second_role {
        return Err(EvaluationError::RoleMismatch {
            first: first.name.clone(),
            first_role,
            second: second.name.clone(),
            second_role,
        });
    }

    let a = evaluate_player(first, config)?;
    let b = evaluate_player(second, config)?;

    let recommendation = recommend(&a, &b);
    let summary = summarize(&a, &b, recommendation);

    Ok(Comparison {
        fantasy_edge: Edge::between(a.fantasy_score(), b.fantasy_score()),
        peripheral_edge: Edge::between(a.peripheral_score(), b.peripheral_score()),
        recommendation,
        summary,
        first: a,
        second: b,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
