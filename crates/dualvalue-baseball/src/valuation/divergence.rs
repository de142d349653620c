// Divergence classification: the gap between process and results, how much
// to trust it, and the flags that explain it.

use crate::config::{Direction, FlagCondition, LuckCheck, StatFlag, Thresholds};
use crate::player::PlayerRow;
use crate::valuation::peripheral::MetricScore;
use serde::{Deserialize, Serialize};

/// Floor applied to thresholds before dividing by them.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Signal strength reaches 1.0 once |delta| is this many thresholds wide.
const SATURATION_MULTIPLE: f64 = 2.0;

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// Classification of a player's value gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Peripherals materially exceed scoring output.
    BuyLow,
    /// Scoring output materially exceeds peripherals.
    SellHigh,
    Aligned,
    /// Not enough data on one side to compare.
    Unevaluable,
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::BuyLow => "Underperforming",
            Signal::SellHigh => "Overperforming",
            Signal::Aligned => "Aligned",
            Signal::Unevaluable => "Unevaluable",
        }
    }

    /// Short trade-market phrasing used in reports.
    pub fn outlook(&self) -> &'static str {
        match self {
            Signal::BuyLow => "buy-low opportunity",
            Signal::SellHigh => "sell-high risk",
            Signal::Aligned => "fairly valued",
            Signal::Unevaluable => "not enough data",
        }
    }
}

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

/// How many categories each score was built from, against how many the role
/// defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub fantasy_used: usize,
    pub fantasy_expected: usize,
    pub peripheral_used: usize,
    pub peripheral_expected: usize,
}

fn ratio(used: usize, expected: usize) -> f64 {
    if expected == 0 {
        return 0.0;
    }
    (used as f64 / expected as f64).min(1.0)
}

impl Coverage {
    pub fn fantasy_ratio(&self) -> f64 {
        ratio(self.fantasy_used, self.fantasy_expected)
    }

    pub fn peripheral_ratio(&self) -> f64 {
        ratio(self.peripheral_used, self.peripheral_expected)
    }

    /// Mean of the two coverage ratios.
    pub fn overall(&self) -> f64 {
        (self.fantasy_ratio() + self.peripheral_ratio()) / 2.0
    }

    /// True when either side used fewer than half its expected categories.
    pub fn is_low_sample(&self) -> bool {
        self.fantasy_ratio() < 0.5 || self.peripheral_ratio() < 0.5
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// `peripheral - fantasy`; positive means underperforming.
    pub delta: f64,
    pub signal: Signal,
    pub confidence: f64,
    pub low_sample: bool,
}

/// Classify a player from normalized fantasy and peripheral scores.
///
/// Confidence blends coverage with signal strength. For buy-low and
/// sell-high, strength is `|delta| / (2 * threshold)` capped at 1; for aligned it
/// is how close the two scores sit, `1 - |delta| / threshold`. A low-sample
/// penalty applies when either side is under half coverage.
pub fn classify(
    fantasy: f64,
    peripheral: f64,
    coverage: &Coverage,
    thresholds: &Thresholds,
) -> Classification {
    let delta = peripheral - fantasy;
    let buy = thresholds.buy.max(THRESHOLD_EPSILON);
    let sell = thresholds.sell.max(THRESHOLD_EPSILON);

    let (signal, strength) = if delta >= buy {
        (Signal::BuyLow, (delta / (SATURATION_MULTIPLE * buy)).min(1.0))
    } else if delta <= -sell {
        (Signal::SellHigh, (-delta / (SATURATION_MULTIPLE * sell)).min(1.0))
    } else {
        let threshold = if delta >= 0.0 { buy } else { sell };
        (Signal::Aligned, (1.0 - delta.abs() / threshold).max(0.0))
    };

    let w = thresholds.coverage_weight;
    let mut confidence = w * coverage.overall() + (1.0 - w) * strength;

    let low_sample = coverage.is_low_sample();
    if low_sample {
        confidence *= thresholds.low_sample_penalty;
    }

    Classification {
        delta,
        signal,
        confidence: confidence.clamp(0.0, 1.0),
        low_sample,
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Flag metrics that stand out from the player's own peripheral average.
///
/// Output follows the order of `components`, which is reference-table order.
pub fn metric_flags(components: &[MetricScore], aggregate: f64, thresholds: &Thresholds) -> Vec<String> {
    components
        .iter()
        .filter_map(|c| {
            let gap = c.normalized - aggregate;
            if gap > thresholds.flag_divergence {
                Some(format!("strong {}", c.label))
            } else if gap < -thresholds.flag_divergence {
                Some(format!("weak {}", c.label))
            } else {
                None
            }
        })
        .collect()
}

/// Compare actual results to their expected counterparts (ERA vs xFIP, or
/// ERA vs the estimate derived from WHIP).
pub fn luck_flags(row: &PlayerRow, checks: &[LuckCheck]) -> Vec<String> {
    let mut flags = Vec::new();
    for check in checks {
        let (Some(actual), Some(raw)) = (row.stat(&check.actual), row.stat(&check.expected))
        else {
            continue;
        };
        let expected = check.estimate(raw);
        // Positive gap means the actual result is better than expected.
        let gap = match check.direction {
            Direction::Higher => actual - expected,
            Direction::Lower => expected - actual,
        };
        if gap > check.tolerance {
            flags.push(check.outperform_text());
        } else if gap < -check.tolerance {
            flags.push(check.underperform_text());
        }
    }
    flags
}

fn condition_holds(row: &PlayerRow, cond: &FlagCondition) -> bool {
    let Some(value) = row.stat(&cond.stat) else {
        return false;
    };
    let scale = match &cond.per {
        Some(per) => match row.stat(per) {
            Some(v) => v,
            None => return false,
        },
        None => 1.0,
    };
    match (cond.above, cond.below) {
        (Some(bound), _) => value > bound * scale,
        (None, Some(bound)) => value < bound * scale,
        (None, None) => false,
    }
}

/// Absolute-threshold scouting notes ("elite OPS", "closer"). A flag fires
/// only when every condition's stats are present and hold strictly.
pub fn stat_flags(row: &PlayerRow, flags: &[StatFlag]) -> Vec<String> {
    flags
        .iter()
        .filter(|f| f.when.iter().all(|c| condition_holds(row, c)))
        .map(|f| f.label.clone())
        .collect()
}

/// Explain reduced confidence from thin category coverage.
pub fn coverage_flags(coverage: &Coverage) -> Vec<String> {
    let mut flags = Vec::new();
    if coverage.fantasy_ratio() < 0.5 {
        flags.push(format!(
            "low fantasy category coverage ({}/{})",
            coverage.fantasy_used, coverage.fantasy_expected
        ));
    }
    if coverage.peripheral_ratio() < 0.5 {
        flags.push(format!(
            "low peripheral coverage ({}/{})",
            coverage.peripheral_used, coverage.peripheral_expected
        ));
    }
    flags
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoleConfig;
    use crate::player::Role;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn full_coverage() -> Coverage {
        Coverage {
            fantasy_used: 5,
            fantasy_expected: 5,
            peripheral_used: 6,
            peripheral_expected: 6,
        }
    }

    fn metric(label: &str, normalized: f64) -> MetricScore {
        MetricScore {
            metric: label.into(),
            label: label.into(),
            raw: 0.0,
            normalized,
        }
    }

    #[test]
    fn threshold_boundaries() {
        let t = Thresholds::default();
        let c = full_coverage();
        assert_eq!(classify(50.0, 65.0, &c, &t).signal, Signal::BuyLow);
        assert_eq!(classify(50.0, 64.9, &c, &t).signal, Signal::Aligned);
        assert_eq!(classify(65.0, 50.0, &c, &t).signal, Signal::SellHigh);
        assert_eq!(classify(64.9, 50.0, &c, &t).signal, Signal::Aligned);
    }

    #[test]
    fn thresholds_are_tunable() {
        let t = Thresholds {
            buy: 30.0,
            ..Thresholds::default()
        };
        let c = full_coverage();
        assert_eq!(classify(50.0, 70.0, &c, &t).signal, Signal::Aligned);
        assert_eq!(classify(50.0, 80.0, &c, &t).signal, Signal::BuyLow);
    }

    #[test]
    fn swapping_scores_flips_signal() {
        let t = Thresholds::default();
        let c = full_coverage();
        for (a, b) in [(20.0, 80.0), (40.0, 60.0), (10.0, 30.0), (45.0, 55.0)] {
            let forward = classify(a, b, &c, &t);
            let reverse = classify(b, a, &c, &t);
            assert!(approx_eq(forward.delta, -reverse.delta, 1e-12));
            assert!(approx_eq(forward.confidence, reverse.confidence, 1e-12));
            let expected = match forward.signal {
                Signal::BuyLow => Signal::SellHigh,
                Signal::SellHigh => Signal::BuyLow,
                other => other,
            };
            assert_eq!(reverse.signal, expected, "({a}, {b})");
        }
    }

    #[test]
    fn full_coverage_strong_signal_is_full_confidence() {
        let result = classify(20.0, 80.0, &full_coverage(), &Thresholds::default());
        assert_eq!(result.signal, Signal::BuyLow);
        assert!(approx_eq(result.confidence, 1.0, 1e-12));
        assert!(!result.low_sample);
    }

    #[test]
    fn confidence_grows_with_delta_until_saturation() {
        let t = Thresholds::default();
        let c = Coverage {
            fantasy_used: 4,
            fantasy_expected: 5,
            peripheral_used: 4,
            peripheral_expected: 6,
        };
        let small = classify(50.0, 66.0, &c, &t).confidence;
        let large = classify(50.0, 80.0, &c, &t).confidence;
        let huge = classify(0.0, 100.0, &c, &t).confidence;
        assert!(large > small);
        assert!(approx_eq(large, huge, 1e-12));
    }

    #[test]
    fn confidence_grows_with_coverage() {
        let t = Thresholds::default();
        let thin = Coverage {
            fantasy_used: 3,
            fantasy_expected: 5,
            peripheral_used: 3,
            peripheral_expected: 6,
        };
        let thick = full_coverage();
        assert!(classify(30.0, 60.0, &thick, &t).confidence > classify(30.0, 60.0, &thin, &t).confidence);
    }

    #[test]
    fn low_sample_penalty_applies_below_half_coverage() {
        let t = Thresholds::default();
        let c = Coverage {
            fantasy_used: 1,
            fantasy_expected: 5,
            peripheral_used: 6,
            peripheral_expected: 6,
        };
        let result = classify(0.0, 100.0, &c, &t);
        assert!(result.low_sample);
        // (0.5 * (0.2 + 1.0) / 2 + 0.5 * 1.0) * 0.6
        assert!(approx_eq(result.confidence, 0.48, 1e-12));
    }

    #[test]
    fn aligned_confidence_is_highest_when_scores_match() {
        let t = Thresholds::default();
        let c = full_coverage();
        let exact = classify(50.0, 50.0, &c, &t);
        let near = classify(50.0, 60.0, &c, &t);
        assert_eq!(exact.signal, Signal::Aligned);
        assert!(approx_eq(exact.confidence, 1.0, 1e-12));
        assert!(near.confidence < exact.confidence);
    }

    #[test]
    fn metric_flags_name_direction() {
        let components = vec![
            metric("barrel rate", 95.0),
            metric("OPS", 60.0),
            metric("BB%", 20.0),
        ];
        let flags = metric_flags(&components, 58.0, &Thresholds::default());
        assert_eq!(flags, vec!["strong barrel rate", "weak BB%"]);
    }

    #[test]
    fn metric_flags_respect_threshold() {
        let components = vec![metric("OPS", 80.0)];
        assert!(metric_flags(&components, 60.0, &Thresholds::default()).is_empty());
    }

    #[test]
    fn era_beating_xfip_is_flagged() {
        let check = LuckCheck::new("ERA", "xFIP", 0.5, Direction::Lower);
        let lucky = PlayerRow::pitcher("Lucky").with_stat("ERA", 2.80).with_stat("xFIP", 4.10);
        let unlucky = PlayerRow::pitcher("Unlucky").with_stat("ERA", 4.90).with_stat("xFIP", 3.60);
        let neutral = PlayerRow::pitcher("Neutral").with_stat("ERA", 3.80).with_stat("xFIP", 3.60);
        let partial = PlayerRow::pitcher("Partial").with_stat("ERA", 2.00);

        let checks = [check];
        assert_eq!(luck_flags(&lucky, &checks), vec!["ERA outperforming xFIP"]);
        assert_eq!(luck_flags(&unlucky, &checks), vec!["ERA underperforming xFIP"]);
        assert!(luck_flags(&neutral, &checks).is_empty());
        assert!(luck_flags(&partial, &checks).is_empty());
    }

    #[test]
    fn whip_estimate_flags_era_regression() {
        let check = LuckCheck::new("ERA", "WHIP", 0.5, Direction::Lower)
            .modeled(0.8, 3.0, 2.5)
            .labeled("ERA may regress", "ERA may improve");
        let checks = [check];
        // WHIP 1.05 -> expected ERA 3.25.
        let lucky = PlayerRow::pitcher("Lucky").with_stat("ERA", 2.60).with_stat("WHIP", 1.05);
        let edge = PlayerRow::pitcher("Edge").with_stat("ERA", 2.80).with_stat("WHIP", 1.05);
        // WHIP 1.40 -> expected ERA 4.30.
        let unlucky = PlayerRow::pitcher("Unlucky").with_stat("ERA", 5.00).with_stat("WHIP", 1.40);
        let close = PlayerRow::pitcher("Close").with_stat("ERA", 4.70).with_stat("WHIP", 1.40);

        assert_eq!(luck_flags(&lucky, &checks), vec!["ERA may regress"]);
        assert!(luck_flags(&edge, &checks).is_empty());
        assert_eq!(luck_flags(&unlucky, &checks), vec!["ERA may improve"]);
        assert!(luck_flags(&close, &checks).is_empty());
    }

    fn default_stat_flags(role: Role) -> Vec<StatFlag> {
        RoleConfig::default_for(role).stat_flags
    }

    fn batter_flags(stat: &str, value: f64) -> Vec<String> {
        let row = PlayerRow::batter("B").with_stat(stat, value);
        stat_flags(&row, &default_stat_flags(Role::Batter))
    }

    fn pitcher_flags(stat: &str, value: f64) -> Vec<String> {
        let row = PlayerRow::pitcher("P").with_stat(stat, value);
        stat_flags(&row, &default_stat_flags(Role::Pitcher))
    }

    #[test]
    fn batter_stat_flag_boundaries() {
        assert_eq!(batter_flags("OPS", 0.851), vec!["elite OPS"]);
        assert!(batter_flags("OPS", 0.850).is_empty());
        assert_eq!(batter_flags("OPS", 0.649), vec!["low OPS"]);
        assert!(batter_flags("OPS", 0.650).is_empty());

        assert_eq!(batter_flags("XBS", 51.0), vec!["power hitter"]);
        assert!(batter_flags("XBS", 50.0).is_empty());

        assert_eq!(batter_flags("Hard_Hit%", 45.5), vec!["high hard-hit rate"]);
        assert!(batter_flags("Hard_Hit%", 45.0).is_empty());
        assert_eq!(batter_flags("Hard_Hit%", 29.9), vec!["low hard-hit rate"]);
        assert!(batter_flags("Hard_Hit%", 30.0).is_empty());

        assert_eq!(batter_flags("Barrel%", 10.1), vec!["high barrel rate"]);
        assert!(batter_flags("Barrel%", 10.0).is_empty());
    }

    #[test]
    fn base_stealing_flags_scale_with_attempts() {
        let flags = default_stat_flags(Role::Batter);
        let runner = |sb: f64, cs: f64| {
            let row = PlayerRow::batter("R").with_stat("SB", sb).with_stat("CS", cs);
            stat_flags(&row, &flags)
        };
        assert_eq!(runner(30.0, 7.0), vec!["elite base stealer"]);
        // CS must stay strictly under a quarter of SB.
        assert!(runner(28.0, 7.0).is_empty());
        // SB must exceed 20.
        assert!(runner(20.0, 2.0).is_empty());
        assert_eq!(runner(10.0, 6.0), vec!["caught-stealing risk"]);
        assert!(runner(10.0, 5.0).is_empty());
        assert_eq!(runner(0.0, 1.0), vec!["caught-stealing risk"]);

        // Without CS neither flag can be judged.
        let no_cs = PlayerRow::batter("N").with_stat("SB", 40.0);
        assert!(stat_flags(&no_cs, &flags).is_empty());
    }

    #[test]
    fn pitcher_stat_flag_boundaries() {
        assert_eq!(pitcher_flags("K%", 27.1), vec!["elite K%"]);
        assert!(pitcher_flags("K%", 27.0).is_empty());
        assert_eq!(pitcher_flags("K%", 17.9), vec!["low K%"]);
        assert!(pitcher_flags("K%", 18.0).is_empty());

        assert_eq!(pitcher_flags("BB%", 5.9), vec!["elite control"]);
        assert!(pitcher_flags("BB%", 6.0).is_empty());
        assert_eq!(pitcher_flags("BB%", 10.1), vec!["control issues"]);
        assert!(pitcher_flags("BB%", 10.0).is_empty());

        assert_eq!(pitcher_flags("K/BB", 4.1), vec!["excellent K/BB"]);
        assert!(pitcher_flags("K/BB", 4.0).is_empty());
        assert_eq!(pitcher_flags("K/BB", 1.9), vec!["poor K/BB"]);
        assert!(pitcher_flags("K/BB", 2.0).is_empty());

        assert_eq!(pitcher_flags("SV", 21.0), vec!["closer"]);
        assert!(pitcher_flags("SV", 20.0).is_empty());
    }

    #[test]
    fn absent_stats_never_flag() {
        let empty = PlayerRow::batter("Empty");
        assert!(stat_flags(&empty, &default_stat_flags(Role::Batter)).is_empty());
        let empty = PlayerRow::pitcher("Empty");
        assert!(stat_flags(&empty, &default_stat_flags(Role::Pitcher)).is_empty());
    }

    #[test]
    fn coverage_flags_report_counts() {
        let c = Coverage {
            fantasy_used: 1,
            fantasy_expected: 5,
            peripheral_used: 1,
            peripheral_expected: 6,
        };
        assert_eq!(
            coverage_flags(&c),
            vec![
                "low fantasy category coverage (1/5)",
                "low peripheral coverage (1/6)"
            ]
        );
        assert!(coverage_flags(&full_coverage()).is_empty());
    }
}
