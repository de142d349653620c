// Evaluator configuration: scoring weight tables, peripheral reference ranges
// and classification thresholds (evaluator.toml).

use crate::player::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Whether a larger raw value is better for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Higher,
    Lower,
}

// ---------------------------------------------------------------------------
// Scoring weight table
// ---------------------------------------------------------------------------

/// One weighted league category.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringCategory {
    pub name: String,
    pub weight: f64,
    pub direction: Direction,
    /// Reference ceiling for lower-is-better categories. Unused (0.0) for
    /// higher-is-better ones.
    pub ceiling: f64,
    /// Alternate column names, tried in order when `name` is absent.
    pub aliases: Vec<String>,
}

impl ScoringCategory {
    pub fn higher(name: impl Into<String>, weight: f64) -> Self {
        ScoringCategory {
            name: name.into(),
            weight,
            direction: Direction::Higher,
            ceiling: 0.0,
            aliases: Vec::new(),
        }
    }

    pub fn lower(name: impl Into<String>, weight: f64, ceiling: f64) -> Self {
        ScoringCategory {
            name: name.into(),
            weight,
            direction: Direction::Lower,
            ceiling,
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// The canonical name followed by any aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Raw value oriented so that larger is always better.
    pub fn effective_value(&self, raw: f64) -> f64 {
        match self.direction {
            Direction::Higher => raw,
            Direction::Lower => self.ceiling - raw,
        }
    }
}

/// Role-typical span of raw fantasy scores, mapped onto 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub low: f64,
    pub high: f64,
}

/// League scoring formula for one role.
///
/// Built once through [`ScoringWeights::new`], which validates every entry;
/// there is no way to mutate the table afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    role: Role,
    categories: Vec<ScoringCategory>,
    range: ScoreRange,
}

impl ScoringWeights {
    pub fn new(
        role: Role,
        categories: Vec<ScoringCategory>,
        range: ScoreRange,
    ) -> Result<Self, ConfigError> {
        let prefix = format!("{}.scoring", section_name(role));

        if categories.is_empty() {
            return Err(invalid(prefix, "at least one category is required"));
        }

        let mut seen = HashSet::new();
        for cat in &categories {
            let field = format!("{prefix}.{}", cat.name);
            if cat.name.trim().is_empty() {
                return Err(invalid(prefix.clone(), "category name must not be empty"));
            }
            if !seen.insert(cat.name.as_str()) {
                return Err(invalid(field, "duplicate category"));
            }
            for alias in &cat.aliases {
                if alias.trim().is_empty() || !seen.insert(alias.as_str()) {
                    return Err(invalid(
                        format!("{field}.aliases"),
                        format!("alias '{alias}' is empty or already in use"),
                    ));
                }
            }
            if !cat.weight.is_finite() || cat.weight <= 0.0 {
                return Err(invalid(
                    format!("{field}.weight"),
                    format!("must be > 0, got {}", cat.weight),
                ));
            }
            if cat.direction == Direction::Lower && !cat.ceiling.is_finite() {
                return Err(invalid(
                    format!("{field}.ceiling"),
                    "lower-is-better categories need a finite ceiling",
                ));
            }
        }

        if !(range.low.is_finite() && range.high.is_finite()) || range.high <= range.low {
            return Err(invalid(
                format!("{}.fantasy_range", section_name(role)),
                format!("high must exceed low, got {}..{}", range.low, range.high),
            ));
        }

        Ok(ScoringWeights {
            role,
            categories,
            range,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn categories(&self) -> &[ScoringCategory] {
        &self.categories
    }

    pub fn range(&self) -> ScoreRange {
        self.range
    }

    /// Default batting formula: R, RBI, OBP (scaled x100), net steals and
    /// extra-base/sac hits.
    pub fn default_batting() -> Self {
        ScoringWeights {
            role: Role::Batter,
            categories: vec![
                ScoringCategory::higher("R", 1.0),
                ScoringCategory::higher("RBI", 1.0),
                ScoringCategory::higher("OBP", 100.0),
                ScoringCategory::higher("SBN2", 2.0),
                ScoringCategory::higher("XBS", 1.5),
            ],
            range: ScoreRange {
                low: 100.0,
                high: 350.0,
            },
        }
    }

    /// Default pitching formula: strikeouts, ERA and WHIP against fixed
    /// ceilings, relief and starting contributions.
    pub fn default_pitching() -> Self {
        ScoringWeights {
            role: Role::Pitcher,
            categories: vec![
                ScoringCategory::higher("K", 1.0).with_alias("SO"),
                ScoringCategory::lower("ERA", 20.0, 6.0),
                ScoringCategory::lower("WHIP", 15.0, 1.6),
                ScoringCategory::higher("RPC", 3.0),
                ScoringCategory::higher("SPC", 3.0),
            ],
            range: ScoreRange {
                low: 50.0,
                high: 350.0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Peripheral reference ranges
// ---------------------------------------------------------------------------

/// Reference range for one advanced metric.
#[derive(Debug, Clone, PartialEq)]
pub struct PeripheralMetric {
    pub name: String,
    /// Human-readable name used in flags ("barrel rate").
    pub label: String,
    pub low: f64,
    pub high: f64,
    pub direction: Direction,
}

impl PeripheralMetric {
    pub fn new(name: &str, label: &str, low: f64, high: f64, direction: Direction) -> Self {
        PeripheralMetric {
            name: name.into(),
            label: label.into(),
            low,
            high,
            direction,
        }
    }
}

/// Peripheral reference table for one role.
#[derive(Debug, Clone, PartialEq)]
pub struct PeripheralReference {
    role: Role,
    metrics: Vec<PeripheralMetric>,
}

impl PeripheralReference {
    pub fn new(role: Role, metrics: Vec<PeripheralMetric>) -> Result<Self, ConfigError> {
        let prefix = format!("{}.peripherals", section_name(role));

        if metrics.is_empty() {
            return Err(invalid(prefix, "at least one metric is required"));
        }

        let mut seen = HashSet::new();
        for m in &metrics {
            let field = format!("{prefix}.{}", m.name);
            if m.name.trim().is_empty() {
                return Err(invalid(prefix.clone(), "metric name must not be empty"));
            }
            if !seen.insert(m.name.as_str()) {
                return Err(invalid(field, "duplicate metric"));
            }
            if !(m.low.is_finite() && m.high.is_finite()) || m.high < m.low {
                return Err(invalid(
                    field,
                    format!("high must be >= low, got {}..{}", m.low, m.high),
                ));
            }
        }

        Ok(PeripheralReference { role, metrics })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn metrics(&self) -> &[PeripheralMetric] {
        &self.metrics
    }

    pub fn default_batting() -> Self {
        use Direction::*;
        PeripheralReference {
            role: Role::Batter,
            metrics: vec![
                PeripheralMetric::new("OPS", "OPS", 0.600, 0.950, Higher),
                PeripheralMetric::new("SLG", "SLG", 0.350, 0.550, Higher),
                PeripheralMetric::new("K%", "K%", 15.0, 30.0, Lower),
                PeripheralMetric::new("BB%", "BB%", 4.0, 14.0, Higher),
                PeripheralMetric::new("Hard_Hit%", "hard-hit rate", 20.0, 50.0, Higher),
                PeripheralMetric::new("Barrel%", "barrel rate", 2.0, 15.0, Higher),
            ],
        }
    }

    pub fn default_pitching() -> Self {
        use Direction::*;
        PeripheralReference {
            role: Role::Pitcher,
            metrics: vec![
                PeripheralMetric::new("K%", "K%", 15.0, 32.0, Higher),
                PeripheralMetric::new("BB%", "BB%", 4.0, 12.0, Lower),
                PeripheralMetric::new("K/BB", "K/BB", 1.5, 5.0, Higher),
                PeripheralMetric::new("SwStr%", "swinging-strike rate", 8.0, 16.0, Higher),
                PeripheralMetric::new("Hard_Hit%", "hard-hit rate allowed", 30.0, 45.0, Lower),
                PeripheralMetric::new("xFIP", "xFIP", 2.8, 5.2, Lower),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Playing time and luck checks
// ---------------------------------------------------------------------------

/// Confidence adjustment keyed on a playing-time stat (PA, IP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSize {
    pub stat: String,
    /// Below this, confidence is multiplied by `short_factor`.
    pub min: f64,
    /// At or above this, confidence is multiplied by `full_factor`.
    pub full: f64,
    #[serde(default = "default_short_factor")]
    pub short_factor: f64,
    #[serde(default = "default_full_factor")]
    pub full_factor: f64,
}

fn default_short_factor() -> f64 {
    0.7
}

fn default_full_factor() -> f64 {
    1.1
}

impl SampleSize {
    pub fn new(stat: &str, min: f64, full: f64) -> Self {
        SampleSize {
            stat: stat.into(),
            min,
            full,
            short_factor: default_short_factor(),
            full_factor: default_full_factor(),
        }
    }

    /// Finite `min <= full`, `0 < short_factor <= 1`, finite `full_factor >= 1`.
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.stat.trim().is_empty() {
            return Err(invalid(format!("{field}.stat"), "must not be empty"));
        }
        if !(self.min.is_finite() && self.full.is_finite()) || self.full < self.min {
            return Err(invalid(
                field,
                format!("full must be >= min, got {}..{}", self.min, self.full),
            ));
        }
        if !(self.short_factor > 0.0 && self.short_factor <= 1.0) {
            return Err(invalid(
                format!("{field}.short_factor"),
                format!("must be in (0.0, 1.0], got {}", self.short_factor),
            ));
        }
        if !(self.full_factor.is_finite() && self.full_factor >= 1.0) {
            return Err(invalid(
                format!("{field}.full_factor"),
                format!("must be a finite value >= 1.0, got {}", self.full_factor),
            ));
        }
        Ok(())
    }

    /// Multiplier for a given playing-time value.
    pub fn factor(&self, value: f64) -> f64 {
        if value < self.min {
            self.short_factor
        } else if value >= self.full {
            self.full_factor
        } else {
            1.0
        }
    }
}

/// Compares an actual result stat against its expected counterpart
/// (ERA vs xFIP, or ERA vs a WHIP-based estimate) and flags the gap.
///
/// The expected stat is mapped through `(value - base) * scale + offset`
/// before comparing; the defaults leave it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LuckCheck {
    pub actual: String,
    pub expected: String,
    pub tolerance: f64,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub base: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
    /// Flag text when the actual stat beats the estimate.
    pub outperform_label: Option<String>,
    /// Flag text when the actual stat trails the estimate.
    pub underperform_label: Option<String>,
}

fn default_scale() -> f64 {
    1.0
}

impl LuckCheck {
    pub fn new(actual: &str, expected: &str, tolerance: f64, direction: Direction) -> Self {
        LuckCheck {
            actual: actual.into(),
            expected: expected.into(),
            tolerance,
            direction,
            base: 0.0,
            scale: default_scale(),
            offset: 0.0,
            outperform_label: None,
            underperform_label: None,
        }
    }

    pub fn modeled(mut self, base: f64, scale: f64, offset: f64) -> Self {
        self.base = base;
        self.scale = scale;
        self.offset = offset;
        self
    }

    pub fn labeled(mut self, outperform: &str, underperform: &str) -> Self {
        self.outperform_label = Some(outperform.into());
        self.underperform_label = Some(underperform.into());
        self
    }

    /// Estimate of the actual stat from the expected stat's raw value.
    pub fn estimate(&self, expected_raw: f64) -> f64 {
        (expected_raw - self.base) * self.scale + self.offset
    }

    pub fn outperform_text(&self) -> String {
        self.outperform_label
            .clone()
            .unwrap_or_else(|| format!("{} outperforming {}", self.actual, self.expected))
    }

    pub fn underperform_text(&self) -> String {
        self.underperform_label
            .clone()
            .unwrap_or_else(|| format!("{} underperforming {}", self.actual, self.expected))
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(invalid(
                field,
                format!("tolerance must be >= 0, got {}", self.tolerance),
            ));
        }
        if !(self.base.is_finite() && self.offset.is_finite() && self.scale.is_finite())
            || self.scale == 0.0
        {
            return Err(invalid(
                field,
                "base and offset must be finite and scale finite and non-zero",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stat flags
// ---------------------------------------------------------------------------

/// One test on a raw stat: `stat > above` or `stat < below`. With `per`, the
/// bound is multiplied by that stat first (`CS < 0.25 * SB`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagCondition {
    pub stat: String,
    pub above: Option<f64>,
    pub below: Option<f64>,
    pub per: Option<String>,
}

impl FlagCondition {
    pub fn above(stat: &str, bound: f64) -> Self {
        FlagCondition {
            stat: stat.into(),
            above: Some(bound),
            below: None,
            per: None,
        }
    }

    pub fn below(stat: &str, bound: f64) -> Self {
        FlagCondition {
            stat: stat.into(),
            above: None,
            below: Some(bound),
            per: None,
        }
    }

    pub fn per(mut self, stat: &str) -> Self {
        self.per = Some(stat.into());
        self
    }
}

/// Scouting note emitted when every condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatFlag {
    pub label: String,
    pub when: Vec<FlagCondition>,
}

impl StatFlag {
    pub fn new(label: &str, when: Vec<FlagCondition>) -> Self {
        StatFlag {
            label: label.into(),
            when,
        }
    }

    fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        let field = format!("{prefix}.{}", self.label);
        if self.label.trim().is_empty() {
            return Err(invalid(prefix, "flag label must not be empty"));
        }
        if self.when.is_empty() {
            return Err(invalid(format!("{field}.when"), "at least one condition is required"));
        }
        for cond in &self.when {
            let bound = match (cond.above, cond.below) {
                (Some(b), None) | (None, Some(b)) => b,
                _ => {
                    return Err(invalid(
                        format!("{field}.when.{}", cond.stat),
                        "exactly one of `above` or `below` is required",
                    ))
                }
            };
            if !bound.is_finite() {
                return Err(invalid(
                    format!("{field}.when.{}", cond.stat),
                    format!("bound must be finite, got {bound}"),
                ));
            }
            let blank_per = cond.per.as_deref().is_some_and(|p| p.trim().is_empty());
            if cond.stat.trim().is_empty() || blank_per {
                return Err(invalid(format!("{field}.when"), "stat names must not be empty"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Tunable classification parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Minimum positive delta for a buy-low signal.
    pub buy: f64,
    /// Minimum negative delta magnitude for a sell-high signal.
    pub sell: f64,
    /// Floor for the ranked buy-low / sell-high lists.
    pub min_confidence: f64,
    /// Per-metric distance from the aggregate peripheral score that earns a flag.
    pub flag_divergence: f64,
    /// Confidence multiplier when either score used under half its categories.
    pub low_sample_penalty: f64,
    /// Share of confidence driven by coverage; the rest by signal strength.
    pub coverage_weight: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            buy: 15.0,
            sell: 15.0,
            min_confidence: 0.5,
            flag_divergence: 25.0,
            low_sample_penalty: 0.6,
            coverage_weight: 0.5,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive: &[(&str, f64)] = &[
            ("thresholds.buy", self.buy),
            ("thresholds.sell", self.sell),
            ("thresholds.flag_divergence", self.flag_divergence),
        ];
        for (name, val) in positive {
            if !val.is_finite() || *val <= 0.0 {
                return Err(invalid(*name, format!("must be > 0, got {val}")));
            }
        }

        let unit: &[(&str, f64)] = &[
            ("thresholds.min_confidence", self.min_confidence),
            ("thresholds.coverage_weight", self.coverage_weight),
        ];
        for (name, val) in unit {
            if !(0.0..=1.0).contains(val) {
                return Err(invalid(
                    *name,
                    format!("must be between 0.0 and 1.0 inclusive, got {val}"),
                ));
            }
        }

        let p = self.low_sample_penalty;
        if !(p > 0.0 && p <= 1.0) {
            return Err(invalid(
                "thresholds.low_sample_penalty",
                format!("must be in (0.0, 1.0], got {p}"),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Assembled config
// ---------------------------------------------------------------------------

/// Everything the engine needs to evaluate one role.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleConfig {
    pub weights: ScoringWeights,
    pub reference: PeripheralReference,
    pub sample: Option<SampleSize>,
    pub luck_checks: Vec<LuckCheck>,
    pub stat_flags: Vec<StatFlag>,
}

impl RoleConfig {
    pub fn default_batting() -> Self {
        RoleConfig {
            weights: ScoringWeights::default_batting(),
            reference: PeripheralReference::default_batting(),
            sample: Some(SampleSize::new("PA", 100.0, 400.0)),
            luck_checks: Vec::new(),
            stat_flags: vec![
                StatFlag::new("elite OPS", vec![FlagCondition::above("OPS", 0.850)]),
                StatFlag::new("low OPS", vec![FlagCondition::below("OPS", 0.650)]),
                StatFlag::new(
                    "elite base stealer",
                    vec![
                        FlagCondition::above("SB", 20.0),
                        FlagCondition::below("CS", 0.25).per("SB"),
                    ],
                ),
                StatFlag::new(
                    "caught-stealing risk",
                    vec![FlagCondition::above("CS", 0.5).per("SB")],
                ),
                StatFlag::new("power hitter", vec![FlagCondition::above("XBS", 50.0)]),
                StatFlag::new("high hard-hit rate", vec![FlagCondition::above("Hard_Hit%", 45.0)]),
                StatFlag::new("low hard-hit rate", vec![FlagCondition::below("Hard_Hit%", 30.0)]),
                StatFlag::new("high barrel rate", vec![FlagCondition::above("Barrel%", 10.0)]),
            ],
        }
    }

    pub fn default_pitching() -> Self {
        RoleConfig {
            weights: ScoringWeights::default_pitching(),
            reference: PeripheralReference::default_pitching(),
            sample: Some(SampleSize::new("IP", 30.0, 100.0)),
            luck_checks: vec![
                LuckCheck::new("ERA", "WHIP", 0.5, Direction::Lower)
                    .modeled(0.8, 3.0, 2.5)
                    .labeled("ERA may regress", "ERA may improve"),
                LuckCheck::new("ERA", "xFIP", 0.5, Direction::Lower),
            ],
            stat_flags: vec![
                StatFlag::new("elite K%", vec![FlagCondition::above("K%", 27.0)]),
                StatFlag::new("low K%", vec![FlagCondition::below("K%", 18.0)]),
                StatFlag::new("elite control", vec![FlagCondition::below("BB%", 6.0)]),
                StatFlag::new("control issues", vec![FlagCondition::above("BB%", 10.0)]),
                StatFlag::new("excellent K/BB", vec![FlagCondition::above("K/BB", 4.0)]),
                StatFlag::new("poor K/BB", vec![FlagCondition::below("K/BB", 2.0)]),
                StatFlag::new("closer", vec![FlagCondition::above("SV", 20.0)]),
            ],
        }
    }

    pub fn default_for(role: Role) -> Self {
        match role {
            Role::Batter => Self::default_batting(),
            Role::Pitcher => Self::default_pitching(),
        }
    }
}

/// Full evaluator configuration: one immutable table set per role plus the
/// shared thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub batting: RoleConfig,
    pub pitching: RoleConfig,
    pub thresholds: Thresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            batting: RoleConfig::default_batting(),
            pitching: RoleConfig::default_pitching(),
            thresholds: Thresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn for_role(&self, role: Role) -> &RoleConfig {
        match role {
            Role::Batter => &self.batting,
            Role::Pitcher => &self.pitching,
        }
    }
}

fn section_name(role: Role) -> &'static str {
    match role {
        Role::Batter => "batting",
        Role::Pitcher => "pitching",
    }
}

// ---------------------------------------------------------------------------
// evaluator.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire evaluator.toml file. Every
/// section is optional and falls back to the built-in defaults.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EvaluatorFile {
    #[serde(default)]
    thresholds: Thresholds,
    batting: Option<RoleSection>,
    pitching: Option<RoleSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoleSection {
    fantasy_range: Option<ScoreRange>,
    scoring: Option<Vec<RawScoringEntry>>,
    peripherals: Option<Vec<RawMetricEntry>>,
    sample: Option<SampleSize>,
    luck_checks: Option<Vec<LuckCheck>>,
    stat_flags: Option<Vec<StatFlag>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScoringEntry {
    category: String,
    weight: f64,
    #[serde(default)]
    direction: Direction,
    ceiling: Option<f64>,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMetricEntry {
    metric: String,
    label: Option<String>,
    low: f64,
    high: f64,
    #[serde(default)]
    direction: Direction,
}

/// Merge a role section over that role's defaults and validate the result.
fn resolve_role(role: Role, section: Option<RoleSection>) -> Result<RoleConfig, ConfigError> {
    let defaults = RoleConfig::default_for(role);
    let Some(section) = section else {
        return Ok(defaults);
    };
    let name = section_name(role);

    let categories = match section.scoring {
        Some(entries) => entries
            .into_iter()
            .map(|e| match (e.direction, e.ceiling) {
                (Direction::Lower, None) => Err(invalid(
                    format!("{name}.scoring.{}.ceiling", e.category),
                    "lower-is-better categories need a ceiling",
                )),
                (direction, ceiling) => Ok(ScoringCategory {
                    name: e.category,
                    weight: e.weight,
                    direction,
                    ceiling: ceiling.unwrap_or(0.0),
                    aliases: e.aliases,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => defaults.weights.categories().to_vec(),
    };
    let range = section.fantasy_range.unwrap_or(defaults.weights.range());
    let weights = ScoringWeights::new(role, categories, range)?;

    let reference = match section.peripherals {
        Some(entries) => PeripheralReference::new(
            role,
            entries
                .into_iter()
                .map(|e| PeripheralMetric {
                    label: e.label.unwrap_or_else(|| e.metric.clone()),
                    name: e.metric,
                    low: e.low,
                    high: e.high,
                    direction: e.direction,
                })
                .collect(),
        )?,
        None => defaults.reference,
    };

    let sample = match section.sample {
        Some(s) => {
            s.validate(&format!("{name}.sample"))?;
            Some(s)
        }
        None => defaults.sample,
    };

    let luck_checks = match section.luck_checks {
        Some(checks) => {
            for c in &checks {
                c.validate(&format!("{name}.luck_checks.{}", c.actual))?;
            }
            checks
        }
        None => defaults.luck_checks,
    };

    let stat_flags = match section.stat_flags {
        Some(flags) => {
            let prefix = format!("{name}.stat_flags");
            for f in &flags {
                f.validate(&prefix)?;
            }
            flags
        }
        None => defaults.stat_flags,
    };

    Ok(RoleConfig {
        weights,
        reference,
        sample,
        luck_checks,
        stat_flags,
    })
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

fn parse_config(text: &str, path: &Path) -> Result<EngineConfig, ConfigError> {
    let file: EvaluatorFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    file.thresholds.validate()?;

    Ok(EngineConfig {
        batting: resolve_role(Role::Batter, file.batting)?,
        pitching: resolve_role(Role::Pitcher, file.pitching)?,
        thresholds: file.thresholds,
    })
}

/// Parse evaluator config from an in-memory TOML string.
pub fn load_config_str(text: &str) -> Result<EngineConfig, ConfigError> {
    parse_config(text, Path::new("<inline>"))
}

/// Load and validate evaluator config from a TOML file.
pub fn load_config_from(path: &Path) -> Result<EngineConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse_config(&text, path)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
