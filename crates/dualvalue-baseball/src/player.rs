// Player rows and role resolution.
//
// A `PlayerRow` is the engine's only input shape: identity plus a flat map of
// stat name to value. League categories and advanced metrics share the map;
// the role's config decides which keys matter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which category sets, weights and reference ranges apply to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batter,
    Pitcher,
}

impl Role {
    /// Resolve a role from a single position token.
    ///
    /// Accepts the usual roster abbreviations ("SS", "OF", "SP", ...) as well
    /// as the spelled-out role names. Returns `None` for anything else.
    fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "C" | "1B" | "2B" | "3B" | "SS" | "LF" | "CF" | "RF" | "OF" | "IF" | "MI" | "CI"
            | "DH" | "UT" | "UTIL" | "B" | "BAT" | "BATTER" | "HITTER" => Some(Role::Batter),
            "P" | "SP" | "RP" | "PITCHER" => Some(Role::Pitcher),
            _ => None,
        }
    }

    /// Resolve a role from a position string such as `"SS"`, `"2B/SS"` or
    /// `"SP,RP"`.
    ///
    /// Every token must map to the same role. Two-way eligibility
    /// (`"SP/DH"`) is ambiguous and yields an error message.
    pub fn from_position(position: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = position
            .split(['/', ',', ' '])
            .filter(|t| !t.trim().is_empty())
            .collect();

        if tokens.is_empty() {
            return Err("no position given".into());
        }

        let mut resolved: Option<Role> = None;
        for token in tokens {
            let Some(role) = Role::from_token(token) else {
                return Err(format!("unrecognized position '{}'", token.trim()));
            };
            match resolved {
                Some(prev) if prev != role => {
                    return Err(format!(
                        "position '{}' mixes batter and pitcher eligibility",
                        position.trim()
                    ));
                }
                _ => resolved = Some(role),
            }
        }

        resolved.ok_or_else(|| "no position given".into())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Batter => "batter",
            Role::Pitcher => "pitcher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Player row
// ---------------------------------------------------------------------------

/// One player's raw statistics as delivered by the data layer.
///
/// Absent stats are simply missing from `stats`; they are never treated as
/// zero. Non-finite values are rejected on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub name: String,
    pub external_id: Option<String>,
    /// Raw position string, e.g. `"SS"`, `"OF/DH"`, `"SP"`.
    pub position: String,
    pub stats: BTreeMap<String, f64>,
}

impl PlayerRow {
    pub fn new(name: impl Into<String>, position: impl Into<String>) -> Self {
        PlayerRow {
            name: name.into(),
            external_id: None,
            position: position.into(),
            stats: BTreeMap::new(),
        }
    }

    /// Shorthand for a row tagged as a generic batter.
    pub fn batter(name: impl Into<String>) -> Self {
        Self::new(name, "BATTER")
    }

    /// Shorthand for a row tagged as a generic pitcher.
    pub fn pitcher(name: impl Into<String>) -> Self {
        Self::new(name, "P")
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    pub fn with_stat(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set_stat(name, value);
        self
    }

    /// Insert a stat value. Non-finite values are dropped so the key stays
    /// absent rather than poisoning downstream sums.
    pub fn set_stat(&mut self, name: impl Into<String>, value: f64) {
        if value.is_finite() {
            self.stats.insert(name.into(), value);
        }
    }

    /// Look up a stat, returning `None` when it is absent.
    pub fn stat(&self, name: &str) -> Option<f64> {
        self.stats.get(name).copied()
    }

    pub fn role(&self) -> Result<Role, String> {
        Role::from_position(&self.position)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
