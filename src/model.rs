// kegel-pdf: data rows fed into the document templates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lanes played per player on a match day.
pub const LANES: usize = 4;

// ============================================================================
// Members
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub number: Option<u32>,
    pub last_name: String,
    pub first_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub member_since: Option<i32>,
}

impl Member {
    pub fn location(&self) -> String {
        format!("{} {}", self.postal_code, self.city).trim().to_string()
    }
}

// ============================================================================
// Match Day Results
// ============================================================================

/// Result of one player on one lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneResult {
    /// Pins on full throws ("Volle")
    pub full: u32,
    /// Pins on clearing throws ("Abräumen")
    pub clearing: u32,
    /// Throws without a pin ("Fehlwürfe")
    pub misses: u32,
}

impl LaneResult {
    pub fn total(&self) -> u32 {
        self.full + self.clearing
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerResult {
    pub name: String,
    #[serde(default)]
    pub lanes: Vec<LaneResult>,
}

impl PlayerResult {
    /// Sum over all lanes played, `None` when nothing has been entered yet.
    pub fn total(&self) -> Option<u32> {
        if self.lanes.is_empty() {
            return None;
        }
        Some(self.lanes.iter().take(LANES).map(LaneResult::total).sum())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDay {
    pub championship: String,
    pub number: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub players: Vec<PlayerResult>,
}

impl MatchDay {
    pub fn team_total(&self) -> Option<u32> {
        let totals: Vec<u32> = self.players.iter().filter_map(PlayerResult::total).collect();
        if totals.is_empty() {
            None
        } else {
            Some(totals.iter().sum())
        }
    }
}

// ============================================================================
// Settlement
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementEntry {
    pub name: String,
    #[serde(default)]
    pub fee_cents: i64,
    #[serde(default)]
    pub penalty_cents: i64,
    #[serde(default)]
    pub paid_cents: i64,
}

impl SettlementEntry {
    /// Positive when the member paid more than owed.
    pub fn balance_cents(&self) -> i64 {
        self.paid_cents - self.fee_cents - self.penalty_cents
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settlement {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub entries: Vec<SettlementEntry>,
}

// ============================================================================
// Tournament
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bracket {
    pub title: String,
    #[serde(default)]
    pub participants: Vec<String>,
    /// Names advancing out of each round, first round first.
    #[serde(default)]
    pub rounds: Vec<Vec<String>>,
}
