use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ChampionId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Top,
    Jungle,
    Middle,
    Bottom,
    Support,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Top, Role::Jungle, Role::Middle, Role::Bottom, Role::Support];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Top => "top",
            Role::Jungle => "jungle",
            Role::Middle => "middle",
            Role::Bottom => "bottom",
            Role::Support => "support",
        }
    }

    /// Field name holding match-ups against this role in a provider blob.
    pub fn enemy_field(&self) -> &'static str {
        match self {
            Role::Top => "enemy_top",
            Role::Jungle => "enemy_jungle",
            Role::Middle => "enemy_middle",
            Role::Bottom => "enemy_bottom",
            Role::Support => "enemy_support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(Role::Top),
            "jungle" | "jg" | "jgl" => Ok(Role::Jungle),
            "middle" | "mid" => Ok(Role::Middle),
            "bottom" | "bot" | "adc" => Ok(Role::Bottom),
            "support" | "sup" | "supp" | "utility" => Ok(Role::Support),
            _ => Err(AppError::UnknownRole(s.to_string())),
        }
    }
}

/// A champion played in a specific role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChampionKey {
    pub champion_id: ChampionId,
    pub role: Role,
}

impl ChampionKey {
    pub fn new(champion_id: ChampionId, role: Role) -> Self {
        ChampionKey { champion_id, role }
    }
}

/// Aggregate games between one champion+role and one opponent champion+role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchupRecord {
    pub matches: u32,
    pub wins: u32,
}

impl MatchupRecord {
    pub fn new(matches: u32, wins: u32) -> Result<Self, String> {
        if wins > matches {
            return Err(format!("{} wins recorded over only {} matches", wins, matches));
        }
        Ok(MatchupRecord { matches, wins })
    }

    /// `None` when no games were observed.
    pub fn win_rate(&self) -> Option<f64> {
        if self.matches == 0 {
            None
        } else {
            Some(self.wins as f64 / self.matches as f64)
        }
    }

    /// Pool the games of two observation windows.
    pub fn combine(&self, other: &MatchupRecord) -> MatchupRecord {
        MatchupRecord {
            matches: self.matches + other.matches,
            wins: self.wins + other.wins,
        }
    }
}
