use super::champion::{Champion, ChampionProfile};
use super::matchup::{ChampionId, ChampionKey, Role};
use crate::error::AppError;
use crate::names::ChampionNames;
use crate::snapshot::Snapshot;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::debug;

pub const DEFAULT_MIN_ROLE_ASSIGNMENT_RATE: f64 = 0.02;
pub const DEFAULT_MIN_PICK_RATE: f64 = 0.005;

/// Which champion+roles carry enough games to be analyzed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityFilter {
    pub role: Option<Role>,
    pub min_role_assignment_rate: f64,
    pub min_pick_rate: f64,
}

impl Default for ValidityFilter {
    fn default() -> Self {
        ValidityFilter {
            role: None,
            min_role_assignment_rate: DEFAULT_MIN_ROLE_ASSIGNMENT_RATE,
            min_pick_rate: DEFAULT_MIN_PICK_RATE,
        }
    }
}

impl ValidityFilter {
    pub fn for_role(role: Role) -> Self {
        ValidityFilter {
            role: Some(role),
            ..Default::default()
        }
    }

    /// Every champion of the role, however rarely played.
    pub fn unfiltered(role: Option<Role>) -> Self {
        ValidityFilter {
            role,
            min_role_assignment_rate: 0.0,
            min_pick_rate: 0.0,
        }
    }

    pub fn accepts(&self, profile: &ChampionProfile) -> bool {
        self.role.map_or(true, |role| profile.role() == role)
            && profile.pick_rate() >= self.min_pick_rate
            && profile.role_assignment_rate() >= self.min_role_assignment_rate
    }
}

/// Every champion+role of one snapshot. Profiles are fixed at construction.
#[derive(Debug)]
pub struct Roster {
    profiles: Vec<ChampionProfile>,
    by_key: HashMap<ChampionKey, usize>,
    names: Option<ChampionNames>,
    thresholds: ValidityFilter,
    default_valid: OnceLock<BTreeMap<Role, Vec<usize>>>,
    pick_rates: OnceLock<Vec<f64>>,
    raw_win_rates: OnceLock<Vec<f64>>,
    rank_normalized_win_rates: OnceLock<Vec<f64>>,
    matchup_normalized_win_rates: OnceLock<Vec<Option<f64>>>,
}

impl Roster {
    pub fn from_snapshot(snapshot: Snapshot, names: Option<ChampionNames>) -> Result<Self, AppError> {
        if snapshot.is_empty() {
            return Err(AppError::NoData("snapshot contains no champions".to_string()));
        }

        let mut profiles = Vec::with_capacity(snapshot.len());
        let mut by_key = HashMap::with_capacity(snapshot.len());
        for (index, (key, stats)) in snapshot.iter().enumerate() {
            profiles.push(ChampionProfile::new(*key, index, stats.clone()));
            by_key.insert(*key, index);
        }
        debug!(profiles = profiles.len(), "Built roster");

        Ok(Roster {
            profiles,
            by_key,
            names,
            thresholds: ValidityFilter::default(),
            default_valid: OnceLock::new(),
            pick_rates: OnceLock::new(),
            raw_win_rates: OnceLock::new(),
            rank_normalized_win_rates: OnceLock::new(),
            matchup_normalized_win_rates: OnceLock::new(),
        })
    }

    /// Replaces the validity thresholds every analysis of this roster uses.
    pub fn with_thresholds(mut self, min_role_assignment_rate: f64, min_pick_rate: f64) -> Self {
        self.thresholds = ValidityFilter {
            role: None,
            min_role_assignment_rate,
            min_pick_rate,
        };
        self.default_valid = OnceLock::new();
        for profile in &mut self.profiles {
            profile.reset_memo();
        }
        self
    }

    /// The roster's thresholds, restricted to `role` when given.
    pub fn validity(&self, role: Option<Role>) -> ValidityFilter {
        ValidityFilter { role, ..self.thresholds }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self) -> &[ChampionProfile] {
        &self.profiles
    }

    pub fn profile(&self, index: usize) -> &ChampionProfile {
        &self.profiles[index]
    }

    pub fn champions(&self) -> impl Iterator<Item = Champion<'_>> + '_ {
        (0..self.profiles.len()).map(move |index| Champion::new(self, index))
    }

    pub fn champion(&self, key: ChampionKey) -> Option<Champion<'_>> {
        self.by_key.get(&key).map(|&index| Champion::new(self, index))
    }

    pub fn champion_by_id(&self, champion_id: ChampionId, role: Role) -> Result<Champion<'_>, AppError> {
        self.champion(ChampionKey::new(champion_id, role)).ok_or_else(|| {
            AppError::UnknownChampion(format!("{} ({})", self.display_name(champion_id), role))
        })
    }

    /// Every role this champion has data for.
    pub fn champion_roles(&self, champion_id: ChampionId) -> Vec<Champion<'_>> {
        Role::ALL
            .iter()
            .filter_map(|&role| self.champion(ChampionKey::new(champion_id, role)))
            .collect()
    }

    /// Accepts a champion name or a numeric id.
    pub fn champion_by_name(&self, name: &str, role: Role) -> Result<Champion<'_>, AppError> {
        let champion_id = self
            .names
            .as_ref()
            .and_then(|names| names.id(name))
            .or_else(|| name.trim().parse::<ChampionId>().ok())
            .ok_or_else(|| AppError::UnknownChampion(name.to_string()))?;
        self.champion_by_id(champion_id, role)
    }

    pub fn display_name(&self, champion_id: ChampionId) -> String {
        self.names
            .as_ref()
            .and_then(|names| names.name(champion_id))
            .map(str::to_string)
            .unwrap_or_else(|| champion_id.to_string())
    }

    pub fn valid_champions(&self, filter: &ValidityFilter) -> Vec<Champion<'_>> {
        let roster_thresholds = filter.min_role_assignment_rate == self.thresholds.min_role_assignment_rate
            && filter.min_pick_rate == self.thresholds.min_pick_rate;
        if roster_thresholds {
            return self.roster_valid_champions(filter.role);
        }
        self.profiles
            .iter()
            .filter(|profile| filter.accepts(profile))
            .map(|profile| Champion::new(self, profile.index()))
            .collect()
    }

    // The roster's thresholds are queried for every blind pick evaluation
    fn roster_valid_champions(&self, role: Option<Role>) -> Vec<Champion<'_>> {
        let by_role = self.default_valid.get_or_init(|| {
            let mut by_role: BTreeMap<Role, Vec<usize>> = BTreeMap::new();
            for role in Role::ALL {
                let filter = self.validity(Some(role));
                by_role.insert(
                    role,
                    self.profiles
                        .iter()
                        .filter(|profile| filter.accepts(profile))
                        .map(ChampionProfile::index)
                        .collect(),
                );
            }
            by_role
        });

        let mut indices: Vec<usize> = match role {
            Some(role) => by_role.get(&role).cloned().unwrap_or_default(),
            None => by_role.values().flatten().copied().collect(),
        };
        indices.sort_unstable();
        indices.into_iter().map(|index| Champion::new(self, index)).collect()
    }

    // Roster-wide series, indexed like `profiles()`

    pub fn pick_rates(&self) -> &[f64] {
        self.pick_rates
            .get_or_init(|| self.profiles.iter().map(ChampionProfile::pick_rate).collect())
    }

    pub fn raw_win_rates(&self) -> &[f64] {
        self.raw_win_rates
            .get_or_init(|| self.profiles.iter().map(ChampionProfile::raw_win_rate).collect())
    }

    pub fn rank_normalized_win_rates(&self) -> &[f64] {
        self.rank_normalized_win_rates.get_or_init(|| {
            self.profiles
                .iter()
                .map(ChampionProfile::rank_normalized_win_rate)
                .collect()
        })
    }

    pub fn matchup_normalized_win_rates(&self) -> &[Option<f64>] {
        self.matchup_normalized_win_rates.get_or_init(|| {
            self.champions()
                .map(|champion| champion.matchup_normalized_win_rate())
                .collect()
        })
    }

    /// Sum of pick rates of every champion in `role`.
    pub fn role_pick_rate_total(&self, role: Role) -> f64 {
        self.profiles
            .iter()
            .filter(|profile| profile.role() == role)
            .map(ChampionProfile::pick_rate)
            .sum()
    }
}
