use crate::analysis::matchup::{ChampionId, ChampionKey, MatchupRecord, Role};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Rolling windows the provider publishes instead of a patch number.
pub const ROLLING_WINDOWS: [&str; 3] = ["7", "14", "30"];

// Provider blob as scraped. Header fields may sit in `header` or at top level.
#[derive(Debug, Deserialize, Default)]
struct RawHeader {
    n: Option<u64>,
    wr: Option<f64>,
    pr: Option<f64>,
    lane: Option<String>,
    #[serde(rename = "avgWinRate")]
    avg_win_rate: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct RawNav {
    #[serde(default)]
    lanes: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct RawMatchupTuple(ChampionId, u32, u32, IgnoredAny);

#[derive(Debug, Deserialize)]
struct RawMatchupEntry {
    matches: u32,
    wins: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMatchups {
    Tuples(Vec<RawMatchupTuple>),
    Expanded(HashMap<String, RawMatchupEntry>),
}

#[derive(Debug, Deserialize)]
pub struct RawChampionStats {
    header: Option<RawHeader>,
    n: Option<u64>,
    wr: Option<f64>,
    pr: Option<f64>,
    lane: Option<String>,
    #[serde(rename = "avgWinRate")]
    avg_win_rate: Option<f64>,
    analysed: Option<u64>,
    nav: Option<RawNav>,
    enemy_top: Option<RawMatchups>,
    enemy_jungle: Option<RawMatchups>,
    enemy_middle: Option<RawMatchups>,
    enemy_bottom: Option<RawMatchups>,
    enemy_support: Option<RawMatchups>,
}

/// champion id -> role -> blob, as stored in one patch file. Blobs stay untyped
/// until [`Snapshot::from_raw`] so a bad field can be traced to its champion.
pub type RawSnapshot = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

/// Canonical statistics of one champion+role. Rates are fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct ChampionStats {
    pub sample_size: u64,
    pub analysed: Option<u64>,
    pub raw_win_rate: f64,
    pub pick_rate: f64,
    pub average_rank_win_rate: f64,
    pub role_assignment_rates: BTreeMap<Role, f64>,
    pub matchups: HashMap<ChampionKey, MatchupRecord>,
}

impl RawChampionStats {
    fn header(&self) -> &RawHeader {
        static EMPTY: RawHeader = RawHeader {
            n: None,
            wr: None,
            pr: None,
            lane: None,
            avg_win_rate: None,
        };
        self.header.as_ref().unwrap_or(&EMPTY)
    }

    fn enemy(&self, role: Role) -> Option<&RawMatchups> {
        match role {
            Role::Top => self.enemy_top.as_ref(),
            Role::Jungle => self.enemy_jungle.as_ref(),
            Role::Middle => self.enemy_middle.as_ref(),
            Role::Bottom => self.enemy_bottom.as_ref(),
            Role::Support => self.enemy_support.as_ref(),
        }
    }

    /// Resolve the blob into canonical form. `role_key` is the role the blob was
    /// filed under; a `lane` field inside the blob takes precedence.
    pub fn normalize(&self, champion_id: ChampionId, role_key: &str) -> Result<(Role, ChampionStats), AppError> {
        let header = self.header();
        let malformed = |reason: String| AppError::malformed(champion_id, role_key, reason);

        let role = match header.lane.as_deref().or(self.lane.as_deref()) {
            Some(lane) => lane.parse::<Role>().map_err(|_| malformed(format!("unknown lane '{}'", lane)))?,
            None => role_key.parse::<Role>().map_err(|_| malformed(format!("unknown role '{}'", role_key)))?,
        };

        let sample_size = header.n.or(self.n).ok_or_else(|| malformed("missing n".to_string()))?;
        let win_rate = header.wr.or(self.wr).ok_or_else(|| malformed("missing wr".to_string()))?;
        let pick_rate = header.pr.or(self.pr).ok_or_else(|| malformed("missing pr".to_string()))?;
        let average = header
            .avg_win_rate
            .or(self.avg_win_rate)
            .ok_or_else(|| malformed("missing avgWinRate".to_string()))?;
        let nav = self.nav.as_ref().ok_or_else(|| malformed("missing nav.lanes".to_string()))?;

        let mut role_assignment_rates = BTreeMap::new();
        for (lane, rate) in &nav.lanes {
            // Provider occasionally lists lanes we do not model
            if let Ok(lane_role) = lane.parse::<Role>() {
                role_assignment_rates.insert(lane_role, rate / 100.0);
            }
        }

        let mut matchups = HashMap::new();
        for enemy_role in Role::ALL {
            let raw = self
                .enemy(enemy_role)
                .ok_or_else(|| malformed(format!("missing {}", enemy_role.enemy_field())))?;
            let entries: Vec<(ChampionId, u32, u32)> = match raw {
                RawMatchups::Tuples(tuples) => tuples.iter().map(|t| (t.0, t.1, t.2)).collect(),
                RawMatchups::Expanded(map) => {
                    let mut entries = Vec::with_capacity(map.len());
                    for (id, entry) in map {
                        let id: ChampionId = id
                            .parse()
                            .map_err(|_| malformed(format!("invalid opponent id '{}'", id)))?;
                        entries.push((id, entry.matches, entry.wins));
                    }
                    entries
                }
            };
            for (opponent_id, matches, wins) in entries {
                let record = MatchupRecord::new(matches, wins)
                    .map_err(|reason| malformed(format!("vs {} ({}): {}", opponent_id, enemy_role, reason)))?;
                matchups.insert(ChampionKey::new(opponent_id, enemy_role), record);
            }
        }

        Ok((
            role,
            ChampionStats {
                sample_size,
                analysed: self.analysed,
                raw_win_rate: win_rate / 100.0,
                pick_rate: pick_rate / 100.0,
                average_rank_win_rate: average / 100.0,
                role_assignment_rates,
                matchups,
            },
        ))
    }
}

/// All champion+role statistics of one data set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    champions: BTreeMap<ChampionKey, ChampionStats>,
}

impl Snapshot {
    pub fn new() -> Self {
        Snapshot::default()
    }

    pub fn from_raw(raw: &RawSnapshot) -> Result<Self, AppError> {
        let mut snapshot = Snapshot::new();
        for (champion_id, roles) in raw {
            let id: ChampionId = champion_id
                .parse()
                .map_err(|_| AppError::malformed(champion_id, "-", "champion id is not an integer"))?;
            // Role keys are visited in order, so ties below keep the first one
            for (role_key, blob) in roles {
                let blob = RawChampionStats::deserialize(blob)
                    .map_err(|e| AppError::malformed(id, role_key, e.to_string()))?;
                let (role, stats) = blob.normalize(id, role_key)?;
                let key = ChampionKey::new(id, role);
                match snapshot.champions.get(&key) {
                    Some(existing) if existing.sample_size >= stats.sample_size => {
                        warn!(champion_id = id, role = %role, "Duplicate lane data, keeping larger sample");
                    }
                    Some(_) => {
                        warn!(champion_id = id, role = %role, "Duplicate lane data, keeping larger sample");
                        snapshot.champions.insert(key, stats);
                    }
                    None => {
                        snapshot.champions.insert(key, stats);
                    }
                }
            }
        }
        Ok(snapshot)
    }

    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let raw: RawSnapshot = serde_json::from_str(json)
            .map_err(|e| AppError::JsonError(format!("Failed to parse snapshot: {}", e)))?;
        Self::from_raw(&raw)
    }

    pub fn insert(&mut self, key: ChampionKey, stats: ChampionStats) {
        self.champions.insert(key, stats);
    }

    pub fn get(&self, key: &ChampionKey) -> Option<&ChampionStats> {
        self.champions.get(key)
    }

    /// Ordered by champion id, then role.
    pub fn iter(&self) -> impl Iterator<Item = (&ChampionKey, &ChampionStats)> {
        self.champions.iter()
    }

    pub fn len(&self) -> usize {
        self.champions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champions.is_empty()
    }

    /// Combine several observation windows into one snapshot.
    pub fn merge(epochs: Vec<Snapshot>) -> Snapshot {
        let mut grouped: BTreeMap<ChampionKey, Vec<ChampionStats>> = BTreeMap::new();
        for epoch in epochs {
            for (key, stats) in epoch.champions {
                grouped.entry(key).or_default().push(stats);
            }
        }

        let champions = grouped
            .into_iter()
            .map(|(key, mut stats)| {
                let merged = if stats.len() == 1 {
                    stats.remove(0)
                } else {
                    merge_stats(&stats)
                };
                (key, merged)
            })
            .collect();

        Snapshot { champions }
    }
}

fn merge_stats(epochs: &[ChampionStats]) -> ChampionStats {
    let total_n: u64 = epochs.iter().map(|s| s.sample_size).sum();
    let weight = |s: &ChampionStats| {
        if total_n > 0 {
            s.sample_size as f64 / total_n as f64
        } else {
            1.0 / epochs.len() as f64
        }
    };
    let weighted = |value: fn(&ChampionStats) -> f64| epochs.iter().map(|s| weight(s) * value(s)).sum::<f64>();

    let analysed: Option<u64> = epochs.iter().map(|s| s.analysed).sum();
    let pick_rate = match analysed {
        // Ten champion picks per analysed game
        Some(total) if total > 0 => 10.0 * total_n as f64 / total as f64,
        _ => weighted(|s| s.pick_rate),
    };

    let mut role_assignment_rates = BTreeMap::new();
    for role in Role::ALL {
        let rate: f64 = epochs
            .iter()
            .map(|s| weight(s) * s.role_assignment_rates.get(&role).copied().unwrap_or(0.0))
            .sum();
        if epochs.iter().any(|s| s.role_assignment_rates.contains_key(&role)) {
            role_assignment_rates.insert(role, rate);
        }
    }

    let mut matchups: HashMap<ChampionKey, MatchupRecord> = HashMap::new();
    for epoch in epochs {
        for (opponent, record) in &epoch.matchups {
            let entry = matchups.entry(*opponent).or_default();
            *entry = entry.combine(record);
        }
    }

    ChampionStats {
        sample_size: total_n,
        analysed,
        raw_win_rate: weighted(|s| s.raw_win_rate),
        pick_rate,
        average_rank_win_rate: weighted(|s| s.average_rank_win_rate),
        role_assignment_rates,
        matchups,
    }
}

pub fn validate_patches(patches: &[String]) -> Result<(), AppError> {
    if patches.is_empty() {
        return Err(AppError::InvalidPatch("at least one patch is required".to_string()));
    }

    let patch_format =
        Regex::new(r"^\d+\.\d+$").map_err(|e| AppError::InvalidPatch(format!("bad pattern: {}", e)))?;

    for patch in patches {
        if ROLLING_WINDOWS.contains(&patch.as_str()) {
            if patches.len() > 1 {
                return Err(AppError::InvalidPatch(format!(
                    "Unable to combine {} day data with any other patch",
                    patch
                )));
            }
        } else if !patch_format.is_match(patch) {
            return Err(AppError::InvalidPatch(format!(
                "{} does not follow ##.# or 7/14/30 format",
                patch
            )));
        }
    }

    Ok(())
}

/// One patch file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    pub patch: String,
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
}

impl SnapshotFile {
    pub fn locate(data_dir: &Path, patch: &str) -> Result<Self, AppError> {
        let path = data_dir.join("lolalytics").join(format!("{}.json", patch));
        let metadata = fs::metadata(&path)
            .map_err(|_| AppError::SnapshotNotFound(path.display().to_string()))?;
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

        Ok(SnapshotFile {
            patch: patch.to_string(),
            path,
            modified,
        })
    }

    pub fn load(&self) -> Result<Snapshot, AppError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::SnapshotNotFound(format!("{}: {}", self.path.display(), e)))?;
        let snapshot = Snapshot::from_json_str(&content)?;
        debug!(patch = %self.patch, entries = snapshot.len(), "Loaded snapshot file");
        Ok(snapshot)
    }

    /// Rolling windows keep moving, so old files stop describing the window.
    pub fn is_stale(&self, max_age_hours: u64) -> bool {
        match self.modified {
            Some(modified) => {
                let age = Utc::now().signed_duration_since(modified);
                age.num_hours() >= max_age_hours as i64
            }
            None => false,
        }
    }
}

/// Load and merge the requested patches from `<data_dir>/lolalytics/<patch>.json`.
pub fn load_patches(data_dir: &Path, patches: &[String], stale_after_hours: u64) -> Result<Snapshot, AppError> {
    validate_patches(patches)?;

    let mut epochs = Vec::with_capacity(patches.len());
    for patch in patches {
        let file = SnapshotFile::locate(data_dir, patch)?;
        if ROLLING_WINDOWS.contains(&patch.as_str()) && file.is_stale(stale_after_hours) {
            warn!(patch = %patch, path = %file.path.display(), "Snapshot is older than {}h", stale_after_hours);
        }
        epochs.push(file.load()?);
    }

    if epochs.len() == 1 {
        Ok(epochs.remove(0))
    } else {
        Ok(Snapshot::merge(epochs))
    }
}
