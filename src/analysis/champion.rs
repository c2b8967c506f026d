use super::elo::{rating_to_win_rate, win_rate_to_rating};
use super::matchup::{ChampionId, ChampionKey, MatchupRecord, Role};
use super::roster::Roster;
use crate::snapshot::ChampionStats;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Series are indexed by roster position; `None` means nothing was observed.
#[derive(Debug, Default)]
struct ProfileMemo {
    raw_matchup_win_rates: OnceLock<Vec<Option<f64>>>,
    normalized_matchup_win_rates: OnceLock<Vec<Option<f64>>>,
    matchup_pick_rates: OnceLock<Vec<Option<f64>>>,
    expected_matchup_win_rates: OnceLock<Vec<Option<f64>>>,
    pick_rate_deltas: OnceLock<Vec<Option<f64>>>,
    matchup_normalized_win_rate: OnceLock<Option<f64>>,
    blind_order: OnceLock<Vec<(usize, f64)>>,
}

/// Immutable statistics of one champion+role, owned by a [`Roster`].
#[derive(Debug)]
pub struct ChampionProfile {
    key: ChampionKey,
    index: usize,
    stats: ChampionStats,
    memo: ProfileMemo,
}

impl ChampionProfile {
    pub(crate) fn new(key: ChampionKey, index: usize, stats: ChampionStats) -> Self {
        ChampionProfile {
            key,
            index,
            stats,
            memo: ProfileMemo::default(),
        }
    }

    pub fn key(&self) -> ChampionKey {
        self.key
    }

    pub(crate) fn reset_memo(&mut self) {
        self.memo = ProfileMemo::default();
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn champion_id(&self) -> ChampionId {
        self.key.champion_id
    }

    pub fn role(&self) -> Role {
        self.key.role
    }

    pub fn sample_size(&self) -> u64 {
        self.stats.sample_size
    }

    pub fn raw_win_rate(&self) -> f64 {
        self.stats.raw_win_rate
    }

    /// How often this champion-role is picked.
    pub fn pick_rate(&self) -> f64 {
        self.stats.pick_rate
    }

    /// How often, when this champion is picked, it is played in this role.
    pub fn role_assignment_rate(&self) -> f64 {
        self.stats.role_assignment_rates.get(&self.key.role).copied().unwrap_or(0.0)
    }

    pub fn average_rank_win_rate(&self) -> f64 {
        self.stats.average_rank_win_rate
    }

    /// Win rate with the skill tier's baseline bias removed, centered on 50%.
    pub fn rank_normalized_win_rate(&self) -> f64 {
        self.stats.raw_win_rate - (self.stats.average_rank_win_rate - 0.5)
    }

    pub fn matchup(&self, opponent: &ChampionKey) -> Option<&MatchupRecord> {
        self.stats.matchups.get(opponent)
    }
}

/// A champion+role resolved against its roster.
#[derive(Clone, Copy)]
pub struct Champion<'r> {
    roster: &'r Roster,
    index: usize,
}

impl<'r> Champion<'r> {
    pub(crate) fn new(roster: &'r Roster, index: usize) -> Self {
        Champion { roster, index }
    }

    pub fn roster(&self) -> &'r Roster {
        self.roster
    }

    pub fn profile(&self) -> &'r ChampionProfile {
        self.roster.profile(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn key(&self) -> ChampionKey {
        self.profile().key
    }

    pub fn champion_id(&self) -> ChampionId {
        self.profile().champion_id()
    }

    pub fn role(&self) -> Role {
        self.profile().role()
    }

    pub fn name(&self) -> String {
        self.roster.display_name(self.champion_id())
    }

    pub fn sample_size(&self) -> u64 {
        self.profile().sample_size()
    }

    pub fn raw_win_rate(&self) -> f64 {
        self.profile().raw_win_rate()
    }

    pub fn pick_rate(&self) -> f64 {
        self.profile().pick_rate()
    }

    pub fn role_assignment_rate(&self) -> f64 {
        self.profile().role_assignment_rate()
    }

    pub fn rank_normalized_win_rate(&self) -> f64 {
        self.profile().rank_normalized_win_rate()
    }

    fn record_vs(&self, opponent: Champion<'_>) -> Option<&'r MatchupRecord> {
        self.profile().matchup(&opponent.key())
    }

    // Raw matchup win rates

    pub fn raw_matchup_win_rates(&self) -> &'r [Option<f64>] {
        let profile = self.profile();
        profile.memo.raw_matchup_win_rates.get_or_init(|| {
            self.roster
                .profiles()
                .iter()
                .map(|opponent| profile.matchup(&opponent.key).and_then(MatchupRecord::win_rate))
                .collect()
        })
    }

    pub fn raw_matchup_win_rate(&self, opponent: Champion<'_>) -> Option<f64> {
        self.raw_matchup_win_rates()[opponent.index]
    }

    // Normalized matchup win rates

    /// Averages both viewpoints of the pairing: `(A vs B + (1 - B vs A)) / 2`.
    pub fn normalized_matchup_win_rates(&self) -> &'r [Option<f64>] {
        let profile = self.profile();
        profile.memo.normalized_matchup_win_rates.get_or_init(|| {
            self.roster
                .champions()
                .map(|opponent| {
                    let ours = self.record_vs(opponent)?.win_rate()?;
                    let theirs = opponent.record_vs(*self)?.win_rate()?;
                    Some((ours + (1.0 - theirs)) / 2.0)
                })
                .collect()
        })
    }

    pub fn normalized_matchup_win_rate(&self, opponent: Champion<'_>) -> Option<f64> {
        self.normalized_matchup_win_rates()[opponent.index]
    }

    /// Games backing [`Champion::normalized_matchup_win_rate`], both viewpoints summed.
    pub fn normalized_matchup_sample_size(&self, opponent: Champion<'_>) -> u32 {
        let ours = self.record_vs(opponent).map_or(0, |r| r.matches);
        let theirs = opponent.record_vs(*self).map_or(0, |r| r.matches);
        ours + theirs
    }

    // Matchup pick rates

    /// Fraction of this champion's games played against each opponent.
    pub fn matchup_pick_rates(&self) -> &'r [Option<f64>] {
        let profile = self.profile();
        profile.memo.matchup_pick_rates.get_or_init(|| {
            let n = profile.sample_size();
            self.roster
                .profiles()
                .iter()
                .map(|opponent| {
                    if n == 0 {
                        return None;
                    }
                    profile.matchup(&opponent.key).map(|r| r.matches as f64 / n as f64)
                })
                .collect()
        })
    }

    pub fn matchup_pick_rate(&self, opponent: Champion<'_>) -> Option<f64> {
        self.matchup_pick_rates()[opponent.index]
    }

    /// Overall win rate with the games against `opponent` taken out.
    pub fn win_rate_excluding_opponent(&self, opponent: Champion<'_>) -> Option<f64> {
        let matchup_win_rate = self.normalized_matchup_win_rate(opponent)?;
        let matchup_pick_rate = self.matchup_pick_rate(opponent)?;
        let remaining = 1.0 - matchup_pick_rate;
        if remaining == 0.0 {
            return None;
        }
        Some((self.rank_normalized_win_rate() - matchup_win_rate * matchup_pick_rate) / remaining)
    }

    // Expected matchup win rates

    /// Matchup win rate predicted from each side's strength against everyone else.
    pub fn expected_matchup_win_rates(&self) -> &'r [Option<f64>] {
        let profile = self.profile();
        profile.memo.expected_matchup_win_rates.get_or_init(|| {
            self.roster
                .champions()
                .map(|opponent| {
                    let own_rating = win_rate_to_rating(self.win_rate_excluding_opponent(opponent)?);
                    let opponent_rating = win_rate_to_rating(opponent.win_rate_excluding_opponent(*self)?);
                    Some(rating_to_win_rate(own_rating - opponent_rating))
                })
                .collect()
        })
    }

    pub fn expected_matchup_win_rate(&self, opponent: Champion<'_>) -> Option<f64> {
        self.expected_matchup_win_rates()[opponent.index]
    }

    /// Positive when the matchup goes better than raw strength predicts.
    pub fn matchup_win_rate_delta(&self, opponent: Champion<'_>) -> Option<f64> {
        Some(self.normalized_matchup_win_rate(opponent)? - self.expected_matchup_win_rate(opponent)?)
    }

    /// Win rate if opponents were picked independently of this champion.
    pub fn matchup_normalized_win_rate(&self) -> Option<f64> {
        *self.profile().memo.matchup_normalized_win_rate.get_or_init(|| {
            let pick_rates = self.roster.pick_rates();
            let mut weighted = 0.0;
            let mut total_weight = 0.0;
            for opponent in self.roster.champions() {
                if opponent.role() != self.role() || opponent == *self {
                    continue;
                }
                if let Some(win_rate) = self.normalized_matchup_win_rate(opponent) {
                    weighted += win_rate * pick_rates[opponent.index];
                    total_weight += pick_rates[opponent.index];
                }
            }
            if total_weight > 0.0 {
                Some(weighted / total_weight)
            } else {
                None
            }
        })
    }

    // Pick rate deltas

    /// How much more (positive) or less often each opponent is faced than its
    /// base pick rate suggests.
    pub fn pick_rate_deltas(&self) -> &'r [Option<f64>] {
        let profile = self.profile();
        profile.memo.pick_rate_deltas.get_or_init(|| {
            let pick_rates = self.roster.pick_rates();
            let matchup_pick_rates = self.matchup_pick_rates();
            self.roster
                .profiles()
                .iter()
                .map(|opponent| {
                    let matchup_pick_rate = matchup_pick_rates[opponent.index]?;
                    let mut base_pick_rate = pick_rates[opponent.index];
                    if opponent.role() == profile.role() {
                        // A laner never faces themself, so the rest of the lane is seen more often
                        base_pick_rate /= 1.0 - profile.pick_rate() / 2.0;
                    }
                    Some(matchup_pick_rate - base_pick_rate / 2.0)
                })
                .collect()
        })
    }

    pub fn pick_rate_delta(&self, opponent: Champion<'_>) -> Option<f64> {
        self.pick_rate_deltas()[opponent.index]
    }

    // Blind pick

    /// Valid lane opponents with an observed matchup, worst for us first.
    fn blind_order(&self) -> &'r [(usize, f64)] {
        let profile = self.profile();
        profile.memo.blind_order.get_or_init(|| {
            let raw = self.raw_matchup_win_rates();
            let mut order: Vec<(usize, f64)> = self
                .roster
                .valid_champions(&self.roster.validity(Some(self.role())))
                .into_iter()
                .filter(|opponent| opponent != self)
                .filter_map(|opponent| raw[opponent.index].map(|win_rate| (opponent.index, win_rate)))
                .collect();
            order.sort_by(|a, b| a.1.total_cmp(&b.1));
            order
        })
    }

    /// Expected win rate when blind picking against an opponent with `pool_size`
    /// champions who always takes their best available matchup.
    ///
    /// Presence in the opponent's pool is approximated as `1 - (1 - pick_rate)^pool_size`.
    /// Probability mass left after the last opponent contributes nothing; the result is
    /// not renormalized. `None` when no opponent has matchup data.
    pub fn blind_expected_win_rate(&self, pool_size: u32, ignore: Option<Champion<'_>>) -> Option<f64> {
        let mut remaining = 1.0;
        let mut cumulative_win_rate = 0.0;
        let mut any_opponent = false;

        for &(index, win_rate) in self.blind_order() {
            if ignore.map_or(false, |ignored| ignored.index == index) {
                continue;
            }
            any_opponent = true;

            let pick_rate = self.roster.profile(index).pick_rate();
            let in_pool = 1.0 - (1.0 - pick_rate).powf(f64::from(pool_size));
            let picked = in_pool * remaining;
            cumulative_win_rate += picked * win_rate;
            remaining -= picked;
        }

        if any_opponent {
            Some(cumulative_win_rate)
        } else {
            None
        }
    }

    /// Blind expected win rate with each lane opponent banned, best ban first.
    pub fn blind_pick_ban_win_rate_improvements(&self, pool_size: u32) -> Vec<(Champion<'r>, f64)> {
        let mut bans: Vec<(Champion<'r>, f64)> = self
            .roster
            .valid_champions(&self.roster.validity(Some(self.role())))
            .into_iter()
            .filter(|opponent| opponent != self)
            .filter_map(|opponent| {
                self.blind_expected_win_rate(pool_size, Some(opponent))
                    .map(|win_rate| (opponent, win_rate))
            })
            .collect();
        bans.sort_by(|a, b| b.1.total_cmp(&a.1));
        bans
    }

    /// The ban that maximizes the blind expected win rate.
    pub fn best_blind_ban(&self, pool_size: u32) -> Option<(Champion<'r>, f64)> {
        let mut best: Option<(Champion<'r>, f64)> = None;

        for opponent in self.roster.valid_champions(&self.roster.validity(Some(self.role()))) {
            if opponent == *self {
                continue;
            }
            let Some(win_rate) = self.blind_expected_win_rate(pool_size, Some(opponent)) else {
                continue;
            };
            if best.map_or(true, |(_, best_win_rate)| win_rate > best_win_rate) {
                best = Some((opponent, win_rate));
            }
        }

        best
    }
}

impl PartialEq for Champion<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.roster, other.roster) && self.index == other.index
    }
}

impl Eq for Champion<'_> {}

impl Hash for Champion<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl PartialOrd for Champion<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Champion<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl fmt::Debug for Champion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Champion({} {})", self.champion_id(), self.role())
    }
}

impl fmt::Display for Champion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.role())
    }
}

impl Serialize for Champion<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Champion", 3)?;
        state.serialize_field("champion_id", &self.champion_id())?;
        state.serialize_field("name", &self.name())?;
        state.serialize_field("role", &self.role())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{lane_roster, three_champion_roster};

    const EPS: f64 = 1e-9;

    fn close(actual: Option<f64>, expected: f64) -> bool {
        actual.map_or(false, |value| (value - expected).abs() < EPS)
    }

    #[test]
    fn test_rank_normalized_win_rate() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        // 52% raw in a 51% tier
        assert!((a.rank_normalized_win_rate() - 0.51).abs() < EPS);
    }

    #[test]
    fn test_raw_matchup_win_rate_and_absence() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        let b = roster.champion_by_id(2, Role::Middle).unwrap();
        assert!(close(a.raw_matchup_win_rate(b), 0.6));
        // Nobody has played A into itself
        assert_eq!(a.raw_matchup_win_rate(a), None);
    }

    #[test]
    fn test_normalized_matchup_win_rate_hand_computed() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        let b = roster.champion_by_id(2, Role::Middle).unwrap();
        let c = roster.champion_by_id(3, Role::Middle).unwrap();

        // A vs B 60/100, B vs A 30/80 -> (0.6 + 0.625) / 2
        assert!(close(a.normalized_matchup_win_rate(b), 0.6125));
        // A vs C 45/100, C vs A 60/120 -> (0.45 + 0.5) / 2
        assert!(close(a.normalized_matchup_win_rate(c), 0.475));
        // B vs C 50/100, C vs B 40/100 -> (0.5 + 0.6) / 2
        assert!(close(b.normalized_matchup_win_rate(c), 0.55));
    }

    #[test]
    fn test_normalized_views_sum_to_one_only_when_both_observed() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        let b = roster.champion_by_id(2, Role::Middle).unwrap();
        let forward = a.normalized_matchup_win_rate(b).unwrap();
        let backward = b.normalized_matchup_win_rate(a).unwrap();
        assert!((forward + backward - 1.0).abs() < 1e-12);

        // D only recorded its side of the matchup against A
        let roster = lane_roster();
        let a = roster.champion_by_id(1, Role::Top).unwrap();
        let d = roster.champion_by_id(4, Role::Top).unwrap();
        assert!(d.raw_matchup_win_rate(a).is_some());
        assert_eq!(d.normalized_matchup_win_rate(a), None);
        assert_eq!(a.normalized_matchup_win_rate(d), None);
    }

    #[test]
    fn test_matchup_pick_rate_and_exclusion() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        let b = roster.champion_by_id(2, Role::Middle).unwrap();

        assert!(close(a.matchup_pick_rate(b), 0.1));
        // (0.51 - 0.6125 * 0.1) / 0.9
        assert!(close(a.win_rate_excluding_opponent(b), 0.49861111111111111));
        // B: rank normalized 0.49, normalized vs A 0.3875, pick rate 80 / 800
        assert!(close(b.win_rate_excluding_opponent(a), 0.50138888888888889));
    }

    #[test]
    fn test_expected_matchup_win_rate_hand_computed() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        let b = roster.champion_by_id(2, Role::Middle).unwrap();

        let own = win_rate_to_rating(0.49861111111111111);
        let theirs = win_rate_to_rating(0.50138888888888889);
        let expected = rating_to_win_rate(own - theirs);
        assert!(close(a.expected_matchup_win_rate(b), expected));
        // Roughly even, A slightly weaker outside this matchup
        assert!(expected < 0.5 && expected > 0.49);
        assert!(close(b.expected_matchup_win_rate(a), 1.0 - expected));
        assert!(close(a.matchup_win_rate_delta(b), 0.6125 - expected));
    }

    #[test]
    fn test_matchup_normalized_win_rate_weights_by_pick_rate() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        // Weights: B 0.04, C 0.06
        let expected = (0.6125 * 0.04 + 0.475 * 0.06) / 0.10;
        assert!(close(a.matchup_normalized_win_rate(), expected));
    }

    #[test]
    fn test_pick_rate_delta_discounts_self_matchups() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        let b = roster.champion_by_id(2, Role::Middle).unwrap();
        let base = 0.04 / (1.0 - 0.05 / 2.0);
        assert!(close(a.pick_rate_delta(b), 0.1 - base / 2.0));
        assert_eq!(a.pick_rate_delta(a), None);
    }

    #[test]
    fn test_normalized_sample_size_counts_both_sides() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        let b = roster.champion_by_id(2, Role::Middle).unwrap();
        assert_eq!(a.normalized_matchup_sample_size(b), 180);
        assert_eq!(b.normalized_matchup_sample_size(a), 180);
    }

    #[test]
    fn test_blind_expected_win_rate_hand_computed() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        // Visit C (45%) first, then B (60%)
        let in_pool_c = 1.0 - (1.0f64 - 0.06).powi(5);
        let in_pool_b = 1.0 - (1.0f64 - 0.04).powi(5);
        let picked_c = in_pool_c;
        let picked_b = in_pool_b * (1.0 - picked_c);
        let expected = picked_c * 0.45 + picked_b * 0.6;
        assert!(close(a.blind_expected_win_rate(5, None), expected));
    }

    #[test]
    fn test_blind_expected_win_rate_empty_opponent_pool_is_zero() {
        let roster = three_champion_roster();
        for champion in roster.champions() {
            assert_eq!(champion.blind_expected_win_rate(0, None), Some(0.0));
        }
    }

    #[test]
    fn test_blind_expected_win_rate_huge_opponent_pool() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        // Every opponent is certainly in the pool, so the worst matchup is always taken
        for pool_size in [i32::MAX as u32, 3_000_000_000, u32::MAX] {
            let win_rate = a.blind_expected_win_rate(pool_size, None).unwrap();
            assert!((0.0..=1.0).contains(&win_rate));
            assert!((win_rate - 0.45).abs() < EPS);
        }
    }

    #[test]
    fn test_blind_expected_win_rate_skips_ignored_opponent() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        let b = roster.champion_by_id(2, Role::Middle).unwrap();
        assert!(close(
            a.blind_expected_win_rate(5, Some(b)),
            (1.0 - (1.0f64 - 0.06).powi(5)) * 0.45
        ));
    }

    #[test]
    fn test_blind_expected_win_rate_without_lane_opponents() {
        let roster = lane_roster();
        let loner = roster.champion_by_id(5, Role::Jungle).unwrap();
        assert_eq!(loner.blind_expected_win_rate(5, None), None);
        assert!(loner.best_blind_ban(5).is_none());
        assert!(loner.blind_pick_ban_win_rate_improvements(5).is_empty());
    }

    #[test]
    fn test_best_blind_ban_is_exhaustive_maximum() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        let b = roster.champion_by_id(2, Role::Middle).unwrap();
        let c = roster.champion_by_id(3, Role::Middle).unwrap();

        // Unclaimed probability mass adds nothing, so banning the rarer B keeps
        // more weight on C than banning C keeps on B.
        let ban_b = (1.0 - (1.0f64 - 0.06).powi(5)) * 0.45;
        let ban_c = (1.0 - (1.0f64 - 0.04).powi(5)) * 0.6;
        assert!(ban_b > ban_c);

        let (ban, win_rate) = a.best_blind_ban(5).unwrap();
        assert_eq!(ban, b);
        assert!(close(Some(win_rate), ban_b));

        let improvements = a.blind_pick_ban_win_rate_improvements(5);
        assert_eq!(improvements.len(), 2);
        assert_eq!(improvements[0].0, b);
        assert_eq!(improvements[1].0, c);
        assert!(close(Some(improvements[1].1), ban_c));
    }

    #[test]
    fn test_display_uses_names_when_available() {
        let roster = three_champion_roster();
        let a = roster.champion_by_id(1, Role::Middle).unwrap();
        assert_eq!(a.to_string(), "Ahri (middle)");
        let json = serde_json::to_value(a).unwrap();
        assert_eq!(json["name"], "Ahri");
        assert_eq!(json["role"], "middle");
    }
}
