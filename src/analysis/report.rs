//! Roster-wide tables for the presentation layer.

use super::champion::Champion;
use super::matchup::Role;
use super::roster::Roster;
use crate::error::AppError;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct BlindPickRow<'r> {
    pub champion: Champion<'r>,
    pub pick_rate: f64,
    pub blind_win_rate: Option<f64>,
    pub best_ban: Option<Champion<'r>>,
    pub best_ban_win_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierRow<'r> {
    pub champion: Champion<'r>,
    pub pick_rate: f64,
    pub raw_win_rate: f64,
    pub rank_normalized_win_rate: f64,
    pub matchup_normalized_win_rate: Option<f64>,
    /// Rank normalized minus matchup normalized: how much of the win rate comes
    /// from the opponents this champion tends to draw.
    pub counter_impact: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupRow<'r> {
    pub opponent: Champion<'r>,
    pub matches: u32,
    pub raw_win_rate: Option<f64>,
    pub normalized_win_rate: Option<f64>,
    pub expected_win_rate: Option<f64>,
    pub win_rate_delta: Option<f64>,
    pub matchup_pick_rate: Option<f64>,
    pub pick_rate_delta: Option<f64>,
    pub frequency_multiplier: Option<f64>,
    pub impact: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow<'r> {
    pub opponent: Champion<'r>,
    pub first_delta: Option<f64>,
    pub second_delta: Option<f64>,
    /// Positive favors the second champion relative to its base strength.
    pub difference: Option<f64>,
    /// Positive means the opponent is a good matchup for both.
    pub similarity: Option<f64>,
}

/// Descending with missing values last.
pub(crate) fn desc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending with missing values last.
pub(crate) fn asc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Roster {
    pub(crate) fn valid_in_role(&self, role: Role) -> Result<Vec<Champion<'_>>, AppError> {
        let champions = self.valid_champions(&self.validity(Some(role)));
        if champions.is_empty() {
            return Err(AppError::NoData(format!("no valid champions in {}", role)));
        }
        Ok(champions)
    }

    /// Blind pick expected win rate and best ban of every valid champion in `role`.
    pub fn blind_pick_win_rates(&self, role: Role, pool_size: u32) -> Result<Vec<BlindPickRow<'_>>, AppError> {
        self.blind_pick_win_rates_with(role, pool_size, |_| {})
    }

    /// Like [`Roster::blind_pick_win_rates`], calling `on_row` after each champion.
    pub fn blind_pick_win_rates_with(
        &self,
        role: Role,
        pool_size: u32,
        mut on_row: impl FnMut(&BlindPickRow<'_>),
    ) -> Result<Vec<BlindPickRow<'_>>, AppError> {
        let mut rows: Vec<BlindPickRow> = self
            .valid_in_role(role)?
            .into_iter()
            .map(|champion| {
                let row = self.blind_pick_row(champion, pool_size);
                on_row(&row);
                row
            })
            .collect();
        rows.sort_by(|a, b| desc_missing_last(a.blind_win_rate, b.blind_win_rate));
        Ok(rows)
    }

    pub fn blind_pick_row<'r>(&'r self, champion: Champion<'r>, pool_size: u32) -> BlindPickRow<'r> {
        let best_ban = champion.best_blind_ban(pool_size);
        BlindPickRow {
            champion,
            pick_rate: champion.pick_rate(),
            blind_win_rate: champion.blind_expected_win_rate(pool_size, None),
            best_ban: best_ban.map(|(ban, _)| ban),
            best_ban_win_rate: best_ban.map(|(_, win_rate)| win_rate),
        }
    }

    /// Valid champions of `role`, strongest rank normalized win rate first.
    pub fn tier_list(&self, role: Role) -> Result<Vec<TierRow<'_>>, AppError> {
        let mut rows: Vec<TierRow> = self
            .valid_in_role(role)?
            .into_iter()
            .map(|champion| {
                let rank_normalized = champion.rank_normalized_win_rate();
                let matchup_normalized = champion.matchup_normalized_win_rate();
                TierRow {
                    champion,
                    pick_rate: champion.pick_rate(),
                    raw_win_rate: champion.raw_win_rate(),
                    rank_normalized_win_rate: rank_normalized,
                    matchup_normalized_win_rate: matchup_normalized,
                    counter_impact: matchup_normalized.map(|m| rank_normalized - m),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.rank_normalized_win_rate.total_cmp(&a.rank_normalized_win_rate));
        Ok(rows)
    }

    /// Every valid opponent `champion` has games against, most impactful first.
    pub fn matchup_report<'r>(&'r self, champion: Champion<'r>) -> Result<Vec<MatchupRow<'r>>, AppError> {
        let rank_normalized = champion.rank_normalized_win_rate();
        let mut rows: Vec<MatchupRow> = self
            .valid_champions(&self.validity(None))
            .into_iter()
            .filter(|opponent| *opponent != champion)
            .filter_map(|opponent| {
                let matches = champion.profile().matchup(&opponent.key())?.matches;
                let normalized = champion.normalized_matchup_win_rate(opponent);
                let matchup_pick_rate = champion.matchup_pick_rate(opponent);
                let pick_rate_delta = champion.pick_rate_delta(opponent);
                let pick_rate = opponent.pick_rate();

                let frequency_multiplier = match pick_rate_delta {
                    Some(delta) if pick_rate > 0.0 => Some((pick_rate + delta) / pick_rate),
                    _ => None,
                };
                let impact = match (normalized, matchup_pick_rate) {
                    (Some(win_rate), Some(faced)) => Some((win_rate - rank_normalized) * (faced - pick_rate / 2.0)),
                    _ => None,
                };

                Some(MatchupRow {
                    opponent,
                    matches,
                    raw_win_rate: champion.raw_matchup_win_rate(opponent),
                    normalized_win_rate: normalized,
                    expected_win_rate: champion.expected_matchup_win_rate(opponent),
                    win_rate_delta: champion.matchup_win_rate_delta(opponent),
                    matchup_pick_rate,
                    pick_rate_delta,
                    frequency_multiplier,
                    impact,
                })
            })
            .collect();

        if rows.is_empty() {
            return Err(AppError::NoData(format!("no matchups recorded for {}", champion)));
        }

        rows.sort_by(|a, b| desc_missing_last(a.impact.map(f64::abs), b.impact.map(f64::abs)));
        debug!(champion = %champion, rows = rows.len(), "Built matchup report");
        Ok(rows)
    }

    /// How two champions fare against the same opponents relative to their
    /// expected matchup win rates.
    pub fn compare_champions<'r>(
        &'r self,
        first: Champion<'r>,
        second: Champion<'r>,
        lane_only: bool,
    ) -> Result<Vec<ComparisonRow<'r>>, AppError> {
        let mut rows: Vec<ComparisonRow> = self
            .valid_champions(&self.validity(None))
            .into_iter()
            .filter(|opponent| !lane_only || opponent.role() == first.role() || opponent.role() == second.role())
            .map(|opponent| {
                let first_delta = matchup_surprise(first, opponent);
                let second_delta = matchup_surprise(second, opponent);
                let (difference, similarity) = match (first_delta, second_delta) {
                    (Some(a), Some(b)) => (Some(b - a), Some((a + b) / 2.0)),
                    _ => (None, None),
                };
                ComparisonRow {
                    opponent,
                    first_delta,
                    second_delta,
                    difference,
                    similarity,
                }
            })
            .filter(|row| row.first_delta.is_some() || row.second_delta.is_some())
            .collect();

        if rows.is_empty() {
            return Err(AppError::NoData(format!("no shared opponents for {} and {}", first, second)));
        }

        rows.sort_by(|a, b| desc_missing_last(a.difference, b.difference));
        Ok(rows)
    }
}

fn matchup_surprise(champion: Champion<'_>, opponent: Champion<'_>) -> Option<f64> {
    Some(champion.raw_matchup_win_rate(opponent)? - champion.expected_matchup_win_rate(opponent)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{lane_roster, three_champion_roster};

    #[test]
    fn test_missing_sorts_last_both_ways() {
        let mut values = vec![None, Some(0.2), Some(0.7), None, Some(0.4)];
        values.sort_by(|a, b| desc_missing_last(*a, *b));
        assert_eq!(values, vec![Some(0.7), Some(0.4), Some(0.2), None, None]);
        values.sort_by(|a, b| asc_missing_last(*a, *b));
        assert_eq!(values, vec![Some(0.2), Some(0.4), Some(0.7), None, None]);
    }

    #[test]
    fn test_blind_pick_rows_sorted_and_banned() {
        let roster = three_champion_roster();
        let rows = roster.blind_pick_win_rates(Role::Middle, 5).unwrap();
        assert_eq!(rows.len(), 3);
        for pair in rows.windows(2) {
            assert!(pair[0].blind_win_rate.unwrap() >= pair[1].blind_win_rate.unwrap());
        }
        for row in &rows {
            let ban = row.best_ban.unwrap();
            assert_ne!(ban, row.champion);
            assert!(row.best_ban_win_rate.is_some());
        }
    }

    #[test]
    fn test_blind_pick_progress_sees_every_row() {
        let roster = three_champion_roster();
        let mut seen = 0;
        let rows = roster.blind_pick_win_rates_with(Role::Middle, 5, |_| seen += 1).unwrap();
        assert_eq!(seen, rows.len());
    }

    #[test]
    fn test_empty_role_is_no_data() {
        let roster = three_champion_roster();
        assert!(matches!(roster.blind_pick_win_rates(Role::Top, 5), Err(AppError::NoData(_))));
        assert!(matches!(roster.tier_list(Role::Support), Err(AppError::NoData(_))));
    }

    #[test]
    fn test_tier_list_counter_impact() {
        let roster = three_champion_roster();
        let rows = roster.tier_list(Role::Middle).unwrap();
        assert_eq!(rows[0].champion.champion_id(), 1);
        for row in &rows {
            let impact = row.counter_impact.unwrap();
            let expected = row.rank_normalized_win_rate - row.matchup_normalized_win_rate.unwrap();
            assert!((impact - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_matchup_report_columns() {
        let roster = three_champion_roster();
        let ahri = roster.champion_by_id(1, Role::Middle).unwrap();
        let brand = roster.champion_by_id(2, Role::Middle).unwrap();
        let rows = roster.matchup_report(ahri).unwrap();
        assert_eq!(rows.len(), 2);

        let row = rows.iter().find(|r| r.opponent == brand).unwrap();
        assert_eq!(row.matches, 100);
        assert_eq!(row.raw_win_rate, Some(0.6));
        let delta = row.pick_rate_delta.unwrap();
        assert!((row.frequency_multiplier.unwrap() - (0.04 + delta) / 0.04).abs() < 1e-12);
        let impact = (0.6125 - 0.51) * (0.1 - 0.02);
        assert!((row.impact.unwrap() - impact).abs() < 1e-9);
    }

    #[test]
    fn test_matchup_report_without_games_is_no_data() {
        let roster = lane_roster();
        let loner = roster.champion_by_id(5, Role::Jungle).unwrap();
        assert!(matches!(roster.matchup_report(loner), Err(AppError::NoData(_))));
    }

    #[test]
    fn test_compare_champions_difference_and_similarity() {
        let roster = three_champion_roster();
        let ahri = roster.champion_by_id(1, Role::Middle).unwrap();
        let brand = roster.champion_by_id(2, Role::Middle).unwrap();
        let cassiopeia = roster.champion_by_id(3, Role::Middle).unwrap();

        let rows = roster.compare_champions(ahri, brand, true).unwrap();
        let row = rows.iter().find(|r| r.opponent == cassiopeia).unwrap();
        let a = ahri.raw_matchup_win_rate(cassiopeia).unwrap() - ahri.expected_matchup_win_rate(cassiopeia).unwrap();
        let b = brand.raw_matchup_win_rate(cassiopeia).unwrap() - brand.expected_matchup_win_rate(cassiopeia).unwrap();
        assert!((row.difference.unwrap() - (b - a)).abs() < 1e-12);
        assert!((row.similarity.unwrap() - (a + b) / 2.0).abs() < 1e-12);

        // Each champion has its own row against the other, one side only
        let ahri_row = rows.iter().find(|r| r.opponent == ahri).unwrap();
        assert!(ahri_row.first_delta.is_none());
        assert!(ahri_row.second_delta.is_some());
        assert!(ahri_row.difference.is_none());
    }
}
