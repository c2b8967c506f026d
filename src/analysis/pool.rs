//! Champion pool evaluation: who to counterpick with, how much each pool
//! member carries, and which champion would add the most.

use super::champion::Champion;
use super::matchup::Role;
use super::report::{asc_missing_last, desc_missing_last};
use super::roster::Roster;
use crate::error::AppError;
use serde::Serialize;
use tracing::debug;

/// A win rate within this distance of the best counterpick counts as "almost best".
const NEAR_BEST_MARGIN: f64 = 0.01;
const TOP_ENTRIES: usize = 3;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChampionDelta<'r> {
    pub champion: Champion<'r>,
    pub delta: f64,
}

/// How the pool answers one lane opponent.
#[derive(Debug, Clone, Serialize)]
pub struct CounterpickRow<'r> {
    pub opponent: Champion<'r>,
    /// Share of the lane's games, summing to 1 across the table.
    pub opponent_pick_rate: f64,
    pub best_counterpick: Champion<'r>,
    pub best_win_rate: Option<f64>,
    pub best_sample_size: u32,
    pub second_counterpick: Option<Champion<'r>>,
    pub second_win_rate: Option<f64>,
    pub second_sample_size: u32,
    pub improvement: Option<f64>,
    /// Best answer among every valid laner, only when it beats the pool.
    pub best_possible: Option<Champion<'r>>,
    pub remaining_improvement: Option<f64>,
    pub baseline_impact: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolChampionRow<'r> {
    pub champion: Champion<'r>,
    pub counterpick_rate: f64,
    pub within_one_percent_rate: f64,
    pub counterpick_win_rate: Option<f64>,
    pub marginal_improvement: Option<f64>,
    pub marginal_improvement_per_match: Option<f64>,
    pub improvement_over_base: Option<f64>,
    pub blind_win_rate: Option<f64>,
    pub best_bans: Vec<ChampionDelta<'r>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateRow<'r> {
    pub champion: Champion<'r>,
    pub improvement_pick_rate: f64,
    pub improvement_win_rate: Option<f64>,
    pub marginal_improvement: Option<f64>,
    pub marginal_improvement_per_match: Option<f64>,
    pub improvement_over_base: Option<f64>,
    pub helps_against: Vec<ChampionDelta<'r>>,
    pub blind_win_rate: Option<f64>,
    pub best_bans: Vec<ChampionDelta<'r>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolAnalysis<'r> {
    pub role: Role,
    pub counterpicks: Vec<CounterpickRow<'r>>,
    pub pool: Vec<PoolChampionRow<'r>>,
    pub candidates: Vec<CandidateRow<'r>>,
}

impl Roster {
    /// # Panics
    ///
    /// If `pool` is empty or mixes roles.
    pub fn analyze_champion_pool<'r>(
        &'r self,
        pool: &[Champion<'r>],
        pool_size: u32,
    ) -> Result<PoolAnalysis<'r>, AppError> {
        assert!(!pool.is_empty(), "champion pool must not be empty");
        let role = pool[0].role();
        assert!(
            pool.iter().all(|champion| champion.role() == role),
            "champion pool must be a single role"
        );

        let lane = self.valid_in_role(role)?;
        let mut counterpicks: Vec<CounterpickRow> = lane
            .iter()
            .filter_map(|&opponent| counterpick_row(pool, &lane, opponent))
            .collect();

        let total_pick_rate: f64 = counterpicks.iter().map(|row| row.opponent_pick_rate).sum();
        if total_pick_rate <= 0.0 {
            return Err(AppError::NoData(format!("no opponents to counterpick in {}", role)));
        }
        for row in &mut counterpicks {
            row.opponent_pick_rate /= total_pick_rate;
        }

        let mean_win_rate: f64 = counterpicks
            .iter()
            .filter_map(|row| row.best_win_rate.map(|win_rate| row.opponent_pick_rate * win_rate))
            .sum();
        for row in &mut counterpicks {
            row.baseline_impact = row
                .best_win_rate
                .map(|win_rate| row.opponent_pick_rate * (win_rate - mean_win_rate));
        }
        counterpicks.sort_by(|a, b| asc_missing_last(a.baseline_impact, b.baseline_impact));

        let mut pool_rows: Vec<PoolChampionRow> = pool
            .iter()
            .map(|&champion| pool_champion_row(champion, &counterpicks, pool_size))
            .collect();
        pool_rows.sort_by(|a, b| desc_missing_last(a.marginal_improvement, b.marginal_improvement));

        let mut candidates: Vec<CandidateRow> = lane
            .iter()
            .filter(|candidate| !pool.contains(*candidate))
            .map(|&candidate| candidate_row(candidate, &counterpicks, pool_size))
            .collect();
        candidates.sort_by(|a, b| b.improvement_pick_rate.total_cmp(&a.improvement_pick_rate));

        debug!(
            role = %role,
            pool = pool.len(),
            opponents = counterpicks.len(),
            candidates = candidates.len(),
            "Analyzed champion pool"
        );

        Ok(PoolAnalysis {
            role,
            counterpicks,
            pool: pool_rows,
            candidates,
        })
    }
}

/// `None` when the opponent is the pool's only member.
fn counterpick_row<'r>(
    pool: &[Champion<'r>],
    lane: &[Champion<'r>],
    opponent: Champion<'r>,
) -> Option<CounterpickRow<'r>> {
    let mut ranked: Vec<(Champion<'r>, Option<f64>)> = pool
        .iter()
        .filter(|&&champion| champion != opponent)
        .map(|&champion| (champion, champion.normalized_matchup_win_rate(opponent)))
        .collect();
    ranked.sort_by(|a, b| desc_missing_last(a.1, b.1));

    let (best, best_win_rate) = *ranked.first()?;
    let second = ranked.get(1).copied();
    let second_win_rate = second.and_then(|(_, win_rate)| win_rate);

    let improvement = match (best_win_rate, second_win_rate) {
        (Some(best), Some(second)) => Some(best - second),
        _ => None,
    };

    let best_possible = lane
        .iter()
        .filter_map(|&champion| {
            champion
                .normalized_matchup_win_rate(opponent)
                .map(|win_rate| (champion, win_rate))
        })
        .fold(None, |best: Option<(Champion<'r>, f64)>, candidate| match best {
            Some(current) if current.1 >= candidate.1 => Some(current),
            _ => Some(candidate),
        });
    let (best_possible, remaining_improvement) = match (best_possible, best_win_rate) {
        (Some((champion, possible)), Some(current)) if possible > current => (Some(champion), Some(possible - current)),
        (Some((champion, possible)), None) => (Some(champion), Some(possible)),
        _ => (None, None),
    };

    Some(CounterpickRow {
        opponent,
        opponent_pick_rate: opponent.pick_rate(),
        best_counterpick: best,
        best_win_rate,
        best_sample_size: best.normalized_matchup_sample_size(opponent),
        second_counterpick: second.map(|(champion, _)| champion),
        second_win_rate,
        second_sample_size: second.map_or(0, |(champion, _)| champion.normalized_matchup_sample_size(opponent)),
        improvement,
        best_possible,
        remaining_improvement,
        baseline_impact: None,
    })
}

fn pool_champion_row<'r>(
    champion: Champion<'r>,
    counterpicks: &[CounterpickRow<'r>],
    pool_size: u32,
) -> PoolChampionRow<'r> {
    // Matchups without a known win rate were never truly counterpicked
    let picked: Vec<(&CounterpickRow, f64)> = counterpicks
        .iter()
        .filter(|row| row.best_counterpick == champion)
        .filter_map(|row| row.best_win_rate.map(|win_rate| (row, win_rate)))
        .collect();
    let counterpick_rate: f64 = picked.iter().map(|(row, _)| row.opponent_pick_rate).sum();

    let within_one_percent_rate = counterpicks
        .iter()
        .filter(|row| match (row.best_win_rate, champion.normalized_matchup_win_rate(row.opponent)) {
            (Some(best), Some(own)) => best - NEAR_BEST_MARGIN <= own,
            _ => false,
        })
        .map(|row| row.opponent_pick_rate)
        .sum();

    let (counterpick_win_rate, marginal_improvement, marginal_improvement_per_match, improvement_over_base) =
        if counterpick_rate > 0.0 {
            let win_rate = picked
                .iter()
                .map(|(row, win_rate)| row.opponent_pick_rate * win_rate)
                .sum::<f64>()
                / counterpick_rate;
            let marginal: f64 = picked
                .iter()
                .filter_map(|(row, _)| row.improvement.map(|improvement| row.opponent_pick_rate * improvement))
                .sum();
            (
                Some(win_rate),
                Some(marginal),
                Some(marginal / counterpick_rate),
                Some(win_rate - champion.raw_win_rate()),
            )
        } else {
            (None, None, None, None)
        };

    let blind_win_rate = champion.blind_expected_win_rate(pool_size, None);
    PoolChampionRow {
        champion,
        counterpick_rate,
        within_one_percent_rate,
        counterpick_win_rate,
        marginal_improvement,
        marginal_improvement_per_match,
        improvement_over_base,
        blind_win_rate,
        best_bans: best_bans(champion, blind_win_rate, pool_size),
    }
}

fn candidate_row<'r>(
    candidate: Champion<'r>,
    counterpicks: &[CounterpickRow<'r>],
    pool_size: u32,
) -> CandidateRow<'r> {
    // Raw rates: the candidate is judged by its own games, not both viewpoints
    let improving: Vec<(&CounterpickRow, f64, f64)> = counterpicks
        .iter()
        .filter_map(|row| {
            let win_rate = candidate.raw_matchup_win_rate(row.opponent)?;
            let best = row.best_win_rate?;
            (win_rate > best).then_some((row, win_rate, best))
        })
        .collect();
    let improvement_pick_rate: f64 = improving.iter().map(|(row, _, _)| row.opponent_pick_rate).sum();

    let mut result = CandidateRow {
        champion: candidate,
        improvement_pick_rate,
        improvement_win_rate: None,
        marginal_improvement: None,
        marginal_improvement_per_match: None,
        improvement_over_base: None,
        helps_against: Vec::new(),
        blind_win_rate: candidate.blind_expected_win_rate(pool_size, None),
        best_bans: Vec::new(),
    };
    result.best_bans = best_bans(candidate, result.blind_win_rate, pool_size);

    if improvement_pick_rate > 0.0 {
        let win_rate = improving
            .iter()
            .map(|(row, win_rate, _)| row.opponent_pick_rate * win_rate)
            .sum::<f64>()
            / improvement_pick_rate;
        let marginal: f64 = improving
            .iter()
            .map(|(row, win_rate, best)| row.opponent_pick_rate * (win_rate - best))
            .sum();

        let mut impacts: Vec<(f64, ChampionDelta)> = improving
            .iter()
            .map(|(row, win_rate, best)| {
                let delta = win_rate - best;
                (
                    row.opponent_pick_rate * delta,
                    ChampionDelta {
                        champion: row.opponent,
                        delta,
                    },
                )
            })
            .collect();
        impacts.sort_by(|a, b| b.0.total_cmp(&a.0));

        result.improvement_win_rate = Some(win_rate);
        result.marginal_improvement = Some(marginal);
        result.marginal_improvement_per_match = Some(marginal / improvement_pick_rate);
        result.improvement_over_base = Some(win_rate - candidate.raw_win_rate());
        result.helps_against = impacts.into_iter().take(TOP_ENTRIES).map(|(_, delta)| delta).collect();
    }

    result
}

fn best_bans<'r>(champion: Champion<'r>, base: Option<f64>, pool_size: u32) -> Vec<ChampionDelta<'r>> {
    let Some(base) = base else {
        return Vec::new();
    };
    champion
        .blind_pick_ban_win_rate_improvements(pool_size)
        .into_iter()
        .take(TOP_ENTRIES)
        .map(|(ban, win_rate)| ChampionDelta {
            champion: ban,
            delta: win_rate - base,
        })
        .collect()
}
