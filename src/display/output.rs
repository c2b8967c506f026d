use crate::analysis::champion::Champion;
use crate::analysis::matchup::Role;
use crate::analysis::pool::{ChampionDelta, PoolAnalysis};
use crate::analysis::report::{BlindPickRow, ComparisonRow, MatchupRow, TierRow};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct TierTableRow {
    #[tabled(rename = "#")]
    rank: String,
    champion: String,
    #[tabled(rename = "pick rate")]
    pick_rate: String,
    #[tabled(rename = "win rate")]
    raw_win_rate: String,
    #[tabled(rename = "rank normalized")]
    rank_normalized: String,
    #[tabled(rename = "matchup normalized")]
    matchup_normalized: String,
    #[tabled(rename = "counter impact")]
    counter_impact: String,
}

#[derive(Tabled)]
struct BlindTableRow {
    #[tabled(rename = "#")]
    rank: String,
    champion: String,
    #[tabled(rename = "pick rate")]
    pick_rate: String,
    #[tabled(rename = "blind win rate")]
    blind_win_rate: String,
    #[tabled(rename = "best ban")]
    best_ban: String,
    #[tabled(rename = "with ban")]
    with_ban: String,
}

#[derive(Tabled)]
struct MatchupTableRow {
    opponent: String,
    games: String,
    raw: String,
    normalized: String,
    expected: String,
    delta: String,
    #[tabled(rename = "faced")]
    matchup_pick_rate: String,
    #[tabled(rename = "frequency")]
    frequency_multiplier: String,
    impact: String,
}

#[derive(Tabled)]
struct ComparisonTableRow {
    opponent: String,
    first: String,
    second: String,
    difference: String,
    similarity: String,
}

#[derive(Tabled)]
struct CounterpickTableRow {
    opponent: String,
    share: String,
    #[tabled(rename = "best counterpick")]
    best: String,
    #[tabled(rename = "second best")]
    second: String,
    improvement: String,
    #[tabled(rename = "best possible")]
    best_possible: String,
    #[tabled(rename = "vs baseline")]
    baseline_impact: String,
}

#[derive(Tabled)]
struct PoolTableRow {
    champion: String,
    #[tabled(rename = "counterpick rate")]
    counterpick_rate: String,
    #[tabled(rename = "within 1%")]
    within_one_percent: String,
    #[tabled(rename = "counterpick wr")]
    counterpick_win_rate: String,
    marginal: String,
    #[tabled(rename = "per match")]
    per_match: String,
    #[tabled(rename = "over base")]
    over_base: String,
    blind: String,
    bans: String,
}

#[derive(Tabled)]
struct CandidateTableRow {
    champion: String,
    #[tabled(rename = "counterpick rate")]
    pick_rate: String,
    #[tabled(rename = "counterpick wr")]
    win_rate: String,
    marginal: String,
    #[tabled(rename = "per match")]
    per_match: String,
    #[tabled(rename = "over base")]
    over_base: String,
    #[tabled(rename = "helps against")]
    helps_against: String,
    blind: String,
    bans: String,
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn signed_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format!("+{:.2}%", v * 100.0).green().to_string(),
        Some(v) if v < 0.0 => format!("{:.2}%", v * 100.0).red().to_string(),
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "-".to_string(),
    }
}

fn with_win_rate(champion: Option<Champion<'_>>, win_rate: Option<f64>, sample_size: u32) -> String {
    match champion {
        Some(champion) => format!("{} {} (n={})", champion.name(), percent(win_rate), sample_size),
        None => "-".to_string(),
    }
}

fn deltas(entries: &[ChampionDelta<'_>]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}: {:+.2}%", entry.champion.name(), entry.delta * 100.0))
        .collect::<Vec<_>>()
        .join(", ")
}

fn header(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());
}

pub fn display_tier_list(role: Role, rows: &[TierRow<'_>]) {
    header(&format!("🏆 TIER LIST ({})", role));

    let table_rows: Vec<TierTableRow> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| TierTableRow {
            rank: format!("#{}", idx + 1),
            champion: row.champion.name(),
            pick_rate: percent(Some(row.pick_rate)),
            raw_win_rate: percent(Some(row.raw_win_rate)),
            rank_normalized: percent(Some(row.rank_normalized_win_rate)),
            matchup_normalized: percent(row.matchup_normalized_win_rate),
            counter_impact: signed_percent(row.counter_impact),
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}", table);

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Rank normalized: win rate with the skill tier's bias removed");
    println!("• Matchup normalized: win rate if opponents were drawn at their lane pick rates");
    println!("• Counter impact: positive when the champion benefits from who it tends to face\n");
}

pub fn display_blind_picks(role: Role, pool_size: u32, rows: &[BlindPickRow<'_>]) {
    header(&format!("🙈 BLIND PICK ({}, opponent pool of {})", role, pool_size));

    let table_rows: Vec<BlindTableRow> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| BlindTableRow {
            rank: format!("#{}", idx + 1),
            champion: row.champion.name(),
            pick_rate: percent(Some(row.pick_rate)),
            blind_win_rate: percent(row.blind_win_rate),
            best_ban: row.best_ban.map_or_else(|| "-".to_string(), |ban| ban.name()),
            with_ban: percent(row.best_ban_win_rate),
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}", table);

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Blind win rate assumes the opponent takes their best matchup from the pool");
    println!("• Probability left over after the last known matchup counts as a loss\n");
}

pub fn display_matchups(champion: Champion<'_>, rows: &[MatchupRow<'_>]) {
    header(&format!("⚔️  MATCHUPS FOR {}", champion.to_string().to_uppercase()));
    println!(
        "{} {} rank normalized, {} games\n",
        "📈 Overall:".bold(),
        percent(Some(champion.rank_normalized_win_rate())),
        champion.sample_size()
    );

    let table_rows: Vec<MatchupTableRow> = rows
        .iter()
        .map(|row| MatchupTableRow {
            opponent: row.opponent.to_string(),
            games: row.matches.to_string(),
            raw: percent(row.raw_win_rate),
            normalized: percent(row.normalized_win_rate),
            expected: percent(row.expected_win_rate),
            delta: signed_percent(row.win_rate_delta),
            matchup_pick_rate: percent(row.matchup_pick_rate),
            frequency_multiplier: row
                .frequency_multiplier
                .map_or_else(|| "-".to_string(), |m| format!("{:.2}x", m)),
            impact: signed_percent(row.impact),
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}", table);

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Delta: matchup win rate beyond what both champions' strength predicts");
    println!("• Frequency: how much more often the opponent is faced than picked");
    println!("• Impact: contribution of the matchup to the overall win rate\n");
}

pub fn display_comparison(first: Champion<'_>, second: Champion<'_>, rows: &[ComparisonRow<'_>]) {
    header(&format!("🔍 {} VS {}", first, second));

    let table_rows: Vec<ComparisonTableRow> = rows
        .iter()
        .map(|row| ComparisonTableRow {
            opponent: row.opponent.to_string(),
            first: signed_percent(row.first_delta),
            second: signed_percent(row.second_delta),
            difference: signed_percent(row.difference),
            similarity: signed_percent(row.similarity),
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}", table);

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• First/second: matchup win rate minus expected win rate for each champion");
    println!("• Difference: positive when {} handles the opponent better", second.name());
    println!("• Similarity: positive when the opponent is a good matchup for both\n");
}

pub fn display_pool_analysis(analysis: &PoolAnalysis<'_>, top: usize) {
    header(&format!("🎯 COUNTERPICKS ({})", analysis.role));
    let counterpick_rows: Vec<CounterpickTableRow> = analysis
        .counterpicks
        .iter()
        .map(|row| CounterpickTableRow {
            opponent: row.opponent.name(),
            share: percent(Some(row.opponent_pick_rate)),
            best: with_win_rate(Some(row.best_counterpick), row.best_win_rate, row.best_sample_size),
            second: with_win_rate(row.second_counterpick, row.second_win_rate, row.second_sample_size),
            improvement: signed_percent(row.improvement),
            best_possible: match (row.best_possible, row.remaining_improvement) {
                (Some(champion), Some(remaining)) => format!("{}: +{:.2}%", champion.name(), remaining * 100.0),
                _ => "-".to_string(),
            },
            baseline_impact: signed_percent(row.baseline_impact),
        })
        .collect();
    let mut table = Table::new(counterpick_rows);
    table.with(Style::rounded());
    println!("{}", table);

    header("📋 CHAMPION POOL");
    let pool_rows: Vec<PoolTableRow> = analysis
        .pool
        .iter()
        .map(|row| PoolTableRow {
            champion: row.champion.name(),
            counterpick_rate: percent(Some(row.counterpick_rate)),
            within_one_percent: percent(Some(row.within_one_percent_rate)),
            counterpick_win_rate: percent(row.counterpick_win_rate),
            marginal: signed_percent(row.marginal_improvement),
            per_match: signed_percent(row.marginal_improvement_per_match),
            over_base: signed_percent(row.improvement_over_base),
            blind: percent(row.blind_win_rate),
            bans: deltas(&row.best_bans),
        })
        .collect();
    let mut table = Table::new(pool_rows);
    table.with(Style::rounded());
    println!("{}", table);

    header("➕ CANDIDATES");
    if analysis.candidates.is_empty() {
        println!("{}", "No other valid champions in this role".yellow());
        return;
    }
    let candidate_rows: Vec<CandidateTableRow> = analysis
        .candidates
        .iter()
        .take(top)
        .map(|row| CandidateTableRow {
            champion: row.champion.name(),
            pick_rate: percent(Some(row.improvement_pick_rate)),
            win_rate: percent(row.improvement_win_rate),
            marginal: signed_percent(row.marginal_improvement),
            per_match: signed_percent(row.marginal_improvement_per_match),
            over_base: signed_percent(row.improvement_over_base),
            helps_against: deltas(&row.helps_against),
            blind: percent(row.blind_win_rate),
            bans: deltas(&row.best_bans),
        })
        .collect();
    let mut table = Table::new(candidate_rows);
    table.with(Style::rounded());
    println!("{}", table);

    if let Some(best) = analysis.candidates.first().filter(|row| row.improvement_pick_rate > 0.0) {
        println!("\n{}", "Best Addition".bold().green());
        println!(
            "  {} improves {} of matchups by {} per match",
            best.champion.name(),
            percent(Some(best.improvement_pick_rate)),
            signed_percent(best.marginal_improvement_per_match)
        );
    }

    println!();
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
