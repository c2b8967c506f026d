use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use draft_insight::analysis::roster::Roster;
use draft_insight::config::Config;
use draft_insight::display::output::{
    display_blind_picks, display_comparison, display_error, display_info, display_matchups, display_pool_analysis,
    display_success, display_tier_list,
};
use draft_insight::names::ChampionNames;
use draft_insight::snapshot::load_patches;
use draft_insight::{Champion, Role};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "Draft Insight")]
#[command(about = "Matchup statistics for champion select", long_about = None)]
struct Args {
    /// Directory holding lolalytics/<patch>.json and champion_ids.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Patch to load, e.g. 14.1, or a rolling window (7, 14, 30). Repeat to merge patches
    #[arg(long = "patch", global = true)]
    patches: Vec<String>,

    /// Only champion+roles picked at least this often (fraction)
    #[arg(long, global = true)]
    min_pick_rate: Option<f64>,

    /// Only champion+roles played in that role at least this often (fraction)
    #[arg(long, global = true)]
    min_role_rate: Option<f64>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank every valid champion of a role
    Tier { role: Role },

    /// Expected win rate when picking first, with the best ban
    Blind {
        role: Role,

        /// Champions the opponent can play (default: 5)
        #[arg(short, long)]
        pool_size: Option<u32>,
    },

    /// Every recorded matchup of one champion
    Matchups { champion: String, role: Role },

    /// How two champions fare against the same opponents
    Compare {
        first: String,
        second: String,
        role: Role,

        /// Include opponents from every role, not just the lane
        #[arg(long)]
        all_roles: bool,
    },

    /// Counterpicks, pool members and candidates for a champion pool
    Pool {
        role: Role,

        #[arg(required = true)]
        champions: Vec<String>,

        /// Champions the opponent can play (default: 5)
        #[arg(short, long)]
        pool_size: Option<u32>,

        /// Number of candidates to display
        #[arg(short, long, default_value = "10")]
        top: usize,
    },
}

fn main() {
    let args = Args::parse();
    setup_tracing_subscriber();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn setup_tracing_subscriber() {
    // stdout carries tables and JSON
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_target(false);
    tracing_subscriber::registry()
        .with(layer)
        .with(EnvFilter::from_default_env())
        .init();
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if !args.patches.is_empty() {
        config.patches = args.patches;
    }
    if let Some(min_pick_rate) = args.min_pick_rate {
        config.min_pick_rate = min_pick_rate;
    }
    if let Some(min_role_rate) = args.min_role_rate {
        config.min_role_assignment_rate = min_role_rate;
    }
    info!(data_dir = %config.data_dir.display(), patches = ?config.patches, "Loaded configuration");

    let quiet = args.json;
    if !quiet {
        display_info(&format!(
            "Loading patch {} from {}",
            config.patches.join(", "),
            config.data_dir.display()
        ));
    }

    let snapshot = load_patches(&config.data_dir, &config.patches, config.stale_after_hours)
        .with_context(|| format!("Failed to load snapshot for {}", config.patches.join(", ")))?;
    let names = ChampionNames::load(&config.data_dir).context("Failed to load champion names")?;
    if names.is_none() && !quiet {
        display_info("champion_ids.json not found, showing champion ids");
    }
    let roster = Roster::from_snapshot(snapshot, names)?
        .with_thresholds(config.min_role_assignment_rate, config.min_pick_rate);

    if !quiet {
        display_success(&format!("Loaded {} champion roles", roster.len()));
    }

    match args.command {
        Command::Tier { role } => {
            let rows = roster.tier_list(role)?;
            if quiet {
                print_json(&rows)?;
            } else {
                display_tier_list(role, &rows);
            }
        }
        Command::Blind { role, pool_size } => {
            let pool_size = pool_size.unwrap_or(config.pool_size);
            let total = roster.valid_champions(&roster.validity(Some(role))).len();

            let pb = if quiet { ProgressBar::hidden() } else { ProgressBar::new(total as u64) };
            pb.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb.set_message("Evaluating blind picks");
            let rows = roster.blind_pick_win_rates_with(role, pool_size, |_| pb.inc(1))?;
            pb.finish_with_message("✓ Blind picks evaluated");

            if quiet {
                print_json(&rows)?;
            } else {
                display_blind_picks(role, pool_size, &rows);
            }
        }
        Command::Matchups { champion, role } => {
            let champion = roster.champion_by_name(&champion, role)?;
            let rows = roster.matchup_report(champion)?;
            if quiet {
                print_json(&rows)?;
            } else {
                display_matchups(champion, &rows);
            }
        }
        Command::Compare {
            first,
            second,
            role,
            all_roles,
        } => {
            let first = roster.champion_by_name(&first, role)?;
            let second = roster.champion_by_name(&second, role)?;
            let rows = roster.compare_champions(first, second, !all_roles)?;
            if quiet {
                print_json(&rows)?;
            } else {
                display_comparison(first, second, &rows);
            }
        }
        Command::Pool {
            role,
            champions,
            pool_size,
            top,
        } => {
            let pool = champions
                .iter()
                .map(|name| roster.champion_by_name(name, role))
                .collect::<Result<Vec<Champion>, _>>()?;
            let analysis = roster.analyze_champion_pool(&pool, pool_size.unwrap_or(config.pool_size))?;
            if quiet {
                print_json(&analysis)?;
            } else {
                display_pool_analysis(&analysis, top);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}
