//! Runline CLI - command-line access to the run line and Kelly engines

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use runline::context::{optimize_portfolio, PredictionContext};
use runline::core::{
    american_to_implied, BetRecommendation, KellyOptimizer, SolverConfig, SpreadConvention,
    SpreadEngine,
};
use runline::data::{all_acronyms, FeatureStore};
use runline::models::{KellyRequest, PredictQuery};
use runline::validation::{validate_kelly_request, validate_predict_query};

/// Default locations (relative to the working directory)
const DEFAULT_DATA_DIR: &str = "../data";
const DEFAULT_MODEL_PATH: &str = "../models/margin_model.json";

#[derive(Parser)]
#[command(name = "runline")]
#[command(author, version, about = "MLB run line edge CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cover probabilities and edges for a known margin estimate
    Edge {
        /// Predicted run differential (away - home)
        #[arg(long, allow_hyphen_values = true)]
        margin: f64,

        /// Standard deviation of the prediction
        #[arg(long)]
        std: f64,

        /// Run line, e.g. -1.5
        #[arg(long, allow_hyphen_values = true)]
        run_line: f64,

        /// American odds on the away side
        #[arg(long, allow_hyphen_values = true)]
        away_odds: f64,

        /// American odds on the home side
        #[arg(long, allow_hyphen_values = true)]
        home_odds: f64,

        /// Which side the run line is quoted for: away or home
        #[arg(long, default_value = "away")]
        convention: SpreadConvention,
    },

    /// Kelly portfolio sizing for a batch of bets
    Kelly {
        /// Win probabilities, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        probs: Vec<f64>,

        /// American odds, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        odds: Vec<f64>,

        /// Kelly multiplier (0.5 = half Kelly)
        #[arg(long, default_value = "1.0")]
        kelly: f64,

        /// Solver iteration cap
        #[arg(
            long,
            default_value = "200",
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        max_iterations: usize,
    },

    /// Full prediction from the model and feature tables
    Predict {
        /// Away team name or acronym
        #[arg(long)]
        away: String,

        /// Home team name or acronym
        #[arg(long)]
        home: String,

        /// Away starting pitcher
        #[arg(long)]
        away_pitcher: String,

        /// Home starting pitcher
        #[arg(long)]
        home_pitcher: String,

        #[arg(long, allow_hyphen_values = true)]
        run_line: f64,

        #[arg(long, allow_hyphen_values = true)]
        away_odds: f64,

        #[arg(long, allow_hyphen_values = true)]
        home_odds: f64,

        /// Model export (.onnx or .json)
        #[arg(long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Directory holding the feature tables
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,

        #[arg(long, default_value = "away")]
        convention: SpreadConvention,
    },

    /// List team acronyms
    Teams {
        /// Only teams present in this data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    println!("{}", format!("Runline CLI v{}", env!("CARGO_PKG_VERSION")).cyan().bold());
    println!();

    match cli.command {
        Commands::Edge {
            margin,
            std,
            run_line,
            away_odds,
            home_odds,
            convention,
        } => {
            let rec = SpreadEngine::new(convention)
                .evaluate(margin, std, run_line, away_odds, home_odds)
                .context("Failed to evaluate run line")?;
            print_recommendation(&rec, away_odds, home_odds)?;
        }
        Commands::Kelly {
            probs,
            odds,
            kelly,
            max_iterations,
        } => {
            run_kelly(probs, odds, kelly, max_iterations)?;
        }
        Commands::Predict {
            away,
            home,
            away_pitcher,
            home_pitcher,
            run_line,
            away_odds,
            home_odds,
            model,
            data_dir,
            convention,
        } => {
            let query = PredictQuery {
                away_team: away,
                home_team: home,
                away_pitcher,
                home_pitcher,
                run_line,
                away_odds,
                home_odds,
            };
            run_predict(&query, &model, &data_dir, convention)?;
        }
        Commands::Teams { data_dir } => {
            list_teams(data_dir.as_deref())?;
        }
    }

    Ok(())
}

fn print_recommendation(rec: &BetRecommendation, away_odds: f64, home_odds: f64) -> Result<()> {
    println!("{}", "Run line edge:".yellow().bold());
    println!(
        "  {:<6} {:>8} {:>10} {:>10} {:>8}",
        "Side", "Odds", "P(cover)", "Implied", "Edge"
    );
    for (side, odds, p, edge) in [
        ("Away", away_odds, rec.p_away, rec.away_profitability),
        ("Home", home_odds, rec.p_home, rec.home_profitability),
    ] {
        let implied = american_to_implied(odds)?;
        let edge_str = format!("{:+.2}%", edge * 100.0);
        println!(
            "  {:<6} {:>8} {:>9.2}% {:>9.2}% {:>8}",
            side,
            odds,
            p * 100.0,
            implied * 100.0,
            if edge > 0.0 {
                edge_str.green()
            } else {
                edge_str.normal()
            }
        );
    }

    println!();
    match rec.best_side() {
        Some((side, edge)) => println!(
            "{} {} ({:+.2}%)",
            "→".green(),
            format!("Bet {}", side).green().bold(),
            edge * 100.0
        ),
        None => println!("{}", "No positive edge on either side".dimmed()),
    }
    Ok(())
}

fn run_kelly(probs: Vec<f64>, odds: Vec<f64>, kelly: f64, max_iterations: usize) -> Result<()> {
    let request = validate_kelly_request(&KellyRequest {
        probabilities: probs,
        odds,
        kelly_fraction: kelly,
    })?;
    let optimizer = KellyOptimizer::new(SolverConfig {
        max_iterations,
        ..SolverConfig::default()
    });
    let sizing = optimize_portfolio(&optimizer, &request)?;

    println!("{}", "Kelly allocations:".yellow().bold());
    println!("  {:<4} {:>8} {:>8} {:>10}", "#", "Prob", "Odds", "Stake");
    for (i, ((p, o), a)) in request
        .probabilities
        .iter()
        .zip(&request.odds)
        .zip(&sizing.allocations)
        .enumerate()
    {
        let stake = format!("{:.2}%", a * 100.0);
        println!(
            "  {:<4} {:>8.3} {:>8} {:>10}",
            i + 1,
            p,
            o,
            if *a > 0.0 { stake.green() } else { stake.dimmed() }
        );
    }
    println!();
    println!(
        "{}: {:.2}% of bankroll",
        "Total".bold(),
        sizing.total_fraction * 100.0
    );
    Ok(())
}

fn run_predict(
    query: &PredictQuery,
    model: &Path,
    data_dir: &Path,
    convention: SpreadConvention,
) -> Result<()> {
    let validated = validate_predict_query(query)?;

    println!(
        "{} {} @ {}",
        "Predicting".green(),
        validated.matchup.away_team.bold(),
        validated.matchup.home_team.bold()
    );
    println!(
        "  {} vs {}",
        validated.matchup.away_pitcher, validated.matchup.home_pitcher
    );
    println!();

    let context = PredictionContext::load(model, data_dir, convention).with_context(|| {
        format!(
            "Failed to load model {:?} or feature tables in {:?}",
            model, data_dir
        )
    })?;
    let prediction = context.predict_game(&validated)?;

    println!(
        "{} {:+.2} runs (std {:.2})",
        "Predicted margin:".yellow().bold(),
        prediction.estimate.value,
        prediction.estimate.std_dev
    );
    println!();
    print_recommendation(&prediction.recommendation, query.away_odds, query.home_odds)
}

fn list_teams(data_dir: Option<&Path>) -> Result<()> {
    let teams: Vec<String> = match data_dir {
        Some(dir) => {
            let store = FeatureStore::load(dir)
                .with_context(|| format!("Failed to load feature tables in {:?}", dir))?;
            store.teams().into_iter().map(str::to_string).collect()
        }
        None => all_acronyms().into_iter().map(str::to_string).collect(),
    };

    if teams.is_empty() {
        bail!("No teams found");
    }

    println!("{} ({})", "Teams".yellow().bold(), teams.len());
    for chunk in teams.chunks(10) {
        println!("  {}", chunk.join("  "));
    }
    Ok(())
}
