//! Tourni - a terminal client for the Tournamate tournament manager.
//!
//! Sign in, browse tournaments and points tables, and record match results
//! from the command line. The session persists between runs.

mod commands;

use std::io;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Context;

#[derive(Parser, Debug)]
#[command(name = "tourni", version, about = "Tournamate points table and match results")]
struct Cli {
    /// Gateway base URL (overrides config and TOURNI_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in
    Login {
        username: Option<String>,
        /// Keep the password in the OS keychain for next time
        #[arg(long)]
        remember: bool,
    },
    /// Create an account and sign in with it
    Signup(SignupArgs),
    /// Sign out and clear the stored session
    Logout {
        /// Also forget the remembered password
        #[arg(long)]
        forget: bool,
    },
    /// Show who is signed in and which views are available
    Whoami,
    /// List tournaments
    Tournaments,
    /// List teams
    Teams,
    /// Show the points table of a tournament
    PointsTable { tournament_id: i64 },
    /// Record a match result (admins only)
    AddMatchResult(MatchResultArgs),
}

#[derive(Args, Debug)]
struct SignupArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct MatchResultArgs {
    #[arg(long)]
    tournament: i64,
    #[arg(long = "match")]
    match_number: u32,
    #[arg(long)]
    team_one: i64,
    #[arg(long)]
    team_two: i64,
    /// COMPLETED, TIED or NO_RESULT
    #[arg(long, default_value = "COMPLETED")]
    status: String,
    /// Winning team id; required for a completed match
    #[arg(long)]
    winner: Option<i64>,
    /// Runs as `team_one:team_two`
    #[arg(long, default_value = "0:0")]
    score: String,
    /// Wickets lost as `team_one:team_two`
    #[arg(long, default_value = "0:0")]
    wickets: String,
    /// Overs played as `team_one:team_two`
    #[arg(long, default_value = "0:0")]
    overs: String,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // RUST_LOG controls the level (e.g. RUST_LOG=tourni_core=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();
    let mut ctx = Context::new(cli.base_url)?;
    info!(base_url = ctx.base_url(), "tourni starting");

    match cli.command {
        Command::Login { username, remember } => ctx.login(username, remember).await,
        Command::Signup(args) => {
            ctx.signup(args.first_name, args.last_name, args.username, args.email)
                .await
        }
        Command::Logout { forget } => ctx.logout(forget),
        Command::Whoami => {
            ctx.whoami();
            Ok(())
        }
        Command::Tournaments => ctx.tournaments().await,
        Command::Teams => ctx.teams().await,
        Command::PointsTable { tournament_id } => ctx.points_table(tournament_id).await,
        Command::AddMatchResult(args) => {
            let request = commands::match_result_request(
                args.tournament,
                args.match_number,
                (args.team_one, args.team_two),
                &args.status,
                args.winner,
                (&args.score, &args.wickets, &args.overs),
            )?;
            ctx.add_match_result(request).await
        }
    }
}
