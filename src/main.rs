use std::error::Error;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use pgn_posgraph::config::{AppConfig, DEFAULT_LOG_FILTER};
use pgn_posgraph::engine::MoveSummary;
use pgn_posgraph::index;
use pgn_posgraph::pgn::{self, ParsedGame};

/// Replay a PGN transcript and print one JSON object per line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// PGN file to read.
    file: PathBuf,

    /// Print a summary of every move instead of index documents.
    #[arg(long, conflicts_with = "query")]
    moves: bool,

    /// Print the query encoding of each game's final position.
    #[arg(long)]
    query: bool,

    /// Full moves skipped at the start of each game (overrides PGN_NUM_SKIP).
    #[arg(long)]
    num_skip: Option<usize>,

    /// Delimiter between a reachable square and its weight (overrides PGN_PAYLOAD_DELIM).
    #[arg(long)]
    delim: Option<char>,
}

#[derive(Serialize)]
struct MoveLine<'a> {
    game_id: &'a str,
    #[serde(flatten)]
    summary: MoveSummary,
}

#[derive(Serialize)]
struct QueryLine<'a> {
    game_id: &'a str,
    query: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(num_skip) = cli.num_skip {
        config.num_skip = num_skip;
    }
    if let Some(delim) = cli.delim {
        config.payload_delim = delim;
    }

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pgn-posgraph: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    tracing::info!(
        "pgn-posgraph v{} reading {}",
        env!("CARGO_PKG_VERSION"),
        cli.file.display()
    );

    let text = std::fs::read_to_string(&cli.file)
        .map_err(|e| format!("cannot read {}: {e}", cli.file.display()))?;
    let games = pgn::parse_all(&text);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut lines = 0usize;
    for (index, parsed) in games.iter().enumerate() {
        let game_id = index.to_string();
        lines += write_game(&mut out, &game_id, parsed, cli, config)?;
    }
    out.flush()?;

    let aborted = games.iter().filter(|g| !g.is_complete()).count();
    tracing::info!(games = games.len(), aborted, lines, "transcript processed");
    Ok(())
}

fn write_game(
    out: &mut impl Write,
    game_id: &str,
    parsed: &ParsedGame,
    cli: &Cli,
    config: &AppConfig,
) -> Result<usize, Box<dyn Error>> {
    let game = &parsed.game;
    let mut written = 0;
    if cli.moves {
        for record in game.moves() {
            write_line(
                out,
                &MoveLine {
                    game_id,
                    summary: record.summary(),
                },
            )?;
            written += 1;
        }
    } else if cli.query {
        if let Some(query) = index::query_encoding(game, config.payload_delim) {
            write_line(out, &QueryLine { game_id, query })?;
            written += 1;
        }
    } else {
        for document in index::documents(game_id, game, config) {
            write_line(out, &document)?;
            written += 1;
        }
    }
    Ok(written)
}

fn write_line(out: &mut impl Write, value: &impl Serialize) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}
