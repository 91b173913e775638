use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use medicalc_voice::config::Config;
use medicalc_voice::conversation::{Conversation, GREETING};
use medicalc_voice::output::{self, TurnRecord};

#[derive(Parser)]
#[command(name = "medicalc_voice")]
#[command(about = "Voice-driven medical calculator for Spanish transcripts")]
struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transcript to handle as one turn; repeat for a multi-turn conversation
    #[arg(short, long)]
    say: Vec<String>,

    /// File with one transcript per line
    #[arg(short, long, conflicts_with = "say")]
    transcripts: Option<PathBuf>,

    /// Directory for the session log (turns.csv, session.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print each reply as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let config = match &cli.config {
        Some(path) => {
            let config = Config::from_file(path)
                .with_context(|| format!("failed to load configuration from {:?}", path))?;
            info!("Loaded configuration from {:?}", path);
            config
        },
        None => Config::default(),
    };

    let interactive = cli.say.is_empty() && cli.transcripts.is_none();
    let transcripts: Box<dyn Iterator<Item = io::Result<String>>> = if !cli.say.is_empty() {
        Box::new(cli.say.clone().into_iter().map(Ok))
    } else if let Some(path) = &cli.transcripts {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read transcripts from {:?}", path))?;
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        Box::new(lines.into_iter().map(Ok))
    } else {
        Box::new(io::stdin().lock().lines())
    };

    let mut conversation = Conversation::new(&config);
    let mut records = Vec::new();
    let mut stdout = io::stdout();

    if interactive {
        writeln!(stdout, "{}", GREETING)?;
    }

    for line in transcripts {
        let transcript = line.context("failed to read transcript")?;
        if transcript.trim().is_empty() {
            continue;
        }

        let reply = conversation.handle(&transcript);
        records.push(TurnRecord::new(records.len() + 1, &transcript, &reply));

        if cli.json {
            writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        } else {
            writeln!(stdout, "{}", reply.speech)?;
            if let (true, Some(result)) = (reply.show_details, &reply.result) {
                writeln!(stdout, "{}", output::details_text(result))?;
            }
        }
        stdout.flush()?;
    }

    if let Some(pending) = conversation.pending() {
        warn!("Conversation ended with an unanswered question for {}", pending.calculation);
    }

    if let Some(dir) = &cli.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {:?}", dir))?;
        output::save_results(&records, dir)?;
        info!("{} turn(s) saved to {:?}", records.len(), dir);
    }

    Ok(())
}
