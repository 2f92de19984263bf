//! KATO Resolve CLI
//!
//! Loads a reference snapshot once and resolves location texts to KATO codes.
//!
//! Usage:
//!   cargo run --features cli --bin kato-resolve -- \
//!     --reference data/kato.json \
//!     "Республика Казахстан, Кызылординская область, Шиелийский район"
//!
//!   # One location per line on stdin, JSON output
//!   cat locations.txt | cargo run --features cli --bin kato-resolve -- \
//!     --reference data/kato.json --stdin --json

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use kato_matcher::{split_location, CodeHierarchy, FileSource, MatcherConfig};

/// Output marker for subjects that need manual review
const NO_MATCH: &str = "NO_MATCH";

/// Resolve scraped location text to KATO codes
#[derive(Parser, Debug)]
#[command(name = "kato-resolve")]
#[command(about = "Resolve scraped location text to KATO codes")]
struct Args {
    /// Reference snapshot (JSON or YAML)
    #[arg(long, short = 'r', env = "KATO_REFERENCE")]
    reference: PathBuf,

    /// Matcher configuration (YAML); defaults apply when omitted
    #[arg(long, short = 'c', env = "KATO_MATCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Read location texts from stdin, one per line
    #[arg(long)]
    stdin: bool,

    /// Print one JSON object per location
    #[arg(long)]
    json: bool,

    /// Print hierarchy statistics to stderr after loading
    #[arg(long)]
    stats: bool,

    /// Location texts, e.g. "Республика Казахстан, Кызылординская область, Шиелийский район"
    locations: Vec<String>,
}

#[derive(Serialize)]
struct SubjectOutput<'a> {
    location: &'a str,
    names: Vec<String>,
    code: Option<&'a str>,
    strategy: Option<&'static str>,
    stopped_early: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kato_matcher=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MatcherConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MatcherConfig::default(),
    };

    let source = FileSource::new(&args.reference).sorted();
    let report = CodeHierarchy::load_from(&source, &config)
        .await
        .with_context(|| format!("loading reference {}", args.reference.display()))?;
    if !report.warnings.is_empty() {
        tracing::warn!(
            warnings = report.warnings.len(),
            "Reference snapshot has inconsistencies"
        );
    }
    let hierarchy = report.into_hierarchy();

    if args.stats {
        eprint!("{}", hierarchy.stats());
    }

    let mut locations = args.locations.clone();
    if args.stdin {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("reading stdin")?;
            if !line.trim().is_empty() {
                locations.push(line);
            }
        }
    }

    let mut matched = 0usize;
    let mut unmatched = 0usize;

    for location in &locations {
        let names = split_location(location, &config.location_delimiter);
        let resolution = hierarchy.resolve_detailed(&names);

        match resolution.code() {
            Some(_) => matched += 1,
            None => unmatched += 1,
        }

        if args.json {
            let output = SubjectOutput {
                location,
                code: resolution.code(),
                strategy: resolution.strategy().map(|s| s.as_str()),
                stopped_early: resolution.stopped_early,
                names,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else {
            println!("{}\t{}", resolution.code().unwrap_or(NO_MATCH), location);
        }
    }

    tracing::info!(
        total = locations.len(),
        matched,
        unmatched,
        "Resolution complete"
    );

    Ok(())
}
