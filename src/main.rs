use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;

use tagsieve::elementfilter::parse_filter;
use tagsieve::mapdata::Element;
use tagsieve::quests::{CompiledQuest, QuestsConfig, compile_quests};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Quest definitions file (YAML)
    #[arg(short, long)]
    quests: Option<PathBuf>,

    /// Single ad-hoc filter expression (alternative to --quests)
    #[arg(short, long)]
    filter: Option<String>,

    /// Elements file, one JSON object per line
    #[arg(short, long)]
    elements: Option<PathBuf>,

    /// Validate the filters and exit
    #[arg(long)]
    check: bool,

    /// Print the Overpass prefilter fragment for each quest and exit
    #[arg(long)]
    emit: bool,

    /// Number of threads (default: all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("CLI: Failed to initialize thread pool")?;
    }

    let quests = load_quests(&cli)?;
    tracing::info!("Compiled {} quest filter(s)", quests.len());

    if cli.check {
        println!("{} filter(s) OK", quests.len());
        return Ok(());
    }

    if cli.emit {
        for quest in &quests {
            match quest.filter.to_overpass_string() {
                Some(fragment) => println!("{}: {}", quest.name, fragment),
                None => println!("{}: (kind selector only)", quest.name),
            }
        }
        return Ok(());
    }

    let elements_path = cli
        .elements
        .as_ref()
        .context("CLI: --elements is required unless --check or --emit is given")?;
    let elements = load_elements(elements_path)?;
    tracing::info!("Loaded {} element(s)", elements.len());

    let start = std::time::Instant::now();
    for quest in &quests {
        let count = elements
            .par_iter()
            .filter(|element| quest.filter.matches(element))
            .count();
        println!("{}: {} match(es)", quest.name, count);
    }

    let elapsed = start.elapsed();
    tracing::info!(
        "Scanned {} elements against {} quests in {:.2}s",
        elements.len(),
        quests.len(),
        elapsed.as_secs_f64()
    );

    Ok(())
}

fn load_quests(cli: &Cli) -> Result<Vec<CompiledQuest>> {
    match (&cli.quests, &cli.filter) {
        (Some(path), None) => {
            let config = QuestsConfig::load(path).with_context(|| {
                format!("CLI: Failed to load quest definitions from {}", path.display())
            })?;
            compile_quests(&config)
        }
        (None, Some(expr)) => {
            let filter = parse_filter(expr).context("CLI: Invalid --filter expression")?;
            Ok(vec![CompiledQuest {
                name: "filter".into(),
                filter,
            }])
        }
        _ => anyhow::bail!("CLI: exactly one of --quests or --filter is required"),
    }
}

fn load_elements(path: &Path) -> Result<Vec<Element>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("CLI: Failed to read elements from {}", path.display()))?;

    let mut elements = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let element: Element = serde_json::from_str(line)
            .with_context(|| format!("CLI: Invalid element on line {}", i + 1))?;
        elements.push(element);
    }
    Ok(elements)
}
