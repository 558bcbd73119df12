//! Command-line harness around the engine.
//!
//! Reads threat records, company profiles and factor lists from JSON files,
//! runs the requested component and returns a JSON report.

use crate::engine::{BatchSummary, RiskEngine, ThreatAnnotation};
use crate::errors::{ScoringError, ScoringResult};
use crate::models::{CompanyProfile, ScoredRiskFactor};
use crate::taxonomy::Taxonomy;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "threatscore",
    about = "Threatscore - threat risk and relevance scoring engine",
    version
)]
pub struct Args {
    /// Taxonomy file (JSON or TOML) replacing the builtin tables
    #[arg(long, global = true)]
    pub taxonomy: Option<PathBuf>,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging of all operations
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide progress bars and use quiet output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Score one threat record against a company profile
    Relevance {
        /// Threat record JSON file
        #[arg(long)]
        threat: PathBuf,
        /// Company profile JSON file
        #[arg(long)]
        profile: PathBuf,
    },
    /// Score every threat record under a directory against a company profile
    Batch {
        /// Directory of threat JSON files (one record or an array per file)
        #[arg(short, long)]
        dir: PathBuf,
        /// Company profile JSON file
        #[arg(long)]
        profile: PathBuf,
        /// Number of parallel scoring threads (0 = auto-detect)
        #[arg(short, long, default_value = "0")]
        threads: usize,
        /// Maximum directory traversal depth
        #[arg(long, default_value = "10")]
        max_depth: usize,
    },
    /// Correlate a description and IoCs with attack techniques
    Techniques {
        #[arg(short, long)]
        description: String,
        /// File hash, IP address or URL (repeatable)
        #[arg(long = "ioc")]
        iocs: Vec<String>,
    },
    /// Resolve a threat actor name against the actor registry
    Actor { name: String },
    /// Aggregate a JSON array of scored risk factors
    Composite {
        #[arg(long)]
        factors: PathBuf,
    },
    /// Show the active taxonomy version, fingerprint and tactics
    Taxonomy,
}

/// Result of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub generated_at: String,
    pub taxonomy_version: String,
    pub taxonomy_fingerprint: String,
    pub source_directory: String,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub summary: BatchSummary,
    pub annotations: Vec<ThreatAnnotation>,
}

/// Load the taxonomy named on the command line, the environment, or the builtin one.
pub fn load_taxonomy(args: &Args) -> ScoringResult<Taxonomy> {
    match &args.taxonomy {
        Some(path) => Taxonomy::load_from(path),
        None => Taxonomy::load_default(),
    }
}

/// Execute the selected subcommand and return its JSON report.
pub fn run(args: &Args) -> ScoringResult<serde_json::Value> {
    let taxonomy = Arc::new(load_taxonomy(args)?);
    let engine = RiskEngine::new(Arc::clone(&taxonomy))?;

    let report = match &args.command {
        Command::Relevance { threat, profile } => {
            let threat = read_json::<serde_json::Value>(threat)?;
            let profile = read_json::<serde_json::Value>(profile)?;
            serde_json::to_value(engine.relevance().analyze_json(&threat, &profile))?
        }
        Command::Batch {
            dir,
            profile,
            threads,
            max_depth,
        } => {
            let profile = read_json::<CompanyProfile>(profile)?;
            let report = run_batch(&engine, dir, &profile, *threads, *max_depth, args.quiet)?;
            if !args.quiet {
                print_summary(&report.summary);
            }
            serde_json::to_value(report)?
        }
        Command::Techniques { description, iocs } => {
            serde_json::to_value(engine.map_to_techniques(description, iocs))?
        }
        Command::Actor { name } => serde_json::to_value(engine.match_actor(name))?,
        Command::Composite { factors } => {
            let factors = read_json::<Vec<ScoredRiskFactor>>(factors)?;
            serde_json::to_value(engine.composite_risk(&factors))?
        }
        Command::Taxonomy => serde_json::json!({
            "version": taxonomy.version,
            "fingerprint": taxonomy.fingerprint()?,
            "techniques": taxonomy.techniques.len(),
            "actors": taxonomy.actors.len(),
            "tactics": taxonomy.tactics(),
        }),
    };

    Ok(report)
}

/// Write the report to `output`, or stdout when none is given.
pub fn emit(report: &serde_json::Value, output: Option<&Path>) -> ScoringResult<()> {
    let rendered = serde_json::to_string_pretty(report)?;
    match output {
        Some(path) => {
            fs::write(path, rendered).map_err(|e| ScoringError::io(e, path.to_path_buf()))?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn run_batch(
    engine: &RiskEngine,
    dir: &Path,
    profile: &CompanyProfile,
    threads: usize,
    max_depth: usize,
    quiet: bool,
) -> ScoringResult<BatchReport> {
    if !dir.is_dir() {
        return Err(ScoringError::invalid_input(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let files = collect_threat_files(dir, max_depth);
    log::info!("Discovered {} threat files under {}", files.len(), dir.display());

    let threads = if threads == 0 { num_cpus::get() } else { threads };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ScoringError::ThreadPool(e.to_string()))?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    if let Ok(progress_style) =
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files")
    {
        progress.set_style(progress_style);
    }

    let (loaded, annotations) = pool.install(|| {
        let loaded: Vec<Option<Vec<serde_json::Value>>> = files
            .par_iter()
            .map(|path| {
                // one record or an array of records; each is scored on its own
                let records = match read_json::<serde_json::Value>(path) {
                    Ok(serde_json::Value::Array(records)) => Some(records),
                    Ok(record) => Some(vec![record]),
                    Err(e) => {
                        log::warn!("Skipping {}: {}", path.display(), e);
                        None
                    }
                };
                progress.inc(1);
                records
            })
            .collect();

        let threats: Vec<serde_json::Value> = loaded.iter().flatten().flatten().cloned().collect();
        let annotations = engine.assess_value_batch(&threats, profile);
        (loaded, annotations)
    });
    progress.finish_and_clear();

    let files_loaded = loaded.iter().filter(|l| l.is_some()).count();
    let taxonomy = engine.taxonomy();

    Ok(BatchReport {
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        taxonomy_version: taxonomy.version.clone(),
        taxonomy_fingerprint: taxonomy.fingerprint()?,
        source_directory: dir.display().to_string(),
        files_loaded,
        files_skipped: files.len() - files_loaded,
        summary: BatchSummary::from_annotations(&annotations),
        annotations,
    })
}

/// JSON files under `dir`, sorted by path
pub fn collect_threat_files(dir: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ScoringResult<T> {
    let content = fs::read_to_string(path).map_err(|e| ScoringError::io(e, path.to_path_buf()))?;
    Ok(serde_json::from_str(&content)?)
}

fn print_summary(summary: &BatchSummary) {
    eprintln!(
        "    {} {}",
        style("▶").green(),
        style("Batch scoring completed").bold()
    );
    eprintln!("    ├─ Threats analysed: {}", style(summary.total).bold());
    eprintln!(
        "    ├─ Priority: {} critical, {} high, {} medium, {} low",
        style(summary.critical).red().bold(),
        style(summary.high).yellow().bold(),
        style(summary.medium).cyan(),
        style(summary.low).dim()
    );
    eprintln!("    └─ Degraded: {}", style(summary.degraded).magenta());
}
