//! TM Coverage Command Line Interface
//!
//! # Usage
//!
//! ```bash
//! # Assess a phrase list (JSON array of strings or {"risk": ...} objects)
//! tm_coverage assess --phrases risks.json
//!
//! # Extract from a text report, then assess; export CSV, leave models untouched
//! tm_coverage assess --text fatf_report.txt --no-update --csv coverage_report.csv
//!
//! # Extraction only
//! tm_coverage extract --text fatf_report.txt --use-llm
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use tm_coverage::coverage::{status_distribution, write_csv};
use tm_coverage::extraction::{normalize_phrases, read_text_lossy, LlmClient, OpenAiClient, RawPhrase};
use tm_coverage::{
    CoverageConfig, CoverageEngine, CoverageReport, CoverageService, CoverageStatus,
    ExtractionOutcome, ModelStore, PersistOutcome, RiskExtractor, SemanticMatcher,
};

#[derive(Parser)]
#[command(name = "tm_coverage")]
#[command(version = "0.1.0")]
#[command(about = "Assess TM model coverage of AML/CFT risks extracted from regulatory documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML config file
    #[arg(long, short, global = true, env = "TM_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "table", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess risk phrases against the TM models
    Assess {
        /// JSON array of phrases
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        phrases: Option<PathBuf>,

        /// Plain-text document to extract phrases from
        #[arg(long)]
        text: Option<PathBuf>,

        /// TM model definitions file (overrides config)
        #[arg(long)]
        models: Option<PathBuf>,

        /// Disable semantic matching
        #[arg(long)]
        no_semantic: bool,

        /// Do not record new gaps in the model definitions
        #[arg(long)]
        no_update: bool,

        /// Use the LLM extractor when reading --text
        #[arg(long)]
        use_llm: bool,

        /// Write the coverage report as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Extract risk phrases from a document without assessing
    Extract {
        /// Plain-text document
        #[arg(long)]
        text: PathBuf,

        /// Use the LLM extractor
        #[arg(long)]
        use_llm: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = CoverageConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Assess {
            phrases,
            text,
            models,
            no_semantic,
            no_update,
            use_llm,
            csv,
        } => {
            let mut config = config;
            if let Some(models) = models {
                config.models_path = models;
            }
            if no_semantic {
                config.semantic_enabled = false;
            }
            if no_update {
                config.auto_update = false;
            }

            let phrases = match (phrases, text) {
                (Some(path), _) => load_phrases(&path)?,
                (None, Some(path)) => {
                    let outcome = extract(&config, &path, use_llm || config.llm_enabled).await?;
                    outcome.phrases
                }
                (None, None) => bail!("Either --phrases or --text is required"),
            };

            assess(&config, &phrases, cli.format, csv.as_deref())
        }
        Commands::Extract { text, use_llm } => {
            let outcome = extract(&config, &text, use_llm || config.llm_enabled).await?;
            print_extraction(&outcome, cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_phrases(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read phrases from {}", path.display()))?;
    let raw: Vec<RawPhrase> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of phrases", path.display()))?;
    Ok(normalize_phrases(raw))
}

async fn extract(config: &CoverageConfig, path: &Path, use_llm: bool) -> Result<ExtractionOutcome> {
    let text = read_text_lossy(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let llm: Option<Arc<dyn LlmClient>> = if use_llm {
        match OpenAiClient::from_env(Some(config.llm_model.clone())) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn LlmClient>),
            Err(e) => {
                tracing::warn!(error = %e, "LLM extractor unavailable, using heuristics only");
                None
            }
        }
    } else {
        None
    };

    let extractor = RiskExtractor::new(config.heuristics(), llm);
    Ok(extractor.extract(&text, use_llm).await)
}

fn assess(
    config: &CoverageConfig,
    phrases: &[String],
    format: OutputFormat,
    csv: Option<&Path>,
) -> Result<ExitCode> {
    let matcher = if config.semantic_enabled {
        SemanticMatcher::load(config.matcher_config())
    } else {
        SemanticMatcher::fallback_only()
    };

    let service = CoverageService::new(
        CoverageEngine::new(matcher),
        ModelStore::new(&config.models_path),
    );

    let report = service
        .run(phrases, config.assess_options())
        .context("Coverage assessment aborted")?;

    if let Some(path) = csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(&report.results, file).context("Failed to write CSV report")?;
        eprintln!("Coverage report written to {}", path.display());
    }

    print_report(&report, format)?;

    Ok(match report.persist {
        PersistOutcome::Failed(_) => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    })
}

fn print_extraction(outcome: &ExtractionOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "structured": outcome.structured,
                "extracted_phrases": outcome.phrases,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            if !outcome.structured.summary.is_empty() {
                println!("{} {}", "Summary:".bold(), outcome.structured.summary);
            }
            println!("{} ({})", "Extracted phrases".bold(), outcome.phrases.len());
            for phrase in &outcome.phrases {
                println!("  - {}", phrase);
            }
        }
    }
    Ok(())
}

fn print_report(report: &CoverageReport, format: OutputFormat) -> Result<()> {
    let distribution: BTreeMap<String, usize> = status_distribution(&report.results)
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect();

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "results": report.results,
                "distribution": distribution,
                "updated": report.updated,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            for r in &report.results {
                println!("{}  [{}]", r.model_name.bold(), colour_status(r.coverage_status));
                println!("    matched:     {}", r.matched_risks);
                println!("    not covered: {}", r.newly_added_not_covered);
            }
            println!();
            for (status, count) in &distribution {
                println!("{:<20} {}", status, count);
            }
        }
    }

    match &report.persist {
        PersistOutcome::Saved { backup_path } => {
            eprintln!("TM models updated (backup at {})", backup_path.display());
        }
        PersistOutcome::Failed(e) => {
            eprintln!("{} {}", "warning: TM model updates not saved:".yellow(), e);
        }
        PersistOutcome::NotNeeded => {}
    }
    Ok(())
}

fn colour_status(status: CoverageStatus) -> colored::ColoredString {
    match status {
        CoverageStatus::CompletelyCovered => status.as_str().green(),
        CoverageStatus::PartiallyCovered => status.as_str().yellow(),
        CoverageStatus::NotCovered => status.as_str().red(),
        CoverageStatus::NoRisksFound => status.as_str().dimmed(),
    }
}
