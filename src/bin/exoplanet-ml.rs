//! exoplanet-ml CLI - Command-line interface for the KOI pipeline
//!
//! Prepares catalog exports, trains the ensemble, and inspects or queries the
//! persisted model.
//!
//! ## Example Usage
//!
//! ```bash
//! # Preprocess a catalog and print the stage report
//! exoplanet-ml prepare data/cumulative.csv
//!
//! # Train and persist artifacts into ./models
//! exoplanet-ml train data/cumulative.csv --models-dir models
//!
//! # Classify one candidate
//! exoplanet-ml predict --input candidate.json
//!
//! # Inspect the persisted model
//! exoplanet-ml metrics
//! exoplanet-ml importance --top 5
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use exoplanet_ml::artifacts::ArtifactStore;
use exoplanet_ml::config::{PipelineConfig, TrainingConfig};
use exoplanet_ml::pipeline::{ExoplanetPipeline, PipelineOutput};
use exoplanet_ml::serving::{AstronomicalParams, EnsembleRepository, ExoplanetService, ModelRepository};
use exoplanet_ml::training::{ClassificationMetrics, ModelTrainer};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

/// exoplanet-ml: Kepler KOI preprocessing and exoplanet classification
#[derive(Parser)]
#[command(name = "exoplanet-ml")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Kepler KOI preprocessing and exoplanet classification", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Models directory (overrides the config file)
    #[arg(short, long, global = true)]
    models_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the preprocessing pipeline and print its report
    Prepare {
        /// KOI catalog export (CSV)
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Write the feature-name manifest into the models directory
        #[arg(long)]
        write_manifest: bool,

        /// Write the pipeline report as JSON
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Run the pipeline, train the ensemble and persist artifacts
    Train {
        /// KOI catalog export (CSV)
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Trees in the random forest
        #[arg(short = 'n', long)]
        n_estimators: Option<usize>,

        /// Seed for resampling and model fitting
        #[arg(short = 's', long)]
        seed: Option<u64>,
    },

    /// Classify one candidate from a JSON request
    Predict {
        /// JSON file with `features` and optional `params`
        #[arg(short = 'i', long)]
        input: PathBuf,
    },

    /// Show metrics of the persisted model
    Metrics,

    /// Show feature importances of the persisted model
    Importance {
        /// Number of features to show
        #[arg(short = 't', long, default_value = "10")]
        top: usize,
    },

    /// Show configuration and model status
    Info,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_models_dir")]
    models_dir: PathBuf,
    #[serde(default)]
    pipeline: PipelineConfig,
    #[serde(default)]
    training: TrainingConfig,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".exoplanet-ml").join("config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            pipeline: PipelineConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Self {
        let explicit = path.is_some();
        let config_path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) => p,
            None => return Config::default(),
        };
        if !config_path.exists() {
            if explicit {
                eprintln!(
                    "{} Config file {} not found, using defaults",
                    "Warning:".yellow(),
                    config_path.display()
                );
            }
            return Config::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => return config,
                Err(e) => {
                    eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e);
                }
            },
            Err(e) => {
                eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e);
            }
        }

        Config::default()
    }
}

/// Body of `predict --input`
#[derive(Debug, Deserialize)]
struct PredictRequest {
    features: HashMap<String, f64>,
    #[serde(default)]
    params: AstronomicalParams,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = Config::load(cli.config.as_deref());
    if let Some(dir) = cli.models_dir {
        config.models_dir = dir;
    }

    if cli.verbose {
        println!(
            "{} v{}",
            "exoplanet-ml".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Models dir: {}",
            config.models_dir.display().to_string().dimmed()
        );
    }

    let result = match cli.command {
        Commands::Prepare {
            input,
            write_manifest,
            output,
        } => run_prepare(&config, &input, write_manifest, output.as_deref()),
        Commands::Train {
            input,
            n_estimators,
            seed,
        } => {
            if let Some(n) = n_estimators {
                config.training = config.training.with_n_estimators(n);
            }
            if let Some(seed) = seed {
                config.pipeline = config.pipeline.with_random_seed(seed);
                config.training = config.training.with_random_seed(seed);
            }
            run_train(&config, &input)
        }
        Commands::Predict { input } => run_predict(&config, &input),
        Commands::Metrics => show_metrics(&config),
        Commands::Importance { top } => show_importance(&config, top),
        Commands::Info => show_info(&config),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn run_pipeline(config: &Config, input: &Path) -> anyhow::Result<PipelineOutput> {
    if !input.exists() {
        bail!("Catalog file not found: {}", input.display());
    }
    let pipeline = ExoplanetPipeline::new(config.pipeline.clone())?;

    let pb = spinner("Running preprocessing pipeline...")?;
    let output = pipeline.run(input);
    pb.finish_and_clear();

    output.with_context(|| format!("pipeline failed on {}", input.display()))
}

fn print_report(output: &PipelineOutput) {
    let report = &output.report;
    println!("{}", "Pipeline Summary".green().bold());
    println!("{}", "================".green());
    for record in &report.stages {
        println!(
            "  {:<28} {:>7} -> {:<7} {}",
            record.stage.name().bold(),
            record.rows_in,
            record.rows_out,
            format!("{} columns", record.columns_out).dimmed()
        );
    }
    println!();

    if let Some(filter) = &report.filter {
        println!("{}", "Scientific filters".bold());
        println!("  {} {}", "Unlabelled rows:".bold(), filter.missing_label_removed);
        for (column, removed) in &filter.removed_per_filter {
            println!("  {:<20} {} removed", column, removed);
        }
        println!(
            "  {} {:.2}%",
            "Total reduction:".bold(),
            filter.reduction_pct()
        );
        println!();
    }

    println!("{}", "Output".bold());
    for (label, count) in &report.class_counts {
        println!("  {} {}: {}", "Class".bold(), label, count);
    }
    println!("  {} {}", "Features:".bold(), output.n_features());
    println!("  {} {}", "Samples:".bold(), output.n_samples());
    for (idx, fold) in output.splits.iter().enumerate() {
        println!(
            "  Fold {}: train={} test={} ({})",
            idx + 1,
            fold.train_len(),
            fold.test_len(),
            format!("{:.1}% train", fold.train_ratio(output.n_samples()) * 100.0).dimmed()
        );
    }
    println!();
}

fn run_prepare(
    config: &Config,
    input: &Path,
    write_manifest: bool,
    output_path: Option<&Path>,
) -> anyhow::Result<()> {
    println!("{}", "Preparing catalog...".cyan().bold());
    println!();

    let start = Instant::now();
    let output = run_pipeline(config, input)?;
    print_report(&output);

    if write_manifest {
        let store = ArtifactStore::new(&config.models_dir);
        store.save_feature_names(&output.feature_names)?;
        println!(
            "{} Manifest saved to: {}",
            "✓".green().bold(),
            store.feature_names_path().display()
        );
    }

    if let Some(path) = output_path {
        let json = serde_json::to_string_pretty(&output.report)?;
        fs::write(path, json)?;
        println!(
            "{} Report saved to: {}",
            "✓".green().bold(),
            path.display()
        );
    }

    println!(
        "{} Finished in {:.2}s",
        "✓".green().bold(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn print_metrics(metrics: &ClassificationMetrics) {
    println!("{}", "Performance Summary".green().bold());
    println!("{}", "===================".green());
    println!("  {} {}", "Model:".bold(), metrics.model_name.bright_green());
    println!(
        "  Accuracy:   {}",
        format!("{:.4}", metrics.accuracy).bright_green().bold()
    );
    println!("  Precision:  {}", format!("{:.4}", metrics.precision).cyan());
    println!("  Recall:     {}", format!("{:.4}", metrics.recall).cyan());
    println!("  F1 score:   {}", format!("{:.4}", metrics.f1_score).cyan());
    println!("  Train size: {}", metrics.train_size);
    println!("  Test size:  {}", metrics.test_size);
    println!(
        "  {}",
        format!("run {} at {}", metrics.run_id, metrics.trained_at.to_rfc3339()).dimmed()
    );
    println!();
}

fn run_train(config: &Config, input: &Path) -> anyhow::Result<()> {
    println!("{}", "Training ensemble...".cyan().bold());
    println!();

    let start = Instant::now();
    let output = run_pipeline(config, input)?;
    print_report(&output);

    let trainer = ModelTrainer::new(config.training.clone())?;
    let pb = spinner(&format!(
        "Fitting {} trees + logistic regression...",
        config.training.n_estimators
    ))?;
    let trained = trainer.train(&output);
    pb.finish_and_clear();
    let trained = trained.context("training failed")?;

    print_metrics(&trained.metrics);

    let store = ArtifactStore::new(&config.models_dir);
    store.save(&trained).with_context(|| {
        format!("failed to write artifacts to {}", store.dir().display())
    })?;
    println!(
        "{} Artifacts saved to: {}",
        "✓".green().bold(),
        store.dir().display()
    );
    println!(
        "{} Finished in {:.2}s",
        "✓".green().bold(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn run_predict(config: &Config, input: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let request: PredictRequest = serde_json::from_str(&raw).context("invalid request JSON")?;

    let repository = EnsembleRepository::load(&config.models_dir)?;
    let service = ExoplanetService::new(repository);

    let features: hashbrown::HashMap<String, f64> = request.features.into_iter().collect();
    let result = match service.classify_and_evaluate(&features, &request.params) {
        Ok(result) => result,
        Err(e) if e.is_client_error() => bail!("invalid feature input: {}", e),
        Err(e) => return Err(e.into()),
    };

    let verdict = if result.prediction == 1 {
        "EXOPLANET".bright_green().bold()
    } else {
        "FALSE POSITIVE".red().bold()
    };
    println!("{}", "Classification".cyan().bold());
    println!("{}", "==============".cyan());
    println!("  {} {}", "Prediction:".bold(), verdict);
    println!("  {} {:.2}%", "Confidence:".bold(), result.confidence * 100.0);
    println!("  {} {}", "Model:".bold(), result.model_name);
    let habitable = if result.is_potentially_habitable {
        "yes".green()
    } else {
        "no".dimmed()
    };
    println!("  {} {}", "Potentially habitable:".bold(), habitable);
    println!();
    Ok(())
}

fn show_metrics(config: &Config) -> anyhow::Result<()> {
    let metrics = ArtifactStore::new(&config.models_dir)
        .load_metrics()
        .context("no metrics found, run 'exoplanet-ml train' first")?;
    print_metrics(&metrics);
    Ok(())
}

fn show_importance(config: &Config, top: usize) -> anyhow::Result<()> {
    let importance = ArtifactStore::new(&config.models_dir)
        .load_importance()
        .context("no feature importances found, run 'exoplanet-ml train' first")?;

    println!("{}", "Feature Importance".green().bold());
    println!("{}", "==================".green());
    for (rank, (name, score)) in importance.top_n(top).into_iter().enumerate() {
        let bar = "█".repeat((score * 50.0).round() as usize);
        println!("  {:>2}. {:<32} {:.4} {}", rank + 1, name, score, bar.cyan());
    }
    println!();
    Ok(())
}

fn show_info(config: &Config) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "exoplanet-ml".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    println!("{}", "Configuration".bold());
    println!("{}", "=============".dimmed());
    if let Some(path) = default_config_path() {
        println!("  {} {}", "Config file:".bold(), path.display());
    }
    println!("  {} {}", "Models directory:".bold(), config.models_dir.display());
    println!("  {} {}", "Temporal folds:".bold(), config.pipeline.fold_count);
    println!("  {} {}", "Random seed:".bold(), config.pipeline.random_seed);
    println!("  {} {}", "Trees:".bold(), config.training.n_estimators);
    println!();

    println!("{}", "Model".bold());
    println!("{}", "=====".dimmed());
    match EnsembleRepository::load(&config.models_dir) {
        Ok(repository) => {
            println!("  {} {}", "Status:".bold(), "Available".green());
            println!("  {} {}", "Name:".bold(), repository.model_name());
            println!("  {} {}", "Features:".bold(), repository.feature_names().len());
            println!(
                "  {} {}",
                "Created:".bold(),
                repository.bundle().created_at.to_rfc3339()
            );
        }
        Err(e) => {
            println!("  {} {}", "Status:".bold(), "Not available".red());
            println!("  {}", e.to_string().dimmed());
        }
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = vec!["exoplanet-ml", "info"];
        let _cli = Cli::try_parse_from(args).unwrap();
    }

    #[test]
    fn test_train_command() {
        let args = vec![
            "exoplanet-ml",
            "train",
            "cumulative.csv",
            "--n-estimators",
            "50",
            "--models-dir",
            "out",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.models_dir, Some(PathBuf::from("out")));
        assert!(matches!(
            cli.command,
            Commands::Train {
                n_estimators: Some(50),
                ..
            }
        ));
    }

    #[test]
    fn test_predict_requires_input() {
        assert!(Cli::try_parse_from(vec!["exoplanet-ml", "predict"]).is_err());
        assert!(Cli::try_parse_from(vec!["exoplanet-ml", "predict", "--input", "c.json"]).is_ok());
    }

    #[test]
    fn test_importance_default_top() {
        let cli = Cli::try_parse_from(vec!["exoplanet-ml", "importance"]).unwrap();
        assert!(matches!(cli.command, Commands::Importance { top: 10 }));
    }

    #[test]
    fn test_config_from_toml() {
        let config: Config = toml::from_str(
            r#"
            models_dir = "artifacts"

            [pipeline]
            fold_count = 3

            [training]
            n_estimators = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.models_dir, PathBuf::from("artifacts"));
        assert_eq!(config.pipeline.fold_count, 3);
        assert_eq!(config.pipeline.random_seed, 42);
        assert_eq!(config.training.n_estimators, 25);
    }

    #[test]
    fn test_predict_request_shape() {
        let request: PredictRequest = serde_json::from_str(
            r#"{"features": {"koi_period": 10.5}, "params": {"kepid": "K1", "koi_teq": 290.0}}"#,
        )
        .unwrap();
        assert_eq!(request.features["koi_period"], 10.5);
        assert_eq!(request.params.koi_teq, Some(290.0));
        assert_eq!(request.params.koi_prad, None);
    }
}
