//! Command-line entry point for plant disease classification training.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use plant_disease_classification::{
    backend::{self, TrainingBackend},
    dataset::PlantDiseaseDataset,
    training::{trainer, TrainingConfig},
    utils::{init_logging, LogConfig},
    LABELS_FILENAME, VERSION,
};

#[derive(Parser)]
#[command(
    name = "plant-disease-classification",
    about = "Train a CNN to classify plant diseases from leaf images",
    version = VERSION
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the classifier on a class-folder dataset
    Train {
        /// Dataset root directory (one subdirectory per class)
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Directory for the checkpoint and label mapping
        #[arg(short, long, default_value = "artifacts")]
        output_dir: PathBuf,

        /// Seed for shuffling, splitting and initialization
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },

    /// Print dataset statistics without training
    Stats {
        /// Dataset root directory
        #[arg(short, long)]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    init_logging(&log_config);

    match cli.command {
        Commands::Train {
            data_dir,
            output_dir,
            seed,
        } => cmd_train(data_dir, output_dir, seed),
        Commands::Stats { data_dir } => cmd_stats(data_dir),
    }
}

fn cmd_train(data_dir: PathBuf, output_dir: PathBuf, seed: u64) -> Result<()> {
    println!(
        "{}",
        "=== Plant Disease Classification Training ===".green().bold()
    );
    println!("Backend: {}", backend::backend_name().cyan());

    let dataset = PlantDiseaseDataset::new(&data_dir)?;
    dataset.stats().print();

    std::fs::create_dir_all(&output_dir)?;
    dataset.save_labels(output_dir.join(LABELS_FILENAME))?;

    let config = TrainingConfig::new(
        dataset.num_classes(),
        output_dir.to_string_lossy().to_string(),
    )
    .with_seed(seed);

    let device = backend::default_device();
    let mut context = trainer::TrainContext::new();
    let summary = trainer::train::<TrainingBackend>(&dataset, &config, &device, &mut context)?;

    println!(
        "\n{} {} iterations, checkpoint at {:?}",
        "Training complete:".green().bold(),
        summary.total_iterations,
        summary.checkpoint_path
    );
    if let Some(last) = summary.epochs.last() {
        println!(
            "Final validation accuracy: {}",
            format!("{:.1}%", last.valid_accuracy * 100.0).cyan()
        );
    }

    Ok(())
}

fn cmd_stats(data_dir: PathBuf) -> Result<()> {
    let dataset = PlantDiseaseDataset::new(&data_dir)?;
    dataset.stats().print();
    Ok(())
}
