use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use log::info;
use spend_classifier::{dataset, Categorizer, TrainingConfig};

#[derive(Parser)]
#[command(author, version, about = "Train a transaction categorization model", long_about = None)]
struct Args {
    /// Input CSV file with transactions
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output JSON file for the model
    #[arg(short, long, default_value = "model.json")]
    output: PathBuf,

    /// Write synthetic training data, and train on it when no input is given
    #[arg(long)]
    create_synthetic: bool,

    /// Where the synthetic data is written
    #[arg(long, default_value = "synthetic_transactions.csv")]
    synthetic_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut input = args.input.clone();
    if args.create_synthetic {
        dataset::create_synthetic_csv(&args.synthetic_path).with_context(|| {
            format!("writing synthetic data to {}", args.synthetic_path.display())
        })?;
        if input.is_none() {
            input = Some(args.synthetic_path.clone());
        }
    }

    let Some(input) = input else {
        bail!("Please provide --input CSV file or use --create-synthetic");
    };

    let records = dataset::load_csv(&input)
        .with_context(|| format!("loading transactions from {}", input.display()))?;

    let start = Instant::now();
    let config = TrainingConfig::default();
    let categorizer = Categorizer::builder()
        .with_config(config.clone())
        .add_records(records)?
        .build()
        .context("training failed")?;
    info!("Trained in {:.2?}", start.elapsed());

    print_report(&categorizer);
    print_top_features(&categorizer, config.top_features());

    categorizer
        .export(&args.output)
        .with_context(|| format!("exporting model to {}", args.output.display()))?;

    println!("\nTraining complete!");
    println!("To use the model in an inference engine:");
    println!("   1. Copy {} next to the engine", args.output.display());
    println!("   2. Load it with ModelArtifact::load and score with ArtifactScorer");
    Ok(())
}

fn print_report(categorizer: &Categorizer) {
    let metrics = categorizer.metrics();
    println!("\nClassification Report:");
    println!(
        "{:>20} {:>10} {:>10} {:>10} {:>10}",
        "", "precision", "recall", "f1-score", "support"
    );
    for m in &metrics.report.categories {
        println!(
            "{:>20} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            m.category, m.precision, m.recall, m.f1, m.support
        );
    }
    println!();
    println!("{:>20} {:>32.2} {:>10}", "accuracy", metrics.report.accuracy, metrics.test_size);
    println!("{:>20} {:>32.2}", "macro avg f1", metrics.report.macro_f1);
    println!("{:>20} {:>32.2}", "weighted avg f1", metrics.report.weighted_f1);

    println!("\nConfusion matrix (rows actual, columns predicted):");
    for row in metrics.report.confusion.rows() {
        let cells: Vec<String> = row.iter().map(|c| format!("{:>3}", c)).collect();
        println!("  {}", cells.join(" "));
    }

    let cv = &metrics.cross_validation;
    println!(
        "\nCV accuracy: {:.4} (+/- {:.4}) over {} folds",
        cv.mean,
        cv.std * 2.0,
        cv.scores.len()
    );
}

fn print_top_features(categorizer: &Categorizer, n: usize) {
    println!("\nTop features per category:");
    for (category, features) in categorizer.top_features(n) {
        println!("\n{}:", category);
        for (feature, weight) in features {
            println!("  {:20} {:.4}", feature, weight);
        }
    }
}
