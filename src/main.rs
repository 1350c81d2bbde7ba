/// Put the modules together: load the flight records, derive the delay label,
/// assemble and index the features, split, fit the forest, and report accuracy.
use std::error::Error;
use std::path::PathBuf;

mod error;
mod io;
mod model;
mod preprocess;

use clap::Parser;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use io::load_csv;
use model::{RandomForest, RandomForestParams};
use preprocess::StringIndexer;

/// Fraction of rows assigned to the training partition; the other 0.7 is held
/// out for evaluation. Training deliberately uses the smaller slice.
const TRAIN_FRACTION: f64 = 0.3;

/// Train a random forest on historical flight records and report the held-out
/// accuracy of its departure-delay predictions.
#[derive(Parser)]
struct Args {
    /// Path to the flight records CSV (header row required)
    path: PathBuf,

    /// Seed for the train/test split and forest construction; unseeded runs
    /// vary run-to-run
    #[arg(long)]
    seed: Option<u64>,

    /// Number of trees in the ensemble
    #[arg(long, default_value_t = 20)]
    trees: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // 1) Load; fully-empty rows are dropped inside the loader
    println!("Loading data from {}...", args.path.display());
    let records = load_csv(&args.path)?;
    println!("Loaded {} flight records", records.len());

    // 2) Label and assemble
    let labels = preprocess::label(&records);
    let x = preprocess::assemble(&records)?;
    println!("Assembled {} feature vectors of width {}", x.nrows(), x.ncols());

    // 3) Index the label over the full dataset (most frequent value -> 0)
    let indexer = StringIndexer::fit(labels.iter().map(|l| l.as_str()));
    let y = indexer.transform(labels.iter().map(|l| l.as_str()))?;
    println!("Label index: {:?}", indexer.labels());

    // 4) Split
    let mut rng = match args.seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_entropy(),
    };
    let forest_seed = args.seed.map(|_| rng.gen::<u64>());
    let ((x_train, y_train), (x_test, y_test)) =
        preprocess::train_test_split(&x, &y, TRAIN_FRACTION, &mut rng)?;
    println!(
        "Split {} rows into {} train / {} test",
        x.nrows(),
        x_train.nrows(),
        x_test.nrows()
    );

    // 5) Fit, predict, evaluate
    let params = RandomForestParams::default()
        .n_estimators(args.trees)
        .seed(forest_seed);
    let forest = RandomForest::fit(&params, &x_train, &y_train)?;
    let predictions = forest.predict(&x_test);
    let acc = model::accuracy(&predictions, &y_test)?;

    println!("Here are the results!");
    println!("A random forest ensemble had an accuracy of: {:.2}%", acc * 100.0);

    Ok(())
}

// end tests
