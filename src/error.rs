// Error taxonomy for the pipeline. Every failure is fatal and aborts the run;
// there are no retries and no partial results.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column {0:?} is missing from the header")]
    MissingColumn(&'static str),

    #[error("null value in column {column:?} at data row {row}")]
    NullFeature { column: &'static str, row: usize },

    #[error("label {0:?} was not seen when the index was fitted")]
    UnseenLabel(String),

    #[error("train fraction must lie in (0, 1), got {0}")]
    InvalidFraction(f64),

    #[error("training partition is empty")]
    EmptyTrainingPartition,

    #[error("training partition contains a single class; a classifier fitted on it would be degenerate")]
    SingleClassTraining,

    #[error("test partition is empty; accuracy is undefined")]
    EmptyTestPartition,

    #[error("prediction and truth lengths differ ({predicted} vs {actual})")]
    LengthMismatch { predicted: usize, actual: usize },

    #[error("tree induction failed: {0}")]
    Tree(#[from] linfa::error::Error),
}
