// Labeling, feature assembly, label indexing and the train/test partition.
use std::collections::HashMap;

use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use crate::error::PipelineError;
use crate::io::{FlightRecord, FEATURE_COLUMNS};

/// Derived delay label enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsDelay {
    Yes,
    No,
}

impl IsDelay {
    /// "No" iff the departure delay is present and at most zero. A missing
    /// DepDelay falls to the permissive "otherwise" branch and labels "Yes".
    pub fn from_dep_delay(dep_delay: Option<f64>) -> Self {
        match dep_delay {
            Some(d) if d <= 0.0 => IsDelay::No,
            _ => IsDelay::Yes,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IsDelay::Yes => "Yes",
            IsDelay::No => "No",
        }
    }
}

/// Derive the "isDelay" label for each record. Pure and total per row.
pub fn label(records: &[FlightRecord]) -> Vec<IsDelay> {
    records
        .iter()
        .map(|r| IsDelay::from_dep_delay(r.dep_delay))
        .collect()
}

/// Assemble the fixed-order feature matrix, one row per record and one column
/// per entry of [`FEATURE_COLUMNS`]. A null in any listed column is fatal and
/// reported with the column name and row number; nothing is skipped or coerced.
pub fn assemble(records: &[FlightRecord]) -> Result<Array2<f64>, PipelineError> {
    let mut x = Array2::zeros((records.len(), FEATURE_COLUMNS.len()));
    for (row, rec) in records.iter().enumerate() {
        for (col, (name, value)) in rec.feature_fields().into_iter().enumerate() {
            x[(row, col)] = value.ok_or(PipelineError::NullFeature { column: name, row })?;
        }
    }
    Ok(x)
}

/// Frequency-based categorical index, fitted over the full dataset before the
/// split. The most frequent value maps to 0; ties break alphabetically.
#[derive(Debug, Clone)]
pub struct StringIndexer {
    labels: Vec<String>,
}

impl StringIndexer {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for v in values {
            *counts.entry(v).or_insert(0) += 1;
        }
        let mut ordered: Vec<(&str, usize)> = counts.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        StringIndexer {
            labels: ordered.into_iter().map(|(v, _)| v.to_string()).collect(),
        }
    }

    /// Distinct values in index order (position == assigned index).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == value)
    }

    /// Map each value to its fitted index. A value unseen at fit time is an
    /// error, never a silent extra index.
    pub fn transform<'a, I>(&self, values: I) -> Result<Array1<usize>, PipelineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values
            .into_iter()
            .map(|v| {
                self.index_of(v)
                    .ok_or_else(|| PipelineError::UnseenLabel(v.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Array1::from)
    }
}

/// One partition of the split: feature rows plus the matching label indices.
pub type Partition = (Array2<f64>, Array1<usize>);

/// Randomly partition the rows with an i.i.d. weighted coin flip per row:
/// `train_fraction` lands in the first partition, the rest in the second.
/// The partitions are disjoint and their sizes sum to the input size; exact
/// counts are not guaranteed to match the fractions. Deterministic for a
/// seeded `rng`.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<usize>,
    train_fraction: f64,
    rng: &mut impl Rng,
) -> Result<(Partition, Partition), PipelineError> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(PipelineError::InvalidFraction(train_fraction));
    }

    let mut train_idx = Vec::new();
    let mut test_idx = Vec::new();
    for row in 0..x.nrows() {
        if rng.gen_bool(train_fraction) {
            train_idx.push(row);
        } else {
            test_idx.push(row);
        }
    }

    let train = (x.select(Axis(0), &train_idx), y.select(Axis(0), &train_idx));
    let test = (x.select(Axis(0), &test_idx), y.select(Axis(0), &test_idx));
    Ok((train, test))
}
