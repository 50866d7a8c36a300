//! Min-max scaling of raw feature vectors against a caller-supplied table.
use crate::data::dataset::RealNumber;
use crate::error::{Result, TreeError};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

const FEATURE_COLUMN: &str = "Feature";
const MIN_COLUMN: &str = "Min";
const MAX_COLUMN: &str = "Max";

/// Observed range of one feature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Feature name to range lookup used to scale samples before prediction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MinMaxTable {
    ranges: HashMap<String, MinMax>,
}

impl MinMaxTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: impl Into<String>, range: MinMax) {
        self.ranges.insert(feature.into(), range);
    }

    pub fn get(&self, feature: &str) -> Option<&MinMax> {
        self.ranges.get(feature)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Reads a table with a `Feature,Min,Max` header. The header is checked
    /// before any record is read.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| TreeError::MissingColumn(name.to_string()))
        };
        let feature_idx = position(FEATURE_COLUMN)?;
        let min_idx = position(MIN_COLUMN)?;
        let max_idx = position(MAX_COLUMN)?;

        let mut table = Self::new();
        for result in reader.records() {
            let record = result?;
            let field = |idx: usize, name: &str| {
                record
                    .get(idx)
                    .ok_or_else(|| TreeError::MissingColumn(name.to_string()))
            };
            let parse = |idx: usize, name: &str| -> Result<f64> {
                let raw = field(idx, name)?;
                raw.parse::<f64>()
                    .map_err(|err| TreeError::Parse(format!("{name} value {raw:?}: {err}")))
            };

            let feature = field(feature_idx, FEATURE_COLUMN)?.to_string();
            let range = MinMax::new(parse(min_idx, MIN_COLUMN)?, parse(max_idx, MAX_COLUMN)?);
            table.insert(feature, range);
        }
        Ok(table)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Scales `values[i]` with the range of `feature_names[i]`.
    pub fn normalize<T: RealNumber>(&self, values: &[T], feature_names: &[&str]) -> Result<Vec<T>> {
        if values.len() != feature_names.len() {
            return Err(TreeError::DimensionMismatch {
                expected: feature_names.len(),
                got: values.len(),
            });
        }

        values
            .iter()
            .zip(feature_names)
            .map(|(&value, &feature)| {
                let range = self
                    .get(feature)
                    .ok_or_else(|| TreeError::UnknownFeature(feature.to_string()))?;
                let span = range.max - range.min;
                if span == 0.0 || !span.is_finite() {
                    return Err(TreeError::InvalidParameter(format!(
                        "feature {feature} has a degenerate range [{}, {}]",
                        range.min, range.max
                    )));
                }
                let value = value
                    .to_f64()
                    .ok_or_else(|| TreeError::Parse(format!("{feature} value isn't numeric")))?;
                T::from_f64((value - range.min) / span)
                    .ok_or_else(|| TreeError::Parse(format!("{feature} value out of range")))
            })
            .collect()
    }
}
