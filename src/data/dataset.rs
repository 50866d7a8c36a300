use crate::error::{Result, TreeError};
use nalgebra::{DMatrix, DVector};
use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use std::cmp::PartialOrd;
use std::fmt::{self, Display};
use std::fmt::{Debug, Formatter};
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait Number: DataValue + PartialOrd {}
impl<T> Number for T where T: DataValue + PartialOrd {}

pub trait RealNumber: Number + Float {}
impl<T> RealNumber for T where T: Number + Float {}

/// Feature matrix paired with its target column.
///
/// Row `i` of `x` and entry `i` of `y` describe the same sample. A dataset is
/// never mutated once built; splitting produces fresh copies.
#[derive(Clone, PartialEq)]
pub struct Dataset<T: RealNumber> {
    pub x: DMatrix<T>,
    pub y: DVector<T>,
}

impl<T: RealNumber> Debug for Dataset<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    x: [\n")?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [")?;
        for i in 0..self.y.len() {
            write!(f, "{:?}, ", self.y[i])?;
        }
        write!(f, "]\n}}")
    }
}

impl<T: RealNumber> Dataset<T> {
    pub fn new(x: DMatrix<T>, y: DVector<T>) -> Self {
        Self { x, y }
    }

    /// Pairs features and targets, checking that they describe the same number of samples.
    pub fn try_new(x: DMatrix<T>, y: DVector<T>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(TreeError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    /// Builds a dataset from a combined table whose last column is the target.
    pub fn from_combined(table: &DMatrix<T>) -> Result<Self> {
        let ncols = table.ncols();
        if ncols < 2 {
            return Err(TreeError::DimensionMismatch {
                expected: 2,
                got: ncols,
            });
        }
        let x = table.columns(0, ncols - 1).into_owned();
        let y = table.column(ncols - 1).into_owned();
        Ok(Self { x, y })
    }

    pub fn into_parts(&self) -> (&DMatrix<T>, &DVector<T>) {
        (&self.x, &self.y)
    }

    pub fn is_not_empty(&self) -> bool {
        !(self.x.is_empty() || self.y.is_empty())
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// Checks the dataset can be fed to a tree: same row count on both
    /// sides, at least one sample and feature, and only finite values.
    pub fn validate(&self) -> Result<()> {
        if self.x.nrows() != self.y.len() {
            return Err(TreeError::DimensionMismatch {
                expected: self.x.nrows(),
                got: self.y.len(),
            });
        }
        if self.x.nrows() == 0 || self.x.ncols() == 0 {
            return Err(TreeError::EmptyDataset);
        }
        if self.x.iter().any(|value| !value.is_finite()) {
            return Err(TreeError::NonFinite("features".into()));
        }
        if self.y.iter().any(|value| !value.is_finite()) {
            return Err(TreeError::NonFinite("target".into()));
        }
        Ok(())
    }

    pub fn train_test_split(&self, train_size: f64, seed: Option<u64>) -> Result<(Self, Self)> {
        if !(0.0..=1.0).contains(&train_size) {
            return Err(TreeError::InvalidParameter(
                "Train size should be between 0.0 and 1.0".into(),
            ));
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices = (0..self.x.nrows()).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let train_size = (self.x.nrows() as f64 * train_size).floor() as usize;

        Ok((
            self.select_rows(&indices[..train_size]),
            self.select_rows(&indices[train_size..]),
        ))
    }

    /// Partitions the rows into `feature <= threshold` and `feature > threshold`,
    /// keeping their relative order.
    pub fn split_on_threshold(&self, feature_index: usize, threshold: T) -> (Self, Self) {
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = (0..self.x.nrows())
            .partition(|&index| self.x[(index, feature_index)] <= threshold);

        (
            self.select_rows(&left_indices),
            self.select_rows(&right_indices),
        )
    }

    fn select_rows(&self, indices: &[usize]) -> Self {
        if indices.is_empty() {
            return Self::new(DMatrix::zeros(0, self.x.ncols()), DVector::zeros(0));
        }
        let rows = indices
            .iter()
            .map(|&index| self.x.row(index))
            .collect::<Vec<_>>();
        let targets = indices.iter().map(|&index| self.y[index]).collect::<Vec<_>>();

        Self::new(DMatrix::from_rows(&rows), DVector::from_vec(targets))
    }
}
