//! Decision Tree Regressor
use super::{export::TreeGraph, node::TreeNode, params::TreeParams};
use crate::{
    data::{
        dataset::{Dataset, RealNumber},
        normalize::MinMaxTable,
    },
    error::{Result, TreeError},
    metrics::errors::RegressionMetrics,
};
use nalgebra::{DMatrix, DVector};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    time::{Duration, Instant},
};

/// Best candidate partition of a node's samples.
pub struct SplitData<T: RealNumber> {
    pub feature_index: usize,
    pub threshold: T,
    pub left: Dataset<T>,
    pub right: Dataset<T>,
    pub variance_reduction: f64,
}

/// Summary of a finished `fit` call. The timing is advisory only.
#[derive(Clone, Debug, PartialEq)]
pub struct FitReport {
    pub training_time: Duration,
    pub node_count: usize,
    pub leaf_count: usize,
    pub depth: usize,
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished building the tree in {:.4} seconds ({} nodes, {} leaves, depth {}).",
            self.training_time.as_secs_f64(),
            self.node_count,
            self.leaf_count,
            self.depth
        )
    }
}

/// Decision Tree Regressor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionTreeRegressor<T: RealNumber> {
    root: Option<TreeNode<T>>,
    tree_params: TreeParams,
    /// Training column names, in column order. Empty when unknown.
    #[serde(default)]
    feature_names: Vec<String>,
}

impl<T: RealNumber> Default for DecisionTreeRegressor<T> {
    /// Creates a new instance of the decision tree regressor with default parameters.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> RegressionMetrics<T> for DecisionTreeRegressor<T> {}

impl<T: RealNumber> DecisionTreeRegressor<T> {
    /// Creates a new instance of the decision tree regressor with default parameters.
    pub fn new() -> Self {
        Self {
            root: None,
            tree_params: TreeParams::new(),
            feature_names: Vec::new(),
        }
    }

    /// Creates a new instance of the decision tree regressor with custom parameters.
    ///
    /// # Arguments
    ///
    /// * `min_samples_split` - The minimum number of samples required to split an internal node. Defaults to 2.
    /// * `max_depth` - The deepest level at which a node may still be split. Defaults to 4.
    ///
    /// # Errors
    ///
    /// This method will return an error if the minimum number of samples to split is less than 2.
    pub fn with_params(min_samples_split: Option<u16>, max_depth: Option<u16>) -> Result<Self> {
        let mut tree = Self::new();

        if let Some(min_samples_split) = min_samples_split {
            tree.tree_params.set_min_samples_split(min_samples_split)?;
        }
        if let Some(max_depth) = max_depth {
            tree.tree_params.set_max_depth(max_depth);
        }
        Ok(tree)
    }

    pub fn params(&self) -> &TreeParams {
        &self.tree_params
    }

    /// Returns the maximum depth of the tree.
    pub fn max_depth(&self) -> u16 {
        self.tree_params.max_depth()
    }

    /// Returns the minimum number of samples required to split an internal node.
    pub fn min_samples_split(&self) -> u16 {
        self.tree_params.min_samples_split()
    }

    /// Names the feature columns so samples can later be given by name.
    pub fn set_feature_names(&mut self, feature_names: Vec<String>) {
        self.feature_names = feature_names;
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The fitted tree, if any.
    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.root.as_ref()
    }

    fn fitted_root(&self) -> Result<&TreeNode<T>> {
        self.root.as_ref().ok_or(TreeError::NotFitted)
    }

    /// Builds the decision tree from a dataset, replacing any previous tree.
    ///
    /// # Errors
    ///
    /// Fails before any work is done if the dataset is empty, has no feature
    /// columns, has mismatched feature and target lengths, or holds
    /// non-finite values.
    pub fn fit(&mut self, dataset: &Dataset<T>) -> Result<FitReport> {
        dataset.validate()?;
        if !self.feature_names.is_empty() && self.feature_names.len() != dataset.ncols() {
            return Err(TreeError::DimensionMismatch {
                expected: self.feature_names.len(),
                got: dataset.ncols(),
            });
        }

        let start = Instant::now();
        let root = self.build_tree(dataset, 0)?;
        let report = FitReport {
            training_time: start.elapsed(),
            node_count: root.node_count(),
            leaf_count: root.leaf_count(),
            depth: root.depth(),
        };

        self.root = Some(root);
        Ok(report)
    }

    /// Pairs a feature matrix with its target vector and fits on the result.
    pub fn fit_xy(&mut self, x: &DMatrix<T>, y: &DVector<T>) -> Result<FitReport> {
        let dataset = Dataset::try_new(x.clone(), y.clone())?;
        self.fit(&dataset)
    }

    /// Predicts the target for every row of `prediction_features`.
    ///
    /// # Errors
    ///
    /// Fails if the tree wasn't built yet or the rows are too short for a
    /// decision node they reach.
    pub fn predict(&self, prediction_features: &DMatrix<T>) -> Result<DVector<T>> {
        let root = self.fitted_root()?;
        let predictions = prediction_features
            .row_iter()
            .map(|row| {
                let features: Vec<T> = row.iter().copied().collect();
                Self::make_prediction(&features, root)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DVector::from_vec(predictions))
    }

    /// Predicts each row independently; a malformed row only fails its own entry.
    ///
    /// # Errors
    ///
    /// The outer result fails only if the tree wasn't built yet.
    pub fn predict_rows<R: AsRef<[T]>>(&self, rows: &[R]) -> Result<Vec<Result<T>>> {
        let root = self.fitted_root()?;
        Ok(rows
            .iter()
            .map(|row| Self::make_prediction(row.as_ref(), root))
            .collect())
    }

    /// Walks from `node` to a leaf, going left whenever `x[feature_index] <= threshold`.
    pub fn make_prediction(features: &[T], node: &TreeNode<T>) -> Result<T> {
        match node {
            TreeNode::Leaf { value } => Ok(*value),
            TreeNode::Decision {
                feature_index,
                threshold,
                left,
                right,
                ..
            } => {
                let feature = features.get(*feature_index).ok_or(
                    TreeError::FeatureIndexOutOfBounds {
                        feature_index: *feature_index,
                        n_features: features.len(),
                    },
                )?;
                if feature <= threshold {
                    Self::make_prediction(features, left)
                } else {
                    Self::make_prediction(features, right)
                }
            }
        }
    }

    /// Min-max scales a raw sample with `table` and predicts it.
    ///
    /// Returns the prediction together with the scaled feature vector.
    pub fn predict_value(
        &self,
        raw_features: &[T],
        feature_names: &[&str],
        table: &MinMaxTable,
    ) -> Result<(T, Vec<T>)> {
        let root = self.fitted_root()?;
        let normalized = table.normalize(raw_features, feature_names)?;
        let prediction = Self::make_prediction(&normalized, root)?;
        Ok((prediction, normalized))
    }

    /// Like [`predict_value`](Self::predict_value), but takes `(name, value)`
    /// pairs in any order and arranges them in training column order.
    ///
    /// # Errors
    ///
    /// Fails if the model has no feature names, a name is unknown or
    /// repeated, or a training feature is missing.
    pub fn predict_named(
        &self,
        named_features: &[(&str, T)],
        table: &MinMaxTable,
    ) -> Result<(T, Vec<T>)> {
        if self.feature_names.is_empty() {
            return Err(TreeError::InvalidParameter(
                "the model doesn't record its feature names".into(),
            ));
        }
        if let Some((name, _)) = named_features
            .iter()
            .find(|(name, _)| !self.feature_names.iter().any(|known| known == name))
        {
            return Err(TreeError::UnknownFeature(name.to_string()));
        }
        if named_features.len() != self.feature_names.len() {
            return Err(TreeError::DimensionMismatch {
                expected: self.feature_names.len(),
                got: named_features.len(),
            });
        }

        let mut names = Vec::with_capacity(self.feature_names.len());
        let mut values = Vec::with_capacity(self.feature_names.len());
        for known in &self.feature_names {
            let (name, value) = named_features
                .iter()
                .find(|(name, _)| name == known)
                .ok_or_else(|| TreeError::MissingColumn(known.clone()))?;
            names.push(*name);
            values.push(*value);
        }
        self.predict_value(&values, &names, table)
    }

    /// Indented text dump of the fitted tree.
    pub fn print_tree(&self) -> Result<String> {
        Ok(self.fitted_root()?.to_string())
    }

    /// Node and edge description of the fitted tree for an external renderer.
    pub fn export_graph(&self) -> Result<TreeGraph<T>> {
        Ok(TreeGraph::from_node(self.fitted_root()?))
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()>
    where
        T: Serialize,
    {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self>
    where
        T: DeserializeOwned,
    {
        let reader = BufReader::new(File::open(path)?);
        let model: Self = serde_json::from_reader(reader)?;
        model.tree_params.validate()?;
        Ok(model)
    }

    fn build_tree(&self, dataset: &Dataset<T>, current_depth: u32) -> Result<TreeNode<T>> {
        let (x, y) = dataset.into_parts();
        let (num_samples, num_features) = x.shape();

        if num_samples >= self.min_samples_split().into()
            && current_depth <= u32::from(self.max_depth())
        {
            if let Some(best_split) = self.get_best_split(dataset, num_samples, num_features) {
                if best_split.variance_reduction > 0.0 {
                    let new_depth = current_depth + 1;
                    let (left_node, right_node) = rayon::join(
                        || self.build_tree(&best_split.left, new_depth),
                        || self.build_tree(&best_split.right, new_depth),
                    );
                    return Ok(TreeNode::Decision {
                        feature_index: best_split.feature_index,
                        threshold: best_split.threshold,
                        variance_reduction: best_split.variance_reduction,
                        left: Box::new(left_node?),
                        right: Box::new(right_node?),
                    });
                }
            }
        }

        Ok(TreeNode::leaf(Self::mean(y)?))
    }

    /// Scans every feature and every distinct value of it, ascending, and keeps
    /// the first split with the strictly largest variance reduction.
    fn get_best_split(
        &self,
        dataset: &Dataset<T>,
        num_samples: usize,
        num_features: usize,
    ) -> Option<SplitData<T>> {
        let mut best_split: Option<SplitData<T>> = None;
        let mut best_variance_reduction = f64::NEG_INFINITY;
        let parent_variance = Self::variance(&dataset.y);

        for feature_index in 0..num_features {
            let mut unique_values: Vec<_> =
                dataset.x.column(feature_index).iter().cloned().collect();
            unique_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            unique_values.dedup();

            for value in &unique_values {
                let (left_child, right_child) = dataset.split_on_threshold(feature_index, *value);

                if left_child.is_not_empty() && right_child.is_not_empty() {
                    debug_assert_eq!(left_child.nrows() + right_child.nrows(), num_samples);
                    let current_variance_reduction = Self::calculate_variance_reduction(
                        parent_variance,
                        &left_child.y,
                        &right_child.y,
                    );

                    if current_variance_reduction > best_variance_reduction {
                        best_variance_reduction = current_variance_reduction;
                        best_split = Some(SplitData {
                            feature_index,
                            threshold: *value,
                            left: left_child,
                            right: right_child,
                            variance_reduction: current_variance_reduction,
                        });
                    }
                }
            }
        }
        best_split
    }

    /// `Var(parent) - (|l|/|p| * Var(l) + |r|/|p| * Var(r))`
    fn calculate_variance_reduction(
        parent_variance: f64,
        left_y: &DVector<T>,
        right_y: &DVector<T>,
    ) -> f64 {
        let num_samples = (left_y.len() + right_y.len()) as f64;
        let weight_left = left_y.len() as f64 / num_samples;
        let weight_right = right_y.len() as f64 / num_samples;
        parent_variance
            - (weight_left * Self::variance(left_y) + weight_right * Self::variance(right_y))
    }

    /// Population variance, exactly zero for a constant slice.
    fn variance(y: &DVector<T>) -> f64 {
        if y.iter().all(|x| *x == y[0]) {
            return 0.0;
        }
        let num_samples = y.len() as f64;
        let mean = y.iter().filter_map(|x| x.to_f64()).sum::<f64>() / num_samples;
        y.iter()
            .filter_map(|x| x.to_f64())
            .map(|x| (x - mean) * (x - mean))
            .sum::<f64>()
            / num_samples
    }

    fn mean(y: &DVector<T>) -> Result<T> {
        if y.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        let sum: T = y.iter().fold(T::zero(), |acc, x| acc + *x);
        let count =
            T::from_usize(y.len()).ok_or_else(|| TreeError::Parse("Couldn't transform from usize".into()))?;
        Ok(sum / count)
    }
}
