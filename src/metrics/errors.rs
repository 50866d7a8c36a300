use nalgebra::DVector;

use crate::data::dataset::RealNumber;
use crate::error::{Result, TreeError};

fn check_sizes<T: RealNumber>(y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
    if y_true.len() != y_pred.len() {
        return Err(TreeError::DimensionMismatch {
            expected: y_true.len(),
            got: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(TreeError::EmptyDataset);
    }
    T::from_usize(y_true.len()).ok_or_else(|| TreeError::Parse("Couldn't transform from usize".into()))
}

/// Error metrics for anything that produces real-valued predictions.
pub trait RegressionMetrics<T: RealNumber> {
    fn mse(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        let n = check_sizes(y_true, y_pred)?;
        let errors = y_pred - y_true;
        let errors_sq = errors.component_mul(&errors);

        Ok(errors_sq.sum() / n)
    }

    fn rmse(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        Ok(self.mse(y_true, y_pred)?.sqrt())
    }

    fn mae(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        let n = check_sizes(y_true, y_pred)?;
        let abs_errors_sum = y_pred
            .iter()
            .zip(y_true.iter())
            .map(|(&y_p, &y_t)| (y_p - y_t).abs())
            .fold(T::zero(), |acc, x| acc + x);

        Ok(abs_errors_sum / n)
    }

    fn r2(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        let n = check_sizes(y_true, y_pred)?;
        if y_true.iter().all(|y| *y == y_true[0]) {
            return Err(TreeError::InvalidParameter(
                "R2 is undefined for a constant target.".into(),
            ));
        }

        let y_true_mean = y_true.sum() / n;
        let y_true_mean_vec = DVector::from_element(y_true.len(), y_true_mean);

        let mse_model = self.mse(y_true, y_pred)?;
        let mse_base = self.mse(y_true, &y_true_mean_vec)?;

        Ok(T::one() - (mse_model / mse_base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Scorer;
    impl RegressionMetrics<f64> for Scorer {}

    #[test]
    fn test_mse_and_rmse() {
        let y_true = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let y_pred = DVector::from_vec(vec![1.0, 2.0, 3.0, 8.0]);
        assert_relative_eq!(Scorer.mse(&y_true, &y_pred).unwrap(), 4.0);
        assert_relative_eq!(Scorer.rmse(&y_true, &y_pred).unwrap(), 2.0);
    }

    #[test]
    fn test_mae() {
        let y_true = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let y_pred = DVector::from_vec(vec![2.0, 2.0, 1.0]);
        assert_relative_eq!(Scorer.mae(&y_true, &y_pred).unwrap(), 1.0);
    }

    #[test]
    fn test_r2_perfect_fit() {
        let y_true = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_relative_eq!(Scorer.r2(&y_true, &y_true).unwrap(), 1.0);
    }

    #[test]
    fn test_r2_constant_target() {
        let y_true = DVector::from_vec(vec![0.1, 0.1, 0.1]);
        let y_pred = DVector::from_vec(vec![0.1, 0.2, 0.0]);
        assert!(matches!(
            Scorer.r2(&y_true, &y_pred),
            Err(TreeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_size_mismatch() {
        let y_true = DVector::from_vec(vec![1.0, 2.0]);
        let y_pred = DVector::from_vec(vec![1.0]);
        assert!(Scorer.mse(&y_true, &y_pred).is_err());
        assert!(Scorer.mae(&y_true, &y_pred).is_err());
    }

    #[test]
    fn test_empty_input() {
        let empty = DVector::<f64>::zeros(0);
        assert!(matches!(
            Scorer.rmse(&empty, &empty),
            Err(TreeError::EmptyDataset)
        ));
    }
}
