//! # Rusty-cart
//!
//! `rusty-cart` builds binary regression trees (CART) over numeric tabular data.
//! Each split is the feature/threshold pair that most reduces the variance of
//! the target, and each leaf predicts the mean target of the training samples
//! that reach it.
//!
//! ## Getting Started
//!
//! To use `rusty-cart`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! rusty-cart = "*"
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use rusty_cart::data::dataset::Dataset;
//! use rusty_cart::trees::regressor::DecisionTreeRegressor;
//! use nalgebra::{DMatrix, DVector};
//!
//! let x = DMatrix::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]);
//! let y = DVector::from_vec(vec![1.0, 1.0, 5.0, 5.0]);
//!
//! let dataset = Dataset::new(x, y);
//!
//! let mut model = DecisionTreeRegressor::with_params(Some(2), Some(2)).unwrap();
//!
//! model.fit(&dataset).unwrap();
//!
//! let test_x = DMatrix::from_row_slice(2, 1, &[1.5, 3.5]);
//!
//! let predictions = model.predict(&test_x).unwrap();
//! assert_eq!(predictions, DVector::from_vec(vec![1.0, 5.0]));
//!
//! print!("{}", model.print_tree().unwrap());
//! ```

/// Dataset and data manipulation utilities
pub mod data;
/// Crate error type
pub mod error;
/// Functions for evaluating model performance
pub mod metrics;
/// Decision trees
pub mod trees;

pub use error::{Result, TreeError};
