/// Graph and text views of a fitted tree
pub mod export;
/// Tree node
pub mod node;
/// Stopping rules
pub mod params;
/// CART regression tree
pub mod regressor;
