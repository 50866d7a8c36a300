/// Feature/target containers and row splitting
pub mod dataset;
/// Min-max scaling against a lookup table
pub mod normalize;
