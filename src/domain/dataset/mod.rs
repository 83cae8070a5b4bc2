// Dataset domain module
// Contains the dataset aggregate, column value objects, and upload errors

#![allow(clippy::module_inception)]

pub mod dataset;
pub mod errors;
pub mod value_objects;

// Re-export main types for convenience
pub use dataset::{Column, Dataset};
pub use errors::DatasetError;
pub use value_objects::{ColumnData, ColumnKind};
