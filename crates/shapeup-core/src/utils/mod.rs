//! Utility types used across shapeup.

pub mod multi_value_dict;

pub use multi_value_dict::MultiValueDict;
