//! Runtime data structures: values, observable objects, reactions, errors.

pub mod error;
pub mod object;
pub mod reaction;
pub mod value;
