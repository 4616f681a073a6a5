//! Instance selection and retrieval.
//!
//! - [`PredicateEvaluator`] tests one instance against a predicate.
//! - [`instances_of`] selects instances of a class and its subclasses.
//! - [`RetrieveProcessor`] projects attribute paths of the selected instances.

mod filter;
mod retrieve;
mod select;

pub use filter::PredicateEvaluator;
pub use retrieve::RetrieveProcessor;
pub use select::{instances_of, Selected};
