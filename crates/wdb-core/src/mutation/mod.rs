//! Insert and modify processing.
//!
//! Both statements share assignment semantics:
//! - scalar assignments replace the stored value
//! - relationship assignments select target instances polymorphically and
//!   replace, insert or exclude edges (always together with their mirror)

mod assign;
mod insert;
mod modify;

pub use assign::Assigner;
pub use insert::InsertProcessor;
pub use modify::ModifyProcessor;
