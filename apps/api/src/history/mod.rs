// Candidate history: the shared store plus the aggregates the HR dashboard
// derives from it.

pub mod stats;
pub mod store;

pub use store::{HistoryStore, TransitionError};
