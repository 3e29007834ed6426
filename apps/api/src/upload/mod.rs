// Candidate-facing workflow: file selection, upload and simulated analysis.

pub mod handlers;
pub mod session;
