pub mod analyzer;

pub use analyzer::{AnalysisResult, ResumeAnalyzer, SimulatedAnalyzer};
