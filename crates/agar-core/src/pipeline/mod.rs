pub mod config;
pub mod diagnostics;
mod orchestrator;
mod types;

pub use config::PipelineConfig;
pub use diagnostics::{sink_for, DiagnosticsSink, FileSink, NoopSink};
pub use orchestrator::{analyze, analyze_cancellable, analyze_default, CancelFlag};
pub use types::{ColonyReport, DishAnalysis, Stage};
