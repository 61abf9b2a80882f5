pub mod runner;
pub mod synthesizer;

pub use runner::{RunnerSettings, WorkflowRunner};
pub use synthesizer::{synthesize, Report, HIGH_HYPE_THRESHOLD};
