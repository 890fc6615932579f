//! Cleaning pipeline: wide protein-by-sample sheet in, one row per sample out.

pub mod orchestrator;
pub mod quality_gate;
pub mod steps;

pub use orchestrator::{CleaningPipeline, PipelineResult};
pub use quality_gate::{QualityDecision, QualityIssue, QualitySeverity, ValidationReport};
pub use steps::{CleaningStep, SheetLayout, StepContext, StepResult};
