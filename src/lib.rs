// THEORY:
// This file is the main entry point for the `salicyl_vision` library crate.
//
// The primary goal is to export the `ConcentrationPipeline` and its associated data
// structures (`PipelineConfig`, `Report`, `BlockRecord`, ...) as the high-level interface
// of the engine, with `batch` for multi-image runs and `config` for layered settings.
// The block stages themselves live in `core_modules` and stay usable on their own.

pub mod batch;
pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use error::{ScanError, ScanResult};
pub use pipeline::{ConcentrationPipeline, PipelineConfig, Report};
