// THEORY:
// This file is the entry point for the `cascade_vision` library crate.
//
// The public surface is small: `CascadeClassifier` (the synchronous cascade for
// one domain), `ClassifierPool` (async fan-out over worker tasks), the
// `ClassificationResult` they return, and the ambient `EngineConfig` and error
// types. The detectors, predicate banks and catalogs live in `core_modules` and
// are public so fixtures and tools can reach them, but callers normally only
// pick a `Domain` and hand over image bytes.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::{EngineConfig, OutputFormat};
pub use core_modules::domain::Domain;
pub use core_modules::result::{ClassificationResult, Stage};
pub use error::{ClassifyError, ClassifyResult, ConfigError};
pub use parallel_pipeline::ClassifierPool;
pub use pipeline::CascadeClassifier;
