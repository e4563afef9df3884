//! Coverage report processing for ugen
//!
//! Reads Cobertura, LCOV, JaCoCo and diff-cover reports into one
//! [`CoverageReport`] model and finds the entry for a given source file.

pub mod cobertura;
pub mod diff_cover;
pub mod error;
pub mod jacoco;
pub mod lcov;
pub mod matching;
pub mod processor;
pub mod types;

pub use error::{CoverageError, CoverageResult};
pub use processor::CoverageProcessor;
pub use types::{CoverageReport, CoverageType, FileCoverage};
