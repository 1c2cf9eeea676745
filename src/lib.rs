//! Facial landmark morphometrics.
//!
//! Loads per-subject 3D landmark tables and derives bilateral asymmetry,
//! inter-landmark distances, a lowest-asymmetry ranking and the cosine
//! similarity of two subjects' distance profiles.

pub mod data;
pub mod error;
pub mod metrics;
pub mod pipeline;

pub use error::{MorphoError, Result};
pub use pipeline::{analyze, run, Analysis, Outcome, PipelineConfig};
