//! Top-level entry: load once, then run every engine against the same dataset.

use std::path::Path;

use log::{error, info};
use serde::Serialize;

use crate::data::loader::{load_file, LoaderOptions};
use crate::data::model::Dataset;
use crate::error::{MorphoError, Result};
use crate::metrics::asymmetry::{asymmetry_profiles, Rounding};
use crate::metrics::distance::distance_profiles;
use crate::metrics::ranking::{lowest_asymmetries, RankingEntry, DEFAULT_TOP_K};
use crate::metrics::similarity::cosine_similarity;
use crate::metrics::Profile;

pub const DIAG_CHECK_INPUT: &str = "Please enter the correct subject id or check your csv file";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub loader: LoaderOptions,
    /// Width of the lowest-asymmetry ranking.
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            loader: LoaderOptions::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Every result of one successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub asymmetry: Vec<Option<Profile>>,
    pub distances: Vec<Option<Profile>>,
    pub lowest_asymmetries: Vec<RankingEntry>,
    pub similarity: Option<f64>,
}

/// Run the engines over an already loaded dataset.
///
/// Asymmetry runs first, so an unknown subject id fails the whole call
/// before the distance engine gets to shorten its output.
pub fn analyze_dataset<S: AsRef<str>>(
    dataset: &Dataset,
    subjects: &[S],
    top_k: usize,
) -> Result<Analysis> {
    let asymmetry = asymmetry_profiles(dataset, subjects, Rounding::FourPlaces)?;
    let distances = distance_profiles(dataset, subjects);
    let lowest = lowest_asymmetries(dataset, top_k);
    let similarity = cosine_similarity(&distances)?;

    Ok(Analysis {
        asymmetry,
        distances,
        lowest_asymmetries: lowest,
        similarity,
    })
}

/// Load `path` and analyse `subjects` (ids are upper-cased first).
pub fn analyze<S: AsRef<str>>(path: &Path, subjects: &[S], config: &PipelineConfig) -> Result<Analysis> {
    let dataset = load_file(path, &config.loader)?;
    let subjects: Vec<String> = subjects.iter().map(|s| s.as_ref().to_uppercase()).collect();
    info!("Analysing {:?} over {} loaded subjects", subjects, dataset.len());
    analyze_dataset(&dataset, &subjects, config.top_k)
}

// ---------------------------------------------------------------------------
// Degrading entry point
// ---------------------------------------------------------------------------

/// The 4-tuple handed to callers that do not want to deal with errors.
///
/// After any hard failure all four slots are `None` and `diagnostic`
/// explains why; partial results are never returned.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Outcome {
    pub asymmetry: Option<Vec<Option<Profile>>>,
    pub distances: Option<Vec<Option<Profile>>>,
    pub lowest_asymmetries: Option<Vec<RankingEntry>>,
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl Outcome {
    pub fn unavailable(diagnostic: impl Into<String>) -> Self {
        Outcome {
            diagnostic: Some(diagnostic.into()),
            ..Default::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.diagnostic.is_some()
    }
}

impl From<Analysis> for Outcome {
    fn from(a: Analysis) -> Self {
        Outcome {
            asymmetry: Some(a.asymmetry),
            distances: Some(a.distances),
            lowest_asymmetries: Some(a.lowest_asymmetries),
            similarity: a.similarity,
            diagnostic: None,
        }
    }
}

/// Like [`analyze`], but every failure is caught here, logged once and
/// turned into an all-`None` [`Outcome`].
pub fn run<S: AsRef<str>>(path: &Path, subjects: &[S], config: &PipelineConfig) -> Outcome {
    match analyze(path, subjects, config) {
        Ok(analysis) => analysis.into(),
        Err(e) => {
            error!("{e}");
            Outcome::unavailable(diagnose(path, &e))
        }
    }
}

fn diagnose(path: &Path, e: &MorphoError) -> String {
    if e.is_source_not_found() {
        format!("The file {} is not found", path.display())
    } else {
        DIAG_CHECK_INPUT.to_string()
    }
}
