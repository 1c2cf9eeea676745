use super::{round4, Profile};
use crate::error::{MorphoError, Result};

/// Cosine similarity of two distance profiles, rounded to four places.
///
/// Takes the distance engine's output for exactly two subjects. If either
/// profile is `None` there is nothing to compare and the result is `None`.
pub fn cosine_similarity(profiles: &[Option<Profile>]) -> Result<Option<f64>> {
    if profiles.iter().any(Option::is_none) {
        return Ok(None);
    }
    match profiles {
        [Some(a), Some(b)] => cosine(&a.values(), &b.values()).map(|s| Some(round4(s))),
        _ => Err(MorphoError::ProfileCount(profiles.len())),
    }
}

/// dot(a, b) / (‖a‖ · ‖b‖), unrounded.
pub fn cosine(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(MorphoError::Domain(format!(
            "dimension mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|y| y * y).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(MorphoError::Domain("zero-length distance vector".into()));
    }
    Ok(dot / (norm_a * norm_b))
}
