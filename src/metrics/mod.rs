//! Morphometric measurements derived from a loaded [`Dataset`](crate::data::model::Dataset).
//!
//! ```text
//!              Dataset (read-only)
//!      ┌──────────────┼───────────────┐
//!      ▼              ▼               ▼
//!  asymmetry       distance        ranking ──(unrounded asymmetry)
//!                     │
//!                     ▼
//!                similarity  (exactly two distance profiles)
//! ```

pub mod asymmetry;
pub mod distance;
pub mod ranking;
pub mod similarity;

use serde::ser::{Serialize, Serializer};

/// Ordered mapping from a key (landmark code or pair key) to a measurement.
///
/// Key order is the order values were produced in, which is also the
/// vector axis order used by the similarity scorer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    entries: Vec<(String, f64)>,
}

impl Profile {
    pub fn push(&mut self, key: impl Into<String>, value: f64) {
        self.entries.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Profile {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Profile {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for Profile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

/// Round to four decimal places.
///
/// Fixed-precision formatting rounds the exact binary value (ties to even),
/// so a stored 0.00035, which sits just below the tie, goes down to 0.0003.
/// Scaling by 10^4 first would round twice.
pub fn round4(value: f64) -> f64 {
    format!("{value:.4}").parse().unwrap_or(value)
}

/// Straight-line distance between two points in 3D.
pub fn euclidean(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| (q - p).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_keeps_insertion_order_and_serializes_as_map() {
        let profile: Profile = [("FT", 1.5), ("EX", 0.25)].into_iter().collect();
        assert_eq!(profile.keys().collect::<Vec<_>>(), vec!["FT", "EX"]);
        assert_eq!(profile.get("EX"), Some(0.25));
        assert_eq!(profile.total(), 1.75);
        assert_eq!(
            serde_json::to_string(&profile).unwrap(),
            r#"{"FT":1.5,"EX":0.25}"#
        );
    }

    #[test]
    fn rounds_to_four_places() {
        assert_eq!(round4(1.919_849), 1.9198);
        assert_eq!(round4(2.557_71), 2.5577);
        assert_eq!(round4(-0.000_04), 0.0);
        assert_eq!(round4(33.092), 33.092);
    }

    #[test]
    fn rounds_stored_value_not_scaled_value() {
        assert_eq!(round4(0.00035), 0.0003);
        assert_eq!(round4(0.00045), 0.0004);
        assert_eq!(round4(0.00065), 0.0006);
        assert_eq!(round4(-0.00035), -0.0003);
        assert!(round4(f64::NAN).is_nan());
    }

    #[test]
    fn euclidean_pythagorean_triples() {
        assert_eq!(euclidean([0.0, 0.0, 0.0], [3.0, 4.0, 0.0]), 5.0);
        assert_eq!(euclidean([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]), 0.0);
        assert_eq!(euclidean([3.0, 4.0, 0.0], [3.0, 4.0, 12.0]), 12.0);
        assert_eq!(euclidean([0.0, 0.0, 0.0], [3.0, 4.0, 12.0]), 13.0);
    }
}
