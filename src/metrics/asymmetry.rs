use log::debug;

use super::{euclidean, round4, Profile};
use crate::data::model::{Coordinates, Dataset, SubjectRecord, MIDLINE_LANDMARK};
use crate::error::{MorphoError, Result};

/// Whether offsets are reported at four decimal places or full precision.
///
/// Ranking sums unrounded values and rounds once, so rounding error does
/// not compound across landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    #[default]
    FourPlaces,
    Full,
}

impl Rounding {
    fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::FourPlaces => round4(value),
            Rounding::Full => value,
        }
    }
}

/// Distance between a landmark's observed point and its mirrored match.
pub fn bilateral_offset(coords: &Coordinates) -> f64 {
    euclidean(coords.observed(), coords.mirrored())
}

/// Asymmetry profile of one subject.
///
/// `None` when the record is incomplete, or when the midline landmark is
/// off its mirror at all: one asymmetric PRN voids the whole subject, not
/// just that entry. A PRN with zero offset is left out of the profile.
pub fn subject_asymmetry(record: &SubjectRecord, rounding: Rounding) -> Option<Profile> {
    if !record.is_complete() {
        debug!("incomplete record ({} landmarks), no asymmetry", record.len());
        return None;
    }

    let mut profile = Profile::default();
    for (code, coords) in record.iter() {
        let offset = rounding.apply(bilateral_offset(coords));
        if code == MIDLINE_LANDMARK {
            if offset == 0.0 {
                continue;
            }
            debug!("{MIDLINE_LANDMARK} offset {offset} is non-zero, subject aborted");
            return None;
        }
        profile.push(code, offset);
    }
    Some(profile)
}

/// One profile per requested subject, in request order.
///
/// An id missing from the dataset is an error; an unusable record is `None`.
pub fn asymmetry_profiles<S: AsRef<str>>(
    dataset: &Dataset,
    subjects: &[S],
    rounding: Rounding,
) -> Result<Vec<Option<Profile>>> {
    subjects
        .iter()
        .map(|id| {
            let id = id.as_ref();
            let record = dataset
                .get(id)
                .ok_or_else(|| MorphoError::Lookup(id.to_string()))?;
            Ok(subject_asymmetry(record, rounding))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Observed point at the origin, mirror displaced by `d`.
    fn lm(d: [f64; 3]) -> Coordinates {
        Coordinates([0.0, 0.0, 0.0, d[0], d[1], d[2]])
    }

    fn dataset_with_prn(prn: [f64; 3]) -> Dataset {
        let mut ds = Dataset::default();
        let rows = [
            ("FT", [1.0, 4.0, 8.0]),
            ("EX", [3.0, 4.0, 0.0]),
            ("EN", [1.0, 2.0, 2.0]),
            ("PRN", prn),
            ("AL", [2.0, 3.0, 6.0]),
            ("SBAL", [2.0, 6.0, 9.0]),
            ("CH", [0.0, 0.0, 0.0]),
        ];
        for (code, d) in rows {
            ds.insert("S1".into(), code.into(), lm(d));
        }
        ds
    }

    #[test]
    fn zero_prn_is_excluded() {
        let ds = dataset_with_prn([0.0, 0.0, 0.0]);
        let profiles = asymmetry_profiles(&ds, &["S1"], Rounding::FourPlaces).unwrap();
        let profile = profiles[0].as_ref().unwrap();

        assert_eq!(profile.len(), 6);
        assert_eq!(profile.get("PRN"), None);
        assert_eq!(
            profile.iter().collect::<Vec<_>>(),
            vec![
                ("FT", 9.0),
                ("EX", 5.0),
                ("EN", 3.0),
                ("AL", 7.0),
                ("SBAL", 11.0),
                ("CH", 0.0),
            ]
        );
    }

    #[test]
    fn nonzero_prn_voids_subject() {
        let ds = dataset_with_prn([0.0, 0.0, 0.5]);
        let profiles = asymmetry_profiles(&ds, &["S1"], Rounding::FourPlaces).unwrap();
        assert_eq!(profiles, vec![None]);
    }

    #[test]
    fn prn_zero_test_follows_rounding_mode() {
        let ds = dataset_with_prn([0.0, 0.0, 0.00001]);
        let rounded = asymmetry_profiles(&ds, &["S1"], Rounding::FourPlaces).unwrap();
        assert!(rounded[0].is_some());
        let full = asymmetry_profiles(&ds, &["S1"], Rounding::Full).unwrap();
        assert!(full[0].is_none());
    }

    #[test]
    fn rounding_modes() {
        let mut ds = dataset_with_prn([0.0, 0.0, 0.0]);
        ds.insert("S1".into(), "CH".into(), lm([1.0, 1.0, 0.0]));

        let rounded = asymmetry_profiles(&ds, &["S1"], Rounding::FourPlaces).unwrap();
        assert_eq!(rounded[0].as_ref().unwrap().get("CH"), Some(1.4142));

        let full = asymmetry_profiles(&ds, &["S1"], Rounding::Full).unwrap();
        assert_eq!(full[0].as_ref().unwrap().get("CH"), Some(2f64.sqrt()));
    }

    #[test]
    fn reported_offset_rounds_stored_value() {
        let mut ds = dataset_with_prn([0.0, 0.0, 0.0]);
        ds.insert("S1".into(), "EX".into(), lm([0.0, 0.0, 0.00035]));

        let profiles = asymmetry_profiles(&ds, &["S1"], Rounding::FourPlaces).unwrap();
        assert_eq!(profiles[0].as_ref().unwrap().get("EX"), Some(0.0003));
    }

    #[test]
    fn incomplete_record_is_none() {
        let mut ds = dataset_with_prn([0.0, 0.0, 0.0]);
        ds.insert("S2".into(), "EX".into(), lm([1.0, 0.0, 0.0]));
        let profiles = asymmetry_profiles(&ds, &["S2", "S1"], Rounding::FourPlaces).unwrap();
        assert!(profiles[0].is_none());
        assert!(profiles[1].is_some());
    }

    #[test]
    fn unknown_subject_is_lookup_error() {
        let ds = dataset_with_prn([0.0, 0.0, 0.0]);
        let err = asymmetry_profiles(&ds, &["S1", "NOPE"], Rounding::FourPlaces).unwrap_err();
        assert!(matches!(err, MorphoError::Lookup(id) if id == "NOPE"));
    }
}
