use log::debug;

use super::{euclidean, round4, Profile};
use crate::data::model::{Dataset, SubjectRecord};

/// Landmark pairs of the distance profile, in axis order.
/// The profile key of a pair is the two codes concatenated (`EXEN`, ...).
pub const LANDMARK_PAIRS: [(&str, &str); 6] = [
    ("EX", "EN"),
    ("EN", "AL"),
    ("AL", "EX"),
    ("FT", "SBAL"),
    ("SBAL", "CH"),
    ("CH", "FT"),
];

/// Distance profile of one subject, measured between observed points.
///
/// `Ok(None)` for an incomplete record. `Err(code)` names the first pair
/// landmark absent from a record that otherwise counts as complete.
pub fn subject_distances(record: &SubjectRecord) -> Result<Option<Profile>, &'static str> {
    if !record.is_complete() {
        return Ok(None);
    }

    let mut profile = Profile::default();
    for (a, b) in LANDMARK_PAIRS {
        let p = record.landmark(a).ok_or(a)?.observed();
        let q = record.landmark(b).ok_or(b)?.observed();
        profile.push(format!("{a}{b}"), round4(euclidean(p, q)));
    }
    Ok(Some(profile))
}

/// One profile per requested subject, in request order.
///
/// Lookup failures are not errors here: the first unknown subject, or the
/// first complete record lacking a pair landmark, ends the walk and the
/// profiles gathered so far are returned.
pub fn distance_profiles<S: AsRef<str>>(dataset: &Dataset, subjects: &[S]) -> Vec<Option<Profile>> {
    let mut profiles = Vec::with_capacity(subjects.len());
    for id in subjects {
        let id = id.as_ref();
        let Some(record) = dataset.get(id) else {
            debug!("unknown subject {id}, distance walk stopped");
            break;
        };
        match subject_distances(record) {
            Ok(profile) => profiles.push(profile),
            Err(code) => {
                debug!("subject {id} has no {code} landmark, distance walk stopped");
                break;
            }
        }
    }
    profiles
}
