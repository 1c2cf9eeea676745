use std::collections::BTreeMap;
use std::fmt;

/// Number of landmarks a fully observed subject carries.
pub const LANDMARKS_PER_SUBJECT: usize = 7;

/// The midline landmark (pronasale). Expected to coincide with its mirror.
pub const MIDLINE_LANDMARK: &str = "PRN";

// ---------------------------------------------------------------------------
// Coordinates – the six numbers recorded for one landmark
// ---------------------------------------------------------------------------

/// `[ox, oy, oz, mx, my, mz]`: observed point followed by its mirrored match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates(pub [f64; 6]);

impl Coordinates {
    pub fn observed(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    pub fn mirrored(&self) -> [f64; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// True when every value lies strictly inside `(-bound, bound)`.
    /// NaN never qualifies.
    pub fn within(&self, bound: f64) -> bool {
        self.0.iter().all(|v| *v > -bound && *v < bound)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [ox, oy, oz, mx, my, mz] = self.0;
        write!(f, "({ox}, {oy}, {oz}) ~ ({mx}, {my}, {mz})")
    }
}

// ---------------------------------------------------------------------------
// SubjectRecord – landmark code → coordinates for one subject
// ---------------------------------------------------------------------------

/// Landmarks of one subject, kept in the order they first appeared in the
/// source. A repeated landmark overwrites the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectRecord {
    landmarks: Vec<(String, Coordinates)>,
}

impl SubjectRecord {
    pub fn insert(&mut self, code: String, coords: Coordinates) {
        match self.landmarks.iter_mut().find(|(c, _)| *c == code) {
            Some(slot) => slot.1 = coords,
            None => self.landmarks.push((code, coords)),
        }
    }

    pub fn landmark(&self, code: &str) -> Option<&Coordinates> {
        self.landmarks
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, coords)| coords)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Coordinates)> {
        self.landmarks.iter().map(|(c, coords)| (c.as_str(), coords))
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// A record is usable for profiling only with exactly seven landmarks.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() == LANDMARKS_PER_SUBJECT
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Subject id → record. Built once by the loader, read-only afterwards.
///
/// Iteration follows first-seen order in the source so that ranking ties
/// resolve deterministically.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    subjects: Vec<(String, SubjectRecord)>,
    index: BTreeMap<String, usize>,
}

impl Dataset {
    /// Store `coords` under `subject`/`code`, creating the subject on first use.
    pub fn insert(&mut self, subject: String, code: String, coords: Coordinates) {
        let idx = match self.index.get(&subject) {
            Some(&idx) => idx,
            None => {
                let idx = self.subjects.len();
                self.index.insert(subject.clone(), idx);
                self.subjects.push((subject, SubjectRecord::default()));
                idx
            }
        };
        self.subjects[idx].1.insert(code, coords);
    }

    pub fn get(&self, subject: &str) -> Option<&SubjectRecord> {
        self.index.get(subject).map(|&idx| &self.subjects[idx].1)
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.index.contains_key(subject)
    }

    pub fn subject_ids(&self) -> Vec<String> {
        self.subjects.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SubjectRecord)> {
        self.subjects.iter().map(|(id, rec)| (id.as_str(), rec))
    }

    /// Number of subjects.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
