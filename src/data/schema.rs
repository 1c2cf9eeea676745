use crate::error::{MorphoError, Result};

/// Required header names, in the order the loader consumes them.
pub const REQUIRED_COLUMNS: [&str; 8] = ["SUBJID", "LANDMARK", "OX", "OY", "OZ", "MX", "MY", "MZ"];

// ---------------------------------------------------------------------------
// ColumnMap – header name → fixed position, resolved once per load
// ---------------------------------------------------------------------------

/// Positions of the required columns inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub subject: usize,
    pub landmark: usize,
    /// `ox, oy, oz, mx, my, mz`
    pub coords: [usize; 6],
}

impl ColumnMap {
    /// Locate every required column in `header` (case-insensitive).
    /// When a name repeats, the first occurrence wins.
    pub fn resolve<I, S>(header: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = header
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_uppercase())
            .collect();

        let mut idx = [0usize; 8];
        for (slot, required) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = names
                .iter()
                .position(|n| n == required)
                .ok_or_else(|| MorphoError::Schema {
                    column: required.to_string(),
                })?;
        }

        Ok(ColumnMap {
            subject: idx[0],
            landmark: idx[1],
            coords: [idx[2], idx[3], idx[4], idx[5], idx[6], idx[7]],
        })
    }

    /// Smallest field count a row needs so that every required column exists.
    pub fn min_width(&self) -> usize {
        self.coords
            .iter()
            .chain([&self.subject, &self.landmark])
            .max()
            .map_or(0, |m| m + 1)
    }
}
