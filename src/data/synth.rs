//! Deterministic synthetic landmark tables.
//!
//! Faces are a fixed template jittered per subject; each lateral landmark's
//! mirror gets Gaussian noise, the midline landmark is mirrored exactly.
//! Defects can be injected so that every loader and engine path is hit.

use std::io::Write;

use super::model::{Coordinates, MIDLINE_LANDMARK};
use super::schema::REQUIRED_COLUMNS;
use crate::error::Result;

/// Observed template position of every landmark.
pub const TEMPLATE: [(&str, [f64; 3]); 7] = [
    ("EX", [-45.0, 35.0, -10.0]),
    ("EN", [-15.0, 33.0, -5.0]),
    ("AL", [-17.0, 0.0, 5.0]),
    ("FT", [-60.0, 40.0, -40.0]),
    ("SBAL", [-8.0, -12.0, 2.0]),
    ("CH", [-25.0, -45.0, 0.0]),
    (MIDLINE_LANDMARK, [0.0, 5.0, 20.0]),
];

/// What, if anything, is wrong with a generated subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    /// One landmark row is never written.
    MissingLandmark,
    /// One landmark row has an empty coordinate cell.
    BlankField,
    /// One landmark row carries a coordinate beyond the range bound.
    OutOfRange,
    /// The midline landmark does not coincide with its mirror.
    AsymmetricMidline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthSubject {
    pub id: String,
    pub defect: Option<Defect>,
}

/// One table row; `None` cells are written empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthRow {
    pub subject: String,
    pub landmark: String,
    pub values: [Option<f64>; 6],
}

#[derive(Debug, Clone, Default)]
pub struct SynthTable {
    pub subjects: Vec<SynthSubject>,
    pub rows: Vec<SynthRow>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthOptions {
    pub subjects: usize,
    pub seed: u64,
    /// Std-dev of the per-subject template jitter.
    pub jitter: f64,
    /// Std-dev of the mirror offset on lateral landmarks.
    pub asymmetry: f64,
    /// Cycle through the [`Defect`] kinds on every fifth subject.
    pub inject_defects: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            subjects: 40,
            seed: 42,
            jitter: 3.0,
            asymmetry: 1.0,
            inject_defects: true,
        }
    }
}

/// Seeded noise source for landmark positions.
///
/// xoshiro256** for uniforms, Box-Muller for normals. The same seed always
/// yields the same faces.
pub struct LandmarkRng {
    state: [u64; 4],
}

impl LandmarkRng {
    pub fn new(seed: u64) -> Self {
        let mut state = [0u64; 4];
        let mut x = seed;
        for slot in &mut state {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        LandmarkRng { state }
    }

    fn next_u64(&mut self) -> u64 {
        let s = &mut self.state;
        let out = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;
        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);
        out
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// One draw from N(0, std_dev²).
    pub fn normal(&mut self, std_dev: f64) -> f64 {
        let u1 = self.unit().max(1e-15);
        let u2 = self.unit();
        std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// `point` displaced independently on each axis by N(0, std_dev²).
    pub fn jitter_point(&mut self, point: [f64; 3], std_dev: f64) -> [f64; 3] {
        point.map(|v| v + self.normal(std_dev))
    }
}

const DEFECT_CYCLE: [Defect; 4] = [
    Defect::MissingLandmark,
    Defect::BlankField,
    Defect::OutOfRange,
    Defect::AsymmetricMidline,
];

/// Build a table of `options.subjects` faces.
pub fn generate(options: &SynthOptions) -> SynthTable {
    let mut rng = LandmarkRng::new(options.seed);
    let mut table = SynthTable::default();

    for i in 0..options.subjects {
        let id = format!("S{i:04}");
        let defect = (options.inject_defects && i % 5 == 4).then(|| DEFECT_CYCLE[(i / 5) % DEFECT_CYCLE.len()]);

        for (code, base) in TEMPLATE {
            let observed = rng.jitter_point(base, options.jitter);
            let mirrored = if code == MIDLINE_LANDMARK {
                match defect {
                    Some(Defect::AsymmetricMidline) => observed.map(|v| v + 0.75),
                    _ => observed,
                }
            } else {
                rng.jitter_point(observed, options.asymmetry)
            };

            let mut values = [
                Some(observed[0]),
                Some(observed[1]),
                Some(observed[2]),
                Some(mirrored[0]),
                Some(mirrored[1]),
                Some(mirrored[2]),
            ];

            // Defects land on the cheilion row.
            if code == "CH" {
                match defect {
                    Some(Defect::MissingLandmark) => continue,
                    Some(Defect::BlankField) => values[1] = None,
                    Some(Defect::OutOfRange) => values[3] = Some(250.0),
                    _ => {}
                }
            }

            table.rows.push(SynthRow {
                subject: id.clone(),
                landmark: code.to_string(),
                values,
            });
        }

        table.subjects.push(SynthSubject { id, defect });
    }

    table
}

/// Write the table as delimited text with the standard header.
pub fn write_delimited<W: Write>(table: &SynthTable, writer: W, delimiter: u8) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    out.write_record(REQUIRED_COLUMNS)?;

    for row in &table.rows {
        let mut record = vec![row.subject.clone(), row.landmark.clone()];
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

impl SynthRow {
    pub fn coordinates(&self) -> Option<Coordinates> {
        let mut out = [0.0; 6];
        for (slot, v) in out.iter_mut().zip(self.values) {
            *slot = v?;
        }
        Some(Coordinates(out))
    }
}
