/// Data layer: core types, schema resolution, loading, synthetic tables.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  header → fixed column positions (once per load)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  rows → filter blank / out-of-range → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  subject → landmark → [ox, oy, oz, mx, my, mz]
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod schema;
pub mod synth;
