use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Coordinates, Dataset};
use super::schema::ColumnMap;
use crate::error::{MorphoError, Result};

// ---------------------------------------------------------------------------
// Options and statistics
// ---------------------------------------------------------------------------

/// Knobs of the record loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoaderOptions {
    /// Field delimiter of text sources.
    pub delimiter: u8,
    /// Rows with any coordinate outside `(-bound, bound)` are dropped.
    pub coordinate_bound: f64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            coordinate_bound: 200.0,
        }
    }
}

/// What happened to the rows of one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows seen (header excluded).
    pub rows_read: usize,
    /// Rows skipped because some field was empty.
    pub skipped_blank: usize,
    /// Rows dropped because a coordinate was out of range.
    pub dropped_out_of_range: usize,
    /// Rows merged into the dataset.
    pub accepted: usize,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a landmark dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – columnar table with the required columns
/// * `.tsv`             – tab-delimited text (unless a delimiter was chosen)
/// * anything else      – delimited text using `options.delimiter`
pub fn load_file(path: &Path, options: &LoaderOptions) -> Result<Dataset> {
    load_file_with_stats(path, options).map(|(dataset, _)| dataset)
}

/// Same as [`load_file`] but also reports per-row outcomes.
pub fn load_file_with_stats(path: &Path, options: &LoaderOptions) -> Result<(Dataset, LoadStats)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let file = open_source(path)?;
    let (dataset, stats) = match ext.as_str() {
        "parquet" | "pq" => read_parquet(file, options)?,
        "tsv" if options.delimiter == b',' => {
            let options = LoaderOptions {
                delimiter: b'\t',
                ..*options
            };
            read_delimited(file, &options)?
        }
        _ => read_delimited(file, options)?,
    };

    info!(
        "Loaded {} subjects from {} ({} rows read, {} blank, {} out of range)",
        dataset.len(),
        path.display(),
        stats.rows_read,
        stats.skipped_blank,
        stats.dropped_out_of_range
    );
    Ok((dataset, stats))
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MorphoError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => MorphoError::Io(e),
    })
}

// ---------------------------------------------------------------------------
// Row acceptance shared by every format
// ---------------------------------------------------------------------------

struct DatasetBuilder<'a> {
    options: &'a LoaderOptions,
    dataset: Dataset,
    stats: LoadStats,
}

impl<'a> DatasetBuilder<'a> {
    fn new(options: &'a LoaderOptions) -> Self {
        Self {
            options,
            dataset: Dataset::default(),
            stats: LoadStats::default(),
        }
    }

    fn skip_blank(&mut self, row: usize) {
        debug!("row {row}: empty field, skipped");
        self.stats.skipped_blank += 1;
    }

    fn push(&mut self, row: usize, subject: String, landmark: String, coords: Coordinates) {
        if !coords.within(self.options.coordinate_bound) {
            debug!("row {row}: {subject}/{landmark} out of range {coords}, dropped");
            self.stats.dropped_out_of_range += 1;
            return;
        }
        self.stats.accepted += 1;
        self.dataset.insert(subject, landmark, coords);
    }

    fn finish(self) -> (Dataset, LoadStats) {
        (self.dataset, self.stats)
    }
}

fn parse_coordinate(text: &str, row: usize) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| MorphoError::parse(row, format!("'{text}' is not a number")))
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Text layout: header row naming at least `SUBJID, LANDMARK, OX, OY, OZ,
/// MX, MY, MZ` (any order, any case), then one row per subject/landmark.
///
/// Every cell is upper-cased. A row with an empty cell anywhere is skipped;
/// a row too short to reach every required column, or with a non-numeric
/// coordinate, aborts the whole load.
pub fn read_delimited<R: Read>(source: R, options: &LoaderOptions) -> Result<(Dataset, LoadStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let columns = ColumnMap::resolve(reader.headers()?.iter())?;
    let width = columns.min_width();
    let mut builder = DatasetBuilder::new(options);

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result?;
        builder.stats.rows_read += 1;

        if record.iter().any(str::is_empty) {
            builder.skip_blank(row);
            continue;
        }
        if record.len() < width {
            return Err(MorphoError::parse(
                row,
                format!("{} fields, required columns need {width}", record.len()),
            ));
        }

        let mut values = [0.0f64; 6];
        for (value, &col) in values.iter_mut().zip(&columns.coords) {
            *value = parse_coordinate(&record[col], row)?;
        }

        builder.push(
            row,
            record[columns.subject].to_uppercase(),
            record[columns.landmark].to_uppercase(),
            Coordinates(values),
        );
    }

    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Columnar layout with the same required column names as the text format.
///
/// Subject and landmark columns are rendered to text and upper-cased.
/// Coordinate columns may be Float64, Float32, Int64, Int32 or text holding
/// numbers. A null cell (or empty text cell) skips the row.
fn read_parquet(file: File, options: &LoaderOptions) -> Result<(Dataset, LoadStats)> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns = ColumnMap::resolve(builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build()?;

    let mut out = DatasetBuilder::new(options);
    let mut row = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let all_cols = batch.columns();

        for r in 0..batch.num_rows() {
            row += 1;
            out.stats.rows_read += 1;

            if all_cols.iter().any(|col| is_blank(col, r)) {
                out.skip_blank(row);
                continue;
            }

            let mut values = [0.0f64; 6];
            for (value, &col) in values.iter_mut().zip(&columns.coords) {
                *value = cell_f64(batch.column(col), r, row)?;
            }

            let subject = array_value_to_string(batch.column(columns.subject).as_ref(), r)?;
            let landmark = array_value_to_string(batch.column(columns.landmark).as_ref(), r)?;
            out.push(row, subject.to_uppercase(), landmark.to_uppercase(), Coordinates(values));
        }
    }

    Ok(out.finish())
}

fn is_blank(col: &ArrayRef, row: usize) -> bool {
    if col.is_null(row) {
        return true;
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).is_empty(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).is_empty(),
        _ => false,
    }
}

fn cell_f64(col: &ArrayRef, r: usize, row: usize) -> Result<f64> {
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(r),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(r) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(r) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(r) as f64,
        _ => parse_coordinate(&array_value_to_string(col.as_ref(), r)?, row)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::{Builder, NamedTempFile};

    const HEADER: &str = "subjid,landmark,ox,oy,oz,mx,my,mz";

    fn load_str(content: &str) -> Result<(Dataset, LoadStats)> {
        read_delimited(content.as_bytes(), &LoaderOptions::default())
    }

    fn temp_with_ext(ext: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new()
            .suffix(ext)
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_rows_are_case_normalized_and_merged() {
        let content = format!(
            "{HEADER}\n\
             b7033,ex,1,2,3,4,5,6\n\
             B7033,En,1.5,2.5,3.5,4.5,5.5,6.5\n\
             c1283,ex,0,0,0,0,0,0\n"
        );
        let (ds, stats) = load_str(&content).unwrap();

        assert_eq!(ds.subject_ids(), vec!["B7033", "C1283"]);
        let rec = ds.get("B7033").unwrap();
        assert_eq!(rec.len(), 2);
        assert_eq!(
            rec.landmark("EN"),
            Some(&Coordinates([1.5, 2.5, 3.5, 4.5, 5.5, 6.5]))
        );
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.accepted, 3);
    }

    #[test]
    fn test_columns_located_by_name() {
        let content = "MZ,site,LANDMARK,OX,OY,OZ,MX,MY,SUBJID\n\
                       6,north,CH,1,2,3,4,5,s1\n";
        let (ds, _) = load_str(content).unwrap();
        assert_eq!(
            ds.get("S1").unwrap().landmark("CH"),
            Some(&Coordinates([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
        );
    }

    #[test]
    fn test_blank_field_skips_row() {
        let content = format!(
            "{HEADER},note\n\
             A1,EX,1,2,3,4,5,6,\n\
             A1,EN,,2,3,4,5,6,x\n\
             A1,AL,1,2,3,4,5,6,ok\n"
        );
        let (ds, stats) = load_str(&content).unwrap();
        let rec = ds.get("A1").unwrap();
        assert_eq!(rec.len(), 1);
        assert!(rec.landmark("AL").is_some());
        assert_eq!(stats.skipped_blank, 2);
    }

    #[test]
    fn test_out_of_range_rows_dropped() {
        let content = format!(
            "{HEADER}\n\
             A1,EX,199.99,-199.99,0,0,0,0\n\
             A1,EN,200,0,0,0,0,0\n\
             A1,AL,0,0,0,0,0,-200\n\
             B2,FT,0,0,0,0,0,250\n"
        );
        let (ds, stats) = load_str(&content).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get("A1").unwrap().len(), 1);
        assert!(!ds.contains("B2"));
        assert_eq!(stats.dropped_out_of_range, 3);
    }

    #[test]
    fn test_non_numeric_coordinate_is_fatal() {
        let content = format!(
            "{HEADER}\n\
             A1,EX,1,2,3,4,5,6\n\
             A1,EN,1,two,3,4,5,6\n"
        );
        match load_str(&content).unwrap_err() {
            MorphoError::Parse { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_is_fatal() {
        let content = format!("{HEADER}\nA1,EX,1,2,3,4\n");
        assert!(matches!(
            load_str(&content).unwrap_err(),
            MorphoError::Parse { row: 1, .. }
        ));
    }

    #[test]
    fn test_missing_header_column() {
        let content = "SUBJID,LANDMARK,OX,OY,OZ,MX,MY\nA1,EX,1,2,3,4,5\n";
        assert!(matches!(
            load_str(content).unwrap_err(),
            MorphoError::Schema { .. }
        ));
    }

    #[test]
    fn test_padded_header_and_quoted_cells() {
        let content = "SUBJID, OX,OY,OZ,MX,MY,MZ,LANDMARK\n\
                       A1,\"1.5\",2,3,4,5,6,EX\n\
                       A1,\"\",2,3,4,5,6,EN\n";
        let (ds, stats) = load_str(content).unwrap();
        assert_eq!(
            ds.get("A1").unwrap().landmark("EX"),
            Some(&Coordinates([1.5, 2.0, 3.0, 4.0, 5.0, 6.0]))
        );
        assert_eq!(stats.skipped_blank, 1);
    }

    #[test]
    fn test_custom_delimiter() {
        let content = "SUBJID;LANDMARK;OX;OY;OZ;MX;MY;MZ\nA1;EX;1;2;3;4;5;6\n";
        let options = LoaderOptions {
            delimiter: b';',
            ..Default::default()
        };
        let (ds, _) = read_delimited(content.as_bytes(), &options).unwrap();
        assert_eq!(ds.get("A1").unwrap().len(), 1);
    }

    #[test]
    fn test_tsv_extension_switches_delimiter() {
        let file = temp_with_ext(
            ".tsv",
            "SUBJID\tLANDMARK\tOX\tOY\tOZ\tMX\tMY\tMZ\nA1\tEX\t1\t2\t3\t4\t5\t6\n",
        );
        let ds = load_file(file.path(), &LoaderOptions::default()).unwrap();
        assert_eq!(ds.get("A1").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_is_source_not_found() {
        let err = load_file(Path::new("/nonexistent/landmarks.csv"), &LoaderOptions::default())
            .unwrap_err();
        assert!(err.is_source_not_found());
        assert!(matches!(err, MorphoError::SourceNotFound { .. }));
    }

    #[test]
    fn test_parquet_source() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("subjid", DataType::Utf8, true),
            Field::new("landmark", DataType::Utf8, true),
            Field::new("OX", DataType::Float64, true),
            Field::new("OY", DataType::Float64, true),
            Field::new("OZ", DataType::Float64, true),
            Field::new("MX", DataType::Float64, true),
            Field::new("MY", DataType::Float64, true),
            Field::new("MZ", DataType::Utf8, true),
        ]));
        let f = |v: Vec<Option<f64>>| Arc::new(Float64Array::from(v)) as ArrayRef;
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("a1"), Some("a1"), Some("b2")])),
                Arc::new(StringArray::from(vec![Some("ex"), Some("en"), Some("ex")])),
                f(vec![Some(1.0), None, Some(1.0)]),
                f(vec![Some(2.0), Some(2.0), Some(2.0)]),
                f(vec![Some(3.0), Some(3.0), Some(3.0)]),
                f(vec![Some(4.0), Some(4.0), Some(4.0)]),
                f(vec![Some(5.0), Some(5.0), Some(5.0)]),
                Arc::new(StringArray::from(vec![Some("6"), Some("6"), Some("300")])),
            ],
        )
        .unwrap();

        let file = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let (ds, stats) = load_file_with_stats(file.path(), &LoaderOptions::default()).unwrap();
        assert_eq!(ds.subject_ids(), vec!["A1"]);
        assert_eq!(
            ds.get("A1").unwrap().landmark("EX"),
            Some(&Coordinates([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
        );
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.skipped_blank, 1);
        assert_eq!(stats.dropped_out_of_range, 1);
    }
}
