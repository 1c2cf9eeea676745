use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use facial_morpho::data::schema::REQUIRED_COLUMNS;
use facial_morpho::data::synth::{generate, write_delimited, SynthOptions, SynthTable};

fn to_record_batch(table: &SynthTable) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new(REQUIRED_COLUMNS[0], DataType::Utf8, false),
        Field::new(REQUIRED_COLUMNS[1], DataType::Utf8, false),
    ];
    fields.extend(
        REQUIRED_COLUMNS[2..]
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let subjects = StringArray::from(
        table.rows.iter().map(|r| r.subject.as_str()).collect::<Vec<_>>(),
    );
    let landmarks = StringArray::from(
        table.rows.iter().map(|r| r.landmark.as_str()).collect::<Vec<_>>(),
    );

    let mut columns: Vec<ArrayRef> = vec![Arc::new(subjects), Arc::new(landmarks)];
    for k in 0..6 {
        let values: Float64Array = table.rows.iter().map(|r| r.values[k]).collect();
        columns.push(Arc::new(values));
    }

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn main() -> Result<()> {
    env_logger::init();

    let options = SynthOptions::default();
    let table = generate(&options);

    let csv_path = "sample_landmarks.csv";
    let file = File::create(csv_path).context("creating CSV output")?;
    write_delimited(&table, file, b',').context("writing CSV")?;

    let batch = to_record_batch(&table)?;
    let parquet_path = "sample_landmarks.parquet";
    let file = File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    let defective = table.subjects.iter().filter(|s| s.defect.is_some()).count();
    println!(
        "Wrote {} subjects ({} with injected defects, {} rows) to {csv_path} and {parquet_path}",
        table.subjects.len(),
        defective,
        table.rows.len()
    );
    Ok(())
}
