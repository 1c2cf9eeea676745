use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use facial_morpho::data::loader::LoaderOptions;
use facial_morpho::metrics::Profile;
use facial_morpho::{run, Outcome, PipelineConfig};

#[derive(Parser)]
#[command(name = "facial-morpho")]
#[command(about = "Facial landmark asymmetry, distances, ranking and similarity", long_about = None)]
struct Cli {
    /// Landmark table (.csv, .tsv or .parquet)
    source: PathBuf,

    /// First subject id
    subject_a: String,

    /// Second subject id
    subject_b: String,

    /// Field delimiter of text sources
    #[arg(short, long, default_value_t = ',', value_parser = parse_delimiter)]
    delimiter: char,

    /// Number of lowest-asymmetry subjects to report
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_delimiter(s: &str) -> std::result::Result<char, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let config = PipelineConfig {
        loader: LoaderOptions {
            delimiter: cli.delimiter as u8,
            ..Default::default()
        },
        top_k: cli.top_k,
    };

    let outcome = run(&cli.source, &[&cli.subject_a, &cli.subject_b], &config);

    if let Some(diag) = &outcome.diagnostic {
        eprintln!("{diag}");
    }
    if cli.json {
        let text = serde_json::to_string_pretty(&outcome).context("serializing outcome")?;
        println!("{text}");
    } else {
        print_outcome(&outcome);
    }

    Ok(if outcome.is_degraded() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_outcome(outcome: &Outcome) {
    print_profiles("Asymmetry", outcome.asymmetry.as_deref());
    print_profiles("Distances", outcome.distances.as_deref());

    println!("Lowest total asymmetry:");
    match &outcome.lowest_asymmetries {
        Some(entries) => {
            for (rank, e) in entries.iter().enumerate() {
                println!("  {}. {} {:.4}", rank + 1, e.subject, e.total);
            }
        }
        None => println!("  <none>"),
    }

    match outcome.similarity {
        Some(s) => println!("Cosine similarity: {s:.4}"),
        None => println!("Cosine similarity: <none>"),
    }
}

fn print_profiles(title: &str, profiles: Option<&[Option<Profile>]>) {
    println!("{title}:");
    let Some(profiles) = profiles else {
        println!("  <none>");
        return;
    };
    for profile in profiles {
        match profile {
            Some(p) => {
                let cells: Vec<String> = p.iter().map(|(k, v)| format!("{k}={v}")).collect();
                println!("  {}", cells.join(" "));
            }
            None => println!("  <none>"),
        }
    }
}
