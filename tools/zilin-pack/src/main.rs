use std::fs::File;
use std::io::BufWriter;

use clap::{Arg, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zilin_rs::dictionary_lib::BUNDLE_FILE_NAME;
use zilin_rs::{Corpus, Zilin};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m"; // Bold Blue
    const RESET: &str = "\x1B[0m"; // Reset color

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("Zilin Pack")
        .arg(
            Arg::new("data_dir")
                .short('d')
                .long("data-dir")
                .value_name("dir")
                .default_value("data")
                .help("Directory holding the corpus files."),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("format")
                .default_value("zstd")
                .help("Bundle format: [zstd|json]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("filename")
                .help("Write the bundle to <filename>. If not specified, a default filename is used."),
        )
        .about(format!(
            "{BLUE}Zilin Pack: bundle corpus files into a single file for zilin-rs{RESET}"
        ))
        .get_matches();

    let data_dir = matches
        .get_one::<String>("data_dir")
        .map(String::as_str)
        .unwrap_or("data");
    let bundle_format = matches.get_one::<String>("format").map(String::as_str);

    let default_output = match bundle_format {
        Some("zstd") => BUNDLE_FILE_NAME,
        Some("json") => "zilin-corpus.json",
        _ => "zilin-corpus.unknown",
    };
    let output_file = matches
        .get_one::<String>("output")
        .map(|s| s.as_str())
        .unwrap_or(default_output);

    let corpus = Corpus::from_dir(data_dir)?;
    // Refuse to pack a corpus that would not load.
    Zilin::load(&corpus)?;
    info!(data_dir, "corpus validated");

    match bundle_format {
        Some("zstd") => {
            corpus.save_compressed(output_file)?;
            eprintln!("{BLUE}Corpus saved in ZSTD format at: {output_file}{RESET}");
        }
        Some("json") => {
            let file = BufWriter::new(File::create(output_file)?);
            serde_json::to_writer_pretty(file, &corpus)?;
            eprintln!("{BLUE}Corpus saved in JSON format at: {output_file}{RESET}");
        }
        other => {
            let format_str = other.unwrap_or("unknown");
            eprintln!("{BLUE}Unsupported format: {format_str}{RESET}");
        }
    }

    Ok(())
}
