use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;
use pdf_manual::ManualConfig;

/// Generates the bundled operations manual as a PDF.
///
/// Settings come from the built-in defaults, an optional TOML file passed with
/// `--config`, and `PDF_MANUAL_<SECTION>__<KEY>` environment variables. Fonts
/// are looked up under `assets/fonts` or in `PDF_MANUAL_FONTS_DIR`.
#[derive(Parser)]
#[command(author, version, about = "Generate the operations manual PDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the manual to the configured output path.
    #[command(name = "generate", aliases = ["gen"])]
    Generate {
        /// TOML file layered over the built-in defaults.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { config } => generate(config),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn generate(config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config = ManualConfig::load(config.as_deref())?;
    info!("generating '{}'", config.document.title);

    let report = pdf_manual::manual::generate(&config)?;
    println!(
        "Generated {} ({} pages, {:.1} KB)",
        report.path.display(),
        report.page_count,
        report.bytes_written as f64 / 1024.0
    );
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
