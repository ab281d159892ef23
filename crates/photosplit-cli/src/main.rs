use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use photosplit::{
    detect_photos, detect_photos_fast, extract_photos, init_with_level, DetectorParams,
    ExtractorParams, PhotoCandidate,
};

/// Detect and split physical photos out of flatbed scans.
#[derive(Parser)]
#[command(name = "photosplit", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect photo regions and print them as JSON.
    Detect {
        /// Input scan image.
        image: PathBuf,

        /// Run only the primary contour strategy.
        #[arg(long)]
        fast: bool,

        /// Override the confidence gate (0.0-1.0).
        #[arg(long)]
        min_confidence: Option<f32>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Detect photo regions and extract each one as a JPEG.
    Extract {
        /// Input scan image.
        image: PathBuf,

        /// Output directory for the extracted photos.
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Run only the primary contour strategy.
        #[arg(long)]
        fast: bool,

        /// Override the confidence gate (0.0-1.0).
        #[arg(long)]
        min_confidence: Option<f32>,

        /// Crop axis-aligned boxes instead of perspective-correcting.
        #[arg(long)]
        no_perspective: bool,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = init_with_level(level);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), serde_json::Error> {
    match cli.command {
        Command::Detect {
            image,
            fast,
            min_confidence,
            pretty,
        } => {
            let found = detect(&image, fast, min_confidence);
            print_json(&found, pretty)
        }
        Command::Extract {
            image,
            out_dir,
            fast,
            min_confidence,
            no_perspective,
            pretty,
        } => {
            let found = detect(&image, fast, min_confidence);
            let params = ExtractorParams {
                perspective_correction: !no_perspective,
                ..ExtractorParams::default()
            };
            let extracted = extract_photos(&image, &out_dir, &found, &params);
            print_json(&extracted, pretty)
        }
    }
}

fn detect(image: &PathBuf, fast: bool, min_confidence: Option<f32>) -> Vec<PhotoCandidate> {
    let mut params = DetectorParams::default();
    if let Some(c) = min_confidence {
        params.min_confidence = c;
    }
    if fast {
        detect_photos_fast(image, &params)
    } else {
        detect_photos(image, &params)
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), serde_json::Error> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}
