use clap::Parser;
use jlc_kicad::config::Config;
use jlc_kicad::{import_component, install_batch, validate_installed_footprint};
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "jlc-kicad")]
#[command(about = "Installs LCSC components into a KiCad library", long_about = None)]
struct Cli {
    /// LCSC component IDs (e.g., C2040)
    #[arg(required = true, value_name = "ID")]
    ids: Vec<String>,

    /// Library output directory; overrides the config file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reference footprint SVG to check a single generated footprint against
    #[arg(long, value_name = "FILE")]
    footprint_svg: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn log_level(debug: bool) -> log::LevelFilter {
    if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(log_level(args.debug))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{} jlc-kicad] {}", record.level(), record.args())
        })
        .init();

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(output) = args.output {
        config.output_dir = output;
    }

    let start_time = Instant::now();
    if let [lcsc_id] = args.ids.as_slice() {
        match import_component(lcsc_id, &config).await {
            Ok(outcome) => {
                println!(
                    "Installed {} into {} ({})",
                    outcome.symbol_name, outcome.category, outcome.footprint_ref
                );
                if let Some(svg_path) = &args.footprint_svg {
                    let checked = fs::read_to_string(svg_path)
                        .map_err(jlc_kicad::error::Error::from)
                        .and_then(|svg| {
                            validate_installed_footprint(&outcome, &svg, &config.validation)
                        });
                    match checked {
                        Ok(Some(result)) => println!(
                            "Footprint check: {} ({} errors, {} warnings)",
                            if result.passed { "passed" } else { "FAILED" },
                            result.error_count,
                            result.warning_count
                        ),
                        Ok(None) => println!("Footprint check skipped: built-in footprint"),
                        Err(e) => eprintln!("Footprint check failed: {}", e),
                    }
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        match install_batch(args.ids.as_slice(), &config).await {
            Ok(summary) => {
                println!(
                    "{} installed, {} failed, {} skipped",
                    summary.success, summary.failed, summary.skipped
                );
                for failure in &summary.failures {
                    println!("  {}: {}", failure.lcsc_id, failure.error);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }
    println!("Done in {:?}", start_time.elapsed());
}
