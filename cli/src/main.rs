//! pdfoutline CLI - PDF title and heading outline extraction

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::{BatchEvent, BatchOutcome, BatchReport, BatchRunner};
use pdfoutline::render::{to_json_value, write_json};
use pdfoutline::{
    document_info, Extractor, HeadingLevel, JsonFormat, OutlineConfig, PageSelection,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract the title and H1-H3 outline of PDF documents", long_about = None)]
struct Cli {
    /// Input PDF file or directory of PDFs
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (for a PDF) or directory (for a directory)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Heuristic configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE", env = "PDFOUTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of one PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Skip unreadable pages instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Extract outlines for every PDF in a directory
    Batch {
        /// Directory containing PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory for the JSON outlines
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,

        /// Process files one at a time
        #[arg(long)]
        sequential: bool,

        /// Skip unreadable pages instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Show document information and its font profile
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Dump merged text spans as JSON
    Spans {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            compact,
            pages,
            lenient,
        }) => cmd_extract(
            cli.config.as_deref(),
            &input,
            output.as_deref(),
            compact,
            pages.as_deref(),
            lenient,
        ),
        Some(Commands::Batch {
            input,
            output,
            sequential,
            lenient,
        }) => cmd_batch(cli.config.as_deref(), &input, &output, sequential, lenient),
        Some(Commands::Info { input }) => cmd_info(cli.config.as_deref(), &input),
        Some(Commands::Spans { input, pages }) => {
            cmd_spans(cli.config.as_deref(), &input, pages.as_deref())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match cli.input {
            Some(input) if input.is_dir() => {
                let output = cli.output.unwrap_or_else(|| default_batch_output(&input));
                cmd_batch(cli.config.as_deref(), &input, &output, false, false)
            }
            Some(input) => cmd_extract(
                cli.config.as_deref(),
                &input,
                cli.output.as_deref(),
                false,
                None,
                false,
            ),
            None => {
                println!("{}", "Usage: pdfoutline <INPUT> [OUTPUT]".yellow());
                println!("       pdfoutline --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// `<dir>_output` next to the input directory.
fn default_batch_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "pdfs".to_string());
    input.with_file_name(format!("{}_output", name))
}

fn build_extractor(
    config: Option<&Path>,
    pages: Option<&str>,
    lenient: bool,
) -> Result<Extractor, Box<dyn std::error::Error>> {
    let mut extractor = Extractor::new();
    if let Some(path) = config {
        extractor = extractor.with_config(OutlineConfig::from_json_file(path)?)?;
        log::info!("Loaded configuration from {}", path.display());
    }
    if let Some(p) = pages {
        extractor = extractor.with_pages(PageSelection::parse(p)?);
    }
    if lenient {
        extractor = extractor.lenient();
    }
    Ok(extractor)
}

fn cmd_extract(
    config: Option<&Path>,
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    pages: Option<&str>,
    lenient: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = build_extractor(config, pages, lenient)?;
    let outline = extractor.extract_file(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    if let Some(path) = output {
        write_json(&outline, format, fs::File::create(path)?)?;
        println!(
            "{} {} ({} headings)",
            "Saved to".green(),
            path.display(),
            outline.headings.len()
        );
    } else {
        write_json(&outline, format, std::io::stdout().lock())?;
    }

    Ok(())
}

fn cmd_batch(
    config: Option<&Path>,
    input: &Path,
    output: &Path,
    sequential: bool,
    lenient: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut extractor = build_extractor(config, None, lenient)?;
    if sequential {
        extractor = extractor.sequential();
    }

    let files = pdfoutline::batch::discover_pdfs(input)?;
    if files.is_empty() {
        println!("{} {}", "No PDF files found in".yellow(), input.display());
        return Ok(());
    }
    fs::create_dir_all(output)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let (sender, receiver) = crossbeam_channel::unbounded();
    let report: BatchReport = std::thread::scope(|scope| {
        let runner = BatchRunner::new(&extractor).with_events(sender);
        let worker = scope.spawn(move || runner.run_files(&files, output));

        for event in receiver {
            if let BatchEvent::Processed(outcome) = event {
                let name = outcome
                    .input()
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                if outcome.is_failure() {
                    pb.println(format!("{} {}", "✗".red().bold(), name));
                }
                pb.set_message(name);
                pb.inc(1);
            }
        }

        worker.join().expect("batch worker panicked")
    });
    pb.finish_and_clear();

    for outcome in &report.outcomes {
        match outcome {
            BatchOutcome::Written {
                input,
                output,
                headings,
                ..
            } => println!(
                "{} {} -> {} ({} headings)",
                "✓".green().bold(),
                input.file_name().unwrap_or_default().to_string_lossy(),
                output.display().to_string().dimmed(),
                headings
            ),
            BatchOutcome::Failed { input, error, .. } => eprintln!(
                "{} {}: {}",
                "✗".red().bold(),
                input.file_name().unwrap_or_default().to_string_lossy(),
                error
            ),
        }
    }

    println!(
        "\n{} {} succeeded, {} failed in {:.2?}",
        "Done!".green().bold(),
        report.succeeded(),
        report.failed(),
        report.elapsed
    );

    if report.has_failures() {
        return Err(format!("{} file(s) failed", report.failed()).into());
    }
    Ok(())
}

fn cmd_info(config: Option<&Path>, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let info = document_info(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), info.version);
    println!("{}: {}", "Pages".bold(), info.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if info.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = info.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = info.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = info.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = info.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = info.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = info.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    // Show the profile even if some pages are unreadable.
    let extractor = build_extractor(config, None, true)?;
    let analysis = extractor.analyze_file(input)?;
    let profile = &analysis.profile;

    println!();
    println!("{}", "Font Profile".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {:.1}pt", "Body".bold(), profile.body_threshold);
    for level in [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3] {
        println!(
            "{}: {:.1}pt ({:?})",
            level.as_str().bold(),
            profile.threshold(level),
            profile.source(level)
        );
    }
    println!("{}: {}", "Distinct sizes".bold(), profile.size_histogram.len());

    println!();
    println!("{}", "Outline".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let outline = &analysis.outline;
    println!(
        "{}: {}",
        "Title".bold(),
        outline.title.as_deref().unwrap_or("(none)")
    );
    for level in [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3] {
        println!("{}: {}", level.as_str().bold(), outline.count_level(level));
    }

    Ok(())
}

fn cmd_spans(
    config: Option<&Path>,
    input: &Path,
    pages: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = build_extractor(config, pages, true)?;
    let analysis = extractor.analyze_file(input)?;
    println!("{}", to_json_value(&analysis.spans, JsonFormat::Pretty)?);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF title and heading outline extraction tool");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/iyulab/pdfoutline".dimmed()
    );
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["pdfoutline", "extract", "a.pdf", "--compact", "-vv"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Some(Commands::Extract { compact: true, .. })
        ));

        let cli = Cli::try_parse_from(["pdfoutline", "batch", "in", "out", "--sequential"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Batch {
                sequential: true,
                ..
            })
        ));
    }

    #[test]
    fn test_default_batch_output() {
        assert_eq!(
            default_batch_output(Path::new("/data/input")),
            PathBuf::from("/data/input_output")
        );
    }

    #[test]
    fn test_build_extractor_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"max_caps_words": 2}"#).unwrap();

        let extractor = build_extractor(Some(&path), Some("1-3"), true).unwrap();
        assert_eq!(extractor.pipeline().config().max_caps_words, 2);
        assert_eq!(
            extractor.parse_options().pages,
            PageSelection::Range(1..=3)
        );
    }

    #[test]
    fn test_build_extractor_rejects_bad_pages() {
        assert!(build_extractor(None, Some("5-1"), false).is_err());
    }
}
