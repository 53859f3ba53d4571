//! pagemark CLI - Markdown reconstruction from PDF extraction bundles

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagemark::{
    Conversion, ConvertOptions, ImageOptions, JsonFormat, PageSelection, RenderOptions,
    SanitizeOptions, Severity, SourceDocument,
};

/// Image links in extract.md point at the images/ directory beside it.
const OUTPUT_LINK_PREFIX: &str = "images/";

#[derive(Parser)]
#[command(name = "pagemark")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rebuild structured Markdown from extracted PDF text and images", long_about = None)]
struct Cli {
    /// Input extraction bundle (JSON)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    text: TextArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every converting subcommand.
#[derive(Args, Clone, Default)]
struct TextArgs {
    /// Hosts whose links are kept (comma separated, replaces the defaults)
    #[arg(long, env = "PAGEMARK_ALLOWED_HOSTS", value_delimiter = ',')]
    allow_host: Vec<String>,

    /// Normalize Unicode and ligatures before redaction
    #[arg(long)]
    normalize: bool,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Omit the provenance comment
    #[arg(long)]
    no_provenance: bool,

    /// Stamp the provenance comment with the conversion time
    #[arg(long)]
    timestamp: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a bundle to Markdown, images and a report
    Convert {
        /// Input extraction bundle (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Prefix for image links
        #[arg(long, default_value = OUTPUT_LINK_PREFIX)]
        link_prefix: String,

        /// Skip image recovery
        #[arg(long)]
        no_images: bool,

        /// Also write report.json with all diagnostics
        #[arg(long)]
        report: bool,

        #[command(flatten)]
        text: TextArgs,
    },

    /// Convert a bundle to Markdown only
    #[command(alias = "md")]
    Markdown {
        /// Input extraction bundle (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Directory for recovered images (images are skipped if not specified)
        #[arg(long, value_name = "DIR")]
        images_dir: Option<PathBuf>,

        /// Prefix for image links
        #[arg(long, env = "PAGEMARK_LINK_PREFIX")]
        link_prefix: Option<String>,

        #[command(flatten)]
        text: TextArgs,
    },

    /// Print the diagnostics of a conversion
    Report {
        /// Input extraction bundle (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Only show warnings
        #[arg(short, long)]
        quiet: bool,

        #[command(flatten)]
        text: TextArgs,
    },

    /// Convert a bundle to the JSON document model
    Json {
        /// Input extraction bundle (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        text: TextArgs,
    },

    /// Show version information
    Version,
}

impl TextArgs {
    fn options(&self) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
        let mut sanitize = SanitizeOptions::new();
        if !self.allow_host.is_empty() {
            sanitize = sanitize.with_allowed_hosts(self.allow_host.iter().cloned());
        }
        if self.normalize {
            sanitize = sanitize.normalized();
        }

        let page_selection = match &self.pages {
            Some(p) => PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?,
            None => PageSelection::All,
        };
        let render = RenderOptions::new()
            .with_provenance(!self.no_provenance)
            .with_pages(page_selection);

        Ok(ConvertOptions::new()
            .with_sanitize_options(sanitize)
            .with_render_options(render)
            .with_timestamp(self.timestamp))
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            link_prefix,
            no_images,
            report,
            text,
        }) => cmd_convert(&input, output.as_deref(), &link_prefix, no_images, report, &text),
        Some(Commands::Markdown {
            input,
            output,
            images_dir,
            link_prefix,
            text,
        }) => cmd_markdown(
            &input,
            output.as_deref(),
            images_dir,
            link_prefix,
            &text,
        ),
        Some(Commands::Report {
            input,
            json,
            quiet,
            text,
        }) => cmd_report(&input, json, quiet, &text),
        Some(Commands::Json {
            input,
            output,
            compact,
            text,
        }) => cmd_json(&input, output.as_deref(), compact, &text),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(
                    &input,
                    cli.output.as_deref(),
                    OUTPUT_LINK_PREFIX,
                    false,
                    false,
                    &cli.text,
                )
            } else {
                println!("{}", "Usage: pagemark <FILE> [OUTPUT]".yellow());
                println!("       pagemark --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_output", stem))
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    link_prefix: &str,
    no_images: bool,
    write_report: bool,
    text: &TextArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_output_dir(input));
    fs::create_dir_all(&output_dir)?;
    log::debug!("writing output to {}", output_dir.display());

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading bundle...");
    let source = SourceDocument::from_file(input)?;
    pb.inc(1);

    pb.set_message("Reconstructing pages...");
    let mut images = ImageOptions::new().with_link_prefix(link_prefix);
    if no_images {
        images = images.skip_images();
    } else {
        images = images.with_images_dir(output_dir.join("images"));
    }
    let options = text.options()?.with_image_options(images);
    let conversion = pagemark::convert(&source, &options);
    pb.inc(1);

    pb.set_message("Writing output...");
    conversion.save_markdown(output_dir.join("extract.md"))?;
    if write_report {
        fs::write(
            output_dir.join("report.json"),
            conversion.report_json(JsonFormat::Pretty)?,
        )?;
    }
    pb.inc(1);

    pb.finish_with_message("Done!");

    let image_count = conversion.document.all_assets().count();
    println!("\n{}", "Output files:".green().bold());
    println!("  {} extract.md", "├─".dimmed());
    if write_report {
        println!("  {} report.json", "├─".dimmed());
    }
    println!("  {} images/ ({} files)", "└─".dimmed(), image_count);

    print_summary(&conversion);
    Ok(())
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    images_dir: Option<PathBuf>,
    link_prefix: Option<String>,
    text: &TextArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut images = match images_dir {
        Some(dir) => ImageOptions::new().with_images_dir(dir),
        None => ImageOptions::new().skip_images(),
    };
    if let Some(prefix) = link_prefix {
        images = images.with_link_prefix(prefix);
    }

    let options = text.options()?.with_image_options(images);
    let conversion = pagemark::convert_file(input, &options)?;

    if let Some(path) = output {
        conversion.save_markdown(path)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", conversion.markdown);
    }

    Ok(())
}

/// Convert without writing images, for commands that only inspect the result.
fn inspect(input: &Path, text: &TextArgs) -> Result<Conversion, Box<dyn std::error::Error>> {
    let options = text.options()?.with_image_options(ImageOptions::new());
    Ok(pagemark::convert_file(input, &options)?)
}

fn cmd_report(
    input: &Path,
    json: bool,
    quiet: bool,
    text: &TextArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let conversion = inspect(input, text)?;

    if json {
        println!("{}", conversion.report_json(JsonFormat::Pretty)?);
        return Ok(());
    }

    println!("{}", "Conversion Report".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let stats = &conversion.report.stats;
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Headings".bold(), stats.heading_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "List items".bold(), stats.list_item_count);
    println!("{}: {}", "Images".bold(), stats.image_count);
    println!("{}: {}", "Words".bold(), stats.word_count);

    println!();
    println!("{}", "Diagnostics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let min = if quiet { Severity::Warning } else { Severity::Info };
    for event in conversion.report.diagnostics.at_least(min) {
        let label = match event.severity {
            Severity::Debug => "debug".dimmed(),
            Severity::Info => "info".normal(),
            Severity::Warning => "warn".yellow(),
        };
        println!("[{}] {}", label, event.message());
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    text: &TextArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let conversion = inspect(input, text)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = conversion.to_json(format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn print_summary(conversion: &Conversion) {
    let report = &conversion.report;
    if report.is_clean() {
        println!("\n{}", "No warnings".green());
        return;
    }

    println!();
    let warnings = report.warnings().count();
    println!("{} {}", warnings.to_string().yellow().bold(), "warnings".yellow());
    if report.dropped_table_rows() > 0 {
        println!("  {} table rows dropped", report.dropped_table_rows());
    }
    if !report.image_failures.is_empty() {
        println!("  {} images skipped", report.image_failures.len());
    }
    println!("  run {} for details", "pagemark report <FILE>".bold());
}

fn cmd_version() {
    println!("{} {}", "pagemark".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Markdown reconstruction from PDF extraction bundles");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pagemark".dimmed());
    println!("License: MIT");
}
