use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sentiview::config::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use sentiview::dispatch::ImageOutcome;
use sentiview::staging::is_image_mime;
use sentiview::{
    report, AnalysisResult, Config, Dispatcher, DropZone, HttpTransport, StagedImage, SubmitError,
};
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sentiview")]
#[command(author, version, about = "Analyze the sentiment of text or images and render the result")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the analysis backend
    #[arg(long, global = true, env = "SENTIVIEW_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Output report file (.html, .json, .txt)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long, global = true, default_value = "sentiview-reports")]
    report_dir: PathBuf,

    /// Don't auto-generate an HTML report
    #[arg(long, global = true)]
    no_report: bool,

    /// Don't prompt to open report
    #[arg(long, global = true)]
    no_open: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a piece of text
    Text {
        /// Text to analyze
        text: Option<String>,

        /// Read the text from stdin
        #[arg(long, conflicts_with = "text")]
        stdin: bool,
    },

    /// Analyze the text in an image
    Image {
        /// Image file to upload
        path: Option<PathBuf>,

        /// Choose the image with a file dialog
        #[arg(long, conflicts_with = "path")]
        pick: bool,
    },

    /// Render a saved backend response without contacting the backend
    Render {
        /// JSON response body
        response: PathBuf,

        /// Image the response was produced from, shown above the result
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

/// What a subcommand produced: a result to render, or a message already
/// suitable for the user.
enum Outcome {
    Rendered {
        result: AnalysisResult,
        preview: Option<String>,
    },
    Rejected(String),
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "sentiview=debug" } else { "sentiview=warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // stdout carries the rendered result, so logs go to stderr
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let code = match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

fn run(args: &Args) -> anyhow::Result<i32> {
    let config = Config::new(args.endpoint.clone()).with_timeout(Duration::from_secs(args.timeout));
    debug!(?config, "resolved configuration");

    let outcome = match &args.command {
        Command::Text { text, stdin } => {
            let mut input = match (text, *stdin) {
                (Some(t), _) => t.clone(),
                (None, true) => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
                    buf
                }
                (None, false) => String::new(),
            };
            run_text(args, config, &mut input)?
        }
        Command::Image { path, pick } => {
            let path = match (path, *pick) {
                (Some(p), _) => Some(p.clone()),
                (None, true) => pick_image_gui(),
                (None, false) => None,
            };
            run_image(args, config, path.as_deref())?
        }
        Command::Render { response, image } => run_render(response, image.as_deref())?,
    };

    let (result, preview) = match outcome {
        Outcome::Rendered { result, preview } => (result, preview),
        Outcome::Rejected(message) => {
            eprintln!("\x1b[31m{}\x1b[0m", message);
            return Ok(1);
        }
    };

    if !args.quiet {
        print!("{}", report::text::render(&result));
        io::stdout().flush().ok();
    }

    write_report(args, &result, preview.as_deref())?;

    // Exit with appropriate code
    Ok(if result.is_error() { 2 } else { 0 })
}

fn run_text(args: &Args, config: Config, input: &mut String) -> anyhow::Result<Outcome> {
    let mut dispatcher = Dispatcher::new(HttpTransport::new(config)?);

    let spinner = spinner(args, "テキストを分析中...");
    let submitted = dispatcher.submit_text(input);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    Ok(match submitted {
        Ok(result) => Outcome::Rendered { result, preview: None },
        Err(e) => rejected(e),
    })
}

fn run_image(args: &Args, config: Config, path: Option<&Path>) -> anyhow::Result<Outcome> {
    let mut zone = DropZone::new();

    if let Some(path) = path {
        let image = StagedImage::from_path(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let preview = image.data_url();
        match zone.stage(image) {
            Ok(ticket) => {
                zone.set_preview(ticket, preview);
            }
            Err(e) => {
                debug!(error = %e, "image rejected");
                return Ok(Outcome::Rejected(e.user_message().to_string()));
            }
        }
    }

    let mut dispatcher = Dispatcher::new(HttpTransport::new(config)?);

    let spinner = spinner(args, "画像を分析中...");
    let submitted = dispatcher.submit_image(&mut zone);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    Ok(match submitted {
        Ok(ImageOutcome { result, preview }) => Outcome::Rendered { result, preview },
        Err(e) => rejected(e),
    })
}

fn run_render(response: &Path, image: Option<&Path>) -> anyhow::Result<Outcome> {
    let body = std::fs::read_to_string(response)
        .with_context(|| format!("failed to read {}", response.display()))?;
    let result = AnalysisResult::from_json(&body)
        .with_context(|| format!("{} is not an analysis response", response.display()))?;

    let preview = match image {
        Some(path) => {
            let image = StagedImage::from_path(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            if !is_image_mime(&image.mime) {
                bail!("{} is not an image", path.display());
            }
            Some(image.data_url())
        }
        None => None,
    };

    Ok(Outcome::Rendered { result, preview })
}

fn rejected(e: SubmitError) -> Outcome {
    debug!(error = %e, "submission failed");
    Outcome::Rejected(e.user_message().to_string())
}

fn spinner(args: &Args, message: &'static str) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

fn write_report(args: &Args, result: &AnalysisResult, preview: Option<&str>) -> anyhow::Result<()> {
    // Determine report path
    let report_path = if let Some(ref output) = args.output {
        output.clone()
    } else if !args.no_report {
        std::fs::create_dir_all(&args.report_dir).with_context(|| {
            format!("failed to create {}", args.report_dir.display())
        })?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        args.report_dir.join(format!("sentiview_report_{}.html", timestamp))
    } else {
        return Ok(());
    };

    report::generate(&report_path, result, preview)
        .with_context(|| format!("failed to write report {}", report_path.display()))?;
    if !args.quiet {
        eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", report_path.display());
    }

    // Piped input (`text --stdin`) leaves nobody to answer the prompt
    if args.no_open || args.quiet || !io::stdin().is_terminal() {
        return Ok(());
    }

    eprint!("\nOpen report in browser? [Y/n] ");
    io::stderr().flush().ok();

    let mut input = String::new();
    let read = io::stdin().read_line(&mut input);
    if wants_open(read, &input) {
        if let Err(e) = open::that(&report_path) {
            eprintln!("Failed to open report: {}", e);
        }
    }

    Ok(())
}

/// Answer to the open prompt. Enter means yes; EOF or a read error means no.
fn wants_open(read: io::Result<usize>, answer: &str) -> bool {
    match read {
        Ok(0) | Err(_) => false,
        Ok(_) => {
            let answer = answer.trim().to_lowercase();
            answer.is_empty() || answer == "y" || answer == "yes"
        }
    }
}

#[cfg(feature = "gui")]
fn pick_image_gui() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("分析する画像を選択")
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"])
        .pick_file()
}

#[cfg(not(feature = "gui"))]
fn pick_image_gui() -> Option<PathBuf> {
    eprintln!("Note: GUI mode not available in this build.");
    None
}
