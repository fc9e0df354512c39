//! CLI binary for docai-submit.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `DocAiConfig` and prints results.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use docai_submit::chat::{is_quit, DEFAULT_CHAT_MODEL, DEFAULT_CHAT_PROVIDER, INITIAL_PROMPT};
use docai_submit::{
    inspect, ChatSession, ChunkProgressCallback, DocAiConfig, FileSink, OcrOptions, OutputSink, PremiumFeatures,
    ProcessorService, ProgressCallback, SourceDocument, SubmissionReport, Submitter, WriterSink, DEFAULT_CHUNK_SIZE,
    OCR_PROCESSOR,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Progress bar over chunks, with one log line per finished chunk.
struct CliProgressCallback {
    bar: ProgressBar,
    chunk_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            chunk_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total_chunks: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} chunks  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_chunks as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Submitting");
    }

    fn elapsed_secs(&self) -> f64 {
        self.chunk_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn abandon(&self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

impl ChunkProgressCallback for CliProgressCallback {
    fn on_submission_start(&self, total_pages: usize, total_chunks: usize) {
        self.activate_bar(total_chunks);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Submitting {total_pages} pages in {total_chunks} chunk(s)…"))
        ));
    }

    fn on_chunk_start(&self, chunk: usize, _total_chunks: usize, first_page: usize, last_page: usize) {
        if let Ok(mut started) = self.chunk_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("chunk {chunk} (pages {first_page}-{last_page})"));
    }

    fn on_chunk_complete(&self, chunk: usize, total_chunks: usize, text_len: usize) {
        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            chunk,
            total_chunks,
            dim(&format!("{text_len:>6} chars")),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, chunk: usize, total_chunks: usize, error: &str) {
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}  {}",
            red("✗"),
            chunk,
            total_chunks,
            red(&msg),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.abandon_with_message("stopped");
    }

    fn on_submission_complete(&self, total_chunks: usize, total_chars: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} chunk(s) extracted, {} chars",
            green("✔"),
            bold(&total_chunks.to_string()),
            total_chars
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract text of a long PDF into a file, 15 pages per request
  docai submit --processor projects/my-proj/locations/us/processors/abc123 report.pdf -o report.txt

  # Create a throwaway OCR processor for this run, delete it afterwards
  docai --project-id my-proj submit --create-processor report.pdf -o report.txt

  # Smaller chunks, text on stdout
  docai submit --chunk-size 5 report.pdf

  # Page count and chunk plan (no API calls)
  docai inspect report.pdf

  # Processor management
  docai --project-id my-proj processor create my_ocr_processor
  docai --project-id my-proj processor list
  docai processor delete projects/my-proj/locations/us/processors/abc123

  # Chat with Gemini
  docai chat

ENVIRONMENT VARIABLES:
  DOCAI_PROJECT_ID      Google Cloud project ID
  DOCAI_LOCATION        Processor location: us or eu (default us)
  DOCAI_ENDPOINT        API endpoint override
  DOCAI_ACCESS_TOKEN    OAuth 2.0 access token (falls back to GOOGLE_ACCESS_TOKEN)
  DOCAI_PROCESSOR       Full processor resource name
  DOCAI_CHUNK_SIZE      Pages per request (default 15)
  GEMINI_API_KEY        API key for `docai chat`

SETUP:
  1. Token:    export DOCAI_ACCESS_TOKEN=$(gcloud auth print-access-token)
  2. Submit:   docai submit --processor projects/.../processors/... file.pdf -o out.txt
"#;

/// Submit long PDFs to Google Document AI OCR, chunk by chunk.
#[derive(Parser, Debug)]
#[command(
    name = "docai",
    version,
    about = "Submit long PDFs to Google Document AI OCR, chunk by chunk",
    long_about = "Split PDF documents (local files or URLs) into page ranges no larger than the \
processor's limit, send each range to a Document AI OCR processor in order, and append the \
extracted text to a single output. Stops at the first failing chunk.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Google Cloud project ID.
    #[arg(long, global = true, env = "DOCAI_PROJECT_ID")]
    project_id: Option<String>,

    /// Processor location (us or eu).
    #[arg(long, global = true, env = "DOCAI_LOCATION", default_value = "us")]
    location: String,

    /// API endpoint override (default https://{location}-documentai.googleapis.com).
    #[arg(long, global = true, env = "DOCAI_ENDPOINT")]
    endpoint: Option<String>,

    /// OAuth 2.0 access token.
    #[arg(long, global = true, env = "DOCAI_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Per-request HTTP timeout in seconds (default: none).
    #[arg(long, global = true, env = "DOCAI_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCAI_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCAI_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the text of a PDF, chunk by chunk.
    Submit(SubmitArgs),
    /// Print page count and chunk plan. No API calls.
    Inspect {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,
        /// Maximum pages per chunk.
        #[arg(long, env = "DOCAI_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },
    /// Create, look up, list or delete processors.
    #[command(subcommand)]
    Processor(ProcessorCommand),
    /// Interactive chat with a generative model ('q' to quit).
    Chat {
        #[arg(long, default_value = DEFAULT_CHAT_PROVIDER)]
        provider: String,
        #[arg(long, default_value = DEFAULT_CHAT_MODEL)]
        model: String,
        /// First message sent to the model.
        #[arg(long, default_value = INITIAL_PROMPT)]
        prompt: String,
    },
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Append text to this file instead of writing to stdout.
    #[arg(short, long, env = "DOCAI_OUTPUT")]
    output: Option<PathBuf>,

    /// Full processor resource name (projects/{p}/locations/{l}/processors/{id}).
    #[arg(long, env = "DOCAI_PROCESSOR", required_unless_present = "create_processor")]
    processor: Option<String>,

    /// Create a temporary OCR processor for this run and delete it afterwards.
    #[arg(long, conflicts_with = "processor")]
    create_processor: bool,

    /// Display name of the temporary processor.
    #[arg(long, default_value = "my_ocr_processor")]
    display_name: String,

    /// Maximum pages per chunk.
    #[arg(long, env = "DOCAI_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Disable native PDF text parsing.
    #[arg(long)]
    no_native_pdf_parsing: bool,

    /// Return symbol-level OCR results.
    #[arg(long)]
    enable_symbol: bool,

    /// Disable math OCR.
    #[arg(long)]
    no_math_ocr: bool,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "DOCAI_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the submission report as JSON (with the text when writing to stdout).
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOCAI_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum ProcessorCommand {
    /// Create a processor.
    Create {
        display_name: String,
        #[arg(long = "type", default_value = OCR_PROCESSOR)]
        processor_type: String,
    },
    /// Show one processor.
    Get { name: String },
    /// List processors of the project and location.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Delete a processor and wait for the deletion to finish.
    Delete { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs during a submission.
    let shows_progress = matches!(&cli.command, Command::Submit(a) if !a.no_progress && !a.json);
    let filter = if cli.global.verbose {
        "debug"
    } else if cli.global.quiet || shows_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Submit(ref args) => run_submit(&cli.global, args).await,
        Command::Inspect {
            ref input,
            chunk_size,
            json,
        } => run_inspect(input, chunk_size, json).await,
        Command::Processor(ref cmd) => run_processor(&cli.global, cmd).await,
        Command::Chat {
            ref provider,
            ref model,
            ref prompt,
        } => run_chat(provider, model, prompt).await,
    }
}

/// Map global flags to a config builder.
fn base_config(global: &GlobalArgs) -> docai_submit::DocAiConfigBuilder {
    let mut builder = DocAiConfig::builder().location(&global.location);
    if let Some(ref p) = global.project_id {
        builder = builder.project_id(p);
    }
    if let Some(ref e) = global.endpoint {
        builder = builder.endpoint(e);
    }
    if let Some(ref t) = global.access_token {
        builder = builder.access_token(t);
    }
    if let Some(secs) = global.request_timeout {
        builder = builder.request_timeout_secs(secs);
    }
    builder
}

async fn run_submit(global: &GlobalArgs, args: &SubmitArgs) -> Result<()> {
    let quiet = global.quiet;
    let progress = (!quiet && !args.no_progress && !args.json).then(CliProgressCallback::new);

    let ocr = OcrOptions {
        enable_native_pdf_parsing: !args.no_native_pdf_parsing,
        enable_symbol: args.enable_symbol,
        premium_features: PremiumFeatures {
            enable_math_ocr: !args.no_math_ocr,
        },
    };

    let temporary = if args.create_processor {
        let config = base_config(global).build().context("Invalid configuration")?;
        let service = ProcessorService::from_config(&config).context("Cannot manage processors")?;
        let tmp = service
            .create_temporary(&args.display_name, OCR_PROCESSOR)
            .await
            .context("Failed to create processor")?;
        if !quiet {
            eprintln!(
                "{} Created processor {} ({})",
                cyan("◆"),
                bold(tmp.name()),
                tmp.processor().display_name
            );
        }
        Some(tmp)
    } else {
        None
    };

    let processor_name = match (&temporary, &args.processor) {
        (Some(tmp), _) => tmp.name().to_string(),
        (None, Some(name)) => name.clone(),
        (None, None) => bail!("--processor or --create-processor is required"),
    };

    let mut builder = base_config(global)
        .processor_name(processor_name)
        .chunk_size(args.chunk_size)
        .ocr(ocr)
        .download_timeout_secs(args.download_timeout);
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }

    let outcome = match builder.build().context("Invalid configuration") {
        Ok(config) => submit_with(&config, args).await,
        Err(e) => Err(e),
    };

    if let Some(ref cb) = progress {
        cb.abandon();
    }

    // The temporary processor goes away whatever the outcome.
    if let Some(tmp) = temporary {
        match tmp.delete().await {
            Ok(deleted) if !quiet => eprintln!("{} {}", cyan("◆"), deleted.message()),
            Ok(_) => {}
            Err(e) => eprintln!("{} Failed to delete temporary processor: {e}", red("✗")),
        }
    }

    let (report, text) = outcome?;

    if args.json {
        let value = match text {
            Some(text) => serde_json::json!({ "report": report, "text": text }),
            None => serde_json::to_value(&report).context("Failed to serialise report")?,
        };
        println!("{}", serde_json::to_string_pretty(&value).context("Failed to serialise report")?);
    } else if !quiet {
        let target = args
            .output
            .as_ref()
            .map(|p| bold(&p.display().to_string()))
            .unwrap_or_else(|| "stdout".to_string());
        eprintln!(
            "{}  {} pages  {} chunk(s)  {}ms  →  {}",
            green("✔"),
            report.total_pages,
            report.chunks.len(),
            report.total_duration_ms,
            target
        );
    }
    Ok(())
}

/// Run one submission; returns the text only when it was buffered for JSON output.
async fn submit_with(config: &DocAiConfig, args: &SubmitArgs) -> Result<(SubmissionReport, Option<String>)> {
    let submitter = Submitter::from_config(config).context("Invalid configuration")?;
    let document = Arc::new(
        SourceDocument::open(&args.input, config.download_timeout_secs)
            .await
            .with_context(|| format!("Failed to load '{}'", args.input))?,
    );

    let mut buffer = String::new();
    let mut file_sink;
    let mut stdout_sink;
    let sink: &mut dyn OutputSink = match (&args.output, args.json) {
        (Some(path), _) => {
            file_sink = FileSink::open(path).await?;
            &mut file_sink
        }
        (None, true) => &mut buffer,
        (None, false) => {
            stdout_sink = WriterSink::new(tokio::io::stdout(), "stdout");
            &mut stdout_sink
        }
    };

    let report = submitter
        .submit(document, config.chunk_size, sink)
        .await
        .context("Submission failed")?;

    let text = (args.output.is_none() && args.json).then_some(buffer);
    Ok((report, text))
}

async fn run_inspect(input: &str, chunk_size: usize, json: bool) -> Result<()> {
    let info = inspect(input, chunk_size).await.context("Failed to inspect PDF")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("Failed to serialise document info")?
        );
        return Ok(());
    }

    println!("File:         {}", info.source);
    println!("PDF Version:  {}", info.pdf_version);
    println!("Pages:        {}", info.page_count);
    println!("Chunk size:   {}", info.chunk_size);
    println!("Chunks:       {}", info.chunks.len());
    for chunk in &info.chunks {
        println!("  {:>3}  pages {}", chunk.number(), chunk);
    }
    Ok(())
}

async fn run_processor(global: &GlobalArgs, cmd: &ProcessorCommand) -> Result<()> {
    let config = base_config(global).build().context("Invalid configuration")?;
    let service = ProcessorService::from_config(&config).context("Cannot manage processors")?;

    match cmd {
        ProcessorCommand::Create {
            display_name,
            processor_type,
        } => {
            let processor = service
                .create_processor(display_name, processor_type)
                .await
                .context("Failed to create processor")?;
            println!("{}", processor.name);
        }
        ProcessorCommand::Get { name } => {
            let processor = service.get_processor(name).await.context("Failed to get processor")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&processor).context("Failed to serialise processor")?
            );
        }
        ProcessorCommand::List { json } => {
            let processors = service.list_processors().await.context("Failed to list processors")?;
            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&processors).context("Failed to serialise processors")?
                );
            } else {
                for p in &processors {
                    println!(
                        "{}  {}  {}  {}",
                        p.name,
                        p.display_name,
                        p.processor_type,
                        dim(p.state.as_deref().unwrap_or("-"))
                    );
                }
            }
        }
        ProcessorCommand::Delete { name } => {
            let outcome = service
                .delete_processor(name)
                .await
                .context("Failed to delete processor")?;
            println!("{}", outcome.message());
        }
    }
    Ok(())
}

async fn run_chat(provider: &str, model: &str, prompt: &str) -> Result<()> {
    let mut session = ChatSession::from_provider_name(provider, model).context("Failed to start chat")?;
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let reply = session.send(prompt).await.context("Chat request failed")?;
    stdout.write_all(format!("{reply}\n").as_bytes()).await?;

    loop {
        stdout.write_all(b"Ask your question (or 'q' to quit): ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        if is_quit(&line) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        match session.send(line.trim()).await {
            Ok(reply) => stdout.write_all(format!("{reply}\n").as_bytes()).await?,
            Err(e) => eprintln!("{} {e}", red("✗")),
        }
    }
    Ok(())
}
