//! CLI binary for docpreview.
//!
//! A thin shim over the library crate: `serve` runs the HTTP service,
//! `render` previews one local file and writes the artifact to disk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docpreview::{OutputKind, PreviewRequest, Previewer, ServiceConfig};
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  Run the service on the default port:
    docpreview serve

  Bind all interfaces:
    docpreview serve --bind 0.0.0.0:8080

  A 200x100 centre-cropped thumbnail of a PDF:
    docpreview render report.pdf --width 200 --height 100

  Extract text instead:
    docpreview render report.pdf --extension text

ENVIRONMENT VARIABLES:
  DOCPREVIEW_PDFIUM_LIB       Path to libpdfium (otherwise the system library)
  DOCPREVIEW_WORKSPACE_ROOT   Parent directory for per-request workspaces
  DOCPREVIEW_JPEG_QUALITY     JPEG quality, 1-100
  RUST_LOG                    Overrides --verbose / --quiet
"#;

/// Render previews of documents and images.
#[derive(Parser, Debug)]
#[command(
    name = "docpreview",
    version,
    about = "Render JPEG, PDF, HTML and text previews of uploaded documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug-level logging.
    #[arg(short, long, global = true, env = "DOCPREVIEW_VERBOSE")]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, global = true, env = "DOCPREVIEW_QUIET", conflicts_with = "verbose")]
    quiet: bool,

    /// Log line format.
    #[arg(long, global = true, env = "DOCPREVIEW_LOG_FORMAT", value_enum, default_value = "compact")]
    log_format: LogFormat,

    /// Default preview width when the caller gives none.
    #[arg(long, global = true, env = "DOCPREVIEW_DEFAULT_WIDTH", default_value_t = 256)]
    default_width: u32,

    /// Default preview height when the caller gives none.
    #[arg(long, global = true, env = "DOCPREVIEW_DEFAULT_HEIGHT", default_value_t = 256)]
    default_height: u32,

    /// JPEG quality (1–100).
    #[arg(long, global = true, env = "DOCPREVIEW_JPEG_QUALITY", default_value_t = 85,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Largest edge the renderer is ever asked for.
    #[arg(long, global = true, env = "DOCPREVIEW_MAX_GENERATION_PX", default_value_t = 4096)]
    max_generation_px: u32,

    /// Largest accepted upload in bytes.
    #[arg(long, global = true, env = "DOCPREVIEW_MAX_UPLOAD_BYTES", default_value_t = 64 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Path to the pdfium shared library.
    #[arg(long, global = true, env = "DOCPREVIEW_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Parent directory for per-request workspaces.
    #[arg(long, global = true, env = "DOCPREVIEW_WORKSPACE_ROOT")]
    workspace_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "DOCPREVIEW_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
    },
    /// Preview a single local file.
    Render {
        /// File to preview.
        input: PathBuf,

        /// Requested width in pixels.
        #[arg(long)]
        width: Option<u32>,

        /// Requested height in pixels.
        #[arg(long)]
        height: Option<u32>,

        /// Keep the aspect ratio instead of cropping to the exact box.
        #[arg(long)]
        no_crop: bool,

        /// Output kind: jpeg, pdf, html, text.
        #[arg(short, long, default_value = "jpeg")]
        extension: String,

        /// Write the artifact here instead of the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogFormat {
    Compact,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    init_logging(filter, cli.log_format);

    let config = build_config(&cli)?;
    let previewer = Previewer::with_local_engine(config);

    match cli.command {
        Command::Serve { bind } => {
            let listener = TcpListener::bind(bind)
                .await
                .with_context(|| format!("Failed to bind {}", bind))?;
            docpreview::serve(listener, previewer)
                .await
                .context("Server error")?;
        }
        Command::Render {
            input,
            width,
            height,
            no_crop,
            extension,
            output,
        } => {
            let written = render(
                &previewer, &input, width, height, !no_crop, &extension, output,
            )
            .await?;
            if !cli.quiet {
                eprintln!("✔ {}", written.display());
            }
        }
    }

    Ok(())
}

fn init_logging(filter: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Map CLI args to `ServiceConfig`.
fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut builder = ServiceConfig::builder()
        .default_size(cli.default_width, cli.default_height)
        .jpeg_quality(cli.jpeg_quality)
        .max_generation_px(cli.max_generation_px)
        .max_upload_bytes(cli.max_upload_bytes);
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library(path);
    }
    if let Some(ref path) = cli.workspace_root {
        builder = builder.workspace_root(path);
    }
    builder.build().context("Invalid configuration")
}

async fn render(
    previewer: &Previewer,
    input: &Path,
    width: Option<u32>,
    height: Option<u32>,
    need_crop: bool,
    extension: &str,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let kind: OutputKind = extension.parse()?;
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {:?}", input))?;
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());

    let request = PreviewRequest::builder(filename, bytes)
        .width(width)
        .height(height)
        .need_crop(need_crop)
        .output(kind)
        .build()?;
    let preview = previewer.handle(request).await.context("Preview failed")?;

    let target = output.unwrap_or_else(|| PathBuf::from(&preview.file_name));
    tokio::fs::write(&target, &preview.bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", target))?;
    Ok(target)
}
