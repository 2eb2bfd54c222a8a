use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use scattergrid::config::Config;
use scattergrid::matrix::{
    DotSize, FACET_TYPE, PlotMethod, Rotation, ScatterplotMatrix, parse_columns_info,
};
use scattergrid::{BatchedImageLoader, DirectorySurface, HttpImageSource, ViewLifetime};
use tracing::{error, info};

/// Scatterplot matrix thumbnails for the numeric columns of a project
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the matrix layout and the thumbnail URL of every cell
    Plan(MatrixArgs),
    /// Download every thumbnail, a batch at a time
    Fetch {
        #[command(flatten)]
        matrix: MatrixArgs,
        /// Directory the thumbnails are written to
        #[arg(long = "out", value_name = "DIR")]
        out: Option<PathBuf>,
        /// Thumbnails requested at once
        #[arg(long = "batch-size")]
        batch_size: Option<usize>,
    },
    /// Print the scatterplot facet for one cell
    Facet {
        #[command(flatten)]
        matrix: MatrixArgs,
        #[arg(long = "cx")]
        cx: String,
        #[arg(long = "cy")]
        cy: String,
    },
}

#[derive(clap::Args, Debug)]
struct MatrixArgs {
    /// Column info JSON as returned by get-columns-info, or '-' for stdin
    #[arg(long = "columns", value_name = "PATH")]
    columns: PathBuf,
    #[arg(long = "project")]
    project: Option<String>,
    /// Column the matrix is opened for
    #[arg(long = "focus")]
    focus: Option<String>,
    #[arg(long = "server")]
    server: Option<String>,
    #[arg(long = "plot-method", value_enum)]
    plot_method: Option<PlotMethod>,
    #[arg(long = "rotation", value_enum)]
    rotation: Option<Rotation>,
    #[arg(long = "dot-size", value_enum)]
    dot_size: Option<DotSize>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let level = match args.logging {
        Some(LogLevel::Error) => Some(tracing::Level::ERROR),
        Some(LogLevel::Warn) => Some(tracing::Level::WARN),
        Some(LogLevel::Info) => Some(tracing::Level::INFO),
        Some(LogLevel::Debug) => Some(tracing::Level::DEBUG),
        Some(LogLevel::Trace) => Some(tracing::Level::TRACE),
        None => None,
    };
    let cwd = std::env::current_dir()?;
    scattergrid::logging::init_with(
        Some(cwd.join(scattergrid::logging::LOG_FILE.clone())),
        level,
    )?;

    let cfg = Config::from_path(args.config.as_ref())?;
    let res = match args.command {
        Command::Plan(matrix) => plan(&cfg, &matrix),
        Command::Fetch {
            matrix,
            out,
            batch_size,
        } => fetch(&cfg, &matrix, out, batch_size).await,
        Command::Facet { matrix, cx, cy } => facet(&cfg, &matrix, &cx, &cy),
    };
    if let Err(e) = &res {
        error!("Error: {e}");
    }
    res
}

fn build_matrix(cfg: &Config, args: &MatrixArgs) -> Result<ScatterplotMatrix> {
    let body = if args.columns.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.columns)?
    };
    let columns = parse_columns_info(&body)?;

    let project = args
        .project
        .clone()
        .or_else(|| cfg.project.clone())
        .ok_or_else(|| eyre!("No project given (use --project or set 'project' in the config)"))?;
    let mut context = cfg.plot_context(&project)?;
    if let Some(server) = &args.server {
        context.server = server.parse()?;
    }

    let mut settings = cfg.matrix_settings();
    if let Some(method) = args.plot_method {
        settings.plot_method = method;
    }
    if let Some(rotation) = args.rotation {
        settings.rotation = rotation;
    }
    if let Some(dot_size) = args.dot_size {
        settings.dot_size = dot_size;
    }

    Ok(ScatterplotMatrix::build(&columns, args.focus.as_deref(), settings, &context)?)
}

fn plan(cfg: &Config, args: &MatrixArgs) -> Result<()> {
    let matrix = build_matrix(cfg, args)?;
    println!("{}", matrix.header());
    for row in matrix.rows() {
        let marker = if row.current { "*" } else { " " };
        println!("{marker} {}", row.column);
        for cell in &row.cells {
            let marker = if cell.current { "*" } else { " " };
            println!("  {marker} {}\n      {}", cell.title(), cell.url);
        }
    }
    Ok(())
}

async fn fetch(
    cfg: &Config,
    args: &MatrixArgs,
    out: Option<PathBuf>,
    batch_size: Option<usize>,
) -> Result<()> {
    let matrix = build_matrix(cfg, args)?;
    let out = out.unwrap_or_else(|| cfg.output_dir.clone());
    let batch_size = batch_size.unwrap_or(cfg.batch_size);

    let lifetime = ViewLifetime::new();
    let view = lifetime.clone();
    let interrupt = tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if signal.is_ok() {
                    info!("interrupted, dismissing view");
                    view.dismiss();
                }
            }
            _ = view.dismissed() => {}
        }
    });

    let loader =
        BatchedImageLoader::new(HttpImageSource::new(cfg.fetch_timeout())?, batch_size)?;
    let mut surface = DirectorySurface::new(&out)?;
    let report = loader
        .run(matrix.descriptors(), lifetime.clone(), &mut surface)
        .await?;
    lifetime.dismiss();
    let _ = interrupt.await;

    println!(
        "{} of {} thumbnails loaded into {} ({} failed, {} skipped)",
        report.loaded,
        report.total,
        surface.dir().display(),
        report.failed,
        report.skipped()
    );
    Ok(())
}

fn facet(cfg: &Config, args: &MatrixArgs, cx: &str, cy: &str) -> Result<()> {
    let matrix = build_matrix(cfg, args)?;
    let cell = matrix
        .cell_at(cx, cy)
        .ok_or_else(|| eyre!("No scatterplot for '{cx}' (x) vs. '{cy}' (y)"))?;
    let facet = serde_json::json!({
        "type": FACET_TYPE,
        "options": matrix.facet_options(cell),
    });
    println!("{}", serde_json::to_string_pretty(&facet)?);
    Ok(())
}
