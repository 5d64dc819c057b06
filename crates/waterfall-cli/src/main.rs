//! waterfall CLI - Waterfall Gantt charts from task CSV files

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use waterfall_cli::{serve, ServiceConfig};
use waterfall_core::{ColorTheme, NormalizedTaskSet, Renderer};
use waterfall_parser::load_tasks;
use waterfall_render::{
    plot_gantt_with, save_png, ColorAllocator, PngRenderer, SvgRenderer, TextRenderer,
};

#[derive(Parser)]
#[command(name = "waterfall")]
#[command(author, version, about = "Waterfall Gantt charts from task CSV files", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "WATERFALL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a task CSV file to a chart
    Render {
        /// Input CSV (task,assignee,start,due,end)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (PNG defaults to the configured output path, other formats to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Chart title (defaults to the file stem)
        #[arg(short, long)]
        title: Option<String>,

        /// Color theme file (TOML)
        #[arg(long, value_name = "FILE")]
        theme: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Png)]
        format: Format,

        /// PNG resolution
        #[arg(long)]
        dpi: Option<f32>,

        /// Seed for assignee colors, for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the HTTP service
    Serve {
        /// Listen address
        #[arg(long, env = "WATERFALL_BIND")]
        bind: Option<String>,

        /// Directory for uploaded files
        #[arg(long, env = "WATERFALL_STORAGE_DIR", value_name = "DIR")]
        storage_dir: Option<PathBuf>,
    },

    /// Print a color theme as TOML
    Theme {
        /// Light theme instead of the dark default
        #[arg(long)]
        light: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Png,
    Svg,
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let mut config = ServiceConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Render {
            file,
            output,
            title,
            theme,
            format,
            dpi,
            seed,
        }) => {
            if let Some(path) = theme {
                config.theme = load_theme(&path)?;
            }
            if let Some(dpi) = dpi {
                config.dpi = dpi;
                config.validate()?;
            }
            let title = title.unwrap_or_else(|| file_stem(&file));
            cmd_render(&config, &file, output.as_deref(), &title, format, seed)?;
        }
        Some(Commands::Serve { bind, storage_dir }) => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(dir) = storage_dir {
                config.storage_dir = dir;
            }
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(serve(config))?;
        }
        Some(Commands::Theme { light }) => {
            let theme = if light { ColorTheme::light() } else { ColorTheme::dark() };
            print!("{}", theme.to_toml_string()?);
        }
        None => {
            println!("waterfall - Gantt charts from task CSV files");
            println!("Run with --help for usage information");
        }
    }

    Ok(())
}

fn load_theme(path: &Path) -> Result<ColorTheme> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read theme {}", path.display()))?;
    ColorTheme::from_toml_str(&text).with_context(|| format!("in theme {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Gantt chart".to_string())
}

fn cmd_render(
    config: &ServiceConfig,
    file: &Path,
    output: Option<&Path>,
    title: &str,
    format: Format,
    seed: Option<u64>,
) -> Result<()> {
    let tasks = load_tasks(file).with_context(|| format!("failed to load {}", file.display()))?;
    tracing::debug!(tasks = tasks.len(), file = %file.display(), "loaded tasks");

    let mut colors = seed.map_or_else(ColorAllocator::new, ColorAllocator::seeded);

    match format {
        Format::Png => {
            let renderer = PngRenderer::new().dpi(config.dpi);
            let Some(png) = render(title, &tasks, config, &mut colors, &renderer)? else {
                return Ok(());
            };
            let path = output.unwrap_or(config.output_path.as_path());
            save_png(&png, path)?;
            println!("Wrote {}", path.display());
        }
        Format::Svg => {
            let Some(svg) = render(title, &tasks, config, &mut colors, &SvgRenderer::new())? else {
                return Ok(());
            };
            write_text(output, &svg)?;
        }
        Format::Text => {
            let Some(table) = render(title, &tasks, config, &mut colors, &TextRenderer)? else {
                return Ok(());
            };
            write_text(output, &table)?;
        }
    }
    Ok(())
}

fn render<R: Renderer>(
    title: &str,
    tasks: &NormalizedTaskSet,
    config: &ServiceConfig,
    colors: &mut ColorAllocator,
    renderer: &R,
) -> Result<Option<R::Output>> {
    let out = plot_gantt_with(title, tasks, &config.theme, colors, renderer)?;
    if out.is_none() {
        tracing::warn!("No tasks to render");
    }
    Ok(out)
}

fn write_text(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
