use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;

use graph2svg::{ColorMode, RenderConfig};

#[derive(Parser, Debug)]
#[command(
    name = "graph2svg",
    version,
    about = "Render a positioned node/relationship graph as SVG"
)]
struct Cli {
    /// Graph document (JSON with `nodes` and `relationships`)
    #[arg(value_name = "INPUT_JSON")]
    input: PathBuf,

    /// Where to write the SVG
    #[arg(value_name = "OUTPUT_SVG")]
    output: PathBuf,

    /// Fill label boxes with one palette color per distinct set of labels
    #[arg(long, short = 'c')]
    color_by_labels: bool,

    /// TOML file overriding the default style
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli) {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::load(path).context("failed to load style config")?,
        None => RenderConfig::default(),
    };
    if cli.color_by_labels {
        config.color_mode = ColorMode::ByLabels;
    }

    graph2svg::render_file(&cli.input, &cli.output, &config)
        .with_context(|| format!("failed to render {}", cli.input.display()))?;
    println!("Graph saved as {}", cli.output.display());
    Ok(())
}
