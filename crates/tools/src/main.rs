use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use runtime::{load_dataset, ComparisonController, Input, UiSink, ViewerConfig};
use tools::{SourceTransport, render_split, write_png};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SOURCE: &str = "data/precipitation.csv";

#[derive(Parser, Debug)]
#[command(author, version, about = "Side-by-side climate scenario precipitation maps")]
struct Args {
    /// CSV location: an http(s) URL or a local path (default: $CLIMATE_DATA_URL)
    #[arg(long)]
    source: Option<String>,

    /// Viewer config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail on the first malformed row
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the year axis, scenarios and row counts as JSON
    Summary,

    /// Render a comparison frame to PNG
    Render {
        /// Year to show (default: first year in the data)
        #[arg(long)]
        year: Option<i32>,

        /// Left scenario (default from config)
        #[arg(long)]
        left: Option<String>,

        /// Right scenario (default from config)
        #[arg(long)]
        right: Option<String>,

        #[arg(long, default_value_t = 720)]
        width: u32,

        #[arg(long, default_value_t = 360)]
        height: u32,

        /// Divider position in percent of the width
        #[arg(long, default_value_t = 50.0)]
        divider: f64,

        #[arg(long, default_value = "comparison.png")]
        out: PathBuf,
    },
}

/// Logs load progress at ten-percent steps.
#[derive(Default)]
struct LogSink {
    last_decile: Option<u8>,
}

impl UiSink for LogSink {
    fn on_load_progress(&mut self, percent: u8) {
        let decile = percent / 10;
        if self.last_decile != Some(decile) {
            self.last_decile = Some(decile);
            info!(percent, "loading");
        }
    }

    fn on_load_error(&mut self, message: &str) {
        error!(reason = message, "load failed");
    }

    fn on_load_complete(&mut self, summary: &catalog::DatasetSummary) {
        info!(
            records = summary.record_count,
            skipped = summary.skipped_rows,
            "load complete"
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let source = args.source.unwrap_or_else(|| {
        env::var("CLIMATE_DATA_URL").unwrap_or_else(|_| DEFAULT_SOURCE.to_string())
    });

    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_json_str(&tokio::fs::read_to_string(path).await?)?,
        None => ViewerConfig::default(),
    };
    config.strict_rows |= args.strict;
    let strict = config.strict_rows;

    let mut controller = ComparisonController::new(config);
    let mut sink = LogSink::default();
    let token = controller.begin_load();
    let transport = SourceTransport::for_location(&source);

    let loaded = load_dataset(&transport, &source, strict, |pct| {
        controller.on_load_progress(token, pct, &mut sink);
    })
    .await;
    let dataset = match loaded {
        Ok(dataset) => dataset,
        Err(err) => {
            controller.on_load_error(token, &err.to_string(), &mut sink);
            return Err(err.into());
        }
    };
    let summary = controller
        .on_load_complete(token, dataset, &mut sink)
        .ok_or("load was superseded")?;

    match args.command {
        Command::Summary => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Render {
            year,
            left,
            right,
            width,
            height,
            divider,
            out,
        } => {
            if let Some(year) = year {
                let position = summary
                    .years
                    .iter()
                    .position(|y| *y == year)
                    .ok_or_else(|| format!("year {year} not in dataset ({:?})", summary.years))?;
                controller.on_input(Input::SetYearIndex(position));
            }
            if left.is_some() || right.is_some() {
                let current = controller.selection().cloned().ok_or("no selection")?;
                let left = left.unwrap_or(current.left);
                let right = right.unwrap_or(current.right);
                for name in [&left, &right] {
                    if !summary.scenarios.contains(name) {
                        warn!(scenario = %name, "scenario not in dataset; side will show no data");
                    }
                }
                controller.on_input(Input::SetScenarios { left, right });
            }
            controller.on_input(Input::SetDivider(divider));
            controller.on_resize(f64::from(width), f64::from(height));

            let frame = render_split(&controller, width, height).ok_or("nothing to render")?;
            write_png(&frame, &out)?;
            info!(path = %out.display(), year = ?controller.current_year(), "wrote frame");
        }
    }

    Ok(())
}
