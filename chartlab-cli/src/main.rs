//! ChartLab CLI: offline inspection of indicator layers.
//!
//! Commands:
//! - `frame`: run one frame of every configured layer over a plot and print a JSON report
//! - `lod`: fold a series' candles into pixel-column OHLC buckets and report them
//! - `indicators`: list supported indicators with their default parameters

mod layers;
mod load;
mod report;

use anyhow::{bail, Context, Result};
use chartlab_core::domain::{SourceSeries, VecSeries};
use chartlab_core::indicators::Indicator;
use chartlab_core::layer::{decimate_ohlc, IndicatorLayer};
use chartlab_core::lod::{LodDecimator, LodPolicy};
use chartlab_core::synth::{random_walk_series, WalkSpec};
use chartlab_core::viewport::{
    resolve_window, LinearViewport, PixelRect, Spacing, Viewport, XLayout,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use layers::Overrides;
use report::{FrameReport, LodReport, SourceReport};

#[derive(Parser)]
#[command(
    name = "chartlab",
    about = "ChartLab CLI: offline indicator layer inspection"
)]
struct Cli {
    /// Log cache recomputations and buffer growth to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one frame of each layer and print a JSON report.
    Frame {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        plot: PlotArgs,

        /// TOML chart file with [[layer]] entries.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Single indicator by name (replaces the chart file's layers).
        #[arg(long)]
        indicator: Option<String>,

        /// Period for --indicator (k period for stochastic).
        #[arg(long)]
        period: Option<usize>,

        /// Extra indices kept on each side of the visible window.
        #[arg(long)]
        overscan: Option<usize>,

        /// How the window resolver treats x spacing.
        #[arg(long, value_enum)]
        spacing: Option<SpacingArg>,

        /// Disable LOD decimation for every layer.
        #[arg(long, default_value_t = false)]
        no_lod: bool,
    },
    /// Fold the visible candles into pixel-column OHLC buckets.
    Lod {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        plot: PlotArgs,

        /// Include every bucket in the report, not just the counts.
        #[arg(long, default_value_t = false)]
        buckets: bool,
    },
    /// List supported indicators with default parameters.
    Indicators,
}

#[derive(Args)]
struct SourceArgs {
    /// OHLCV CSV file.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Generate a synthetic random walk with this many samples.
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed label for --synthetic.
    #[arg(long, default_value = "chartlab")]
    label: String,
}

#[derive(Args)]
struct PlotArgs {
    /// Plot width in pixels.
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// Plot height in pixels.
    #[arg(long, default_value_t = 400.0)]
    height: f64,

    /// Left edge of the clip rectangle, in plot pixels.
    #[arg(long, requires = "clip_right")]
    clip_left: Option<f64>,

    /// Right edge of the clip rectangle, in plot pixels.
    #[arg(long, requires = "clip_left")]
    clip_right: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SpacingArg {
    Uniform,
    Irregular,
    Auto,
}

impl From<SpacingArg> for Spacing {
    fn from(arg: SpacingArg) -> Self {
        match arg {
            SpacingArg::Uniform => Spacing::Uniform,
            SpacingArg::Irregular => Spacing::Irregular,
            SpacingArg::Auto => Spacing::Auto,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Frame {
            source,
            plot,
            config,
            indicator,
            period,
            overscan,
            spacing,
            no_lod,
        } => {
            let overrides = Overrides {
                overscan,
                spacing: spacing.map(Spacing::from),
                lod: no_lod.then_some(false),
            };
            run_frame(&source, &plot, config, indicator, period, overrides)
        }
        Commands::Lod {
            source,
            plot,
            buckets,
        } => run_lod(&source, &plot, buckets),
        Commands::Indicators => run_indicators(),
    }
}

/// Logs go to stderr so stdout stays valid JSON. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_source(args: &SourceArgs) -> Result<VecSeries> {
    let series = match (&args.csv, args.synthetic) {
        (Some(path), _) => load::load_csv(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        (None, Some(n)) => {
            if n == 0 {
                bail!("--synthetic needs at least one sample");
            }
            random_walk_series(&args.label, n, &WalkSpec::default())
        }
        (None, None) => bail!("one of --csv or --synthetic is required"),
    };
    info!(points = series.len(), "source ready");
    Ok(series)
}

/// Plot rectangle at the origin spanning the whole series, plus the optional clip.
fn build_viewport(source: &VecSeries, args: &PlotArgs) -> Result<LinearViewport> {
    let plot = PixelRect::new(0.0, 0.0, args.width, args.height);
    if !plot.is_drawable() {
        bail!("plot must have positive, finite width and height");
    }

    let n = source.len();
    let (first, last) = (source.x(0), source.x(n - 1));
    let domain = if first < last {
        (first, last)
    } else {
        (first - 0.5, first + 0.5)
    };
    let mut viewport = LinearViewport::new(plot, domain, (0.0, 1.0));

    if let (Some(left), Some(right)) = (args.clip_left, args.clip_right) {
        if !(left.is_finite() && right.is_finite() && left < right) {
            bail!("--clip-left must be finite and less than --clip-right");
        }
        viewport = viewport.with_clip(PixelRect::new(left, 0.0, right - left, args.height));
    }
    Ok(viewport)
}

fn run_frame(
    source_args: &SourceArgs,
    plot_args: &PlotArgs,
    config: Option<PathBuf>,
    indicator: Option<String>,
    period: Option<usize>,
    overrides: Overrides,
) -> Result<()> {
    let specs = layers::resolve(config.as_deref(), indicator.as_deref(), period, overrides)?;
    let source = load_source(source_args)?;
    let viewport = build_viewport(&source, plot_args)?;

    let mut reports = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut layer = IndicatorLayer::new(spec.indicator, spec.render)?;
        reports.push(report::layer_report(&mut layer, &source, &viewport));
    }

    let out = FrameReport {
        source: SourceReport::of(&source),
        plot: viewport.plot_bounds(),
        clip: viewport.clip_bounds(),
        layers: reports,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_lod(source_args: &SourceArgs, plot_args: &PlotArgs, include_buckets: bool) -> Result<()> {
    let source = load_source(source_args)?;
    let viewport = build_viewport(&source, plot_args)?;

    let xs: Vec<f64> = (0..source.len()).map(|i| source.x(i)).collect();
    let range = resolve_window(&viewport, &xs, XLayout::of(&xs), 2);
    let decimated = LodPolicy::default().should_decimate(range.len(), plot_args.width);

    // Sparse windows are still bucketed so the report shows per-column occupancy.
    let mut lod = LodDecimator::new();
    decimate_ohlc(&source, range, &viewport, &mut lod);

    let out = LodReport::new(
        &source,
        viewport.plot_bounds(),
        &lod,
        decimated,
        include_buckets,
    );
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_indicators() -> Result<()> {
    println!(
        "{:<12} {:<18} {:<26} {:>10}  {}",
        "Name", "Family", "Lines", "Min points", "Defaults"
    );
    println!("{}", "-".repeat(96));
    for ind in Indicator::all_defaults() {
        let params = serde_json::to_string(&ind)?;
        println!(
            "{:<12} {:<18} {:<26} {:>10}  {}",
            ind.name(),
            format!("{:?}", ind.family()),
            ind.line_names().join(", "),
            ind.min_points(),
            params
        );
    }
    Ok(())
}
