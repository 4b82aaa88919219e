//! plotpick CLI — batch calibration of digitized plot points.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use plotpick::{
    AxisScaling, CalibrationConfig, DisplayMapping, HypothesisFit, Point, PointTransformer,
    ReferenceCalibrator, ReferencePair,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

const SESSION_SCHEMA_V1: &str = "plotpick.session.v1";

#[derive(Parser)]
#[command(name = "plotpick")]
#[command(about = "Calibrate picked plot-image pixels against axis references")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the calibration and write calibrated curves (JSON).
    Calibrate(CalibrateArgs),

    /// Map a single raw pixel to plot coordinates.
    Scale(ScaleArgs),
}

#[derive(Debug, Clone, Args)]
struct SessionArgs {
    /// Path to the session file (references + curves, JSON).
    #[arg(long)]
    session: PathBuf,

    /// Optional calibration config (JSON). Missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the linear-vs-log error ratio.
    #[arg(long)]
    lin_log_error_ratio: Option<f64>,

    /// Fit lin-lin only.
    #[arg(long)]
    linear_only: bool,
}

#[derive(Debug, Clone, Args)]
struct CalibrateArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Path to write the calibration result (JSON).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct ScaleArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Raw x coordinate as reported by the display widget.
    #[arg(long, allow_hyphen_values = true)]
    x: f64,

    /// Raw y coordinate as reported by the display widget.
    #[arg(long, allow_hyphen_values = true)]
    y: f64,

    #[arg(long, default_value = "1.0")]
    scale_x: f64,

    #[arg(long, default_value = "1.0")]
    scale_y: f64,

    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    offset_x: f64,

    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    offset_y: f64,
}

/// On-disk session: reference pairs plus raw curve pixels.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionFile {
    schema: String,
    references: Vec<ReferencePair>,
    #[serde(default)]
    curves: Vec<Vec<Point>>,
}

impl SessionFile {
    fn from_json_file(path: &Path) -> CliResult<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| -> CliError { format!("failed to read {}: {}", path.display(), e).into() })?;
        Self::from_json_str(&data).map_err(Into::into)
    }

    fn from_json_str(data: &str) -> Result<Self, String> {
        let session: Self = serde_json::from_str(data).map_err(|e| e.to_string())?;
        if session.schema != SESSION_SCHEMA_V1 {
            return Err(format!(
                "unsupported session schema '{}' (expected '{}')",
                session.schema, SESSION_SCHEMA_V1
            ));
        }
        Ok(session)
    }
}

#[derive(Debug, serde::Serialize)]
struct TransformOut {
    matrix: [[f64; 3]; 3],
    scaling: AxisScaling,
    x_is_logarithmic: bool,
    y_is_logarithmic: bool,
}

#[derive(Debug, serde::Serialize)]
struct CalibrationOut {
    n_references: usize,
    transform: Option<TransformOut>,
    error: Option<String>,
    hypotheses: Vec<HypothesisFit>,
    curves: Vec<Vec<Point>>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calibrate(args) => run_calibrate(&args),
        Commands::Scale(args) => run_scale(&args),
    }
}

fn build_config(args: &SessionArgs) -> CliResult<CalibrationConfig> {
    let mut config = match &args.config {
        Some(path) => CalibrationConfig::from_json_file(path)?,
        None => CalibrationConfig::default(),
    };
    if let Some(ratio) = args.lin_log_error_ratio {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(format!("--lin-log-error-ratio must be > 0, got {}", ratio).into());
        }
        config.lin_log_error_ratio = ratio;
    }
    if args.linear_only {
        config.detect_log_axes = false;
    }
    Ok(config)
}

fn load_calibrator(args: &SessionArgs) -> CliResult<(ReferenceCalibrator, SessionFile)> {
    tracing::info!("Loading session: {}", args.session.display());
    let session = SessionFile::from_json_file(&args.session)?;
    let config = build_config(args)?;

    let mut calibrator = ReferenceCalibrator::new(config);
    for r in &session.references {
        calibrator.add_reference(r.image, r.value);
    }
    Ok((calibrator, session))
}

// ── calibrate ──────────────────────────────────────────────────────────

fn run_calibrate(args: &CalibrateArgs) -> CliResult<()> {
    let (calibrator, session) = load_calibrator(&args.session)?;

    for h in calibrator.hypotheses() {
        tracing::info!("  {:<8} squared error {:.6e}", h.scaling, h.error);
    }

    let (transform, curves) = match calibrator.transform() {
        Ok(t) => {
            let mut store = plotpick::CurveStore::new();
            for (i, curve) in session.curves.iter().enumerate() {
                for &p in curve {
                    store.append_point(i, p);
                }
            }
            let curves = store.calibrated_curves(&calibrator)?;
            tracing::info!(
                "Calibrated {} curves ({} points) as {}",
                curves.len(),
                store.point_count(),
                t.scaling()
            );
            let out = TransformOut {
                matrix: t.matrix_rows(),
                scaling: t.scaling(),
                x_is_logarithmic: t.x_is_logarithmic(),
                y_is_logarithmic: t.y_is_logarithmic(),
            };
            (Some(out), curves)
        }
        Err(_) => {
            tracing::warn!(
                "No valid calibration: {}",
                calibrator.error_message().unwrap_or_default()
            );
            (None, Vec::new())
        }
    };

    let result = CalibrationOut {
        n_references: calibrator.references().len(),
        transform,
        error: calibrator.error_message(),
        hypotheses: calibrator.hypotheses().to_vec(),
        curves,
    };

    let json = serde_json::to_string_pretty(&result)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Results written to {}", args.out.display());

    match calibrator.error() {
        Some(e) => Err(e.clone().into()),
        None => Ok(()),
    }
}

// ── scale ──────────────────────────────────────────────────────────────

fn run_scale(args: &ScaleArgs) -> CliResult<()> {
    let (calibrator, _) = load_calibrator(&args.session)?;
    let display = DisplayMapping::new(
        [args.scale_x, args.scale_y],
        [args.offset_x, args.offset_y],
    );

    let pixel = display.to_image(Point::new(args.x, args.y));
    let value = calibrator.scale_point(pixel)?;

    println!("{}", scale_report(pixel, value));
    Ok(())
}

/// Pixel rounded to the nearest integer, value to six decimals.
fn scale_report(pixel: Point, value: Point) -> String {
    format!(
        "Px:  ({}, {})\nVal: ({:.6}, {:.6})",
        pixel.x.round() as i64,
        pixel.y.round() as i64,
        value.x,
        value.y
    )
}
