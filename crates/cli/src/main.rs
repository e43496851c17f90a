use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use pollwatch_core::anomaly::domain::anomaly_detector::AnomalyDetector;
use pollwatch_core::anomaly::domain::class_labels::ClassLabels;
use pollwatch_core::anomaly::infrastructure::label_file;
use pollwatch_core::anomaly::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use pollwatch_core::imaging::domain::frame_reader::FrameReader;
use pollwatch_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use pollwatch_core::pipeline::screen_image_use_case::ScreenImageUseCase;
use pollwatch_core::pipeline::verify_voter_use_case::VerifyVoterUseCase;
use pollwatch_core::recognition::domain::face_matcher::FaceMatcher;
use pollwatch_core::recognition::infrastructure::embedding_store;
use pollwatch_core::recognition::infrastructure::onnx_face_encoder::OnnxFaceEncoder;
use pollwatch_core::recognition::infrastructure::onnx_face_locator::OnnxFaceLocator;
use pollwatch_core::shared::constants::{
    DEFAULT_ANOMALY_MODEL_FILE, EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, FACE_MODEL_NAME,
    FACE_MODEL_URL, IMAGE_EXTENSIONS,
};
use pollwatch_core::shared::model_resolver::{self, ModelSource};
use pollwatch_core::shared::settings::Settings;

/// Voter face matching and booth anomaly detection on still images.
#[derive(Parser)]
#[command(name = "pollwatch")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file (defaults to the per-user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file of known voter embeddings.
    #[arg(long, global = true)]
    embeddings: Option<PathBuf>,

    /// ONNX object-detection model for anomaly detection.
    #[arg(long, global = true)]
    anomaly_model: Option<PathBuf>,

    /// Class names for the anomaly model (JSON array or one per line).
    #[arg(long, global = true)]
    labels: Option<PathBuf>,

    /// Directory searched for face models before downloading.
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Maximum embedding distance accepted as a match.
    #[arg(long, global = true)]
    match_threshold: Option<f64>,

    /// Anomaly detection confidence threshold (0.0-1.0).
    #[arg(long, global = true)]
    confidence: Option<f64>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the voter id of the first matching face, or "no match".
    Match { image: PathBuf },
    /// Print the label of every detected object, one per line.
    Anomalies { image: PathBuf },
    /// Run both and print a JSON report.
    Screen { image: PathBuf },
    /// Check the image against one enrolled voter and print a JSON result.
    Verify {
        image: PathBuf,
        /// Voter id the person claims.
        #[arg(long)]
        voter: String,
    },
}

impl Command {
    fn image(&self) -> &Path {
        match self {
            Command::Match { image }
            | Command::Anomalies { image }
            | Command::Screen { image }
            | Command::Verify { image, .. } => image,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let input = cli.command.image();
    validate_input(input)?;

    match &cli.command {
        Command::Verify { voter, .. } => run_verify(&settings, input, voter),
        command => run_screen(&settings, command, input),
    }
}

fn run_verify(settings: &Settings, input: &Path, voter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let reader: Box<dyn FrameReader> = Box::new(ImageFileReader::new());
    let mut use_case = VerifyVoterUseCase::new(reader, build_matcher(settings)?);
    let verification = use_case
        .execute(input, voter)?
        .ok_or_else(|| format!("Voter {voter} is not enrolled"))?;
    println!("{}", serde_json::to_string_pretty(&verification)?);
    Ok(())
}

fn run_screen(
    settings: &Settings,
    command: &Command,
    input: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let wants_match = matches!(command, Command::Match { .. } | Command::Screen { .. });
    let wants_anomalies = matches!(command, Command::Anomalies { .. } | Command::Screen { .. });

    // Both components load their models here, before any image is read.
    let matcher = if wants_match {
        Some(build_matcher(settings)?)
    } else {
        None
    };
    let detector = if wants_anomalies {
        Some(build_anomaly_detector(settings)?)
    } else {
        None
    };

    let reader: Box<dyn FrameReader> = Box::new(ImageFileReader::new());
    let mut use_case = ScreenImageUseCase::new(reader, matcher, detector);
    let report = use_case.execute(input)?;

    match command {
        Command::Match { .. } => match report.voter_id {
            Some(id) => println!("{id}"),
            None => println!("no match"),
        },
        Command::Anomalies { .. } => {
            for label in &report.anomalies {
                println!("{label}");
            }
        }
        _ => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    apply_overrides(cli, &mut settings);
    settings.validate()?;
    Ok(settings)
}

fn apply_overrides(cli: &Cli, settings: &mut Settings) {
    if let Some(path) = &cli.embeddings {
        settings.embeddings_path = path.clone();
    }
    if let Some(path) = &cli.anomaly_model {
        settings.anomaly_model_path = path.clone();
    }
    if let Some(path) = &cli.labels {
        settings.anomaly_labels_path = Some(path.clone());
    }
    if let Some(dir) = &cli.models_dir {
        settings.models_dir = Some(dir.clone());
    }
    if let Some(threshold) = cli.match_threshold {
        settings.match_threshold = threshold;
    }
    if let Some(confidence) = cli.confidence {
        settings.anomaly_confidence = confidence;
    }
}

fn build_matcher(settings: &Settings) -> Result<FaceMatcher, Box<dyn std::error::Error>> {
    let known = embedding_store::load(&settings.embeddings_path)?;

    log::info!("Resolving model: {FACE_MODEL_NAME}");
    let face_model = model_resolver::resolve(
        &ModelSource {
            name: FACE_MODEL_NAME,
            url: Some(FACE_MODEL_URL),
        },
        settings.face_model_path.as_deref(),
        settings.models_dir.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    log::info!("Resolving model: {EMBEDDING_MODEL_NAME}");
    let embedding_model = model_resolver::resolve(
        &ModelSource {
            name: EMBEDDING_MODEL_NAME,
            url: Some(EMBEDDING_MODEL_URL),
        },
        settings.embedding_model_path.as_deref(),
        settings.models_dir.as_deref(),
        Some(Box::new(download_progress)),
    )?;

    let locator = OnnxFaceLocator::new(&face_model, settings.face_confidence)?;
    let encoder = OnnxFaceEncoder::new(&embedding_model)?;
    let matcher = FaceMatcher::new(
        Arc::new(known),
        Box::new(locator),
        Box::new(encoder),
        settings.match_threshold,
    );
    if matcher.known_faces().is_empty() {
        log::warn!("No voters enrolled; every face will report no match");
    }
    Ok(matcher)
}

fn build_anomaly_detector(settings: &Settings) -> Result<AnomalyDetector, Box<dyn std::error::Error>> {
    let model_path = model_resolver::resolve(
        &ModelSource {
            name: DEFAULT_ANOMALY_MODEL_FILE,
            url: None,
        },
        Some(&settings.anomaly_model_path),
        None,
        None,
    )?;
    log::info!("Loading anomaly model {}", model_path.display());
    let detector = OnnxYoloDetector::new(&model_path, settings.anomaly_confidence)?;

    let labels = match &settings.anomaly_labels_path {
        Some(path) => label_file::load(path)?,
        None => ClassLabels::coco(),
    };
    Ok(AnomalyDetector::new(
        Box::new(detector),
        labels,
        settings.anomaly_confidence,
    ))
}

fn validate_input(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    if !is_image(input) {
        return Err(format!(
            "Unsupported input {}; expected one of: {}",
            input.display(),
            IMAGE_EXTENSIONS.join(", ")
        )
        .into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}
