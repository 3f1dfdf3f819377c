use poselens::api::{ApiClient, FileTokenStore, HttpAnalysisApi, MemoryTokenStore, TokenStore};
use poselens::error::AppError;
use poselens::pose::{PoseDetector, ReplayEngine};
use poselens::session::{SessionController, SessionPhase};
use poselens::{Configuration, SkeletonRenderer};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, Level};

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

struct Args {
    image: String,
    landmarks: String,
    output: String,
    config: Option<String>,
    analyze: bool,
}

fn parse_args() -> Option<Args> {
    let mut positional = Vec::new();
    let mut output = "overlay.png".to_string();
    let mut config = None;
    let mut analyze = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => output = args.next()?,
            "-c" | "--config" => config = Some(args.next()?),
            "--analyze" => analyze = true,
            _ => positional.push(arg),
        }
    }
    if positional.len() != 2 {
        return None;
    }
    let landmarks = positional.pop()?;
    let image = positional.pop()?;
    Some(Args {
        image,
        landmarks,
        output,
        config,
        analyze,
    })
}

fn mime_for_path(path: &str) -> &'static str {
    match Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();

    let Some(args) = parse_args() else {
        eprintln!(
            "usage: poselens <image> <landmarks.json> [-o overlay.png] [-c config] [--analyze]"
        );
        std::process::exit(2);
    };

    let configuration = Configuration::load(args.config.as_deref())?;

    let store: Arc<dyn TokenStore> = match &configuration.api.token_path {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => Arc::new(MemoryTokenStore::new()),
    };
    let api = ApiClient::new(configuration.api.base_url.clone(), store);

    let engine = ReplayEngine::from_recording(&args.landmarks)?;
    let detector = PoseDetector::new(Box::new(engine), configuration.detector.clone())?;
    let renderer = SkeletonRenderer::new(
        configuration.display.max_width,
        configuration.display.max_height,
    );
    let mut session =
        SessionController::new(detector, Arc::new(HttpAnalysisApi::new(api)), renderer);

    let bytes = std::fs::read(&args.image)?;
    session.select_and_detect(bytes, mime_for_path(&args.image)).await;

    match session.phase() {
        SessionPhase::Ready => {
            info!(
                "pose detected: {} landmarks, {} confidently visible",
                session.landmarks().len(),
                session.visible_points()
            );
        }
        phase => {
            info!("no skeleton to draw ({phase:?})");
            if let Some(error) = session.current_error() {
                eprintln!("{error}");
            }
        }
    }

    if session.media().is_some() {
        let overlay = session.render_overlay()?;
        overlay.save(&args.output)?;
        info!("overlay written to {}", args.output);
    }

    if args.analyze {
        session.analyze().await;
        if let Some(result) = session.result() {
            println!(
                "{}: score {:.1} (confidence {:.2}, level {:?})",
                result.pose_name, result.score, result.confidence, result.level
            );
            for line in &result.priority_feedback {
                println!("  ! {line}");
            }
            for (metric, value) in &result.quality_metrics {
                println!("  {metric}: {value:.0}/100");
            }
        } else if let Some(error) = session.current_error() {
            eprintln!("analysis failed: {error}");
        }
    }

    Ok(())
}
