use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use digit_recognizer::config::Config;
use digit_recognizer::{DigitRecognizer, PredictionResult, RecognizerError};

/// Exit status when the recognizer cannot be set up (missing or bad descriptor).
const SETUP_FAILURE_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "digit-recognizer")]
#[command(about = "Recognize handwritten digits through a TensorFlow Serving endpoint")]
struct Args {
    /// Model version to load (overrides MODEL_VERSION)
    #[arg(long, global = true)]
    model_version: Option<String>,

    /// Serving base URL (overrides SERVING_BASE_URL)
    #[arg(long, global = true)]
    serving_url: Option<String>,

    /// Directory holding v<version>.json descriptors (overrides MODEL_CONFIG_DIR)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the digit in an image file
    Predict {
        image: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(version) = &self.model_version {
            config.model.version = version.clone();
        }
        if let Some(url) = &self.serving_url {
            config.serving.base_url = url.clone();
        }
        if let Some(dir) = &self.config_dir {
            config.model.config_dir = dir.clone();
        }
    }
}

/// `LOG_FORMAT=json` switches stderr logs to one JSON object per line.
fn json_logs(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

fn setup_exit_code(err: &RecognizerError) -> Option<u8> {
    err.is_setup_error().then_some(SETUP_FAILURE_EXIT)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let json = json_logs(std::env::var("LOG_FORMAT").ok().as_deref());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "digit_recognizer=info".into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let mut config = Config::from_env();
    args.apply_overrides(&mut config);

    tracing::info!(
        "Loading model configuration v{} from {}...",
        config.model.version,
        config.model.config_dir.display()
    );
    let recognizer = match DigitRecognizer::from_config(&config) {
        Ok(recognizer) => recognizer,
        Err(e) => match setup_exit_code(&e) {
            Some(code) => {
                tracing::error!(error = %e, "Recognizer setup failed");
                eprintln!("Setup failed: {e}");
                return Ok(ExitCode::from(code));
            }
            None => return Err(e.into()),
        },
    };

    match args.command {
        Command::Predict { image, json } => {
            let result = recognizer.predict_digit(&image).await;

            if json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                match &result {
                    PredictionResult::Success { .. } => println!("Predicted {result}"),
                    PredictionResult::Failure { .. } => eprintln!("Prediction failed: {result}"),
                }
            }

            Ok(if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
