// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lumina — photo enhancer
//
// Entry point. Initialises logging, loads settings, and dispatches the
// `enhance`, `edit`, `health` and `config` commands.

mod services;
mod state;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use lumina_core::error::Result;
use lumina_core::human_errors::humanize_error;
use lumina_core::{
    AdjustmentState, AppConfig, AspectRatio, DeviceClass, DeviceProfile, DeviceSignals,
    EncodedImage, EnhancementStyle, ImageMime, Slider,
};
use lumina_imaging::{LivePreview, SourceFile, export_filename, intake};
use lumina_remote::EnhanceClient;

use services::session::EnhanceSession;
use services::settings::Settings;
use state::SessionPhase;

#[derive(Parser)]
#[command(name = "lumina")]
#[command(about = "Enhance photos with a remote AI service and fine-tune them locally")]
#[command(version)]
struct Cli {
    /// Enhancement service base URL (overrides settings and LUMINA_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a photo to the enhancement service and save the result
    Enhance {
        /// Photo to enhance (JPEG, PNG or WEBP within the configured size limit)
        file: PathBuf,

        /// balanced, creative or restoration
        #[arg(short, long)]
        style: Option<EnhancementStyle>,

        /// Force the device class instead of detecting it
        #[arg(short, long)]
        device: Option<DeviceClass>,

        /// Output file (defaults to a generated name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply local transforms and adjustments, then export a lossless PNG
    Edit(EditArgs),
    /// Check whether the enhancement service is ready
    Health,
    /// Show or reset saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings as JSON
    Show,
    /// Restore default settings
    Reset,
    /// Print the settings file location
    Path,
}

#[derive(Args)]
struct EditArgs {
    /// Image to edit
    file: PathBuf,

    /// Clockwise rotation in degrees (snapped to 90)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    rotate: i32,

    /// Mirror the source horizontally before it is rotated
    #[arg(long)]
    flip: bool,

    /// original, 1:1, 16:9, 4:3 or 3:2
    #[arg(long, default_value = "original")]
    aspect: AspectRatio,

    /// 50-150
    #[arg(long)]
    brightness: Option<f32>,
    /// 50-150
    #[arg(long)]
    contrast: Option<f32>,
    /// 0-200
    #[arg(long)]
    saturation: Option<f32>,
    /// 50-150
    #[arg(long)]
    exposure: Option<f32>,
    /// 0-100
    #[arg(long)]
    warmth: Option<f32>,
    /// 0-100
    #[arg(long)]
    sharpness: Option<f32>,
    /// 0-100
    #[arg(long)]
    clarity: Option<f32>,
    /// -100-100
    #[arg(long, allow_hyphen_values = true)]
    highlights: Option<f32>,

    /// Style tag used in the generated file name
    #[arg(long, default_value = "balanced")]
    style: EnhancementStyle,

    /// Output file (defaults to a generated name in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl EditArgs {
    fn adjustment_state(&self) -> AdjustmentState {
        let sliders = [
            (Slider::Brightness, self.brightness),
            (Slider::Contrast, self.contrast),
            (Slider::Saturation, self.saturation),
            (Slider::Exposure, self.exposure),
            (Slider::Warmth, self.warmth),
            (Slider::Sharpness, self.sharpness),
            (Slider::Clarity, self.clarity),
            (Slider::Highlights, self.highlights),
        ];
        sliders.into_iter().fold(
            AdjustmentState::default()
                .with_rotation(self.rotate)
                .with_flip(self.flip)
                .with_aspect_ratio(self.aspect),
            |state, (slider, value)| match value {
                Some(value) => state.with(slider, value),
                None => state,
            },
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::default_location();
    let mut config = settings.load_effective();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    tracing::info!(endpoint = %config.endpoint, "Lumina starting");

    let outcome = match cli.command {
        Commands::Enhance {
            file,
            style,
            device,
            output,
        } => {
            let style = style.unwrap_or(config.default_style);
            run_enhance(&config, &file, style, device, output).await
        }
        Commands::Edit(args) => run_edit(&config, &args),
        Commands::Health => run_health(&config).await,
        Commands::Config { action } => run_config(&settings, &config, action),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            let human = humanize_error(&err);
            tracing::debug!(error = %err, "command failed");
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

// -- Commands -----------------------------------------------------------------

async fn run_enhance(
    config: &AppConfig,
    file: &Path,
    style: EnhancementStyle,
    device: Option<DeviceClass>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let profile = resolve_profile(config, device);
    tracing::info!(device = %profile.class, %style, "enhancing");

    let source = SourceFile::open(file, config.max_file_bytes)?;
    let session = EnhanceSession::new(config, profile)?;

    let mut rx = session.subscribe();
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snap = rx.borrow_and_update().clone();
            if snap.phase == SessionPhase::Working {
                eprintln!("{:>3.0}%  {}", snap.progress.percent, snap.status_line());
            }
        }
    });

    let result = session.enhance(source, style).await;
    drop(session);
    printer.await.ok();

    let result = result?;
    let path = output.unwrap_or_else(|| default_output(style, &result));
    std::fs::write(&path, &result.bytes)?;
    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn run_edit(config: &AppConfig, args: &EditArgs) -> Result<ExitCode> {
    let source = SourceFile::open(&args.file, config.max_file_bytes)?;
    let image = intake::load(&source, config.max_file_bytes)?;

    let mut preview = LivePreview::new(image, config.slow_pass_settle());
    preview.apply(args.adjustment_state());
    let exported = preview.export()?;

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(args.style, &exported));
    std::fs::write(&path, &exported.bytes)?;
    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}

async fn run_health(config: &AppConfig) -> Result<ExitCode> {
    let client = EnhanceClient::new(config, resolve_profile(config, None))?;
    let health = client.health().await;
    println!("{}: {}", client.base_url(), health.summary());
    Ok(if health.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_config(settings: &Settings, config: &AppConfig, action: ConfigAction) -> Result<ExitCode> {
    match action {
        ConfigAction::Show => println!("{}", serde_json::to_string_pretty(config)?),
        ConfigAction::Reset => {
            settings.reset()?;
            println!("settings reset: {}", settings.path().display());
        }
        ConfigAction::Path => println!("{}", settings.path().display()),
    }
    Ok(ExitCode::SUCCESS)
}

// -- Helpers ------------------------------------------------------------------

/// Forced class from the command line, then from settings, then detection
/// from `LUMINA_USER_AGENT` / `LUMINA_VIEWPORT_WIDTH`.
fn resolve_profile(config: &AppConfig, forced: Option<DeviceClass>) -> DeviceProfile {
    if let Some(class) = forced.or(config.device) {
        return DeviceProfile::for_class(class);
    }
    let signals = DeviceSignals {
        user_agent: std::env::var("LUMINA_USER_AGENT").ok(),
        viewport_width: std::env::var("LUMINA_VIEWPORT_WIDTH")
            .ok()
            .and_then(|w| w.parse().ok()),
    };
    DeviceProfile::detect(&signals)
}

fn default_output(style: EnhancementStyle, image: &EncodedImage) -> PathBuf {
    let extension = ImageMime::from_mime_type(&image.mime_type)
        .map(|mime| mime.extension())
        .unwrap_or("img");
    PathBuf::from(export_filename(style, chrono::Utc::now(), extension))
}

