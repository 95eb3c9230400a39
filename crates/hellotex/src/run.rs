use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rasterizer::{load_font, rasterize_text, Bitmap, FontSource, TextStyle};
use renderer::export::{composite_centered, display_copy, encode_alpha, save_png, Presentation};
use renderer::{render, AlphaMode, BackendChoice, RenderedFrame};
use sceneconfig::{AlphaSetting, BackendSetting, SceneConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;

/// Files written by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutputs {
    pub backing: PathBuf,
    pub display: Option<PathBuf>,
}

/// Scene as it will be rendered, with the derived text metrics.
#[derive(Debug, Serialize)]
struct ResolvedScene<'a> {
    #[serde(flatten)]
    config: &'a SceneConfig,
    font_px: u32,
    baseline: f32,
    display_size: u32,
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Built-in defaults, then the scene file, then command-line flags.
pub fn resolve_config(args: &RunArgs) -> Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene file {}", path.display()))?;
            let config = SceneConfig::from_toml_str(&raw)
                .with_context(|| format!("invalid scene file {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded scene file");
            config
        }
        None => SceneConfig::default(),
    };

    apply_overrides(&mut config, args);
    config.validate().context("invalid scene configuration")?;
    Ok(config)
}

fn apply_overrides(config: &mut SceneConfig, args: &RunArgs) {
    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(text) = &args.text {
        config.text.content = text.clone();
    }
    if let Some(font) = &args.font {
        config.text.font = Some(font.clone());
    }
    if let Some(path) = &args.output {
        config.output.path = path.clone();
    }
    if let Some(path) = &args.display_output {
        config.output.display_path = Some(path.clone());
    }
    if let Some(viewport) = args.viewport {
        config.output.viewport = Some(viewport);
    }
    if let Some(alpha) = args.alpha {
        config.output.alpha = alpha;
    }
    if let Some(backend) = args.backend {
        config.output.backend = backend;
    }
}

pub fn print_config(config: &SceneConfig) -> Result<()> {
    let resolved = ResolvedScene {
        config,
        font_px: config.font_px(),
        baseline: config.baseline(),
        display_size: config.display_size(),
    };
    let json = serde_json::to_string_pretty(&resolved).context("failed to serialise scene")?;
    println!("{json}");
    Ok(())
}

pub fn run(config: &SceneConfig) -> Result<RunOutputs> {
    tracing::info!(
        text = %config.text.content,
        size = config.size,
        font_px = config.font_px(),
        color = %config.text.color,
        "rendering text quad"
    );

    let bitmap = rasterize(config)?;
    let frame = render(&bitmap, backend_choice(config.output.backend))
        .context("failed to render frame")?;
    tracing::info!(backend = %frame.backend, "frame rendered");

    export(config, &frame)
}

fn rasterize(config: &SceneConfig) -> Result<Bitmap> {
    let source = match &config.text.font {
        Some(path) => FontSource::File(path.clone()),
        None => FontSource::system(config.text.family.clone(), config.text.bold),
    };
    let font = load_font(&source).context("failed to load font")?;
    tracing::debug!(font = %font.name, "resolved font");

    let style = TextStyle::for_surface(
        config.text.content.clone(),
        config.size,
        config.text.color.to_rgba_f32(),
    );
    Ok(rasterize_text(&font.font, &style, config.size, config.size))
}

fn export(config: &SceneConfig, frame: &RenderedFrame) -> Result<RunOutputs> {
    let alpha = alpha_mode(config.output.alpha);
    let backing_path = config.output.path.clone();
    save_png(&encode_alpha(&frame.pixels, alpha), &backing_path)?;
    tracing::info!(path = %backing_path.display(), size = config.size, "wrote frame");

    let Some(display_path) = config.output.display_path.clone() else {
        return Ok(RunOutputs {
            backing: backing_path,
            display: None,
        });
    };

    let presentation = Presentation::new(config.size, config.display_scale);
    let mut display_frame = display_copy(&frame.pixels, presentation);
    if let Some(viewport) = config.output.viewport {
        display_frame =
            composite_centered(&display_frame, presentation, (viewport.width, viewport.height));
        let (x, y) = presentation.centered_origin((viewport.width, viewport.height));
        tracing::debug!(x, y, "centered display copy in viewport");
    }
    save_png(&encode_alpha(&display_frame, alpha), &display_path)?;
    let (width, height) = display_frame.dimensions();
    tracing::info!(
        path = %display_path.display(),
        width,
        height,
        "wrote display copy"
    );

    Ok(RunOutputs {
        backing: backing_path,
        display: Some(display_path),
    })
}

fn alpha_mode(setting: AlphaSetting) -> AlphaMode {
    match setting {
        AlphaSetting::Straight => AlphaMode::Straight,
        AlphaSetting::Premultiplied => AlphaMode::Premultiplied,
    }
}

fn backend_choice(setting: BackendSetting) -> BackendChoice {
    match setting {
        BackendSetting::Auto => BackendChoice::Auto,
        BackendSetting::Gpu => BackendChoice::Gpu,
        BackendSetting::Cpu => BackendChoice::Cpu,
    }
}
