//! Scene configuration for `hellotex`.
//!
//! A scene is small: one square surface, one line of text, and a handful of
//! output knobs. Everything has a default so an empty file (or no file at all)
//! renders the stock "Hello!" frame.

use std::fmt;
use std::path::PathBuf;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Largest square surface we accept; matches common GPU texture limits.
pub const MAX_SURFACE_SIZE: u32 = 8192;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// How exported PNG files encode alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaSetting {
    /// Undo the premultiply pass so image viewers show the intended colors.
    #[default]
    Straight,
    /// Write the framebuffer bytes untouched.
    Premultiplied,
}

/// Which rendering path draws the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSetting {
    /// Use the GPU when an adapter is available, otherwise the CPU path.
    #[default]
    Auto,
    Gpu,
    Cpu,
}

/// Straight-alpha fill color, written the way CSS writes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f32,
}

impl FillColor {
    pub const SEMI_TRANSPARENT_RED: FillColor = FillColor {
        red: 255,
        green: 0,
        blue: 0,
        alpha: 0.5,
    };

    /// Channels normalised to `0.0..=1.0`.
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            f32::from(self.red) / 255.0,
            f32::from(self.green) / 255.0,
            f32::from(self.blue) / 255.0,
            self.alpha,
        ]
    }
}

impl Default for FillColor {
    fn default() -> Self {
        Self::SEMI_TRANSPARENT_RED
    }
}

impl fmt::Display for FillColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

impl Serialize for FillColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Host canvas the display-size frame is centered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Serialize for Viewport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneConfig {
    /// Backing resolution of the square surface, texture, and viewport.
    #[serde(default = "default_size")]
    pub size: u32,
    /// Display size relative to the backing resolution.
    #[serde(default = "default_display_scale")]
    pub display_scale: f32,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextConfig {
    #[serde(default = "default_content")]
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub color: FillColor,
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(default = "default_bold")]
    pub bold: bool,
    /// Explicit font file; bypasses the system font query when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_path: Option<PathBuf>,
    #[serde(
        default,
        deserialize_with = "deserialize_viewport_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub alpha: AlphaSetting,
    #[serde(default)]
    pub backend: BackendSetting,
}

fn default_size() -> u32 {
    500
}

fn default_display_scale() -> f32 {
    0.5
}

fn default_content() -> String {
    "Hello!".to_string()
}

fn default_family() -> String {
    "sans-serif".to_string()
}

fn default_bold() -> bool {
    true
}

fn default_output_path() -> PathBuf {
    PathBuf::from("hellotex.png")
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            display_scale: default_display_scale(),
            text: TextConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: default_content(),
            color: FillColor::default(),
            family: default_family(),
            bold: default_bold(),
            font: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            display_path: None,
            viewport: None,
            alpha: AlphaSetting::default(),
            backend: BackendSetting::default(),
        }
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<FillColor, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Channels(Vec<f64>),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Str(raw) => parse_color(&raw).map_err(de::Error::custom),
        Helper::Channels(values) => color_from_channels(&values).map_err(de::Error::custom),
    }
}

fn deserialize_viewport_opt<'de, D>(deserializer: D) -> Result<Option<Viewport>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_viewport(&raw).map(Some).map_err(de::Error::custom)
}

/// Parses `rgba(r, g, b, a)`, `rgb(r, g, b)`, `#rrggbb`, or `#rrggbbaa`.
pub fn parse_color(raw: &str) -> Result<FillColor, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("color must not be empty".to_string());
    }

    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex_color(hex).ok_or_else(|| format!("invalid hex color '{trimmed}'"));
    }

    let normalized = trimmed.to_ascii_lowercase();
    let inner = normalized
        .strip_prefix("rgba(")
        .or_else(|| normalized.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| format!("invalid color '{trimmed}'; expected rgba(r, g, b, a) or #rrggbb"))?;

    let values = inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid color component '{}' in '{trimmed}'", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    color_from_channels(&values)
}

fn parse_hex_color(hex: &str) -> Option<FillColor> {
    if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16).ok();
    let alpha = if hex.len() == 8 {
        f32::from(channel(6)?) / 255.0
    } else {
        1.0
    };
    Some(FillColor {
        red: channel(0)?,
        green: channel(2)?,
        blue: channel(4)?,
        alpha,
    })
}

fn color_from_channels(values: &[f64]) -> Result<FillColor, String> {
    if !matches!(values.len(), 3 | 4) {
        return Err(format!(
            "color needs 3 or 4 components, found {}",
            values.len()
        ));
    }

    let channel = |value: f64| -> Result<u8, String> {
        if !(0.0..=255.0).contains(&value) {
            return Err(format!("color channel {value} is outside 0-255"));
        }
        Ok(value.round() as u8)
    };

    let alpha = values.get(3).copied().unwrap_or(1.0);
    if !(0.0..=1.0).contains(&alpha) {
        return Err(format!("color alpha {alpha} is outside 0-1"));
    }

    Ok(FillColor {
        red: channel(values[0])?,
        green: channel(values[1])?,
        blue: channel(values[2])?,
        alpha: alpha as f32,
    })
}

/// Parses a `WIDTHxHEIGHT` viewport string.
pub fn parse_viewport(value: &str) -> Result<Viewport, String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| format!("expected WxH format, e.g. 1280x720 (got '{trimmed}')"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in viewport '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in viewport '{trimmed}'"))?;

    if width == 0 || height == 0 {
        return Err("viewport dimensions must be greater than zero".to_string());
    }

    Ok(Viewport { width, height })
}

pub fn parse_alpha(value: &str) -> Result<AlphaSetting, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "straight" | "unpremultiplied" => Ok(AlphaSetting::Straight),
        "premultiplied" | "premul" => Ok(AlphaSetting::Premultiplied),
        other => Err(format!(
            "unknown alpha mode '{other}'; expected straight or premultiplied"
        )),
    }
}

pub fn parse_backend(value: &str) -> Result<BackendSetting, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" | "default" => Ok(BackendSetting::Auto),
        "gpu" | "wgpu" => Ok(BackendSetting::Gpu),
        "cpu" | "software" => Ok(BackendSetting::Cpu),
        other => Err(format!(
            "unknown backend '{other}'; expected auto, gpu, or cpu"
        )),
    }
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::Invalid("size must be greater than zero".into()));
        }

        if self.size > MAX_SURFACE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "size {} exceeds the maximum of {MAX_SURFACE_SIZE}",
                self.size
            )));
        }

        if !(self.display_scale > 0.0 && self.display_scale <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "display_scale must be within (0, 1], got {}",
                self.display_scale
            )));
        }

        if self.text.content.is_empty() {
            return Err(ConfigError::Invalid("text.content must not be empty".into()));
        }

        if self.text.family.trim().is_empty() {
            return Err(ConfigError::Invalid("text.family must not be empty".into()));
        }

        if !(0.0..=1.0).contains(&self.text.color.alpha) {
            return Err(ConfigError::Invalid(format!(
                "text.color alpha {} is outside 0-1",
                self.text.color.alpha
            )));
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output.path must not be empty".into()));
        }

        if let Some(viewport) = self.output.viewport {
            if viewport.width == 0 || viewport.height == 0 {
                return Err(ConfigError::Invalid(
                    "output.viewport dimensions must be greater than zero".into(),
                ));
            }
            if self.output.display_path.is_none() {
                return Err(ConfigError::Invalid(
                    "output.viewport composites the display copy and requires output.display_path"
                        .into(),
                ));
            }
        }

        Ok(())
    }

    /// Font pixel size: one third of the surface height, floored.
    pub fn font_px(&self) -> u32 {
        self.size / 3
    }

    /// Baseline of the single text run, one third down the surface.
    pub fn baseline(&self) -> f32 {
        self.size as f32 / 3.0
    }

    /// Side length the frame is presented at.
    pub fn display_size(&self) -> u32 {
        ((self.size as f32 * self.display_scale).round() as u32).max(1)
    }
}
