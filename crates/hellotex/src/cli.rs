use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sceneconfig::{
    parse_alpha, parse_backend, parse_viewport, AlphaSetting, BackendSetting, Viewport,
};

#[derive(Parser, Debug)]
#[command(
    name = "hellotex",
    author,
    version,
    about = "Draws text through a textured quad and exports the frame",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Scene file in TOML; can also be supplied via the `HELLOTEX_CONFIG` env var.
    #[arg(long, value_name = "FILE", env = "HELLOTEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backing resolution of the square surface in pixels.
    #[arg(long, value_name = "PIXELS")]
    pub size: Option<u32>,

    /// Text drawn onto the surface.
    #[arg(long, value_name = "STRING")]
    pub text: Option<String>,

    /// Font file to rasterize with instead of querying system fonts.
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// PNG written at backing resolution.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// PNG written at display density.
    #[arg(long, value_name = "PATH")]
    pub display_output: Option<PathBuf>,

    /// Composite the display copy centered on a `WIDTHxHEIGHT` canvas.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_viewport_arg)]
    pub viewport: Option<Viewport>,

    /// Alpha encoding of exported files: `straight` or `premultiplied`.
    #[arg(long, value_name = "MODE", value_parser = parse_alpha_arg)]
    pub alpha: Option<AlphaSetting>,

    /// Rendering path: `auto`, `gpu`, or `cpu`.
    #[arg(long, value_name = "BACKEND", value_parser = parse_backend_arg)]
    pub backend: Option<BackendSetting>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved scene configuration as JSON and exit.
    Config,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_viewport_arg(value: &str) -> Result<Viewport, String> {
    parse_viewport(value)
}

fn parse_alpha_arg(value: &str) -> Result<AlphaSetting, String> {
    if value.trim().is_empty() {
        return Err("alpha mode must not be empty".to_string());
    }
    parse_alpha(value)
}

fn parse_backend_arg(value: &str) -> Result<BackendSetting, String> {
    if value.trim().is_empty() {
        return Err("backend must not be empty".to_string());
    }
    parse_backend(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "hellotex",
            "--size",
            "256",
            "--viewport",
            "1280x720",
            "--alpha",
            "premultiplied",
            "--backend",
            "cpu",
            "config",
        ])
        .unwrap();
        assert_eq!(cli.run.size, Some(256));
        assert_eq!(
            cli.run.viewport,
            Some(Viewport {
                width: 1280,
                height: 720
            })
        );
        assert_eq!(cli.run.alpha, Some(AlphaSetting::Premultiplied));
        assert_eq!(cli.run.backend, Some(BackendSetting::Cpu));
        assert!(matches!(cli.command, Some(Command::Config)));
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["hellotex", "--backend", "metal"]).is_err());
        assert!(Cli::try_parse_from(["hellotex", "--backend", " "]).is_err());
        assert!(Cli::try_parse_from(["hellotex", "--viewport", "wide"]).is_err());
    }
}
