use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use engine::PowerPreference;
use renderers::RendererKind;

#[derive(Parser, Debug)]
#[command(
    name = "glowpane",
    author,
    version,
    about = "Windowed ambient shader viewer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Renderer to display (`aurora`, `plasma`, `ripple`).
    #[arg(value_name = "RENDERER", value_parser = parse_renderer)]
    pub renderer: Option<RendererKind>,

    /// Parameter override, repeatable (e.g. `--set speed=0.3`).
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Preset TOML file supplying the renderer and parameter overrides.
    #[arg(long, value_name = "FILE")]
    pub preset: Option<PathBuf>,

    /// Adapter power profile to request.
    #[arg(long, value_name = "PROFILE", value_enum, default_value = "low-power")]
    pub power_preference: PowerArg,

    /// Upper bound on the device pixel ratio used for the backing buffer.
    #[arg(long, value_name = "RATIO", default_value_t = 3.0)]
    pub max_dpr: f64,

    /// Animate even when the platform asks for reduced motion.
    #[arg(long)]
    pub ignore_reduced_motion: bool,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Window title.
    #[arg(long, value_name = "TITLE", default_value = "Glowpane")]
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerArg {
    LowPower,
    HighPerformance,
}

impl PowerArg {
    pub fn to_engine(self) -> PowerPreference {
        match self {
            PowerArg::LowPower => PowerPreference::LowPower,
            PowerArg::HighPerformance => PowerPreference::HighPerformance,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_renderer(value: &str) -> Result<RendererKind, String> {
    RendererKind::from_str(value).map_err(|err| err.to_string())
}

/// Parses a `name=value` override into a parameter assignment.
pub fn parse_override(spec: &str) -> Result<(String, f32)> {
    let (name, value) = spec
        .split_once('=')
        .with_context(|| format!("expected NAME=VALUE in override '{spec}'"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("empty parameter name in override '{spec}'");
    }
    let value: f32 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid numeric value in override '{spec}'"))?;
    Ok((name.to_string(), value))
}

/// Parses a `WIDTHxHEIGHT` window size specification.
pub fn parse_window_size(spec: &str) -> Result<(u32, u32)> {
    let (width, height) = spec
        .trim()
        .split_once(['x', 'X'])
        .context("expected WxH format, e.g. 1280x720")?;
    let width: u32 = width
        .trim()
        .parse()
        .context("invalid width in size specification")?;
    let height: u32 = height
        .trim()
        .parse()
        .context("invalid height in size specification")?;
    if width == 0 || height == 0 {
        anyhow::bail!("window dimensions must be greater than zero");
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_parse_names_and_values() {
        assert_eq!(
            parse_override("speed=0.3").unwrap(),
            ("speed".to_string(), 0.3)
        );
        assert_eq!(
            parse_override("  glow = 1.5 ").unwrap(),
            ("glow".to_string(), 1.5)
        );
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        assert!(parse_override("speed").is_err());
        assert!(parse_override("=0.3").is_err());
        assert!(parse_override("speed=fast").is_err());
    }

    #[test]
    fn window_sizes_parse_and_reject_zero() {
        assert_eq!(parse_window_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_window_size("1920X1080").unwrap(), (1920, 1080));
        assert!(parse_window_size("1280").is_err());
        assert!(parse_window_size("0x720").is_err());
    }

    #[test]
    fn renderer_argument_resolves_known_ids() {
        assert_eq!(parse_renderer("plasma").unwrap(), RendererKind::Plasma);
        assert!(parse_renderer("lava").is_err());
    }
}
