//! Startup configuration
//!
//! Command line: `face-morph <data_dir> <num_reference_faces> [-fs|-is|-wf] [-l|-nl]`
//! The flags are single-dash words, so they are taken as trailing values and
//! mapped by hand after clap has handled the positionals.
//!
//! An optional `face-morph.ron` in the data directory supplies defaults;
//! flags given on the command line win.

use std::fs;
use std::path::{Path, PathBuf};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use serde::{Deserialize, Serialize};
use crate::rasterizer::{RenderMode, HEIGHT, WIDTH};

/// Allowed range for the number of reference faces
pub const MIN_FACES: usize = 3;
pub const MAX_FACES: usize = 199;

/// Settings file looked up inside the data directory
pub const SETTINGS_FILE: &str = "face-morph.ron";

#[derive(Debug)]
pub enum ConfigError {
    UnknownFlag(String),
    InvalidDataDir(PathBuf),
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownFlag(flag) => {
                write!(f, "Unknown option '{}' (expected -fs, -is, -wf, -l or -nl)", flag)
            }
            ConfigError::InvalidDataDir(p) => write!(f, "Not a directory: {}", p.display()),
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render_mode: RenderMode,
    pub lighting: bool,
    pub antialiasing: bool,
    /// Face viewport size in pixels
    pub viewport_width: usize,
    pub viewport_height: usize,
    /// Width of the selector panel left of the face
    pub selector_width: usize,
    /// Keep offset tables in memory after first read
    pub cache_offsets: bool,
    /// Seconds between auto-rotate steps
    pub auto_rotate_interval: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Flat,
            lighting: true,
            antialiasing: true,
            viewport_width: WIDTH,
            viewport_height: HEIGHT,
            selector_width: WIDTH,
            cache_offsets: false,
            auto_rotate_interval: 1.0,
        }
    }
}

impl Settings {
    /// Parse settings from RON text; missing fields keep their defaults
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    /// Load `face-morph.ron` from `dir`, or defaults when it is absent
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(SETTINGS_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        Self::from_ron(&contents)
    }
}

/// Flags given on the command line; `None` leaves the settings value alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub render_mode: Option<RenderMode>,
    pub lighting: Option<bool>,
}

impl Overrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(mode) = self.render_mode {
            settings.render_mode = mode;
        }
        if let Some(lighting) = self.lighting {
            settings.lighting = lighting;
        }
    }
}

/// Command line
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "face-morph", version, about = "Morphable face viewer")]
pub struct Args {
    /// Directory holding mesh.csv, the sh_/tx_ tables and face-morph.ron
    pub data_dir: PathBuf,

    /// Number of reference faces to load (3-199)
    #[arg(value_parser = RangedU64ValueParser::<usize>::new().range(MIN_FACES as u64..=MAX_FACES as u64))]
    pub face_count: usize,

    /// Shading and lighting: -fs, -is, -wf, -l, -nl
    #[arg(allow_hyphen_values = true, num_args = 1.., trailing_var_arg = true)]
    pub flags: Vec<String>,
}

impl Args {
    /// Map the trailing flags onto settings overrides
    ///
    /// Mode precedence when several are given: wireframe, then interpolated,
    /// then flat. `-nl` beats `-l`. Unknown flags are rejected.
    pub fn overrides(&self) -> Result<Overrides, ConfigError> {
        let mut overrides = Overrides::default();
        for flag in &self.flags {
            match flag.as_str() {
                "-wf" => overrides.render_mode = Some(RenderMode::Wireframe),
                "-is" if overrides.render_mode != Some(RenderMode::Wireframe) => {
                    overrides.render_mode = Some(RenderMode::Gouraud)
                }
                "-fs" if overrides.render_mode.is_none() => {
                    overrides.render_mode = Some(RenderMode::Flat)
                }
                "-nl" => overrides.lighting = Some(false),
                "-l" if overrides.lighting.is_none() => overrides.lighting = Some(true),
                "-is" | "-fs" | "-l" => {}
                other => return Err(ConfigError::UnknownFlag(other.to_string())),
            }
        }
        Ok(overrides)
    }

    /// Check the data directory exists
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::InvalidDataDir(self.data_dir.clone()))
        }
    }
}

/// Check the arguments, load the settings file and apply overrides
pub fn configure(args: &Args) -> Result<Settings, ConfigError> {
    args.validate()?;
    let overrides = args.overrides()?;
    let mut settings = Settings::load_or_default(&args.data_dir)?;
    overrides.apply(&mut settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("face-morph").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_positional_arguments() {
        let args = parse(&["data", "10"]).unwrap();
        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert_eq!(args.face_count, 10);
        assert!(args.flags.is_empty());
        assert_eq!(args.overrides().unwrap(), Overrides::default());
    }

    #[test]
    fn test_missing_arguments_are_rejected() {
        let err = parse(&["data"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_face_count_bounds() {
        assert_eq!(parse(&["d", "3"]).unwrap().face_count, 3);
        assert_eq!(parse(&["d", "199"]).unwrap().face_count, 199);
        for bad in ["2", "200", "0", "ten", "3.5"] {
            let err = parse(&["d", bad]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_hyphen_flags_reach_the_trailing_list() {
        let args = parse(&["d", "5", "-is", "-nl"]).unwrap();
        assert_eq!(args.flags, vec!["-is".to_string(), "-nl".to_string()]);
    }

    #[test]
    fn test_flag_precedence() {
        let mode = |flags: &[&str]| {
            let mut argv = vec!["d", "5"];
            argv.extend_from_slice(flags);
            parse(&argv).unwrap().overrides().unwrap()
        };
        assert_eq!(mode(&["-is", "-wf", "-fs"]).render_mode, Some(RenderMode::Wireframe));
        assert_eq!(mode(&["-fs", "-is"]).render_mode, Some(RenderMode::Gouraud));
        assert_eq!(mode(&["-is", "-fs"]).render_mode, Some(RenderMode::Gouraud));
        assert_eq!(mode(&["-fs"]).render_mode, Some(RenderMode::Flat));
        assert_eq!(mode(&["-l", "-nl"]).lighting, Some(false));
        assert_eq!(mode(&["-nl", "-l"]).lighting, Some(false));
        assert_eq!(mode(&["-l"]).lighting, Some(true));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let args = parse(&["d", "5", "-zz"]).unwrap();
        assert!(matches!(args.overrides(), Err(ConfigError::UnknownFlag(f)) if f == "-zz"));
    }

    #[test]
    fn test_overrides_only_touch_given_values() {
        let mut settings = Settings { lighting: false, ..Settings::default() };
        Overrides { render_mode: Some(RenderMode::Wireframe), lighting: None }.apply(&mut settings);
        assert_eq!(settings.render_mode, RenderMode::Wireframe);
        assert!(!settings.lighting);
    }

    #[test]
    fn test_settings_from_ron() {
        let s = Settings::from_ron("(render_mode: Gouraud, lighting: false, viewport_width: 400)").unwrap();
        assert_eq!(s.render_mode, RenderMode::Gouraud);
        assert!(!s.lighting);
        assert_eq!(s.viewport_width, 400);
        assert_eq!(s.viewport_height, HEIGHT);
        assert_eq!(s.auto_rotate_interval, 1.0);

        assert!(matches!(Settings::from_ron("(render_mode: Sketchy)"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let args = parse(&["/nonexistent/face-data", "3"]).unwrap();
        assert!(matches!(args.validate(), Err(ConfigError::InvalidDataDir(_))));
        assert!(matches!(configure(&args), Err(ConfigError::InvalidDataDir(_))));
    }
}
