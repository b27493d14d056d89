// Copyright (c) 2026 rezky_nightky

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use crate::charset::{glyph_set_from_str, vocabulary_from_str, GlyphSet, Vocabulary};
use crate::field::FieldConfig;
use crate::palette::build_palette;
use crate::rain::RainConfig;
use crate::runtime::{AnimationKind, ColorScheme};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphfield --animation field --color green --vocabulary rust --glyphs auto --fps 60";

pub const CONFIG_FILE_NAME: &str = "config.toml";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_listing(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  glyphfield") {
            out.push_str("  \x1b[1;34mglyphfield\x1b[0m");
            out.push_str(rest);
        } else if let Some(rest) = line.strip_prefix("NOTE:") {
            out.push_str("\x1b[2mNOTE:");
            out.push_str(rest);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

fn print_block(text: &str) {
    if color_enabled_stdout() {
        print!("{}", colorize_listing(text));
    } else {
        print!("{}", text);
    }
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_listing(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphfield", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'A',
        long = "animation",
        value_enum,
        help_heading = "GENERAL",
        help = "Animation to run: field (drifting code) or rain (falling glyphs)"
    )]
    pub animation: Option<AnimationKind>,

    #[arg(
        long = "config",
        value_name = "PATH",
        help_heading = "GENERAL",
        help = "TOML config file (default: the platform config dir, if present)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "no-mouse",
        help_heading = "GENERAL",
        help = "Do not capture the mouse; the animations run without pointer effects"
    )]
    pub no_mouse: bool,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed for the random generator (random when omitted)"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'c',
        long = "color",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors) [default: green]"
    )]
    pub color: Option<String>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "vocabulary",
        help_heading = "APPEARANCE",
        help = "Code tokens for the field animation (see --list-vocabularies)"
    )]
    pub vocabulary: Option<String>,

    #[arg(
        long = "glyphs",
        help_heading = "APPEARANCE",
        help = "Glyph set for the rain animation (see --list-glyphs)"
    )]
    pub glyphs: Option<String>,

    #[arg(
        short = 'f',
        long = "fps",
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240) [default: 60]"
    )]
    pub fps: Option<f64>,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "DIAGNOSTICS",
        help = "Append log records to this file"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "log-level",
        value_enum,
        default_value_t = LogLevel::Info,
        help_heading = "DIAGNOSTICS",
        help = "Log verbosity (only with --log-file)"
    )]
    pub log_level: LogLevel,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "list-vocabularies",
        help_heading = "HELP",
        help = "List available token vocabularies and exit"
    )]
    pub list_vocabularies: bool,

    #[arg(
        long = "list-glyphs",
        help_heading = "HELP",
        help = "List available glyph sets and exit"
    )]
    pub list_glyphs: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_list_colors() {
    let mut block = String::from(
        "AVAILABLE COLOR THEMES:\nNOTE: Use only the VALUE (left side) with --color. Keys 1-6 switch live.\n\nVALUE        DESCRIPTION\n",
    );
    for scheme in ColorScheme::ALL {
        block.push_str(&format!("{:<12} {}\n", scheme.name(), describe_scheme(scheme)));
    }
    print_block(&block);
}

fn describe_scheme(scheme: ColorScheme) -> &'static str {
    match scheme {
        ColorScheme::Green => "Green theme (alias: matrix)",
        ColorScheme::Cyan => "Cyan theme",
        ColorScheme::Amber => "Amber theme (aliases: gold, yellow)",
        ColorScheme::Purple => "Purple theme",
        ColorScheme::Red => "Red theme",
        ColorScheme::Blue => "Blue theme",
        ColorScheme::Gray => "Gray theme (alias: grey)",
        ColorScheme::Neon => "Neon theme (alias: synthwave)",
        ColorScheme::Ocean => "Ocean theme (alias: deep-sea)",
        ColorScheme::Fire => "Fire theme (alias: inferno)",
    }
}

pub fn print_list_vocabularies() {
    let mut block = String::from(
        "AVAILABLE VOCABULARIES:\nNOTE: Use only the VALUE (left side) with --vocabulary.\n\nVALUE        DESCRIPTION\n",
    );
    for v in Vocabulary::ALL {
        block.push_str(&format!("{:<12} {}\n", v.name(), v.describe()));
    }
    print_block(&block);
}

pub fn print_list_glyphs() {
    let mut block = String::from(
        "AVAILABLE GLYPH SETS:\nNOTE: Use only the VALUE (left side) with --glyphs.\n\nVALUE        DESCRIPTION\nauto         Auto-select (ascii when non-UTF, otherwise matrix)\n",
    );
    for g in GlyphSet::ALL {
        block.push_str(&format!("{:<12} {}\n", g.name(), g.describe()));
    }
    print_block(&block);
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub animation: Option<AnimationKind>,
    pub fps: Option<f64>,
    pub seed: Option<u64>,
    pub color: Option<String>,
    pub vocabulary: Option<String>,
    pub glyphs: Option<String>,
    pub field: Option<FieldConfig>,
    pub rain: Option<RainConfig>,
}

impl FileConfig {
    pub fn parse(text: &str, origin: &Path) -> color_eyre::Result<Self> {
        toml::from_str(text).wrap_err_with(|| format!("invalid config file {}", origin.display()))
    }

    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text, path)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "glyphfield").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

pub fn load_file_config(explicit: Option<&Path>) -> color_eyre::Result<(FileConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        return Ok((FileConfig::load(path)?, Some(path.to_path_buf())));
    }
    match default_config_path() {
        Some(path) if path.is_file() => Ok((FileConfig::load(&path)?, Some(path))),
        _ => Ok((FileConfig::default(), None)),
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub animation: AnimationKind,
    pub fps: f64,
    pub seed: Option<u64>,
    pub scheme: ColorScheme,
    pub field: FieldConfig,
    pub rain: RainConfig,
    pub keep_file_colors: bool,
}

impl Settings {
    pub fn resolve(args: &Args, file: FileConfig, default_to_ascii: bool) -> Result<Self, String> {
        let color = args.color.as_deref().or(file.color.as_deref());
        let scheme = match color {
            Some(name) => name.parse::<ColorScheme>()?,
            None => ColorScheme::Green,
        };

        let has_sections = file.field.is_some() || file.rain.is_some();
        let keep_file_colors = color.is_none() && has_sections;
        let palette = build_palette(scheme);

        let mut field = file.field.unwrap_or_default();
        let mut rain = file.rain.unwrap_or_else(|| RainConfig {
            glyphs: String::new(),
            ..RainConfig::default()
        });
        if !keep_file_colors {
            field = field.with_palette(&palette);
            rain = rain.with_palette(&palette);
        }

        if let Some(name) = args.vocabulary.as_deref().or(file.vocabulary.as_deref()) {
            field.vocabulary = vocabulary_from_str(name)?.tokens();
        }

        match args.glyphs.as_deref().or(file.glyphs.as_deref()) {
            Some(name) => rain.glyphs = glyph_set_from_str(name, default_to_ascii)?.chars(),
            None if rain.glyphs.trim().is_empty() => {
                rain.glyphs = glyph_set_from_str("auto", default_to_ascii)?.chars();
            }
            None => {}
        }

        Ok(Self {
            animation: args.animation.or(file.animation).unwrap_or(AnimationKind::Field),
            fps: args.fps.or(file.fps).unwrap_or(60.0),
            seed: args.seed.or(file.seed),
            scheme,
            field,
            rain,
            keep_file_colors,
        })
    }

    pub fn set_scheme(&mut self, scheme: ColorScheme) {
        let palette = build_palette(scheme);
        self.scheme = scheme;
        self.keep_file_colors = false;
        self.field = self.field.clone().with_palette(&palette);
        self.rain = self.rain.clone().with_palette(&palette);
    }
}
