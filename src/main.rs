// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod charset;
mod config;
mod field;
mod frame;
mod lifecycle;
mod logging;
mod palette;
mod rain;
mod runtime;
mod scheduler;
mod terminal;

#[cfg(test)]
mod testing;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use color_eyre::eyre::WrapErr;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::canvas::Rgb;
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, load_file_config, print_list_colors,
    print_list_glyphs, print_list_vocabularies, Args, Settings,
};
use crate::field::ParticleField;
use crate::frame::CellCanvas;
use crate::lifecycle::{Animation, Lifecycle};
use crate::rain::MatrixRain;
use crate::runtime::{AnimationKind, ColorMode, ColorScheme};
use crate::scheduler::PacedScheduler;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const IDLE_POLL: Duration = Duration::from_millis(100);

const SCHEME_KEYS: [ColorScheme; 6] = [
    ColorScheme::Green,
    ColorScheme::Cyan,
    ColorScheme::Amber,
    ColorScheme::Purple,
    ColorScheme::Red,
    ColorScheme::Blue,
];

type Stage = Lifecycle<Box<dyn Animation>, CellCanvas, PacedScheduler>;

fn build_info() -> String {
    let sha = env!("GLYPHFIELD_GIT_SHA");
    if sha.is_empty() {
        env!("GLYPHFIELD_BUILD").to_string()
    } else {
        format!("{} ({})", env!("GLYPHFIELD_BUILD"), sha)
    }
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term == "linux" || term == "vt100" {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            16 => ColorMode::Color16,
            8 | 256 => ColorMode::Color256,
            24 | 32 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Mono => "mono",
        ColorMode::Color16 => "16-color",
    }
}

fn print_bitcolor_check(args: &Args) {
    let colorterm = env::var("COLORTERM").unwrap_or_default();
    let term = env::var("TERM").unwrap_or_default();
    let auto = detect_color_mode_auto();
    let effective = detect_color_mode(args);

    println!("BITCOLOR CHECK:");
    println!(
        "  COLORTERM: {}",
        if colorterm.is_empty() {
            "(unset)"
        } else {
            &colorterm
        }
    );
    println!(
        "  TERM: {}",
        if term.is_empty() { "(unset)" } else { &term }
    );
    println!("  auto_detected: {}", color_mode_label(auto));
    if args.colormode.is_some() {
        println!("  forced: {}", color_mode_label(effective));
    }
    println!("  effective: {}", color_mode_label(effective));
}

struct App {
    settings: Settings,
    kind: AnimationKind,
    seeds: StdRng,
    stage: Stage,
    cols: u16,
    rows: u16,
    screensaver: bool,
    running: bool,
}

impl App {
    fn new(settings: Settings, seed: u64, cols: u16, rows: u16, screensaver: bool) -> Self {
        let kind = settings.animation;
        let mut seeds = StdRng::seed_from_u64(seed);
        let stage = Self::build_stage(&settings, kind, seeds.random(), cols, rows);
        Self {
            settings,
            kind,
            seeds,
            stage,
            cols,
            rows,
            screensaver,
            running: true,
        }
    }

    fn background(settings: &Settings, kind: AnimationKind) -> Rgb {
        match kind {
            AnimationKind::Field => settings.field.background,
            AnimationKind::Rain => settings.rain.background,
        }
    }

    fn build_stage(
        settings: &Settings,
        kind: AnimationKind,
        seed: u64,
        cols: u16,
        rows: u16,
    ) -> Stage {
        let animation: Box<dyn Animation> = match kind {
            AnimationKind::Field => Box::new(ParticleField::new(settings.field.clone(), seed)),
            AnimationKind::Rain => Box::new(MatrixRain::new(settings.rain.clone(), seed)),
        };
        let scheduler = PacedScheduler::new(settings.fps, Instant::now());
        let mut stage = Lifecycle::new(animation, scheduler);
        stage.initialize(CellCanvas::new(cols, rows, Self::background(settings, kind)));
        stage
    }

    fn rebuild(&mut self) {
        let paused = self.stage.scheduler().is_paused();
        self.stage.destroy();
        let seed = self.seeds.random();
        self.stage = Self::build_stage(&self.settings, self.kind, seed, self.cols, self.rows);
        if paused {
            self.stage.scheduler_mut().set_paused(true, Instant::now());
        }
        info!(
            "switched to {} (scheme {})",
            self.stage.animation().name(),
            self.settings.scheme.name()
        );
    }

    fn restart(&mut self) {
        self.stage.destroy();
        let bg = Self::background(&self.settings, self.kind);
        self.stage.initialize(CellCanvas::new(self.cols, self.rows, bg));
        debug!("restarted {}", self.stage.animation().name());
    }

    fn toggle_pause(&mut self) {
        let scheduler = self.stage.scheduler_mut();
        let paused = !scheduler.is_paused();
        scheduler.set_paused(paused, Instant::now());
        debug!("paused: {}", paused);
    }

    fn handle_event(&mut self, ev: Event) {
        match ev {
            Event::Resize(w, h) => {
                self.cols = w;
                self.rows = h;
                self.stage.resize(CellCanvas::surface_size(w, h));
            }
            Event::Mouse(m) => {
                if matches!(m.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
                    self.stage
                        .handle_mouse_move(CellCanvas::cell_center(m.column, m.row));
                }
            }
            Event::Key(k) if k.kind == KeyEventKind::Press => {
                if self.screensaver {
                    self.running = false;
                    return;
                }
                match (k.code, k.modifiers) {
                    (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => self.running = false,
                    (KeyCode::Char('c'), KeyModifiers::CONTROL) => self.running = false,
                    (KeyCode::Tab, _) => {
                        self.kind = self.kind.next();
                        self.rebuild();
                    }
                    (KeyCode::Char(' '), _) => self.restart(),
                    (KeyCode::Char('p'), _) => self.toggle_pause(),
                    (KeyCode::Char(c @ '1'..='6'), _) => {
                        let idx = (c as u8 - b'1') as usize;
                        if let Some(&scheme) = SCHEME_KEYS.get(idx) {
                            self.settings.set_scheme(scheme);
                            self.rebuild();
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, now: Instant) -> bool {
        let Some((handle, timestamp)) = self.stage.scheduler_mut().take_due(now) else {
            return false;
        };
        self.stage.on_animation_frame(handle, timestamp)
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let eyre_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal_best_effort();
        eyre_hook(info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.list_vocabularies {
        print_list_vocabularies();
        return Ok(());
    }

    if args.list_glyphs {
        print_list_glyphs();
        return Ok(());
    }

    if args.check_bitcolor {
        print_bitcolor_check(&args);
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    logging::init(args.log_file.as_deref(), args.log_level.into())?;

    let (file, config_path) = load_file_config(args.config.as_deref())?;
    let mut settings = match Settings::resolve(&args, file, default_to_ascii()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    settings.fps = require_f64_range("--fps", settings.fps, 1.0, 240.0);

    let duration_s = args.duration.and_then(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        (s > 0.0).then(|| require_f64_range("--duration", s, 0.1, 86400.0))
    });

    let color_mode = detect_color_mode(&args);
    let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
    info!(
        "starting {:?} at {} fps, scheme {}, {}, seed {}, config {}",
        settings.animation,
        settings.fps,
        if settings.keep_file_colors {
            "from config file"
        } else {
            settings.scheme.name()
        },
        color_mode_label(color_mode),
        seed,
        config_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );

    let mouse = !args.no_mouse;
    let mut term = Terminal::new(mouse).wrap_err("failed to set up the terminal")?;
    let (cols, rows) = term.size()?;

    let mut app = App::new(settings, seed, cols, rows, args.screensaver);

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));

    while app.running {
        let now = Instant::now();
        if end_time.is_some_and(|end| now >= end) {
            break;
        }

        let mut timeout = app
            .stage
            .scheduler()
            .time_until_due(now)
            .unwrap_or(IDLE_POLL);
        if let Some(end) = end_time {
            timeout = timeout.min(end.saturating_duration_since(now));
        }

        if Terminal::poll_event(timeout)? {
            app.handle_event(Terminal::read_event()?);
            while app.running && Terminal::poll_event(Duration::ZERO)? {
                app.handle_event(Terminal::read_event()?);
            }
        }
        if !app.running {
            break;
        }

        if app.tick(Instant::now()) {
            if let Some(canvas) = app.stage.context() {
                term.draw(canvas.frame(), color_mode)?;
            }
        }
    }

    app.stage.destroy();
    drop(term);
    info!("exiting after {:.1}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Size;
    use crate::config::FileConfig;
    use clap::Parser;
    use crossterm::event::{KeyEvent, MouseEvent};

    fn app(extra: &[&str]) -> App {
        let mut argv = vec!["glyphfield"];
        argv.extend_from_slice(extra);
        let args = Args::try_parse_from(argv).unwrap();
        let settings = Settings::resolve(&args, FileConfig::default(), false).unwrap();
        App::new(settings, 42, 80, 24, args.screensaver)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn app_starts_an_active_session_sized_to_the_terminal() {
        let a = app(&[]);
        assert!(a.stage.is_active());
        assert_eq!(a.stage.size(), Some(Size::new(640.0, 384.0)));
        assert_eq!(a.stage.animation().name(), "field");
        assert!(a.stage.pending_frame().is_some());
    }

    #[test]
    fn tab_switches_animation_through_a_new_manager() {
        let mut a = app(&[]);
        a.handle_event(key(KeyCode::Tab));
        assert_eq!(a.kind, AnimationKind::Rain);
        assert_eq!(a.stage.animation().name(), "rain");
        assert!(a.stage.is_active());
        a.handle_event(key(KeyCode::Tab));
        assert_eq!(a.stage.animation().name(), "field");
    }

    #[test]
    fn space_restarts_the_session() {
        let mut a = app(&["-A", "rain"]);
        a.handle_event(key(KeyCode::Char(' ')));
        assert!(a.stage.is_active());
        assert_eq!(a.stage.animation().name(), "rain");
        assert!(a.stage.pending_frame().is_some());
    }

    #[test]
    fn pause_stops_frame_delivery() {
        let mut a = app(&[]);
        a.handle_event(key(KeyCode::Char('p')));
        assert!(a.stage.scheduler().is_paused());
        assert!(!a.tick(Instant::now() + Duration::from_secs(1)));
        a.handle_event(key(KeyCode::Char('p')));
        assert!(a.tick(Instant::now() + Duration::from_secs(1)));
    }

    #[test]
    fn pause_survives_switching_animation_and_scheme() {
        let mut a = app(&[]);
        a.handle_event(key(KeyCode::Char('p')));
        a.handle_event(key(KeyCode::Tab));
        assert_eq!(a.stage.animation().name(), "rain");
        assert!(a.stage.scheduler().is_paused());
        assert!(!a.tick(Instant::now() + Duration::from_secs(1)));

        a.handle_event(key(KeyCode::Char('2')));
        assert!(a.stage.scheduler().is_paused());
        assert!(!a.tick(Instant::now() + Duration::from_secs(1)));

        a.handle_event(key(KeyCode::Char('p')));
        assert!(a.tick(Instant::now() + Duration::from_secs(1)));
    }

    #[test]
    fn tick_draws_into_the_canvas() {
        let mut a = app(&[]);
        assert!(a.tick(Instant::now() + Duration::from_millis(20)));
        let frame = a.stage.context().unwrap().frame();
        assert!(frame.cells.iter().any(|c| !c.is_blank()));
    }

    #[test]
    fn number_keys_switch_scheme() {
        let mut a = app(&[]);
        a.handle_event(key(KeyCode::Char('3')));
        assert_eq!(a.settings.scheme, ColorScheme::Amber);
        assert!(a.stage.is_active());
        a.handle_event(key(KeyCode::Char('9')));
        assert_eq!(a.settings.scheme, ColorScheme::Amber);
    }

    #[test]
    fn resize_and_mouse_reach_the_manager() {
        let mut a = app(&[]);
        a.handle_event(Event::Resize(100, 30));
        assert_eq!(a.stage.size(), Some(Size::new(800.0, 480.0)));
        assert_eq!(a.stage.context().unwrap().frame().width, 100);

        a.handle_event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 2,
            row: 1,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(a.stage.mouse(), Some(CellCanvas::cell_center(2, 1)));
    }

    #[test]
    fn quit_keys_and_screensaver() {
        let mut a = app(&[]);
        a.handle_event(key(KeyCode::Char('q')));
        assert!(!a.running);

        let mut a = app(&["--screensaver"]);
        a.handle_event(key(KeyCode::Char('x')));
        assert!(!a.running);
    }
}
