//! Captures a translucent window from a simulated desktop and writes it to the configured
//! output file.
//!

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use testing::{Compositor, SimulatedWindow, setup_logger};
use tracing::{error, info, info_span, warn};
use utilities::{DebugTime, Failure};
use window_capture::{
    ActionOptions, AllocationError, Config, OptionValue, OutputRegion, Rgba, RgbaBuffer, ScreenId,
    WindowCapture, config::LoadError,
};

const SCREEN: ScreenId = ScreenId(0);
const SCREEN_SIZE: [u32; 2] = [320, 200];
const DESKTOP: u64 = 1;
const TERMINAL: u64 = 2;
const DIALOG: u64 = 3;

/// If this instance should log at debug level.
fn should_debug() -> bool {
    std::env::args().any(|arg| arg.eq("--debug"))
}

/// Load the user's config, `None` if the platform has no config directory.
fn load_config() -> Option<Result<Config, LoadError>> {
    Config::default_path().map(|path| Config::load_or_create(&path))
}

/// Color of one pixel of a window with a translucent body, an opaque title bar, and a soft
/// shadow.
fn window_pixel(x: u32, y: u32, size: [u32; 2]) -> Rgba {
    let [width, height] = size;
    let shadow = 6;

    let inside = x >= shadow && y >= shadow && x < width - shadow && y < height - shadow;
    if !inside {
        let distance = x.min(y).min(width - 1 - x).min(height - 1 - y);
        let alpha = (distance * 12).min(72) as u8;
        return Rgba::new(0, 0, 0, alpha);
    }

    if y < shadow + 16 {
        Rgba::new(45, 52, 64, 255)
    } else {
        Rgba::new(235, 240, 250, 190)
    }
}

fn translucent_window(size: [u32; 2]) -> Result<RgbaBuffer, AllocationError> {
    let mut contents = RgbaBuffer::try_new(size[0], size[1])?;
    let coordinates = (0..size[1]).flat_map(|y| (0..size[0]).map(move |x| (x, y)));

    for ((x, y), pixel) in coordinates.zip(contents.pixels_mut()) {
        *pixel = window_pixel(x, y, size);
    }

    Ok(contents)
}

/// The desktop, a translucent terminal, and an opaque dialog overlapping it.
fn build_desktop() -> Result<Compositor, AllocationError> {
    let mut compositor = Compositor::new();
    compositor.add_screen(
        SCREEN,
        OutputRegion::new(0, 0, SCREEN_SIZE[0], SCREEN_SIZE[1]),
    );
    compositor.add_window(SimulatedWindow::solid(
        DESKTOP,
        SCREEN,
        [0, 0],
        SCREEN_SIZE,
        Rgba::new(38, 84, 124, 255),
    )?);
    compositor.add_window(SimulatedWindow::new(
        TERMINAL,
        SCREEN,
        [40, 30],
        translucent_window([180, 120])?,
    ));
    compositor.add_window(SimulatedWindow::solid(
        DIALOG,
        SCREEN,
        [150, 110],
        [120, 60],
        Rgba::new(250, 200, 60, 255),
    )?);

    Ok(compositor)
}

fn main() {
    let loaded_config = load_config();
    let debug_config = matches!(&loaded_config, Some(Ok(config)) if config.debug_logging);

    let log_dir = Config::default_path().and_then(|path| path.parent().map(|dir| dir.join("logs")));
    let _logger_guards = match setup_logger(debug_config || should_debug(), log_dir.as_deref()) {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("Could not set up the logger: {e}");
            std::process::exit(1);
        }
    };

    let _span = info_span!("[Main Thread]").entered();
    info!("Synthetic capture v{}", env!("CARGO_PKG_VERSION"));

    let config = match loaded_config {
        Some(config) => config
            .report("Could not load the config file, using the default config")
            .unwrap_or_default(),
        None => {
            warn!("No config directory on this platform, using the default config");
            Config::default()
        }
    };

    let Some(mut compositor) = build_desktop().report("Could not build the desktop") else {
        return;
    };

    let mut capture = WindowCapture::new(config.trim);
    if let Err(e) = capture.attach_screen(&mut compositor, SCREEN, Box::new(config.encoder())) {
        error!("Could not attach to the screen: {e}");
        return;
    }

    // Capture the translucent window
    {
        let _timing = DebugTime::start("Capture frame");

        let options = ActionOptions::new().with("window", OptionValue::Int(TERMINAL as i64));
        capture.capture_action(&mut compositor, &options);

        let painted = compositor.paint_damaged();
        info!("Painted {painted} screen(s)");
    }

    if config.output_path.exists() {
        info!("Capture written to {}", config.output_path.display());
    } else {
        warn!("No capture was written");
    }
}
