//! Captures written to a PNG file.
//!

use std::fs;

use testing::{Compositor, SimulatedWindow};
use window_capture::{
    ActionOptions, Config, OptionValue, OutputRegion, Rgba, ScreenId, WindowCapture,
};

#[test]
fn capture_is_written_as_png() {
    let screen = ScreenId(0);
    let dir = std::env::temp_dir().join(format!("window-capture-png-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let config = Config {
        output_path: dir.join("windowcapture.png"),
        ..Config::default()
    };

    let mut compositor = Compositor::new();
    compositor.add_screen(screen, OutputRegion::new(0, 0, 8, 6));
    compositor.add_window(
        SimulatedWindow::solid(1, screen, [0, 0], [8, 6], Rgba::new(90, 90, 90, 255)).unwrap(),
    );
    compositor.add_window(
        SimulatedWindow::solid(2, screen, [2, 1], [3, 4], Rgba::new(0, 200, 100, 255)).unwrap(),
    );

    let mut capture = WindowCapture::new(config.trim);
    capture
        .attach_screen(&mut compositor, screen, Box::new(config.encoder()))
        .unwrap();

    let options = ActionOptions::new().with("window", OptionValue::Int(2));
    capture.capture_action(&mut compositor, &options);
    compositor.paint_damaged();

    let image = image::open(&config.output_path).unwrap().into_rgba8();
    assert_eq!(image.dimensions(), (3, 4));
    assert!(image.pixels().all(|pixel| pixel.0 == [0, 200, 100, 255]));

    fs::remove_dir_all(dir).unwrap();
}
