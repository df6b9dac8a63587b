//! A CPU compositor that paints windows through a [`PaintChain`] per screen.

use std::collections::BTreeMap;

use tracing::trace;
use window_capture::{
    Backdrop, Host, OutputFrame, OutputRegion, PaintChain, ReadbackError, Renderer, Rgba,
    AllocationError, RgbaBuffer, ScreenId, WindowId, WindowInfo,
};

/// Color the framebuffer is cleared to before each paint.
pub const CLEAR_COLOR: Rgba = Rgba::new(32, 32, 32, 255);

/// A window with straight-alpha contents placed on a screen.
#[derive(Clone, Debug)]
pub struct SimulatedWindow {
    /// Window handle.
    pub id: WindowId,
    /// Screen the window is on.
    pub screen: ScreenId,
    /// Left edge relative to the screen's output.
    pub x: i32,
    /// Top edge relative to the screen's output.
    pub y: i32,
    /// Window contents.
    pub contents: RgbaBuffer,
}

impl SimulatedWindow {
    /// A window filled with one color.
    pub fn solid(
        id: u64,
        screen: ScreenId,
        position: [i32; 2],
        size: [u32; 2],
        color: Rgba,
    ) -> Result<Self, AllocationError> {
        let mut contents = RgbaBuffer::try_new(size[0], size[1])?;
        contents.pixels_mut().fill(color);

        Ok(Self::new(id, screen, position, contents))
    }

    /// A window with the given contents.
    pub fn new(id: u64, screen: ScreenId, position: [i32; 2], contents: RgbaBuffer) -> Self {
        Self {
            id: WindowId(id),
            screen,
            x: position[0],
            y: position[1],
            contents,
        }
    }
}

struct SimulatedScreen {
    region: OutputRegion,
    chain: PaintChain,
    /// Framebuffer covering `framebuffer_size`, which is the output size unless headless.
    framebuffer: Vec<Rgba>,
    framebuffer_size: [u32; 2],
    draws: Vec<WindowId>,
    fail_readback: bool,
}

/// The software renderer used while one screen is painted.
struct SoftwareRenderer<'a> {
    screen: ScreenId,
    framebuffer: &'a mut [Rgba],
    framebuffer_size: [u32; 2],
    windows: &'a [SimulatedWindow],
    draws: &'a mut Vec<WindowId>,
    fail_readback: bool,
}

/// Integer "over" compositing of one straight-alpha channel onto an opaque one.
fn over(source: u8, alpha: u8, destination: u8) -> u8 {
    let source = u32::from(source);
    let alpha = u32::from(alpha);
    let destination = u32::from(destination);

    ((source * alpha + destination * (255 - alpha)) / 255) as u8
}

impl SoftwareRenderer<'_> {
    /// Framebuffer index for an output coordinate, `None` if clipped.
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let [width, height] = self.framebuffer_size;
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            return None;
        }

        Some(y as usize * width as usize + x as usize)
    }
}

impl Renderer for SoftwareRenderer<'_> {
    fn fill_output(&mut self, region: OutputRegion, backdrop: Backdrop) {
        let color = backdrop.color();
        let [width, height] = self.framebuffer_size;

        for y in 0..region.height.min(height) {
            for x in 0..region.width.min(width) {
                if let Some(index) = self.index(i64::from(x), i64::from(y)) {
                    self.framebuffer[index] = color;
                }
            }
        }
    }

    fn stacking_order(&self) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|window| window.screen == self.screen)
            .map(|window| window.id)
            .collect()
    }

    fn draw_window(&mut self, window: WindowId) -> bool {
        let Some(window) = self.windows.iter().find(|candidate| candidate.id == window) else {
            return false;
        };
        self.draws.push(window.id);
        trace!("Drawing window {}", window.id.0);

        for y in 0..window.contents.height() {
            for x in 0..window.contents.width() {
                let target_x = i64::from(window.x) + i64::from(x);
                let target_y = i64::from(window.y) + i64::from(y);
                let Some(index) = self.index(target_x, target_y) else {
                    continue;
                };

                let source = window.contents.pixel(x, y);
                let destination = self.framebuffer[index];
                self.framebuffer[index] = Rgba::new(
                    over(source.r, source.a, destination.r),
                    over(source.g, source.a, destination.g),
                    over(source.b, source.a, destination.b),
                    255,
                );
            }
        }

        true
    }

    fn read_pixels(
        &mut self,
        region: OutputRegion,
        pixels: &mut [Rgba],
    ) -> Result<(), ReadbackError> {
        if self.fail_readback {
            return Err(ReadbackError::new(region, "readback disabled"));
        }
        if pixels.len() != region.pixel_count() || pixels.len() != self.framebuffer.len() {
            return Err(ReadbackError::new(region, "region does not match the framebuffer"));
        }

        pixels.copy_from_slice(&*self.framebuffer);
        Ok(())
    }
}

/// A display of simulated screens and windows.
#[derive(Default)]
pub struct Compositor {
    screens: BTreeMap<ScreenId, SimulatedScreen>,
    windows: Vec<SimulatedWindow>,
    damaged: Vec<ScreenId>,
}

impl Compositor {
    /// Create an empty display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a screen with a framebuffer covering `region`.
    pub fn add_screen(&mut self, screen: ScreenId, region: OutputRegion) {
        let framebuffer = vec![CLEAR_COLOR; region.pixel_count()];
        self.insert_screen(screen, region, framebuffer, [region.width, region.height]);
    }

    /// Add a screen with no framebuffer behind its output, nothing is ever drawn to it and
    /// reading it back fails.
    pub fn add_headless_screen(&mut self, screen: ScreenId, region: OutputRegion) {
        self.insert_screen(screen, region, Vec::new(), [0, 0]);
    }

    fn insert_screen(
        &mut self,
        screen: ScreenId,
        region: OutputRegion,
        framebuffer: Vec<Rgba>,
        framebuffer_size: [u32; 2],
    ) {
        self.screens.insert(
            screen,
            SimulatedScreen {
                region,
                chain: PaintChain::new(),
                framebuffer,
                framebuffer_size,
                draws: Vec::new(),
                fail_readback: false,
            },
        );
    }

    /// Add a window on top of the stack.
    pub fn add_window(&mut self, window: SimulatedWindow) {
        self.windows.push(window);
    }

    /// Make pixel readback of a screen fail.
    pub fn set_fail_readback(&mut self, screen: ScreenId, fail: bool) {
        if let Some(state) = self.screens.get_mut(&screen) {
            state.fail_readback = fail;
        }
    }

    /// Screens damaged since the last paint, oldest first.
    pub fn damaged(&self) -> &[ScreenId] {
        &self.damaged
    }

    /// Windows drawn during the last paint of `screen`, in draw order.
    pub fn draws(&self, screen: ScreenId) -> &[WindowId] {
        self.screens
            .get(&screen)
            .map_or(&[], |state| state.draws.as_slice())
    }

    /// The framebuffer of `screen` after its last paint.
    pub fn framebuffer(&self, screen: ScreenId) -> &[Rgba] {
        self.screens
            .get(&screen)
            .map_or(&[], |state| state.framebuffer.as_slice())
    }

    /// Paint one screen through its paint chain.
    pub fn paint_screen(&mut self, screen: ScreenId) -> bool {
        self.paint(screen, None)
    }

    /// Repaint one window of a screen on top of its last paint, through the window stages.
    pub fn paint_window(&mut self, screen: ScreenId, window: WindowId) -> bool {
        self.paint(screen, Some(window))
    }

    fn paint(&mut self, screen: ScreenId, window: Option<WindowId>) -> bool {
        let Some(state) = self.screens.get_mut(&screen) else {
            return false;
        };
        let SimulatedScreen {
            region,
            chain,
            framebuffer,
            framebuffer_size,
            draws,
            fail_readback,
        } = state;

        if window.is_none() {
            framebuffer.fill(CLEAR_COLOR);
        }
        draws.clear();

        let mut renderer = SoftwareRenderer {
            screen,
            framebuffer,
            framebuffer_size: *framebuffer_size,
            windows: &self.windows,
            draws,
            fail_readback: *fail_readback,
        };
        let mut frame = OutputFrame {
            screen,
            region: *region,
            renderer: &mut renderer,
        };

        match window {
            Some(window) => chain.paint_window(window, &mut frame),
            None => chain.paint_output(&mut frame),
        }
    }

    /// Paint every damaged screen once, returns how many were painted.
    pub fn paint_damaged(&mut self) -> usize {
        let mut damaged = core::mem::take(&mut self.damaged);
        damaged.dedup();

        for &screen in &damaged {
            self.paint_screen(screen);
        }

        damaged.len()
    }
}

impl Host for Compositor {
    fn find_window(&self, handle: u64) -> Option<WindowInfo> {
        self.windows
            .iter()
            .find(|window| window.id.0 == handle)
            .map(|window| WindowInfo {
                id: window.id,
                screen: window.screen,
            })
    }

    fn paint_chain_mut(&mut self, screen: ScreenId) -> Option<&mut PaintChain> {
        self.screens.get_mut(&screen).map(|state| &mut state.chain)
    }

    fn damage_screen(&mut self, screen: ScreenId) {
        self.damaged.push(screen);
    }
}

#[cfg(test)]
mod test {
    use window_capture::{OutputRegion, Rgba, ScreenId, WindowId};

    use super::{CLEAR_COLOR, Compositor, SimulatedWindow};

    #[test]
    fn paints_windows_bottom_to_top() {
        let screen = ScreenId(0);
        let mut compositor = Compositor::new();
        compositor.add_screen(screen, OutputRegion::new(0, 0, 3, 1));
        let blue = Rgba::new(0, 0, 255, 255);
        let red = Rgba::new(255, 0, 0, 255);
        compositor.add_window(SimulatedWindow::solid(1, screen, [0, 0], [2, 1], blue).unwrap());
        compositor.add_window(SimulatedWindow::solid(2, screen, [1, 0], [2, 1], red).unwrap());

        assert!(compositor.paint_screen(screen));

        assert_eq!(compositor.framebuffer(screen), [blue, red, red]);

        // Repainting the bottom window alone puts it over the top one.
        assert!(compositor.paint_window(screen, WindowId(1)));
        assert_eq!(compositor.draws(screen), [WindowId(1)]);
        assert_eq!(compositor.framebuffer(screen), [blue, blue, red]);
    }

    #[test]
    fn translucent_windows_blend() {
        let screen = ScreenId(0);
        let mut compositor = Compositor::new();
        compositor.add_screen(screen, OutputRegion::new(0, 0, 2, 1));
        let white = Rgba::new(255, 255, 255, 128);
        compositor.add_window(SimulatedWindow::solid(1, screen, [1, 0], [1, 1], white).unwrap());

        compositor.paint_screen(screen);

        assert_eq!(compositor.framebuffer(screen)[0], CLEAR_COLOR);
        // 255 * 128 / 255 + 32 * 127 / 255 = 143.9
        assert_eq!(compositor.framebuffer(screen)[1], Rgba::new(143, 143, 143, 255));
    }
}
