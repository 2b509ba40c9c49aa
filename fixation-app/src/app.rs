use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use fixation_core::{Display, Key, Keyboard, Stimulus, StimulusLayout};
use fixation_render::{FieldImages, SkiaRenderer};
use fixation_timing::{CalibrationStats, HighPrecisionTimer};
use log::{debug, info, trace, warn};
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Fullscreen, Window, WindowId},
};

/// What the event loop reports between two pumps.
#[derive(Default)]
struct WindowState {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    size: PhysicalSize<u32>,
    scale_factor: f64,
    refresh_rate: Option<f64>,
    pressed: Vec<Key>,
    resized: Option<PhysicalSize<u32>>,
    close_requested: bool,
    error: Option<anyhow::Error>,
}

impl WindowState {
    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("No monitor available"))?;

        self.refresh_rate = primary_monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let window_attributes = Window::default_attributes()
            .with_title("Fixation Training")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor.clone()))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.size = physical_size;
        self.scale_factor = window.scale_factor();

        info!(
            "display: {}×{} px, scale factor {:.2}, refresh {}",
            physical_size.width,
            physical_size.height,
            self.scale_factor,
            self.refresh_rate
                .map_or_else(|| "unknown".to_string(), |hz| format!("{hz:.1} Hz"))
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);

        window.set_cursor_visible(false);
        self.window = Some(window);
        Ok(())
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.error = Some(e.context("Failed to create window and surface"));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                if let Some(key) = map_key(event.physical_key) {
                    self.pressed.push(key);
                }
            }
            WindowEvent::Resized(size) => self.resized = Some(size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    self.resized = Some(window.inner_size());
                }
            }
            _ => {}
        }
    }
}

fn map_key(key: PhysicalKey) -> Option<Key> {
    match key {
        PhysicalKey::Code(KeyCode::Space) => Some(Key::Space),
        PhysicalKey::Code(KeyCode::Enter) => Some(Key::Return),
        PhysicalKey::Code(KeyCode::Escape) => Some(Key::Escape),
        PhysicalKey::Code(KeyCode::KeyQ) => Some(Key::Q),
        _ => None,
    }
}

struct Backend {
    event_loop: EventLoop<()>,
    state: WindowState,
    renderer: SkiaRenderer,
    queue: Vec<Stimulus>,
    frames: HighPrecisionTimer,
    last_present: Option<Instant>,
    quit_key: Key,
}

impl Backend {
    fn pump(&mut self, timeout: Option<Duration>) -> Result<()> {
        let status = self.event_loop.pump_app_events(timeout, &mut self.state);
        if let Some(e) = self.state.error.take() {
            return Err(e);
        }
        if let PumpStatus::Exit(code) = status {
            debug!("event loop exited with code {code}");
            self.state.close_requested = true;
        }
        if let Some(size) = self.state.resized.take() {
            self.handle_resize(size);
        }
        Ok(())
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size == self.state.size || new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.state.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!("Failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!("Failed to resize buffer: {e}");
            }
        }
        if let Err(e) = self.renderer.resize(new_size.width, new_size.height) {
            warn!("Failed to resize canvas: {e}");
        }
        self.state.size = new_size;
        info!("Display resized to: {}×{}", new_size.width, new_size.height);
    }

    fn present(&mut self, clear: bool) -> Result<()> {
        self.pump(Some(Duration::ZERO))?;
        if clear {
            self.queue.clear();
        }

        let pixels = self
            .state
            .pixels
            .as_mut()
            .context("pixel surface is not available")?;
        let stats = self.renderer.render_frame(&self.queue, pixels.frame_mut())?;
        pixels.render()?;
        self.queue.clear();

        let now = Instant::now();
        if let Some(last) = self.last_present.replace(now) {
            self.frames.record_frame(now - last);
        }
        trace!(
            "compose {:.3}ms, copy {:.3}ms, {} primitives",
            stats.compose.as_secs_f64() * 1e3,
            stats.copy.as_secs_f64() * 1e3,
            stats.primitives
        );
        Ok(())
    }

    fn wait_for_key(&mut self, allowed: &[Key]) -> Result<Key> {
        self.state.pressed.clear();
        let key = loop {
            if self.state.close_requested {
                if allowed.contains(&self.quit_key) {
                    break self.quit_key;
                }
                bail!("window closed while waiting for {allowed:?}");
            }
            // Escape always stands in for the quit key
            let quit_key = self.quit_key;
            let hit = self
                .state
                .pressed
                .drain(..)
                .map(|k| if k == Key::Escape { quit_key } else { k })
                .find(|k| allowed.contains(k));
            if let Some(key) = hit {
                break key;
            }
            self.pump(None)?;
        };
        // a blocking wait is not a frame interval
        self.last_present = None;
        Ok(key)
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        if let Some(window) = &self.state.window {
            window.set_cursor_visible(true);
        }
        debug!("window resources released");
    }
}

/// The session window, shared by the display and keyboard roles.
#[derive(Clone)]
pub struct Screen {
    inner: Rc<RefCell<Backend>>,
}

impl Screen {
    /// Opens a borderless fullscreen window on the primary monitor.
    pub fn open(layout: StimulusLayout, fields: &FieldImages, quit_key: Key) -> Result<Self> {
        let mut event_loop = EventLoop::new()?;
        let mut state = WindowState {
            scale_factor: 1.0,
            ..WindowState::default()
        };
        while state.window.is_none() {
            let status = event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut state);
            if let Some(e) = state.error.take() {
                return Err(e);
            }
            if let PumpStatus::Exit(code) = status {
                bail!("event loop exited with code {code} before the window opened");
            }
        }

        let size = state.size;
        let renderer = SkiaRenderer::new(size.width, size.height, layout, fields)?;
        Ok(Self {
            inner: Rc::new(RefCell::new(Backend {
                event_loop,
                state,
                renderer,
                queue: Vec::with_capacity(8),
                frames: HighPrecisionTimer::new(),
                last_present: None,
                quit_key,
            })),
        })
    }

    /// Rasterises texts before their first frame.
    pub fn warm_texts(&self, texts: &[&str]) {
        let mut backend = self.inner.borrow_mut();
        for text in texts {
            backend.renderer.warm_text(text);
        }
    }

    pub fn calibration_stats(&self) -> CalibrationStats {
        self.inner.borrow().frames.calibration_stats()
    }
}

impl Display for Screen {
    fn draw(&mut self, stimulus: Stimulus) -> Result<()> {
        self.inner.borrow_mut().queue.push(stimulus);
        Ok(())
    }

    fn present(&mut self, clear: bool) -> Result<()> {
        self.inner.borrow_mut().present(clear)
    }
}

impl Keyboard for Screen {
    fn wait_for_key(&mut self, allowed: &[Key]) -> Result<Key> {
        self.inner.borrow_mut().wait_for_key(allowed)
    }
}
