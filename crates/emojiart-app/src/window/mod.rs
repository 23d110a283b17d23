//! Desktop front end: a winit window with the canvas painted through egui.

mod gpu;
mod input;
mod painter;

use crate::app::{App, AppConfig, AppError};
use emojiart_core::{DropPayload, ImageFetcher};
use gpu::Gpu;
use input::PointerInput;
use kurbo::{Point, Size};
use painter::BackgroundTexture;
use std::path::Path;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

/// Everything that only exists while the window is open.
struct WindowState {
    window: Arc<Window>,
    gpu: Gpu,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    input: PointerInput,
}

/// The app driven by a desktop window.
pub struct WindowApp<F: ImageFetcher> {
    app: App<F>,
    title: String,
    size: LogicalSize<f64>,
    background: BackgroundTexture,
    state: Option<WindowState>,
    /// Set when the window could not be opened.
    error: Option<AppError>,
}

impl<F: ImageFetcher> WindowApp<F> {
    pub fn new(config: AppConfig, fetcher: F) -> Self {
        let title = config.title.clone();
        let size = LogicalSize::new(config.width, config.height);
        let mut app = App::new(config, fetcher);
        let background = BackgroundTexture::new();
        app.subscribe(background.invalidator());
        Self {
            app,
            title,
            size,
            background,
            state: None,
            error: None,
        }
    }

    /// Open the window and run until it is closed.
    pub fn run(mut self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self)?;
        log::info!("Window closed");
        self.error.map_or(Ok(()), Err)
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowState, AppError> {
        let attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(self.size);
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| AppError::Graphics(e.to_string()))?,
        );
        let gpu = Gpu::new(Arc::clone(&window))?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        self.app.set_viewport(viewport_size(&window));
        Ok(WindowState {
            window,
            gpu,
            egui_ctx,
            egui_state,
            input: PointerInput::new(),
        })
    }
}

/// Window content size in logical points; the canvas works in these units.
fn viewport_size(window: &Window) -> Size {
    let size = window.inner_size().to_logical::<f64>(window.scale_factor());
    Size::new(size.width, size.height)
}

fn logical_point(position: PhysicalPosition<f64>, scale_factor: f64) -> Point {
    let position = position.to_logical::<f64>(scale_factor);
    Point::new(position.x, position.y)
}

/// Payloads offered for a file dropped on the window: its bytes as an
/// image, and its contents as text when they are UTF-8.
fn file_payloads(bytes: Vec<u8>) -> Vec<DropPayload> {
    let text = std::str::from_utf8(&bytes)
        .ok()
        .map(|text| DropPayload::Text(text.trim().to_string()));
    std::iter::once(DropPayload::Image(bytes)).chain(text).collect()
}

fn drop_file<F: ImageFetcher>(app: &mut App<F>, path: &Path, location: Point) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to read dropped file {}: {}", path.display(), e);
            return;
        }
    };
    if !app.handle_drop(&file_payloads(bytes), location).accepted {
        log::info!("Dropped file {} is neither an image nor emoji", path.display());
    }
}

fn redraw<F: ImageFetcher>(state: &mut WindowState, app: &mut App<F>, background: &mut BackgroundTexture) {
    let raw_input = state.egui_state.take_egui_input(&state.window);
    let output = state.egui_ctx.run(raw_input, |ctx| {
        let scene = app.scene();
        let texture = background.get(ctx, app.document().background_image());
        painter::paint_scene(ctx, &scene, texture);
        if let Some((index, at)) = painter::palette_strip(ctx, app.canvas().palette()) {
            app.palette_drop(index, Point::new(f64::from(at.x), f64::from(at.y)));
        }
    });

    state
        .egui_state
        .handle_platform_output(&state.window, output.platform_output);
    let primitives = state.egui_ctx.tessellate(output.shapes, output.pixels_per_point);
    state
        .gpu
        .paint(&primitives, &output.textures_delta, output.pixels_per_point);
    state.window.request_redraw();
}

impl<F: ImageFetcher> ApplicationHandler for WindowApp<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        log::info!("Creating window...");
        match self.open(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Failed to open window: {}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let egui_response = state.egui_state.on_window_event(&state.window, &event);
        // Presses that land on the palette or the spinner belong to egui
        let egui_wants_input = egui_response.consumed
            || state.egui_ctx.is_pointer_over_area()
            || state.egui_ctx.wants_pointer_input();
        let scale_factor = state.window.scale_factor();

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.gpu.resize(size.width, size.height);
                self.app.set_viewport(viewport_size(&state.window));
                state.window.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                self.app.set_viewport(viewport_size(&state.window));
            }
            WindowEvent::RedrawRequested => redraw(state, &mut self.app, &mut self.background),
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(touch) = state.input.cursor_moved(logical_point(position, scale_factor)) {
                    self.app.handle_touch(touch);
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                if let Some(touch) = state.input.mouse_button(button_state, button, egui_wants_input) {
                    self.app.handle_touch(touch);
                }
            }
            WindowEvent::Touch(touch) => {
                let position = logical_point(touch.location, scale_factor);
                if let Some(event) = state.input.touch(touch.phase, touch.id, position, egui_wants_input) {
                    self.app.handle_touch(event);
                }
            }
            WindowEvent::PinchGesture { delta, phase, .. } => {
                if let Some(gesture) = state.input.pinch(delta, phase, egui_wants_input) {
                    self.app.handle_gesture(gesture);
                }
            }
            WindowEvent::DroppedFile(path) => {
                log::info!("File dropped: {}", path.display());
                drop_file(&mut self.app, &path, state.input.cursor());
            }
            WindowEvent::Focused(false) => {
                for touch in state.input.cancel_all() {
                    self.app.handle_touch(touch);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.app.poll_fetches();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emojiart_core::{FetchCompletion, FetchRequest};

    struct NoFetch;

    impl ImageFetcher for NoFetch {
        fn fetch(&mut self, _request: FetchRequest) {}

        fn poll_completions(&mut self) -> Vec<FetchCompletion> {
            Vec::new()
        }

        fn in_flight(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_file_payloads() {
        let text = file_payloads("  🔥\n".as_bytes().to_vec());
        assert_eq!(
            text,
            vec![DropPayload::Image("  🔥\n".as_bytes().to_vec()), DropPayload::Text("🔥".into())]
        );

        let binary = file_payloads(vec![0x89, b'P', b'N', b'G', 0xff]);
        assert_eq!(binary, vec![DropPayload::Image(vec![0x89, b'P', b'N', b'G', 0xff])]);
    }

    #[test]
    fn test_logical_point_scales() {
        let point = logical_point(PhysicalPosition::new(300.0, 150.0), 2.0);
        assert_eq!(point, Point::new(150.0, 75.0));
    }

    #[test]
    fn test_dropped_text_file_adds_emoji() {
        let path = std::env::temp_dir().join(format!("emojiart-drop-{}.txt", std::process::id()));
        std::fs::write(&path, "🚀").unwrap();

        let config = AppConfig {
            width: 400.0,
            height: 400.0,
            ..AppConfig::default()
        };
        let mut app = App::new(config, NoFetch);
        drop_file(&mut app, &path, Point::new(210.0, 190.0));
        drop_file(&mut app, Path::new("/nonexistent/emojiart.png"), Point::ZERO);
        std::fs::remove_file(&path).unwrap();

        let emojis = app.document().emojis();
        assert_eq!(emojis.len(), 1);
        assert_eq!(emojis[0].text(), "🚀");
        assert_eq!(emojis[0].position(), emojiart_core::LogicalPoint::new(10, -10));
    }
}
