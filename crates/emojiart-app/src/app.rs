//! Main application logic.

use crate::event::AppEvent;
use emojiart_core::{
    CanvasConfig, DEFAULT_FETCH_TIMEOUT_SECS, DocumentEvent, DropOutcome, DropPayload, EmojiArtCanvas,
    EmojiArtDocument, Gesture, ImageFetcher, Scene, SubscriptionId, TouchEvent,
};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, ErrorKind, Write};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "EMOJIART_CONFIG";

/// How often the loop checks for finished fetches while waiting for input.
const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Errors that stop the app loop or reject a single event.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed event: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed image payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Graphics error: {0}")]
    Graphics(String),
    #[cfg(feature = "native")]
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Which front end drives the app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frontend {
    /// A desktop window with the palette strip.
    #[default]
    Window,
    /// JSON lines on stdin, scenes on stdout.
    Stdio,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window title.
    pub title: String,
    /// Initial viewport size, until the host sends a resize.
    pub width: f64,
    pub height: f64,
    pub frontend: Frontend,
    pub fetch_timeout_secs: u64,
    pub canvas: CanvasConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "EmojiArt".to_string(),
            width: 1280.0,
            height: 800.0,
            frontend: Frontend::default(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            canvas: CanvasConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from the file named by `EMOJIART_CONFIG`, falling back to defaults.
    pub fn load() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config {}: {}; using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read config {}: {}; using defaults", path, e);
                Self::default()
            }
        }
    }
}

/// Main application: one document, one canvas view, one fetcher.
pub struct App<F: ImageFetcher> {
    document: EmojiArtDocument,
    canvas: EmojiArtCanvas,
    fetcher: F,
}

impl<F: ImageFetcher> App<F> {
    pub fn new(config: AppConfig, fetcher: F) -> Self {
        let mut document = EmojiArtDocument::new();
        let mut canvas = EmojiArtCanvas::new(config.canvas);
        canvas.set_viewport_size(Size::new(config.width, config.height));
        canvas.observe(&mut document);
        Self {
            document,
            canvas,
            fetcher,
        }
    }

    pub fn document(&self) -> &EmojiArtDocument {
        &self.document
    }

    pub fn canvas(&self) -> &EmojiArtCanvas {
        &self.canvas
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Watch document changes from outside the canvas.
    pub fn subscribe(&mut self, observer: impl FnMut(&DocumentEvent) + 'static) -> SubscriptionId {
        self.document.subscribe(observer)
    }

    pub fn set_viewport(&mut self, size: Size) {
        self.canvas.set_viewport_size(size);
    }

    pub fn handle_touch(&mut self, touch: TouchEvent) {
        self.canvas.handle_touch(&mut self.document, touch);
    }

    /// Apply an already recognized gesture, e.g. a trackpad pinch.
    pub fn handle_gesture(&mut self, gesture: Gesture) {
        self.canvas.handle_gesture(&mut self.document, gesture);
    }

    pub fn cancel_gestures(&mut self) {
        self.canvas.cancel_gestures();
    }

    /// Drop payloads at a screen location, starting a fetch for URLs.
    pub fn handle_drop(&mut self, payloads: &[DropPayload], location: Point) -> DropOutcome {
        let outcome = self.canvas.drop_payloads(&mut self.document, payloads, location);
        if let Some(request) = outcome.fetch.clone() {
            self.fetcher.fetch(request);
        }
        outcome
    }

    pub fn palette_drop(&mut self, index: usize, location: Point) -> bool {
        let dropped = self.canvas.palette_drop(&mut self.document, index, location);
        if !dropped {
            log::debug!("No palette entry {}", index);
        }
        dropped
    }

    /// Apply one input event.
    pub fn handle_event(&mut self, event: AppEvent) -> Result<(), AppError> {
        match event {
            AppEvent::Resize { width, height } => self.set_viewport(Size::new(width, height)),
            AppEvent::Touch(touch) => self.handle_touch(touch),
            AppEvent::Drop { x, y, payloads } => {
                let payloads = payloads
                    .into_iter()
                    .map(|payload| payload.into_payload())
                    .collect::<Result<Vec<DropPayload>, _>>()?;
                self.handle_drop(&payloads, Point::new(x, y));
            }
            AppEvent::Delete { id } => {
                self.canvas.delete_emoji(&mut self.document, id);
            }
            AppEvent::PaletteDrop { index, x, y } => {
                self.palette_drop(index, Point::new(x, y));
            }
            AppEvent::Cancel => self.cancel_gestures(),
        }
        Ok(())
    }

    /// Parse and apply one line of input. Blank lines are ignored.
    pub fn handle_line(&mut self, line: &str) -> Result<(), AppError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        self.handle_event(AppEvent::from_json(line)?)
    }

    /// Apply finished background fetches. Returns true if any changed the document.
    pub fn poll_fetches(&mut self) -> bool {
        let mut changed = false;
        for completion in self.fetcher.poll_completions() {
            changed |= self.document.complete_fetch(completion);
        }
        changed
    }

    pub fn scene(&self) -> Scene {
        self.canvas.scene(&self.document)
    }

    /// The current scene, if anything changed since the last call.
    pub fn take_scene(&mut self) -> Option<Scene> {
        self.canvas.take_needs_redraw().then(|| self.scene())
    }

    fn emit_scene(&mut self, output: &mut impl Write) -> Result<(), AppError> {
        if let Some(scene) = self.take_scene() {
            serde_json::to_writer(&mut *output, &scene)?;
            output.write_all(b"\n")?;
            output.flush()?;
        }
        Ok(())
    }

    /// Run the event loop until input ends and no fetch is outstanding.
    ///
    /// Input is read on a separate thread so fetch completions are applied
    /// while the host is idle. Malformed or non-UTF-8 lines are logged and
    /// skipped; other read errors end the loop.
    pub fn run(&mut self, input: impl BufRead + Send + 'static, mut output: impl Write) -> Result<(), AppError> {
        let (tx, rx) = channel();
        thread::spawn(move || {
            for line in input.lines() {
                let fatal = matches!(&line, Err(e) if e.kind() != ErrorKind::InvalidData);
                if tx.send(line).is_err() || fatal {
                    break;
                }
            }
        });

        self.emit_scene(&mut output)?;
        let mut input_open = true;
        loop {
            if input_open {
                match rx.recv_timeout(POLL_INTERVAL) {
                    Ok(Ok(line)) => {
                        if let Err(e) = self.handle_line(&line) {
                            log::warn!("Skipping event: {}", e);
                        }
                    }
                    Ok(Err(e)) if e.kind() == ErrorKind::InvalidData => {
                        log::warn!("Skipping unreadable line: {}", e);
                    }
                    Ok(Err(e)) => return Err(e.into()),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        log::debug!("Input closed");
                        input_open = false;
                    }
                }
            } else if self.fetcher.in_flight() == 0 {
                break;
            } else {
                thread::sleep(POLL_INTERVAL);
            }

            self.poll_fetches();
            self.emit_scene(&mut output)?;
        }

        log::info!("Event loop finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emojiart_core::FetchCompletion;

    /// Fetcher that never completes anything.
    #[derive(Default)]
    struct NullFetcher {
        requested: Vec<String>,
    }

    impl ImageFetcher for NullFetcher {
        fn fetch(&mut self, request: emojiart_core::FetchRequest) {
            self.requested.push(request.url.to_string());
        }

        fn poll_completions(&mut self) -> Vec<FetchCompletion> {
            Vec::new()
        }

        fn in_flight(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.frontend, Frontend::Window);
        let parsed = AppConfig::from_json(r#"{"width": 320, "height": 240, "frontend": "stdio"}"#).unwrap();
        assert!((parsed.width - 320.0).abs() < f64::EPSILON);
        assert_eq!(parsed.frontend, Frontend::Stdio);
        assert_eq!(parsed.title, "EmojiArt");
        assert_eq!(parsed.canvas, CanvasConfig::default());
    }

    #[test]
    fn test_subscribe_sees_background_changes() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut app = App::new(AppConfig::default(), NullFetcher::default());
        let changed = Rc::new(Cell::new(0));
        let seen = Rc::clone(&changed);
        app.subscribe(move |event| {
            if *event == DocumentEvent::BackgroundChanged {
                seen.set(seen.get() + 1);
            }
        });

        let outcome = app.handle_drop(&[DropPayload::Url("https://cdn.example.com/b.png".into())], Point::ZERO);
        assert!(outcome.accepted);
        assert_eq!(changed.get(), 1);
        assert_eq!(app.fetcher().requested.len(), 1);

        assert!(app.palette_drop(0, Point::new(640.0, 400.0)));
        assert!(!app.palette_drop(9_999, Point::ZERO));
        assert_eq!(changed.get(), 1);
    }

    #[test]
    fn test_drop_url_starts_fetch() {
        let mut app = App::new(AppConfig::default(), NullFetcher::default());
        app.handle_line(r#"{"type":"drop","x":0,"y":0,"payloads":[{"kind":"url","value":"https://cdn.example.com/a.png"}]}"#)
            .unwrap();
        assert_eq!(app.fetcher().requested, vec!["https://cdn.example.com/a.png".to_string()]);
        assert!(app.scene().loading);
    }

    #[test]
    fn test_malformed_lines() {
        let mut app = App::new(AppConfig::default(), NullFetcher::default());
        assert!(app.handle_line("   ").is_ok());
        assert!(matches!(app.handle_line("{oops"), Err(AppError::Json(_))));
        assert!(matches!(
            app.handle_line(r#"{"type":"drop","x":0,"y":0,"payloads":[{"kind":"image","value":"!!"}]}"#),
            Err(AppError::Base64(_))
        ));
    }

    #[test]
    fn test_take_scene_only_when_changed() {
        let mut app = App::new(AppConfig::default(), NullFetcher::default());
        assert!(app.take_scene().is_some());
        assert!(app.take_scene().is_none());

        app.handle_line(r#"{"type":"palette_drop","index":3,"x":640,"y":400}"#).unwrap();
        let scene = app.take_scene().unwrap();
        assert_eq!(scene.emojis.len(), 1);
        assert_eq!(scene.emojis[0].text, "💉");
    }
}
