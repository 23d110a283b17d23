//! EmojiArt Application
//!
//! The application shell around the canvas core. It opens a desktop window
//! with the palette strip, or reads input events as JSON lines and writes a
//! scene after every change. Either way backgrounds are fetched off-thread.

mod app;
mod event;
#[cfg(feature = "native")]
mod window;

pub use app::{App, AppConfig, AppError, CONFIG_ENV_VAR, Frontend};
pub use event::{AppEvent, WirePayload};
#[cfg(feature = "native")]
pub use window::WindowApp;
