//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    use emojiart_app::{App, AppConfig, Frontend, WindowApp};
    use emojiart_core::HttpFetcher;
    use std::io::{self, BufReader};
    use std::time::Duration;

    env_logger::init();
    log::info!("Starting EmojiArt");

    let mut config = AppConfig::load();
    if std::env::args().skip(1).any(|arg| arg == "--stdio") {
        config.frontend = Frontend::Stdio;
    }

    let fetcher = match HttpFetcher::with_timeout(Duration::from_secs(config.fetch_timeout_secs)) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            log::error!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let result = match config.frontend {
        Frontend::Window => WindowApp::new(config, fetcher).run(),
        Frontend::Stdio => App::new(config, fetcher).run(BufReader::new(io::stdin()), io::stdout().lock()),
    };
    if let Err(e) = result {
        log::error!("EmojiArt stopped: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
