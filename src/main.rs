mod application;
mod clock;
mod config;
mod datauri;
mod favorites;
mod http;
mod image;
mod preferences;
mod search;
mod storage;
mod user_config;
mod weather;
mod window;

use gtk4::prelude::*;

fn main() -> glib::ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}", config::APP_NAME, config::APP_VERSION);

    let app = application::StartpageApplication::new();
    app.run()
}
