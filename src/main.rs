//! Binary entry point: resolve paths, start logging, load the library and
//! hand control to the Ratatui event loop.
use anyhow::Context;
use library_manager::{logging, run_app, App, AppConfig, LibraryStore, OpenLibraryClient};
use log::info;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::resolve()?;
    logging::init(&config)?;
    info!("starting with library {}", config.library_path.display());

    let store = LibraryStore::open(&config.library_path).with_context(|| {
        format!("failed to load library {}", config.library_path.display())
    })?;
    let catalog = OpenLibraryClient::new(&config);

    let mut app = App::new(store, Box::new(catalog));
    run_app(&mut app)
}
