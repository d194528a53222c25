mod app;
mod io;
mod model;

use app::{configure_fonts, DesktopApp};
use catalog_recon::config::Config;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().unwrap_or_else(|err| {
        log::warn!("config load failed, using defaults: {err}");
        Config::default()
    });

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Catalog Recon",
        options,
        Box::new(move |cc| {
            configure_fonts(&cc.egui_ctx);
            Box::new(DesktopApp::new(&config))
        }),
    )
}
