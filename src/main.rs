mod app;
mod preview;
mod upload;
mod utils;

use tracing::error;
use tracing_subscriber::EnvFilter;

use app::PdfUploader;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([600.0, 700.0])
            .with_min_inner_size([400.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "PDF Upload Tool",
        options,
        Box::new(|cc| Box::new(PdfUploader::new(cc))),
    ) {
        error!(error = %e, "failed to start UI");
    }
}
