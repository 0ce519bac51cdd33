mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use app::DashboardApp;
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();

    let path = dataset_path().context("no dataset file given or selected")?;
    let dataset = data::loader::load(&path)
        .with_context(|| format!("loading dataset from {}", path.display()))?;
    log::info!(
        "Loaded {} listings across {} cities and {} property types",
        dataset.len(),
        dataset.cities.len(),
        dataset.property_types.len()
    );
    let dataset = Arc::new(dataset);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Housing Market Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe: {e}"))
}

/// Dataset path from the first CLI argument, falling back to a native file
/// dialog. `None` means the user cancelled the dialog.
fn dataset_path() -> Option<PathBuf> {
    if let Some(arg) = std::env::args().nth(1) {
        return Some(PathBuf::from(arg));
    }
    rfd::FileDialog::new()
        .set_title("Open housing listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
