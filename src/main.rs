mod adjust;
mod app;
mod color;
mod error;
mod image_io;
mod pipeline;
mod session;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Tonematch"),
        ..Default::default()
    };

    eframe::run_native(
        "Tonematch",
        options,
        Box::new(|cc| Ok(Box::new(app::TonematchApp::new(cc)))),
    )
}
