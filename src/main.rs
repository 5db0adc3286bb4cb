mod domain;
mod infrastructure;
mod presentation;

use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([460.0, 680.0])
            .with_title("Blinky Control"),
        ..Default::default()
    };

    eframe::run_native(
        "Blinky Control",
        options,
        Box::new(|cc| Ok(Box::new(presentation::app::BlinkyApp::new(cc)))),
    )
}
