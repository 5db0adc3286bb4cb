use crate::domain::models::BleCommand;
use crate::infrastructure::bluetooth::protocol::BlinkMode;
use crate::presentation::app::BlinkyApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut BlinkyApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Blinky Control");
    ui.add_space(20.0);

    ui_connection_panel(app, ui);
    ui.add_space(15.0);

    ui_switch_panel(app, ui);
    ui.add_space(15.0);

    ui_blink_mode_panel(app, ui);
}

fn ui_connection_panel(app: &mut BlinkyApp, ui: &mut egui::Ui) {
    Components::card(ui, "Connection", |ui| {
        let (status_text, bg_color, text_color) = if app.controls_enabled {
            (
                "CONNECTED",
                egui::Color32::from_rgb(0, 200, 0),
                egui::Color32::BLACK,
            )
        } else {
            (
                "DISCONNECTED",
                egui::Color32::from_gray(100),
                egui::Color32::WHITE,
            )
        };
        Components::status_banner(ui, status_text, bg_color, text_color);

        ui.add_space(10.0);
        let address = app
            .device_address_label
            .as_deref()
            .unwrap_or("not configured");
        ui.label(format!("Device address: {}", address));

        if ui.button("Refresh connection").clicked() {
            let _ = app.ble_tx.send(BleCommand::Refresh);
        }
    });
}

fn ui_switch_panel(app: &mut BlinkyApp, ui: &mut egui::Ui) {
    Components::card(ui, "LED Switches", |ui| {
        ui.add_enabled_ui(app.controls_enabled, |ui| {
            let mut changed = false;
            egui::Grid::new("led_switches")
                .spacing([40.0, 6.0])
                .show(ui, |ui| {
                    for i in 0..8 {
                        changed |= ui
                            .checkbox(&mut app.orange_switches[i], format!("Orange {}", i + 1))
                            .changed();
                        changed |= ui
                            .checkbox(&mut app.red_switches[i], format!("Red {}", i + 1))
                            .changed();
                        ui.end_row();
                    }
                });
            if changed {
                app.send_led_bits();
            }
        });
    });
}

fn ui_blink_mode_panel(app: &mut BlinkyApp, ui: &mut egui::Ui) {
    Components::card(ui, "Blink Mode", |ui| {
        ui.add_enabled_ui(app.controls_enabled, |ui| {
            ui.horizontal_wrapped(|ui| {
                for mode in BlinkMode::ALL {
                    if ui.button(mode.label()).clicked() {
                        let _ = app.ble_tx.send(BleCommand::SetBlinkMode(mode.value()));
                    }
                }
            });
        });
    });
}
