use crate::domain::models::BleCommand;
use crate::presentation::app::BlinkyApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut BlinkyApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Settings");
    ui.add_space(20.0);

    ui_device_panel(app, ui);
    ui.add_space(10.0);

    ui_logging_panel(app, ui);
}

fn ui_device_panel(app: &mut BlinkyApp, ui: &mut egui::Ui) {
    Components::card(ui, "Device", |ui| {
        if let Ok(mut settings) = app.settings.lock() {
            let settings_mut = settings.get_mut();
            ui.horizontal(|ui| {
                ui.label("Name filter:");
                ui.text_edit_singleline(&mut settings_mut.device_name_filter);
            });
            let current = settings_mut.device_address.as_deref().unwrap_or("none");
            ui.label(format!("Configured device: {}", current));
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if app.is_scanning {
                if ui.button("Stop scan").clicked() {
                    app.is_scanning = false;
                    let _ = app.ble_tx.send(BleCommand::StopScan);
                }
                ui.spinner();
            } else if ui.button("Scan for devices").clicked() {
                app.is_scanning = true;
                app.scanned_devices.clear();
                let _ = app.ble_tx.send(BleCommand::StartScan);
            }
        });

        if !app.scanned_devices.is_empty() {
            ui.separator();
            ui.label("Nearby devices:");
            egui::ScrollArea::vertical()
                .id_salt("scan_results")
                .max_height(140.0)
                .show(ui, |ui| {
                    let mut picked: Option<String> = None;
                    for device in &app.scanned_devices {
                        ui.horizontal(|ui| {
                            let rssi = device
                                .rssi
                                .map_or(String::new(), |r| format!(" ({} dBm)", r));
                            ui.label(format!("{} [{}]{}", device.name, device.address, rssi));
                            if ui.button("Pick").clicked() {
                                picked = Some(device.address.clone());
                            }
                        });
                    }
                    if let Some(address) = picked {
                        if let Ok(mut settings) = app.settings.lock() {
                            if let Err(e) = settings.set_device_address(address) {
                                tracing::warn!("Failed to store device address: {}", e);
                            }
                        }
                        app.is_scanning = false;
                        let _ = app.ble_tx.send(BleCommand::StopScan);
                    }
                });
        }
    });
}

fn ui_logging_panel(app: &mut BlinkyApp, ui: &mut egui::Ui) {
    Components::card(ui, "Logging", |ui| {
        let Ok(mut settings) = app.settings.lock() else {
            return;
        };
        let settings_mut = settings.get_mut();

        ui.horizontal(|ui| {
            ui.label("Verbosity level:");
            egui::ComboBox::from_id_salt("log_level")
                .selected_text(&settings_mut.log_settings.level)
                .show_ui(ui, |ui| {
                    for level in &["trace", "debug", "info", "warn", "error"] {
                        ui.selectable_value(
                            &mut settings_mut.log_settings.level,
                            level.to_string(),
                            *level,
                        );
                    }
                });
        });

        ui.checkbox(
            &mut settings_mut.log_settings.console_logging_enabled,
            "Console logs",
        );
        ui.checkbox(
            &mut settings_mut.log_settings.file_logging_enabled,
            "Persistent file logs",
        );

        if settings_mut.log_settings.file_logging_enabled {
            ui.indent("file_logs", |ui| {
                ui.horizontal(|ui| {
                    ui.label("Save path:");
                    ui.text_edit_singleline(&mut settings_mut.log_settings.log_dir);
                });
                ui.horizontal(|ui| {
                    ui.label("Rotation:");
                    egui::ComboBox::from_id_salt("log_rot")
                        .selected_text(&settings_mut.log_settings.rotation)
                        .show_ui(ui, |ui| {
                            for rot in &["daily", "hourly", "never"] {
                                ui.selectable_value(
                                    &mut settings_mut.log_settings.rotation,
                                    rot.to_string(),
                                    *rot,
                                );
                            }
                        });
                });
            });
            ui.label(
                egui::RichText::new("Restart required for log changes.")
                    .italics()
                    .size(12.0),
            );
        }
    });
}
