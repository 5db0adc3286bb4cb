use crate::domain::models::{AppEvent, BleCommand, ScannedDevice, Tab};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::protocol::LedBitMask;
use crate::infrastructure::bluetooth::BluetoothService;
use eframe::egui;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::error;

pub struct BlinkyApp {
    // Services
    pub(crate) settings: Arc<Mutex<SettingsService>>,

    // Bluetooth
    pub(crate) ble_tx: mpsc::UnboundedSender<BleCommand>,
    pub(crate) app_event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State mirrored from the worker
    pub(crate) controls_enabled: bool,
    pub(crate) device_address_label: Option<String>,

    // UI State
    pub(crate) selected_tab: Tab,
    pub(crate) orange_switches: [bool; 8],
    pub(crate) red_switches: [bool; 8],
    pub(crate) is_scanning: bool,
    pub(crate) scanned_devices: Vec<ScannedDevice>,

    // Logging guard
    pub(crate) _logging_guard: Option<crate::infrastructure::logging::LoggingGuard>,
}

impl BlinkyApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        crate::presentation::theme::configure(&cc.egui_ctx);

        let settings_service = SettingsService::new().expect("Failed to load settings");

        let logging_guard =
            crate::infrastructure::logging::init_logger(&settings_service.get().log_settings)
                .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
                .ok();

        tracing::info!("Starting Blinky Control");

        let settings = Arc::new(Mutex::new(settings_service));
        let (app_tx, app_rx) = mpsc::unbounded_channel();
        let (ble_tx, ble_rx) = mpsc::unbounded_channel();
        let worker_settings = settings.clone();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime for bluetooth");

            rt.block_on(async move {
                match BluetoothService::new(worker_settings, ble_rx, app_tx).await {
                    Ok(service) => service.run().await,
                    Err(e) => error!("Bluetooth worker failed to start: {:#}", e),
                }
            });
        });

        // Same as resuming the original app: try to connect right away
        let _ = ble_tx.send(BleCommand::Refresh);

        Self {
            settings,
            ble_tx,
            app_event_rx: app_rx,
            controls_enabled: false,
            device_address_label: None,
            selected_tab: Tab::Home,
            orange_switches: [false; 8],
            red_switches: [false; 8],
            is_scanning: false,
            scanned_devices: Vec::new(),
            _logging_guard: logging_guard,
        }
    }

    /// Send the masks built from the current switch states.
    pub(crate) fn send_led_bits(&self) {
        let orange = LedBitMask::group_mask(&self.orange_switches);
        let red = LedBitMask::group_mask(&self.red_switches);
        let _ = self.ble_tx.send(BleCommand::SetLedBits { orange, red });
    }
}

impl eframe::App for BlinkyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.app_event_rx.try_recv() {
            match event {
                AppEvent::ControlsEnabled(enabled) => self.controls_enabled = enabled,
                AppEvent::DeviceAddress(address) => self.device_address_label = address,
                AppEvent::DeviceFound(device) => {
                    if let Some(existing) = self
                        .scanned_devices
                        .iter_mut()
                        .find(|d| d.address == device.address)
                    {
                        existing.rssi = device.rssi;
                    } else {
                        self.scanned_devices.push(device);
                    }
                }
                AppEvent::ScanStopped => self.is_scanning = false,
            }
        }

        ctx.request_repaint_after(Duration::from_millis(100));

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Home, "Home");
                ui.selectable_value(&mut self.selected_tab, Tab::Settings, "Settings");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(420.0);
                    ui.add_space(10.0);

                    use crate::presentation::tabs;
                    match self.selected_tab {
                        Tab::Home => tabs::home::render(self, ui),
                        Tab::Settings => tabs::settings::render(self, ui),
                    }

                    ui.add_space(30.0);
                });
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let _ = self.ble_tx.send(BleCommand::Teardown);
        if let Ok(settings) = self.settings.lock() {
            if let Err(e) = settings.save() {
                tracing::warn!("Failed to save settings: {}", e);
            }
        }
    }
}
