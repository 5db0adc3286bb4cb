//! Bluetooth Worker
//!
//! The single serialized context that owns the connection manager. Every
//! state mutation happens on this loop, whether it came from a UI command or
//! a platform callback, so a user action can never race an in-flight state
//! transition. UI-visible effects leave through the [`AppEvent`] channel.

use crate::domain::models::{AppEvent, BleCommand, LinkEvent};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::backend::BtleplugPlatform;
use crate::infrastructure::bluetooth::connection::ConnectionManager;
use crate::infrastructure::bluetooth::dispatcher::CommandDispatcher;
use crate::infrastructure::bluetooth::scanner::DeviceScanner;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::warn;

pub struct BluetoothService {
    manager: ConnectionManager<BtleplugPlatform>,
    scanner: DeviceScanner,
    settings: Arc<Mutex<SettingsService>>,
    commands: mpsc::UnboundedReceiver<BleCommand>,
    link_events: mpsc::UnboundedReceiver<LinkEvent>,
}

impl BluetoothService {
    pub async fn new(
        settings: Arc<Mutex<SettingsService>>,
        commands: mpsc::UnboundedReceiver<BleCommand>,
        app_events: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self> {
        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let platform = BtleplugPlatform::new(link_tx).await?;
        let scanner = DeviceScanner::new(platform.adapter(), app_events.clone());
        let manager = ConnectionManager::new(platform, app_events);

        Ok(Self {
            manager,
            scanner,
            settings,
            commands,
            link_events: link_rx,
        })
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        // UI is gone
                        break;
                    };
                    self.handle_command(command);
                }
                Some(event) = self.link_events.recv() => {
                    self.manager.handle_event(event);
                }
            }
        }
        self.manager.teardown();
    }

    fn handle_command(&mut self, command: BleCommand) {
        match command {
            BleCommand::Refresh => self.refresh(),
            BleCommand::SetLedBits { orange, red } => {
                CommandDispatcher::new(&mut self.manager).set_led_bits(orange, red);
            }
            BleCommand::SetBlinkMode(mode) => {
                CommandDispatcher::new(&mut self.manager).set_blink_mode(mode);
            }
            BleCommand::StartScan => {
                if self.scanner.is_scanning() {
                    return;
                }
                let Ok(settings) = self.settings.lock() else {
                    return;
                };
                let filter = settings.get().name_filter();
                drop(settings);
                self.scanner.start(filter);
            }
            BleCommand::StopScan => self.scanner.stop(),
            BleCommand::Teardown => self.manager.teardown(),
        }
    }

    fn refresh(&mut self) {
        let address = match self.settings.lock() {
            Ok(settings) => settings.get().device_address.clone(),
            Err(_) => return,
        };
        if let Err(e) = self.manager.refresh(address.as_deref()) {
            warn!("Connection refresh aborted: {}", e);
        }
    }
}
