//! Device Picker Scan
//!
//! Streams nearby peripherals whose advertised name matches the configured
//! filter so the settings screen can offer them for selection. Picking one
//! persists its address; the connection itself only happens on the next
//! refresh.

use crate::domain::models::{AppEvent, ScannedDevice};
use anyhow::Result;
use btleplug::api::{Central, Peripheral as _, ScanFilter};
use btleplug::platform::Adapter;
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// How long one picker scan runs before stopping on its own.
const SCAN_WINDOW: Duration = Duration::from_secs(12);

const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct DeviceScanner {
    adapter: Option<Adapter>,
    handle: Handle,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    active: Option<Arc<AtomicBool>>,
}

impl DeviceScanner {
    pub fn new(adapter: Option<Adapter>, event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            adapter,
            handle: Handle::current(),
            event_sender,
            active: None,
        }
    }

    /// Start scanning for devices whose name matches `filter`. Any scan
    /// already running is stopped first.
    pub fn start(&mut self, filter: Regex) {
        self.stop();

        let Some(adapter) = self.adapter.clone() else {
            warn!("Cannot scan, no bluetooth adapter");
            let _ = self.event_sender.send(AppEvent::ScanStopped);
            return;
        };

        info!("Scanning for devices matching {:?}", filter.as_str());
        let running = Arc::new(AtomicBool::new(true));
        self.active = Some(running.clone());

        let events = self.event_sender.clone();
        self.handle.spawn(async move {
            if let Err(e) = run_scan(&adapter, &filter, &running, &events).await {
                warn!("Device scan failed: {:#}", e);
            }
            running.store(false, Ordering::SeqCst);
            let _ = events.send(AppEvent::ScanStopped);
        });
    }

    /// Stop scanning
    pub fn stop(&mut self) {
        if let Some(running) = self.active.take() {
            info!("Stopping device scan");
            running.store(false, Ordering::SeqCst);
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|running| running.load(Ordering::SeqCst))
    }
}

impl Drop for DeviceScanner {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_scan(
    adapter: &Adapter,
    filter: &Regex,
    running: &AtomicBool,
    events: &mpsc::UnboundedSender<AppEvent>,
) -> Result<()> {
    adapter.start_scan(ScanFilter::default()).await?;

    let deadline = tokio::time::Instant::now() + SCAN_WINDOW;
    while running.load(Ordering::SeqCst) && tokio::time::Instant::now() < deadline {
        for peripheral in adapter.peripherals().await? {
            let Some(properties) = peripheral.properties().await? else {
                continue;
            };
            let Some(name) = properties.local_name else {
                continue;
            };
            if !filter.is_match(&name) {
                continue;
            }
            let _ = events.send(AppEvent::DeviceFound(ScannedDevice {
                name,
                address: peripheral.address().to_string(),
                rssi: properties.rssi,
            }));
        }
        tokio::time::sleep(SCAN_POLL_INTERVAL).await;
    }

    adapter.stop_scan().await?;
    Ok(())
}
