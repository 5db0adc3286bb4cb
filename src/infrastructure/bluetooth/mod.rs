//! Bluetooth Module
//!
//! BLE central-role plumbing for the blinky LED peripheral.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   BluetoothService                       │
//! │  (worker loop - every state mutation happens here)       │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┼──────────────┐
//!         │             │              │
//!         ▼             ▼              ▼
//! ┌────────────┐  ┌────────────┐  ┌───────────┐
//! │ Connection │  │ Dispatcher │  │  Scanner  │
//! │  Manager   │  │            │  │           │
//! │ - link     │  │ - LED bits │  │ - device  │
//! │   state    │  │ - blink    │  │   picker  │
//! │ - catalog  │  │   mode     │  │           │
//! └─────┬──────┘  └────────────┘  └───────────┘
//!       │
//!       ▼
//! ┌────────────┐
//! │ BlePlatform│  (trait; btleplug backend, mock in tests)
//! └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`protocol`] - LED service identifiers and payload layout
//! - [`platform`] - radio abstraction the state machine runs against
//! - [`catalog`] - lookup over the latest discovery result
//! - [`connection`] - link state machine
//! - [`dispatcher`] - UI intents to best-effort characteristic writes
//! - [`backend`] - btleplug implementation of the platform
//! - [`scanner`] - name-filtered scan for the device picker
//! - [`service`] - worker loop coordinating all of the above

pub mod backend;
pub mod catalog;
pub mod connection;
pub mod dispatcher;
pub mod platform;
pub mod protocol;
pub mod scanner;
pub mod service;

// Re-export main service for convenience
pub use service::BluetoothService;
