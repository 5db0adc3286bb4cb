//! LED Service Protocol
//!
//! Identifiers and payload layout for the blinky peripheral's LED GATT
//! service. These must match the firmware exactly.

use uuid::{uuid, Uuid};

/// LED service
pub const LED_SERVICE_UUID: Uuid = uuid!("27f65506-2524-4df3-803a-5f74e5a32ada");

/// Bit-mask characteristic - two bytes, orange group then red group
pub const LED_BITS_CHAR_UUID: Uuid = uuid!("1e0b46a6-7f06-4fc6-a66e-a054b158828d");

/// Blink-mode characteristic - a single mode byte
pub const LED_MODE_CHAR_UUID: Uuid = uuid!("d5dc531e-0c9a-4cd9-a696-4bcb8c5be548");

/// Per-group LED switch states, one bit per switch.
///
/// Built fresh from the current UI state on every toggle, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedBitMask {
    pub orange: u8,
    pub red: u8,
}

impl LedBitMask {
    pub fn new(orange: u8, red: u8) -> Self {
        Self { orange, red }
    }

    /// Fold eight switch states into a group mask, switch 1 at bit 0.
    pub fn group_mask(switches: &[bool; 8]) -> u8 {
        switches
            .iter()
            .enumerate()
            .fold(0, |mask, (bit, on)| mask | ((*on as u8) << bit))
    }

    /// Wire payload: byte 0 orange, byte 1 red.
    pub fn payload(self) -> [u8; 2] {
        [self.orange, self.red]
    }
}

/// Wire payload for a blink-mode selection.
pub fn blink_mode_payload(mode: u8) -> [u8; 1] {
    [mode]
}

/// Blink patterns understood by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkMode {
    Stop,
    Color1,
    Color2,
    Color3,
    Color4,
    Color5,
    Left,
    Right,
}

impl BlinkMode {
    pub const ALL: [BlinkMode; 8] = [
        Self::Stop,
        Self::Color1,
        Self::Color2,
        Self::Color3,
        Self::Color4,
        Self::Color5,
        Self::Left,
        Self::Right,
    ];

    /// The mode byte sent over the air.
    pub fn value(self) -> u8 {
        match self {
            Self::Stop => 0,
            Self::Color1 => 1,
            Self::Color2 => 2,
            Self::Color3 => 3,
            Self::Color4 => 4,
            Self::Color5 => 5,
            Self::Left => 11,
            Self::Right => 12,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Stop => "Stop",
            Self::Color1 => "1",
            Self::Color2 => "2",
            Self::Color3 => "3",
            Self::Color4 => "4",
            Self::Color5 => "5",
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_mask_payload() {
        assert_eq!(LedBitMask::new(0xB0, 0x01).payload(), [0xB0, 0x01]);
        assert_eq!(LedBitMask::default().payload(), [0x00, 0x00]);
    }

    #[test]
    fn test_group_mask_bit_order() {
        let mut switches = [false; 8];
        switches[0] = true;
        switches[5] = true;
        assert_eq!(LedBitMask::group_mask(&switches), 0b0010_0001);
        assert_eq!(LedBitMask::group_mask(&[true; 8]), 0xFF);
    }

    #[test]
    fn test_blink_mode_values() {
        assert_eq!(BlinkMode::Stop.value(), 0);
        assert_eq!(BlinkMode::Color5.value(), 5);
        assert_eq!(BlinkMode::Left.value(), 11);
        assert_eq!(BlinkMode::Right.value(), 12);
    }

    #[test]
    fn test_blink_mode_payload() {
        assert_eq!(blink_mode_payload(BlinkMode::Right.value()), [0x0C]);
    }
}
