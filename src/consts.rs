//! Constants for the reference hardware configuration.
//!
//! This module pins down the values the rest of the crate is built around:
//! the analog front end (reference voltage, resolution, channel order), the
//! telemetry frame layout, and the clocks the trigger timer and serial port
//! derive from.
//!
//! ## Key Concepts
//!
//! - **Channels**: two conversions per trigger, current sense first, voltage sense second.
//! - **Frame**: `[0xA5, voltage_lo, voltage_hi, current_lo, current_hi, crc]`, optionally
//!   followed by two zero bytes of padding.
//! - **Trigger period**: must stay larger than conversion, transfer, framing and the first
//!   byte on the wire. See [`crate::timer::period_covers_frame`].

/// Number of analog channels converted per trigger.
pub const CHANNEL_COUNT: usize = 2;

/// DMA buffer index of the current sense channel.
pub const CURRENT_CHANNEL: usize = 0;

/// DMA buffer index of the voltage sense channel.
pub const VOLTAGE_CHANNEL: usize = 1;

/// ADC reference voltage in millivolts.
pub const ADC_REF_MV: u16 = 3300;

/// Highest code produced by the 12-bit converter.
pub const ADC_FULL_SCALE: u16 = 0x0FFF;

/// Scale from milliamps to microamps used by the current conversion.
pub const MICROAMPS_PER_MILLIAMP: u32 = 1000;

/// Sentinel value opening every telemetry frame.
pub const START_MARKER: u8 = 0xA5;

/// Byte offset of the start marker.
pub const START_OFFSET: usize = 0;

/// Byte offset of the little-endian voltage field.
pub const VOLTAGE_OFFSET: usize = 1;

/// Byte offset of the little-endian current field.
pub const CURRENT_OFFSET: usize = 3;

/// Byte offset of the checksum. The checksum covers every byte before it.
pub const CHECKSUM_OFFSET: usize = 5;

/// Length of a frame without padding.
pub const FRAME_LEN: usize = CHECKSUM_OFFSET + 1;

/// Number of zero bytes appended when the transport needs 8-byte frames.
pub const PADDING_LEN: usize = 2;

/// Length of a padded frame, and the capacity of every frame buffer.
pub const MAX_FRAME_LEN: usize = FRAME_LEN + PADDING_LEN;

/// Peripheral clock of the reference board (MSI range 5).
pub const PCLK_HZ: u32 = 2_097_152;

/// Counting frequency of the trigger timer after prescaling.
pub const TRIGGER_TICK_HZ: u32 = 10_000;

/// Interval between two conversion triggers, in microseconds.
pub const TRIGGER_PERIOD_US: u32 = 5_000;

/// Serial link speed.
pub const BAUD_RATE: u32 = 115_200;
