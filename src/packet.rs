//! Telemetry frame layout and encoder.
//!
//! A frame is written field by field into a fixed-capacity buffer rather than
//! overlaid on a packed struct, so the wire format never depends on the target's
//! memory layout:
//!
//! ```text
//! offset  0      1..3          3..5          5      6..8 (optional)
//!         0xA5   voltage (LE)  current (LE)  crc8   0x00 0x00
//! ```
//!
//! The checksum covers bytes `0..5`, start marker included. Padding is never
//! covered by the checksum.

use heapless::Vec;

use crate::checksum::checksum;
use crate::consts::{
    CHECKSUM_OFFSET, CURRENT_OFFSET, FRAME_LEN, MAX_FRAME_LEN, START_MARKER, START_OFFSET,
    VOLTAGE_OFFSET,
};

/// Whether frames carry the two trailing padding bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FramePadding {
    /// 6-byte frames.
    #[default]
    None,
    /// 8-byte frames, for transports that need 16-bit aligned transfers.
    TwoBytes,
}

impl FramePadding {
    /// Total frame length for this padding mode.
    pub const fn frame_len(self) -> usize {
        match self {
            FramePadding::None => FRAME_LEN,
            FramePadding::TwoBytes => MAX_FRAME_LEN,
        }
    }
}

/// One encoded telemetry frame.
///
/// The main loop keeps a single instance and rebuilds it in place every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TelemetryPacket {
    bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl TelemetryPacket {
    /// Creates an empty packet with no bytes.
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Encodes `current` and `voltage` into this packet, replacing its previous contents.
    ///
    /// Fields are written in a fixed order: start marker, current, voltage, then the
    /// checksum over everything before it, then padding.
    pub fn build(&mut self, current: u16, voltage: u16, padding: FramePadding) {
        self.bytes.clear();
        // Capacity is MAX_FRAME_LEN, the largest frame_len()
        let _ = self.bytes.resize_default(padding.frame_len());

        self.bytes[START_OFFSET] = START_MARKER;
        self.bytes[CURRENT_OFFSET..CURRENT_OFFSET + 2].copy_from_slice(&current.to_le_bytes());
        self.bytes[VOLTAGE_OFFSET..VOLTAGE_OFFSET + 2].copy_from_slice(&voltage.to_le_bytes());
        self.bytes[CHECKSUM_OFFSET] = checksum(&self.bytes[..CHECKSUM_OFFSET]);
    }

    /// The encoded bytes, in wire order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes on the wire. Zero until the first [`build`](Self::build).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the packet has been built yet.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Voltage field, if the packet has been built.
    pub fn voltage(&self) -> Option<u16> {
        self.field(VOLTAGE_OFFSET)
    }

    /// Current field, if the packet has been built.
    pub fn current(&self) -> Option<u16> {
        self.field(CURRENT_OFFSET)
    }

    /// Checksum byte, if the packet has been built.
    pub fn checksum(&self) -> Option<u8> {
        self.bytes.get(CHECKSUM_OFFSET).copied()
    }

    fn field(&self, offset: usize) -> Option<u16> {
        let lo = *self.bytes.get(offset)?;
        let hi = *self.bytes.get(offset + 1)?;
        Some(u16::from_le_bytes([lo, hi]))
    }
}

#[cfg(feature = "defmt-0-3")]
impl defmt::Format for TelemetryPacket {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TelemetryPacket({=[u8]:x})", self.as_bytes())
    }
}

/// Builds a fresh packet from `current` and `voltage`.
///
/// See [`TelemetryPacket::build`].
pub fn build_packet(current: u16, voltage: u16, padding: FramePadding) -> TelemetryPacket {
    let mut packet = TelemetryPacket::new();
    packet.build(current, voltage, padding);
    packet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_frame() {
        let packet = build_packet(2060, 824, FramePadding::None);
        assert_eq!(packet.as_bytes(), &[0xA5, 0x38, 0x03, 0x0C, 0x08, 0x7E]);
        assert_eq!(packet.voltage(), Some(824));
        assert_eq!(packet.current(), Some(2060));
    }

    #[test]
    fn test_start_marker_and_checksum() {
        for (current, voltage) in [(0, 0), (0x0102, 0x0304), (u16::MAX, 1), (33_000, 6_600)] {
            let packet = build_packet(current, voltage, FramePadding::None);
            let bytes = packet.as_bytes();
            assert_eq!(bytes.len(), FRAME_LEN);
            assert_eq!(bytes[0], START_MARKER);
            assert_eq!(bytes[5], checksum(&bytes[..5]));
            assert_eq!(packet.checksum(), Some(bytes[5]));
        }
    }

    #[test]
    fn test_voltage_precedes_current_on_the_wire() {
        let packet = build_packet(0x0102, 0x0304, FramePadding::None);
        assert_eq!(&packet.as_bytes()[1..5], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_padding_is_zeroed_and_not_checksummed() {
        let plain = build_packet(1234, 5678, FramePadding::None);
        let padded = build_packet(1234, 5678, FramePadding::TwoBytes);
        assert_eq!(padded.len(), MAX_FRAME_LEN);
        assert_eq!(&padded.as_bytes()[..FRAME_LEN], plain.as_bytes());
        assert_eq!(&padded.as_bytes()[FRAME_LEN..], &[0, 0]);
    }

    #[test]
    fn test_rebuild_in_place_replaces_contents() {
        let mut packet = TelemetryPacket::new();
        assert!(packet.is_empty());
        assert_eq!(packet.voltage(), None);

        packet.build(u16::MAX, u16::MAX, FramePadding::TwoBytes);
        packet.build(1, 2, FramePadding::None);
        assert_eq!(packet, build_packet(1, 2, FramePadding::None));
    }
}
