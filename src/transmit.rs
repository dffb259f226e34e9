//! Interrupt-driven frame transmitter.
//!
//! This module provides [`Transmitter`], which owns the single in-flight frame
//! buffer and walks it one byte per "transmit register empty" interrupt.
//!
//! ## State machine
//!
//! ```text
//!            start_send (first byte written, irq on)
//!   Idle  ------------------------------------------->  Sending
//!    ^                                                     |
//!    |   on_byte_ready with cursor at end (irq off)        | on_byte_ready:
//!    +-----------------------------------------------------+ write byte, cursor += 1
//! ```
//!
//! A `start_send` while `Sending` is dropped: the frame on the wire always
//! finishes untouched.

use crate::consts::MAX_FRAME_LEN;
use crate::error::Error;
use crate::packet::TelemetryPacket;
use crate::traits::TxPort;
use heapless::Vec;
use nb::block;

/// State of the [`Transmitter`].
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxState {
    /// No frame in flight. Only state that accepts a new frame.
    #[default]
    Idle,
    /// A frame is being emitted, one byte per byte-ready interrupt.
    Sending,
}

/// Drives a [`TxPort`] through one frame at a time.
///
/// ## Type Parameters
///
/// - `P`: the serial port, implementing [`embedded_hal_nb::serial::Write`] and
///   [`TxInterrupt`](crate::traits::TxInterrupt)
///
/// ## Example
///
/// ```rust
/// # use adc_telemetry::traits::TxInterrupt;
/// # use embedded_hal_mock::eh1::serial::{Mock as SerialMock, Transaction as SerialTransaction};
/// # use embedded_hal_nb::serial::{ErrorType, Write};
/// # struct Port(SerialMock<u8>);
/// # impl ErrorType for Port { type Error = <SerialMock<u8> as ErrorType>::Error; }
/// # impl Write<u8> for Port {
/// #     fn write(&mut self, b: u8) -> nb::Result<(), Self::Error> { self.0.write(b) }
/// #     fn flush(&mut self) -> nb::Result<(), Self::Error> { self.0.flush() }
/// # }
/// # impl TxInterrupt for Port { fn listen_tx(&mut self) {} fn unlisten_tx(&mut self) {} }
/// use adc_telemetry::packet::{build_packet, FramePadding};
/// use adc_telemetry::transmit::{Transmitter, TxState};
///
/// # let bytes = [0xA5, 0x38, 0x03, 0x0C, 0x08, 0x7E];
/// # let port = Port(SerialMock::new(&[SerialTransaction::write_many(bytes)]));
/// let mut tx = Transmitter::new(port);
/// let packet = build_packet(2060, 824, FramePadding::None);
///
/// assert_eq!(tx.start_send(&packet), Ok(true));
/// while tx.state() == TxState::Sending {
///     tx.on_byte_ready().unwrap(); // normally called from the UART interrupt
/// }
/// # tx.free().0.done();
/// ```
#[derive(Debug)]
pub struct Transmitter<P> {
    port: P,
    state: TxState,
    frame: Vec<u8, MAX_FRAME_LEN>,
    cursor: usize,
    /// Frames emitted in full since construction (wrapping).
    pub frames_sent: u16,
    /// Send requests dropped because a frame was still in flight (wrapping).
    pub requests_dropped: u16,
}

impl<P> Transmitter<P>
where
    P: TxPort,
{
    /// Takes ownership of `port` and makes sure its byte-ready interrupt is off.
    pub fn new(mut port: P) -> Self {
        port.unlisten_tx();
        Self {
            port,
            state: TxState::Idle,
            frame: Vec::new(),
            cursor: 0,
            frames_sent: 0,
            requests_dropped: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> TxState {
        self.state
    }

    /// Whether a new frame would be accepted.
    pub fn is_idle(&self) -> bool {
        self.state == TxState::Idle
    }

    /// Index of the next byte to emit.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Borrow the serial port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutably borrow the serial port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Releases the serial port.
    pub fn free(self) -> P {
        self.port
    }

    pub(crate) fn record_dropped(&mut self) {
        self.requests_dropped = self.requests_dropped.wrapping_add(1);
    }

    /// Starts emitting `packet`.
    ///
    /// When idle, copies `packet` into the send buffer, blocks until the port accepts
    /// the first byte, enables the byte-ready interrupt and enters [`TxState::Sending`].
    /// When already sending, does nothing.
    ///
    /// # Returns
    /// - `Ok(true)`: the frame is on its way
    /// - `Ok(false)`: a frame was already in flight, `packet` was dropped
    ///
    /// # Errors
    /// [`Error::Transport`] if the port rejects the first byte. The engine stays idle.
    pub fn start_send(&mut self, packet: &TelemetryPacket) -> Result<bool, Error> {
        if self.state != TxState::Idle {
            self.record_dropped();
            trace!("tx busy, dropped frame");
            return Ok(false);
        }
        if packet.is_empty() {
            return Ok(false);
        }

        self.frame.clear();
        // Both buffers share the MAX_FRAME_LEN capacity
        let _ = self.frame.extend_from_slice(packet.as_bytes());
        self.cursor = 0;
        self.state = TxState::Sending;

        // Busy-wait for the transmit register, then hand the rest to the interrupt
        let first = self.frame[0];
        if block!(self.port.write(first)).is_err() {
            warn!("serial fault on first byte");
            self.state = TxState::Idle;
            return Err(Error::Transport);
        }
        self.cursor = 1;
        self.port.listen_tx();
        Ok(true)
    }

    /// Services the byte-ready interrupt.
    ///
    /// Emits the byte under the cursor and advances it. Once every byte has been
    /// written, disables the interrupt and returns to [`TxState::Idle`]. A call while
    /// idle only disables the interrupt. If the port is not ready yet the cursor stays
    /// put and the byte goes out on the next notification.
    ///
    /// # Errors
    /// [`Error::Transport`] if the port rejects a byte. The frame is abandoned and the
    /// engine returns to idle.
    pub fn on_byte_ready(&mut self) -> Result<(), Error> {
        if self.state != TxState::Sending {
            self.port.unlisten_tx();
            return Ok(());
        }

        match self.frame.get(self.cursor) {
            Some(&byte) => match self.port.write(byte) {
                Ok(()) => {
                    self.cursor += 1;
                    Ok(())
                }
                Err(nb::Error::WouldBlock) => Ok(()),
                Err(nb::Error::Other(_)) => {
                    warn!("serial fault at byte {}", self.cursor);
                    self.finish();
                    Err(Error::Transport)
                }
            },
            None => {
                self.frames_sent = self.frames_sent.wrapping_add(1);
                self.finish();
                Ok(())
            }
        }
    }

    fn finish(&mut self) {
        self.port.unlisten_tx();
        self.state = TxState::Idle;
    }
}
