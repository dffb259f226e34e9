//! Collaborator interfaces.
//!
//! The pipeline never touches peripheral registers. Board support code implements
//! these traits on top of its HAL, after clocks, pins and the converter have been
//! brought up.

use embedded_hal_nb::serial::Write;

/// Starts one conversion sequence of both analog channels.
///
/// Called from the periodic trigger interrupt. The conversion engine must deliver
/// both samples and then raise its completion interrupt exactly once.
pub trait ConversionTrigger {
    /// Kick off a conversion of all configured channels.
    fn start_conversion(&mut self);
}

/// Control over the serial "transmit register empty" notification.
pub trait TxInterrupt {
    /// Enable the byte-ready interrupt.
    fn listen_tx(&mut self);
    /// Disable the byte-ready interrupt.
    fn unlisten_tx(&mut self);
}

/// A serial transmitter the [`Transmitter`](crate::transmit::Transmitter) can drive.
///
/// `write` must return [`nb::Error::WouldBlock`] while the transmit register is full.
pub trait TxPort: Write<u8> + TxInterrupt {}

impl<T> TxPort for T where T: Write<u8> + TxInterrupt {}

/// Low-power wait used by the main loop.
pub trait WaitForInterrupt {
    /// Sleep until any interrupt has been serviced.
    fn wait_for_interrupt(&mut self);
}

/// [`WaitForInterrupt`] on Cortex-M cores, using the `WFI` instruction.
#[cfg(feature = "cortex-m")]
#[derive(Debug, Default, Clone, Copy)]
pub struct Wfi;

#[cfg(feature = "cortex-m")]
impl WaitForInterrupt for Wfi {
    #[inline]
    fn wait_for_interrupt(&mut self) {
        cortex_m::asm::wfi();
    }
}
