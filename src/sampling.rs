//! Sampling scheduler and the interrupt-to-main-loop handoff.
//!
//! Two interrupts drive a sampling cycle:
//!
//! - the periodic trigger calls [`Scheduler::on_trigger`], which starts a conversion
//! - the conversion-complete interrupt calls [`SampleHandoff::signal_ready`] with
//!   both channel codes
//!
//! The main loop then [`take`](SampleHandoff::take)s the samples. Neither interrupt
//! converts or frames anything, so both stay a few instructions long.
//!
//! ## Overrun policy
//!
//! The handoff is a one-slot mailbox. If the main loop falls behind, a newer
//! cycle overwrites the unread one. Publishing and taking both happen inside a
//! critical section, so a taken [`RawSamples`] always holds two codes from the same
//! trigger.

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

use crate::consts::{CHANNEL_COUNT, CURRENT_CHANNEL, VOLTAGE_CHANNEL};
use crate::traits::ConversionTrigger;

/// Both channel codes of one trigger cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct RawSamples {
    /// Current sense code.
    pub current: u16,
    /// Voltage sense code.
    pub voltage: u16,
}

impl RawSamples {
    /// Reads the codes out of a DMA buffer in channel order.
    pub const fn from_dma(buf: &[u16; CHANNEL_COUNT]) -> Self {
        Self {
            current: buf[CURRENT_CHANNEL],
            voltage: buf[VOLTAGE_CHANNEL],
        }
    }
}

/// One-slot mailbox between the conversion-complete interrupt and the main loop.
///
/// A filled slot is the "data ready" signal. Meant to live in a `static`:
///
/// ```rust
/// use adc_telemetry::sampling::{RawSamples, SampleHandoff};
///
/// static SAMPLES: SampleHandoff = SampleHandoff::new();
///
/// // conversion-complete interrupt
/// SAMPLES.signal_ready_from_dma(&[0x100, 0x200]);
///
/// // main loop
/// assert_eq!(SAMPLES.take(), Some(RawSamples { current: 0x100, voltage: 0x200 }));
/// assert_eq!(SAMPLES.take(), None);
/// ```
pub struct SampleHandoff {
    slot: Mutex<Cell<Option<RawSamples>>>,
}

impl SampleHandoff {
    /// Creates an empty mailbox.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Publishes a completed conversion and raises the ready signal.
    ///
    /// Overwrites samples the main loop has not taken yet.
    pub fn signal_ready(&self, samples: RawSamples) {
        let overrun = critical_section::with(|cs| self.slot.borrow(cs).replace(Some(samples)));
        if overrun.is_some() {
            trace!("sample overrun");
        }
    }

    /// Publishes the DMA buffer of a completed conversion.
    pub fn signal_ready_from_dma(&self, buf: &[u16; CHANNEL_COUNT]) {
        self.signal_ready(RawSamples::from_dma(buf));
    }

    /// Whether samples are waiting.
    pub fn is_ready(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow(cs).get().is_some())
    }

    /// Clears the ready signal and returns the samples it guarded.
    pub fn take(&self) -> Option<RawSamples> {
        critical_section::with(|cs| self.slot.borrow(cs).take())
    }
}

impl Default for SampleHandoff {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SampleHandoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleHandoff")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Target of the periodic trigger interrupt.
///
/// The trigger period must exceed conversion, transfer, framing and the first byte
/// on the wire. That margin is a configuration invariant, checked for the reference
/// clocks by [`crate::timer::period_covers_frame`], not at run time.
#[derive(Debug)]
pub struct Scheduler<C> {
    adc: C,
    /// Conversions started since construction (wrapping).
    pub cycles: u32,
}

impl<C> Scheduler<C>
where
    C: ConversionTrigger,
{
    /// Wraps the conversion engine.
    pub const fn new(adc: C) -> Self {
        Self { adc, cycles: 0 }
    }

    /// Services the trigger interrupt: starts one conversion.
    pub fn on_trigger(&mut self) {
        self.adc.start_conversion();
        self.cycles = self.cycles.wrapping_add(1);
    }

    /// Borrow the conversion engine.
    pub fn adc(&self) -> &C {
        &self.adc
    }

    /// Releases the conversion engine.
    pub fn free(self) -> C {
        self.adc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct CountingAdc {
        starts: usize,
    }

    impl ConversionTrigger for CountingAdc {
        fn start_conversion(&mut self) {
            self.starts += 1;
        }
    }

    #[test]
    fn test_trigger_starts_conversion() {
        let mut scheduler = Scheduler::new(CountingAdc::default());
        scheduler.on_trigger();
        scheduler.on_trigger();
        assert_eq!(scheduler.adc().starts, 2);
        assert_eq!(scheduler.cycles, 2);
    }

    #[test]
    fn test_dma_channel_order() {
        let samples = RawSamples::from_dma(&[0x0AB, 0x0CD]);
        assert_eq!(samples.current, 0x0AB);
        assert_eq!(samples.voltage, 0x0CD);
    }

    #[test]
    fn test_take_clears_ready() {
        let handoff = SampleHandoff::new();
        assert!(!handoff.is_ready());
        assert_eq!(handoff.take(), None);

        handoff.signal_ready(RawSamples {
            current: 1,
            voltage: 2,
        });
        assert!(handoff.is_ready());
        assert_eq!(
            handoff.take(),
            Some(RawSamples {
                current: 1,
                voltage: 2
            })
        );
        assert!(!handoff.is_ready());
    }

    #[test]
    fn test_overrun_keeps_only_newest_cycle() {
        let handoff = SampleHandoff::new();
        handoff.signal_ready_from_dma(&[10, 20]);
        handoff.signal_ready_from_dma(&[30, 40]);

        let samples = handoff.take().unwrap();
        assert_eq!(
            samples,
            RawSamples {
                current: 30,
                voltage: 40
            }
        );
        assert_eq!(handoff.take(), None);
    }
}
