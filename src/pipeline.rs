//! Main-loop side of the telemetry pipeline.
//!
//! [`Pipeline`] owns the one [`TelemetryPacket`] and turns ready samples into a
//! frame for the [`Transmitter`]. [`Pipeline::run`] is the firmware's idle loop:
//! sleep until any interrupt, check the ready signal, repeat. Wake-ups caused by
//! the serial or trigger interrupts simply find nothing to do.

use crate::convert::Calibration;
use crate::error::Error;
use crate::isr::GlobalTransmitter;
use crate::packet::{FramePadding, TelemetryPacket};
use crate::sampling::{RawSamples, SampleHandoff};
use crate::traits::{TxPort, WaitForInterrupt};
use crate::transmit::Transmitter;

/// What the frame fields carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Payload {
    /// Microamps and millivolts.
    #[default]
    Converted,
    /// The ADC codes as sampled.
    Raw,
}

/// Build-time pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct PipelineConfig {
    /// Analog front-end constants.
    pub calibration: Calibration,
    /// Raw or converted frame fields.
    pub payload: Payload,
    /// Frame padding.
    pub padding: FramePadding,
}

impl PipelineConfig {
    /// Configuration selected by the `raw-samples` and `pad-frame` features.
    pub const DEFAULT: PipelineConfig = PipelineConfig {
        calibration: Calibration::DEFAULT,
        #[cfg(feature = "raw-samples")]
        payload: Payload::Raw,
        #[cfg(not(feature = "raw-samples"))]
        payload: Payload::Converted,
        #[cfg(feature = "pad-frame")]
        padding: FramePadding::TwoBytes,
        #[cfg(not(feature = "pad-frame"))]
        padding: FramePadding::None,
    };

    /// Field values `(current, voltage)` for `samples`.
    pub const fn fields(&self, samples: RawSamples) -> (u16, u16) {
        match self.payload {
            Payload::Converted => (
                self.calibration.raw_to_current(samples.current),
                self.calibration.raw_to_voltage(samples.voltage),
            ),
            Payload::Raw => (samples.current, samples.voltage),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Result of one [`Pipeline::service`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Cycle {
    /// No samples were waiting.
    NoData,
    /// A frame with these field values went to the transmitter.
    Sent {
        /// Current field.
        current: u16,
        /// Voltage field.
        voltage: u16,
    },
    /// Samples were consumed but the transmitter was still busy, so they were dropped.
    Dropped,
}

/// The main loop's state: configuration plus the single packet buffer.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    packet: TelemetryPacket,
}

impl Pipeline {
    /// Creates a pipeline with an empty packet.
    pub const fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            packet: TelemetryPacket::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The most recently built packet.
    pub fn packet(&self) -> &TelemetryPacket {
        &self.packet
    }

    /// Runs one main-loop step.
    ///
    /// If the ready signal is set: clears it, converts the samples, and, when the
    /// transmitter is idle, rebuilds the packet and starts sending it. The packet is
    /// left alone while a frame is in flight.
    ///
    /// # Errors
    /// [`Error::Transport`] if the transmitter could not emit the first byte.
    pub fn service<P>(
        &mut self,
        handoff: &SampleHandoff,
        tx: &mut Transmitter<P>,
    ) -> Result<Cycle, Error>
    where
        P: TxPort,
    {
        let Some(samples) = handoff.take() else {
            return Ok(Cycle::NoData);
        };

        let (current, voltage) = self.config.fields(samples);
        if !tx.is_idle() {
            tx.record_dropped();
            debug!("tx busy, dropping cycle");
            return Ok(Cycle::Dropped);
        }

        self.packet.build(current, voltage, self.config.padding);
        if tx.start_send(&self.packet)? {
            trace!("frame queued: {} uA, {} mV", current, voltage);
            Ok(Cycle::Sent { current, voltage })
        } else {
            Ok(Cycle::Dropped)
        }
    }

    /// [`service`](Self::service) against a transmitter shared with the serial interrupt.
    ///
    /// The whole step runs in one critical section, so the serial interrupt cannot
    /// observe a half-started frame.
    ///
    /// # Errors
    /// - [`Error::Uninitialized`] if the transmitter has not been set up
    /// - [`Error::Transport`] as for [`service`](Self::service)
    pub fn service_global<P>(
        &mut self,
        handoff: &SampleHandoff,
        global_tx: &'static GlobalTransmitter<P>,
    ) -> Result<Cycle, Error>
    where
        P: TxPort,
    {
        critical_section::with(|cs| {
            let mut tx = global_tx.borrow(cs).borrow_mut();
            let tx = tx.as_mut().ok_or(Error::Uninitialized)?;
            self.service(handoff, tx)
        })
    }

    /// The firmware idle loop. Never returns.
    ///
    /// Sleeps through `wfi` until an interrupt has run, then services the handoff.
    /// Errors are logged and the loop carries on with the next cycle.
    ///
    /// # Example
    /// ```rust,ignore
    /// static SAMPLES: SampleHandoff = SampleHandoff::new();
    ///
    /// #[entry]
    /// fn main() -> ! {
    ///     // clocks, pins, ADC/DMA, UART bring-up ...
    ///     let mut pipeline = Pipeline::new(PipelineConfig::DEFAULT);
    ///     pipeline.run(&SAMPLES, &TELEMETRY_TX, &mut Wfi)
    /// }
    /// ```
    pub fn run<P, W>(
        &mut self,
        handoff: &SampleHandoff,
        global_tx: &'static GlobalTransmitter<P>,
        wfi: &mut W,
    ) -> !
    where
        P: TxPort,
        W: WaitForInterrupt,
    {
        loop {
            wfi.wait_for_interrupt();
            if let Err(err) = self.service_global(handoff, global_tx) {
                warn!("telemetry cycle failed: {}", err);
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::DEFAULT)
    }
}
