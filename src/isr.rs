//! Global singletons for the interrupt handlers.
//!
//! Interrupt handlers take no arguments, so the [`Transmitter`] and [`Scheduler`]
//! they drive live in `static`s guarded by `critical_section`. The functions here
//! are the bodies of the three handlers; the [`init_telemetry!`](crate::init_telemetry)
//! family of macros declares the statics and calls them.
//!
//! | Interrupt            | Function                          |
//! |----------------------|-----------------------------------|
//! | trigger timer update | [`global_trigger_tick`]           |
//! | DMA transfer complete| [`SampleHandoff::signal_ready_from_dma`](crate::sampling::SampleHandoff::signal_ready_from_dma) |
//! | UART TX empty        | [`global_serial_ready`]           |

use core::cell::RefCell;

use critical_section::Mutex;

use crate::error::Error;
use crate::sampling::Scheduler;
use crate::traits::{ConversionTrigger, TxPort};
use crate::transmit::Transmitter;

/// A [`Transmitter`] shared between the main loop and the serial interrupt.
pub type GlobalTransmitter<P> = Mutex<RefCell<Option<Transmitter<P>>>>;

/// A [`Scheduler`] owned by the trigger interrupt.
pub type GlobalScheduler<C> = Mutex<RefCell<Option<Scheduler<C>>>>;

/// Used to initialize the global static `Transmitter`.
///
/// # Returns
/// * An empty mutex, to be filled by [`global_transmitter_setup`]
///
/// # Example
/// ```rust,ignore
/// static TELEMETRY_TX: GlobalTransmitter<Usart2Tx> = global_transmitter_init();
/// ```
pub const fn global_transmitter_init<P: TxPort>() -> GlobalTransmitter<P> {
    Mutex::new(RefCell::new(None))
}

/// Moves the serial port into the global transmitter.
///
/// Call once from `main`, before the serial interrupt is unmasked.
pub fn global_transmitter_setup<P: TxPort>(global_tx: &'static GlobalTransmitter<P>, port: P) {
    critical_section::with(|cs| {
        let _ = global_tx.borrow(cs).replace(Some(Transmitter::new(port)));
    });
}

/// Runs the transmitter at each serial byte-ready interrupt.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn USART2() {
///     let _ = global_serial_ready(&TELEMETRY_TX);
/// }
/// ```
///
/// # Errors
/// - [`Error::Uninitialized`] if [`global_transmitter_setup`] has not run
/// - [`Error::Transport`] if the port rejected a byte
pub fn global_serial_ready<P: TxPort>(
    global_tx: &'static GlobalTransmitter<P>,
) -> Result<(), Error> {
    critical_section::with(|cs| match global_tx.borrow(cs).borrow_mut().as_mut() {
        Some(tx) => tx.on_byte_ready(),
        None => Err(Error::Uninitialized),
    })
}

/// Used to initialize the global static `Scheduler`.
pub const fn global_scheduler_init<C: ConversionTrigger>() -> GlobalScheduler<C> {
    Mutex::new(RefCell::new(None))
}

/// Moves the conversion engine into the global scheduler.
///
/// Call once from `main`, after the ADC and DMA are ready and before the trigger
/// timer starts.
pub fn global_scheduler_setup<C: ConversionTrigger>(
    global_scheduler: &'static GlobalScheduler<C>,
    adc: C,
) {
    critical_section::with(|cs| {
        let _ = global_scheduler.borrow(cs).replace(Some(Scheduler::new(adc)));
    });
}

/// Starts a conversion at each trigger timer interrupt.
///
/// Silently does nothing if the scheduler has not been set up yet.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM21() {
///     global_trigger_tick(&TELEMETRY_TRIGGER);
/// }
/// ```
pub fn global_trigger_tick<C: ConversionTrigger>(global_scheduler: &'static GlobalScheduler<C>) {
    critical_section::with(|cs| {
        if let Some(scheduler) = global_scheduler.borrow(cs).borrow_mut().as_mut() {
            scheduler.on_trigger();
        }
    });
}
