//! Trigger timer and serial timing helpers.
//!
//! The sampling rate is fixed at build time. This module computes the register
//! values that produce it and checks the one timing invariant the pipeline relies
//! on: a full frame must leave the serial port before the next trigger fires.
//!
//! Contains:
//! - `compute_trigger_timing`: runtime prescaler/reload calculator
//! - `const_trigger_timing`: compile-time prescaler/reload calculator
//! - `usart_brr`: baud rate divider
//! - `frame_airtime_us` / `period_covers_frame`: trigger period margin
//! - `run_polled_loop`: blocking trigger-and-service loop over `DelayNs` (feature `delay-loop`)
//!
//! Reference configuration (`PCLK_HZ` = 2.097152 MHz):
//!
//! | TICK_HZ | PERIOD | PRESCALER | RELOAD |
//! |---------|--------|-----------|--------|
//! |  10 kHz |   5 ms |       209 |     49 |
//! |  10 kHz |  10 ms |       209 |     99 |
//! |   1 kHz | 100 ms |      2096 |     99 |

use libm::roundf;

use crate::consts::{BAUD_RATE, MAX_FRAME_LEN, PCLK_HZ, TRIGGER_PERIOD_US, TRIGGER_TICK_HZ};

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

/// 1 start bit, 8 data bits, 1 stop bit.
pub const BITS_PER_UART_BYTE: u32 = 10;

/// Microseconds per second.
pub const MICROSECONDS_PER_SECOND: u32 = 1_000_000;

/// Register values for an up-counting timer with an update interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TriggerTiming {
    /// Prescaler register value (divides by `prescaler + 1`).
    pub prescaler: u16,
    /// Auto-reload register value (period is `reload + 1` ticks).
    pub reload: u16,
}

/// Computes trigger timer register values.
///
/// # Arguments
/// - `f_clk`: timer input clock in Hz
/// - `tick_hz`: desired counting frequency after the prescaler
/// - `period_ms`: desired interval between update interrupts, in milliseconds
///
/// # Returns
/// - Prescaler and reload values, each rounded to the nearest integer
pub fn compute_trigger_timing(f_clk: u32, tick_hz: u32, period_ms: f32) -> TriggerTiming {
    let divider = roundf(f_clk as f32 / tick_hz as f32);
    let ticks = roundf(tick_hz as f32 * period_ms / 1_000.0);
    TriggerTiming {
        prescaler: (divider - 1.0) as u16,
        reload: (ticks - 1.0) as u16,
    }
}

/// Compile-time trigger timer calculator
///
/// # Arguments
/// - `f_clk`: timer input clock in Hz
/// - `tick_hz`: desired counting frequency after the prescaler
/// - `period_us`: desired interval between update interrupts, in microseconds
///
/// # Returns
/// - Prescaler and reload values, each rounded to the nearest integer
///
/// # Panics
/// - If `tick_hz` is 0
/// - If `tick_hz` rounds to a divider or period of zero ticks
///
/// Evaluated in a `const`, either case is a build error instead.
pub const fn const_trigger_timing(f_clk: u32, tick_hz: u32, period_us: u32) -> TriggerTiming {
    let divider = (f_clk + tick_hz / 2) / tick_hz;
    let ticks = (tick_hz as u64 * period_us as u64 + MICROSECONDS_PER_SECOND as u64 / 2)
        / MICROSECONDS_PER_SECOND as u64;
    TriggerTiming {
        prescaler: (divider - 1) as u16,
        reload: (ticks - 1) as u16,
    }
}

/// Baud rate register value for 16x oversampling.
///
/// # Panics
/// If `baud` is 0.
pub const fn usart_brr(pclk: u32, baud: u32) -> u32 {
    pclk / baud
}

/// Time to shift `frame_len` bytes out at `baud`, rounded up to whole microseconds.
///
/// # Panics
/// If `baud` is 0.
pub const fn frame_airtime_us(baud: u32, frame_len: usize) -> u32 {
    let bits = frame_len as u64 * BITS_PER_UART_BYTE as u64;
    let us = (bits * MICROSECONDS_PER_SECOND as u64).div_ceil(baud as u64);
    us as u32
}

/// Whether a trigger period leaves room for a whole frame on the wire.
///
/// The conversion, DMA transfer and framing take a handful of microseconds and are
/// covered by requiring the frame itself to fit strictly inside the period.
pub const fn period_covers_frame(period_us: u32, baud: u32, frame_len: usize) -> bool {
    frame_airtime_us(baud, frame_len) < period_us
}

/// Trigger timer values of the reference configuration.
pub const TRIGGER_TIMING: TriggerTiming =
    const_trigger_timing(PCLK_HZ, TRIGGER_TICK_HZ, TRIGGER_PERIOD_US);

/// Baud rate divider of the reference configuration.
pub const USART_BRR: u32 = usart_brr(PCLK_HZ, BAUD_RATE);

const _: () = assert!(
    period_covers_frame(TRIGGER_PERIOD_US, BAUD_RATE, MAX_FRAME_LEN),
    "trigger period is shorter than one frame on the wire"
);
