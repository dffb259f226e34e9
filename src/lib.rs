//! # adc-telemetry
//!
//! A portable, no_std Rust pipeline that samples a current and a voltage sense line
//! on a fixed period and streams each pair as a small CRC-8 protected frame over a
//! UART, for microcontrollers without an operating system.
//!
//! The pipeline is built from:
//! - a periodic trigger that starts one ADC conversion of both channels
//! - a one-slot mailbox between the conversion-complete interrupt and the main loop
//! - truncating fixed-point conversion to microamps and millivolts
//! - an explicit frame encoder with a CRC-8 (poly 0x07) checksum
//! - an interrupt-driven transmitter that emits one byte per "TX empty" interrupt
//!
//! ## Crate features
//! | Feature       | Description |
//! |---------------|-------------|
//! | `std`         | Disables `#![no_std]` support (host tests) |
//! | `delay-loop`  | Uses `embedded_hal::delay::DelayNs` to fire the trigger from a blocking loop |
//! | `cortex-m`    | Provides [`traits::Wfi`] for the low-power wait |
//! | `raw-samples` | Sends raw ADC codes instead of converted values |
//! | `pad-frame`   | Pads every frame to 8 bytes |
//! | `defmt-0-3`   | Uses `defmt` logging |
//! | `log`         | Uses `log` logging |
//!
//! ## Wire format
//!
//! ```text
//! 0xA5 | voltage u16 LE | current u16 LE | crc8 | [0x00 0x00]
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! adc_telemetry::init_telemetry!(Usart2Tx, AdcDma);
//! static mut ADC_DMA_BUF: [u16; 2] = [0; 2];
//!
//! #[entry]
//! fn main() -> ! {
//!     // clocks, pins, ADC + DMA, UART bring-up ...
//!     adc_telemetry::setup_telemetry!(usart2_tx, adc_dma);
//!     // start the trigger timer last
//!     let mut pipeline = Pipeline::new(PipelineConfig::DEFAULT);
//!     pipeline.run(&TELEMETRY_SAMPLES, &TELEMETRY_TX, &mut Wfi)
//! }
//!
//! #[interrupt]
//! fn TIM21() { adc_telemetry::telemetry_trigger_isr!(); }
//!
//! #[interrupt]
//! fn DMA1_CHANNEL1() { adc_telemetry::telemetry_conversion_isr!(unsafe { &ADC_DMA_BUF }); }
//!
//! #[interrupt]
//! fn USART2() { let _ = adc_telemetry::telemetry_serial_isr!(); }
//! ```
//!
//! ## Integration Notes
//!
//! - The trigger period must exceed conversion, transfer, framing and the first byte
//!   on the wire; see [`timer::period_covers_frame`]
//! - All three interrupts must run at the same priority so they never preempt each other
//! - Overruns and send requests that hit a busy transmitter are dropped silently
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub use critical_section;
pub use embedded_hal_nb;
pub use heapless;
pub use nb;

pub mod checksum;
pub mod consts;
pub mod convert;
pub mod error;
pub mod isr;
mod macros;
pub mod packet;
pub mod pipeline;
pub mod sampling;
pub mod timer;
pub mod traits;
pub mod transmit;

pub use error::Error;
