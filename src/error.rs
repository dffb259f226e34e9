//! Error type shared by the pipeline stages.
//!
//! The telemetry stream is fire-and-forget: overruns and send requests that
//! arrive while a frame is still in flight are not errors and never show up here.
//! What remains is configuration mistakes caught at construction time and faults
//! reported by the serial transport.

use thiserror::Error;

/// Errors reported by the telemetry pipeline.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error {
    /// A calibration divisor (full-scale code, amplifier gain, shunt) is zero.
    #[error("calibration divisor must be non-zero")]
    ZeroDivisor,
    /// The full-scale reading converts to a value that does not fit the 16-bit wire field.
    #[error("full-scale reading {0} does not fit a 16-bit field")]
    FullScaleOverflow(u64),
    /// The serial transport rejected a byte.
    #[error("serial transport fault")]
    Transport,
    /// A global singleton was used before its setup function ran.
    #[error("peripheral singleton used before setup")]
    Uninitialized,
}
