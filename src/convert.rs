//! Conversion from raw ADC codes to engineering units.
//!
//! Each conversion runs in two truncating stages:
//!
//! 1. code to millivolts at the ADC pin: `code * ref_mv / full_scale`
//! 2. pin millivolts to the physical quantity:
//!    - current: `mv * 1000 / (current_gain * shunt_ohms)` microamps
//!    - voltage: `mv * divider_inv_ratio / voltage_gain` millivolts
//!
//! Both stages floor, so the results match the reference firmware bit for bit.
//! The first stage fits `u32` for any pair of `u16` operands, the second runs in `u64`.

use crate::consts::{ADC_FULL_SCALE, ADC_REF_MV, MICROAMPS_PER_MILLIAMP};
use crate::error::Error;

/// Analog front-end constants.
///
/// Built with [`Calibration::new`], which rejects zero divisors and front ends whose
/// full-scale output does not fit the 16-bit telemetry fields. Once validated, every
/// in-range code converts without saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Calibration {
    ref_mv: u16,
    full_scale: u16,
    current_gain: u16,
    shunt_ohms: u16,
    divider_inv_ratio: u16,
    voltage_gain: u16,
}

impl Calibration {
    /// Reference board: 3.3 V / 12-bit ADC, x100 current amplifier over a 1 ohm shunt,
    /// 1:2 voltage divider with a unity-gain buffer.
    pub const DEFAULT: Calibration =
        match Calibration::new(ADC_REF_MV, ADC_FULL_SCALE, 100, 1, 2, 1) {
            Ok(cal) => cal,
            Err(_) => panic!("invalid default calibration"),
        };

    /// Creates a validated calibration.
    ///
    /// # Arguments
    /// - `ref_mv`: ADC reference voltage in millivolts
    /// - `full_scale`: highest ADC code (e.g. `0xFFF` for 12 bits)
    /// - `current_gain`: current sense amplifier gain
    /// - `shunt_ohms`: shunt resistance in ohms
    /// - `divider_inv_ratio`: inverse of the voltage divider ratio
    /// - `voltage_gain`: voltage sense amplifier gain
    ///
    /// # Errors
    /// - [`Error::ZeroDivisor`] if `full_scale`, `current_gain`, `shunt_ohms` or
    ///   `voltage_gain` is zero
    /// - [`Error::FullScaleOverflow`] if a full-scale code converts to more than `u16::MAX`
    pub const fn new(
        ref_mv: u16,
        full_scale: u16,
        current_gain: u16,
        shunt_ohms: u16,
        divider_inv_ratio: u16,
        voltage_gain: u16,
    ) -> Result<Self, Error> {
        if full_scale == 0 || current_gain == 0 || shunt_ohms == 0 || voltage_gain == 0 {
            return Err(Error::ZeroDivisor);
        }
        let cal = Self {
            ref_mv,
            full_scale,
            current_gain,
            shunt_ohms,
            divider_inv_ratio,
            voltage_gain,
        };
        let max_ua = cal.current_ua_wide(full_scale);
        if max_ua > u16::MAX as u64 {
            return Err(Error::FullScaleOverflow(max_ua));
        }
        let max_mv = cal.voltage_mv_wide(full_scale);
        if max_mv > u16::MAX as u64 {
            return Err(Error::FullScaleOverflow(max_mv));
        }
        Ok(cal)
    }

    /// Highest ADC code this calibration expects.
    pub const fn full_scale(&self) -> u16 {
        self.full_scale
    }

    /// Millivolts seen at the ADC pin for `code`.
    pub const fn code_to_pin_mv(&self, code: u16) -> u32 {
        code as u32 * self.ref_mv as u32 / self.full_scale as u32
    }

    const fn current_ua_wide(&self, code: u16) -> u64 {
        let mv = self.code_to_pin_mv(code) as u64;
        mv * MICROAMPS_PER_MILLIAMP as u64 / (self.current_gain as u64 * self.shunt_ohms as u64)
    }

    const fn voltage_mv_wide(&self, code: u16) -> u64 {
        let mv = self.code_to_pin_mv(code) as u64;
        mv * self.divider_inv_ratio as u64 / self.voltage_gain as u64
    }

    /// Converts a current-channel code to microamps.
    ///
    /// Codes above [`full_scale`](Self::full_scale) saturate at `u16::MAX` instead of wrapping.
    pub const fn raw_to_current(&self, code: u16) -> u16 {
        saturate(self.current_ua_wide(code))
    }

    /// Converts a voltage-channel code to millivolts.
    ///
    /// Codes above [`full_scale`](Self::full_scale) saturate at `u16::MAX` instead of wrapping.
    pub const fn raw_to_voltage(&self, code: u16) -> u16 {
        saturate(self.voltage_mv_wide(code))
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const fn saturate(value: u64) -> u16 {
    if value > u16::MAX as u64 {
        u16::MAX
    } else {
        value as u16
    }
}

/// Converts a current-channel code to microamps with [`Calibration::DEFAULT`].
pub const fn raw_to_current(code: u16) -> u16 {
    Calibration::DEFAULT.raw_to_current(code)
}

/// Converts a voltage-channel code to millivolts with [`Calibration::DEFAULT`].
pub const fn raw_to_voltage(code: u16) -> u16 {
    Calibration::DEFAULT.raw_to_voltage(code)
}
