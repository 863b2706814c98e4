//! Thermistor conversion for the on-board temperature sensor.
//!
//! The thermistor sits in a voltage divider with a 10 kΩ series resistor and is
//! read through a 10-bit ADC. The beta form of the Steinhart–Hart equation turns
//! its resistance into a temperature.

pub const SERIES_RESISTANCE: f64 = 10_000.0;
pub const NOMINAL_RESISTANCE: f64 = 10_000.0;
pub const NOMINAL_TEMPERATURE_C: f64 = 25.0;
pub const BETA: f64 = 3950.0;
pub const ADC_MAX: f64 = 1023.0;

const KELVIN_OFFSET: f64 = 273.15;

/// Thermistor resistance in ohms for a raw ADC reading.
///
/// A raw reading of 0 divides by zero and yields infinity.
pub fn resistance_from_raw(raw: u16) -> f64 {
    SERIES_RESISTANCE * (ADC_MAX / f64::from(raw) - 1.0)
}

/// Temperature in °C for a raw ADC reading, rounded to the nearest degree.
///
/// Readings of 0 or 1023 put the divider at a rail and come out as -273 °C.
/// Readings above 1023 give a negative resistance and come out as 0.
pub fn celsius_from_raw(raw: u16) -> i32 {
    let resistance = resistance_from_raw(raw);
    let mut steinhart = (resistance / NOMINAL_RESISTANCE).ln() / BETA;
    steinhart += 1.0 / (NOMINAL_TEMPERATURE_C + KELVIN_OFFSET);
    let kelvin = 1.0 / steinhart;
    (kelvin - KELVIN_OFFSET).round() as i32
}

/// A temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperature {
    pub celsius: i32,
}

impl Temperature {
    pub fn from_raw(raw: u16) -> Temperature {
        Temperature {
            celsius: celsius_from_raw(raw),
        }
    }

    pub fn fahrenheit(&self) -> f64 {
        f64::from(self.celsius) * 9.0 / 5.0 + 32.0
    }

    pub fn kelvin(&self) -> f64 {
        f64::from(self.celsius) + KELVIN_OFFSET
    }
}
