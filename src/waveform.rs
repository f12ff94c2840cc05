//! Signal shapes for the PCF8591 DAC demos.
//!
//! The DAC has no waveform engine: the demo writes a voltage, sleeps, and
//! writes the next one. These types only compute the levels and hold times.

/// Microseconds per second.
const MICROS: u64 = 1_000_000;

/// Square wave between two voltages.
///
/// # Example
///
/// ```rust
/// use pihat_kit::waveform::SquareWave;
///
/// let wave = SquareWave::new(3000, 1000, 1000, 50);
/// assert_eq!(wave.period_us(), 1000);
/// assert_eq!(wave.high_us(), 500);
/// assert_eq!(wave.low_us(), 500);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SquareWave {
    /// High level in millivolts.
    pub high_mv: u32,
    /// Low level in millivolts.
    pub low_mv: u32,
    /// Frequency in Hz (at least 1).
    pub frequency_hz: u32,
    /// Share of the period spent high, 0..=100.
    pub duty_percent: u8,
}

impl SquareWave {
    /// Creates a square wave; frequency is raised to 1 Hz and duty capped at 100 %.
    pub fn new(high_mv: u32, low_mv: u32, frequency_hz: u32, duty_percent: u8) -> Self {
        Self {
            high_mv,
            low_mv,
            frequency_hz: frequency_hz.max(1),
            duty_percent: duty_percent.min(100),
        }
    }

    /// Full period in microseconds.
    pub fn period_us(&self) -> u64 {
        MICROS / u64::from(self.frequency_hz.max(1))
    }

    /// Time spent at the high level, in microseconds.
    pub fn high_us(&self) -> u64 {
        self.period_us() * u64::from(self.duty_percent.min(100)) / 100
    }

    /// Time spent at the low level, in microseconds.
    pub fn low_us(&self) -> u64 {
        self.period_us() - self.high_us()
    }

    /// The two (level, hold) steps of one period.
    pub fn steps(&self) -> [(u32, u64); 2] {
        [(self.high_mv, self.high_us()), (self.low_mv, self.low_us())]
    }
}

/// Sampled sine wave around an offset voltage.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SineWave {
    /// Centre voltage in millivolts.
    pub offset_mv: u32,
    /// Peak deviation from the centre in millivolts.
    pub amplitude_mv: u32,
    /// Frequency in Hz.
    pub frequency_hz: u32,
    /// DAC updates per period.
    pub samples_per_cycle: u32,
}

#[cfg(feature = "std")]
impl SineWave {
    /// Creates a sine wave with `samples_per_cycle` updates per period.
    pub fn new(offset_mv: u32, amplitude_mv: u32, frequency_hz: u32, samples_per_cycle: u32) -> Self {
        Self {
            offset_mv,
            amplitude_mv,
            frequency_hz: frequency_hz.max(1),
            samples_per_cycle: samples_per_cycle.max(2),
        }
    }

    /// Hold time between samples in microseconds.
    pub fn sample_period_us(&self) -> u64 {
        MICROS / (u64::from(self.frequency_hz) * u64::from(self.samples_per_cycle))
    }

    /// Voltage of sample `index` (wraps every period), never below zero.
    pub fn sample(&self, index: u32) -> u32 {
        let phase = f64::from(index % self.samples_per_cycle) / f64::from(self.samples_per_cycle);
        let value = f64::from(self.offset_mv)
            + f64::from(self.amplitude_mv) * (phase * core::f64::consts::TAU).sin();
        value.round().max(0.0) as u32
    }

    /// Iterates over one period of samples.
    pub fn cycle(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.samples_per_cycle).map(move |i| self.sample(i))
    }
}
