//! Integration tests for the PCF8591 converter and DAC waveforms

use embedded_hal::i2c::ErrorKind;
use pihat_kit::config::Pcf8591Config;
use pihat_kit::hal::{MockDelay, MockI2c};
use pihat_kit::pcf8591::DEFAULT_ADDRESS;
use pihat_kit::waveform::{SineWave, SquareWave};
use pihat_kit::{Error, InputMode, Pcf8591};

fn converter(i2c: MockI2c) -> Pcf8591<MockI2c, MockDelay> {
    Pcf8591::new(i2c, MockDelay::new(), DEFAULT_ADDRESS)
}

// ============================================================================
// ADC
// ============================================================================

#[test]
fn four_channel_sweep() {
    let mut i2c = MockI2c::new();
    for code in [0x00, 0x40, 0x80, 0xFF] {
        i2c.queue_read(&[0xAA, code]);
    }
    let mut adc = converter(i2c);

    let mv: Vec<u32> = (0..4).map(|ch| adc.read_millivolts(ch).unwrap()).collect();
    assert_eq!(mv, vec![0, 828, 1656, 3300]);

    let (i2c, delay) = adc.release();
    let controls: Vec<u8> = i2c.writes.iter().map(|(_, bytes)| bytes[0]).collect();
    assert_eq!(controls, vec![0x40, 0x41, 0x42, 0x43]);
    assert!(i2c.reads.iter().all(|&(addr, len)| addr == DEFAULT_ADDRESS && len == 2));
    assert_eq!(delay.elapsed_us(), 400);
}

#[test]
fn channel_check_follows_mode() {
    let mut adc = converter(MockI2c::new()).with_input_mode(InputMode::TwoDifferential);
    assert_eq!(
        adc.read_channel(2),
        Err(Error::InvalidChannel {
            channel: 2,
            mode: InputMode::TwoDifferential
        })
    );

    let mut adc = converter(MockI2c::new()).with_input_mode(InputMode::ThreeDifferential);
    assert!(adc.read_channel(2).is_ok());
    assert!(adc.read_channel(3).is_err());
}

#[test]
fn scan_reads_mode_channel_count() {
    let mut i2c = MockI2c::new();
    i2c.queue_read(&[0x00, 0x11, 0x22, 0x33]);
    let mut adc = converter(i2c).with_input_mode(InputMode::ThreeDifferential);

    assert_eq!(adc.read_all().unwrap().as_slice(), &[0x11, 0x22, 0x33]);
    let (i2c, delay) = adc.release();
    assert_eq!(i2c.reads, vec![(DEFAULT_ADDRESS, 4)]);
    assert_eq!(delay.elapsed_ms(), 100);
}

#[test]
fn config_drives_driver_settings() {
    let config = Pcf8591Config::default().with_address(0x49).with_vref_mv(5000);
    let mut i2c = MockI2c::new();
    i2c.queue_read(&[0x00, 0xFF]);
    let mut adc = Pcf8591::new(i2c, MockDelay::new(), config.address)
        .with_vref_mv(config.vref_mv)
        .with_input_mode(config.input_mode);

    assert_eq!(adc.read_millivolts(0).unwrap(), 5000);
    let (i2c, _) = adc.release();
    assert_eq!(i2c.writes[0].0, 0x49);
}

// ============================================================================
// DAC
// ============================================================================

#[test]
fn passthrough_copies_code() {
    let mut i2c = MockI2c::new();
    i2c.queue_read(&[0x00, 0x9C]);
    let mut dac = converter(i2c);

    let code = dac.read_channel(0).unwrap();
    dac.write_dac(code).unwrap();
    assert_eq!(dac.dac_code(), 0x9C);

    let (i2c, _) = dac.release();
    assert_eq!(i2c.writes.last().unwrap().1, vec![0x40, 0x9C]);
}

#[test]
fn voltage_above_reference_rejected() {
    let mut dac = converter(MockI2c::new());
    assert_eq!(
        dac.write_millivolts(3301),
        Err(Error::VoltageOutOfRange {
            millivolts: 3301,
            max_mv: 3300
        })
    );
    assert_eq!(dac.dac_code(), 0);
    let (i2c, _) = dac.release();
    assert!(i2c.writes.is_empty());
}

#[test]
fn failed_write_keeps_previous_code() {
    let mut i2c = MockI2c::new();
    i2c.fail_next(ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Address));
    let mut dac = converter(i2c);
    assert!(matches!(dac.write_dac(0x80), Err(Error::Bus(_))));
    assert_eq!(dac.dac_code(), 0);
}

#[test]
fn square_wave_program() {
    let wave = SquareWave::new(3000, 1000, 1000, 25);
    let mut dac = converter(MockI2c::new());
    let mut delay = MockDelay::new();

    for (mv, hold_us) in wave.steps() {
        dac.write_millivolts(mv).unwrap();
        embedded_hal::delay::DelayNs::delay_us(&mut delay, hold_us as u32);
    }

    assert_eq!(delay.elapsed_us(), 1000);
    let (i2c, _) = dac.release();
    let codes: Vec<u8> = i2c.writes.iter().map(|(_, bytes)| bytes[1]).collect();
    assert_eq!(codes, vec![231, 77]);
}

#[test]
fn sine_wave_stays_in_range() {
    let wave = SineWave::new(1650, 1650, 10, 628);
    assert_eq!(wave.sample_period_us(), 159);

    let mut dac = converter(MockI2c::new());
    for mv in wave.cycle() {
        dac.write_millivolts(mv.min(dac.vref_mv())).unwrap();
    }
    let (i2c, _) = dac.release();
    assert_eq!(i2c.writes.len(), 628);
    let codes: Vec<u8> = i2c.writes.iter().map(|(_, bytes)| bytes[1]).collect();
    assert_eq!(codes[0], 127);
    assert_eq!(*codes.iter().max().unwrap(), 255);
    assert_eq!(*codes.iter().min().unwrap(), 0);
}
