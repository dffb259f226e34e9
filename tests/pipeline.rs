use adc_telemetry::checksum::checksum;
use adc_telemetry::convert::Calibration;
use adc_telemetry::packet::FramePadding;
use adc_telemetry::pipeline::{Cycle, Payload, Pipeline, PipelineConfig};
use adc_telemetry::traits::{ConversionTrigger, TxInterrupt};
use embedded_hal_mock::eh1::serial::{Mock as SerialMock, Transaction as SerialTransaction};
use embedded_hal_nb::serial::{ErrorKind, ErrorType, Write};

const CONVERTED: PipelineConfig = PipelineConfig {
    calibration: Calibration::DEFAULT,
    payload: Payload::Converted,
    padding: FramePadding::None,
};

/// Stands in for the ADC + DMA pair: counts triggers, the test plays the DMA.
#[derive(Debug, Default)]
pub struct FakeAdc {
    starts: usize,
}

impl ConversionTrigger for FakeAdc {
    fn start_conversion(&mut self) {
        self.starts += 1;
    }
}

pub struct MockUart {
    serial: SerialMock<u8>,
    listening: bool,
}

impl ErrorType for MockUart {
    type Error = <SerialMock<u8> as ErrorType>::Error;
}

impl Write<u8> for MockUart {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.serial.write(word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.serial.flush()
    }
}

impl TxInterrupt for MockUart {
    fn listen_tx(&mut self) {
        self.listening = true;
    }

    fn unlisten_tx(&mut self) {
        self.listening = false;
    }
}

#[derive(Debug, Default)]
pub struct RecordingUart {
    written: Vec<u8>,
    listening: bool,
}

impl ErrorType for RecordingUart {
    type Error = ErrorKind;
}

impl Write<u8> for RecordingUart {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.written.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

impl TxInterrupt for RecordingUart {
    fn listen_tx(&mut self) {
        self.listening = true;
    }

    fn unlisten_tx(&mut self) {
        self.listening = false;
    }
}

mod interrupt_wiring {
    use super::*;

    adc_telemetry::init_telemetry!(MockUart, FakeAdc);

    #[test]
    fn test_one_cycle_through_the_interrupt_handlers() {
        let frame = [0xA5, 0x38, 0x03, 0x0C, 0x08, 0x7E];
        let uart = MockUart {
            serial: SerialMock::new(&[SerialTransaction::write_many(frame)]),
            listening: false,
        };
        adc_telemetry::setup_telemetry!(uart, FakeAdc::default());
        let mut pipeline = Pipeline::new(CONVERTED);

        // woken by the trigger: nothing to send yet
        adc_telemetry::telemetry_trigger_isr!();
        assert_eq!(
            pipeline.service_global(&TELEMETRY_SAMPLES, &TELEMETRY_TX),
            Ok(Cycle::NoData)
        );

        // woken by the DMA: frame goes out
        adc_telemetry::telemetry_conversion_isr!(&[0x100, 0x200]);
        assert_eq!(
            pipeline.service_global(&TELEMETRY_SAMPLES, &TELEMETRY_TX),
            Ok(Cycle::Sent {
                current: 2060,
                voltage: 824
            })
        );

        // woken by the UART: five more bytes, then the end-of-frame interrupt
        for _ in 0..frame.len() {
            adc_telemetry::telemetry_serial_isr!().unwrap();
            assert_eq!(
                pipeline.service_global(&TELEMETRY_SAMPLES, &TELEMETRY_TX),
                Ok(Cycle::NoData)
            );
        }

        critical_section::with(|cs| {
            let mut tx = TELEMETRY_TX.borrow(cs).borrow_mut();
            let tx = tx.as_mut().unwrap();
            assert!(tx.is_idle());
            assert_eq!(tx.frames_sent, 1);
            assert!(!tx.port().listening);
            tx.port_mut().serial.done();

            let trigger = TELEMETRY_TRIGGER.borrow(cs).borrow();
            assert_eq!(trigger.as_ref().unwrap().adc().starts, 1);
        });
    }
}

mod idle_loop {
    use super::*;
    use adc_telemetry::traits::WaitForInterrupt;

    adc_telemetry::init_telemetry!(RecordingUart, FakeAdc);

    #[derive(Debug, Clone, Copy)]
    enum Irq {
        Trigger,
        ConversionComplete([u16; 2]),
        SerialReady,
    }

    /// Plays one scripted interrupt per wake-up, then checks the wire and stops the loop.
    struct ScriptedWfi {
        script: Vec<Irq>,
        expected: Vec<u8>,
    }

    impl WaitForInterrupt for ScriptedWfi {
        fn wait_for_interrupt(&mut self) {
            if self.script.is_empty() {
                critical_section::with(|cs| {
                    let tx = TELEMETRY_TX.borrow(cs).borrow();
                    assert_eq!(tx.as_ref().unwrap().port().written, self.expected);
                });
                panic!("script finished");
            }
            match self.script.remove(0) {
                Irq::Trigger => adc_telemetry::telemetry_trigger_isr!(),
                Irq::ConversionComplete(buf) => adc_telemetry::telemetry_conversion_isr!(&buf),
                Irq::SerialReady => adc_telemetry::telemetry_serial_isr!().unwrap(),
            }
        }
    }

    fn frame(current: u16, voltage: u16) -> Vec<u8> {
        let v = voltage.to_le_bytes();
        let c = current.to_le_bytes();
        let mut bytes = vec![0xA5, v[0], v[1], c[0], c[1]];
        bytes.push(checksum(&bytes));
        bytes
    }

    #[test]
    #[should_panic(expected = "script finished")]
    fn test_run_sends_each_cycle_and_drops_while_busy() {
        adc_telemetry::setup_telemetry!(RecordingUart::default(), FakeAdc::default());

        let mut script = vec![Irq::Trigger, Irq::ConversionComplete([0x100, 0x200])];
        // second cycle lands while the first frame is still on the wire
        script.extend([Irq::SerialReady, Irq::SerialReady]);
        script.extend([Irq::Trigger, Irq::ConversionComplete([0xFFF, 0xFFF])]);
        script.extend([Irq::SerialReady; 4]);
        // third cycle after the transmitter went idle
        script.extend([Irq::Trigger, Irq::ConversionComplete([0, 0xFFF])]);
        script.extend([Irq::SerialReady; 6]);

        let mut expected = frame(2060, 824);
        expected.extend(frame(0, 6600));

        let mut wfi = ScriptedWfi { script, expected };
        let mut pipeline = Pipeline::new(CONVERTED);
        pipeline.run(&TELEMETRY_SAMPLES, &TELEMETRY_TX, &mut wfi);
    }
}

mod polled_loop {
    use super::*;
    use adc_telemetry::consts::TRIGGER_PERIOD_US;
    use adc_telemetry::sampling::Scheduler;
    use adc_telemetry::timer::run_polled_loop;
    use embedded_hal::delay::DelayNs;

    adc_telemetry::init_telemetry!(RecordingUart, ConvertingAdc);

    /// Completes every conversion at once, the way ADC + DMA would a few
    /// microseconds after the trigger.
    #[derive(Debug, Default)]
    pub struct ConvertingAdc;

    impl ConversionTrigger for ConvertingAdc {
        fn start_conversion(&mut self) {
            adc_telemetry::telemetry_conversion_isr!(&[0x100, 0x200]);
        }
    }

    /// Lets the UART drain one frame per period and stops the loop on the third.
    struct ScriptedDelay {
        periods: usize,
    }

    impl DelayNs for ScriptedDelay {
        fn delay_ns(&mut self, ns: u32) {
            assert_eq!(ns, TRIGGER_PERIOD_US * 1_000);
            self.periods += 1;
            if self.periods == 3 {
                critical_section::with(|cs| {
                    let tx = TELEMETRY_TX.borrow(cs).borrow();
                    let tx = tx.as_ref().unwrap();
                    // one full frame, then the first byte of the second
                    assert_eq!(
                        tx.port().written,
                        [0xA5, 0x38, 0x03, 0x0C, 0x08, 0x7E, 0xA5]
                    );
                    assert_eq!(tx.frames_sent, 1);
                    assert_eq!(tx.requests_dropped, 0);
                    assert!(tx.port().listening);
                });
                panic!("script finished");
            }
            for _ in 0..6 {
                adc_telemetry::telemetry_serial_isr!().unwrap();
            }
        }
    }

    #[test]
    #[should_panic(expected = "script finished")]
    fn test_polled_loop_sends_one_frame_per_period() {
        adc_telemetry::isr::global_transmitter_setup(&TELEMETRY_TX, RecordingUart::default());
        let mut scheduler = Scheduler::new(ConvertingAdc);
        let mut pipeline = Pipeline::new(CONVERTED);
        let mut delay = ScriptedDelay { periods: 0 };

        run_polled_loop(
            &mut pipeline,
            &mut scheduler,
            &TELEMETRY_SAMPLES,
            &TELEMETRY_TX,
            &mut delay,
            TRIGGER_PERIOD_US,
        );
    }
}
