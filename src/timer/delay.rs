use embedded_hal::delay::DelayNs;

use crate::isr::GlobalTransmitter;
use crate::pipeline::Pipeline;
use crate::sampling::{SampleHandoff, Scheduler};
use crate::traits::{ConversionTrigger, TxPort};

/// Runs a blocking loop that fires the sampling trigger every `period_us` and
/// services the pipeline in between.
///
/// This replaces both the periodic trigger interrupt and [`Pipeline::run`] on boards
/// where no hardware timer is free. The conversion-complete and serial interrupts
/// still run as usual.
///
/// # Arguments
/// - `pipeline`: the main-loop state
/// - `scheduler`: the [`Scheduler`] owning the conversion engine
/// - `handoff`: the mailbox the conversion-complete interrupt publishes into
/// - `global_tx`: the transmitter shared with the serial interrupt
/// - `delay`: a delay provider implementing `DelayNs`, typically from the HAL
/// - `period_us`: the delay between triggers, in microseconds
///
/// # Example
/// ```rust,ignore
/// use adc_telemetry::timer::run_polled_loop;
/// let mut scheduler = Scheduler::new(adc);
/// let mut pipeline = Pipeline::default();
/// run_polled_loop(&mut pipeline, &mut scheduler, &SAMPLES, &TELEMETRY_TX, &mut delay, 5_000);
/// ```
///
/// # Notes
/// - This loop never returns and burns cycles in `delay` instead of sleeping.
/// - The period stretches by the time one service step takes. The sample rate is not
///   exact, but every period still produces at most one frame.
/// - Service errors are logged and otherwise ignored, as in [`Pipeline::run`].
pub fn run_polled_loop<C, P, D>(
    pipeline: &mut Pipeline,
    scheduler: &mut Scheduler<C>,
    handoff: &SampleHandoff,
    global_tx: &'static GlobalTransmitter<P>,
    delay: &mut D,
    period_us: u32,
) -> !
where
    C: ConversionTrigger,
    P: TxPort,
    D: DelayNs,
{
    loop {
        scheduler.on_trigger();
        delay.delay_us(period_us);
        if let Err(err) = pipeline.service_global(handoff, global_tx) {
            warn!("telemetry cycle failed: {}", err);
        }
    }
}
