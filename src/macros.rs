/// Declares the global telemetry singletons.
///
/// Creates three `static`s in the calling module, suitable for use from both
/// `main` and the interrupt handlers:
///
/// - `TELEMETRY_TX`: the [`Transmitter`](crate::transmit::Transmitter) for `$port`
/// - `TELEMETRY_TRIGGER`: the [`Scheduler`](crate::sampling::Scheduler) for `$adc`
/// - `TELEMETRY_SAMPLES`: the [`SampleHandoff`](crate::sampling::SampleHandoff)
///
/// # Arguments
/// - `$port`: the concrete serial port type (must implement [`TxPort`](crate::traits::TxPort))
/// - `$adc`: the concrete conversion engine type (must implement
///   [`ConversionTrigger`](crate::traits::ConversionTrigger))
///
/// # Example
/// ```rust,ignore
/// init_telemetry!(Usart2Tx, AdcDma);
/// ```
#[macro_export]
macro_rules! init_telemetry {
    ( $port:ty, $adc:ty ) => {
        pub static TELEMETRY_TX: $crate::isr::GlobalTransmitter<$port> =
            $crate::isr::global_transmitter_init::<$port>();
        pub static TELEMETRY_TRIGGER: $crate::isr::GlobalScheduler<$adc> =
            $crate::isr::global_scheduler_init::<$adc>();
        pub static TELEMETRY_SAMPLES: $crate::sampling::SampleHandoff =
            $crate::sampling::SampleHandoff::new();
    };
}

/// Moves the serial port and conversion engine into the singletons declared by
/// [`init_telemetry!`].
///
/// # Example
/// ```rust,ignore
/// main() {
///     setup_telemetry!(usart2_tx, adc_dma);
///     // unmask interrupts and start the trigger timer last
/// }
/// ```
///
/// # Notes
/// - Call from `main` before unmasking the serial and trigger interrupts.
#[macro_export]
macro_rules! setup_telemetry {
    ( $port:expr, $adc:expr ) => {
        $crate::isr::global_transmitter_setup(&TELEMETRY_TX, $port);
        $crate::isr::global_scheduler_setup(&TELEMETRY_TRIGGER, $adc);
    };
}

/// Body of the trigger timer interrupt: starts one conversion.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM21() {
///     // clear the update flag first
///     telemetry_trigger_isr!();
/// }
/// ```
#[macro_export]
macro_rules! telemetry_trigger_isr {
    () => {
        $crate::isr::global_trigger_tick(&TELEMETRY_TRIGGER)
    };
}

/// Body of the conversion-complete interrupt: publishes the DMA buffer and raises
/// the ready signal.
///
/// # Arguments
/// - `$buf`: a `&[u16; 2]` holding `[current, voltage]`
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn DMA1_CHANNEL1() {
///     // clear the transfer-complete flag first
///     telemetry_conversion_isr!(&ADC_DMA_BUF);
/// }
/// ```
#[macro_export]
macro_rules! telemetry_conversion_isr {
    ( $buf:expr ) => {
        TELEMETRY_SAMPLES.signal_ready_from_dma($buf)
    };
}

/// Body of the serial "transmit register empty" interrupt: emits the next byte.
///
/// Evaluates to the `Result` of
/// [`Transmitter::on_byte_ready`](crate::transmit::Transmitter::on_byte_ready).
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn USART2() {
///     let _ = telemetry_serial_isr!();
/// }
/// ```
#[macro_export]
macro_rules! telemetry_serial_isr {
    () => {
        $crate::isr::global_serial_ready(&TELEMETRY_TX)
    };
}
