//! Irrigation daemon for a machine with a USB serial motorboard and an
//! IIO moisture probe.
//!
//! ```text
//! irrigated <serial-port> [adc-path]
//! ```
//!
//! Runs the sample / evaluate / sleep loop forever. If the motorboard
//! never answers during setup, the loop still runs in monitoring-only
//! mode: dryness is evaluated and logged, but the pump actuator refuses
//! to run and no motor command ever touches the wire until the board
//! answers a probe.

use anyhow::{Context, Result};
use log::{info, warn};

use rs_irrigate::hal::{IioMoisture, SerialTransport, SystemClock};
use rs_irrigate::{
    Clock, IrrigationConfig, IrrigationController, LinkConfig, MoistureSource, Motorboard,
    SensorCal,
};

const DEFAULT_ADC_PATH: &str = "/sys/bus/iio/devices/iio:device0/in_voltage0_raw";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let port_name = args
        .next()
        .context("usage: irrigated <serial-port> [adc-path]")?;
    let adc_path = args.next().unwrap_or_else(|| DEFAULT_ADC_PATH.to_string());

    let link_config = LinkConfig::default();
    let cycle_config = IrrigationConfig::default();

    let mut board = Motorboard::new(
        SerialTransport::new(port_name.as_str()),
        SystemClock::new(),
        link_config,
    );

    match board.establish() {
        Ok(()) => {
            if let Err(e) = board.self_test() {
                warn!("motors self-test failed: {e}");
            }
        }
        Err(e) => {
            // Degrade rather than exit: the cycle still runs in
            // monitoring-only mode, with pump actuation refused off
            // the wire until the board answers.
            warn!("running without motorboard: {e}");
        }
    }

    let mut moisture = IioMoisture::new(adc_path, SensorCal::default());
    let mut controller = IrrigationController::new(board, cycle_config);
    let mut clock = SystemClock::new();

    info!("entering irrigation loop on {port_name}");
    loop {
        let sample = moisture.read();
        if let Err(e) = controller.tick(sample, clock.now_ms()) {
            warn!("tick failed: {e}");
        }
        clock.sleep_ms(cycle_config.sample_period_ms);
    }
}
