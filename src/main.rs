//! HealthMon Firmware — Main Entry Point
//!
//! Hexagonal architecture driven by a cooperative scheduler.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter     HttpPredictionClient   WifiAdapter        │
//! │  (Sensor+Alert)      (PredictionPort)       (Connectivity)     │
//! │  LogDisplay          LogEventSink           MonotonicClock     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MonitorService (pure logic)                 │    │
//! │  │  Local rules · Remote client · Fusion · Alert FSM      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) → MonitorRunner                   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{BLOCK, FreeRtos};
use esp_idf_svc::hal::gpio::{OutputPin, PinDriver};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use healthmon::adapters::device_id;
use healthmon::adapters::display::LogDisplay;
use healthmon::adapters::hardware::HardwareAdapter;
use healthmon::adapters::log_sink::LogEventSink;
use healthmon::adapters::prediction::HttpPredictionClient;
use healthmon::adapters::time::MonotonicClock;
use healthmon::adapters::wifi::{ConnectivityPort, WifiAdapter};
use healthmon::app::runner::MonitorRunner;
use healthmon::app::service::MonitorService;
use healthmon::config::SystemConfig;
use healthmon::drivers::hw_init;
use healthmon::error::SensorError;
use healthmon::pins;
use healthmon::scheduler::Scheduler;
use healthmon::sensors::climate::ClimateSensor;
use healthmon::sensors::gas::GasSensor;
use healthmon::sensors::pulse_ox::PulseOximeter;
use healthmon::sensors::SensorHub;

/// MAX30102 PART_ID register and its expected value.
const MAX30102_REG_PART_ID: u8 = 0xFF;
const MAX30102_PART_ID: u8 = 0x15;

/// Upper bound on one idle sleep so the loop stays responsive.
const MAX_IDLE_MS: u64 = 1000;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  HealthMon v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    // HEALTHMON_CONFIG holds an optional JSON override baked in at build time.
    let config = SystemConfig::load(option_env!("HEALTHMON_CONFIG"))
        .map_err(healthmon::error::Error::from)?;
    info!(
        "Config: poll {} ms, remote timeout {} ms, endpoint {}",
        config.timing.poll_interval_ms,
        config.timing.remote_timeout_ms,
        config.network.endpoint
    );

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Without the ADC the gas channel reads 0; keep monitoring the rest.
        warn!("HAL init failed: {}; air quality unavailable", e);
    }

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let safe = PinDriver::output(peripherals.pins.gpio10.downgrade_output())?;
    let problem = PinDriver::output(peripherals.pins.gpio11.downgrade_output())?;
    let alarm = PinDriver::output(peripherals.pins.gpio12.downgrade_output())?;

    // Kept open for the oximeter acquisition task, which publishes into the
    // pulse_ox mailbox.  Probe once so a missing module degrades to
    // "no finger" instead of stalling cycles.
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let mut sensor_bus = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &i2c_config,
    )?;
    let mut part_id = [0u8; 1];
    let pulse_ox_present = match sensor_bus.write_read(
        pins::MAX30102_I2C_ADDR,
        &[MAX30102_REG_PART_ID],
        &mut part_id,
        BLOCK,
    ) {
        Ok(()) if part_id[0] == MAX30102_PART_ID => true,
        Ok(()) => {
            warn!("Pulse oximeter: unexpected part id 0x{:02X}", part_id[0]);
            false
        }
        Err(e) => {
            warn!("Pulse oximeter: {} ({}); vitals disabled", SensorError::NotPresent, e);
            false
        }
    };

    // ── 4. Sensors + alert outputs ────────────────────────────
    let sensor_hub = SensorHub::new(
        GasSensor::new(pins::GAS_ADC_GPIO, config.calibration),
        ClimateSensor::new(
            pins::CLIMATE_DATA_GPIO,
            config.fallback.temperature_c,
            config.fallback.humidity_pct,
        ),
        PulseOximeter::new(config.fallback.finger_ir_floor, pulse_ox_present),
    );
    let hw = HardwareAdapter::new(sensor_hub, safe, problem, alarm, FreeRtos);

    // ── 5. Network ────────────────────────────────────────────
    let radio = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    let mut wifi = WifiAdapter::new(radio);
    if let Err(e) = wifi.set_credentials(
        config.network.wifi_ssid.as_str(),
        config.network.wifi_password.as_str(),
    ) {
        warn!("WiFi credentials rejected: {}", e);
    }

    let predictor = HttpPredictionClient::new(config.network.endpoint.as_str())
        .map_err(healthmon::error::Error::from)?;

    // ── 6. Services ───────────────────────────────────────────
    let mac = device_id::read_mac();
    let dev_id = device_id::resolve(config.network.device_id.as_str(), &mac);
    info!("Device ID: {}", dev_id);

    let mut sched = Scheduler::with_monitor_jobs(
        config.timing.poll_interval_ms,
        config.timing.connectivity_check_interval_ms,
    );

    let service = MonitorService::new(config, dev_id.as_str());
    let mut runner = MonitorRunner::new(
        service,
        hw,
        predictor,
        wifi,
        LogDisplay::new(),
        LogEventSink::new(),
        MonotonicClock::new(),
    );
    runner.start();

    info!("System ready. Entering monitor loop.");

    // ── 7. Monitor loop ───────────────────────────────────────
    loop {
        runner.poll(&mut sched);

        let wait = runner
            .idle_for(&sched)
            .unwrap_or(MAX_IDLE_MS)
            .clamp(1, MAX_IDLE_MS);
        FreeRtos::delay_ms(wait as u32);
    }
}
