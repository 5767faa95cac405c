//! GPIO / peripheral pin assignments for the HealthMon board (ESP32-S3).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// MQ-135 air-quality sensor — load-resistor voltage.
/// ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const GAS_ADC_GPIO: i32 = 4;
pub const GAS_ADC_CHANNEL: u32 = 3;

// ---------------------------------------------------------------------------
// Sensors — Digital
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (external 10 kΩ pull-up).
pub const CLIMATE_DATA_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// I²C bus (MAX30102 pulse oximeter, SSD1306 display)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
pub const I2C_FREQ_HZ: u32 = 400_000;

pub const MAX30102_I2C_ADDR: u8 = 0x57;
pub const DISPLAY_I2C_ADDR: u8 = 0x3C;

// ---------------------------------------------------------------------------
// Alert outputs (active HIGH)
// ---------------------------------------------------------------------------

/// Green "safe" LED.
pub const SAFE_LED_GPIO: i32 = 10;
/// Red "problem" LED.
pub const PROBLEM_LED_GPIO: i32 = 11;
/// Active buzzer via NPN low-side switch.
pub const ALARM_GPIO: i32 = 12;
