//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements        | Connects to                  |
//! |--------------|-------------------|------------------------------|
//! | `hardware`   | SensorPort        | Sensor front ends            |
//! |              | AlertPort         | Indicator LEDs, buzzer       |
//! | `prediction` | PredictionPort    | HTTP prediction service      |
//! | `display`    | DisplayPort       | Panel text layout / log      |
//! | `log_sink`   | EventSink         | Serial log output            |
//! | `wifi`       | ConnectivityPort  | ESP-IDF WiFi STA             |
//! | `time`       | —                 | ESP32 system timer           |
//! | `device_id`  | —                 | Factory MAC (eFuse)          |

pub mod device_id;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod prediction;
pub mod time;
pub mod wifi;
