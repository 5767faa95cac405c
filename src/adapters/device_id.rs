//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces a stable, human-readable device ID in the form `HM-XXYYZZ`
//! (last 3 bytes of the 6-byte MAC in uppercase hex).  It is sent as
//! `device_id` with every prediction request unless one is configured.

/// Fixed-size device ID string.
pub type DeviceIdString = heapless::String<32>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: writes exactly 6 bytes into the caller-owned buffer.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive the short device ID from the last 3 MAC bytes.
/// Format: `HM-XXYYZZ` (e.g., `HM-EFCAFE`).
pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    use core::fmt::Write;
    let _ = write!(id, "HM-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

/// The configured id if set, otherwise the MAC-derived one.
pub fn resolve(configured: &str, mac: &MacAddress) -> DeviceIdString {
    if configured.trim().is_empty() {
        device_id(mac)
    } else {
        crate::config::bounded(configured.trim())
    }
}
