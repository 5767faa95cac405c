fn main() {
    println!("cargo:rerun-if-env-changed=HEALTHMON_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=HEALTHMON_WIFI_PASS");
    println!("cargo:rerun-if-env-changed=HEALTHMON_ENDPOINT");
    println!("cargo:rerun-if-env-changed=HEALTHMON_DEVICE_ID");
    println!("cargo:rerun-if-env-changed=HEALTHMON_CONFIG");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
