//! Compiled defaults

// Display window of the 128x64 controller
pub const DISPLAY_WIDTH: usize = 72;
pub const DISPLAY_HEIGHT: usize = 40;
pub const DISPLAY_UPDATE_MS: u64 = 100;

pub const I2C_FREQ_HZ: u32 = 400_000;

pub const OLED_I2C_ADDR: u8 = 0x3C;
/// Window origin in controller RAM; the row offset must be page aligned
pub const OLED_X_OFFSET: u8 = 28;
pub const OLED_Y_OFFSET: u8 = 24;

pub const GPS_BAUD_RATE: u32 = 9600;
pub const GPS_BUFFER_SIZE: usize = 1024;
/// Bounded wait of one receiver read
pub const GPS_READ_TIMEOUT_MS: u64 = 100;
/// Interval of the "no fix yet" warning
pub const GPS_FIX_TIMEOUT_MS: u64 = 60_000;

pub const RTC_I2C_ADDR: u8 = 0x68;
/// Clock read-back interval once the sync is decided
pub const RTC_READBACK_MS: u64 = 60_000;

pub const UPLINK_BAUD_RATE: u32 = 115_200;
pub const UPLINK_BUFFER_SIZE: usize = 512;

pub const DEFAULT_WIFI_SSID: &str = "";
pub const DEFAULT_WIFI_PASS: &str = "";

pub const DEFAULT_MQTT_BROKER: &str = "mqtt.syquens.com";
pub const DEFAULT_MQTT_PORT: u16 = 8883;
pub const DEFAULT_MQTT_USER: &str = "camper_device";
pub const DEFAULT_MQTT_PASS: &str = "";
pub const MQTT_CLIENT_ID_PREFIX: &str = "localizer_";

pub const DEFAULT_DEVICE_ID: &str = "localizer";
pub const DEFAULT_TIME_SOURCE: &str = "gps";

pub const TOPIC_GPS: &str = "camper/gps";
pub const TOPIC_STATUS: &str = "camper/status";
pub const TOPIC_LOCATION: &str = "camper/location";

pub const TELEMETRY_INTERVAL_MS: u64 = 10_000;
pub const GEOLOCATION_INTERVAL_MS: u64 = 5_000;
pub const GEOCODE_TIMEOUT_MS: u64 = 10_000;
