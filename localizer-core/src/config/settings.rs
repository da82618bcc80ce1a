//! Runtime settings and load-time validation

use core::fmt::Write;

use heapless::{String, Vec};
use localizer_hal::{ConfigKey, ConfigStore, StoreError};
use localizer_protocol::SENTENCE_MARKER;

use super::defaults::*;
use crate::timesync::TimeSource;

pub const SSID_LEN: usize = 32;
pub const SECRET_LEN: usize = 64;
pub const HOST_LEN: usize = 64;
pub const NAME_LEN: usize = 32;

/// Largest raw value read from the store
pub const MAX_VALUE_LEN: usize = 64;

/// A setting in its stored text form
pub type Value = String<MAX_VALUE_LEN>;

/// Settings the network module needs for the link and the broker session
pub const LINK_KEYS: [ConfigKey; 7] = [
    ConfigKey::WifiSsid,
    ConfigKey::WifiPass,
    ConfigKey::MqttBroker,
    ConfigKey::MqttPort,
    ConfigKey::MqttUser,
    ConfigKey::MqttPass,
    ConfigKey::MqttClientId,
];

/// Why a stored value was not used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Contains a byte below 0x20
    ControlByte,
    /// Contains the positioning sentence marker
    SentenceMarker,
    NotUtf8,
    TooLong,
    /// Not a valid number for a numeric key
    BadNumber,
    /// Not one of the accepted words for a choice key
    BadChoice,
    /// The store failed
    Store(StoreError),
}

impl From<StoreError> for ConfigError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::BufferTooSmall => ConfigError::TooLong,
            other => ConfigError::Store(other),
        }
    }
}

/// A rejected key and the reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rejected {
    pub key: ConfigKey,
    pub reason: ConfigError,
}

/// Device settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub wifi_ssid: String<SSID_LEN>,
    pub wifi_pass: String<SECRET_LEN>,
    pub mqtt_broker: String<HOST_LEN>,
    pub mqtt_port: u16,
    pub mqtt_user: String<NAME_LEN>,
    pub mqtt_pass: String<SECRET_LEN>,
    pub mqtt_client_id: String<NAME_LEN>,
    pub device_id: String<NAME_LEN>,
    pub time_source: TimeSource,
}

impl Default for Settings {
    fn default() -> Self {
        let device_id = literal(DEFAULT_DEVICE_ID);
        Self {
            wifi_ssid: literal(DEFAULT_WIFI_SSID),
            wifi_pass: literal(DEFAULT_WIFI_PASS),
            mqtt_broker: literal(DEFAULT_MQTT_BROKER),
            mqtt_port: DEFAULT_MQTT_PORT,
            mqtt_user: literal(DEFAULT_MQTT_USER),
            mqtt_pass: literal(DEFAULT_MQTT_PASS),
            mqtt_client_id: client_id_for(&device_id),
            device_id,
            time_source: TimeSource::Positioning,
        }
    }
}

/// Compiled defaults and field copies always fit their target
fn literal<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    let _ = out.push_str(value);
    out
}

fn client_id_for(device_id: &str) -> String<NAME_LEN> {
    let mut id = String::new();
    if write!(id, "{}{}", MQTT_CLIENT_ID_PREFIX, device_id).is_err() {
        id = literal(MQTT_CLIENT_ID_PREFIX);
    }
    id
}

/// Check raw stored bytes are printable text without the sentence marker
pub fn validate(raw: &[u8]) -> Result<&str, ConfigError> {
    if raw.iter().any(|&b| b < 0x20) {
        return Err(ConfigError::ControlByte);
    }
    if raw.contains(&SENTENCE_MARKER) {
        return Err(ConfigError::SentenceMarker);
    }
    core::str::from_utf8(raw).map_err(|_| ConfigError::NotUtf8)
}

fn text<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    let mut out = String::new();
    out.push_str(value).map_err(|_| ConfigError::TooLong)?;
    Ok(out)
}

impl Settings {
    /// Validate a raw value and store it in the field for `key`
    ///
    /// On error the field is left unchanged.
    pub fn apply(&mut self, key: ConfigKey, raw: &[u8]) -> Result<(), ConfigError> {
        let value = validate(raw)?;
        match key {
            ConfigKey::WifiSsid => self.wifi_ssid = text(value)?,
            ConfigKey::WifiPass => self.wifi_pass = text(value)?,
            ConfigKey::MqttBroker => self.mqtt_broker = text(value)?,
            ConfigKey::MqttPort => {
                self.mqtt_port = match value.parse::<u16>() {
                    Ok(port) if port != 0 => port,
                    _ => return Err(ConfigError::BadNumber),
                }
            }
            ConfigKey::MqttUser => self.mqtt_user = text(value)?,
            ConfigKey::MqttPass => self.mqtt_pass = text(value)?,
            ConfigKey::MqttClientId => self.mqtt_client_id = text(value)?,
            ConfigKey::DeviceId => self.device_id = text(value)?,
            ConfigKey::TimeSource => {
                self.time_source =
                    TimeSource::from_setting(value).ok_or(ConfigError::BadChoice)?
            }
        }
        Ok(())
    }

    /// Text form of the field for `key`, as `apply` accepts it
    pub fn value(&self, key: ConfigKey) -> Value {
        match key {
            ConfigKey::WifiSsid => literal(&self.wifi_ssid),
            ConfigKey::WifiPass => literal(&self.wifi_pass),
            ConfigKey::MqttBroker => literal(&self.mqtt_broker),
            ConfigKey::MqttPort => {
                let mut out = Value::new();
                let _ = write!(out, "{}", self.mqtt_port);
                out
            }
            ConfigKey::MqttUser => literal(&self.mqtt_user),
            ConfigKey::MqttPass => literal(&self.mqtt_pass),
            ConfigKey::MqttClientId => literal(&self.mqtt_client_id),
            ConfigKey::DeviceId => literal(&self.device_id),
            ConfigKey::TimeSource => literal(self.time_source.as_setting()),
        }
    }
}

/// Result of loading the settings
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub settings: Settings,
    /// Each rejected key appears once
    pub rejected: Vec<Rejected, { ConfigKey::ALL.len() }>,
}

/// Load every key, substituting defaults for missing or rejected values
///
/// A stored client id wins; otherwise it is derived from the device id.
pub async fn load<S: ConfigStore>(store: &mut S) -> LoadReport {
    let mut settings = Settings::default();
    let mut rejected = Vec::new();
    let mut client_id_stored = false;
    let mut buffer = [0u8; MAX_VALUE_LEN];

    for key in ConfigKey::ALL {
        let outcome = match store.read(key, &mut buffer).await {
            Ok(len) => settings.apply(key, &buffer[..len]).map(|()| true),
            Err(StoreError::NotFound) => Ok(false),
            Err(e) => Err(ConfigError::from(e)),
        };
        match outcome {
            Ok(stored) => {
                if key == ConfigKey::MqttClientId {
                    client_id_stored = stored;
                }
            }
            // Capacity equals the number of keys
            Err(reason) => {
                let _ = rejected.push(Rejected { key, reason });
            }
        }
    }

    if !client_id_stored {
        settings.mqtt_client_id = client_id_for(&settings.device_id);
    }

    LoadReport { settings, rejected }
}

/// Validate and persist one value
pub async fn store_setting<S: ConfigStore>(
    store: &mut S,
    key: ConfigKey,
    value: &str,
) -> Result<(), ConfigError> {
    Settings::default().apply(key, value.as_bytes())?;
    store.write(key, value.as_bytes()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    /// In-memory store
    struct MemoryStore {
        items: Vec<(ConfigKey, Vec<u8, 128>), 16>,
        broken: Option<ConfigKey>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self { items: Vec::new(), broken: None }
        }

        fn with(mut self, key: ConfigKey, value: &[u8]) -> Self {
            self.items
                .push((key, Vec::from_slice(value).unwrap()))
                .unwrap();
            self
        }
    }

    impl ConfigStore for MemoryStore {
        async fn read(&mut self, key: ConfigKey, buffer: &mut [u8]) -> Result<usize, StoreError> {
            if self.broken == Some(key) {
                return Err(StoreError::Storage);
            }
            let (_, value) = self
                .items
                .iter()
                .rev()
                .find(|(k, _)| *k == key)
                .ok_or(StoreError::NotFound)?;
            if buffer.len() < value.len() {
                return Err(StoreError::BufferTooSmall);
            }
            buffer[..value.len()].copy_from_slice(value);
            Ok(value.len())
        }

        async fn write(&mut self, key: ConfigKey, data: &[u8]) -> Result<(), StoreError> {
            let value = Vec::from_slice(data).map_err(|_| StoreError::BufferTooSmall)?;
            self.items.push((key, value)).map_err(|_| StoreError::Storage)
        }
    }

    #[test]
    fn test_empty_store_gives_defaults() {
        let report = block_on(load(&mut MemoryStore::new()));
        assert!(report.rejected.is_empty());
        assert_eq!(report.settings, Settings::default());
        assert_eq!(report.settings.mqtt_client_id.as_str(), "localizer_localizer");
        assert_eq!(report.settings.mqtt_port, 8883);
    }

    #[test]
    fn test_stored_values_used() {
        let mut store = MemoryStore::new()
            .with(ConfigKey::WifiSsid, b"campsite")
            .with(ConfigKey::MqttPort, b"1883")
            .with(ConfigKey::DeviceId, b"van-7")
            .with(ConfigKey::TimeSource, b"ntp");
        let report = block_on(load(&mut store));

        assert!(report.rejected.is_empty());
        let s = report.settings;
        assert_eq!(s.wifi_ssid.as_str(), "campsite");
        assert_eq!(s.mqtt_port, 1883);
        assert_eq!(s.mqtt_client_id.as_str(), "localizer_van-7");
        assert_eq!(s.time_source, TimeSource::Network);
    }

    #[test]
    fn test_corrupt_values_rejected_once_each() {
        let mut store = MemoryStore::new()
            .with(ConfigKey::WifiSsid, b"$GPRMC,123519")
            .with(ConfigKey::MqttBroker, b"host\x01name")
            .with(ConfigKey::MqttPort, b"eighty")
            .with(ConfigKey::MqttUser, b"ok-user");
        store.broken = Some(ConfigKey::MqttPass);
        let report = block_on(load(&mut store));

        assert_eq!(
            report.rejected.as_slice(),
            &[
                Rejected { key: ConfigKey::WifiSsid, reason: ConfigError::SentenceMarker },
                Rejected { key: ConfigKey::MqttBroker, reason: ConfigError::ControlByte },
                Rejected { key: ConfigKey::MqttPort, reason: ConfigError::BadNumber },
                Rejected {
                    key: ConfigKey::MqttPass,
                    reason: ConfigError::Store(StoreError::Storage)
                },
            ]
        );
        let s = report.settings;
        assert_eq!(s.wifi_ssid.as_str(), DEFAULT_WIFI_SSID);
        assert_eq!(s.mqtt_broker.as_str(), DEFAULT_MQTT_BROKER);
        assert_eq!(s.mqtt_port, DEFAULT_MQTT_PORT);
        assert_eq!(s.mqtt_user.as_str(), "ok-user");
    }

    #[test]
    fn test_overlong_value_rejected() {
        let mut store = MemoryStore::new().with(ConfigKey::DeviceId, &[b'x'; 40]);
        let report = block_on(load(&mut store));
        assert_eq!(
            report.rejected.as_slice(),
            &[Rejected { key: ConfigKey::DeviceId, reason: ConfigError::TooLong }]
        );
        assert_eq!(report.settings.device_id.as_str(), DEFAULT_DEVICE_ID);
    }

    #[test]
    fn test_value_reapplies_to_same_settings() {
        let mut store = MemoryStore::new()
            .with(ConfigKey::WifiSsid, b"camp site")
            .with(ConfigKey::MqttPort, b"1883")
            .with(ConfigKey::TimeSource, b"ntp");
        let loaded = block_on(load(&mut store)).settings;
        assert_eq!(loaded.value(ConfigKey::MqttPort).as_str(), "1883");
        assert_eq!(loaded.value(ConfigKey::WifiSsid).as_str(), "camp site");
        assert_eq!(loaded.value(ConfigKey::TimeSource).as_str(), "ntp");

        let mut copy = Settings::default();
        for key in ConfigKey::ALL {
            copy.apply(key, loaded.value(key).as_bytes()).unwrap();
        }
        assert_eq!(copy, loaded);
    }

    #[test]
    fn test_store_setting_validates() {
        let mut store = MemoryStore::new();
        assert_eq!(
            block_on(store_setting(&mut store, ConfigKey::MqttPort, "0")),
            Err(ConfigError::BadNumber)
        );
        assert!(store.items.is_empty());

        block_on(store_setting(&mut store, ConfigKey::MqttBroker, "broker.lan")).unwrap();
        let report = block_on(load(&mut store));
        assert_eq!(report.settings.mqtt_broker.as_str(), "broker.lan");
    }
}
