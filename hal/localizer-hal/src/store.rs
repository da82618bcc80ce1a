//! Configuration store abstractions
//!
//! A small key-value store holding the device's runtime settings. Values
//! are raw bytes; validation and defaults live with the settings model.

/// Keys for stored settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ConfigKey {
    WifiSsid = 0,
    WifiPass = 1,
    MqttBroker = 2,
    /// Decimal text, e.g. `8883`
    MqttPort = 3,
    MqttUser = 4,
    MqttPass = 5,
    MqttClientId = 6,
    DeviceId = 7,
    /// `gps` or `ntp`
    TimeSource = 8,
}

impl ConfigKey {
    /// Every key, in storage order
    pub const ALL: [ConfigKey; 9] = [
        ConfigKey::WifiSsid,
        ConfigKey::WifiPass,
        ConfigKey::MqttBroker,
        ConfigKey::MqttPort,
        ConfigKey::MqttUser,
        ConfigKey::MqttPass,
        ConfigKey::MqttClientId,
        ConfigKey::DeviceId,
        ConfigKey::TimeSource,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    /// Human readable key name, as used by provisioning tools
    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::WifiSsid => "wifi_ssid",
            ConfigKey::WifiPass => "wifi_pass",
            ConfigKey::MqttBroker => "mqtt_broker",
            ConfigKey::MqttPort => "mqtt_port",
            ConfigKey::MqttUser => "mqtt_user",
            ConfigKey::MqttPass => "mqtt_pass",
            ConfigKey::MqttClientId => "mqtt_client",
            ConfigKey::DeviceId => "device_id",
            ConfigKey::TimeSource => "time_source",
        }
    }
}

/// Errors from store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
}

/// Key-value settings store
///
/// Implementations handle wear leveling and data integrity.
pub trait ConfigStore {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(
        &mut self,
        key: ConfigKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, StoreError>>;

    /// Write a value by key
    fn write(
        &mut self,
        key: ConfigKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StoreError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for ConfigKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match ConfigKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_byte_round_trip() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::from_u8(key.as_u8()), Some(key));
        }
        assert_eq!(ConfigKey::from_u8(9), None);
    }

    #[test]
    fn test_key_names_unique() {
        for (i, a) in ConfigKey::ALL.iter().enumerate() {
            for b in &ConfigKey::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
