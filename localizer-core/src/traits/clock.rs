//! Persistent calendar clock

/// Register-addressed calendar clock device
///
/// Every register holds one packed-decimal calendar field. Writes are one
/// register at a time; there is no device-level transaction.
pub trait ClockRegisters {
    /// Bus error type
    type Error;

    /// Write one register
    fn write_register(
        &mut self,
        register: u8,
        value: u8,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Read `buffer.len()` consecutive registers starting at `start`
    fn read_registers(
        &mut self,
        start: u8,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}
