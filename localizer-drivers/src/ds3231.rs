//! DS3231 real-time clock
//!
//! Calendar registers 0x00..=0x06 hold packed-decimal time fields; the
//! status register 0x0F reports whether the oscillator ever stopped
//! (battery lost), in which case the stored time is meaningless.

use embedded_hal_async::i2c::I2c;
use localizer_core::config::defaults::RTC_I2C_ADDR;
use localizer_core::traits::ClockRegisters;

/// Default I2C address
pub const DS3231_ADDR: u8 = RTC_I2C_ADDR;

mod reg {
    pub const STATUS: u8 = 0x0F;
}

/// Oscillator stop flag in the status register
const STATUS_OSF: u8 = 0x80;

/// DS3231 driver
pub struct Ds3231<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DS3231_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// True if the oscillator stopped since the flag was last cleared
    pub async fn oscillator_stopped(&mut self) -> Result<bool, I2C::Error> {
        let mut status = [0u8];
        self.read_registers(reg::STATUS, &mut status).await?;
        Ok(status[0] & STATUS_OSF != 0)
    }

    /// Clear the oscillator stop flag, keeping the other status bits
    pub async fn clear_oscillator_stop(&mut self) -> Result<(), I2C::Error> {
        let mut status = [0u8];
        self.read_registers(reg::STATUS, &mut status).await?;
        self.write_register(reg::STATUS, status[0] & !STATUS_OSF).await
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> ClockRegisters for Ds3231<I2C> {
    type Error = I2C::Error;

    async fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[register, value]).await
    }

    async fn read_registers(&mut self, start: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[start], buffer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockI2c;
    use embassy_futures::block_on;
    use localizer_core::timesync::{read_calendar, write_calendar, CalendarValue, ClockError};

    fn sample() -> CalendarValue {
        CalendarValue { second: 5, minute: 30, hour: 8, day: 17, month: 10, year: 26 }
    }

    #[test]
    fn test_calendar_write_is_six_single_register_writes() {
        let mut rtc = Ds3231::new(MockI2c::new());
        block_on(write_calendar(&mut rtc, &sample())).unwrap();

        let bus = rtc.release();
        let writes: Vec<&[u8]> = bus.writes.iter().map(|(_, f)| f.as_slice()).collect();
        assert_eq!(
            writes,
            [
                &[0x00, 0x05][..],
                &[0x01, 0x30],
                &[0x02, 0x08],
                &[0x04, 0x17],
                &[0x05, 0x10],
                &[0x06, 0x26],
            ]
        );
        assert!(bus.writes.iter().all(|(addr, _)| *addr == DS3231_ADDR));
    }

    #[test]
    fn test_calendar_read_back() {
        let mut rtc = Ds3231::new(MockI2c::new());
        block_on(write_calendar(&mut rtc, &sample())).unwrap();
        assert_eq!(block_on(read_calendar(&mut rtc)), Ok(sample()));
    }

    #[test]
    fn test_bus_error_mid_write() {
        let mut bus = MockI2c::new();
        bus.fail_at = Some(4);
        let mut rtc = Ds3231::new(bus);

        let result = block_on(write_calendar(&mut rtc, &sample()));
        assert!(matches!(result, Err(ClockError::Write { written: 4, .. })));
        assert_eq!(rtc.release().writes.len(), 4);
    }

    #[test]
    fn test_oscillator_stop_flag() {
        let mut bus = MockI2c::new();
        bus.registers[0x0F] = 0x88;
        let mut rtc = Ds3231::new(bus);

        assert_eq!(block_on(rtc.oscillator_stopped()), Ok(true));
        block_on(rtc.clear_oscillator_stop()).unwrap();
        assert_eq!(block_on(rtc.oscillator_stopped()), Ok(false));
        assert_eq!(rtc.release().registers[0x0F], 0x08);
    }
}
