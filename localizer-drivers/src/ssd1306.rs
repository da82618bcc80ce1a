//! SSD1306 OLED driver, 72x40 window
//!
//! The 0.42" modules wire a 72x40 glass to the middle of the controller's
//! 128x64 RAM: columns 28..100, pages 3..8. The driver only ever writes that
//! window, one page per I2C transfer.

use embedded_hal_async::i2c::I2c;
use localizer_core::config::defaults::{OLED_I2C_ADDR, OLED_X_OFFSET, OLED_Y_OFFSET};
use localizer_display::{DisplayError, FrameSink, PAGES, WIDTH};

/// Default I2C address
pub const SSD1306_ADDR: u8 = OLED_I2C_ADDR;

/// First RAM column of the visible window
pub const COLUMN_OFFSET: u8 = OLED_X_OFFSET;
/// First RAM page of the visible window
pub const PAGE_OFFSET: u8 = OLED_Y_OFFSET / 8;

const _: () = assert!(OLED_Y_OFFSET % 8 == 0);
const _: () = assert!(PAGE_OFFSET as usize + PAGES <= 8);
const _: () = assert!(COLUMN_OFFSET as usize + WIDTH <= 128);

/// Control byte: command follows
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte: display data follows
const CONTROL_DATA: u8 = 0x40;

mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const ENTIRE_ON_RESUME: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_IREF: u8 = 0xAD;
}

/// SSD1306 driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ssd1306<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: SSD1306_ADDR,
        }
    }

    /// Initialize the controller and clear the visible window
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80,
            cmd::SET_MUX_RATIO,
            0x3F, // 64 lines
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::SET_MEMORY_MODE,
            0x02, // Page addressing
            cmd::SET_SEG_REMAP,
            cmd::SET_COM_SCAN_DEC,
            cmd::SET_COM_PINS,
            0x12,
            cmd::SET_CONTRAST,
            0xCF,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::SET_IREF,
            0x30, // Internal reference, needed by the 0.42" glass
            cmd::ENTIRE_ON_RESUME,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];

        for &c in init_cmds {
            self.command(c).await?;
        }

        let blank = [0u8; WIDTH];
        for page in 0..PAGES as u8 {
            self.write_page(page, &blank).await?;
        }
        Ok(())
    }

    async fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, cmd])
            .await
            .map_err(|_| DisplayError::Communication)
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> FrameSink for Ssd1306<I2C> {
    async fn write_page(&mut self, page: u8, data: &[u8; WIDTH]) -> Result<(), DisplayError> {
        if usize::from(page) >= PAGES {
            return Err(DisplayError::InvalidPage);
        }

        self.command(cmd::SET_PAGE_ADDR | (page + PAGE_OFFSET)).await?;
        self.command(cmd::SET_LOW_COLUMN | (COLUMN_OFFSET & 0x0F)).await?;
        self.command(cmd::SET_HIGH_COLUMN | (COLUMN_OFFSET >> 4)).await?;

        let mut frame = [0u8; WIDTH + 1];
        frame[0] = CONTROL_DATA;
        frame[1..].copy_from_slice(data);
        self.i2c
            .write(self.address, &frame)
            .await
            .map_err(|_| DisplayError::Communication)
    }
}
