//! OLED render task

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Ticker};

use localizer_core::config::defaults::DISPLAY_UPDATE_MS;
use localizer_display::{flush, FrameBuffer, ScreenData, StatusScreen};
use localizer_drivers::Ssd1306;

use crate::channels::{LOCATION, STATUS};

pub type Oled = Ssd1306<I2c<'static, I2C0, Async>>;

/// Render task - redraws the status screen every display period
///
/// Frames are drawn whether or not anything changed so scrolling rows keep
/// moving.
#[embassy_executor::task]
pub async fn render_task(mut oled: Oled) {
    info!("Render task started");

    if let Err(e) = oled.init().await {
        warn!("Display init failed: {:?}", e);
    }

    let mut screen = StatusScreen::new();
    let mut frame = FrameBuffer::new();
    let mut ticker = Ticker::every(Duration::from_millis(DISPLAY_UPDATE_MS));
    let mut failing = false;

    loop {
        let data = ScreenData {
            flags: STATUS.flags(),
            fix: STATUS.read_fix(),
            location: LOCATION.read(),
        };
        screen.compose(&mut frame, &data);

        match flush(&frame, &mut oled).await {
            Ok(()) if failing => {
                info!("Display recovered");
                failing = false;
            }
            Ok(()) => {}
            Err(e) => {
                // One warning per outage
                if !failing {
                    warn!("Display write failed: {:?}", e);
                    failing = true;
                }
            }
        }

        ticker.next().await;
    }
}
