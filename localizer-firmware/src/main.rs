//! Localizer - GPS/RTC tracker firmware
//!
//! Main firmware binary for RP2040-based trackers. Decodes the positioning
//! receiver, keeps the battery-backed clock in sync, shows status on a small
//! OLED and talks to a companion network module for telemetry, network time
//! and reverse geocoding.
//!
//! Pin assignment:
//! - GPIO0/1: UART0 to the GPS receiver
//! - GPIO8/9: UART1 to the network module
//! - GPIO4/5: I2C0 to the SSD1306 OLED
//! - GPIO2/3: I2C1 to the DS3231 clock

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{DMA_CH2, FLASH, I2C0, I2C1, UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embassy_rp::Peri;
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use localizer_core::config::defaults::{
    GPS_BAUD_RATE, GPS_BUFFER_SIZE, I2C_FREQ_HZ, UPLINK_BAUD_RATE, UPLINK_BUFFER_SIZE,
};
use localizer_core::config::{load, Settings};
use localizer_core::ingest::Decoder;
use localizer_core::timesync::SyncPolicy;
use localizer_drivers::{Ds3231, Ssd1306};
use localizer_hal_rp2040::flash::Rp2040ConfigStore;

use crate::channels::STATUS;
use crate::tasks::Keeper;
use crate::uplink::{Uplink, UplinkTx};

mod channels;
mod tasks;
mod uplink;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
});

/// Executor for the ingest task, preempts everything on the thread executor
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

// UART buffers (must live forever)
static GPS_TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static GPS_RX_BUF: StaticCell<[u8; GPS_BUFFER_SIZE]> = StaticCell::new();
static UPLINK_TX_BUF: StaticCell<[u8; UPLINK_BUFFER_SIZE]> = StaticCell::new();
static UPLINK_RX_BUF: StaticCell<[u8; UPLINK_BUFFER_SIZE]> = StaticCell::new();

static UPLINK_TX: StaticCell<UplinkTx> = StaticCell::new();
static SETTINGS: StaticCell<Settings> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Localizer firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let settings: &'static Settings = SETTINGS.init(load_settings(p.FLASH, p.DMA_CH2).await);

    // Write handles are taken exactly once, here
    let writers = unwrap!(STATUS.split());

    // GPS receiver
    let mut gps_config = UartConfig::default();
    gps_config.baudrate = GPS_BAUD_RATE;
    let gps = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        GPS_TX_BUF.init([0u8; 16]),
        GPS_RX_BUF.init([0u8; GPS_BUFFER_SIZE]),
        gps_config,
    );
    // The transmit half is never used but must stay alive
    let (_gps_tx, gps_rx) = gps.split();
    info!("GPS UART initialized at {} baud", GPS_BAUD_RATE);

    // Network module
    let mut uplink_config = UartConfig::default();
    uplink_config.baudrate = UPLINK_BAUD_RATE;
    let uplink_uart = BufferedUart::new(
        p.UART1,
        p.PIN_8,
        p.PIN_9,
        Irqs,
        UPLINK_TX_BUF.init([0u8; UPLINK_BUFFER_SIZE]),
        UPLINK_RX_BUF.init([0u8; UPLINK_BUFFER_SIZE]),
        uplink_config,
    );
    let (uplink_tx, uplink_rx) = uplink_uart.split();
    let uplink = Uplink::new(UPLINK_TX.init(Mutex::new(uplink_tx)));
    info!("Uplink UART initialized");
    if let Err(e) = uplink.configure(settings).await {
        warn!("Could not send link settings: {:?}", e);
    }

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQ_HZ;

    let oled = Ssd1306::new(I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config));

    let mut rtc = Ds3231::new(I2c::new_async(p.I2C1, p.PIN_3, p.PIN_2, Irqs, i2c_config));
    match rtc.oscillator_stopped().await {
        Ok(true) => warn!("RTC oscillator stopped, stored time is invalid until synced"),
        Ok(false) => {}
        Err(e) => warn!("RTC not responding: {:?}", e),
    }
    let keeper = Keeper::new(SyncPolicy::new(settings.time_source), rtc, writers.clock);
    info!("I2C devices initialized");

    // Ingest runs above everything else
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner
        .spawn(tasks::ingest_task(gps_rx, Decoder::new(writers.fix)))
        .unwrap();

    spawner
        .spawn(tasks::uplink_rx_task(uplink_rx, writers.link, writers.time_service))
        .unwrap();
    spawner.spawn(tasks::timekeeper_task(keeper)).unwrap();
    spawner.spawn(tasks::lookup_task(uplink)).unwrap();
    spawner.spawn(tasks::telemetry_task(uplink, settings)).unwrap();
    spawner.spawn(tasks::render_task(oled)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Load settings from flash storage
///
/// Missing keys use compiled defaults silently; every rejected key is
/// reported once.
async fn load_settings(flash: Peri<'static, FLASH>, dma: Peri<'static, DMA_CH2>) -> Settings {
    let mut store = Rp2040ConfigStore::new(flash, dma);
    let report = load(&mut store).await;

    for rejected in &report.rejected {
        warn!(
            "Setting {} rejected ({:?}), using default",
            rejected.key.name(),
            rejected.reason
        );
    }

    let settings = report.settings;
    info!(
        "Device {}, broker {}:{}, time source {}",
        settings.device_id.as_str(),
        settings.mqtt_broker.as_str(),
        settings.mqtt_port,
        settings.time_source.as_setting()
    );
    if settings.wifi_ssid.is_empty() {
        warn!("No Wi-Fi SSID configured");
    }
    settings
}
