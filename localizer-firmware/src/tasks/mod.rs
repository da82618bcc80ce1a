//! Embassy async tasks
//!
//! Each task runs independently and communicates through the shared state
//! and signals in `channels`.

pub mod ingest;
pub mod lookup;
pub mod render;
pub mod telemetry;
pub mod timekeeper;
pub mod uplink_rx;

pub use ingest::ingest_task;
pub use lookup::lookup_task;
pub use render::{render_task, Oled};
pub use telemetry::telemetry_task;
pub use timekeeper::{timekeeper_task, Keeper};
pub use uplink_rx::uplink_rx_task;
