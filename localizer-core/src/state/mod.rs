//! Fix/status state shared between tasks
//!
//! A single [`Status`] object is the only cross-task state: a fix snapshot
//! and a set of independent status flags. Every task may read it, but each
//! field group has exactly one writer, enforced by handing out the write
//! handles once through [`Status::split`].

pub mod flags;
pub mod location;
pub mod status;

pub use flags::StatusFlags;
pub use location::{Location, LocationText};
pub use status::{FixSnapshot, FixWriter, FlagWriter, Status, StatusWriters};
