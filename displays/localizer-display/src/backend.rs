//! Frame output
//!
//! A display driver receives the frame one page at a time.

use crate::frame::{FrameBuffer, PAGES, WIDTH};

/// Display output errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Page index outside the visible window
    InvalidPage,
}

/// Receives frame pages
pub trait FrameSink {
    /// Write one 8-pixel-high page of the visible window
    fn write_page(
        &mut self,
        page: u8,
        data: &[u8; WIDTH],
    ) -> impl core::future::Future<Output = Result<(), DisplayError>>;
}

/// Send every page of `frame`, top to bottom
///
/// Stops at the first failing page; the next cycle redraws everything.
pub async fn flush<S: FrameSink>(frame: &FrameBuffer, sink: &mut S) -> Result<(), DisplayError> {
    for (index, page) in frame.pages().iter().enumerate() {
        sink.write_page(index as u8, page).await?;
    }
    Ok(())
}

const _: () = assert!(PAGES <= u8::MAX as usize);
