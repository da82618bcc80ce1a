//! Human readable location text from reverse geocoding

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::String;

use crate::lookup::GeocodeReply;

pub const STREET_LEN: usize = 64;
pub const CITY_LEN: usize = 48;
pub const COUNTRY_LEN: usize = 8;

/// Street, city and country as last reported by the geocoder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationText {
    pub street: String<STREET_LEN>,
    pub city: String<CITY_LEN>,
    pub country: String<COUNTRY_LEN>,
}

impl LocationText {
    pub const fn new() -> Self {
        Self {
            street: String::new(),
            city: String::new(),
            country: String::new(),
        }
    }

    /// True until the first successful lookup
    pub fn is_empty(&self) -> bool {
        self.street.is_empty() && self.city.is_empty() && self.country.is_empty()
    }

    /// Merge a geocode reply
    ///
    /// City falls back to town, then village. Fields the reply lacks keep
    /// their previous value.
    pub fn apply(&mut self, reply: &GeocodeReply) {
        if let Some(road) = &reply.road {
            copy_truncated(&mut self.street, road);
        }
        let city = reply
            .city
            .as_ref()
            .or(reply.town.as_ref())
            .or(reply.village.as_ref());
        if let Some(city) = city {
            copy_truncated(&mut self.city, city);
        }
        if let Some(country) = &reply.country_code {
            copy_truncated(&mut self.country, country);
        }
    }
}

/// Replace `dst` with as much of `src` as fits, on a char boundary
pub(crate) fn copy_truncated<const N: usize>(dst: &mut String<N>, src: &str) {
    dst.clear();
    for ch in src.chars() {
        if dst.push(ch).is_err() {
            break;
        }
    }
}

/// Shared location text
///
/// Written only by the lookup loop, read by the renderer.
pub struct Location<M: RawMutex> {
    inner: Mutex<M, RefCell<LocationText>>,
}

impl<M: RawMutex> Default for Location<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> Location<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(LocationText::new())),
        }
    }

    pub fn read(&self) -> LocationText {
        self.inner.lock(|cell| cell.borrow().clone())
    }

    /// Merge a reply and return the updated text
    pub fn apply(&self, reply: &GeocodeReply) -> LocationText {
        self.inner.lock(|cell| {
            let mut text = cell.borrow_mut();
            text.apply(reply);
            text.clone()
        })
    }
}
