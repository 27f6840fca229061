//! A METAR map.
//!
//! Colors a strip of addressable LEDs, one per airport, by current flight
//! category, and animates wind and lightning.
//!
//! # Building
//! The `hardware` feature drives a WS2811 strip and requires libclang, per
//! [rs_ws281x](https://crates.io/crates/rs_ws281x). The `simulator` feature
//! shows the strip in a window instead.
//!
pub mod brightness;
pub mod category;
pub mod color;
pub mod condition;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod export;
pub mod fetch;
pub mod legend;
pub mod memory;
pub mod report;
pub mod resolve;
pub mod visibility;

#[cfg(feature = "hardware")]
pub mod led_displays;

#[cfg(feature = "simulator")]
pub mod simulator;

pub use color::Color;
pub use error::{Error, FetchError, Result};

/// A Strip is a line of addressable pixels.
/// In real hardware, this is a string of WS2811 LEDs.
pub trait Strip {
    /// Access the pixel buffer.
    fn pixels(&mut self) -> &mut [Color];

    /// Flush the most recently-written pixels to the lights.
    fn flush(&mut self) -> std::result::Result<(), String>;
}

impl<S: Strip + ?Sized> Strip for Box<S> {
    fn pixels(&mut self) -> &mut [Color] {
        (**self).pixels()
    }

    fn flush(&mut self) -> std::result::Result<(), String> {
        (**self).flush()
    }
}

/// Set one pixel. An index past the end of the strip is skipped.
/// Configurations that overrun the strip are reported once, at validation.
pub fn set_pixel(strip: &mut impl Strip, index: usize, color: Color) {
    let pixels = strip.pixels();
    let len = pixels.len();
    match pixels.get_mut(index) {
        Some(px) => *px = color,
        None => tracing::trace!("pixel {index} is past the end of the strip ({len}); skipping"),
    }
}

/// Set every pixel to `color` and flush.
pub fn fill(strip: &mut impl Strip, color: Color) -> Result<()> {
    strip.pixels().fill(color);
    strip.flush().map_err(Error::Display)
}
