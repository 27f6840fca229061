//! Strip implementation on a real WS2811 LED string.
use rs_ws281x::{ChannelBuilder, Controller, ControllerBuilder, StripType};

use crate::{Color, Strip};

/// Strip implementation for real hardware.
pub struct LedStrip {
    controller: Controller,
    pixels: Vec<Color>,
}

impl Strip for LedStrip {
    fn pixels(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    fn flush(&mut self) -> Result<(), String> {
        for (led, c) in self.controller.leds_mut(0).iter_mut().zip(&self.pixels) {
            // The driver's raw layout is BGRW; the strip type handles wire order.
            *led = [c.b, c.g, c.r, 0];
        }
        self.controller.render().map_err(|e| e.to_string())
    }
}

impl LedStrip {
    /// GPIO 18 (PWM0).
    const PIN: i32 = 18;

    /// Create a new handle for a strip of `count` LEDs.
    pub fn new(count: usize) -> Result<Self, String> {
        let len = i32::try_from(count).map_err(|e| e.to_string())?;
        let controller = ControllerBuilder::new()
            .freq(800_000)
            .dma(10)
            .channel(
                0,
                ChannelBuilder::new()
                    .pin(Self::PIN)
                    .count(len)
                    .strip_type(StripType::Ws2811Grb)
                    // Brightness is applied to colors before they get here.
                    .brightness(255)
                    .build(),
            )
            .build()
            .map_err(|e| e.to_string())?;
        Ok(LedStrip {
            controller,
            pixels: vec![Color::OFF; count],
        })
    }
}
