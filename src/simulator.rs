//! Strip implementation in a desktop window.
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::Rgb888,
    Pixel,
};
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, Window};

use crate::{Color, Strip};

/// Shows the strip as one row of squares in a window.
pub struct SimStrip {
    display: SimulatorDisplay<Rgb888>,
    window: Option<Window>,
    pixels: Vec<Color>,
}

impl SimStrip {
    pub fn new(count: usize) -> Self {
        let settings = OutputSettingsBuilder::new().scale(20).build();
        let window = Window::new("METAR map", &settings);
        SimStrip {
            window: Some(window),
            ..Self::new_hidden(count)
        }
    }

    /// Creates a new SimStrip, but without generating a window.
    pub fn new_hidden(count: usize) -> Self {
        let display = SimulatorDisplay::new(Size::new(count as u32, 1));
        SimStrip {
            window: None,
            display,
            pixels: vec![Color::OFF; count],
        }
    }

    /// Render to an image instead of a window.
    pub fn screenshot(&mut self) -> embedded_graphics_simulator::OutputImage<Rgb888> {
        let settings = OutputSettingsBuilder::new().scale(20).build();
        self.draw();
        self.display.to_rgb_output_image(&settings)
    }

    fn draw(&mut self) {
        let pixels = self.pixels.iter().enumerate().map(|(i, c)| {
            Pixel(Point::new(i as i32, 0), Rgb888::new(c.r, c.g, c.b))
        });
        self.display.draw_iter(pixels).unwrap_or_else(|e| match e {});
    }
}

impl Strip for SimStrip {
    fn pixels(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    fn flush(&mut self) -> Result<(), String> {
        self.draw();
        if let Some(window) = &mut self.window {
            window.update(&self.display);
        }
        Ok(())
    }
}
