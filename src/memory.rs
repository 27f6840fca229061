//! A strip that only exists in memory. Keeps every flushed frame.

use crate::{Color, Strip};

#[derive(Clone, Debug, Default)]
pub struct MemoryStrip {
    pixels: Vec<Color>,
    frames: Vec<Vec<Color>>,
    /// Frames beyond this many are dropped, oldest first.
    keep: Option<usize>,
}

impl MemoryStrip {
    pub fn new(len: usize) -> Self {
        MemoryStrip {
            pixels: vec![Color::OFF; len],
            frames: Vec::new(),
            keep: None,
        }
    }

    /// A strip that keeps only the most recent `keep` frames.
    pub fn bounded(len: usize, keep: usize) -> Self {
        MemoryStrip {
            keep: Some(keep),
            ..Self::new(len)
        }
    }

    /// Flushed frames, oldest first.
    pub fn frames(&self) -> &[Vec<Color>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[Color]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl Strip for MemoryStrip {
    fn pixels(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    fn flush(&mut self) -> Result<(), String> {
        tracing::trace!(
            "frame: {}",
            self.pixels
                .iter()
                .map(Color::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        );
        self.frames.push(self.pixels.clone());
        if let Some(keep) = self.keep {
            if self.frames.len() > keep {
                let excess = self.frames.len() - keep;
                self.frames.drain(..excess);
            }
        }
        Ok(())
    }
}
