use indexmap::IndexMap;

use crate::color::Color;
use crate::error::{Error, Result};

/// Hands out palette colors per distinct label set, in first-seen order.
#[derive(Debug, Clone)]
pub struct ColorAssigner<'a> {
    palette: &'a [Color],
    slots: IndexMap<Vec<String>, usize>,
}

impl<'a> ColorAssigner<'a> {
    pub fn new(palette: &'a [Color]) -> Self {
        Self {
            palette,
            slots: IndexMap::new(),
        }
    }

    pub fn assign(&mut self, labels: &[String]) -> Result<&'a Color> {
        let palette = self.palette;
        let mut key = labels.to_vec();
        key.sort();

        if let Some(&slot) = self.slots.get(&key) {
            return Ok(&palette[slot]);
        }

        let slot = self.slots.len();
        let color = palette.get(slot).ok_or(Error::PaletteExhausted {
            capacity: palette.len(),
        })?;
        self.slots.insert(key, slot);
        Ok(color)
    }

    pub fn groups(&self) -> usize {
        self.slots.len()
    }
}
