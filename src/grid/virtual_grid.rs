/// In-memory grid, rendered by the GUI binary
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::bail;

use super::{GridDevice, LIGHT_OFF};

#[derive(Debug, Clone)]
pub struct VirtualGrid {
    width: usize,
    height: usize,
    levels: Arc<Mutex<Vec<u8>>>,
}

impl VirtualGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            levels: Arc::new(Mutex::new(vec![LIGHT_OFF; width * height])),
        }
    }

    pub fn level(&self, x: usize, y: usize) -> u8 {
        if !self.contains(x, y) {
            return LIGHT_OFF;
        }
        self.lock()[y * self.width + x]
    }

    /// Row-major copy of every light
    pub fn levels(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn is_dark(&self) -> bool {
        self.lock().iter().all(|&l| l == LIGHT_OFF)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        self.levels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GridDevice for VirtualGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn set_light(&self, x: usize, y: usize, level: u8) -> anyhow::Result<()> {
        if !self.contains(x, y) {
            bail!("light ({}, {}) outside {}x{} grid", x, y, self.width, self.height);
        }
        self.lock()[y * self.width + x] = level;
        Ok(())
    }

    fn set_column(&self, x: usize, y_offset: usize, levels: &[u8]) -> anyhow::Result<()> {
        if x >= self.width {
            bail!("column {} outside {}-wide grid", x, self.width);
        }
        let mut lights = self.lock();
        for (i, &level) in levels.iter().enumerate() {
            let y = y_offset + i;
            if y >= self.height {
                break;
            }
            lights[y * self.width + x] = level;
        }
        Ok(())
    }

    fn clear_all(&self) -> anyhow::Result<()> {
        self.lock().fill(LIGHT_OFF);
        Ok(())
    }
}
