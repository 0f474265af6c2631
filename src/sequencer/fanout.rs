/// Output fanout - step snapshots to triggers, page state to lights
///
/// Failed commands are logged and dropped; one lost light or note must never
/// hold up the step cursor.
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use super::Page;
use crate::config::Config;
use crate::grid::{GridDevice, LIGHT_OFF};
use crate::midi::midi_note_name;

/// Fire-and-forget "begin sound" events
pub trait TriggerSink: Send {
    fn emit(&mut self, note: u8, channel: u8) -> anyhow::Result<()>;
}

pub type SharedSink = Arc<Mutex<dyn TriggerSink>>;

#[derive(Clone)]
pub struct Lights {
    grid: Arc<dyn GridDevice>,
    on_level: u8,
    marker_level: u8,
}

impl Lights {
    pub fn new(grid: Arc<dyn GridDevice>, config: &Config) -> Self {
        Self {
            grid,
            on_level: config.on_level,
            marker_level: config.marker_level,
        }
    }

    pub fn level(&self, lit: bool) -> u8 {
        if lit {
            self.on_level
        } else {
            LIGHT_OFF
        }
    }

    pub fn set(&self, x: usize, y: usize, lit: bool) {
        if let Err(e) = self.grid.set_light(x, y, self.level(lit)) {
            warn!("dropped light ({}, {}): {:#}", x, y, e);
        }
    }

    /// Lit then immediately unlit, as a press acknowledgment
    pub fn flash(&self, x: usize, y: usize) {
        self.set(x, y, true);
        self.set(x, y, false);
    }

    pub fn column(&self, x: usize, lights: &[bool]) {
        let levels: Vec<u8> = lights.iter().map(|&lit| self.level(lit)).collect();
        if let Err(e) = self.grid.set_column(x, 0, &levels) {
            warn!("dropped column {}: {:#}", x, e);
        }
    }

    /// Track rows of column `x` at the marker level, pattern or not. The
    /// control row keeps its page selector and running lights.
    pub fn mark_step(&self, x: usize) {
        let levels = vec![self.marker_level; self.grid.height().saturating_sub(1)];
        if let Err(e) = self.grid.set_column(x, 1, &levels) {
            warn!("dropped step marker {}: {:#}", x, e);
        }
    }

    pub fn restore_column(&self, page: &Page, x: usize) {
        self.column(x, &page.column_lights(x));
    }

    pub fn render_page(&self, page: &Page) {
        for x in 0..page.steps() {
            self.restore_column(page, x);
        }
    }

    pub fn clear_all(&self) {
        if let Err(e) = self.grid.clear_all() {
            warn!("failed to clear grid: {:#}", e);
        }
    }
}

pub struct Triggers {
    sink: SharedSink,
    notes: Vec<u8>,
    channel: u8,
}

impl Triggers {
    pub fn new(sink: SharedSink, config: &Config) -> Self {
        Self {
            sink,
            notes: config.notes.clone(),
            channel: config.channel,
        }
    }

    /// One note-on per active track; returns how many were sent.
    pub fn emit_step(&self, column: &[bool]) -> usize {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let mut sent = 0;
        for (track, _) in column.iter().enumerate().filter(|&(_, &on)| on) {
            let Some(&note) = self.notes.get(track) else {
                continue;
            };
            debug!("note {} ({}) for track {}", note, midi_note_name(note), track);
            match sink.emit(note, self.channel) {
                Ok(()) => sent += 1,
                Err(e) => warn!("dropped note {} for track {}: {:#}", note, track, e),
            }
        }
        sent
    }
}
