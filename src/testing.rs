/// Test doubles for the grid, the trigger sink and the clock
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;

use crate::clock::{Clock, Wake};
use crate::grid::{GridDevice, VirtualGrid};
use crate::sequencer::fanout::TriggerSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightCommand {
    Light { x: usize, y: usize, level: u8 },
    Column { x: usize, y_offset: usize, levels: Vec<u8> },
    ClearAll,
}

/// A virtual grid that also keeps every command it was sent
pub struct RecordingGrid {
    inner: VirtualGrid,
    commands: Mutex<Vec<LightCommand>>,
}

impl RecordingGrid {
    pub fn new(width: usize, height: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: VirtualGrid::new(width, height),
            commands: Mutex::new(Vec::new()),
        })
    }

    pub fn level(&self, x: usize, y: usize) -> u8 {
        self.inner.level(x, y)
    }

    pub fn lit_in_row(&self, y: usize) -> Vec<usize> {
        (0..self.inner.width())
            .filter(|&x| self.level(x, y) > 0)
            .collect()
    }

    pub fn is_dark(&self) -> bool {
        self.inner.is_dark()
    }

    pub fn commands(&self) -> Vec<LightCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn take_commands(&self) -> Vec<LightCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }
}

impl GridDevice for RecordingGrid {
    fn width(&self) -> usize {
        self.inner.width()
    }

    fn height(&self) -> usize {
        self.inner.height()
    }

    fn set_light(&self, x: usize, y: usize, level: u8) -> anyhow::Result<()> {
        self.commands
            .lock()
            .unwrap()
            .push(LightCommand::Light { x, y, level });
        self.inner.set_light(x, y, level)
    }

    fn set_column(&self, x: usize, y_offset: usize, levels: &[u8]) -> anyhow::Result<()> {
        self.commands.lock().unwrap().push(LightCommand::Column {
            x,
            y_offset,
            levels: levels.to_vec(),
        });
        self.inner.set_column(x, y_offset, levels)
    }

    fn clear_all(&self) -> anyhow::Result<()> {
        self.commands.lock().unwrap().push(LightCommand::ClearAll);
        self.inner.clear_all()
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub notes: Vec<(u8, u8)>,
    pub fail_note: Option<u8>,
}

impl RecordingSink {
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }
}

impl TriggerSink for RecordingSink {
    fn emit(&mut self, note: u8, channel: u8) -> anyhow::Result<()> {
        if self.fail_note == Some(note) {
            bail!("sink refused note {}", note);
        }
        self.notes.push((note, channel));
        Ok(())
    }
}

type Action = Box<dyn FnOnce() + Send>;

/// Lets `elapsed` sleeps pass, then cancels. Actions registered for a sleep
/// index run while the sequencer is suspended in that sleep.
pub struct ScriptedClock {
    elapsed: usize,
    count: usize,
    actions: HashMap<usize, Action>,
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ScriptedClock {
    pub fn new(elapsed: usize) -> Self {
        Self {
            elapsed,
            count: 0,
            actions: HashMap::new(),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn on_sleep(mut self, index: usize, action: impl FnOnce() + Send + 'static) -> Self {
        self.actions.insert(index, Box::new(action));
        self
    }
}

impl Clock for ScriptedClock {
    fn sleep(&mut self, period: Duration) -> Wake {
        let index = self.count;
        self.count += 1;
        self.sleeps.lock().unwrap().push(period);
        if let Some(action) = self.actions.remove(&index) {
            action();
        }
        if index < self.elapsed {
            Wake::Elapsed
        } else {
            Wake::Cancelled
        }
    }
}
