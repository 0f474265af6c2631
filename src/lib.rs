/// GRIDSEQ - a step sequencer played from an illuminated button grid
///
/// This library provides the core components:
/// - Paged track×step patterns with a reserved control row
/// - Button-press dispatch for steps, pages, tempo and transport
/// - A playback scheduler that fires MIDI triggers and moves a step marker
/// - Device lifecycle wiring for any grid implementing `GridDevice`

pub mod app;
pub mod clock;
pub mod config;
pub mod grid;
pub mod midi;
pub mod sequencer;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use app::GridApp;
pub use clock::{Clock, Shutdown, ThreadClock, Wake};
pub use config::Config;
pub use grid::{GridDevice, GridEvent, VirtualGrid};
pub use midi::{midi_note_name, MidiOutputDevice};
pub use sequencer::dispatch::InputDispatcher;
pub use sequencer::fanout::{Lights, SharedSink, TriggerSink, Triggers};
pub use sequencer::playback::{PlaybackHandle, Scheduler};
pub use sequencer::{Page, PatternStore, Session, SharedSession};
