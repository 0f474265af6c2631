/// MIDI trigger output using midir
use anyhow::{anyhow, Context};
use log::info;
use midir::{MidiOutput, MidiOutputConnection};

use crate::sequencer::fanout::TriggerSink;

const CLIENT_NAME: &str = "gridseq MIDI Output";

pub struct MidiOutputDevice {
    connection: Option<MidiOutputConnection>,
    velocity: u8,
}

impl MidiOutputDevice {
    pub fn new(velocity: u8) -> Self {
        Self {
            connection: None,
            velocity: velocity.min(127),
        }
    }

    pub fn available_ports() -> Vec<String> {
        if let Ok(midi_out) = MidiOutput::new(CLIENT_NAME) {
            midi_out
                .ports()
                .iter()
                .filter_map(|p| midi_out.port_name(p).ok())
                .collect()
        } else {
            vec![]
        }
    }

    pub fn connect(&mut self, port_index: usize) -> anyhow::Result<()> {
        let midi_out = MidiOutput::new(CLIENT_NAME).context("creating MIDI output")?;

        let ports = midi_out.ports();
        let port = ports
            .get(port_index)
            .ok_or_else(|| anyhow!("no MIDI output port {}", port_index))?;
        let name = midi_out.port_name(port).unwrap_or_default();

        let connection = midi_out
            .connect(port, "gridseq")
            .map_err(|e| anyhow!("connecting to {}: {}", name, e))?;

        info!("MIDI output connected: {}", name);
        self.connection = Some(connection);
        Ok(())
    }

    /// Connects to the first port whose name contains `name`.
    pub fn connect_matching(&mut self, name: &str) -> anyhow::Result<()> {
        let index = Self::available_ports()
            .iter()
            .position(|port| port.contains(name))
            .ok_or_else(|| anyhow!("no MIDI output port matching {:?}", name))?;
        self.connect(index)
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn send_note_on(&mut self, note: u8, velocity: u8, channel: u8) -> anyhow::Result<()> {
        if let Some(ref mut conn) = self.connection {
            conn.send(&note_on(note, velocity, channel))
                .map_err(|e| anyhow!("sending note on {}: {}", note, e))?;
        }
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
        }
    }
}

impl TriggerSink for MidiOutputDevice {
    fn emit(&mut self, note: u8, channel: u8) -> anyhow::Result<()> {
        self.send_note_on(note, self.velocity, channel)
    }
}

fn note_on(note: u8, velocity: u8, channel: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

pub fn midi_note_name(note: u8) -> String {
    let note_names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = (note / 12) as i32 - 1;
    let note_index = (note % 12) as usize;
    format!("{}{}", note_names[note_index], octave)
}
