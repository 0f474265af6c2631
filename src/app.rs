/// Device lifecycle: builds a session when a grid is ready, tears it down on
/// disconnect
use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::grid::{GridDevice, GridEvent};
use crate::sequencer::dispatch::InputDispatcher;
use crate::sequencer::fanout::{Lights, SharedSink, Triggers};
use crate::sequencer::playback::PlaybackHandle;
use crate::sequencer::{lock_session, PatternStore, Session, SharedSession};

struct Connection {
    session: SharedSession,
    dispatcher: InputDispatcher,
    playback: PlaybackHandle,
}

pub struct GridApp {
    config: Config,
    sink: SharedSink,
    connection: Option<Connection>,
    /// Pattern data kept across a disconnect
    retained: Option<PatternStore>,
}

impl GridApp {
    pub fn new(config: Config, sink: SharedSink) -> Self {
        Self {
            config,
            sink,
            connection: None,
            retained: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn session(&self) -> Option<&SharedSession> {
        self.connection.as_ref().map(|c| &c.session)
    }

    pub fn on_ready(&mut self, device: Arc<dyn GridDevice>) {
        if self.connection.is_some() {
            self.on_disconnect();
        }

        let (width, height) = (device.width(), device.height());
        info!("grid ready: {}x{}", width, height);

        let session = match self.retained.take() {
            Some(store) if store.width() == width && store.height() == height => {
                Session::with_store(store, &self.config)
            }
            _ => Session::new(width, height, &self.config),
        };

        let tracks = session.store.tracks();
        if tracks > self.config.notes.len() {
            warn!(
                "{} tracks but only {} notes configured; extra tracks are silent",
                tracks,
                self.config.notes.len()
            );
        }

        let lights = Lights::new(device, &self.config);
        if let Some(page) = session.current_page() {
            lights.clear_all();
            lights.render_page(page);
        }

        let session = session.shared();
        let dispatcher = InputDispatcher::new(session.clone(), lights.clone());
        let playback = PlaybackHandle::spawn(
            session.clone(),
            lights,
            Triggers::new(self.sink.clone(), &self.config),
            self.config.idle_interval(),
        );

        self.connection = Some(Connection {
            session,
            dispatcher,
            playback,
        });
    }

    pub fn on_key(&self, event: GridEvent) {
        if let Some(connection) = &self.connection {
            connection
                .dispatcher
                .on_button(event.x, event.y, event.pressed);
        }
    }

    pub fn on_disconnect(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };
        connection.playback.stop();
        self.retained = Some(lock_session(&connection.session).store.clone());
        info!("grid disconnected");
    }

    pub fn quit(&mut self) {
        self.on_disconnect();
    }
}

impl Drop for GridApp {
    fn drop(&mut self) {
        self.quit();
    }
}
