/// Playback scheduler - steps the cursor, fires triggers, moves the marker
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};

use super::fanout::{Lights, Triggers};
use super::{lock_session, SharedSession};
use crate::clock::{self, Clock, Shutdown, Wake};

pub struct Scheduler<C: Clock> {
    session: SharedSession,
    lights: Lights,
    triggers: Triggers,
    clock: C,
    idle_interval: Duration,
    step: usize,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(
        session: SharedSession,
        lights: Lights,
        triggers: Triggers,
        clock: C,
        idle_interval: Duration,
    ) -> Self {
        Self {
            session,
            lights,
            triggers,
            clock,
            idle_interval,
            step: 0,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Runs until the clock is cancelled, then turns every light off.
    pub fn run(mut self) {
        info!("scheduler started");
        loop {
            let running = lock_session(&self.session).transport.is_running();
            let wake = if running {
                self.play_step()
            } else {
                self.step = 0;
                self.clock.sleep(self.idle_interval)
            };
            if wake == Wake::Cancelled {
                break;
            }
        }

        let _session = lock_session(&self.session);
        self.lights.clear_all();
        info!("scheduler stopped");
    }

    fn play_step(&mut self) -> Wake {
        let step = self.step;
        let column = {
            let session = lock_session(&self.session);
            let page = session.transport.current_page();
            let column = session.store.read_step_column(page, step);
            self.lights.mark_step(step);
            column
        };

        self.triggers.emit_step(&column);

        // Read at the moment of suspending, so a tempo change made since the
        // snapshot already applies to this step.
        let period = lock_session(&self.session).transport.step_period();
        let wake = self.clock.sleep(period);

        let session = lock_session(&self.session);
        if let Some(page) = session.current_page() {
            self.lights.restore_column(page, step);
        }
        self.step = (step + 1) % session.store.width().max(1);
        wake
    }
}

/// A scheduler running on its own thread
pub struct PlaybackHandle {
    shutdown: Option<Shutdown>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    pub fn spawn(
        session: SharedSession,
        lights: Lights,
        triggers: Triggers,
        idle_interval: Duration,
    ) -> Self {
        let (shutdown, clock) = clock::cancellable();
        let scheduler = Scheduler::new(session, lights, triggers, clock, idle_interval);
        let thread = thread::Builder::new()
            .name("gridseq-playback".into())
            .spawn(move || scheduler.run());

        match thread {
            Ok(thread) => Self {
                shutdown: Some(shutdown),
                thread: Some(thread),
            },
            Err(e) => {
                error!("failed to start playback thread: {}", e);
                Self {
                    shutdown: None,
                    thread: None,
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancels the scheduler and waits for it to clear the lights.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.cancel();
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("playback thread panicked");
            }
        }
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
