/// Input dispatcher - grid presses to session mutations plus instant feedback
use log::{debug, info};

use super::fanout::Lights;
use super::layout::Control;
use super::{lock_session, Session, SharedSession};

pub struct InputDispatcher {
    session: SharedSession,
    lights: Lights,
}

impl InputDispatcher {
    pub fn new(session: SharedSession, lights: Lights) -> Self {
        Self { session, lights }
    }

    /// Handles one button transition. Releases and presses outside the
    /// grid are ignored.
    pub fn on_button(&self, x: usize, y: usize, pressed: bool) {
        if !pressed {
            return;
        }

        // Lights are sent under the lock so they can't interleave with the
        // scheduler restoring a column.
        let mut session = lock_session(&self.session);
        if x >= session.store.width() || y >= session.store.height() {
            debug!("ignoring press outside grid: {}, {}", x, y);
            return;
        }

        debug!("button pressed: {}, {}", x, y);
        if y == 0 {
            self.on_control(&mut session, x);
        } else {
            self.on_cell(&mut session, x, y);
        }
    }

    fn on_control(&self, session: &mut Session, x: usize) {
        let Some(control) = session.store.layout().control_at(x) else {
            return;
        };

        match control {
            Control::Run => {
                let running = session.transport.toggle_running();
                session.store.set_running(running);
                self.lights.set(x, 0, running);
                info!("{}", if running { "playing" } else { "stopped" });
            }
            Control::Faster => {
                if session.transport.speed_up() {
                    self.lights.flash(x, 0);
                    debug!("step period: {:?}", session.transport.step_period());
                } else {
                    debug!("step period already at minimum");
                }
            }
            Control::Slower => {
                if session.transport.slow_down() {
                    self.lights.flash(x, 0);
                    debug!("step period: {:?}", session.transport.step_period());
                }
            }
            Control::Clear => {
                let page = session.transport.current_page();
                let running = session.transport.is_running();
                session.store.clear_page(page, running);
                if let Some(p) = session.store.page(page) {
                    self.lights.render_page(p);
                }
                self.lights.flash(x, 0);
                debug!("cleared page {}", page);
            }
            Control::Page(page) => {
                session.transport.select_page(page);
                if let Some(p) = session.store.page(page) {
                    self.lights.render_page(p);
                }
                debug!("page {}", page);
            }
        }
    }

    fn on_cell(&self, session: &mut Session, x: usize, y: usize) {
        let page = session.transport.current_page();
        if let Some(lit) = session.store.toggle_cell(page, x, y - 1) {
            self.lights.set(x, y, lit);
        }
    }
}
