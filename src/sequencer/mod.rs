/// Core sequencer logic - pattern pages, transport and the shared session
///
/// Pages are indexed `[step][track]`. Physical row 0 of the grid is the
/// control row, so track `t` lives on physical row `t + 1`.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::Config;

pub mod dispatch;
pub mod fanout;
pub mod layout;
pub mod playback;
pub mod transport;

use layout::ControlLayout;
use transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    cells: Vec<Vec<bool>>,
    /// Lit state of this page's control row
    controls: Vec<bool>,
    tracks: usize,
}

impl Page {
    pub fn new(steps: usize, tracks: usize) -> Self {
        Self {
            cells: vec![vec![false; tracks]; steps],
            controls: vec![false; steps],
            tracks,
        }
    }

    pub fn steps(&self) -> usize {
        self.cells.len()
    }

    pub fn tracks(&self) -> usize {
        self.tracks
    }

    pub fn get(&self, step: usize, track: usize) -> bool {
        self.cells
            .get(step)
            .and_then(|column| column.get(track))
            .copied()
            .unwrap_or(false)
    }

    /// Returns the new value, or `None` outside the page.
    pub fn toggle(&mut self, step: usize, track: usize) -> Option<bool> {
        let cell = self.cells.get_mut(step)?.get_mut(track)?;
        *cell = !*cell;
        Some(*cell)
    }

    /// Playable cells only; the control row is left alone.
    pub fn clear(&mut self) {
        for column in &mut self.cells {
            column.fill(false);
        }
    }

    pub fn column(&self, step: usize) -> Vec<bool> {
        self.cells
            .get(step)
            .cloned()
            .unwrap_or_else(|| vec![false; self.tracks])
    }

    pub fn control(&self, x: usize) -> bool {
        self.controls.get(x).copied().unwrap_or(false)
    }

    pub fn set_control(&mut self, x: usize, lit: bool) {
        if let Some(control) = self.controls.get_mut(x) {
            *control = lit;
        }
    }

    /// Whole physical column `x`: control light on top, then each track.
    pub fn column_lights(&self, x: usize) -> Vec<bool> {
        let mut lights = Vec::with_capacity(self.tracks + 1);
        lights.push(self.control(x));
        lights.extend(self.column(x));
        lights
    }
}

/// Every page plus the reserved control cells
#[derive(Debug, Clone)]
pub struct PatternStore {
    pages: Vec<Page>,
    layout: ControlLayout,
    height: usize,
}

impl PatternStore {
    pub fn new(width: usize, height: usize, layout: ControlLayout) -> Self {
        let tracks = height.saturating_sub(1);
        let mut store = Self {
            pages: vec![Page::new(width, tracks); layout.page_count()],
            layout,
            height,
        };
        for page in 0..store.pages.len() {
            store.apply_controls(page, false);
        }
        store
    }

    pub fn width(&self) -> usize {
        self.layout.width()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tracks(&self) -> usize {
        self.height.saturating_sub(1)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn layout(&self) -> &ControlLayout {
        &self.layout
    }

    pub fn page(&self, page: usize) -> Option<&Page> {
        self.pages.get(page)
    }

    pub fn toggle_cell(&mut self, page: usize, step: usize, track: usize) -> Option<bool> {
        self.pages.get_mut(page)?.toggle(step, track)
    }

    /// Clears the playable cells and re-lights the page's own selector and
    /// the running indicator.
    pub fn clear_page(&mut self, page: usize, running: bool) {
        if let Some(p) = self.pages.get_mut(page) {
            p.clear();
        }
        self.apply_controls(page, running);
    }

    pub fn read_step_column(&self, page: usize, step: usize) -> Vec<bool> {
        self.pages
            .get(page)
            .map(|p| p.column(step))
            .unwrap_or_else(|| vec![false; self.tracks()])
    }

    /// Every page keeps its own copy of the running indicator.
    pub fn set_running(&mut self, running: bool) {
        if let Some(x) = self.layout.run_column() {
            for page in &mut self.pages {
                page.set_control(x, running);
            }
        }
    }

    fn apply_controls(&mut self, page: usize, running: bool) {
        let selector = self.layout.page_column(page);
        let run = self.layout.run_column();
        if let Some(p) = self.pages.get_mut(page) {
            for x in 0..p.steps() {
                p.set_control(x, Some(x) == selector || (Some(x) == run && running));
            }
        }
    }
}

/// State shared by the input dispatcher and the playback scheduler for one
/// device connection
#[derive(Debug)]
pub struct Session {
    pub store: PatternStore,
    pub transport: Transport,
}

pub type SharedSession = Arc<Mutex<Session>>;

impl Session {
    pub fn new(width: usize, height: usize, config: &Config) -> Self {
        let layout = ControlLayout::new(width, config.page_count, config.clear_column());
        Self::with_store(PatternStore::new(width, height, layout), config)
    }

    /// Reuses pattern data from an earlier connection with a fresh transport.
    pub fn with_store(mut store: PatternStore, config: &Config) -> Self {
        let transport = Transport::new(config);
        store.set_running(transport.is_running());
        Self { store, transport }
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.store.page(self.transport.current_page())
    }
}

/// A panic elsewhere must not take playback down with it.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PatternStore {
        PatternStore::new(8, 8, ControlLayout::new(8, 4, 4))
    }

    #[test]
    fn test_page_creation() {
        let page = Page::new(8, 7);
        assert_eq!(page.steps(), 8);
        assert_eq!(page.tracks(), 7);
        assert!(!page.get(0, 0));
    }

    #[test]
    fn test_toggle_is_involution() {
        let mut store = store();
        for page in 0..store.page_count() {
            for step in 0..8 {
                for track in 0..7 {
                    let before = store.page(page).unwrap().get(step, track);
                    store.toggle_cell(page, step, track);
                    store.toggle_cell(page, step, track);
                    assert_eq!(store.page(page).unwrap().get(step, track), before);
                }
            }
        }
    }

    #[test]
    fn test_toggle_outside_page_is_ignored() {
        let mut store = store();
        assert_eq!(store.toggle_cell(0, 8, 0), None);
        assert_eq!(store.toggle_cell(0, 0, 7), None);
        assert_eq!(store.toggle_cell(4, 0, 0), None);
    }

    #[test]
    fn test_clear_page_reads_all_false() {
        let mut store = store();
        for step in 0..8 {
            store.toggle_cell(1, step, step % 7);
        }
        store.clear_page(1, true);
        for step in 0..8 {
            assert_eq!(store.read_step_column(1, step), vec![false; 7]);
        }
    }

    #[test]
    fn test_clear_page_leaves_other_pages() {
        let mut store = store();
        store.toggle_cell(0, 2, 3);
        store.toggle_cell(1, 2, 3);
        store.clear_page(1, true);
        assert!(store.page(0).unwrap().get(2, 3));
    }

    #[test]
    fn test_clear_page_restores_controls() {
        let mut store = store();
        store.clear_page(2, true);
        let page = store.page(2).unwrap();
        let lit: Vec<usize> = (0..8).filter(|&x| page.control(x)).collect();
        assert_eq!(lit, vec![2, 7]);
    }

    #[test]
    fn test_each_page_lights_one_selector() {
        let store = store();
        for p in 0..store.page_count() {
            let page = store.page(p).unwrap();
            let lit = (0..store.page_count()).filter(|&x| page.control(x)).count();
            assert_eq!(lit, 1);
            assert!(page.control(p));
        }
    }

    #[test]
    fn test_set_running_updates_every_page() {
        let mut store = store();
        store.set_running(true);
        assert!((0..4).all(|p| store.page(p).unwrap().control(7)));
        store.set_running(false);
        assert!((0..4).all(|p| !store.page(p).unwrap().control(7)));
    }

    #[test]
    fn test_column_lights_puts_control_on_top() {
        let mut store = store();
        store.toggle_cell(0, 0, 1);
        let lights = store.page(0).unwrap().column_lights(0);
        assert_eq!(lights, vec![true, false, true, false, false, false, false, false]);
    }

    #[test]
    fn test_read_step_column_is_snapshot() {
        let mut store = store();
        store.toggle_cell(0, 2, 3);
        let snapshot = store.read_step_column(0, 2);
        store.toggle_cell(0, 2, 3);
        assert!(snapshot[3]);
        assert!(!store.read_step_column(0, 2)[3]);
    }

    #[test]
    fn test_session_syncs_running_bit() {
        let session = Session::new(8, 8, &Config::default());
        assert!(session.transport.is_running());
        assert!(session.current_page().unwrap().control(7));
    }
}
