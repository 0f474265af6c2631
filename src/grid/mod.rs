/// Button grid collaborator: lights out, presses in
///
/// Physical row 0 is the control row; rows 1..height are tracks.
pub mod virtual_grid;

pub use virtual_grid::VirtualGrid;

pub const LIGHT_OFF: u8 = 0;

/// A press or release on the physical grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridEvent {
    pub x: usize,
    pub y: usize,
    pub pressed: bool,
}

impl GridEvent {
    pub fn press(x: usize, y: usize) -> Self {
        Self { x, y, pressed: true }
    }

    pub fn release(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            pressed: false,
        }
    }
}

/// The only light primitives the sequencer needs from a device.
///
/// Calls must not block for long: they are issued while the session is locked.
pub trait GridDevice: Send + Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn set_light(&self, x: usize, y: usize, level: u8) -> anyhow::Result<()>;
    /// Lights `levels.len()` buttons of column `x`, starting at row `y_offset`.
    fn set_column(&self, x: usize, y_offset: usize, levels: &[u8]) -> anyhow::Result<()>;
    fn clear_all(&self) -> anyhow::Result<()>;

    fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height()
    }
}
