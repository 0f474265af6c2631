/// Control row (physical row 0) assignments
///
/// Right edge: run/stop, then faster, then slower. Page selectors start at
/// column 0, followed by the clear button. On grids too narrow for all of
/// them, earlier entries in that list win the column.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Run,
    /// Shorter step period
    Faster,
    /// Longer step period
    Slower,
    Clear,
    Page(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLayout {
    controls: Vec<Option<Control>>,
    page_count: usize,
}

impl ControlLayout {
    pub fn new(width: usize, page_count: usize, clear_column: usize) -> Self {
        let mut controls = vec![None; width];
        claim(&mut controls, width.checked_sub(1), Control::Run);
        claim(&mut controls, width.checked_sub(2), Control::Faster);
        claim(&mut controls, width.checked_sub(3), Control::Slower);
        claim(&mut controls, Some(clear_column), Control::Clear);

        // Selectors are contiguous from column 0; the first taken column ends them.
        let mut reachable = 0;
        for x in 0..page_count.min(width) {
            if controls[x].is_some() {
                break;
            }
            controls[x] = Some(Control::Page(x));
            reachable += 1;
        }

        Self {
            controls,
            page_count: reachable.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.controls.len()
    }

    pub fn control_at(&self, x: usize) -> Option<Control> {
        self.controls.get(x).copied().flatten()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn run_column(&self) -> Option<usize> {
        self.column_of(Control::Run)
    }

    pub fn page_column(&self, page: usize) -> Option<usize> {
        self.column_of(Control::Page(page))
    }

    fn column_of(&self, control: Control) -> Option<usize> {
        self.controls.iter().position(|&c| c == Some(control))
    }
}

fn claim(controls: &mut [Option<Control>], x: Option<usize>, control: Control) {
    let Some(x) = x else {
        return;
    };
    if let Some(slot) = controls.get_mut(x) {
        if slot.is_none() {
            *slot = Some(control);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_wide_layout() {
        let layout = ControlLayout::new(8, 4, 4);
        assert_eq!(layout.control_at(0), Some(Control::Page(0)));
        assert_eq!(layout.control_at(3), Some(Control::Page(3)));
        assert_eq!(layout.control_at(4), Some(Control::Clear));
        assert_eq!(layout.control_at(5), Some(Control::Slower));
        assert_eq!(layout.control_at(6), Some(Control::Faster));
        assert_eq!(layout.control_at(7), Some(Control::Run));
        assert_eq!(layout.control_at(8), None);
        assert_eq!(layout.page_count(), 4);
        assert_eq!(layout.run_column(), Some(7));
    }

    #[test]
    fn test_sixteen_wide_leaves_gap() {
        let layout = ControlLayout::new(16, 4, 4);
        assert_eq!(layout.control_at(10), None);
        assert_eq!(layout.control_at(15), Some(Control::Run));
        assert_eq!(layout.control_at(13), Some(Control::Slower));
    }

    #[test]
    fn test_narrow_grid_truncates_pages() {
        // 6 wide: run=5, faster=4, slower=3, clear=4 is taken
        let layout = ControlLayout::new(6, 4, 4);
        assert_eq!(layout.control_at(4), Some(Control::Faster));
        assert_eq!(layout.page_count(), 3);
        assert_eq!(layout.page_column(3), None);
        assert!(!(0..6).any(|x| layout.control_at(x) == Some(Control::Clear)));
    }

    #[test]
    fn test_clear_column_collision_with_pages() {
        let layout = ControlLayout::new(8, 4, 2);
        assert_eq!(layout.control_at(2), Some(Control::Clear));
        assert_eq!(layout.page_count(), 2);
    }
}
