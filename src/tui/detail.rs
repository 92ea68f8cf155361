use crate::config::MIN_DETAIL_PANEL_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetState {
    #[default]
    Collapsed,
    Expanded,
}

pub const FILLER_TEXT: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Praesent eget nibh sit amet libero laoreet eleifend. Nam pharetra malesuada faucibus. Donec quis massa vel ipsum tincidunt interdum. Sed non faucibus eros. Phasellus eget sapien ut lacus efficitur vestibulum vel id quam. Nam vitae eleifend quam. Vestibulum feugiat felis in libero facilisis, ut efficitur massa dapibus. Donec pellentesque, velit ut interdum imperdiet, mi dolor consectetur orci, a posuere eros ante sit amet lorem. Nam vel velit euismod, interdum nibh quis, fermentum mi. Sed laoreet, libero vel malesuada fringilla";

/// Bottom sheet showing the selected user. Zero height until expanded.
#[derive(Debug, Clone)]
pub struct DetailPanel {
    state: SheetState,
    expanded_height: u16,
    expand_actions: usize,
}

impl DetailPanel {
    pub fn new(expanded_height: u16) -> Self {
        Self {
            state: SheetState::default(),
            expanded_height: expanded_height.max(MIN_DETAIL_PANEL_HEIGHT),
            expand_actions: 0,
        }
    }

    pub fn state(&self) -> SheetState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == SheetState::Expanded
    }

    pub fn expand(&mut self) {
        self.expand_actions += 1;
        self.state = SheetState::Expanded;
    }

    pub fn collapse(&mut self) {
        self.state = SheetState::Collapsed;
    }

    /// Rows the sheet occupies right now.
    pub fn height(&self) -> u16 {
        match self.state {
            SheetState::Collapsed => 0,
            SheetState::Expanded => self.expanded_height,
        }
    }

    /// How many times an expand was actually performed.
    pub fn expand_actions(&self) -> usize {
        self.expand_actions
    }
}
