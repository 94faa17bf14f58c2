//! Derived navigation state: progress bar and button visibility.

use crate::model::PageNumber;

/// Position of the wizard within a survey of `total` pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    current: PageNumber,
    total: usize,
}

impl Progress {
    #[must_use]
    pub fn new(current: PageNumber, total: usize) -> Self {
        Self { current, total }
    }

    #[must_use]
    pub fn current(&self) -> PageNumber {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// `round(current / total * 100)`, half rounding up.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let current = self.current.value().min(self.total);
        let rounded = (200 * current + self.total) / (2 * self.total);
        u8::try_from(rounded).unwrap_or(100)
    }

    /// Page indicator text, e.g. `3/12`.
    #[must_use]
    pub fn indicator(&self) -> String {
        format!("{}/{}", self.current, self.total)
    }

    /// Progress text, e.g. `25%`.
    #[must_use]
    pub fn percent_text(&self) -> String {
        format!("{}%", self.percentage())
    }

    #[must_use]
    pub fn nav_buttons(&self) -> NavButtons {
        let on_last = self.current.value() >= self.total;
        NavButtons {
            show_prev: self.current.value() > 1,
            show_next: !on_last,
            show_submit: on_last,
        }
    }
}

/// Which navigation buttons are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavButtons {
    pub show_prev: bool,
    pub show_next: bool,
    pub show_submit: bool,
}
