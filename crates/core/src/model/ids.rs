use serde::{Deserialize, Serialize};
use std::fmt;

/// One-based position of a page within the survey.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageNumber(usize);

impl PageNumber {
    /// The first page of every survey.
    pub const FIRST: PageNumber = PageNumber(1);

    /// Creates a new `PageNumber`
    #[must_use]
    pub fn new(number: usize) -> Self {
        Self(number)
    }

    /// Returns the underlying one-based value
    #[must_use]
    pub fn value(&self) -> usize {
        self.0
    }

    /// Zero-based index into a page list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0.saturating_sub(1)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    #[must_use]
    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1).max(1))
    }
}

impl fmt::Debug for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageNumber({})", self.0)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
