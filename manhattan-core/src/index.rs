use core::fmt;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Identifies an elementary 2D region: the view it was segmented in and its position in
/// that view's region list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RegionIndex {
    /// Position of the view in [`Scene::views`](crate::Scene::views).
    pub view: usize,
    /// Position of the region in [`View::regions`](crate::View::regions).
    pub handle: usize,
}

impl RegionIndex {
    pub fn new(view: usize, handle: usize) -> Self {
        Self { view, handle }
    }
}

impl fmt::Display for RegionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region({}, {})", self.view, self.handle)
    }
}

/// Identifies an elementary 2D line: the view it was detected in and its position in
/// that view's line list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LineIndex {
    /// Position of the view in [`Scene::views`](crate::Scene::views).
    pub view: usize,
    /// Position of the line in [`View::lines`](crate::View::lines).
    pub handle: usize,
}

impl LineIndex {
    pub fn new(view: usize, handle: usize) -> Self {
        Self { view, handle }
    }
}

impl fmt::Display for LineIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line({}, {})", self.view, self.handle)
    }
}
