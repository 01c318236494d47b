//! Output surface resize detection.
//!
//! The monitor only detects; reacting to a resize (backing store, camera
//! aspect, projection) is the scheduler's job.

/// Last observed output surface size.
///
/// Starts unset, so the first check always reports a change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewportMonitor {
    last: Option<(u32, u32)>,
}

impl ViewportMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the stored size and store the new one on change.
    #[inline]
    pub fn check_resize(&mut self, width: u32, height: u32) -> bool {
        if self.last == Some((width, height)) {
            return false;
        }
        self.last = Some((width, height));
        true
    }

    /// Size as of the most recent detected change.
    pub fn last_size(&self) -> Option<(u32, u32)> {
        self.last
    }
}
