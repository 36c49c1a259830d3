/// Coalesces scroll and resize notifications to one flush per frame.
///
/// Event handlers record the latest value; the frame tick drains it. Any
/// number of scroll events between two frames costs a single spy pass.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameThrottle {
    pending_scroll: Option<f64>,
    pending_resize: bool,
}

/// Work due on this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameWork {
    pub scroll_top: Option<f64>,
    pub resized: bool,
}

impl FrameWork {
    pub fn is_empty(&self) -> bool {
        self.scroll_top.is_none() && !self.resized
    }
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scroll position; only the latest one survives.
    pub fn scroll(&mut self, scroll_top: f64) {
        self.pending_scroll = Some(scroll_top);
    }

    pub fn resize(&mut self) {
        self.pending_resize = true;
    }

    pub fn has_pending(&self) -> bool {
        self.pending_scroll.is_some() || self.pending_resize
    }

    /// Take everything queued since the previous frame.
    pub fn take(&mut self) -> FrameWork {
        FrameWork {
            scroll_top: self.pending_scroll.take(),
            resized: std::mem::take(&mut self.pending_resize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_scroll_wins() {
        let mut throttle = FrameThrottle::new();
        throttle.scroll(10.0);
        throttle.scroll(20.0);
        throttle.scroll(35.0);
        let work = throttle.take();
        assert_eq!(work.scroll_top, Some(35.0));
        assert!(!work.resized);
    }

    #[test]
    fn test_take_drains() {
        let mut throttle = FrameThrottle::new();
        throttle.resize();
        assert!(throttle.has_pending());
        assert!(throttle.take().resized);
        assert!(!throttle.has_pending());
        assert!(throttle.take().is_empty());
    }
}
