//! Connectivity flag
//!
//! Injectable stand-in for the platform's online/offline signal. The
//! application wires its own network monitoring (system events, probe
//! requests) into `set_online`; the sync core only reads the flag as a
//! fast path before attempting a write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Connectivity {
    online: Arc<AtomicBool>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Update the flag. Returns true when the value changed, so the
    /// caller can trigger a drain on the offline-to-online transition.
    pub fn set_online(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::SeqCst) != online
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_online() {
        assert!(Connectivity::default().is_online());
    }

    #[test]
    fn test_set_online_reports_transitions() {
        let connectivity = Connectivity::default();

        assert!(connectivity.set_online(false));
        assert!(!connectivity.is_online());

        // Setting the same value again is not a transition
        assert!(!connectivity.set_online(false));

        assert!(connectivity.set_online(true));
        assert!(connectivity.is_online());
    }

    #[test]
    fn test_clones_share_state() {
        let a = Connectivity::default();
        let b = a.clone();

        a.set_online(false);
        assert!(!b.is_online());
    }
}
