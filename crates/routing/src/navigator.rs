use std::sync::Mutex;

/// Performs a full top-level navigation.
///
/// In a browser this replaces the document; on a server it becomes a
/// redirect response. Either way nothing runs after it in the current
/// context, so callers treat it as terminal.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

/// Navigator that remembers every requested navigation.
///
/// Servers use it to turn the requested target into a redirect; tests use it
/// to count navigations.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.visits.lock().ok().and_then(|v| v.last().cloned())
    }

    pub fn count(&self) -> usize {
        self.visits.lock().map(|v| v.len()).unwrap_or(0)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(url.to_string());
        }
    }
}
