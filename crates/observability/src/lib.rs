//! Logging setup shared by every hotelgate binary.

/// Initialize process-wide logging for `service`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init(service: &str) {
    tracing::init(service);
}

/// Subscriber configuration (filters, JSON layer).
pub mod tracing;
