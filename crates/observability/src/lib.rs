//! Process-wide tracing/logging setup shared by binaries and tests.

pub mod logging;

pub use logging::DEFAULT_FILTER;

/// Initialize JSON logging filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() {
    logging::init();
}
