//! Tracing setup shared by every test binary in the workspace.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceCell<()> = OnceCell::new();

/// Install the test tracing subscriber once per process.
///
/// Safe to call from every test; later calls are no-ops. The filter
/// comes from `TEST_LOG` if set, `RUST_LOG` otherwise, and defaults to
/// `warn` so passing tests stay quiet.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = ["TEST_LOG", "RUST_LOG"]
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .map(EnvFilter::new)
            .unwrap_or_else(|| EnvFilter::new("warn"));

        // try_init: another subscriber may already be installed.
        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
