//! Helpers to write tests for the MakerRepo client crates.

pub use ctor as __ctor;
pub use tokio::test as async_test;

pub mod test_json;

/// The token the canned sessions are logged in with.
pub const TEST_TOKEN: &str = "1234";

/// The token the whoami fixture rotates the session to.
pub const ROTATED_TOKEN: &str = "t2";

/// Install a tracing subscriber writing to the test output, filtered by
/// `RUST_LOG`. Calling it more than once is harmless.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Install the test tracing subscriber once, before any test of the crate
/// runs.
#[macro_export]
macro_rules! init_tracing_for_tests {
    () => {
        #[$crate::__ctor::ctor]
        fn init_logging() {
            $crate::init_tracing();
        }
    };
}
