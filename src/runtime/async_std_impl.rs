//! async-std runtime implementation.

use std::time::Duration;

/// Sleep for the specified duration using async-std.
pub(super) async fn sleep_impl(duration: Duration) {
    async_std::task::sleep(duration).await
}
