//! smol runtime implementation.

use std::time::Duration;

/// Sleep for the specified duration using smol.
pub(super) async fn sleep_impl(duration: Duration) {
    smol::Timer::after(duration).await;
}
