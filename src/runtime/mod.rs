//! Runtime-agnostic async primitives.
//!
//! The animation engine only needs to pause between light updates, so this
//! module exposes a single [`sleep`] backed by the selected runtime.
//!
//! # Feature Flags
//!
//! Enable one of the following features to select your runtime:
//!
//! - `runtime-tokio` (default) - Use the tokio runtime
//! - `runtime-async-std` - Use the async-std runtime
//! - `runtime-smol` - Use the smol runtime
//!
//! The reqwest-backed [`HttpTransport`](crate::HttpTransport) (feature `http`)
//! always needs tokio; with another runtime, bring your own
//! [`Transport`](crate::Transport).

use std::time::Duration;

#[cfg(feature = "runtime-tokio")]
mod tokio_impl;

#[cfg(feature = "runtime-async-std")]
mod async_std_impl;

#[cfg(feature = "runtime-smol")]
mod smol_impl;

#[cfg(feature = "runtime-tokio")]
use tokio_impl::sleep_impl;

#[cfg(feature = "runtime-async-std")]
use async_std_impl::sleep_impl;

#[cfg(feature = "runtime-smol")]
use smol_impl::sleep_impl;

/// Sleep for the specified duration. A zero duration returns immediately.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    sleep_impl(duration).await
}

// Compile-time check to ensure exactly one runtime is selected
#[cfg(not(any(
    feature = "runtime-tokio",
    feature = "runtime-async-std",
    feature = "runtime-smol"
)))]
compile_error!(
    "One of \"runtime-tokio\", \"runtime-async-std\", or \"runtime-smol\" features must be enabled"
);

#[cfg(all(feature = "runtime-tokio", feature = "runtime-async-std"))]
compile_error!("Features \"runtime-tokio\" and \"runtime-async-std\" are mutually exclusive");

#[cfg(all(feature = "runtime-tokio", feature = "runtime-smol"))]
compile_error!("Features \"runtime-tokio\" and \"runtime-smol\" are mutually exclusive");

#[cfg(all(feature = "runtime-async-std", feature = "runtime-smol"))]
compile_error!("Features \"runtime-async-std\" and \"runtime-smol\" are mutually exclusive");
