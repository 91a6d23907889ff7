//! Background tasks.
//!
//! Each submodule provides a long-running async loop that stops when its
//! [`CancellationToken`](tokio_util::sync::CancellationToken) is cancelled.

pub mod pushgateway_cleanup;
