//! Transport abstraction between the API calls and the stores.
//!
//! A transport decides how an operation reaches the authoritative data.
//! [`SimulatedTransport`] runs it in-process and then waits a fixed
//! latency; a networked client can implement [`Transport`] without touching
//! the business rules in the API modules.

use std::time::Duration;

use super::ApiError;

/// Executes API operations.
pub trait Transport: Send + Sync {
    /// Runs `operation` and yields its result.
    ///
    /// The result is returned unchanged; latency, retries or any remote
    /// hop are up to the implementation.
    fn execute<T, F>(
        &self,
        operation: F,
    ) -> impl std::future::Future<Output = Result<T, ApiError>> + Send
    where
        T: Send,
        F: FnOnce() -> Result<T, ApiError> + Send;
}

/// In-process transport with a fixed artificial delay.
///
/// The delay applies to every call, successful or not.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedTransport {
    latency: Duration,
}

impl SimulatedTransport {
    /// Creates a transport that waits `latency` after each operation.
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Configured delay.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }
}

impl Transport for SimulatedTransport {
    async fn execute<T, F>(&self, operation: F) -> Result<T, ApiError>
    where
        T: Send,
        F: FnOnce() -> Result<T, ApiError> + Send,
    {
        let result = operation();
        tokio::time::sleep(self.latency).await;
        result
    }
}
