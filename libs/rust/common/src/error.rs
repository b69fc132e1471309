//! Retryability classification shared by every error type in the workspace.
//!
//! Errors are classified as either retryable or non-retryable, which lets
//! [`RetryPolicy`](crate::RetryPolicy) decide whether to try again without
//! knowing the concrete error type.

/// Classifies an error as transient or permanent.
pub trait Retryable {
    /// Check if this error is retryable.
    ///
    /// Retryable errors are transient failures that may succeed on retry,
    /// such as network issues, rate limiting, or temporary unavailability.
    fn is_retryable(&self) -> bool;
}
