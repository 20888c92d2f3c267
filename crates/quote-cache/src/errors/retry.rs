/// Classification for retry policy.
///
/// Used by retrying wrappers above the fetch engine to decide whether a
/// failed provider call is worth repeating.
///
/// | Class | Retry? |
/// |-------|--------|
/// | `Never` | No |
/// | `WithBackoff` | Yes, after an increasing delay |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - malformed response or client error.
    /// Repeating the same request will not change the outcome.
    Never,

    /// Retry after a delay.
    ///
    /// Used for transient errors like rate limiting (429), timeouts and
    /// server-side failures.
    WithBackoff,
}
