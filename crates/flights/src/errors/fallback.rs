/// Classification for fallback policy.
///
/// Used by the registry to decide whether a failure from one provider
/// should hand the query to the next provider in priority order.
///
/// # Behavior Summary
///
/// | Class | Try Next Provider? | Recorded in `AggregateFailure`? |
/// |-------|-------------------|--------------------------------|
/// | `Never` | No | No (returned to the caller as-is) |
/// | `NextProvider` | Yes | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FallbackClass {
    /// Stop the fallback chain and surface the error.
    ///
    /// Used for errors no other provider can fix, such as a malformed
    /// query or a cancelled request.
    Never,

    /// Record the failure and try the next provider.
    ///
    /// Connection errors, timeouts, non-success statuses and empty
    /// result sets all land here. Cross-provider fallback is the only
    /// retry mechanism; the same provider is never called twice.
    NextProvider,
}
