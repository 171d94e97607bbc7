use std::borrow::Cow;

/// Errors that can occur during event bus operations.
///
/// None of these ever escape [`EventBus::emit`](crate::EventBus::emit): listener
/// failures are logged there and swallowed.
#[accelade_derive::accelade_error]
pub enum EventBusError {
    /// A fallible listener reported a failure.
    #[error("Listener failed{}: {message}", format_context(.context))]
    ListenerFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Capacity must be greater than zero for bounded channels.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
