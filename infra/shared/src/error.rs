use std::borrow::Cow;

/// A specialized [`SharedDataError`] enum of this crate.
#[accelade_derive::accelade_error]
pub enum SharedDataError {
    #[error("Malformed shared data{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid shared data payload{}: {message}", format_context(.context))]
    InvalidPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
