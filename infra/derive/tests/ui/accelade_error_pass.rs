use accelade_derive::accelade_error;
use std::borrow::Cow;

#[accelade_error]
pub enum PayloadError {
    #[error("Malformed JSON{}: {source}", format_context(.context))]
    Json {
        #[source]
        source: std::num::ParseIntError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<u32, PayloadError> {
    let value = raw.parse::<u32>().context("parsing listener count")?;
    if value == 0 {
        return Err("listener count must be positive".into());
    }
    Ok(value)
}

fn main() {
    let err = parse("nope").unwrap_err();
    assert!(err.to_string().contains("(parsing listener count)"));

    let err = parse("0").unwrap_err();
    assert!(matches!(err, PayloadError::Internal { .. }));

    let err: Result<(), PayloadError> = Err(PayloadError::Internal { message: "x".into(), context: None });
    let err = err.context("late").unwrap_err();
    assert_eq!(err.to_string(), "Internal error (late): x");
}
