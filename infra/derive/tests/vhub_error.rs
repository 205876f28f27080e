use std::borrow::Cow;
use vhub_derive::vhub_error;

#[vhub_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Blob not found{}: {name}", format_context(.context))]
    NotFound { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[test]
fn internal_variant_converts_from_strings() {
    let err: DemoError = "boom".into();
    assert!(matches!(err, DemoError::Internal { .. }));
    assert_eq!(err.to_string(), "Internal error: boom");

    let err: DemoError = format!("code {}", 42).into();
    assert_eq!(err.to_string(), "Internal error: code 42");
}

#[test]
fn context_is_attached_to_existing_error() {
    let res: Result<(), DemoError> =
        Err(DemoError::NotFound { name: "a.bin".into(), context: None });

    let err = res.context("loading manifest").unwrap_err();
    assert_eq!(err.to_string(), "Blob not found (loading manifest): a.bin");
}

#[test]
fn source_error_converts_via_question_mark() {
    fn read() -> Result<(), DemoError> {
        Err(std::io::Error::other("disk gone"))?
    }

    let err = read().unwrap_err();
    assert!(matches!(err, DemoError::Io { context: None, .. }));
    assert_eq!(err.to_string(), "IO error: disk gone");
}

#[test]
fn source_result_gains_context_through_ext_trait() {
    let res: Result<(), std::io::Error> = Err(std::io::Error::other("disk gone"));

    let err = res.context("flushing blob").unwrap_err();
    assert!(matches!(err, DemoError::Io { context: Some(_), .. }));
    assert_eq!(err.to_string(), "IO error (flushing blob): disk gone");
}
