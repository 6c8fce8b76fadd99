//! Error and result types shared by the library.
//!
//! Library code returns the boxed [`DynError`]; the binary and the event loop
//! lift it into `anyhow`.
use std::fmt::{Display, Formatter};

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Attach a lazily built message to an error.
pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

#[derive(Debug)]
pub struct WithContextError {
    pub context: String,
    pub source: DynError,
}

impl Display for WithContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for WithContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(WithContextError {
                context: f(),
                source: e.into(),
            }) as DynError
        })
    }
}

/// A request reached the server but came back with a non-2xx status.
#[derive(Debug)]
pub struct HttpStatusError {
    pub method: &'static str,
    pub url: String,
    pub status: u16,
}

impl Display for HttpStatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} returned HTTP {}", self.method, self.url, self.status)
    }
}

impl std::error::Error for HttpStatusError {}

#[derive(Debug)]
pub struct SimpleError(pub String);

impl SimpleError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl Display for SimpleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleError {}

pub fn simple_error(msg: impl Into<String>) -> DynError {
    Box::new(SimpleError::new(msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn context_prefixes_message_and_keeps_source() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        let err = res.with_ctx(|| "GET http://x/customers".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "GET http://x/customers: refused");
        assert!(err.source().is_some());
    }

    #[test]
    fn http_status_error_display() {
        let e = HttpStatusError {
            method: "DELETE",
            url: "http://x/customers/7".into(),
            status: 404,
        };
        assert_eq!(e.to_string(), "DELETE http://x/customers/7 returned HTTP 404");
    }
}
