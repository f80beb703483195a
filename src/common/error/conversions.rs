//! Error conversion implementations.
//!
//! From trait implementations converting internal subsystem errors to the
//! unified Error type.

use super::types::Error;

impl From<crate::container::Error> for Error {
    fn from(err: crate::container::Error) -> Self {
        match err {
            crate::container::Error::Io(e) => Error::Io(e),
            crate::container::Error::InvalidStream(s) => Error::Format(s),
            crate::container::Error::Decode(e) => Error::Format(e.to_string()),
            crate::container::Error::MissingRoot => {
                Error::Format("no presentation root record".to_string())
            },
            crate::container::Error::DuplicateRoot => {
                Error::Format("multiple presentation root records".to_string())
            },
        }
    }
}

impl From<crate::rtf::RtfError> for Error {
    fn from(err: crate::rtf::RtfError) -> Self {
        Error::RichText(err.to_string())
    }
}
