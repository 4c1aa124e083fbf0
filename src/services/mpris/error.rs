use zbus::fdo;

use crate::services::session::HandoffError;

/// Errors raised while serving the MPRIS object
#[derive(thiserror::Error, Debug)]
pub enum MprisError {
    /// Property name or interface not recognised
    #[error("Unknown property {interface}.{property}")]
    UnknownProperty {
        /// Interface the peer asked about
        interface: String,
        /// Property the peer asked about
        property: String,
    },

    /// Properties cannot be written through the properties interface
    #[error("Cannot set property {interface}.{property}")]
    PropertyReadOnly {
        /// Interface the peer tried to write
        interface: String,
        /// Property the peer tried to write
        property: String,
    },

    /// Method not implemented by the object
    #[error("Unknown method {interface}.{member}")]
    UnknownMethod {
        /// Interface of the call
        interface: String,
        /// Member of the call
        member: String,
    },

    /// No object is exported at the called path
    #[error("No object at {0}")]
    UnknownObject(String),

    /// Arguments did not match the method signature
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Method exists but the adapter does not provide it
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Session reported a native code that has no MPRIS equivalent
    #[error("Session reported unexpected {what} code {code}")]
    UnexpectedSessionValue {
        /// Which native value was being decoded
        what: &'static str,
        /// The raw code
        code: i32,
    },

    /// Hand-off to the session's home thread failed
    #[error("Session hand-off failed: {0}")]
    Handoff(#[from] HandoffError),

    /// The blocking task serving a call failed
    #[error("Call dispatch failed: {0}")]
    Dispatch(String),

    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    Bus(#[from] zbus::Error),

    /// A value could not be encoded for the bus
    #[error("Invalid bus value: {0}")]
    InvalidValue(#[from] zbus::zvariant::Error),
}

impl From<MprisError> for fdo::Error {
    fn from(error: MprisError) -> Self {
        let message = error.to_string();
        match error {
            MprisError::UnknownProperty { .. } => fdo::Error::UnknownProperty(message),
            MprisError::PropertyReadOnly { .. } => fdo::Error::PropertyReadOnly(message),
            MprisError::UnknownMethod { .. } => fdo::Error::UnknownMethod(message),
            MprisError::UnknownObject(_) => fdo::Error::UnknownObject(message),
            MprisError::InvalidArgs(_) => fdo::Error::InvalidArgs(message),
            MprisError::NotSupported(_) => fdo::Error::NotSupported(message),
            MprisError::UnexpectedSessionValue { .. }
            | MprisError::Handoff(_)
            | MprisError::Dispatch(_)
            | MprisError::Bus(_)
            | MprisError::InvalidValue(_) => fdo::Error::Failed(message),
        }
    }
}
