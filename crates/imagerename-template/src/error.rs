//! Error type for plugin loading and template compilation.

use std::any::Any;

use imagerename_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Errors raised while loading plugins and compiling the template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A plugin could not be executed, or it does not expose `register`.
    ///
    /// Startup is aborted: no partial plugin set is accepted.
    #[error("Invalid plugin '{location}': {reason}")]
    InvalidPlugin {
        /// The plugin source location as given by the caller.
        location: String,
        /// What went wrong.
        reason: String,
        /// Underlying cause (I/O, parse or loader error).
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A plugin directory could not be scanned.
    #[error("Cannot scan plugin directory '{path}': {source}")]
    Scan {
        /// The directory that was scanned.
        path: String,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    /// Creates an `InvalidPlugin` error without an underlying cause.
    pub fn invalid_plugin(location: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidPlugin {
            location: location.to_string(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Creates an `InvalidPlugin` error wrapping an underlying cause.
    pub fn invalid_plugin_with_source(
        location: impl std::fmt::Display,
        reason: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidPlugin {
            location: location.to_string(),
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the offending plugin location, if this error names one.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::InvalidPlugin { location, .. } => Some(location),
            Self::Scan { .. } => None,
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        AppError::with_source(ErrorKind::Plugin, err.to_string(), err)
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_plugin_names_location() {
        let err = TemplateError::invalid_plugin("plugins/broken.toml", "no register");
        assert_eq!(err.location(), Some("plugins/broken.toml"));
        assert_eq!(
            err.to_string(),
            "Invalid plugin 'plugins/broken.toml': no register"
        );
    }

    #[test]
    fn test_maps_to_plugin_kind() {
        let err: AppError = TemplateError::invalid_plugin("builtin:x", "boom").into();
        assert_eq!(err.kind, ErrorKind::Plugin);
        assert!(err.message.contains("builtin:x"));
    }

    #[test]
    fn test_panic_message_variants() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
