//! Error types for the mapping engine.
//!
//! Only malformed input and failing hooks abort a parse. The engine's
//! structural leniencies — a tag with no registered class, a property the
//! target does not declare — are deliberate non-errors, visible at
//! trace/debug log level only.

use thiserror::Error;

/// Error type a mapping hook may return to abort the parse.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for hook implementations.
pub type HookResult<T> = std::result::Result<T, HookError>;

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, MapError>;

/// A fatal mapping failure. Partial results never survive one of these.
#[derive(Debug, Error)]
pub enum MapError {
    /// The underlying XML reader rejected the document.
    #[error("malformed XML: {0}")]
    Parse(#[from] quick_xml::Error),

    /// The document ended while elements were still open.
    #[error("unexpected end of document inside <{element}>")]
    UnexpectedEof { element: String },

    /// A hook on a mapped object signaled failure.
    #[error("mapping hook failed for <{element}> (property `{property}`): {source}")]
    Hook {
        element: String,
        property: String,
        #[source]
        source: HookError,
    },

    /// A property declared a date format that does not parse the value.
    #[error("invalid date value `{value}` for property `{property}` (format `{format}`)")]
    InvalidDate {
        property: String,
        value: String,
        format: String,
    },
}

impl MapError {
    pub(crate) fn hook(element: &str, property: &str, source: HookError) -> Self {
        MapError::Hook {
            element: element.to_string(),
            property: property.to_string(),
            source,
        }
    }
}
