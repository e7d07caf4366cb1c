use thiserror::Error;

/// Result type alias for bibq operations
pub type Result<T> = std::result::Result<T, BibqError>;

/// Main error type for bibq operations
#[derive(Error, Debug)]
pub enum BibqError {
    /// Unterminated quote or dangling backslash
    #[error("scan error at offset {offset}: {message}")]
    Scan { offset: usize, message: String },

    /// Grammar violation
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// Lookup of an id never observed while assembling results
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Transport or engine-reported failure
    #[error("engine error: {0}")]
    Engine(String),

    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "http")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Failures raised while lowering a parsed query into an engine query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("undefined field: {0}")]
    UndefinedField(String),

    #[error("field '{index}' cannot be used in a {expected}")]
    WrongUsage { index: String, expected: &'static str },

    #[error("relation '{relation}' is not supported for field '{index}'")]
    UnsupportedRelation { index: String, relation: String },

    #[error("invalid value '{value}' for field '{index}': {reason}")]
    InvalidValue {
        index: String,
        value: String,
        reason: String,
    },

    #[error("malformed modifier '{modifier}': {reason}")]
    MalformedModifier { modifier: String, reason: String },

    #[error("invalid proximity query: {0}")]
    InvalidProximity(String),
}

impl BibqError {
    pub fn scan(offset: usize, message: impl Into<String>) -> Self {
        BibqError::Scan {
            offset,
            message: message.into(),
        }
    }

    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        BibqError::Syntax {
            offset,
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        BibqError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Input character offset for errors tied to the query text
    pub fn offset(&self) -> Option<usize> {
        match self {
            BibqError::Scan { offset, .. } | BibqError::Syntax { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            BibqError::Scan { .. } => "SCAN_ERROR",
            BibqError::Syntax { .. } => "SYNTAX_ERROR",
            BibqError::Compile(_) => "COMPILE_ERROR",
            BibqError::NotFound { .. } => "NOT_FOUND",
            BibqError::Engine(_) => "ENGINE_ERROR",
            BibqError::UnknownProfile(_) => "UNKNOWN_PROFILE",
            BibqError::Config(_) => "CONFIG_ERROR",
            BibqError::Io(_) => "IO_ERROR",
            BibqError::Json(_) => "JSON_ERROR",
            #[cfg(feature = "http")]
            BibqError::Http(_) => "ENGINE_ERROR",
        }
    }

    /// True for errors that are a deterministic function of the query text
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            BibqError::Scan { .. } | BibqError::Syntax { .. } | BibqError::Compile(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BibqError::scan(3, "unterminated quote");
        assert_eq!(err.to_string(), "scan error at offset 3: unterminated quote");

        let err = BibqError::from(CompileError::UndefinedField("bogus".to_string()));
        assert_eq!(err.to_string(), "compile error: undefined field: bogus");
    }

    #[test]
    fn test_offsets() {
        assert_eq!(BibqError::syntax(7, "unexpected ')'").offset(), Some(7));
        assert_eq!(BibqError::Engine("timeout".to_string()).offset(), None);
    }

    #[test]
    fn test_query_errors() {
        assert!(BibqError::scan(0, "x").is_query_error());
        assert!(BibqError::from(CompileError::InvalidProximity("x".into())).is_query_error());
        assert!(!BibqError::not_found("work", "W1").is_query_error());
        assert!(!BibqError::Engine("down".to_string()).is_query_error());
    }

    #[test]
    fn test_codes() {
        assert_eq!(BibqError::not_found("unit", "U9").code(), "NOT_FOUND");
        assert_eq!(BibqError::not_found("unit", "U9").to_string(), "unit not found: U9");
    }
}
