//! Error types for DSN pattern compilation, matching, and binding.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for DSN operations.
pub type DsnResult<T> = Result<T, DsnError>;

/// The pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Template compilation.
    Compile,
    /// Matching the input against the compiled pattern.
    Match,
    /// Coercing and writing captured values into the record.
    Bind,
}

impl Stage {
    /// Get the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Match => "match",
            Self::Bind => "bind",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur while parsing a DSN.
#[derive(Error, Debug, Diagnostic)]
pub enum DsnError {
    /// The pattern template itself is malformed.
    #[error("syntax error in pattern template: {message}")]
    #[diagnostic(code(dsn::pattern::syntax_error))]
    Syntax {
        #[source_code]
        src: String,
        #[label("error here")]
        span: miette::SourceSpan,
        message: String,
    },

    /// The input does not conform to the compiled pattern.
    #[error("`{input}` does not match template `{template}`: {reason} at offset {offset}")]
    #[diagnostic(code(dsn::pattern::no_match))]
    NoMatch {
        template: String,
        input: String,
        offset: usize,
        reason: String,
    },

    /// A captured or default value cannot be converted to the field's type.
    #[error("cannot coerce `{value}` into {expected} field `{field}`")]
    #[diagnostic(code(dsn::bind::coercion))]
    Coercion {
        field: String,
        value: String,
        expected: String,
    },

    /// A structural mismatch between the field descriptors and the captures.
    #[error("cannot bind field `{field}`: {message}")]
    #[diagnostic(code(dsn::bind::invalid_field))]
    Bind { field: String, message: String },

    /// A stage of `parse_dsn` failed; wraps the originating error with context.
    #[error("{stage} failed for `{input}` against template `{template}`")]
    #[diagnostic(code(dsn::parse::failed))]
    Parse {
        stage: Stage,
        template: String,
        input: String,
        #[source]
        source: Box<DsnError>,
    },
}

impl DsnError {
    /// Create a template syntax error with source location.
    pub fn syntax(
        src: impl Into<String>,
        offset: usize,
        len: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            src: src.into(),
            span: (offset, len).into(),
            message: message.into(),
        }
    }

    /// Create a no-match error at an input offset.
    pub fn no_match(
        template: impl Into<String>,
        input: impl Into<String>,
        offset: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::NoMatch {
            template: template.into(),
            input: input.into(),
            offset,
            reason: reason.into(),
        }
    }

    /// Create a type coercion error.
    pub fn coercion(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::Coercion {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a bind error.
    pub fn bind(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Bind {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wrap this error with the stage and context it occurred in.
    pub fn into_stage(
        self,
        stage: Stage,
        template: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self::Parse {
            stage,
            template: template.into(),
            input: input.into(),
            source: Box::new(self),
        }
    }

    /// The stage recorded by a `Parse` wrapper, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Parse { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Check if this is a template syntax error, unwrapping any stage wrapper.
    pub fn is_syntax(&self) -> bool {
        matches!(self.root(), Self::Syntax { .. })
    }

    /// Check if this is a no-match error, unwrapping any stage wrapper.
    pub fn is_no_match(&self) -> bool {
        matches!(self.root(), Self::NoMatch { .. })
    }

    /// Check if this is a coercion error, unwrapping any stage wrapper.
    pub fn is_coercion(&self) -> bool {
        matches!(self.root(), Self::Coercion { .. })
    }

    /// The innermost error, unwrapping any stage wrappers.
    pub fn root(&self) -> &DsnError {
        match self {
            Self::Parse { source, .. } => source.root(),
            other => other,
        }
    }
}
