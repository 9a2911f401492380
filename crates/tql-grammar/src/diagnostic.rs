//! Definition of diagnostics displayed to users.

use std::fmt;

pub use tql_ast::span::SourcePoint;
pub use tql_ast::span::Span;

/// Represents the severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The diagnostic is displayed as an error.
    Error,
    /// The diagnostic is displayed as a warning.
    Warning,
    /// The diagnostic is displayed as a note.
    Note,
}

/// Represents a diagnostic to display to the user.
///
/// A diagnostic carries the failing span, an optional `hint` with a
/// suggested fix, and optional `details` expanding on the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    severity: Severity,
    /// The diagnostic message.
    message: String,
    /// The primary span of the diagnostic.
    span: Span,
    /// The optional fix suggestion.
    hint: Option<String>,
    /// The optional expanded details.
    details: Option<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given message and span.
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            hint: None,
            details: None,
        }
    }

    /// Sets the hint of the diagnostic.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Sets the details of the diagnostic.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Gets the severity of the diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Gets the message of the diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the primary span of the diagnostic.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Gets the hint of the diagnostic, if one was attached.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Gets the details of the diagnostic, if any were attached.
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Resolves the start and end of the diagnostic span to 1-based
    /// line/column positions within `source`.
    pub fn resolve(&self, source: &str) -> (SourcePoint, SourcePoint) {
        let points =
            SourcePoint::from_offsets(source, &[self.span.start(), self.span.end()]);
        (points[0], points[1])
    }

    /// Converts this diagnostic to a `codespan` [Diagnostic].
    ///
    /// [Diagnostic]: codespan_reporting::diagnostic::Diagnostic
    #[cfg(feature = "codespan")]
    pub fn to_codespan(&self) -> codespan_reporting::diagnostic::Diagnostic<()> {
        use codespan_reporting::diagnostic as codespan;

        let mut diagnostic = match self.severity {
            Severity::Error => codespan::Diagnostic::error(),
            Severity::Warning => codespan::Diagnostic::warning(),
            Severity::Note => codespan::Diagnostic::note(),
        };

        diagnostic.message.clone_from(&self.message);

        if let Some(details) = &self.details {
            diagnostic.notes.push(details.clone());
        }

        if let Some(hint) = &self.hint {
            diagnostic.notes.push(format!("hint: {hint}"));
        }

        diagnostic.labels.push(codespan::Label::primary(
            (),
            self.span.start()..self.span.end(),
        ));

        diagnostic
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{message} at {span}", message = self.message, span = self.span)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn spans_resolve_to_positions() {
        let source = "select\n'oops";
        let diagnostic = Diagnostic::error("unterminated string", Span::new(7, 5));
        let (start, end) = diagnostic.resolve(source);
        assert_eq!((start.line, start.column), (2, 1));
        assert_eq!((end.line, end.column), (2, 6));
    }
}
