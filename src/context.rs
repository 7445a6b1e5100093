//! Error context: nested diagnostic path plus the recoverable-error accumulator.
//!
//! Every codec entry point opens a frame named after the field's type with
//! [`ErrorContext::scoped`]; the frame is popped on every exit path, so errors raised by
//! nested encodings read like `Outer: inner: message`. Recoverable errors are recorded as
//! [`Diagnostic`]s according to the configured [`ErrorBehavior`] and processing continues.

use crate::error::CodecError;
use std::collections::HashMap;
use std::fmt;

/// Error classes raised by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Encoding an unbound value.
    Unbound,
    /// Value does not fit the field, or the field does not fit the limit.
    LengthError,
    /// Buffer exhausted before the field was complete.
    IncompleteMessage,
    /// Negative value in an unsigned field.
    SignError,
    /// Non-zero bits where only filler is expected.
    Superfluous,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Unbound,
        ErrorKind::LengthError,
        ErrorKind::IncompleteMessage,
        ErrorKind::SignError,
        ErrorKind::Superfluous,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            ErrorKind::Unbound => "UNBOUND",
            ErrorKind::LengthError => "LEN_ERR",
            ErrorKind::IncompleteMessage => "INCOMPL_MSG",
            ErrorKind::SignError => "SIGN_ERR",
            ErrorKind::Superfluous => "SUPERFL",
        }
    }

    pub fn from_short_name(name: &str) -> Option<ErrorKind> {
        Self::ALL
            .into_iter()
            .find(|k| k.short_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// What to do with a recoverable error of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorBehavior {
    Error,
    Warning,
    Ignore,
}

impl ErrorBehavior {
    pub fn from_name(name: &str) -> Option<ErrorBehavior> {
        match name.to_ascii_uppercase().as_str() {
            "ERROR" => Some(ErrorBehavior::Error),
            "WARNING" => Some(ErrorBehavior::Warning),
            "IGNORE" => Some(ErrorBehavior::Ignore),
            _ => None,
        }
    }
}

/// Per-kind error behaviours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    behaviors: HashMap<ErrorKind, ErrorBehavior>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        let mut behaviors = HashMap::new();
        for kind in ErrorKind::ALL {
            behaviors.insert(kind, ErrorBehavior::Error);
        }
        behaviors.insert(ErrorKind::Superfluous, ErrorBehavior::Warning);
        CodecConfig { behaviors }
    }
}

impl CodecConfig {
    pub fn behavior(&self, kind: ErrorKind) -> ErrorBehavior {
        self.behaviors.get(&kind).copied().unwrap_or(ErrorBehavior::Error)
    }

    pub fn set_behavior(&mut self, kind: ErrorKind, behavior: ErrorBehavior) {
        self.behaviors.insert(kind, behavior);
    }

    pub fn with_behavior(mut self, kind: ErrorKind, behavior: ErrorBehavior) -> Self {
        self.set_behavior(kind, behavior);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A recorded recoverable error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub severity: Severity,
    /// Frame names joined with `": "`, outermost first.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if self.path.is_empty() {
            write!(f, "{} [{}]: {}", level, self.kind, self.message)
        } else {
            write!(f, "{} [{}]: {}: {}", level, self.kind, self.path, self.message)
        }
    }
}

/// Call-scoped diagnostic context threaded explicitly through the codec.
#[derive(Debug, Default)]
pub struct ErrorContext {
    config: CodecConfig,
    frames: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    silent: bool,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        ErrorContext { config, ..Self::default() }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// When silent, diagnostics are still recorded but nothing is logged.
    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Run `f` inside a frame named `name`; the frame is popped whatever `f` returns.
    pub fn scoped<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.frames.push(name.to_string());
        let out = f(self);
        self.frames.pop();
        out
    }

    /// Like [`scoped`](Self::scoped), additionally silencing logging when `silent` is set.
    pub fn scoped_silent<R>(&mut self, name: &str, silent: bool, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.silent;
        self.silent = saved || silent;
        let out = self.scoped(name, f);
        self.silent = saved;
        out
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn path(&self) -> String {
        self.frames.join(": ")
    }

    /// Record a recoverable error; the caller continues with its substitute value.
    pub fn report(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let severity = match self.config.behavior(kind) {
            ErrorBehavior::Ignore => return,
            ErrorBehavior::Error => Severity::Error,
            ErrorBehavior::Warning => Severity::Warning,
        };
        let diag = Diagnostic { kind, severity, path: self.path(), message: message.into() };
        if !self.silent {
            match severity {
                Severity::Error => {
                    tracing::error!(kind = %diag.kind, path = %diag.path, "{}", diag.message)
                }
                Severity::Warning => {
                    tracing::warn!(kind = %diag.kind, path = %diag.path, "{}", diag.message)
                }
            }
        }
        self.diagnostics.push(diag);
    }

    /// Build an unrecoverable error for the current frame.
    pub fn fatal(&self, kind: ErrorKind, message: impl Into<String>) -> CodecError {
        let message = message.into();
        if !self.silent {
            tracing::debug!(kind = %kind, path = %self.path(), "{}", message);
        }
        CodecError::new(kind, self.path(), message)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// `Err` with every diagnostic when any error-severity diagnostic was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Vec<Diagnostic>> {
        if self.has_errors() {
            Err(self.diagnostics)
        } else {
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_pop_on_every_exit() {
        let mut ctx = ErrorContext::new();
        let r: Result<(), CodecError> = ctx.scoped("Outer", |ctx| {
            ctx.scoped("inner", |ctx| {
                assert_eq!(ctx.path(), "Outer: inner");
                Err(ctx.fatal(ErrorKind::IncompleteMessage, "boom"))
            })
        });
        assert_eq!(ctx.depth(), 0);
        let err = r.expect_err("fatal");
        assert_eq!(err.to_string(), "Outer: inner: incomplete message: boom");
    }

    #[test]
    fn behaviour_controls_recording() {
        let config = CodecConfig::default()
            .with_behavior(ErrorKind::SignError, ErrorBehavior::Ignore)
            .with_behavior(ErrorKind::LengthError, ErrorBehavior::Warning);
        let mut ctx = ErrorContext::with_config(config);
        ctx.scoped("T", |ctx| {
            ctx.report(ErrorKind::SignError, "ignored");
            ctx.report(ErrorKind::LengthError, "warned");
        });
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].severity, Severity::Warning);
        assert_eq!(ctx.diagnostics()[0].path, "T");
        assert!(ctx.into_result(()).is_ok());
    }

    #[test]
    fn silent_scope_restores_flag() {
        let mut ctx = ErrorContext::new();
        ctx.scoped_silent("T", true, |ctx| {
            assert!(ctx.is_silent());
            ctx.report(ErrorKind::LengthError, "still recorded");
        });
        assert!(!ctx.is_silent());
        assert!(ctx.has_errors());
    }

    #[test]
    fn short_names_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_short_name(kind.short_name()), Some(kind));
        }
        assert_eq!(ErrorKind::from_short_name("len_err"), Some(ErrorKind::LengthError));
    }
}
