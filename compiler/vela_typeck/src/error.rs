//! Type-check errors.
//!
//! One variant per way a judgment can fail. All are non-recoverable at
//! the point raised: callers propagate with `?` and the first error
//! unwinds to the driver of the pass.

use vela_ast::{SourceLocation, Type};
use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_types::TypePool;

/// A type-check failure.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CheckError {
    UnknownIdentifier {
        name: String,
        location: SourceLocation,
    },
    UnknownFunction {
        name: String,
        location: SourceLocation,
    },
    NotCallable {
        name: String,
        location: SourceLocation,
    },
    TooFewArguments {
        name: String,
        expected: usize,
        location: SourceLocation,
    },
    TooManyArguments {
        name: String,
        expected: usize,
        location: SourceLocation,
    },
    ArgumentTypeMismatch {
        name: String,
        /// 1-based argument position.
        position: usize,
        expected: Type,
        found: Type,
        location: SourceLocation,
    },
    LiteralTooLarge {
        location: SourceLocation,
    },
    /// Binary expression operands differ in type.
    BinaryOperandMismatch {
        location: SourceLocation,
    },
    /// General two-type mismatch (array literal elements, if-expression
    /// arms).
    TypeMismatch {
        expected: Type,
        found: Type,
        location: SourceLocation,
    },
    ReturnTypeMismatch {
        expected: Type,
        found: Type,
        location: SourceLocation,
    },
    /// Increment/decrement of an immutable value.
    ImmutableModification {
        operation: &'static str,
        location: SourceLocation,
    },
    NonBooleanCondition {
        keyword: &'static str,
        location: SourceLocation,
    },
    CannotAssignToFunction {
        location: SourceLocation,
    },
    AssignmentTypeMismatch {
        target: Type,
        found: Type,
        location: SourceLocation,
    },
    ImmutableAssignment {
        name: String,
        location: SourceLocation,
    },
    Redefinition {
        name: String,
        location: SourceLocation,
    },
    InitializerTypeMismatch {
        declared: Type,
        found: Type,
        location: SourceLocation,
    },
    NotYetSupported {
        message: String,
        location: SourceLocation,
    },
}

impl CheckError {
    /// The source location the error was raised at.
    pub fn location(&self) -> SourceLocation {
        match self {
            CheckError::UnknownIdentifier { location, .. }
            | CheckError::UnknownFunction { location, .. }
            | CheckError::NotCallable { location, .. }
            | CheckError::TooFewArguments { location, .. }
            | CheckError::TooManyArguments { location, .. }
            | CheckError::ArgumentTypeMismatch { location, .. }
            | CheckError::LiteralTooLarge { location }
            | CheckError::BinaryOperandMismatch { location }
            | CheckError::TypeMismatch { location, .. }
            | CheckError::ReturnTypeMismatch { location, .. }
            | CheckError::ImmutableModification { location, .. }
            | CheckError::NonBooleanCondition { location, .. }
            | CheckError::CannotAssignToFunction { location }
            | CheckError::AssignmentTypeMismatch { location, .. }
            | CheckError::ImmutableAssignment { location, .. }
            | CheckError::Redefinition { location, .. }
            | CheckError::InitializerTypeMismatch { location, .. }
            | CheckError::NotYetSupported { location, .. } => *location,
        }
    }

    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckError::UnknownIdentifier { .. } => ErrorCode::E2001,
            CheckError::UnknownFunction { .. } => ErrorCode::E2002,
            CheckError::NotCallable { .. } => ErrorCode::E2003,
            CheckError::TooFewArguments { .. } | CheckError::TooManyArguments { .. } => {
                ErrorCode::E2004
            }
            CheckError::ArgumentTypeMismatch { .. } => ErrorCode::E2005,
            CheckError::LiteralTooLarge { .. } => ErrorCode::E2006,
            CheckError::BinaryOperandMismatch { .. } | CheckError::TypeMismatch { .. } => {
                ErrorCode::E2007
            }
            CheckError::ReturnTypeMismatch { .. } => ErrorCode::E2008,
            CheckError::ImmutableModification { .. } => ErrorCode::E2009,
            CheckError::NonBooleanCondition { .. } => ErrorCode::E2010,
            CheckError::CannotAssignToFunction { .. } => ErrorCode::E2011,
            CheckError::AssignmentTypeMismatch { .. } => ErrorCode::E2012,
            CheckError::ImmutableAssignment { .. } => ErrorCode::E2013,
            CheckError::Redefinition { .. } => ErrorCode::E2014,
            CheckError::InitializerTypeMismatch { .. } => ErrorCode::E2015,
            CheckError::NotYetSupported { .. } => ErrorCode::E2016,
        }
    }

    /// Render to a diagnostic. Needs the pool to print type names.
    pub fn to_diagnostic(&self, pool: &TypePool) -> Diagnostic {
        let message = match self {
            CheckError::UnknownIdentifier { name, .. } => {
                format!("unknown identifier '{name}'")
            }
            CheckError::UnknownFunction { name, .. } => {
                format!("unknown function '{name}'")
            }
            CheckError::NotCallable { name, .. } => {
                format!("'{name}' is not a function")
            }
            CheckError::TooFewArguments { name, expected, .. } => {
                format!("too few arguments to '{name}', expected {expected}")
            }
            CheckError::TooManyArguments { name, expected, .. } => {
                format!("too many arguments to '{name}', expected {expected}")
            }
            CheckError::ArgumentTypeMismatch {
                name,
                position,
                expected,
                found,
                ..
            } => format!(
                "invalid argument #{position} type '{}' to '{name}', expected '{}'",
                pool.display(*found),
                pool.display(*expected)
            ),
            CheckError::LiteralTooLarge { .. } => "integer literal is too large".to_owned(),
            CheckError::BinaryOperandMismatch { .. } => {
                "operands to binary expression must have same type".to_owned()
            }
            CheckError::TypeMismatch {
                expected, found, ..
            } => format!(
                "type mismatch: expected '{}', found '{}'",
                pool.display(*expected),
                pool.display(*found)
            ),
            CheckError::ReturnTypeMismatch {
                expected, found, ..
            } => format!(
                "mismatching return type '{}', expected '{}'",
                pool.display(*found),
                pool.display(*expected)
            ),
            CheckError::ImmutableModification { operation, .. } => {
                format!("cannot {operation} immutable value")
            }
            CheckError::NonBooleanCondition { keyword, .. } => {
                format!("'{keyword}' condition must have type 'bool'")
            }
            CheckError::CannotAssignToFunction { .. } => "cannot assign to function".to_owned(),
            CheckError::AssignmentTypeMismatch { target, found, .. } => format!(
                "cannot assign '{}' to variable of type '{}'",
                pool.display(*found),
                pool.display(*target)
            ),
            CheckError::ImmutableAssignment { name, .. } => {
                format!("cannot assign to immutable variable '{name}'")
            }
            CheckError::Redefinition { name, .. } => format!("redefinition of '{name}'"),
            CheckError::InitializerTypeMismatch {
                declared, found, ..
            } => format!(
                "cannot initialize variable of type '{}' with '{}'",
                pool.display(*declared),
                pool.display(*found)
            ),
            CheckError::NotYetSupported { message, .. } => message.clone(),
        };

        Diagnostic::error(self.code())
            .with_message(message)
            .at(self.location())
    }
}
