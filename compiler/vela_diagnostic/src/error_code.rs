//! Stable error codes.
//!
//! The `E2xxx` range covers type checking. Codes are stable across
//! releases so they stay searchable.

use std::fmt;

/// A stable, searchable error code.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Unknown identifier.
    E2001,
    /// Unknown function.
    E2002,
    /// Callee is not a function.
    E2003,
    /// Wrong number of call arguments.
    E2004,
    /// Argument type mismatch.
    E2005,
    /// Integer literal too large.
    E2006,
    /// Binary operand type mismatch.
    E2007,
    /// Return type mismatch.
    E2008,
    /// Increment/decrement of an immutable value.
    E2009,
    /// Non-boolean condition.
    E2010,
    /// Assignment to a function.
    E2011,
    /// Assignment type mismatch.
    E2012,
    /// Assignment to an immutable variable.
    E2013,
    /// Redefinition in the same scope.
    E2014,
    /// Initializer type mismatch.
    E2015,
    /// Construct not yet supported.
    E2016,
}

impl ErrorCode {
    /// The code as printed in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
        }
    }

    /// One-line description of what the code means.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E2001 => "unknown identifier",
            ErrorCode::E2002 => "unknown function",
            ErrorCode::E2003 => "callee is not a function",
            ErrorCode::E2004 => "wrong number of arguments",
            ErrorCode::E2005 => "argument type mismatch",
            ErrorCode::E2006 => "integer literal too large",
            ErrorCode::E2007 => "binary operand type mismatch",
            ErrorCode::E2008 => "return type mismatch",
            ErrorCode::E2009 => "modification of immutable value",
            ErrorCode::E2010 => "condition must be boolean",
            ErrorCode::E2011 => "cannot assign to a function",
            ErrorCode::E2012 => "assignment type mismatch",
            ErrorCode::E2013 => "assignment to immutable variable",
            ErrorCode::E2014 => "redefinition",
            ErrorCode::E2015 => "initializer type mismatch",
            ErrorCode::E2016 => "not yet supported",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
