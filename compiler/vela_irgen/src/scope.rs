//! Lexical IR scopes.
//!
//! Each scope tracks the expressions deferred in it and the destructor
//! calls pending for values it owns. On scope exit the deferred
//! expressions run in reverse registration order, then the pending
//! destructor calls run in reverse registration order, skipping any whose
//! originating declaration has been moved out of. The same unwinding
//! applies to early return and to break/continue, for every scope being
//! exited, innermost first.

use std::cell::Cell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use vela_ast::Expr;
use vela_ir::{FunctionId, ValueId};

/// A destructor call pending for scope exit.
#[derive(Clone)]
pub(crate) struct DeferredDestructor {
    /// The destructor to call.
    pub function: FunctionId,
    /// The value to destroy.
    pub receiver: ValueId,
    /// The originating declaration's moved flag; a set flag skips the
    /// call.
    pub moved: Option<Rc<Cell<bool>>>,
}

/// One lexical scope of the generator's scope stack.
#[derive(Default)]
pub(crate) struct Scope {
    /// `defer` expressions, in registration order.
    pub deferred_exprs: SmallVec<[Expr; 2]>,
    /// Pending destructor calls, in registration order.
    pub destructors: SmallVec<[DeferredDestructor; 4]>,
    /// Values of the declarations made in this scope, by name.
    pub values: FxHashMap<String, ValueId>,
}
