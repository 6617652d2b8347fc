//! Error-raising builtins. Both carry the `no_call_error` flag: they never
//! return a value normally.

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{expect_binding, expect_symbol, install, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::value::Object;

pub static ERROR: Builtin = Builtin::vararg("error", 0, -1, error_fn).no_call_error();
pub static NOT_BOUND_ERROR: Builtin =
    Builtin::vararg("not-bound-error", 1, 2, not_bound_error_fn).no_call_error();

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(scope, &[&ERROR, &NOT_BOUND_ERROR])
}

fn error_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    Err(Error::user(&args))
}

/// `(not-bound-error sym [binding])`: raises the canonical not-bound error
/// for a symbol, against the given binding or the current one.
fn not_bound_error_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let sym = expect_symbol("not-bound-error", 1, &args[0])?;
    let binding = match args.get(1) {
        Some(obj) => expect_binding("not-bound-error", 2, obj)?,
        None => eng.current_binding(),
    };
    Err(Error::not_bound(sym.name(), binding.name()))
}
