//! Symbol builtins: package introspection and the global value slot.
//!
//! The value slot is a flat namespace independent of the binding chain;
//! `define` and `set!` never touch it.

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{expect_symbol, install, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::value::Object;

pub static SYMBOL_PACKAGE: Builtin = Builtin::fixed1("symbol-package", symbol_package_fn).pure();
pub static SYMBOL_VALUE: Builtin = Builtin::fixed1("symbol-value", symbol_value_fn);
pub static SET_SYMBOL_VALUE: Builtin = Builtin::fixed2("set-symbol-value", set_symbol_value_fn);
pub static FREEZE_SYMBOL_VALUE: Builtin =
    Builtin::fixed1("freeze-symbol-value", freeze_symbol_value_fn);

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(
        scope,
        &[
            &SYMBOL_PACKAGE,
            &SYMBOL_VALUE,
            &SET_SYMBOL_VALUE,
            &FREEZE_SYMBOL_VALUE,
        ],
    )
}

/// The package tag of a symbol, or `()` for untagged symbols.
fn symbol_package_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let sym = expect_symbol("symbol-package", 1, &x)?;
    Ok(match sym.package() {
        Some(pkg) => Object::string(pkg),
        None => Object::Nil,
    })
}

/// The slot value, or the undefined object when nothing was ever stored.
fn symbol_value_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let sym = expect_symbol("symbol-value", 1, &x)?;
    Ok(sym.value().unwrap_or(Object::Undefined))
}

fn set_symbol_value_fn(_eng: &mut Engine, x: Object, value: Object) -> Result<Object, Error> {
    let sym = expect_symbol("set-symbol-value", 1, &x)?;
    sym.set_value(value.clone())?;
    Ok(value)
}

fn freeze_symbol_value_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let sym = expect_symbol("freeze-symbol-value", 1, &x)?;
    sym.freeze_value();
    Ok(x)
}
