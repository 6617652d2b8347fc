//! Type predicates and the undefined value.
//!
//! Predicates answer with `T` / `()`. Note the deliberate consequences of
//! conflating false with the empty list: `(boolean? ())` is true, and there
//! is no separate false object for `boolean?` to recognize.

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{expect_symbol, install, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::symbol::Symbol;
use crate::value::Object;

pub static NULL_P: Builtin = Builtin::fixed1("null?", null_p_fn).pure();
pub static PAIR_P: Builtin = Builtin::fixed1("pair?", pair_p_fn).pure();
pub static LIST_P: Builtin = Builtin::fixed1("list?", list_p_fn).pure();
pub static SYMBOL_P: Builtin = Builtin::fixed1("symbol?", symbol_p_fn).pure();
pub static KEYWORD_P: Builtin = Builtin::fixed1("keyword?", keyword_p_fn).pure();
pub static NUMBER_P: Builtin = Builtin::fixed1("number?", number_p_fn).pure();
pub static BOOLEAN_P: Builtin = Builtin::fixed1("boolean?", boolean_p_fn).pure();
pub static VECTOR_P: Builtin = Builtin::fixed1("vector?", vector_p_fn).pure();
pub static CALLABLE_P: Builtin = Builtin::fixed1("callable?", callable_p_fn).pure();
pub static UNDEFINED_P: Builtin = Builtin::fixed1("undefined?", undefined_p_fn).pure();
pub static MAKE_UNDEFINED: Builtin = Builtin::fixed0("make-undefined", make_undefined_fn).pure();
pub static DEFINED_P: Builtin = Builtin::fixed1("defined?", defined_p_fn);
pub static BOUND_P: Builtin = Builtin::fixed1("bound?", bound_p_fn);
pub static FROZEN_SYMBOL_VALUE: Builtin =
    Builtin::fixed1("frozen-symbol-value", frozen_symbol_value_fn);

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(
        scope,
        &[
            &NULL_P,
            &PAIR_P,
            &LIST_P,
            &SYMBOL_P,
            &KEYWORD_P,
            &NUMBER_P,
            &BOOLEAN_P,
            &VECTOR_P,
            &CALLABLE_P,
            &UNDEFINED_P,
            &MAKE_UNDEFINED,
            &DEFINED_P,
            &BOUND_P,
            &FROZEN_SYMBOL_VALUE,
        ],
    )
}

fn null_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(x.is_nil()))
}

fn pair_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(x.is_pair()))
}

fn list_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(x.is_proper_list()))
}

fn symbol_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(matches!(x, Object::Sym(_))))
}

fn keyword_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(
        matches!(&x, Object::Sym(s) if s.is_keyword()),
    ))
}

fn number_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(matches!(x, Object::Int(_))))
}

/// The booleans of this language are `()` and the symbol `T`.
fn boolean_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let truth = Symbol::intern("T");
    Ok(Object::from_bool(match &x {
        Object::Nil => true,
        Object::Sym(s) => *s == truth,
        _ => false,
    }))
}

fn vector_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(matches!(x, Object::Vector(_))))
}

/// Callables are builtins and lambdas; macros are parse-time only and do not
/// count.
fn callable_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(match &x {
        Object::Builtin(_) => true,
        Object::Closure(c) => !c.is_macro(),
        _ => false,
    }))
}

fn undefined_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(matches!(x, Object::Undefined)))
}

fn make_undefined_fn(_eng: &mut Engine) -> Result<Object, Error> {
    Ok(Object::Undefined)
}

/// True when the symbol resolves somewhere in the current binding chain.
fn defined_p_fn(eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let sym = expect_symbol("defined?", 1, &x)?;
    Ok(Object::from_bool(
        eng.current_binding().resolve(sym.name()).is_some(),
    ))
}

/// True when the symbol's global value slot holds a value.
fn bound_p_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let sym = expect_symbol("bound?", 1, &x)?;
    Ok(Object::from_bool(sym.value().is_some()))
}

fn frozen_symbol_value_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let sym = expect_symbol("frozen-symbol-value", 1, &x)?;
    Ok(Object::from_bool(sym.value_frozen()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eng() -> Engine {
        Engine::new(&Binding::root("root"))
    }

    #[test]
    fn test_shape_predicates() {
        let mut e = eng();
        assert!(null_p_fn(&mut e, Object::Nil).unwrap().is_true());
        assert!(null_p_fn(&mut e, Object::Int(0)).unwrap().is_false());

        let pair = Object::cons(Object::Int(1), Object::Int(2));
        assert!(pair_p_fn(&mut e, pair.clone()).unwrap().is_true());
        assert!(list_p_fn(&mut e, pair).unwrap().is_false());
        assert!(list_p_fn(&mut e, Object::Nil).unwrap().is_true());
        assert!(
            list_p_fn(&mut e, Object::from_vec(vec![Object::Int(1)]))
                .unwrap()
                .is_true()
        );
    }

    #[test]
    fn test_boolean_conflation() {
        let mut e = eng();
        assert!(boolean_p_fn(&mut e, Object::Nil).unwrap().is_true());
        assert!(boolean_p_fn(&mut e, Object::t()).unwrap().is_true());
        assert!(boolean_p_fn(&mut e, Object::Int(0)).unwrap().is_false());
        assert!(boolean_p_fn(&mut e, Object::symbol("x")).unwrap().is_false());
    }

    #[test]
    fn test_keyword_predicate() {
        let mut e = eng();
        assert!(keyword_p_fn(&mut e, Object::symbol(":k")).unwrap().is_true());
        assert!(keyword_p_fn(&mut e, Object::symbol("k")).unwrap().is_false());
    }

    #[test]
    fn test_defined_p_walks_chain() {
        let root = Binding::root("root");
        root.bind(&Symbol::intern("x"), Object::Int(1)).unwrap();
        let mut e = Engine::new(&root);
        assert!(defined_p_fn(&mut e, Object::symbol("x")).unwrap().is_true());
        assert!(defined_p_fn(&mut e, Object::symbol("y")).unwrap().is_false());
    }

    #[test]
    fn test_undefined() {
        let mut e = eng();
        let u = make_undefined_fn(&mut e).unwrap();
        assert!(undefined_p_fn(&mut e, u).unwrap().is_true());
        assert!(undefined_p_fn(&mut e, Object::Nil).unwrap().is_false());
    }
}
