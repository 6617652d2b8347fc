//! Equality builtins: `eq?`, `equal?`, and N-ary identity `==`.
//!
//! Numeric equality `=` lives with the other numeric comparisons in
//! [`super::arithmetic`].

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{install, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::value::Object;

pub static EQ_P: Builtin = Builtin::fixed2("eq?", eq_p_fn).pure();
pub static EQUAL_P: Builtin = Builtin::fixed2("equal?", equal_p_fn).pure();
pub static IDENTICAL: Builtin = Builtin::vararg("==", 2, -1, identical_fn).pure();

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(scope, &[&EQ_P, &EQUAL_P, &IDENTICAL])
}

fn eq_p_fn(_eng: &mut Engine, a: Object, b: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(a.eq_identity(&b)))
}

fn equal_p_fn(_eng: &mut Engine, a: Object, b: Object) -> Result<Object, Error> {
    Ok(Object::from_bool(a.equal(&b)))
}

/// True when every argument is identical to the first.
fn identical_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let first = &args[0];
    Ok(Object::from_bool(
        args[1..].iter().all(|a| first.eq_identity(a)),
    ))
}
