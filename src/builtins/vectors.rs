//! Vector builtins: construction, mutation, and list conversions.

use std::cell::RefCell;
use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{expect_int, expect_vector, install, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::value::Object;

// vector constructors are not pure: folding one into a constant would share
// a mutable object between evaluations
pub static VECTOR: Builtin = Builtin::vararg("vector", 0, -1, vector_fn);
pub static VSET: Builtin = Builtin::vararg("vset!", 3, 3, vset_fn);
pub static LIST_TO_VECTOR: Builtin = Builtin::fixed1("list->vector", list_to_vector_fn);
pub static VECTOR_TO_LIST: Builtin = Builtin::fixed1("vector->list", vector_to_list_fn).pure();

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(scope, &[&VECTOR, &VSET, &LIST_TO_VECTOR, &VECTOR_TO_LIST])
}

fn vector_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    Ok(Object::Vector(Rc::new(RefCell::new(args))))
}

/// `(vset! vec index value)`: replaces one element in place, yielding the
/// value.
fn vset_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let vec = expect_vector("vset!", 1, &args[0])?;
    let idx = expect_int("vset!", 2, &args[1])?;
    let value = args[2].clone();

    let len = vec.borrow().len();
    if idx < 0 || idx as usize >= len {
        return Err(Error::User(format!(
            "vset!: index {idx} out of range for vector of length {len}"
        )));
    }
    vec.borrow_mut()[idx as usize] = value.clone();
    Ok(value)
}

fn list_to_vector_fn(_eng: &mut Engine, lst: Object) -> Result<Object, Error> {
    Ok(Object::Vector(Rc::new(RefCell::new(lst.to_vec()?))))
}

fn vector_to_list_fn(_eng: &mut Engine, vec: Object) -> Result<Object, Error> {
    let vec = expect_vector("vector->list", 1, &vec)?;
    let items = vec.borrow().clone();
    Ok(Object::from_vec(items))
}
