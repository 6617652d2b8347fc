//! Binding (frame) introspection builtins.
//!
//! Each of these defaults to the binding current at the call site and is
//! also registered under its historical `frame` alias.

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{expect_binding, expect_symbol, install, install_alias, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::value::Object;

pub static CURRENT_BINDING: Builtin = Builtin::fixed0("current-binding", current_binding_fn);
pub static PARENT_BINDING: Builtin = Builtin::vararg("parent-binding", 0, 1, parent_binding_fn);
pub static BINDINGS: Builtin = Builtin::vararg("bindings", 0, 1, bindings_fn);
pub static BINDING_LOOKUP: Builtin = Builtin::vararg("binding-lookup", 1, 2, binding_lookup_fn);
pub static BINDING_RESOLVE: Builtin = Builtin::vararg("binding-resolve", 1, 2, binding_resolve_fn);

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(
        scope,
        &[
            &CURRENT_BINDING,
            &PARENT_BINDING,
            &BINDINGS,
            &BINDING_LOOKUP,
            &BINDING_RESOLVE,
        ],
    )?;
    install_alias(scope, "current-frame", &CURRENT_BINDING)?;
    install_alias(scope, "parent-frame", &PARENT_BINDING)?;
    install_alias(scope, "frame-lookup", &BINDING_LOOKUP)?;
    Ok(())
}

/// The binding argument at `pos`, or the engine's current binding when the
/// caller omitted it.
fn binding_or_current(
    name: &str,
    eng: &Engine,
    args: &[Object],
    pos: usize,
) -> Result<Rc<Binding>, Error> {
    match args.get(pos - 1) {
        Some(obj) => expect_binding(name, pos, obj),
        None => Ok(eng.current_binding()),
    }
}

fn current_binding_fn(eng: &mut Engine) -> Result<Object, Error> {
    Ok(Object::Binding(eng.current_binding()))
}

/// The parent of a binding, or `()` at the root.
fn parent_binding_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let binding = binding_or_current("parent-binding", eng, &args, 1)?;
    Ok(match binding.parent() {
        Some(parent) => Object::Binding(parent),
        None => Object::Nil,
    })
}

/// The innermost scope's contents as an association list.
fn bindings_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let binding = binding_or_current("bindings", eng, &args, 1)?;
    Ok(binding.bindings_alist())
}

/// Single-scope lookup; missing names yield the undefined object.
fn binding_lookup_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let sym = expect_symbol("binding-lookup", 1, &args[0])?;
    let binding = binding_or_current("binding-lookup", eng, &args, 2)?;
    Ok(binding.lookup(sym.name()).unwrap_or(Object::Undefined))
}

/// Chain-walking lookup; missing names yield the undefined object.
fn binding_resolve_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let sym = expect_symbol("binding-resolve", 1, &args[0])?;
    let binding = binding_or_current("binding-resolve", eng, &args, 2)?;
    Ok(binding.resolve(sym.name()).unwrap_or(Object::Undefined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

    fn setup() -> (Engine, Rc<Binding>, Rc<Binding>) {
        let root = Binding::root("root");
        root.bind(&Symbol::intern("x"), Object::Int(1)).unwrap();
        let child = Binding::child(&root, "child");
        child.bind(&Symbol::intern("y"), Object::Int(2)).unwrap();
        let eng = Engine::new(&child);
        (eng, root, child)
    }

    #[test]
    fn test_current_and_parent() {
        let (mut e, root, child) = setup();
        match current_binding_fn(&mut e).unwrap() {
            Object::Binding(b) => assert!(Rc::ptr_eq(&b, &child)),
            other => panic!("expected binding, got {other:?}"),
        }

        match parent_binding_fn(&mut e, vec![]).unwrap() {
            Object::Binding(b) => assert!(Rc::ptr_eq(&b, &root)),
            other => panic!("expected binding, got {other:?}"),
        }

        let at_root = parent_binding_fn(&mut e, vec![Object::Binding(root)]).unwrap();
        assert!(at_root.is_nil());
    }

    #[test]
    fn test_lookup_is_local_resolve_walks() {
        let (mut e, _root, _child) = setup();
        // x lives in the parent: lookup misses, resolve finds it
        assert!(matches!(
            binding_lookup_fn(&mut e, vec![Object::symbol("x")]),
            Ok(Object::Undefined)
        ));
        assert!(matches!(
            binding_resolve_fn(&mut e, vec![Object::symbol("x")]),
            Ok(Object::Int(1))
        ));
        assert!(matches!(
            binding_lookup_fn(&mut e, vec![Object::symbol("y")]),
            Ok(Object::Int(2))
        ));
    }

    #[test]
    fn test_bindings_alist() {
        let (mut e, _root, _child) = setup();
        let alist = bindings_fn(&mut e, vec![]).unwrap();
        assert_eq!(alist.to_vec().unwrap().len(), 1);
    }
}
