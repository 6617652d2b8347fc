//! # Built-in procedures
//!
//! The primitive procedure table, organized by category. Each submodule
//! declares its builtins as static [`Builtin`] descriptors and exposes a
//! `register` function that installs them into a binding, normally the
//! interpreter root before it is frozen.
//!
//! - **[arithmetic]**: `+`, `-`, `*`, `div`, `mod`, comparisons, `min`/`max`
//! - **[equality]**: `eq?`, `equal?`, `=`, `==`
//! - **[types]**: the predicate family and `make-undefined`
//! - **[lists]**: pairs, the `cXXXr` family, and the list library
//! - **[vectors]**: `vector`, `vset!`, conversions
//! - **[strings]**: `->string`, `concat`
//! - **[symbols]**: the symbol value slot and package introspection
//! - **[bindings]**: frame/binding introspection
//! - **[errors]**: `error`, `not-bound-error`
//! - **[evalops]**: the eval family (`parse-expression`, `compile`, ...)

use std::fmt;
use std::rc::Rc;

use crate::binding::Binding as Scope;
use crate::error::Error;
use crate::eval::Engine;
use crate::symbol::Symbol;
use crate::value::Object;

pub mod arithmetic;
pub mod bindings;
pub mod equality;
pub mod errors;
pub mod evalops;
pub mod lists;
pub mod strings;
pub mod symbols;
pub mod types;
pub mod vectors;

pub type Fn0 = fn(&mut Engine) -> Result<Object, Error>;
pub type Fn1 = fn(&mut Engine, Object) -> Result<Object, Error>;
pub type Fn2 = fn(&mut Engine, Object, Object) -> Result<Object, Error>;
pub type FnN = fn(&mut Engine, Vec<Object>) -> Result<Object, Error>;

/// The purity tester: given the (constant) argument objects, decides whether
/// the call may be folded at improve time.
pub type PureFn = fn(&[Object]) -> bool;

/// A primitive procedure descriptor. Arity is `[min_arity, max_arity]` with
/// `-1` meaning unbounded; the engine checks it before dispatching to the
/// narrowest provided function slot. A builtin without a purity tester is
/// conservatively impure.
pub struct Builtin {
    pub name: &'static str,
    pub min_arity: i32,
    pub max_arity: i32,
    pub pure: Option<PureFn>,
    pub fn0: Option<Fn0>,
    pub fn1: Option<Fn1>,
    pub fn2: Option<Fn2>,
    pub fnn: Option<FnN>,
    /// Marks builtins that never return normally (`error`,
    /// `not-bound-error`); the improver refuses to fold them.
    pub no_call_error: bool,
}

impl Builtin {
    const fn base(name: &'static str, min: i32, max: i32) -> Builtin {
        Builtin {
            name,
            min_arity: min,
            max_arity: max,
            pure: None,
            fn0: None,
            fn1: None,
            fn2: None,
            fnn: None,
            no_call_error: false,
        }
    }

    pub const fn fixed0(name: &'static str, f: Fn0) -> Builtin {
        let mut b = Builtin::base(name, 0, 0);
        b.fn0 = Some(f);
        b
    }

    pub const fn fixed1(name: &'static str, f: Fn1) -> Builtin {
        let mut b = Builtin::base(name, 1, 1);
        b.fn1 = Some(f);
        b
    }

    pub const fn fixed2(name: &'static str, f: Fn2) -> Builtin {
        let mut b = Builtin::base(name, 2, 2);
        b.fn2 = Some(f);
        b
    }

    pub const fn vararg(name: &'static str, min: i32, max: i32, f: FnN) -> Builtin {
        let mut b = Builtin::base(name, min, max);
        b.fnn = Some(f);
        b
    }

    /// Marks the builtin unconditionally pure.
    pub const fn pure(mut self) -> Builtin {
        self.pure = Some(pure_always);
        self
    }

    /// Marks the builtin pure for arguments passing `test`.
    pub const fn pure_if(mut self, test: PureFn) -> Builtin {
        self.pure = Some(test);
        self
    }

    pub const fn no_call_error(mut self) -> Builtin {
        self.no_call_error = true;
        self
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<builtin:{}>", self.name)
    }
}

fn pure_always(_args: &[Object]) -> bool {
    true
}

/// Installs the whole builtin table into `scope`.
pub fn register_builtins(scope: &Rc<Scope>) -> Result<(), Error> {
    arithmetic::register(scope)?;
    equality::register(scope)?;
    types::register(scope)?;
    lists::register(scope)?;
    vectors::register(scope)?;
    strings::register(scope)?;
    symbols::register(scope)?;
    bindings::register(scope)?;
    errors::register(scope)?;
    evalops::register(scope)?;
    Ok(())
}

pub(crate) fn install(scope: &Rc<Scope>, table: &[&'static Builtin]) -> Result<(), Error> {
    for builtin in table {
        scope.bind(&Symbol::intern(builtin.name), Object::Builtin(builtin))?;
    }
    Ok(())
}

/// Binds a builtin under a second name (`current-frame` for
/// `current-binding` and friends). Error messages keep the canonical name.
pub(crate) fn install_alias(
    scope: &Rc<Scope>,
    alias: &str,
    builtin: &'static Builtin,
) -> Result<(), Error> {
    scope.bind(&Symbol::intern(alias), Object::Builtin(builtin))
}

// ============================================================================
// Argument extraction helpers shared by the category modules
// ============================================================================

pub(crate) fn expect_int(name: &str, pos: usize, obj: &Object) -> Result<i64, Error> {
    obj.as_int()
        .ok_or_else(|| Error::type_err(name, pos, "number", obj))
}

pub(crate) fn expect_pair<'a>(
    name: &str,
    pos: usize,
    obj: &'a Object,
) -> Result<&'a Rc<crate::value::Pair>, Error> {
    obj.as_pair()
        .ok_or_else(|| Error::type_err(name, pos, "pair", obj))
}

pub(crate) fn expect_symbol<'a>(
    name: &str,
    pos: usize,
    obj: &'a Object,
) -> Result<&'a Symbol, Error> {
    obj.as_symbol()
        .ok_or_else(|| Error::type_err(name, pos, "symbol", obj))
}

pub(crate) fn expect_string(name: &str, pos: usize, obj: &Object) -> Result<Rc<String>, Error> {
    match obj {
        Object::Str(s) => Ok(s.clone()),
        _ => Err(Error::type_err(name, pos, "string", obj)),
    }
}

pub(crate) fn expect_binding(name: &str, pos: usize, obj: &Object) -> Result<Rc<Scope>, Error> {
    match obj {
        Object::Binding(b) => Ok(b.clone()),
        _ => Err(Error::type_err(name, pos, "binding", obj)),
    }
}

pub(crate) fn expect_vector(
    name: &str,
    pos: usize,
    obj: &Object,
) -> Result<Rc<std::cell::RefCell<Vec<Object>>>, Error> {
    match obj {
        Object::Vector(v) => Ok(v.clone()),
        _ => Err(Error::type_err(name, pos, "vector", obj)),
    }
}

pub(crate) fn expect_expr(
    name: &str,
    pos: usize,
    obj: &Object,
) -> Result<Rc<crate::expr::Expr>, Error> {
    match obj {
        Object::Expr(e) => Ok(e.clone()),
        _ => Err(Error::type_err(name, pos, "expression", obj)),
    }
}
