//! Numeric builtins: `+`, `-`, `*`, `div`, `mod`, comparisons, `min`, `max`.
//!
//! Arithmetic is 64-bit signed with two's-complement wrap on overflow.
//! Comparisons require at least two numeric arguments and chain pairwise.

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{expect_int, install, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::value::Object;

pub static ADD: Builtin = Builtin::vararg("+", 0, -1, add_fn).pure();
pub static SUB: Builtin = Builtin::vararg("-", 1, -1, sub_fn).pure();
pub static MUL: Builtin = Builtin::vararg("*", 0, -1, mul_fn).pure();
pub static DIV: Builtin = Builtin::fixed2("div", div_fn).pure_if(nonzero_divisor);
pub static MOD: Builtin = Builtin::fixed2("mod", mod_fn).pure_if(nonzero_divisor);
pub static LT: Builtin = Builtin::vararg("<", 2, -1, lt_fn).pure();
pub static LE: Builtin = Builtin::vararg("<=", 2, -1, le_fn).pure();
pub static GT: Builtin = Builtin::vararg(">", 2, -1, gt_fn).pure();
pub static GE: Builtin = Builtin::vararg(">=", 2, -1, ge_fn).pure();
pub static NUM_EQ: Builtin = Builtin::vararg("=", 2, -1, num_eq_fn).pure();
pub static MIN: Builtin = Builtin::vararg("min", 1, -1, min_fn).pure();
pub static MAX: Builtin = Builtin::vararg("max", 1, -1, max_fn).pure();

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(
        scope,
        &[
            &ADD, &SUB, &MUL, &DIV, &MOD, &LT, &LE, &GT, &GE, &NUM_EQ, &MIN, &MAX,
        ],
    )
}

fn add_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let mut sum: i64 = 0;
    for (i, arg) in args.iter().enumerate() {
        sum = sum.wrapping_add(expect_int("+", i + 1, arg)?);
    }
    Ok(Object::Int(sum))
}

/// With a single argument, negation; otherwise subtracts the rest from the
/// first.
fn sub_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let first = expect_int("-", 1, &args[0])?;
    if args.len() == 1 {
        return Ok(Object::Int(first.wrapping_neg()));
    }
    let mut acc = first;
    for (i, arg) in args.iter().enumerate().skip(1) {
        acc = acc.wrapping_sub(expect_int("-", i + 1, arg)?);
    }
    Ok(Object::Int(acc))
}

fn mul_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let mut product: i64 = 1;
    for (i, arg) in args.iter().enumerate() {
        product = product.wrapping_mul(expect_int("*", i + 1, arg)?);
    }
    Ok(Object::Int(product))
}

fn nonzero_divisor(args: &[Object]) -> bool {
    matches!(args.get(1), Some(Object::Int(d)) if *d != 0)
}

fn div_fn(_eng: &mut Engine, a: Object, b: Object) -> Result<Object, Error> {
    let x = expect_int("div", 1, &a)?;
    let y = expect_int("div", 2, &b)?;
    if y == 0 {
        return Err(Error::DivisionByZero);
    }
    Ok(Object::Int(x.wrapping_div(y)))
}

fn mod_fn(_eng: &mut Engine, a: Object, b: Object) -> Result<Object, Error> {
    let x = expect_int("mod", 1, &a)?;
    let y = expect_int("mod", 2, &b)?;
    if y == 0 {
        return Err(Error::DivisionByZero);
    }
    Ok(Object::Int(x.wrapping_rem(y)))
}

fn compare(name: &str, args: &[Object], ok: fn(i64, i64) -> bool) -> Result<Object, Error> {
    let mut prev = expect_int(name, 1, &args[0])?;
    for (i, arg) in args.iter().enumerate().skip(1) {
        let cur = expect_int(name, i + 1, arg)?;
        if !ok(prev, cur) {
            return Ok(Object::Nil);
        }
        prev = cur;
    }
    Ok(Object::t())
}

fn lt_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    compare("<", &args, |a, b| a < b)
}

fn le_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    compare("<=", &args, |a, b| a <= b)
}

fn gt_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    compare(">", &args, |a, b| a > b)
}

fn ge_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    compare(">=", &args, |a, b| a >= b)
}

fn num_eq_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    compare("=", &args, |a, b| a == b)
}

fn min_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let mut best = expect_int("min", 1, &args[0])?;
    for (i, arg) in args.iter().enumerate().skip(1) {
        best = best.min(expect_int("min", i + 1, arg)?);
    }
    Ok(Object::Int(best))
}

fn max_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let mut best = expect_int("max", 1, &args[0])?;
    for (i, arg) in args.iter().enumerate().skip(1) {
        best = best.max(expect_int("max", i + 1, arg)?);
    }
    Ok(Object::Int(best))
}
