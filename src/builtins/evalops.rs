//! The eval family: parsing, unparsing, improving, and running expressions
//! from inside the language.

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{expect_binding, expect_expr, install, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::improve::improve;
use crate::parser::parse;
use crate::value::{Closure, Object};

pub static PARSE_EXPRESSION: Builtin =
    Builtin::vararg("parse-expression", 1, 2, parse_expression_fn);
pub static UNPARSE_EXPRESSION: Builtin =
    Builtin::fixed1("unparse-expression", unparse_expression_fn).pure();
pub static RUN_EXPRESSION: Builtin = Builtin::vararg("run-expression", 1, 2, run_expression_fn);
pub static COMPILE: Builtin = Builtin::vararg("compile", 1, 2, compile_fn);
pub static EVAL: Builtin = Builtin::vararg("eval", 1, 2, eval_fn);
pub static MACROEXPAND_0: Builtin = Builtin::fixed1("macroexpand-0", macroexpand_0_fn);

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(
        scope,
        &[
            &PARSE_EXPRESSION,
            &UNPARSE_EXPRESSION,
            &RUN_EXPRESSION,
            &COMPILE,
            &EVAL,
            &MACROEXPAND_0,
        ],
    )
}

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

/// `(parse-expression form [binding])`: parses without improving.
fn parse_expression_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let bind = binding_or_current("parse-expression", eng, &args, 2)?;
    let expr = parse(eng, &bind, &args[0])?;
    Ok(Object::Expr(expr))
}

fn unparse_expression_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let expr = expect_expr("unparse-expression", 1, &x)?;
    Ok(expr.unparse())
}

/// `(run-expression expr [binding])`: evaluates an already-parsed
/// expression.
fn run_expression_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let expr = expect_expr("run-expression", 1, &args[0])?;
    let bind = binding_or_current("run-expression", eng, &args, 2)?;
    eng.execute(&expr, &bind)
}

/// `(compile x [binding])`: accepts a raw form or an already-parsed
/// expression and returns the improved expression; a lambda or macro comes
/// back with an improved body.
fn compile_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    match &args[0] {
        Object::Expr(expr) => {
            let expr = expr.clone();
            Ok(Object::Expr(improve(&expr, eng)))
        }
        Object::Closure(closure) => {
            let body = improve(&closure.body, eng);
            Ok(Object::Closure(Rc::new(Closure {
                kind: closure.kind,
                name: closure.name.clone(),
                params: closure.params.clone(),
                rest: closure.rest.clone(),
                body,
                captured: closure.captured.clone(),
            })))
        }
        form => {
            let bind = binding_or_current("compile", eng, &args, 2)?;
            let expr = parse(eng, &bind, form)?;
            Ok(Object::Expr(improve(&expr, eng)))
        }
    }
}

/// `(eval form [binding])`: the full pipeline, parse then improve then
/// execute.
fn eval_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let bind = binding_or_current("eval", eng, &args, 2)?;
    let expr = parse(eng, &bind, &args[0])?;
    let expr = improve(&expr, eng);
    eng.execute(&expr, &bind)
}

/// `(macroexpand-0 form)`: one expansion step, without re-parsing the
/// result; non-macro forms come back unchanged.
fn macroexpand_0_fn(eng: &mut Engine, form: Object) -> Result<Object, Error> {
    let target = match form.as_pair() {
        Some(pair) => match pair.car() {
            Object::Sym(head) => Some((head, pair.cdr())),
            _ => None,
        },
        None => None,
    };
    let Some((head, tail)) = target else {
        return Ok(form);
    };
    match eng.current_binding().resolve(head.name()) {
        Some(Object::Closure(closure)) if closure.is_macro() => {
            let args = tail.to_vec()?;
            eng.expand_macro(&closure, args)
        }
        _ => Ok(form),
    }
}
