// ABOUTME: Quasiquotation expansion into list-building expressions

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::lists::{APPEND, LIST};
use crate::error::Error;
use crate::eval::Engine;
use crate::expr::{Expr, ExprRef};
use crate::parser::parse;
use crate::value::Object;

/// Parses `(quasiquote form)` into an expression that rebuilds `form` at
/// compute time with `unquote` / `unquote-splicing` substituted.
///
/// A form without unquotes collapses to a constant. Otherwise the result is
/// assembled from `list` / `append` calls and `MakeList` wrappers, with
/// constant runs folded into literal list segments. A nested `quasiquote` is
/// copied literally; only the outermost level expands.
pub fn parse_quasiquote(
    eng: &mut Engine,
    bind: &Rc<Binding>,
    tail: &Object,
) -> Result<ExprRef, Error> {
    let args = tail.to_vec()?;
    if args.len() != 1 {
        return Err(Error::Parse(format!(
            "quasiquote: expected exactly 1 arguments, got {}",
            args.len()
        )));
    }
    qq_form(eng, bind, &args[0])
}

fn qq_form(eng: &mut Engine, bind: &Rc<Binding>, obj: &Object) -> Result<ExprRef, Error> {
    if !obj.is_pair() {
        return Ok(constant(obj));
    }
    if let Some(inner) = tagged_arg(obj, "unquote")? {
        return parse(eng, bind, &inner);
    }
    if is_tagged(obj, "unquote-splicing") {
        return Err(Error::Parse(
            "unquote-splicing: not in list position".to_string(),
        ));
    }
    if is_tagged(obj, "quasiquote") || !contains_unquote(obj) {
        return Ok(constant(obj));
    }
    qq_list(eng, bind, obj)
}

enum Part {
    Elem(ExprRef),
    Splice(ExprRef),
}

/// Lowers a list with at least one unquote somewhere inside it.
fn qq_list(eng: &mut Engine, bind: &Rc<Binding>, obj: &Object) -> Result<ExprRef, Error> {
    let mut parts = Vec::new();
    let mut tail: Option<ExprRef> = None;

    let mut cur = obj.clone();
    loop {
        // `(a . ,x)` reads as a chain ending in an (unquote x) pair, which
        // marks an evaluated tail. A nested quasiquote in tail position is a
        // literal tail.
        if !std::ptr::eq(raw_addr(&cur), raw_addr(obj)) {
            if let Some(inner) = tagged_arg(&cur, "unquote")? {
                tail = Some(parse(eng, bind, &inner)?);
                break;
            }
            if is_tagged(&cur, "quasiquote") {
                tail = Some(constant(&cur));
                break;
            }
        }
        match cur {
            Object::Nil => break,
            Object::Pair(pair) => {
                let car = pair.car();
                if let Some(inner) = tagged_arg(&car, "unquote-splicing")? {
                    parts.push(Part::Splice(parse(eng, bind, &inner)?));
                } else {
                    parts.push(Part::Elem(qq_form(eng, bind, &car)?));
                }
                cur = pair.cdr();
            }
            other => {
                tail = Some(constant(&other));
                break;
            }
        }
    }

    let mut segments = Vec::new();
    let mut run: Vec<ExprRef> = Vec::new();
    for part in parts {
        match part {
            Part::Elem(e) => run.push(e),
            Part::Splice(e) => {
                flush_run(&mut segments, &mut run);
                segments.push(e);
            }
        }
    }
    flush_run(&mut segments, &mut run);
    if let Some(t) = tail {
        segments.push(t);
    }

    match segments.len() {
        0 => Ok(constant(&Object::Nil)),
        1 => Ok(segments.remove(0)),
        _ => Ok(Rc::new(Expr::BuiltinCall {
            builtin: &APPEND,
            args: segments,
        })),
    }
}

/// Turns a run of consecutive (non-spliced) elements into one list segment:
/// an all-constant run becomes a literal list, a single evaluated element
/// becomes `MakeList`, longer mixed runs become a `list` call.
fn flush_run(segments: &mut Vec<ExprRef>, run: &mut Vec<ExprRef>) {
    if run.is_empty() {
        return;
    }
    let elems = std::mem::take(run);
    if elems.iter().all(|e| matches!(&**e, Expr::Const(_))) {
        let values = elems
            .iter()
            .map(|e| match &**e {
                Expr::Const(obj) => obj.clone(),
                _ => Object::Nil,
            })
            .collect();
        segments.push(constant(&Object::from_vec(values)));
        return;
    }
    if elems.len() == 1 {
        let mut elems = elems;
        segments.push(Rc::new(Expr::MakeList(elems.remove(0))));
        return;
    }
    segments.push(Rc::new(Expr::BuiltinCall {
        builtin: &LIST,
        args: elems,
    }));
}

fn constant(obj: &Object) -> ExprRef {
    Rc::new(Expr::Const(obj.clone()))
}

fn raw_addr(obj: &Object) -> *const () {
    match obj {
        Object::Pair(p) => Rc::as_ptr(p).cast(),
        _ => std::ptr::null(),
    }
}

/// True when `obj` is a pair whose head is the symbol `tag`.
fn is_tagged(obj: &Object, tag: &str) -> bool {
    obj.as_pair()
        .map(|p| matches!(&p.car(), Object::Sym(s) if s.name() == tag))
        .unwrap_or(false)
}

/// For a `(tag x)` form, yields `x`; a malformed tag form is a parse error.
fn tagged_arg(obj: &Object, tag: &str) -> Result<Option<Object>, Error> {
    if !is_tagged(obj, tag) {
        return Ok(None);
    }
    let args = obj
        .as_pair()
        .map(|p| p.cdr())
        .unwrap_or(Object::Nil)
        .to_vec()?;
    if args.len() != 1 {
        return Err(Error::Parse(format!(
            "{tag}: expected exactly 1 arguments, got {}",
            args.len()
        )));
    }
    Ok(Some(args[0].clone()))
}

/// Scans for an unquote at the current quasiquote level. Nested quasiquotes
/// are opaque: their unquotes belong to the inner level.
fn contains_unquote(obj: &Object) -> bool {
    match obj {
        Object::Pair(pair) => {
            if is_tagged(obj, "unquote") || is_tagged(obj, "unquote-splicing") {
                return true;
            }
            if is_tagged(obj, "quasiquote") {
                return false;
            }
            contains_unquote(&pair.car()) || contains_unquote(&pair.cdr())
        }
        _ => false,
    }
}
