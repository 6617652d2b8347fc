// ABOUTME: Tree improvement: constant folding and dead-form elimination

use std::rc::Rc;

use crate::eval::Engine;
use crate::expr::{CondClause, Expr, ExprRef, LambdaSpec, Seq};
use crate::value::Object;

/// Returns an equivalent, possibly simpler expression. Improvement is
/// idempotent and optional: compute semantics are identical whether or not
/// it runs. The engine is only used to fold pure builtin calls over constant
/// arguments; a fold that fails leaves the node unchanged.
pub fn improve(expr: &ExprRef, eng: &mut Engine) -> ExprRef {
    match &**expr {
        Expr::Const(_) | Expr::Ref(_) => expr.clone(),
        Expr::If { test, then, els } => {
            let test = improve(test, eng);
            if let Expr::Const(v) = &*test {
                return if v.is_true() {
                    improve(then, eng)
                } else {
                    improve(els, eng)
                };
            }
            Rc::new(Expr::If {
                test,
                then: improve(then, eng),
                els: improve(els, eng),
            })
        }
        Expr::Seq(seq) => {
            let mut front = Vec::new();
            for e in &seq.front {
                let improved = improve(e, eng);
                // side-effect-free intermediate forms contribute nothing
                if !matches!(&*improved, Expr::Const(_) | Expr::Ref(_)) {
                    front.push(improved);
                }
            }
            let last = improve(&seq.last, eng);
            if front.is_empty() {
                last
            } else {
                Rc::new(Expr::Seq(Seq { front, last }))
            }
        }
        Expr::And(seq) => improve_junction(seq, eng, false, Expr::And),
        Expr::Or(seq) => improve_junction(seq, eng, true, Expr::Or),
        Expr::Cond(clauses) => improve_cond(clauses, eng),
        Expr::Let { syms, vals, body } => Rc::new(Expr::Let {
            syms: syms.clone(),
            vals: vals.iter().map(|v| improve(v, eng)).collect(),
            body: improve(body, eng),
        }),
        Expr::LetRec { syms, vals, body } => Rc::new(Expr::LetRec {
            syms: syms.clone(),
            vals: vals.iter().map(|v| improve(v, eng)).collect(),
            body: improve(body, eng),
        }),
        Expr::Define {
            sym,
            val,
            constant,
        } => Rc::new(Expr::Define {
            sym: sym.clone(),
            val: improve(val, eng),
            constant: *constant,
        }),
        Expr::SetBang { sym, val } => Rc::new(Expr::SetBang {
            sym: sym.clone(),
            val: improve(val, eng),
        }),
        Expr::Lambda(spec) => Rc::new(Expr::Lambda(Rc::new(LambdaSpec {
            kind: spec.kind,
            name: spec.name.clone(),
            params: spec.params.clone(),
            rest: spec.rest.clone(),
            body: improve(&spec.body, eng),
        }))),
        Expr::Call { proc, args } => Rc::new(Expr::Call {
            proc: improve(proc, eng),
            args: args.iter().map(|a| improve(a, eng)).collect(),
        }),
        Expr::BuiltinCall { builtin, args } => {
            let builtin = *builtin;
            let args: Vec<ExprRef> = args.iter().map(|a| improve(a, eng)).collect();
            if let Some(folded) = fold_builtin_call(builtin, &args, eng) {
                return folded;
            }
            Rc::new(Expr::BuiltinCall { builtin, args })
        }
        Expr::MakeList(elem) => Rc::new(Expr::MakeList(improve(elem, eng))),
    }
}

/// Shared improvement of `and` / `or`. A constant that short-circuits
/// (`short_on_true` selects which polarity does) truncates the sequence at
/// that point; a constant that does not is dropped from the front.
fn improve_junction(
    seq: &Seq,
    eng: &mut Engine,
    short_on_true: bool,
    make: fn(Seq) -> Expr,
) -> ExprRef {
    let mut front = Vec::new();
    let mut last = improve(&seq.last, eng);
    for e in &seq.front {
        let improved = improve(e, eng);
        if let Expr::Const(v) = &*improved {
            if v.is_true() == short_on_true {
                last = improved.clone();
                break;
            }
            continue;
        }
        front.push(improved);
    }
    if front.is_empty() {
        last
    } else {
        Rc::new(make(Seq { front, last }))
    }
}

/// Drops clauses whose test improved to false; a clause whose test improved
/// to a truthy constant ends the clause list (and, with nothing before it,
/// replaces the whole `cond`).
fn improve_cond(clauses: &[CondClause], eng: &mut Engine) -> ExprRef {
    let mut out = Vec::new();
    for clause in clauses {
        let test = improve(&clause.test, eng);
        let body = clause.body.as_ref().map(|b| improve(b, eng));
        if let Expr::Const(v) = &*test {
            if v.is_false() {
                continue;
            }
            if out.is_empty() {
                return match body {
                    Some(b) => b,
                    None => test,
                };
            }
            out.push(CondClause { test, body });
            break;
        }
        out.push(CondClause { test, body });
    }
    if out.is_empty() {
        Rc::new(Expr::Const(Object::Nil))
    } else {
        Rc::new(Expr::Cond(out))
    }
}

/// Folds a pure builtin call over all-constant arguments into its value.
/// Returns `None` (leave unchanged) when the builtin is impure for these
/// arguments or the evaluation fails.
fn fold_builtin_call(
    builtin: &'static crate::builtins::Builtin,
    args: &[ExprRef],
    eng: &mut Engine,
) -> Option<ExprRef> {
    if builtin.no_call_error {
        return None;
    }
    let pure = builtin.pure?;
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        match &**arg {
            Expr::Const(obj) => values.push(obj.clone()),
            _ => return None,
        }
    }
    if !pure(&values) {
        return None;
    }
    match eng.apply_builtin(builtin, values) {
        Ok(v) => Some(Rc::new(Expr::Const(v))),
        Err(_) => None,
    }
}
