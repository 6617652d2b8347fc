// ABOUTME: Parses surface S-expressions into expression trees via the special-form table

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::binding::Binding;
use crate::error::Error;
use crate::eval::Engine;
use crate::expr::{CondClause, Expr, ExprRef, LambdaSpec, Seq};
use crate::quasi;
use crate::symbol::Symbol;
use crate::value::{ClosureKind, Object};

/// A special form: a syntactic construct whose arguments are not uniformly
/// evaluated. Special forms live in the binding chain like any other value,
/// so the parser finds them by resolving the head symbol.
pub struct SpecialForm {
    pub name: &'static str,
    pub parse: fn(&mut Engine, &Rc<Binding>, &Object) -> Result<ExprRef, Error>,
}

impl fmt::Debug for SpecialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<special:{}>", self.name)
    }
}

/// Parses one object into an expression tree.
///
/// Atoms become constants, symbols become references (an unbound symbol is
/// not a parse error; lookup happens at compute time), and pairs dispatch on
/// their head: special forms parse their own tail, macros expand and
/// re-parse, and everything else becomes a call.
pub fn parse(eng: &mut Engine, bind: &Rc<Binding>, obj: &Object) -> Result<ExprRef, Error> {
    match obj {
        Object::Sym(sym) if sym.is_keyword() => Ok(Rc::new(Expr::Const(obj.clone()))),
        Object::Sym(sym) => Ok(Rc::new(Expr::Ref(sym.clone()))),
        Object::Pair(pair) => parse_call(eng, bind, &pair.car(), &pair.cdr()),
        _ => Ok(Rc::new(Expr::Const(obj.clone()))),
    }
}

fn parse_call(
    eng: &mut Engine,
    bind: &Rc<Binding>,
    head: &Object,
    tail: &Object,
) -> Result<ExprRef, Error> {
    if let Object::Sym(sym) = head {
        match bind.resolve_scope(sym.name()) {
            Some((Object::Special(form), _)) => return (form.parse)(eng, bind, tail),
            Some((Object::Closure(closure), _)) if closure.is_macro() => {
                let args = tail.to_vec()?;
                eng.enter_macro(sym.name())?;
                let result = eng.expand_macro(&closure, args).and_then(|form| {
                    trace!("macro {} expanded to {}", sym.name(), form);
                    parse(eng, bind, &form)
                });
                eng.leave_macro();
                return result;
            }
            // a head bound to a builtin in a frozen scope cannot be
            // redefined, so the lookup can be done once at parse time
            Some((Object::Builtin(builtin), scope)) if scope.is_frozen() => {
                let args = parse_args(eng, bind, tail)?;
                return Ok(Rc::new(Expr::BuiltinCall { builtin, args }));
            }
            _ => {}
        }
    }
    let proc = parse(eng, bind, head)?;
    let args = parse_args(eng, bind, tail)?;
    Ok(Rc::new(Expr::Call { proc, args }))
}

fn parse_args(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<Vec<ExprRef>, Error> {
    tail.to_vec()?
        .iter()
        .map(|arg| parse(eng, bind, arg))
        .collect()
}

// ============================================================================
// Special-form table
// ============================================================================

pub static QUOTE: SpecialForm = SpecialForm {
    name: "quote",
    parse: parse_quote,
};
pub static IF: SpecialForm = SpecialForm {
    name: "if",
    parse: parse_if,
};
pub static BEGIN: SpecialForm = SpecialForm {
    name: "begin",
    parse: parse_begin,
};
pub static AND: SpecialForm = SpecialForm {
    name: "and",
    parse: parse_and,
};
pub static OR: SpecialForm = SpecialForm {
    name: "or",
    parse: parse_or,
};
pub static COND: SpecialForm = SpecialForm {
    name: "cond",
    parse: parse_cond,
};
pub static LET: SpecialForm = SpecialForm {
    name: "let",
    parse: parse_let,
};
pub static LET_STAR: SpecialForm = SpecialForm {
    name: "let*",
    parse: parse_let_star,
};
pub static LETREC: SpecialForm = SpecialForm {
    name: "letrec",
    parse: parse_letrec,
};
pub static DEFINE: SpecialForm = SpecialForm {
    name: "define",
    parse: parse_define,
};
pub static DEFVAR: SpecialForm = SpecialForm {
    name: "defvar",
    parse: parse_defvar,
};
pub static DEFCONST: SpecialForm = SpecialForm {
    name: "defconst",
    parse: parse_defconst,
};
pub static SET_BANG: SpecialForm = SpecialForm {
    name: "set!",
    parse: parse_set_bang,
};
pub static LAMBDA: SpecialForm = SpecialForm {
    name: "lambda",
    parse: parse_lambda,
};
pub static DYN_LAMBDA: SpecialForm = SpecialForm {
    name: "dyn-lambda",
    parse: parse_dyn_lambda,
};
pub static DEFUN: SpecialForm = SpecialForm {
    name: "defun",
    parse: parse_defun,
};
pub static DEFDYN: SpecialForm = SpecialForm {
    name: "defdyn",
    parse: parse_defdyn,
};
pub static DEFMACRO: SpecialForm = SpecialForm {
    name: "defmacro",
    parse: parse_defmacro,
};
pub static QUASIQUOTE: SpecialForm = SpecialForm {
    name: "quasiquote",
    parse: quasi::parse_quasiquote,
};
pub static UNQUOTE: SpecialForm = SpecialForm {
    name: "unquote",
    parse: parse_stray_unquote,
};
pub static UNQUOTE_SPLICING: SpecialForm = SpecialForm {
    name: "unquote-splicing",
    parse: parse_stray_unquote_splicing,
};

/// Installs the special forms and the `T` truth symbol into a binding,
/// normally the interpreter root before it is frozen.
pub fn register_special_forms(root: &Rc<Binding>) -> Result<(), Error> {
    let forms: &[&'static SpecialForm] = &[
        &QUOTE,
        &IF,
        &BEGIN,
        &AND,
        &OR,
        &COND,
        &LET,
        &LET_STAR,
        &LETREC,
        &DEFINE,
        &DEFVAR,
        &DEFCONST,
        &SET_BANG,
        &LAMBDA,
        &DYN_LAMBDA,
        &DEFUN,
        &DEFDYN,
        &DEFMACRO,
        &QUASIQUOTE,
        &UNQUOTE,
        &UNQUOTE_SPLICING,
    ];
    for form in forms {
        root.bind(&Symbol::intern(form.name), Object::Special(form))?;
    }
    // T evaluates to itself through the binding chain
    let t = Symbol::intern("T");
    root.bind(&t, Object::Sym(t.clone()))?;
    Ok(())
}

// ============================================================================
// Form parsers
// ============================================================================

/// Collects a form's argument list, checking the count against `[min, max]`
/// (`max = usize::MAX` for unbounded).
fn form_args(name: &str, tail: &Object, min: usize, max: usize) -> Result<Vec<Object>, Error> {
    let args = tail.to_vec()?;
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("exactly {min}")
        } else if max == usize::MAX {
            format!("at least {min}")
        } else {
            format!("between {min} and {max}")
        };
        return Err(Error::Parse(format!(
            "{name}: expected {expected} arguments, got {}",
            args.len()
        )));
    }
    Ok(args)
}

/// Wraps parsed body forms into a single expression: empty bodies yield nil,
/// single forms stay bare, longer bodies become a sequence.
fn seq_of(mut exprs: Vec<ExprRef>) -> ExprRef {
    match exprs.len() {
        0 => Rc::new(Expr::Const(Object::Nil)),
        1 => exprs.remove(0),
        _ => {
            let last = exprs.pop().unwrap_or_else(|| Rc::new(Expr::Const(Object::Nil)));
            Rc::new(Expr::Seq(Seq { front: exprs, last }))
        }
    }
}

fn parse_body(eng: &mut Engine, bind: &Rc<Binding>, forms: &[Object]) -> Result<ExprRef, Error> {
    let exprs = forms
        .iter()
        .map(|form| parse(eng, bind, form))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(seq_of(exprs))
}

fn expect_symbol(name: &str, obj: &Object) -> Result<Symbol, Error> {
    obj.as_symbol()
        .cloned()
        .ok_or_else(|| Error::Parse(format!("{name}: {obj} is not a symbol")))
}

fn parse_quote(
    _eng: &mut Engine,
    _bind: &Rc<Binding>,
    tail: &Object,
) -> Result<ExprRef, Error> {
    let args = form_args("quote", tail, 1, 1)?;
    Ok(Rc::new(Expr::Const(args[0].clone())))
}

fn parse_if(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = form_args("if", tail, 2, 3)?;
    let test = parse(eng, bind, &args[0])?;
    let then = parse(eng, bind, &args[1])?;
    let els = match args.get(2) {
        Some(form) => parse(eng, bind, form)?,
        None => Rc::new(Expr::Const(Object::Nil)),
    };
    Ok(Rc::new(Expr::If { test, then, els }))
}

fn parse_begin(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = tail.to_vec()?;
    parse_body(eng, bind, &args)
}

fn parse_and(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = tail.to_vec()?;
    if args.is_empty() {
        return Ok(Rc::new(Expr::Const(Object::t())));
    }
    let mut exprs = args
        .iter()
        .map(|form| parse(eng, bind, form))
        .collect::<Result<Vec<_>, _>>()?;
    let last = exprs.pop().unwrap_or_else(|| Rc::new(Expr::Const(Object::t())));
    Ok(Rc::new(Expr::And(Seq { front: exprs, last })))
}

fn parse_or(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = tail.to_vec()?;
    if args.is_empty() {
        return Ok(Rc::new(Expr::Const(Object::Nil)));
    }
    let mut exprs = args
        .iter()
        .map(|form| parse(eng, bind, form))
        .collect::<Result<Vec<_>, _>>()?;
    let last = exprs.pop().unwrap_or_else(|| Rc::new(Expr::Const(Object::Nil)));
    Ok(Rc::new(Expr::Or(Seq { front: exprs, last })))
}

fn parse_cond(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let mut clauses = Vec::new();
    for clause_form in tail.to_vec()? {
        let parts = clause_form.to_vec()?;
        if parts.is_empty() {
            return Err(Error::Parse("cond: empty clause".to_string()));
        }
        let test = parse(eng, bind, &parts[0])?;
        let body = if parts.len() > 1 {
            Some(parse_body(eng, bind, &parts[1..])?)
        } else {
            None
        };
        clauses.push(CondClause { test, body });
    }
    Ok(Rc::new(Expr::Cond(clauses)))
}

/// Parses the `((sym val) ...)` head of the let family, rejecting duplicate
/// symbols.
fn parse_let_bindings(
    name: &str,
    bindings_form: &Object,
) -> Result<Vec<(Symbol, Object)>, Error> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for pair_form in bindings_form.to_vec()? {
        let parts = pair_form.to_vec()?;
        if parts.len() != 2 {
            return Err(Error::Parse(format!(
                "{name}: binding {pair_form} is not a (symbol value) pair"
            )));
        }
        let sym = expect_symbol(name, &parts[0])?;
        if !seen.insert(sym.name().to_string()) {
            return Err(Error::Parse(format!(
                "{name}: duplicate symbol {}",
                sym.name()
            )));
        }
        out.push((sym, parts[1].clone()));
    }
    Ok(out)
}

fn parse_let(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = form_args("let", tail, 1, usize::MAX)?;
    let pairs = parse_let_bindings("let", &args[0])?;
    let mut syms = Vec::new();
    let mut vals = Vec::new();
    for (sym, val_form) in pairs {
        syms.push(sym);
        vals.push(parse(eng, bind, &val_form)?);
    }
    let body = parse_body(eng, bind, &args[1..])?;
    Ok(Rc::new(Expr::Let { syms, vals, body }))
}

/// `let*` is desugared into nested `let`s so each value sees the bindings
/// before it.
fn parse_let_star(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = form_args("let*", tail, 1, usize::MAX)?;
    let pairs = parse_let_bindings("let*", &args[0])?;
    let body = parse_body(eng, bind, &args[1..])?;
    let mut out = body;
    for (sym, val_form) in pairs.into_iter().rev() {
        let val = parse(eng, bind, &val_form)?;
        out = Rc::new(Expr::Let {
            syms: vec![sym],
            vals: vec![val],
            body: out,
        });
    }
    Ok(out)
}

fn parse_letrec(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = form_args("letrec", tail, 1, usize::MAX)?;
    let pairs = parse_let_bindings("letrec", &args[0])?;
    let mut syms = Vec::new();
    let mut vals = Vec::new();
    for (sym, val_form) in pairs {
        syms.push(sym);
        vals.push(parse(eng, bind, &val_form)?);
    }
    let body = parse_body(eng, bind, &args[1..])?;
    Ok(Rc::new(Expr::LetRec { syms, vals, body }))
}

/// The parameter list of a lambda: a bare symbol collects all arguments, a
/// proper list gives fixed parameters, a dotted list adds a rest parameter.
fn parse_params(name: &str, obj: &Object) -> Result<(Vec<Symbol>, Option<Symbol>), Error> {
    match obj {
        Object::Nil => Ok((Vec::new(), None)),
        Object::Sym(sym) => Ok((Vec::new(), Some(sym.clone()))),
        Object::Pair(_) => {
            let mut seen = HashSet::new();
            let mut params = Vec::new();
            let mut cur = obj.clone();
            loop {
                match cur {
                    Object::Nil => return Ok((params, None)),
                    Object::Sym(rest) => {
                        if !seen.insert(rest.name().to_string()) {
                            return Err(Error::Parse(format!(
                                "{name}: duplicate symbol {}",
                                rest.name()
                            )));
                        }
                        return Ok((params, Some(rest)));
                    }
                    Object::Pair(pair) => {
                        let sym = expect_symbol(name, &pair.car())?;
                        if !seen.insert(sym.name().to_string()) {
                            return Err(Error::Parse(format!(
                                "{name}: duplicate symbol {}",
                                sym.name()
                            )));
                        }
                        params.push(sym);
                        cur = pair.cdr();
                    }
                    other => {
                        return Err(Error::Parse(format!(
                            "{name}: {other} is not a parameter symbol"
                        )))
                    }
                }
            }
        }
        other => Err(Error::Parse(format!(
            "{name}: {other} is not a parameter list"
        ))),
    }
}

fn lambda_expr(
    eng: &mut Engine,
    bind: &Rc<Binding>,
    kind: ClosureKind,
    name: String,
    params_form: &Object,
    body_forms: &[Object],
) -> Result<ExprRef, Error> {
    let (params, rest) = parse_params(&name, params_form)?;
    let body = parse_body(eng, bind, body_forms)?;
    Ok(Rc::new(Expr::Lambda(Rc::new(LambdaSpec {
        kind,
        name,
        params,
        rest,
        body,
    }))))
}

fn parse_lambda(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = form_args("lambda", tail, 1, usize::MAX)?;
    lambda_expr(
        eng,
        bind,
        ClosureKind::Lex,
        "lambda".to_string(),
        &args[0],
        &args[1..],
    )
}

fn parse_dyn_lambda(
    eng: &mut Engine,
    bind: &Rc<Binding>,
    tail: &Object,
) -> Result<ExprRef, Error> {
    let args = form_args("dyn-lambda", tail, 1, usize::MAX)?;
    lambda_expr(
        eng,
        bind,
        ClosureKind::Dyn,
        "dyn-lambda".to_string(),
        &args[0],
        &args[1..],
    )
}

fn define_expr(sym: Symbol, val: ExprRef, constant: bool) -> ExprRef {
    Rc::new(Expr::Define {
        sym,
        val,
        constant,
    })
}

fn parse_define(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = form_args("define", tail, 2, usize::MAX)?;
    match &args[0] {
        // (define sym val)
        Object::Sym(sym) => {
            if args.len() != 2 {
                return Err(Error::Parse(format!(
                    "define: expected exactly 2 arguments, got {}",
                    args.len()
                )));
            }
            let val = parse(eng, bind, &args[1])?;
            Ok(define_expr(sym.clone(), val, false))
        }
        // (define (fn-sym params...) body...)
        Object::Pair(header) => {
            let sym = expect_symbol("define", &header.car())?;
            let val = lambda_expr(
                eng,
                bind,
                ClosureKind::Lex,
                sym.name().to_string(),
                &header.cdr(),
                &args[1..],
            )?;
            Ok(define_expr(sym, val, false))
        }
        other => Err(Error::Parse(format!(
            "define: {other} is not a symbol or function header"
        ))),
    }
}

fn parse_defvar(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = form_args("defvar", tail, 2, 2)?;
    let sym = expect_symbol("defvar", &args[0])?;
    let val = parse(eng, bind, &args[1])?;
    Ok(define_expr(sym, val, false))
}

fn parse_defconst(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = form_args("defconst", tail, 2, 2)?;
    let sym = expect_symbol("defconst", &args[0])?;
    let val = parse(eng, bind, &args[1])?;
    Ok(define_expr(sym, val, true))
}

fn parse_set_bang(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    let args = form_args("set!", tail, 2, 2)?;
    let sym = expect_symbol("set!", &args[0])?;
    let val = parse(eng, bind, &args[1])?;
    Ok(Rc::new(Expr::SetBang { sym, val }))
}

fn named_define(
    eng: &mut Engine,
    bind: &Rc<Binding>,
    form_name: &str,
    kind: ClosureKind,
    tail: &Object,
) -> Result<ExprRef, Error> {
    let args = form_args(form_name, tail, 2, usize::MAX)?;
    let sym = expect_symbol(form_name, &args[0])?;
    let val = lambda_expr(eng, bind, kind, sym.name().to_string(), &args[1], &args[2..])?;
    Ok(define_expr(sym, val, false))
}

fn parse_defun(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    named_define(eng, bind, "defun", ClosureKind::Lex, tail)
}

fn parse_defdyn(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    named_define(eng, bind, "defdyn", ClosureKind::Dyn, tail)
}

fn parse_defmacro(eng: &mut Engine, bind: &Rc<Binding>, tail: &Object) -> Result<ExprRef, Error> {
    named_define(eng, bind, "defmacro", ClosureKind::Macro, tail)
}

fn parse_stray_unquote(
    _eng: &mut Engine,
    _bind: &Rc<Binding>,
    _tail: &Object,
) -> Result<ExprRef, Error> {
    Err(Error::Parse("unquote: not inside quasiquote".to_string()))
}

fn parse_stray_unquote_splicing(
    _eng: &mut Engine,
    _bind: &Rc<Binding>,
    _tail: &Object,
) -> Result<ExprRef, Error> {
    Err(Error::Parse(
        "unquote-splicing: not inside quasiquote".to_string(),
    ))
}
