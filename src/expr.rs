// ABOUTME: The internal expression tree produced by the parser

use std::fmt;
use std::rc::Rc;

use crate::builtins::Builtin;
use crate::symbol::Symbol;
use crate::value::{ClosureKind, Object};

/// Shared handle to an expression node. Expressions are immutable once
/// built; the improver returns new nodes rather than mutating in place, so
/// handles can be shared freely between closures and `ExprObj` values.
pub type ExprRef = Rc<Expr>;

/// A non-empty evaluation sequence: every `front` expression runs for its
/// side effects, `last` runs in tail position.
#[derive(Debug)]
pub struct Seq {
    pub front: Vec<ExprRef>,
    pub last: ExprRef,
}

/// One `cond` clause. A clause without a body yields the test's own value.
#[derive(Debug)]
pub struct CondClause {
    pub test: ExprRef,
    pub body: Option<ExprRef>,
}

/// The shape of a `lambda` / `dyn-lambda` / macro definition before it is
/// closed over a binding.
#[derive(Debug)]
pub struct LambdaSpec {
    pub kind: ClosureKind,
    pub name: String,
    pub params: Vec<Symbol>,
    pub rest: Option<Symbol>,
    pub body: ExprRef,
}

/// The canonical expression node set. `compute` lives on the evaluation
/// engine (`eval.rs`), `improve` on the improver (`improve.rs`); this module
/// owns the structure and `unparse`.
#[derive(Debug)]
pub enum Expr {
    /// A literal value; also the representation of `quote`.
    Const(Object),
    /// A symbol reference, resolved against the binding chain at compute
    /// time. Referencing an unbound symbol is not a parse error.
    Ref(Symbol),
    If {
        test: ExprRef,
        then: ExprRef,
        els: ExprRef,
    },
    Seq(Seq),
    And(Seq),
    Or(Seq),
    Cond(Vec<CondClause>),
    Let {
        syms: Vec<Symbol>,
        vals: Vec<ExprRef>,
        body: ExprRef,
    },
    LetRec {
        syms: Vec<Symbol>,
        vals: Vec<ExprRef>,
        body: ExprRef,
    },
    Define {
        sym: Symbol,
        val: ExprRef,
        constant: bool,
    },
    SetBang {
        sym: Symbol,
        val: ExprRef,
    },
    Lambda(Rc<LambdaSpec>),
    Call {
        proc: ExprRef,
        args: Vec<ExprRef>,
    },
    /// A call whose head was statically resolved to a builtin in a frozen
    /// scope; skips the symbol lookup at compute time.
    BuiltinCall {
        builtin: &'static Builtin,
        args: Vec<ExprRef>,
    },
    /// Quasiquote helper: evaluates the element and returns `(elem . ())`.
    MakeList(ExprRef),
}

impl Expr {
    /// Renders the node back into a surface form that a fresh parse accepts
    /// as a semantically equivalent expression.
    pub fn unparse(&self) -> Object {
        match self {
            Expr::Const(obj) => unparse_const(obj),
            Expr::Ref(sym) => Object::Sym(sym.clone()),
            Expr::If { test, then, els } => Object::from_vec(vec![
                Object::symbol("if"),
                test.unparse(),
                then.unparse(),
                els.unparse(),
            ]),
            Expr::Seq(seq) => tagged_seq("begin", seq),
            Expr::And(seq) => tagged_seq("and", seq),
            Expr::Or(seq) => tagged_seq("or", seq),
            Expr::Cond(clauses) => {
                let mut items = vec![Object::symbol("cond")];
                for clause in clauses {
                    let mut parts = vec![clause.test.unparse()];
                    if let Some(body) = &clause.body {
                        parts.extend(body_forms(body));
                    }
                    items.push(Object::from_vec(parts));
                }
                Object::from_vec(items)
            }
            Expr::Let { syms, vals, body } => unparse_let("let", syms, vals, body),
            Expr::LetRec { syms, vals, body } => unparse_let("letrec", syms, vals, body),
            Expr::Define {
                sym,
                val,
                constant,
            } => {
                // defmacro has no (define sym <macro>) surface syntax, so a
                // macro-valued define unparses back to the defmacro form.
                if let Expr::Lambda(spec) = &**val {
                    if spec.kind == ClosureKind::Macro {
                        let mut items = vec![
                            Object::symbol("defmacro"),
                            Object::Sym(sym.clone()),
                            params_object(&spec.params, &spec.rest),
                        ];
                        items.extend(body_forms(&spec.body));
                        return Object::from_vec(items);
                    }
                }
                let head = if *constant { "defconst" } else { "define" };
                Object::from_vec(vec![
                    Object::symbol(head),
                    Object::Sym(sym.clone()),
                    val.unparse(),
                ])
            }
            Expr::SetBang { sym, val } => Object::from_vec(vec![
                Object::symbol("set!"),
                Object::Sym(sym.clone()),
                val.unparse(),
            ]),
            Expr::Lambda(spec) => {
                let head = match spec.kind {
                    ClosureKind::Dyn => "dyn-lambda",
                    _ => "lambda",
                };
                let mut items = vec![Object::symbol(head), params_object(&spec.params, &spec.rest)];
                items.extend(body_forms(&spec.body));
                Object::from_vec(items)
            }
            Expr::Call { proc, args } => {
                let mut items = vec![proc.unparse()];
                items.extend(args.iter().map(|a| a.unparse()));
                Object::from_vec(items)
            }
            Expr::BuiltinCall { builtin, args } => {
                let mut items = vec![Object::symbol(builtin.name)];
                items.extend(args.iter().map(|a| a.unparse()));
                Object::from_vec(items)
            }
            Expr::MakeList(elem) => {
                Object::from_vec(vec![Object::symbol("list"), elem.unparse()])
            }
        }
    }
}

/// Self-evaluating constants unparse to themselves; everything else needs a
/// quote wrapper to survive re-parsing.
fn unparse_const(obj: &Object) -> Object {
    match obj {
        Object::Nil
        | Object::Int(_)
        | Object::Str(_)
        | Object::Vector(_)
        | Object::Undefined => obj.clone(),
        _ => Object::from_vec(vec![Object::symbol("quote"), obj.clone()]),
    }
}

fn tagged_seq(tag: &str, seq: &Seq) -> Object {
    let mut items = vec![Object::symbol(tag)];
    items.extend(seq.front.iter().map(|e| e.unparse()));
    items.push(seq.last.unparse());
    Object::from_vec(items)
}

/// The body forms of a lambda or let body. A `Seq` body splices back into
/// multiple forms, anything else is a single form.
fn body_forms(body: &ExprRef) -> Vec<Object> {
    match &**body {
        Expr::Seq(seq) => {
            let mut forms: Vec<Object> = seq.front.iter().map(|e| e.unparse()).collect();
            forms.push(seq.last.unparse());
            forms
        }
        _ => vec![body.unparse()],
    }
}

fn unparse_let(head: &str, syms: &[Symbol], vals: &[ExprRef], body: &ExprRef) -> Object {
    let pairs: Vec<Object> = syms
        .iter()
        .zip(vals.iter())
        .map(|(s, v)| Object::from_vec(vec![Object::Sym(s.clone()), v.unparse()]))
        .collect();
    let mut items = vec![Object::symbol(head), Object::from_vec(pairs)];
    items.extend(body_forms(body));
    Object::from_vec(items)
}

/// The parameter list of a lambda: a plain list, a dotted list with a rest
/// symbol, or a bare symbol for rest-only lambdas.
pub fn params_object(params: &[Symbol], rest: &Option<Symbol>) -> Object {
    let fixed: Vec<Object> = params.iter().map(|s| Object::Sym(s.clone())).collect();
    match rest {
        Some(r) if fixed.is_empty() => Object::Sym(r.clone()),
        Some(r) => Object::from_vec_dotted(fixed, Object::Sym(r.clone())),
        None => Object::from_vec(fixed),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unparse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(e: Expr) -> ExprRef {
        Rc::new(e)
    }

    #[test]
    fn test_unparse_const_atoms() {
        assert_eq!(Expr::Const(Object::Int(5)).unparse().to_string(), "5");
        assert_eq!(Expr::Const(Object::Nil).unparse().to_string(), "()");
        // quoted data needs the wrapper back
        let sym = Expr::Const(Object::symbol("x"));
        assert_eq!(sym.unparse().to_string(), "(quote x)");
    }

    #[test]
    fn test_unparse_if() {
        let e = Expr::If {
            test: r(Expr::Const(Object::Int(1))),
            then: r(Expr::Const(Object::Int(2))),
            els: r(Expr::Const(Object::Nil)),
        };
        assert_eq!(e.unparse().to_string(), "(if 1 2 ())");
    }

    #[test]
    fn test_unparse_seq_and_setbang() {
        let seq = Expr::Seq(Seq {
            front: vec![r(Expr::Const(Object::Int(1)))],
            last: r(Expr::Const(Object::Int(2))),
        });
        assert_eq!(seq.unparse().to_string(), "(begin 1 2)");

        let set = Expr::SetBang {
            sym: Symbol::intern("x"),
            val: r(Expr::Const(Object::Int(3))),
        };
        assert_eq!(set.unparse().to_string(), "(set! x 3)");
    }

    #[test]
    fn test_unparse_lambda_params() {
        let fixed = params_object(&[Symbol::intern("a"), Symbol::intern("b")], &None);
        assert_eq!(fixed.to_string(), "(a b)");

        let dotted = params_object(&[Symbol::intern("a")], &Some(Symbol::intern("rest")));
        assert_eq!(dotted.to_string(), "(a . rest)");

        let rest_only = params_object(&[], &Some(Symbol::intern("rest")));
        assert_eq!(rest_only.to_string(), "rest");
    }

    #[test]
    fn test_unparse_let() {
        let e = Expr::Let {
            syms: vec![Symbol::intern("a")],
            vals: vec![r(Expr::Const(Object::Int(3)))],
            body: r(Expr::Ref(Symbol::intern("a"))),
        };
        assert_eq!(e.unparse().to_string(), "(let ((a 3)) a)");
    }
}
