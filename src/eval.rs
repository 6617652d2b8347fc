// ABOUTME: The evaluation engine: tail-call trampoline and call dispatch

use std::rc::Rc;

use log::trace;

use crate::binding::Binding;
use crate::builtins::Builtin;
use crate::error::Error;
use crate::expr::{Expr, ExprRef};
use crate::value::{Closure, ClosureKind, Object};

/// Default bound on nested macro expansion during parsing.
pub const DEFAULT_MACRO_DEPTH: usize = 128;

/// The evaluation environment: an operand stack for argument marshalling,
/// the binding current at the innermost builtin dispatch, and the macro
/// expansion depth guard. One engine is an exclusive, single-threaded
/// resource; embedders wanting concurrency create one interpreter per
/// thread.
pub struct Engine {
    stack: Vec<Object>,
    current: Rc<Binding>,
    macro_depth: usize,
    max_macro_depth: usize,
}

impl Engine {
    pub fn new(root: &Rc<Binding>) -> Engine {
        Engine {
            stack: Vec::new(),
            current: root.clone(),
            macro_depth: 0,
            max_macro_depth: DEFAULT_MACRO_DEPTH,
        }
    }

    /// The binding in effect at the most recent builtin dispatch. This is
    /// what `current-binding`, `defined?`, and the eval family default to.
    pub fn current_binding(&self) -> Rc<Binding> {
        self.current.clone()
    }

    /// Reconfigures the macro expansion depth bound (default 128).
    pub fn set_max_macro_depth(&mut self, depth: usize) {
        self.max_macro_depth = depth;
    }

    /// Evaluates `expr` against `bind`. Tail positions (`if` branches, the
    /// last form of a sequence, `cond` bodies, `let` bodies, and lambda
    /// bodies) loop here instead of recursing, so tail recursion runs in
    /// constant host-stack depth. Non-tail subexpressions recurse normally.
    pub fn execute(&mut self, expr: &ExprRef, bind: &Rc<Binding>) -> Result<Object, Error> {
        let mut expr = expr.clone();
        let mut bind = bind.clone();
        loop {
            let (next_expr, next_bind) = match &*expr {
                Expr::Const(obj) => return Ok(obj.clone()),
                Expr::Ref(sym) => {
                    return bind
                        .resolve(sym.name())
                        .ok_or_else(|| Error::not_bound(sym.name(), bind.name()))
                }
                Expr::If { test, then, els } => {
                    if self.execute(test, &bind)?.is_true() {
                        (then.clone(), bind)
                    } else {
                        (els.clone(), bind)
                    }
                }
                Expr::Seq(seq) => {
                    for e in &seq.front {
                        self.execute(e, &bind)?;
                    }
                    (seq.last.clone(), bind)
                }
                Expr::And(seq) => {
                    let mut short = None;
                    for e in &seq.front {
                        let v = self.execute(e, &bind)?;
                        if v.is_false() {
                            short = Some(v);
                            break;
                        }
                    }
                    match short {
                        Some(v) => return Ok(v),
                        None => (seq.last.clone(), bind),
                    }
                }
                Expr::Or(seq) => {
                    let mut short = None;
                    for e in &seq.front {
                        let v = self.execute(e, &bind)?;
                        if v.is_true() {
                            short = Some(v);
                            break;
                        }
                    }
                    match short {
                        Some(v) => return Ok(v),
                        None => (seq.last.clone(), bind),
                    }
                }
                Expr::Cond(clauses) => {
                    let mut chosen = None;
                    for clause in clauses {
                        let v = self.execute(&clause.test, &bind)?;
                        if v.is_true() {
                            chosen = Some((v, clause.body.clone()));
                            break;
                        }
                    }
                    match chosen {
                        None => return Ok(Object::Nil),
                        Some((v, None)) => return Ok(v),
                        Some((_, Some(body))) => (body, bind),
                    }
                }
                Expr::Let { syms, vals, body } => {
                    let child = Binding::child(&bind, "let");
                    for (sym, val) in syms.iter().zip(vals.iter()) {
                        // values are evaluated in the enclosing binding
                        let v = self.execute(val, &bind)?;
                        child.bind(sym, v)?;
                    }
                    (body.clone(), child)
                }
                Expr::LetRec { syms, vals, body } => {
                    let child = Binding::child(&bind, "letrec");
                    for sym in syms {
                        child.bind(sym, Object::Undefined)?;
                    }
                    for (sym, val) in syms.iter().zip(vals.iter()) {
                        let v = self.execute(val, &child)?;
                        child.bind(sym, v)?;
                    }
                    (body.clone(), child)
                }
                Expr::Define {
                    sym,
                    val,
                    constant,
                } => {
                    let v = self.execute(val, &bind)?;
                    if *constant {
                        bind.bind_const(sym, v.clone())?;
                    } else {
                        bind.bind(sym, v.clone())?;
                    }
                    return Ok(v);
                }
                Expr::SetBang { sym, val } => {
                    let v = self.execute(val, &bind)?;
                    bind.set(sym, v.clone())?;
                    return Ok(v);
                }
                Expr::Lambda(spec) => {
                    let captured = match spec.kind {
                        ClosureKind::Dyn => None,
                        _ => Some(bind.clone()),
                    };
                    return Ok(Object::Closure(Rc::new(Closure {
                        kind: spec.kind,
                        name: spec.name.clone(),
                        params: spec.params.clone(),
                        rest: spec.rest.clone(),
                        body: spec.body.clone(),
                        captured,
                    })));
                }
                Expr::MakeList(elem) => {
                    let v = self.execute(elem, &bind)?;
                    return Ok(Object::cons(v, Object::Nil));
                }
                Expr::BuiltinCall { builtin, args } => {
                    let argv = self.eval_args(args, &bind)?;
                    self.current = bind.clone();
                    return self.apply_builtin(*builtin, argv);
                }
                Expr::Call { proc, args } => {
                    let f = self.execute(proc, &bind)?;
                    let argv = self.eval_args(args, &bind)?;
                    match &f {
                        Object::Builtin(b) => {
                            self.current = bind.clone();
                            return self.apply_builtin(*b, argv);
                        }
                        Object::Closure(c) if !c.is_macro() => {
                            let child = self.closure_binding(c, argv, &bind)?;
                            (c.body.clone(), child)
                        }
                        _ => return Err(Error::not_callable(&f)),
                    }
                }
            };
            expr = next_expr;
            bind = next_bind;
        }
    }

    /// Evaluates call arguments left to right, marshalling them through the
    /// operand stack so a failure leaves the stack balanced.
    fn eval_args(&mut self, args: &[ExprRef], bind: &Rc<Binding>) -> Result<Vec<Object>, Error> {
        let base = self.stack.len();
        for arg in args {
            match self.execute(arg, bind) {
                Ok(v) => self.stack.push(v),
                Err(e) => {
                    self.stack.truncate(base);
                    return Err(e);
                }
            }
        }
        Ok(self.stack.split_off(base))
    }

    /// Validates arity and dispatches to the narrowest matching function
    /// slot; the general slot takes the argument vector.
    pub fn apply_builtin(
        &mut self,
        builtin: &'static Builtin,
        args: Vec<Object>,
    ) -> Result<Object, Error> {
        let n = args.len() as i32;
        if n < builtin.min_arity || (builtin.max_arity >= 0 && n > builtin.max_arity) {
            return Err(Error::arity(
                builtin.name,
                builtin.min_arity,
                builtin.max_arity,
                &args,
            ));
        }
        match args.len() {
            0 => {
                if let Some(f) = builtin.fn0 {
                    return f(self);
                }
            }
            1 => {
                if let Some(f) = builtin.fn1 {
                    return f(self, args[0].clone());
                }
            }
            2 => {
                if let Some(f) = builtin.fn2 {
                    return f(self, args[0].clone(), args[1].clone());
                }
            }
            _ => {}
        }
        match builtin.fnn {
            Some(f) => f(self, args),
            // a builtin descriptor without a slot for its declared arity
            None => Err(Error::arity(
                builtin.name,
                builtin.min_arity,
                builtin.max_arity,
                &args,
            )),
        }
    }

    /// Applies a callable to already-evaluated arguments. Used by the
    /// higher-order builtins (`map`, `apply`, `fold`, ...).
    pub fn apply(&mut self, f: &Object, args: Vec<Object>) -> Result<Object, Error> {
        match f {
            Object::Builtin(b) => self.apply_builtin(*b, args),
            Object::Closure(c) if !c.is_macro() => {
                let caller = self.current.clone();
                let bind = self.closure_binding(c, args, &caller)?;
                let body = c.body.clone();
                self.execute(&body, &bind)
            }
            _ => Err(Error::not_callable(f)),
        }
    }

    /// Builds the call binding for a closure: parameters bound in a fresh
    /// child of the captured binding (or of the caller for dynamic lambdas),
    /// excess arguments collected into the rest parameter.
    pub fn closure_binding(
        &self,
        closure: &Closure,
        mut args: Vec<Object>,
        caller: &Rc<Binding>,
    ) -> Result<Rc<Binding>, Error> {
        let fixed = closure.params.len();
        let max = if closure.rest.is_some() {
            -1
        } else {
            fixed as i32
        };
        if args.len() < fixed || (closure.rest.is_none() && args.len() > fixed) {
            return Err(Error::arity(&closure.name, fixed as i32, max, &args));
        }

        let parent = match (&closure.kind, &closure.captured) {
            (ClosureKind::Dyn, _) | (_, None) => caller.clone(),
            (_, Some(captured)) => captured.clone(),
        };
        let child = Binding::child(&parent, &closure.name);

        let rest_args = args.split_off(fixed);
        for (param, value) in closure.params.iter().zip(args) {
            child.bind(param, value)?;
        }
        if let Some(rest) = &closure.rest {
            child.bind(rest, Object::from_vec(rest_args))?;
        }
        Ok(child)
    }

    /// Runs a macro body on unevaluated argument forms and returns the
    /// produced form object. The parser re-parses the result.
    pub fn expand_macro(
        &mut self,
        closure: &Rc<Closure>,
        args: Vec<Object>,
    ) -> Result<Object, Error> {
        trace!("expanding macro {} with {} args", closure.name, args.len());
        let caller = self.current.clone();
        let bind = self.closure_binding(closure, args, &caller)?;
        let body = closure.body.clone();
        self.execute(&body, &bind)
    }

    /// Depth guard around one level of macro expansion.
    pub fn enter_macro(&mut self, name: &str) -> Result<(), Error> {
        self.macro_depth += 1;
        if self.macro_depth > self.max_macro_depth {
            self.macro_depth -= 1;
            return Err(Error::Macro(format!(
                "macro expansion of {name} exceeded depth {}",
                self.max_macro_depth
            )));
        }
        Ok(())
    }

    pub fn leave_macro(&mut self) {
        self.macro_depth = self.macro_depth.saturating_sub(1);
    }
}
