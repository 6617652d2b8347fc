// ABOUTME: Error types and the canonical message surface for interpreter failures

use thiserror::Error;

use crate::value::Object;

/// Every failure the engine can produce. Errors are never caught inside the
/// core; each `compute` propagates the first failure unchanged. The only
/// exception is the improver, which swallows fold failures and keeps the
/// unimproved node.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed source text, surfaced before any form is parsed.
    #[error("{0}")]
    Reader(String),

    /// Malformed special form or argument shape discovered at parse time.
    #[error("{0}")]
    Parse(String),

    /// Reference to a symbol with no binding in scope.
    #[error("symbol \"{symbol}\" not bound in \"{binding}\"")]
    NotBound { symbol: String, binding: String },

    /// Builtin or lambda called with the wrong number of arguments. The
    /// message is preformatted by [`Error::arity`] so test suites can pin it.
    #[error("{0}")]
    Arity(String),

    /// Builtin argument of the wrong kind. Positions are 1-based.
    #[error("{function}: argument {position} is not a {expected}, but {type_name}/{value}")]
    Type {
        function: String,
        position: usize,
        expected: String,
        type_name: String,
        value: String,
    },

    /// A list operation reached a non-nil, non-pair tail.
    #[error("improper list: {0}")]
    ImproperList(String),

    /// Attempt to bind into a frozen scope.
    #[error("binding is frozen: {0}")]
    FrozenBinding(String),

    /// Attempt to overwrite a frozen symbol value slot.
    #[error("symbol value is frozen: {0}")]
    FrozenSymbol(String),

    /// `set!` on a slot installed by `defconst`.
    #[error("symbol \"{0}\" is constant and cannot be set")]
    ConstantSymbol(String),

    /// Call position did not evaluate to a builtin or lambda.
    #[error("not a callable: {0}")]
    NotCallable(String),

    #[error("division by zero")]
    DivisionByZero,

    /// Raised by `(error ...)`.
    #[error("{0}")]
    User(String),

    /// Macro expansion failed or ran past the depth bound.
    #[error("{0}")]
    Macro(String),
}

impl Error {
    /// Builds the canonical arity message for a callable named `name` with
    /// the inclusive arity range `[min, max]` (`max = -1` means unbounded).
    pub fn arity(name: &str, min: i32, max: i32, args: &[Object]) -> Self {
        let given = args.len();
        let msg = if min == max {
            if given == 0 {
                format!("{name}: exactly {min} arguments required, but none given")
            } else {
                format!(
                    "{name}: exactly {min} arguments required, but {given} given: {}",
                    print_args(args)
                )
            }
        } else if max < 0 {
            format!(
                "{name}: at least {min} arguments required, but only {given} given: {}",
                print_args(args)
            )
        } else {
            format!(
                "{name}: between {min} and {max} arguments required, but {given} given: {}",
                print_args(args)
            )
        };
        Error::Arity(msg)
    }

    /// Type error for argument `position` (1-based) of builtin `function`.
    pub fn type_err(function: &str, position: usize, expected: &str, got: &Object) -> Self {
        Error::Type {
            function: function.to_string(),
            position,
            expected: expected.to_string(),
            type_name: got.type_name().to_string(),
            value: got.to_string(),
        }
    }

    pub fn not_bound(symbol: &str, binding: &str) -> Self {
        Error::NotBound {
            symbol: symbol.to_string(),
            binding: binding.to_string(),
        }
    }

    pub fn improper(obj: &Object) -> Self {
        Error::ImproperList(obj.to_string())
    }

    pub fn not_callable(obj: &Object) -> Self {
        Error::NotCallable(obj.to_string())
    }

    /// `(error)` yields the fixed message; `(error x ...)` joins the
    /// arguments with single spaces, strings taken without quotes.
    pub fn user(args: &[Object]) -> Self {
        if args.is_empty() {
            return Error::User("unspecified user error".to_string());
        }
        let parts: Vec<String> = args.iter().map(plain_text).collect();
        Error::User(parts.join(" "))
    }
}

fn plain_text(obj: &Object) -> String {
    match obj {
        Object::Str(s) => s.as_str().to_string(),
        _ => obj.to_string(),
    }
}

fn print_args(args: &[Object]) -> String {
    let mut out = String::from("[");
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&a.to_string());
    }
    out.push(']');
    out
}
