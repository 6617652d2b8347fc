// ABOUTME: Library root exposing the symbolic-expression interpreter

//! An embeddable interpreter for a Lisp/Scheme dialect built on symbolic
//! expressions.
//!
//! Source text flows through a fixed pipeline: the [`reader`] turns bytes
//! into [`value::Object`] trees, the [`parser`] turns objects into
//! [`expr::Expr`] nodes by consulting the special-form table and expanding
//! macros, the [`improve`] pass rewrites trees into simpler equivalents, and
//! the [`eval`] engine executes them against a chain of [`binding`] scopes
//! with proper tail calls.
//!
//! [`Interpreter`] wires the stages together for embedders:
//!
//! ```
//! use symex::Interpreter;
//!
//! let mut interp = Interpreter::new().unwrap();
//! let value = interp.eval_str("(let ((a 3)) (* a a))").unwrap();
//! assert_eq!(value.to_string(), "9");
//! ```

pub mod binding;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod expr;
pub mod improve;
pub mod interp;
pub mod parser;
pub mod quasi;
pub mod reader;
pub mod symbol;
pub mod value;

pub use binding::Binding;
pub use error::Error;
pub use eval::Engine;
pub use interp::Interpreter;
pub use reader::Reader;
pub use symbol::Symbol;
pub use value::Object;
