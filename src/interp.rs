// ABOUTME: The embeddable interpreter facade: root setup, prelude, pipeline

use std::rc::Rc;

use log::debug;

use crate::binding::Binding;
use crate::builtins::register_builtins;
use crate::error::Error;
use crate::eval::Engine;
use crate::improve::improve;
use crate::parser::{parse, register_special_forms};
use crate::reader::Reader;
use crate::value::Object;

const PRELUDE: &str = include_str!("prelude.lisp");

/// One interpreter instance: a frozen root binding holding the special
/// forms, builtins, and prelude definitions, plus a mutable user scope where
/// top-level forms evaluate. Instances share nothing but interned symbol
/// identities, so embedders wanting concurrency create one per thread.
pub struct Interpreter {
    engine: Engine,
    root: Rc<Binding>,
    user: Rc<Binding>,
}

impl Interpreter {
    /// A fully equipped interpreter with the prelude installed.
    pub fn new() -> Result<Interpreter, Error> {
        Self::build(true)
    }

    /// An interpreter with builtins and special forms but no prelude.
    pub fn without_prelude() -> Result<Interpreter, Error> {
        Self::build(false)
    }

    fn build(load_prelude: bool) -> Result<Interpreter, Error> {
        let root = Binding::root("root");
        register_special_forms(&root)?;
        register_builtins(&root)?;
        let mut engine = Engine::new(&root);

        if load_prelude {
            let mut count = 0;
            for form in Reader::new(PRELUDE) {
                let form = form?;
                let expr = parse(&mut engine, &root, &form)?;
                let expr = improve(&expr, &mut engine);
                engine.execute(&expr, &root)?;
                count += 1;
            }
            debug!("prelude installed ({count} forms)");
        }

        // standard operators cannot be redefined from here on
        root.freeze();
        let user = Binding::child(&root, "user");
        Ok(Interpreter { engine, root, user })
    }

    pub fn root_binding(&self) -> Rc<Binding> {
        self.root.clone()
    }

    pub fn user_binding(&self) -> Rc<Binding> {
        self.user.clone()
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Reads every form in `src` and runs each through
    /// parse → improve → execute against the user scope, returning the value
    /// of the last form (`()` for empty input).
    pub fn eval_str(&mut self, src: &str) -> Result<Object, Error> {
        let mut last = Object::Nil;
        for form in Reader::new(src) {
            last = self.eval_object(&form?)?;
        }
        Ok(last)
    }

    /// Runs one already-read form through the pipeline.
    pub fn eval_object(&mut self, form: &Object) -> Result<Object, Error> {
        let expr = parse(&mut self.engine, &self.user, form)?;
        let expr = improve(&expr, &mut self.engine);
        self.engine.execute(&expr, &self.user)
    }
}
