//! String builtins: `->string` and `concat`.

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{expect_string, install, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::value::Object;

pub static TO_STRING: Builtin = Builtin::fixed1("->string", to_string_fn).pure();
pub static CONCAT: Builtin = Builtin::vararg("concat", 0, -1, concat_fn).pure();

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(scope, &[&TO_STRING, &CONCAT])
}

/// The printed representation of any object, as a string.
fn to_string_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::string(x.to_string()))
}

fn concat_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        out.push_str(expect_string("concat", i + 1, arg)?.as_str());
    }
    Ok(Object::string(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eng() -> Engine {
        Engine::new(&Binding::root("root"))
    }

    #[test]
    fn test_to_string_is_representation() {
        let mut e = eng();
        let lst = Object::from_vec(vec![Object::Int(1), Object::Int(2)]);
        match to_string_fn(&mut e, lst).unwrap() {
            Object::Str(s) => assert_eq!(s.as_str(), "(1 2)"),
            other => panic!("expected string, got {other:?}"),
        }
        // strings render with their quotes
        match to_string_fn(&mut e, Object::string("hi")).unwrap() {
            Object::Str(s) => assert_eq!(s.as_str(), "\"hi\""),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_concat() {
        let mut e = eng();
        let joined = concat_fn(
            &mut e,
            vec![Object::string("ab"), Object::string(""), Object::string("c")],
        )
        .unwrap();
        match joined {
            Object::Str(s) => assert_eq!(s.as_str(), "abc"),
            other => panic!("expected string, got {other:?}"),
        }

        assert!(matches!(concat_fn(&mut e, vec![]), Ok(Object::Str(_))));
        let err = concat_fn(&mut e, vec![Object::Int(1)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "concat: argument 1 is not a string, but Int64/1"
        );
    }
}
