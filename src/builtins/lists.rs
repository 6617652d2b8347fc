//! Pair and list builtins: constructors, accessors, the `cXXXr` family, and
//! the higher-order list library.

use std::rc::Rc;

use crate::binding::Binding;
use crate::builtins::{expect_int, expect_pair, install, Builtin};
use crate::error::Error;
use crate::eval::Engine;
use crate::value::Object;

pub static CONS: Builtin = Builtin::fixed2("cons", cons_fn).pure();
pub static CAR: Builtin = Builtin::fixed1("car", car_fn).pure();
pub static CDR: Builtin = Builtin::fixed1("cdr", cdr_fn).pure();
pub static LIST: Builtin = Builtin::vararg("list", 0, -1, list_fn).pure();
pub static LIST_STAR: Builtin = Builtin::vararg("list*", 1, -1, list_star_fn).pure();
pub static APPEND: Builtin = Builtin::vararg("append", 0, -1, append_fn).pure();
pub static REVERSE: Builtin = Builtin::fixed1("reverse", reverse_fn).pure();
pub static LAST: Builtin = Builtin::fixed1("last", last_fn).pure();
pub static LENGTH: Builtin = Builtin::fixed1("length", length_fn).pure();
pub static LENGTH_LT: Builtin = Builtin::fixed2("length<", length_lt_fn).pure();
pub static LENGTH_GT: Builtin = Builtin::fixed2("length>", length_gt_fn).pure();
pub static LENGTH_EQ: Builtin = Builtin::fixed2("length=", length_eq_fn).pure();
pub static NTH: Builtin = Builtin::fixed2("nth", nth_fn).pure();
pub static ASSOC: Builtin = Builtin::fixed2("assoc", assoc_fn).pure();
pub static ALL: Builtin = Builtin::fixed2("all", all_fn);
pub static ANY: Builtin = Builtin::fixed2("any", any_fn);
pub static MAP: Builtin = Builtin::vararg("map", 2, -1, map_fn);
pub static APPLY: Builtin = Builtin::vararg("apply", 2, -1, apply_fn);
pub static FOLD: Builtin = Builtin::vararg("fold", 3, 3, fold_fn);
pub static FOLD_REVERSE: Builtin = Builtin::vararg("fold-reverse", 3, 3, fold_reverse_fn);

// The full compositions of car/cdr up to four levels. The operations in the
// name apply right to left, so (cadr x) is (car (cdr x)).
macro_rules! cxr_builtins {
    ($($name:ident : [$($op:ident),+]),+ $(,)?) => {
        paste::paste! {
            $(
                fn [<$name _fn>](_eng: &mut Engine, x: Object) -> Result<Object, Error> {
                    let mut cur = x;
                    for op in [$(stringify!($op)),+].iter().rev() {
                        let pair = expect_pair(stringify!($name), 1, &cur)?;
                        cur = if *op == "a" { pair.car() } else { pair.cdr() };
                    }
                    Ok(cur)
                }
                pub static [<$name:upper>]: Builtin =
                    Builtin::fixed1(stringify!($name), [<$name _fn>]).pure();
            )+
            static CXR_TABLE: &[&Builtin] = &[$( &[<$name:upper>] ),+];
        }
    };
}

cxr_builtins! {
    caar: [a, a], cadr: [a, d], cdar: [d, a], cddr: [d, d],
    caaar: [a, a, a], caadr: [a, a, d], cadar: [a, d, a], caddr: [a, d, d],
    cdaar: [d, a, a], cdadr: [d, a, d], cddar: [d, d, a], cdddr: [d, d, d],
    caaaar: [a, a, a, a], caaadr: [a, a, a, d], caadar: [a, a, d, a], caaddr: [a, a, d, d],
    cadaar: [a, d, a, a], cadadr: [a, d, a, d], caddar: [a, d, d, a], cadddr: [a, d, d, d],
    cdaaar: [d, a, a, a], cdaadr: [d, a, a, d], cdadar: [d, a, d, a], cdaddr: [d, a, d, d],
    cddaar: [d, d, a, a], cddadr: [d, d, a, d], cdddar: [d, d, d, a], cddddr: [d, d, d, d],
}

pub fn register(scope: &Rc<Binding>) -> Result<(), Error> {
    install(
        scope,
        &[
            &CONS,
            &CAR,
            &CDR,
            &LIST,
            &LIST_STAR,
            &APPEND,
            &REVERSE,
            &LAST,
            &LENGTH,
            &LENGTH_LT,
            &LENGTH_GT,
            &LENGTH_EQ,
            &NTH,
            &ASSOC,
            &ALL,
            &ANY,
            &MAP,
            &APPLY,
            &FOLD,
            &FOLD_REVERSE,
        ],
    )?;
    install(scope, CXR_TABLE)
}

fn cons_fn(_eng: &mut Engine, car: Object, cdr: Object) -> Result<Object, Error> {
    Ok(Object::cons(car, cdr))
}

fn car_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(expect_pair("car", 1, &x)?.car())
}

fn cdr_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(expect_pair("cdr", 1, &x)?.cdr())
}

fn list_fn(_eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    Ok(Object::from_vec(args))
}

/// Like `list` but the final argument becomes the tail of the chain.
fn list_star_fn(_eng: &mut Engine, mut args: Vec<Object>) -> Result<Object, Error> {
    let tail = args.pop().unwrap_or(Object::Nil);
    Ok(Object::from_vec_dotted(args, tail))
}

/// Appends proper lists; the last argument is shared as the tail of the
/// result and may be any object.
fn append_fn(_eng: &mut Engine, mut args: Vec<Object>) -> Result<Object, Error> {
    let Some(tail) = args.pop() else {
        return Ok(Object::Nil);
    };
    let mut items = Vec::new();
    for arg in &args {
        items.extend(arg.to_vec()?);
    }
    Ok(Object::from_vec_dotted(items, tail))
}

fn reverse_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let mut items = x.to_vec()?;
    items.reverse();
    Ok(Object::from_vec(items))
}

/// The last element of a proper list; `()` for the empty list.
fn last_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    let mut out = Object::Nil;
    for item in x.list_iter() {
        out = item?;
    }
    Ok(out)
}

fn length_fn(_eng: &mut Engine, x: Object) -> Result<Object, Error> {
    Ok(Object::Int(x.list_len()? as i64))
}

/// Counts elements but gives up once the count exceeds `cap`; enough to
/// decide the `length<` / `length>` / `length=` comparisons without walking
/// the whole list.
fn len_upto(lst: &Object, cap: i64) -> Result<i64, Error> {
    let mut n: i64 = 0;
    let mut cur = lst.clone();
    loop {
        if n > cap {
            return Ok(n);
        }
        match cur {
            Object::Nil => return Ok(n),
            Object::Pair(pair) => {
                n += 1;
                cur = pair.cdr();
            }
            _ => return Err(Error::improper(lst)),
        }
    }
}

fn length_lt_fn(_eng: &mut Engine, lst: Object, n: Object) -> Result<Object, Error> {
    let n = expect_int("length<", 2, &n)?;
    Ok(Object::from_bool(len_upto(&lst, n)? < n))
}

fn length_gt_fn(_eng: &mut Engine, lst: Object, n: Object) -> Result<Object, Error> {
    let n = expect_int("length>", 2, &n)?;
    Ok(Object::from_bool(len_upto(&lst, n)? > n))
}

fn length_eq_fn(_eng: &mut Engine, lst: Object, n: Object) -> Result<Object, Error> {
    let n = expect_int("length=", 2, &n)?;
    Ok(Object::from_bool(len_upto(&lst, n)? == n))
}

/// Zero-based element access; out-of-range indices yield `()`.
fn nth_fn(_eng: &mut Engine, lst: Object, idx: Object) -> Result<Object, Error> {
    let idx = expect_int("nth", 2, &idx)?;
    if idx < 0 {
        return Ok(Object::Nil);
    }
    let mut remaining = idx;
    for item in lst.list_iter() {
        let item = item?;
        if remaining == 0 {
            return Ok(item);
        }
        remaining -= 1;
    }
    Ok(Object::Nil)
}

/// First pair of the association list whose car is `equal?` to the key,
/// else `()`.
fn assoc_fn(_eng: &mut Engine, key: Object, alist: Object) -> Result<Object, Error> {
    for entry in alist.list_iter() {
        let entry = entry?;
        let pair = expect_pair("assoc", 2, &entry)
            .map_err(|_| Error::type_err("assoc", 2, "association list", &alist))?;
        if pair.car().equal(&key) {
            return Ok(entry);
        }
    }
    Ok(Object::Nil)
}

/// `()` as soon as the predicate rejects an element, else `T`.
fn all_fn(eng: &mut Engine, pred: Object, lst: Object) -> Result<Object, Error> {
    for item in lst.to_vec()? {
        if eng.apply(&pred, vec![item])?.is_false() {
            return Ok(Object::Nil);
        }
    }
    Ok(Object::t())
}

/// The first truthy predicate result, else `()`.
fn any_fn(eng: &mut Engine, pred: Object, lst: Object) -> Result<Object, Error> {
    for item in lst.to_vec()? {
        let result = eng.apply(&pred, vec![item])?;
        if result.is_true() {
            return Ok(result);
        }
    }
    Ok(Object::Nil)
}

/// Maps the procedure over one or more lists in lockstep, stopping at the
/// shortest.
fn map_fn(eng: &mut Engine, mut args: Vec<Object>) -> Result<Object, Error> {
    let f = args.remove(0);
    let mut cursors = args;
    let mut out = Vec::new();
    loop {
        let mut row = Vec::with_capacity(cursors.len());
        for cursor in &cursors {
            match cursor {
                Object::Nil => return Ok(Object::from_vec(out)),
                Object::Pair(pair) => row.push(pair.car()),
                other => return Err(Error::improper(other)),
            }
        }
        for cursor in cursors.iter_mut() {
            let next = match cursor {
                Object::Pair(pair) => pair.cdr(),
                _ => Object::Nil,
            };
            *cursor = next;
        }
        out.push(eng.apply(&f, row)?);
    }
}

/// `(apply f a b ... rest)`: calls `f` with the leading arguments followed
/// by the elements of the final list.
fn apply_fn(eng: &mut Engine, mut args: Vec<Object>) -> Result<Object, Error> {
    let f = args.remove(0);
    let rest = args.pop().unwrap_or(Object::Nil);
    args.extend(rest.to_vec()?);
    eng.apply(&f, args)
}

/// `(fold f acc list)`: left fold, `acc <- (f acc elem)`.
fn fold_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let (f, init, lst) = (&args[0], &args[1], &args[2]);
    let mut acc = init.clone();
    for item in lst.to_vec()? {
        acc = eng.apply(f, vec![acc, item])?;
    }
    Ok(acc)
}

/// `(fold-reverse f acc list)`: right fold, `acc <- (f elem acc)` from the
/// end of the list.
fn fold_reverse_fn(eng: &mut Engine, args: Vec<Object>) -> Result<Object, Error> {
    let (f, init, lst) = (&args[0], &args[1], &args[2]);
    let mut acc = init.clone();
    for item in lst.to_vec()?.into_iter().rev() {
        acc = eng.apply(f, vec![item, acc])?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eng() -> Engine {
        Engine::new(&Binding::root("root"))
    }

    fn num_list(values: &[i64]) -> Object {
        Object::from_vec(values.iter().map(|v| Object::Int(*v)).collect())
    }

    #[test]
    fn test_cons_car_cdr() {
        let mut e = eng();
        let pair = cons_fn(&mut e, Object::Int(1), Object::Int(2)).unwrap();
        assert!(matches!(car_fn(&mut e, pair.clone()), Ok(Object::Int(1))));
        assert!(matches!(cdr_fn(&mut e, pair), Ok(Object::Int(2))));

        let err = car_fn(&mut e, Object::Int(5)).unwrap_err();
        assert_eq!(err.to_string(), "car: argument 1 is not a pair, but Int64/5");
    }

    #[test]
    fn test_cxr_compositions() {
        let mut e = eng();
        let lst = num_list(&[1, 2, 3, 4, 5]);
        assert!(matches!(cadr_fn(&mut e, lst.clone()), Ok(Object::Int(2))));
        assert!(matches!(caddr_fn(&mut e, lst.clone()), Ok(Object::Int(3))));
        assert!(matches!(cadddr_fn(&mut e, lst.clone()), Ok(Object::Int(4))));
        assert_eq!(cddr_fn(&mut e, lst).unwrap().to_string(), "(3 4 5)");
    }

    #[test]
    fn test_list_star_and_append() {
        let mut e = eng();
        let star = list_star_fn(
            &mut e,
            vec![Object::Int(1), Object::Int(2), num_list(&[3, 4])],
        )
        .unwrap();
        assert_eq!(star.to_string(), "(1 2 3 4)");

        let appended = append_fn(&mut e, vec![num_list(&[1, 2]), num_list(&[3])]).unwrap();
        assert_eq!(appended.to_string(), "(1 2 3)");

        // the final argument may be a non-list tail
        let dotted = append_fn(&mut e, vec![num_list(&[1]), Object::Int(2)]).unwrap();
        assert_eq!(dotted.to_string(), "(1 . 2)");

        assert!(matches!(append_fn(&mut e, vec![]), Ok(Object::Nil)));
    }

    #[test]
    fn test_reverse_last_length() {
        let mut e = eng();
        assert_eq!(
            reverse_fn(&mut e, num_list(&[1, 2, 3])).unwrap().to_string(),
            "(3 2 1)"
        );
        assert!(matches!(
            last_fn(&mut e, num_list(&[1, 2, 3])),
            Ok(Object::Int(3))
        ));
        assert!(matches!(last_fn(&mut e, Object::Nil), Ok(Object::Nil)));
        assert!(matches!(
            length_fn(&mut e, num_list(&[1, 2, 3])),
            Ok(Object::Int(3))
        ));

        let improper = Object::cons(Object::Int(1), Object::Int(2));
        assert!(length_fn(&mut e, improper).is_err());
    }

    #[test]
    fn test_length_comparisons() {
        let mut e = eng();
        let lst = num_list(&[1, 2, 3]);
        assert!(length_lt_fn(&mut e, lst.clone(), Object::Int(4))
            .unwrap()
            .is_true());
        assert!(length_lt_fn(&mut e, lst.clone(), Object::Int(3))
            .unwrap()
            .is_false());
        assert!(length_gt_fn(&mut e, lst.clone(), Object::Int(2))
            .unwrap()
            .is_true());
        assert!(length_eq_fn(&mut e, lst, Object::Int(3)).unwrap().is_true());
    }

    #[test]
    fn test_nth_and_assoc() {
        let mut e = eng();
        let lst = num_list(&[10, 20, 30]);
        assert!(matches!(
            nth_fn(&mut e, lst.clone(), Object::Int(1)),
            Ok(Object::Int(20))
        ));
        assert!(matches!(
            nth_fn(&mut e, lst.clone(), Object::Int(9)),
            Ok(Object::Nil)
        ));
        assert!(matches!(
            nth_fn(&mut e, lst, Object::Int(-1)),
            Ok(Object::Nil)
        ));

        let alist = Object::from_vec(vec![
            Object::cons(Object::symbol("a"), Object::Int(1)),
            Object::cons(Object::symbol("b"), Object::Int(2)),
        ]);
        let hit = assoc_fn(&mut e, Object::symbol("b"), alist.clone()).unwrap();
        assert_eq!(hit.to_string(), "(b . 2)");
        assert!(assoc_fn(&mut e, Object::symbol("z"), alist)
            .unwrap()
            .is_false());
    }

    #[test]
    fn test_map_over_builtin() {
        let mut e = eng();
        let doubled = map_fn(
            &mut e,
            vec![Object::Builtin(&crate::builtins::arithmetic::ADD), num_list(&[1, 2]), num_list(&[10, 20, 30])],
        )
        .unwrap();
        // lockstep stops at the shorter list
        assert_eq!(doubled.to_string(), "(11 22)");
    }

    #[test]
    fn test_apply_spreads_last_list() {
        let mut e = eng();
        let result = apply_fn(
            &mut e,
            vec![
                Object::Builtin(&crate::builtins::arithmetic::ADD),
                Object::Int(1),
                num_list(&[2, 3]),
            ],
        )
        .unwrap();
        assert!(matches!(result, Object::Int(6)));
    }

    #[test]
    fn test_folds() {
        let mut e = eng();
        let sum = fold_fn(
            &mut e,
            vec![
                Object::Builtin(&crate::builtins::arithmetic::SUB),
                Object::Int(10),
                num_list(&[1, 2, 3]),
            ],
        )
        .unwrap();
        // ((10 - 1) - 2) - 3
        assert!(matches!(sum, Object::Int(4)));

        let rsum = fold_reverse_fn(
            &mut e,
            vec![
                Object::Builtin(&crate::builtins::lists::CONS),
                Object::Nil,
                num_list(&[1, 2, 3]),
            ],
        )
        .unwrap();
        assert_eq!(rsum.to_string(), "(1 2 3)");
    }
}
