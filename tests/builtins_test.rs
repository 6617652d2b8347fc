// ABOUTME: Integration tests for the builtin procedure table

use symex::{Interpreter, Object};

fn eval(src: &str) -> Object {
    let mut interp = Interpreter::new().expect("interpreter setup");
    interp.eval_str(src).expect("evaluation")
}

#[test]
fn test_arithmetic() {
    assert!(matches!(eval("(+ 1 2 3)"), Object::Int(6)));
    assert!(matches!(eval("(+)"), Object::Int(0)));
    assert!(matches!(eval("(- 10 3 2)"), Object::Int(5)));
    assert!(matches!(eval("(- 5)"), Object::Int(-5)));
    assert!(matches!(eval("(* 2 3 4)"), Object::Int(24)));
    assert!(matches!(eval("(div 7 2)"), Object::Int(3)));
    assert!(matches!(eval("(mod 7 2)"), Object::Int(1)));
    assert!(matches!(eval("(min 3 1 2)"), Object::Int(1)));
    assert!(matches!(eval("(max 3 1 2)"), Object::Int(3)));
}

#[test]
fn test_comparisons() {
    assert!(eval("(< 1 2 3)").is_true());
    assert!(eval("(< 1 3 2)").is_false());
    assert!(eval("(<= 1 1 2)").is_true());
    assert!(eval("(> 3 2 1)").is_true());
    assert!(eval("(>= 3 3 1)").is_true());
    assert!(eval("(= 2 2 2)").is_true());
    assert!(eval("(= 2 3)").is_false());
}

#[test]
fn test_equality() {
    assert!(eval("(eq? 'a 'a)").is_true());
    assert!(eval("(eq? '(1) '(1))").is_false());
    assert!(eval("(equal? '(1 (2)) '(1 (2)))").is_true());
    assert!(eval("(== 2 2 2)").is_true());
    assert!(eval("(== 2 2 3)").is_false());
}

#[test]
fn test_list_primitives() {
    assert_eq!(eval("(cons 1 '(2 3))").to_string(), "(1 2 3)");
    assert!(matches!(eval("(car '(1 2))"), Object::Int(1)));
    assert_eq!(eval("(cdr '(1 2))").to_string(), "(2)");
    assert_eq!(eval("(list 1 2 3)").to_string(), "(1 2 3)");
    assert_eq!(eval("(list)").to_string(), "()");
    assert_eq!(eval("(list* 1 2 '(3 4))").to_string(), "(1 2 3 4)");
    assert_eq!(eval("(append '(1) '(2 3) '(4))").to_string(), "(1 2 3 4)");
    assert_eq!(eval("(append)").to_string(), "()");
}

#[test]
fn test_cxr_family() {
    assert!(matches!(eval("(cadr '(1 2 3))"), Object::Int(2)));
    assert!(matches!(eval("(caddr '(1 2 3))"), Object::Int(3)));
    assert!(matches!(eval("(caar '((1 2) 3))"), Object::Int(1)));
    assert_eq!(eval("(cddr '(1 2 3 4))").to_string(), "(3 4)");
    assert!(matches!(eval("(cadddr '(1 2 3 4))"), Object::Int(4)));
}

#[test]
fn test_list_library() {
    assert!(matches!(eval("(length '(1 2 3))"), Object::Int(3)));
    assert!(matches!(eval("(length ())"), Object::Int(0)));
    assert_eq!(eval("(reverse '(1 2 3))").to_string(), "(3 2 1)");
    assert!(matches!(eval("(last '(1 2 3))"), Object::Int(3)));
    assert!(matches!(eval("(nth '(10 20 30) 1)"), Object::Int(20)));
    assert!(eval("(length< '(1 2) 3)").is_true());
    assert!(eval("(length> '(1 2) 2)").is_false());
    assert!(eval("(length= '(1 2) 2)").is_true());
    assert_eq!(eval("(assoc 'b '((a . 1) (b . 2)))").to_string(), "(b . 2)");
}

#[test]
fn test_higher_order_list_ops() {
    assert_eq!(
        eval("(map (lambda (n) (* n n)) '(1 2 3))").to_string(),
        "(1 4 9)"
    );
    assert_eq!(eval("(map + '(1 2) '(10 20 30))").to_string(), "(11 22)");
    assert!(eval("(all number? '(1 2 3))").is_true());
    assert!(eval("(all number? '(1 x 3))").is_false());
    assert!(eval("(any (lambda (n) (> n 2)) '(1 2 3))").is_true());
    assert!(eval("(any (lambda (n) (> n 9)) '(1 2 3))").is_false());
    assert!(matches!(eval("(apply + 1 '(2 3))"), Object::Int(6)));
    assert!(matches!(eval("(fold - 10 '(1 2 3))"), Object::Int(4)));
    assert_eq!(
        eval("(fold-reverse cons () '(1 2 3))").to_string(),
        "(1 2 3)"
    );
}

#[test]
fn test_vectors() {
    assert_eq!(eval("(vector 1 2 3)").to_string(), "(vector 1 2 3)");
    assert_eq!(eval("(vector->list (vector 1 2))").to_string(), "(1 2)");
    assert_eq!(eval("(list->vector '(1 2))").to_string(), "(vector 1 2)");
    let src = "(define v (vector 1 2 3)) (vset! v 1 9) v";
    assert_eq!(eval(src).to_string(), "(vector 1 9 3)");
    assert!(eval("(vector? (vector))").is_true());
    // the empty vector is still a true value: only () is false
    assert!(eval("(if (vector) 'yes 'no)").to_string() == "yes");
}

#[test]
fn test_strings() {
    assert_eq!(eval("(concat \"ab\" \"cd\")").to_string(), "\"abcd\"");
    assert_eq!(eval("(->string '(1 2))").to_string(), "\"(1 2)\"");
    assert_eq!(eval("(->string 42)").to_string(), "\"42\"");
}

#[test]
fn test_predicates() {
    assert!(eval("(null? ())").is_true());
    assert!(eval("(pair? '(1))").is_true());
    assert!(eval("(pair? ())").is_false());
    assert!(eval("(list? '(1 2))").is_true());
    assert!(eval("(list? '(1 . 2))").is_false());
    assert!(eval("(symbol? 'a)").is_true());
    assert!(eval("(number? 3)").is_true());
    assert!(eval("(boolean? ())").is_true());
    assert!(eval("(boolean? T)").is_true());
    assert!(eval("(boolean? 0)").is_false());
    assert!(eval("(callable? car)").is_true());
    assert!(eval("(callable? (lambda (x) x))").is_true());
    assert!(eval("(callable? 'car)").is_false());
    assert!(eval("(undefined? (make-undefined))").is_true());
    assert!(eval("(defined? 'car)").is_true());
    assert!(eval("(defined? 'no-such-thing)").is_false());
}

#[test]
fn test_symbol_value_slot() {
    let src = "(set-symbol-value 'slot 41)
               (symbol-value 'slot)";
    assert!(matches!(eval(src), Object::Int(41)));

    // the slot namespace is independent of the binding chain
    let src = "(define twin 1)
               (set-symbol-value 'twin 2)
               (list twin (symbol-value 'twin))";
    assert_eq!(eval(src).to_string(), "(1 2)");

    assert!(eval("(undefined? (symbol-value 'never-stored))").is_true());
    assert!(eval("(bound? 'never-stored-either)").is_false());

    let src = "(set-symbol-value 'cold 1)
               (freeze-symbol-value 'cold)
               (frozen-symbol-value 'cold)";
    assert!(eval(src).is_true());
}

#[test]
fn test_binding_introspection() {
    assert!(eval("(current-binding)").to_string().starts_with("#<binding:user/"));
    // the frame aliases name the same builtins
    assert!(eval("(eq? current-frame current-binding)").is_true());
    assert!(eval("(eq? frame-lookup binding-lookup)").is_true());

    let src = "(define local 5) (binding-lookup 'local)";
    assert!(matches!(eval(src), Object::Int(5)));
    assert!(eval("(undefined? (binding-lookup 'car))").is_true());
    assert!(eval("(eq? (binding-resolve 'car) car)").is_true());

    // bindings returns (sym . obj) pairs for the innermost scope
    let mut interp = Interpreter::new().unwrap();
    interp.eval_str("(define probe 7)").unwrap();
    let entry = interp.eval_str("(assoc 'probe (bindings))").unwrap();
    assert_eq!(entry.to_string(), "(probe . 7)");
}

#[test]
fn test_eval_family() {
    assert!(matches!(eval("(eval '(+ 1 2))"), Object::Int(3)));
    assert!(matches!(
        eval("(run-expression (parse-expression '(* 2 3)))"),
        Object::Int(6)
    ));
    assert_eq!(
        eval("(unparse-expression (parse-expression '(if 1 2 3)))").to_string(),
        "(if 1 2 3)"
    );
    // compile folds constants
    assert_eq!(
        eval("(unparse-expression (compile '(+ 1 2)))").to_string(),
        "3"
    );
    assert!(matches!(
        eval("(run-expression (compile '(+ 1 2)))"),
        Object::Int(3)
    ));
    // eval against an explicit binding
    let src = "(define y 4) (eval 'y (current-binding))";
    assert!(matches!(eval(src), Object::Int(4)));
}

#[test]
fn test_parse_expression_object_printing() {
    assert_eq!(
        eval("(parse-expression '(if 1 2 3))").to_string(),
        "#<{(if 1 2 3)}>"
    );
}
