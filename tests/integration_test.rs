// ABOUTME: End-to-end tests driving program text through the full pipeline

use symex::{Interpreter, Object};

fn eval(src: &str) -> Object {
    let mut interp = Interpreter::new().expect("interpreter setup");
    interp.eval_str(src).expect("evaluation")
}

fn eval_err(src: &str) -> String {
    let mut interp = Interpreter::new().expect("interpreter setup");
    interp.eval_str(src).expect_err("expected error").to_string()
}

// ============================================================================
// Core semantics
// ============================================================================

#[test]
fn test_begin_returns_last_value() {
    let result = eval("(define (fb) 11) (define (fc) 33) (begin (fb) (fc))");
    assert!(matches!(result, Object::Int(33)));
}

#[test]
fn test_begin_evaluates_in_order() {
    let result = eval(
        "(define n 0)
         (begin (set! n 1) (set! n (+ n 10)) n)",
    );
    assert!(matches!(result, Object::Int(11)));
}

#[test]
fn test_let_shadowing() {
    let result = eval("(let ((a 3)) (let ((a 2)) a))");
    assert!(matches!(result, Object::Int(2)));

    // the outer binding is untouched after the inner scope unwinds
    let result = eval("(define a 3) (let ((a 2)) a) a");
    assert!(matches!(result, Object::Int(3)));
}

#[test]
fn test_rest_parameters() {
    assert_eq!(eval("((lambda (x . y) y) 1 2 3)").to_string(), "(2 3)");
    assert_eq!(eval("((lambda args args) 1 2)").to_string(), "(1 2)");
    assert_eq!(eval("((lambda (x . y) y) 1)").to_string(), "()");
}

#[test]
fn test_factorial() {
    let result = eval("(define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) (fact 10)");
    assert!(matches!(result, Object::Int(3628800)));
}

#[test]
fn test_quasiquote_scenario() {
    assert_eq!(
        eval("`(1 ,(+ 1 1) ,@(list 3 4) 5)").to_string(),
        "(1 2 3 4 5)"
    );
}

#[test]
fn test_defmacro_when() {
    let src = "(defmacro my-when (c . body) `(if ,c (begin ,@body)))";
    assert!(matches!(
        eval(&format!("{src} (my-when 1 7 8)")),
        Object::Int(8)
    ));
    assert!(eval(&format!("{src} (my-when () 7 8)")).is_nil());
}

#[test]
fn test_and_or() {
    assert!(matches!(eval("(and 1 2 3)"), Object::Int(3)));
    assert!(eval("(and 1 () 3)").is_nil());
    assert!(matches!(eval("(or () () 5)"), Object::Int(5)));
    assert!(eval("(and)").is_true());
    assert!(eval("(or)").is_nil());
    // short-circuiting skips later side effects
    let result = eval("(define n 0) (and () (set! n 1)) n");
    assert!(matches!(result, Object::Int(0)));
}

#[test]
fn test_set_unbound_symbol_fails() {
    assert_eq!(
        eval_err("(set! undef 1)"),
        "symbol \"undef\" not bound in \"user\""
    );
}

#[test]
fn test_cond() {
    assert!(matches!(eval("(cond (() 1) (2 3))"), Object::Int(3)));
    assert!(eval("(cond (() 1))").is_nil());
    assert!(matches!(eval("(cond (else 42))"), Object::Int(42)));
    // a clause without a body yields its test value
    assert!(matches!(eval("(cond (() 1) (7))"), Object::Int(7)));
    let src = "(define (sign n) (cond ((< n 0) -1) ((> n 0) 1) (else 0)))";
    assert!(matches!(eval(&format!("{src} (sign -9)")), Object::Int(-1)));
    assert!(matches!(eval(&format!("{src} (sign 0)")), Object::Int(0)));
}

#[test]
fn test_let_star_and_letrec() {
    assert!(matches!(
        eval("(let* ((a 1) (b (+ a 1)) (c (+ b 1))) c)"),
        Object::Int(3)
    ));

    let src = "(letrec ((even? (lambda (n) (if (= n 0) T (odd? (- n 1)))))
                        (odd?  (lambda (n) (if (= n 0) () (even? (- n 1))))))
                 (even? 10))";
    assert!(eval(src).is_true());
}

#[test]
fn test_closures_capture_lexically() {
    let src = "(define (adder n) (lambda (x) (+ x n)))
               (define add3 (adder 3))
               (add3 4)";
    assert!(matches!(eval(src), Object::Int(7)));
}

#[test]
fn test_dynamic_lambda_uses_caller_scope() {
    let src = "(define x 1)
               (defdyn peek () x)
               (let ((x 5)) (peek))";
    assert!(matches!(eval(src), Object::Int(5)));

    let lexical = "(define x 1)
                   (defun peek () x)
                   (let ((x 5)) (peek))";
    assert!(matches!(eval(lexical), Object::Int(1)));
}

// ============================================================================
// Tail calls
// ============================================================================

#[test]
fn test_deep_tail_recursion() {
    let src = "(define (loop n) (if (= n 0) 0 (loop (- n 1))))
               (loop 1000000)";
    assert!(matches!(eval(src), Object::Int(0)));
}

#[test]
fn test_mutual_tail_recursion_through_cond() {
    let src = "(define (ping n) (cond ((= n 0) 'ping) (else (pong (- n 1)))))
               (define (pong n) (cond ((= n 0) 'pong) (else (ping (- n 1)))))
               (ping 100001)";
    assert_eq!(eval(src).to_string(), "pong");
}

#[test]
fn test_tail_position_through_let_and_begin() {
    let src = "(define (countdown n)
                 (let ((m (- n 1)))
                   (begin
                     (if (= n 0) 'done (countdown m)))))
               (countdown 200000)";
    assert_eq!(eval(src).to_string(), "done");
}

// ============================================================================
// Universal invariants
// ============================================================================

#[test]
fn test_reverse_invariants() {
    assert!(eval("(= (length '(1 2 3)) (length (reverse '(1 2 3))))").is_true());
    assert!(eval("(equal? (reverse (reverse '(1 2 3))) '(1 2 3))").is_true());
}

#[test]
fn test_cons_car_cdr_invariant() {
    assert!(eval("(define p '(1 . 2)) (equal? (cons (car p) (cdr p)) p)").is_true());
}

#[test]
fn test_macro_expansion_deterministic() {
    let mut interp = Interpreter::new().unwrap();
    interp
        .eval_str("(defmacro m (a) `(+ ,a 1))")
        .unwrap();
    let a = interp.eval_str("(macroexpand-0 '(m 5))").unwrap();
    let b = interp.eval_str("(macroexpand-0 '(m 5))").unwrap();
    assert!(a.equal(&b));
    assert_eq!(a.to_string(), "(+ 5 1)");
}

#[test]
fn test_shadowing_does_not_leak() {
    let mut interp = Interpreter::new().unwrap();
    interp.eval_str("(define v 1)").unwrap();
    interp.eval_str("(define (shadow) (let ((v 9)) v))").unwrap();
    assert!(matches!(interp.eval_str("(shadow)"), Ok(Object::Int(9))));
    assert!(matches!(interp.eval_str("v"), Ok(Object::Int(1))));
}

// ============================================================================
// Printed representations
// ============================================================================

#[test]
fn test_printed_representations() {
    assert_eq!(eval("'()").to_string(), "()");
    assert_eq!(eval("'(1 2 . 3)").to_string(), "(1 2 . 3)");
    assert_eq!(eval("(vector 1 2)").to_string(), "(vector 1 2)");
    assert_eq!(eval("(make-undefined)").to_string(), "#<undefined>");
    assert_eq!(eval("car").to_string(), "#<builtin:car>");
    assert_eq!(eval("(lambda (x) x)").to_string(), "#<lambda:lambda>");
    assert_eq!(eval("(define (f x) x) f").to_string(), "#<lambda:f>");
    assert_eq!(eval("\"a\\tb\"").to_string(), "\"a\\tb\"");
    assert!(eval("(current-binding)")
        .to_string()
        .starts_with("#<binding:user/"));
}

#[test]
fn test_quote_family() {
    assert_eq!(eval("'x").to_string(), "x");
    assert_eq!(eval("'(quote x)").to_string(), "(quote x)");
    assert_eq!(eval("''x").to_string(), "(quote x)");
    assert_eq!(eval("`x").to_string(), "x");
}

// ============================================================================
// Isolation
// ============================================================================

#[test]
fn test_failed_form_leaves_environment_usable() {
    let mut interp = Interpreter::new().unwrap();
    interp.eval_str("(define ok 1)").unwrap();
    assert!(interp.eval_str("(car 5)").is_err());
    assert!(matches!(interp.eval_str("ok"), Ok(Object::Int(1))));
}

#[test]
fn test_keywords_self_evaluate() {
    assert_eq!(eval(":key").to_string(), ":key");
    assert!(eval("(keyword? :key)").is_true());
    assert!(eval("(keyword? 'plain)").is_false());
}
