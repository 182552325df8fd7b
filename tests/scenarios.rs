//! End-to-end scenarios: hand-built parse trees run through
//! [`sdl_csg::Interpreter`] against the [`MockKernel`] test double.
//!
//! Each tree is built by hand against the documented `NodeKind` shape
//! contract since this crate has no parser of its own.

mod support;

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use sdl_csg::{EvalResult, IncludeResolver, Interpreter, ParseNode, Value};

use support::build::*;
use support::mock_kernel::MockKernel;

fn no_includes(path: &str) -> EvalResult<Rc<ParseNode>> {
    Err(sdl_csg::EvalAltError::Parse(format!("no includes in tests: {path:?}")))
}

fn measure(v: Option<Value<support::mock_kernel::MockShape>>) -> f64 {
    match v {
        Some(Value::Shape(h)) => h.0.measure,
        other => panic!("expected a shape, got {other:?}"),
    }
}

#[test]
fn centered_cube_volume() {
    let root = input(vec![call_stmt(
        "cube",
        vec![pos_arg(int(2)), kw_arg("center", boolean(true))],
        Child::None,
    )]);
    let interp = Interpreter::new(MockKernel);
    let result = interp.eval_source(&root, &no_includes).unwrap();
    assert!((measure(result) - 8.0).abs() < 1e-9);
}

#[test]
fn difference_of_cube_and_cylinder() {
    // Expected volume is this mock kernel's own arithmetic (cube measure
    // minus the cylinder's full measure), not a real CSG engine's
    // overlap-aware volume -- see the module doc on `MockShape`.
    let root = input(vec![call_stmt(
        "difference",
        vec![],
        Child::Block(vec![
            call_stmt("cube", vec![pos_arg(int(2)), kw_arg("center", boolean(true))], Child::None),
            call_stmt(
                "cylinder",
                vec![kw_arg("h", num(3.0)), kw_arg("r", num(0.5)), kw_arg("center", boolean(true))],
                Child::None,
            ),
        ]),
    )]);
    let interp = Interpreter::new(MockKernel);
    let result = interp.eval_source(&root, &no_includes).unwrap();
    let expected = 8.0 - 3.0 * PI / 3.0 * 0.75;
    assert!((measure(result) - expected).abs() < 1e-9);
}

#[test]
fn ring_module_extruded() {
    let root = input(vec![
        mod_decl(
            "ring",
            &["r"],
            vec![call_stmt(
                "difference",
                vec![],
                Child::Block(vec![
                    call_stmt("circle", vec![pos_arg(ident("r"))], Child::None),
                    call_stmt(
                        "circle",
                        vec![pos_arg(addition(ident("r"), "-", int(1)))],
                        Child::None,
                    ),
                ]),
            )],
        ),
        call_stmt(
            "linear_extrude",
            vec![pos_arg(int(1))],
            Child::Chain(modinst("ring", vec![pos_arg(int(5))], Child::None)),
        ),
    ]);
    let interp = Interpreter::new(MockKernel);
    let result = interp.eval_source(&root, &no_includes).unwrap();
    let expected = PI * (25.0 - 16.0);
    assert!((measure(result) - expected).abs() < 1e-3);
}

#[test]
fn assignment_order_independence() {
    let root = input(vec![
        assignment("a", addition(ident("b"), "+", int(1))),
        assignment("b", int(1)),
        call_stmt("cube", vec![pos_arg(ident("a"))], Child::None),
    ]);
    let interp = Interpreter::new(MockKernel);
    let result = interp.eval_source(&root, &no_includes).unwrap();
    assert!((measure(result) - 8.0).abs() < 1e-9);
}

#[test]
fn for_loop_over_children_in_a_module() {
    let root = input(vec![
        mod_decl(
            "g",
            &[],
            vec![call_stmt(
                "for",
                vec![kw_arg("i", range2(int(0), int(2)))],
                Child::Chain(modinst(
                    "translate",
                    vec![kw_arg("v", vector(vec![multiplication(ident("i"), "*", int(3)), int(0), int(0)]))],
                    Child::Chain(modinst("children", vec![pos_arg(int(0))], Child::None)),
                )),
            )],
        ),
        call_stmt("g", vec![], Child::Chain(modinst("sphere", vec![pos_arg(int(1))], Child::None))),
    ]);
    let interp = Interpreter::new(MockKernel);
    let result = interp.eval_source(&root, &no_includes).unwrap();
    let expected = 3.0 * (4.0 / 3.0 * PI);
    assert!((measure(result) - expected).abs() < 1e-9);
}

#[test]
fn dollar_variable_crosses_module_call_via_caller_chain() {
    let root = input(vec![
        mod_decl(
            "h",
            &[],
            vec![assignment("$x", int(7)), call_stmt("children", vec![], Child::None)],
        ),
        fn_decl("f", &[], ident("$x")),
        call_stmt(
            "h",
            vec![],
            Child::Chain(modinst("echo", vec![pos_arg(fn_call_expr("f", vec![]))], Child::None)),
        ),
    ]);
    let echoed: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&echoed);
    let mut interp = Interpreter::new(MockKernel);
    interp.on_echo(move |s| sink.borrow_mut().push(s.to_string()));
    let _ = interp.eval_source(&root, &no_includes).unwrap();
    assert_eq!(*echoed.borrow(), vec!["7".to_string()]);
}
