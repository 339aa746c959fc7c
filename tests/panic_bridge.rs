//! Integration tests for raising errors as panics and recovering them.
//!
//! The call chain fn_a -> fn_b -> fn_c sits at fixed lines; the assertions
//! refer to those lines.

use errtrace::{Annotated, Raised, catch, raise, recover_to_error};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

#[derive(Clone, Copy)]
enum Mode {
    Error,
    Panic,
    Fine,
}

fn fn_a(mode: Mode) -> Result<(), Annotated> {
    catch(|| fn_b(mode))
}

fn fn_b(mode: Mode) {
    fn_c(mode);
}

fn fn_c(mode: Mode) {
    match mode {
        Mode::Error => raise!("error in {}", "fnC"),
        Mode::Panic => panic!("panic in fnC"),
        Mode::Fine => {}
    }
}

fn deep(n: u32) {
    if n == 0 {
        raise!("bottom reached");
    }
    deep(n - 1);
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn recovers_raised_error_with_trace() {
    let err = fn_a(Mode::Error).unwrap_err();
    let text = err.to_string();
    assert!(
        text.contains("panic_bridge.rs:27: panic_bridge::fn_c() error in fnC"),
        "got:\n{}",
        text
    );
    assert!(
        text.contains("panic_bridge.rs:18 panic_bridge::fn_a::{{closure}}()"),
        "got:\n{}",
        text
    );
    assert!(
        text.contains("panic_bridge.rs:22 panic_bridge::fn_b()"),
        "got:\n{}",
        text
    );
    assert!(
        text.contains("panic_bridge.rs:27 panic_bridge::fn_c()"),
        "got:\n{}",
        text
    );
}

#[test]
fn trace_is_outer_call_first() {
    let err = fn_a(Mode::Error).unwrap_err();
    let trace: Vec<_> = err.message().lines().collect();
    assert_eq!(trace.len(), 3, "got:\n{}", err);
    assert!(trace.iter().all(|l| l.starts_with("PANIC: ")), "got:\n{}", err);
    assert!(trace[0].contains("fn_a"), "got:\n{}", err);
    assert!(trace[1].contains("fn_b"), "got:\n{}", err);
    assert!(trace[2].contains("fn_c"), "got:\n{}", err);

    // The trace comes first, then the raised error.
    let text = err.to_string();
    let last = text.lines().last().unwrap();
    assert!(last.starts_with("ERROR: "), "got:\n{}", text);
    assert!(last.ends_with("error in fnC"), "got:\n{}", text);
}

#[test]
fn trace_has_one_line_per_frame() {
    for n in [0, 1, 4] {
        let err = catch(|| deep(n)).unwrap_err();
        // deep() appears n + 1 times, plus the closure handed to catch.
        let expected = n as usize + 2;
        assert_eq!(err.message().lines().count(), expected, "got:\n{}", err);
        assert!(err.message().lines().next().unwrap().contains("{{closure}}"));
    }
}

#[test]
fn wrapped_error_is_the_raised_node() {
    let err = fn_a(Mode::Error).unwrap_err();
    let inner = err
        .wrapped()
        .and_then(|e| e.downcast_ref::<Annotated>())
        .expect("trace node wraps the raised error");
    assert!(inner.message().ends_with("error in fnC"));
    assert!(inner.wrapped().is_none());
}

#[test]
fn no_error_without_panic() {
    assert!(fn_a(Mode::Fine).is_ok());
    assert_eq!(catch(|| 40 + 2).unwrap(), 42);
}

// ============================================================================
// Foreign panics
// ============================================================================

#[test]
fn reraises_foreign_panic() {
    let result = panic::catch_unwind(|| fn_a(Mode::Panic));
    let payload = result.expect_err("foreign panic must escape catch()");
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"panic in fnC"));
}

#[test]
fn recover_to_error_reraises_foreign_payload_unchanged() {
    #[derive(Debug, PartialEq)]
    struct Custom(u32);

    let result = panic::catch_unwind(|| {
        recover_to_error(Some(Box::new(Custom(7)) as Box<dyn Any + Send>));
    });
    let payload = result.expect_err("payload must be re-raised");
    assert_eq!(payload.downcast_ref::<Custom>(), Some(&Custom(7)));
}

#[test]
fn recover_to_error_passes_none_through() {
    assert!(recover_to_error(None).is_none());
}

// ============================================================================
// Manual catch_unwind
// ============================================================================

#[test]
fn manual_catch_unwind_payload_converts() {
    let payload = panic::catch_unwind(AssertUnwindSafe(|| fn_b(Mode::Error))).unwrap_err();
    assert!(payload.is::<Raised>());

    let raised = payload.downcast_ref::<Raised>().unwrap();
    assert!(raised.error().message().ends_with("error in fnC"));
    assert!(!raised.frames().is_empty());

    let err = recover_to_error(Some(payload)).unwrap();
    let trace: Vec<_> = err.message().lines().collect();
    assert_eq!(trace.len(), 3, "got:\n{}", err);
    assert!(trace[1].contains("panic_bridge::fn_b()"), "got:\n{}", err);
    assert!(trace[2].contains("panic_bridge::fn_c()"), "got:\n{}", err);
}

#[test]
fn nested_catch_stops_at_innermost_boundary() {
    fn inner() -> Result<(), Annotated> {
        catch(|| fn_c(Mode::Error))
    }

    let outer = catch(inner).unwrap();
    let err = outer.unwrap_err();
    let trace: Vec<_> = err.message().lines().collect();
    assert_eq!(trace.len(), 2, "got:\n{}", err);
    assert!(trace[0].contains("inner::{{closure}}"), "got:\n{}", err);
    assert!(trace[1].contains("fn_c"), "got:\n{}", err);
}
