//! Chain search and interaction with thiserror and anyhow.

use errtrace::{Annotated, ResultExt, annotate, catch, extract_as, find, matches, raise, reason};
use std::error::Error;
use std::io;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
struct MyError(&'static str);

#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("http status {code}")]
struct Status {
    code: u16,
}

/// Compares by kind only, ignoring the detail string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {detail}")]
struct Kinded {
    kind: &'static str,
    detail: String,
}

impl PartialEq for Kinded {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, thiserror::Error)]
enum ServiceError {
    #[error("backend failed")]
    Backend(#[source] Annotated),
}

// ============================================================================
// matches / extract_as
// ============================================================================

#[test]
fn matches_wrapped_error() {
    let err = MyError("mine");
    let annotated = annotate!(Some(err.clone()), "annotated").unwrap();
    assert!(matches(&annotated, &err));
    assert!(!matches(&annotated, &MyError("other")));
}

#[test]
fn matches_the_error_itself() {
    let err = MyError("self");
    assert!(matches(&err, &MyError("self")));
}

#[test]
fn matches_uses_custom_equality() {
    let err = Kinded {
        kind: "timeout",
        detail: "after 30s".into(),
    };
    let annotated = annotate!(Some(err), "calling upstream").unwrap();
    let probe = Kinded {
        kind: "timeout",
        detail: String::new(),
    };
    assert!(matches(&annotated, &probe));
}

#[test]
fn extract_as_through_two_layers() {
    let first = annotate!(Some(Status { code: 503 }), "fetching").unwrap();
    let second = annotate!(Some(first), "syncing").unwrap();

    let mut status = Status::default();
    assert!(extract_as(&second, &mut status));
    assert_eq!(status, Status { code: 503 });
}

#[test]
fn extract_as_leaves_slot_untouched_when_absent() {
    let err = annotate!(Some(MyError("x")), "outer").unwrap();
    let mut status = Status { code: 1 };
    assert!(!extract_as(&err, &mut status));
    assert_eq!(status.code, 1);
}

#[test]
fn find_returns_first_annotated_layer() {
    let inner = reason!("inner");
    let outer = annotate!(Some(inner), "outer").unwrap();
    let found = find::<Annotated>(&outer).unwrap();
    assert!(found.message().ends_with("outer"));
}

#[test]
fn search_sees_through_panic_trace() {
    fn failing() -> Result<(), Annotated> {
        Err(annotate!(Some(Status { code: 404 }), "lookup").unwrap())
    }

    fn raising() {
        if let Err(e) = failing() {
            raise!("giving up: {}", e.message());
        }
    }

    let err = catch(raising).unwrap_err();
    assert!(err.message().starts_with("PANIC: "), "got:\n{}", err);

    // The raised node does not wrap the lookup error, only its message.
    let mut status = Status::default();
    assert!(!extract_as(&err, &mut status));

    // A raised node is still found beneath the trace node.
    let raised = find::<Annotated>(err.source().unwrap()).unwrap();
    assert!(raised.message().contains("giving up"));
}

#[test]
fn search_through_trace_then_annotation() {
    fn raising() {
        raise!("broken pipe");
    }

    let recovered = catch(raising).unwrap_err();
    let outer = annotate!(Some(recovered), "flushing").unwrap();
    assert_eq!(outer.depth(), 3);
    assert_eq!(outer.chain().count(), 3);
    let root = outer.chain().last().unwrap();
    assert!(root.to_string().ends_with("broken pipe"));
}

#[test]
fn chain_walks_into_foreign_sources() {
    let service = ServiceError::Backend(reason!("db down"));
    let err = annotate!(Some(service), "serving").unwrap();
    // serving -> ServiceError -> db down
    assert_eq!(err.chain().count(), 3);
    assert!(find::<ServiceError>(&err).is_some());
}

// ============================================================================
// thiserror / anyhow
// ============================================================================

#[test]
fn thiserror_source_exposes_annotation() {
    let err = ServiceError::Backend(reason!("db down"));
    let source = err.source().unwrap();
    assert!(source.to_string().ends_with("db down"));
    assert!(source.is::<Annotated>());
}

#[test]
fn io_errors_annotate_via_result_ext() {
    fn open() -> Result<(), io::Error> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    let err = open().annotate("opening config").unwrap_err();
    let io_err = find::<io::Error>(&err).unwrap();
    assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
}

#[test]
fn converts_into_anyhow() {
    fn run() -> anyhow::Result<()> {
        Err(reason!("cannot start").into())
    }

    let err = run().unwrap_err();
    assert!(err.to_string().ends_with("cannot start"));
    assert!(err.downcast_ref::<Annotated>().is_some());
}

#[test]
fn anyhow_chain_sees_wrapped_layers() {
    let inner = MyError("root cause");
    let annotated = annotate!(Some(inner), "outer").unwrap();
    let any = anyhow::Error::new(annotated);
    assert_eq!(any.chain().count(), 2);
    assert_eq!(any.root_cause().to_string(), "root cause");
}

#[test]
fn annotation_layers_found_by_message_not_equality() {
    // Annotated has no PartialEq; look the layer up and check its message.
    let inner = reason!("disk full");
    let outer = annotate!(Some(inner), "saving").unwrap();
    let found = outer
        .chain()
        .filter_map(|e| e.downcast_ref::<Annotated>())
        .find(|a| a.message().ends_with("disk full"));
    assert!(found.is_some());
    assert!(!matches(&outer, &MyError("absent")));
}
