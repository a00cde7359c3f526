use std::sync::Arc;
use std::thread;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use fsls_project::testing::TestWorkspace;
use fsls_project::DiagnosticKind;
use fsls_project::FileEvent;
use fsls_project::ProjectOptions;

fn ids(order: &[Arc<ProjectOptions>]) -> Vec<&str> {
    order
        .iter()
        .map(|options| options.id().path().as_str())
        .collect()
}

/// `P` compiles `a.fs` and `b.fs`; `Q` compiles `c.fs` and references `P`.
fn p_and_q() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.project("/ws/P/P.fsproj", &["a.fs", "b.fs"], &[]);
    ws.project("/ws/Q/Q.fsproj", &["c.fs"], &["../P/P.fsproj"]);
    ws
}

#[test]
fn owner_of_source_is_its_project() {
    let ws = p_and_q();

    let options = ws
        .find_project_options(Utf8Path::new("/ws/P/b.fs"))
        .unwrap();

    assert_eq!(options.id().path(), Utf8Path::new("/ws/P/P.fsproj"));
    assert_eq!(
        options.sources(),
        &[Utf8PathBuf::from("/ws/P/a.fs"), "/ws/P/b.fs".into()]
    );
    assert_eq!(options.target(), Some(Utf8Path::new("/ws/P/bin/P.dll")));
}

#[test]
fn transitive_deps_lists_dependencies_first() {
    let ws = p_and_q();
    let q = ws.known_projects()[1].clone();

    let order = ws.transitive_deps(&q).unwrap();

    assert_eq!(ids(&order), vec!["/ws/P/P.fsproj", "/ws/Q/Q.fsproj"]);
    assert!(order[1]
        .flags()
        .contains(&"-r:/ws/P/bin/P.dll".to_string()));
}

#[test]
fn referenced_sources_are_visible() {
    let ws = p_and_q();

    assert!(ws.is_visible(Utf8Path::new("/ws/P/a.fs"), Utf8Path::new("/ws/Q/c.fs")));
    assert!(!ws.is_visible(Utf8Path::new("/ws/Q/c.fs"), Utf8Path::new("/ws/P/a.fs")));
}

#[test]
fn editing_dependency_recomputes_dependent() {
    let ws = p_and_q();
    let q = ws.known_projects()[1].clone();
    let before = ws.options(&q).unwrap();
    assert_eq!(ws.cracker().invocations(q.path()), 1);

    ws.apply_event(&FileEvent::Changed("/ws/P/P.fsproj".into()))
        .unwrap();
    assert!(!ws.is_resolved(&q));

    let after = ws.options(&q).unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(ws.cracker().invocations(q.path()), 2);
}

#[test]
fn cascade_is_transitive_but_lazy() {
    let ws = TestWorkspace::new();
    let a = ws.project("/ws/A/A.fsproj", &["a.fs"], &[]);
    let b = ws.project("/ws/B/B.fsproj", &["b.fs"], &["../A/A.fsproj"]);
    let c = ws.project("/ws/C/C.fsproj", &["c.fs"], &["../B/B.fsproj"]);
    let d = ws.project("/ws/D/D.fsproj", &["d.fs"], &["../A/A.fsproj"]);
    ws.options(&c).unwrap();

    ws.update_project_file(&a).unwrap();

    assert!(!ws.is_resolved(&b));
    assert!(!ws.is_resolved(&c));
    assert!(!ws.is_resolved(&d));
    assert_eq!(ws.cracker().invocations(d.path()), 0);
}

#[test]
fn diamond_is_deduplicated() {
    let ws = TestWorkspace::new();
    ws.project("/ws/Base/Base.fsproj", &["base.fs"], &[]);
    ws.project("/ws/L/L.fsproj", &["l.fs"], &["../Base/Base.fsproj"]);
    ws.project("/ws/R/R.fsproj", &["r.fs"], &["../Base/Base.fsproj"]);
    let top = ws.project(
        "/ws/Top/Top.fsproj",
        &["t.fs"],
        &["../L/L.fsproj", "../R/R.fsproj"],
    );

    let order = ws.transitive_deps(&top).unwrap();

    assert_eq!(order.len(), 4);
    assert_eq!(ids(&order)[0], "/ws/Base/Base.fsproj");
    assert_eq!(ids(&order)[3], "/ws/Top/Top.fsproj");
    assert_eq!(ws.cracker().invocations(Utf8Path::new("/ws/Base/Base.fsproj")), 1);
}

#[test]
fn shared_source_prefers_resolved_owner() {
    let ws = TestWorkspace::new();
    let first = ws.project("/ws/A/A.fsproj", &["../shared/s.fs"], &[]);
    let second = ws.project("/ws/B/B.fsproj", &["../shared/s.fs"], &[]);
    ws.options(&second).unwrap();

    let options = ws
        .find_project_options(Utf8Path::new("/ws/shared/s.fs"))
        .unwrap();

    assert_eq!(options.id(), &second);
    assert_eq!(ws.cracker().invocations(first.path()), 0);
}

#[test]
fn script_without_references_is_its_own_project() {
    let ws = TestWorkspace::new();
    let script = ws.script("/ws/build.fsx", "printfn \"building\"");

    let options = ws.options(&script).unwrap();

    assert_eq!(options.sources(), &[Utf8PathBuf::from("/ws/build.fsx")]);
    assert!(options.references().is_empty());
    assert!(!options.has_diagnostics());
    assert_eq!(ws.cracker().total_invocations(), 0);
}

#[test]
fn crack_error_is_one_diagnostic() {
    let ws = TestWorkspace::new();
    let p = ws.failing_project("/ws/P/P.fsproj", &["a.fs"], "The SDK was not found");

    let options = ws.options(&p).unwrap();

    assert!(options.sources().is_empty());
    assert_eq!(options.diagnostics().len(), 1);
    assert_eq!(options.diagnostics()[0].kind(), DiagnosticKind::CrackFailed);
    assert_eq!(options.diagnostics()[0].message(), "The SDK was not found");
}

#[test]
fn concurrent_lookups_crack_once() {
    let ws = Arc::new(p_and_q());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ws = Arc::clone(&ws);
            thread::spawn(move || {
                ws.find_project_options(Utf8Path::new("/ws/Q/c.fs"))
                    .unwrap()
            })
        })
        .collect();
    let results: Vec<Arc<ProjectOptions>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    for options in &results[1..] {
        assert!(Arc::ptr_eq(options, &results[0]));
    }
    assert_eq!(ws.cracker().invocations(Utf8Path::new("/ws/Q/Q.fsproj")), 1);
    assert_eq!(ws.cracker().invocations(Utf8Path::new("/ws/P/P.fsproj")), 1);
}
