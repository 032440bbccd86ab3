
use pipeflow_core::errors::StepExecutionError;
use pipeflow_core::{InputDef, IntermediateStore, OutputDef, StepEventKind, StepEventStream, StepOutputHandle,
                    UserEvent};
use serde_json::{json, Value};
use test_support::*;

#[test]
fn undeclared_output_is_invariant_violation_before_persistence() {
    let fixture = simple_step("bad_step",
                              vec![],
                              vec![OutputDef::new("declared", any_type())],
                              emit_outputs(&[("mystery", json!(1))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    match failure {
        Some(StepExecutionError::InvariantViolation { message }) => {
            assert!(message.contains("mystery"), "message should name the output: {message}");
            assert!(message.contains("declared"), "message should list declared outputs: {message}");
        }
        other => panic!("expected InvariantViolation, got {other:?}"),
    }
    // Nada se emitió ni se persistió para el output desconocido
    assert_eq!(kind_names(&events), vec!["StepStarted"]);
    assert!(fixture.store.is_empty());
}

#[test]
fn duplicate_output_is_invariant_violation() {
    let fixture = simple_step("dup_step",
                              vec![],
                              vec![OutputDef::new("out", any_type())],
                              emit_outputs(&[("out", json!(1)), ("out", json!(2))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    match failure {
        Some(StepExecutionError::InvariantViolation { message }) => {
            assert!(message.contains("more than once"), "unexpected message: {message}");
        }
        other => panic!("expected InvariantViolation, got {other:?}"),
    }
    // El primer output sí se finalizó; el segundo no produjo evento
    let output_events = events.iter()
                              .filter(|e| matches!(e.kind, StepEventKind::StepOutput { .. }))
                              .count();
    assert_eq!(output_events, 1);
}

#[test]
fn missing_required_output_fails_naming_step_and_output() {
    let fixture = simple_step("half_done",
                              vec![],
                              vec![OutputDef::new("a", any_type()), OutputDef::new("b", any_type())],
                              emit_outputs(&[("a", json!(1))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert_eq!(failure,
               Some(StepExecutionError::MissingOutput { step_key: "half_done".to_string(),
                                                        output_name: "b".to_string() }));
    // "a" completó su camino antes del fallo
    assert!(events.iter()
                  .any(|e| matches!(&e.kind, StepEventKind::StepOutput { handle, .. } if handle.output_name == "a")));
    assert!(!events.iter().any(|e| matches!(e.kind, StepEventKind::StepSuccess { .. })));
}

#[test]
fn optional_output_is_skipped_silently() {
    let fixture = simple_step("opt_step",
                              vec![],
                              vec![OutputDef::new("a", any_type()),
                                   OutputDef::new("b", any_type()).optional()],
                              emit_outputs(&[("a", json!(1))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    assert!(events.iter().any(|e| matches!(e.kind, StepEventKind::StepSuccess { .. })));
    assert!(!events.iter()
                   .any(|e| matches!(&e.kind, StepEventKind::StepOutput { handle, .. } if handle.output_name == "b")),
            "no event may mention the unproduced optional output");
    assert_eq!(fixture.store.len(), 1, "only \"a\" may be persisted");
}

#[test]
fn unseen_nothing_output_is_synthesized_with_null() {
    let fixture = simple_step("with_dep",
                              vec![],
                              vec![OutputDef::new("a", any_type()), OutputDef::nothing("done")],
                              emit_outputs(&[("a", json!(1))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none(), "unexpected failure: {failure:?}");
    // El output sintetizado fluye por el mismo camino: check + persistencia
    assert!(events.iter().any(|e| matches!(&e.kind,
                     StepEventKind::StepOutput { handle, check, .. }
                     if handle.output_name == "done" && check.success)));
    let handle = StepOutputHandle::new("with_dep", "done");
    let stored = fixture.store.get(&ctx, &handle).unwrap();
    assert!(matches!(stored, Some((Value::Null, _))), "synthesized output must persist a null value");
    assert!(events.iter().any(|e| matches!(e.kind, StepEventKind::StepSuccess { .. })));
}

#[test]
fn produced_nothing_output_is_not_synthesized_again() {
    let fixture = simple_step("explicit_dep",
                              vec![],
                              vec![OutputDef::nothing("done")],
                              emit_outputs(&[("done", json!(null))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    let done_outputs = events.iter()
                             .filter(|e| matches!(&e.kind, StepEventKind::StepOutput { handle, .. } if handle.output_name == "done"))
                             .count();
    assert_eq!(done_outputs, 1);
}

#[test]
fn user_materializations_and_expectations_wrap_directly() {
    let materialization = json!({ "asset_key": "warehouse/users", "description": "nightly load" });
    let expectation = json!({ "success": true, "label": "row_count" });
    let fixture = simple_step("observing",
                              vec![],
                              vec![OutputDef::new("out", any_type())],
                              emit(vec![UserEvent::Materialization(serde_json::from_value(materialization).unwrap()),
                                        UserEvent::ExpectationResult(serde_json::from_value(expectation).unwrap()),
                                        UserEvent::output("out", json!(1))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    assert_eq!(kind_names(&events),
               vec!["StepStarted",
                    "StepMaterialization",
                    "StepExpectationResult",
                    "StepOutput",
                    "ObjectStoreOperation",
                    "StepSuccess"]);
    assert!(matches!(&events[1].kind,
                     StepEventKind::StepMaterialization { materialization }
                     if materialization.asset_key == "warehouse/users"));
    assert!(matches!(&events[2].kind,
                     StepEventKind::StepExpectationResult { result }
                     if result.success && result.label.as_deref() == Some("row_count")));
}

#[test]
fn outputs_with_no_compute_events_still_synthesize_in_declared_order() {
    let fixture = simple_step("all_nothing",
                              vec![],
                              vec![OutputDef::nothing("first"), OutputDef::nothing("second")],
                              emit(vec![]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    let names: Vec<&str> = events.iter()
                                 .filter_map(|e| match &e.kind {
                                     StepEventKind::StepOutput { handle, .. } => Some(handle.output_name.as_str()),
                                     _ => None,
                                 })
                                 .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn synthesis_runs_after_inputs_and_compute() {
    let fixture = simple_step("mixed",
                              vec![InputDef::new("seed", any_type(), direct(json!(5)))],
                              vec![OutputDef::nothing("done")],
                              emit(vec![]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    assert_eq!(kind_names(&events),
               vec!["StepStarted", "StepInput", "StepOutput", "ObjectStoreOperation", "StepSuccess"]);
}
