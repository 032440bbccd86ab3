
use pipeflow_core::{InputDef, ObjectStoreOp, ObjectStoreRecord, OutputDef, StepEventKind, StepEventStream};
use serde_json::json;
use test_support::*;

#[test]
fn full_stream_order_for_store_backed_outputs() {
    let fixture = simple_step("build_report",
                              vec![InputDef::new("left", any_type(), direct(json!(1))),
                                   InputDef::new("right", any_type(), direct(json!(2)))],
                              vec![OutputDef::new("summary", any_type()), OutputDef::new("detail", any_type())],
                              emit_outputs(&[("summary", json!({"rows": 3})), ("detail", json!([1, 2, 3]))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none(), "unexpected failure: {failure:?}");
    assert_eq!(kind_names(&events),
               vec!["StepStarted",
                    "StepInput",
                    "StepInput",
                    "StepOutput",
                    "ObjectStoreOperation",
                    "StepOutput",
                    "ObjectStoreOperation",
                    "StepSuccess"]);

    // Los checks de inputs respetan el orden de declaración
    assert!(matches!(&events[1].kind, StepEventKind::StepInput { input_name, .. } if input_name == "left"));
    assert!(matches!(&events[2].kind, StepEventKind::StepInput { input_name, .. } if input_name == "right"));
    // Los outputs salen en el orden en que el compute los produjo
    assert!(matches!(&events[3].kind,
                     StepEventKind::StepOutput { handle, check, .. }
                     if handle.output_name == "summary" && check.success));
    assert!(matches!(&events[5].kind,
                     StepEventKind::StepOutput { handle, .. } if handle.output_name == "detail"));
}

#[test]
fn envelope_carries_run_step_and_solid() {
    let fixture = simple_step("load_csv",
                              vec![],
                              vec![OutputDef::new("rows", any_type())],
                              emit_outputs(&[("rows", json!([]))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    for event in &events {
        assert_eq!(event.run_id, fixture.run_id);
        assert_eq!(event.step_key, "load_csv");
        assert_eq!(event.solid, "load_csv");
    }
}

#[test]
fn scenario_load_csv_rows() {
    // Un step con un output requerido sin manager: start, step-output
    // exitoso, operación de object store, success con duración.
    let fixture = simple_step("load_csv",
                              vec![],
                              vec![OutputDef::new("rows", any_type())],
                              emit_outputs(&[("rows", json!([{"a": 1}, {"a": 2}]))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    assert_eq!(kind_names(&events),
               vec!["StepStarted", "StepOutput", "ObjectStoreOperation", "StepSuccess"]);
    assert!(matches!(&events[1].kind,
                     StepEventKind::StepOutput { handle, check, .. }
                     if handle.step_key == "load_csv" && handle.output_name == "rows" && check.success));
    assert!(matches!(&events[2].kind,
                     StepEventKind::ObjectStoreOperation { record }
                     if record.op == ObjectStoreOp::SetObject && record.value_name.as_deref() == Some("rows")));
    assert!(matches!(&events[3].kind, StepEventKind::StepSuccess { .. }));
}

#[test]
fn restarted_attempt_carries_prior_count() {
    let fixture = simple_step("retryable",
                              vec![],
                              vec![OutputDef::new("out", any_type())],
                              emit_outputs(&[("out", json!(1))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 2).into_events();

    assert!(failure.is_none());
    assert!(matches!(events[0].kind, StepEventKind::StepRestarted { prior_attempts: 2 }));
    assert!(!events.iter().any(|e| matches!(e.kind, StepEventKind::StepStarted)),
            "a restarted attempt must not also emit StepStarted");
}

#[test]
fn stream_is_fused_after_terminal_item() {
    let fixture = simple_step("fused",
                              vec![],
                              vec![OutputDef::new("out", any_type())],
                              emit_outputs(&[("out", json!(1))]));
    let ctx = fixture.ctx();

    let mut stream = StepEventStream::new(&ctx, 0);
    while stream.next().is_some() {}
    assert!(stream.next().is_none());
    assert!(stream.next().is_none());
}

#[test]
fn input_store_events_precede_input_checks() {
    let record = ObjectStoreRecord::get("intermediates/upstream/out");
    let fixture = simple_step("consume",
                              vec![InputDef::new("data",
                                                 any_type(),
                                                 Box::new(RecordedSource { record,
                                                                           value: json!(7) }))],
                              vec![OutputDef::new("out", any_type())],
                              emit_outputs(&[("out", json!(7))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    assert_eq!(kind_names(&events),
               vec!["StepStarted",
                    "ObjectStoreOperation",
                    "StepInput",
                    "StepOutput",
                    "ObjectStoreOperation",
                    "StepSuccess"]);
    // El registro de la lectura queda estampado con el nombre del input
    assert!(matches!(&events[1].kind,
                     StepEventKind::ObjectStoreOperation { record }
                     if record.op == ObjectStoreOp::GetObject && record.value_name.as_deref() == Some("data")));
}

#[test]
fn success_duration_is_reported() {
    let fixture = simple_step("timed",
                              vec![],
                              vec![OutputDef::new("out", any_type())],
                              emit_outputs(&[("out", json!(1))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    let last = events.last().unwrap();
    assert!(matches!(last.kind, StepEventKind::StepSuccess { duration_ms } if duration_ms < 60_000));
}
