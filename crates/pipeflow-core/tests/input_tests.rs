
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pipeflow_core::{InputDef, LoadedValue, ObjectStoreOp, ObjectStoreRecord, OutputDef, PipeType,
                    StepEventKind, StepEventStream, StepOutputHandle};
use serde_json::json;
use test_support::*;

#[test]
fn fan_in_flattens_elementwise_preserving_provenance() {
    let seen = Arc::new(Mutex::new(None));
    let items = vec![LoadedValue::ObjectStore { record: ObjectStoreRecord::get("intermediates/up_a/out"),
                                                value: json!(1) },
                     LoadedValue::Direct(json!(2)),
                     LoadedValue::ObjectStore { record: ObjectStoreRecord::get("intermediates/up_b/out"),
                                                value: json!(3) }];
    let fixture = simple_step("merge",
                              vec![InputDef::new("parts",
                                                 any_type(),
                                                 Box::new(FanInFixtureSource { items }))],
                              vec![OutputDef::nothing("done")],
                              Box::new(CapturingCompute { seen: seen.clone(),
                                                          events: vec![] }));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none(), "unexpected failure: {failure:?}");
    // Un evento por elemento leído del store, cada uno con su procedencia y
    // estampado con el nombre del input
    let reads: Vec<&ObjectStoreRecord> = events.iter()
                                               .filter_map(|e| match &e.kind {
                                                   StepEventKind::ObjectStoreOperation { record }
                                                       if record.op == ObjectStoreOp::GetObject =>
                                                   {
                                                       Some(record)
                                                   }
                                                   _ => None,
                                               })
                                               .collect();
    let keys: Vec<&str> = reads.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["intermediates/up_a/out", "intermediates/up_b/out"]);
    for record in &reads {
        assert_eq!(record.value_name.as_deref(), Some("parts"));
    }
    // El input se liga al array aplanado, en orden
    let captured = seen.lock().unwrap().clone().unwrap();
    assert_eq!(captured.get("parts"), Some(&json!([1, 2, 3])));
}

#[test]
fn nothing_typed_input_is_skipped_entirely() {
    let seen = Arc::new(Mutex::new(None));
    let calls = Arc::new(AtomicUsize::new(0));
    let fixture = simple_step("has_dep",
                              vec![InputDef::new("dep",
                                                 Arc::new(PipeType::nothing()),
                                                 Box::new(CountingSource { calls: calls.clone(),
                                                                           value: json!("never") })),
                                   InputDef::new("data", any_type(), direct(json!(5)))],
                              vec![OutputDef::nothing("done")],
                              Box::new(CapturingCompute { seen: seen.clone(),
                                                          events: vec![] }));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0, "the source of a nothing input must never run");
    let input_names: Vec<&str> = events.iter()
                                       .filter_map(|e| match &e.kind {
                                           StepEventKind::StepInput { input_name, .. } => Some(input_name.as_str()),
                                           _ => None,
                                       })
                                       .collect();
    assert_eq!(input_names, vec!["data"], "no check event for the nothing input");
    let captured = seen.lock().unwrap().clone().unwrap();
    assert!(!captured.contains_key("dep"), "the compute must not receive the nothing input");
    assert_eq!(captured.get("data"), Some(&json!(5)));
}

#[test]
fn store_backed_source_reads_through_the_context_store() {
    let upstream = StepOutputHandle::new("upstream", "out");
    let fixture = simple_step("downstream",
                              vec![InputDef::new("data",
                                                 any_type(),
                                                 Box::new(CtxStoreSource { handle: upstream.clone() }))],
                              vec![OutputDef::nothing("done")],
                              emit(vec![]));
    let ctx = fixture.ctx();
    // Sembrar el intermedio que la fuente va a leer
    ctx.store
       .set(&ctx, &PipeType::any(), &upstream, &json!({"rows": 2}), Some("v7"))
       .unwrap();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(failure.is_none(), "unexpected failure: {failure:?}");
    let read = events.iter()
                     .find_map(|e| match &e.kind {
                         StepEventKind::ObjectStoreOperation { record } if record.op == ObjectStoreOp::GetObject => {
                             Some(record.clone())
                         }
                         _ => None,
                     })
                     .expect("a read record must be reported");
    assert_eq!(read.key, "intermediates/upstream/out");
    assert_eq!(read.value_name.as_deref(), Some("data"));
    assert_eq!(read.version.as_deref(), Some("v7"));
}

#[test]
fn source_failure_aborts_before_any_check() {
    struct BrokenSource;
    impl pipeflow_core::InputSource for BrokenSource {
        fn load(&self,
                _ctx: &pipeflow_core::StepContext<'_>)
                -> Result<pipeflow_core::LoadedInput, pipeflow_core::errors::StepExecutionError> {
            Err(pipeflow_core::errors::StepExecutionError::storage("disk gone"))
        }
    }

    let fixture = simple_step("no_data",
                              vec![InputDef::new("data", any_type(), Box::new(BrokenSource))],
                              vec![OutputDef::new("out", any_type())],
                              emit_outputs(&[("out", json!(1))]));
    let ctx = fixture.ctx();

    let (events, failure) = StepEventStream::new(&ctx, 0).into_events();

    assert!(matches!(failure,
                     Some(pipeflow_core::errors::StepExecutionError::StorageFailure { message }) if message == "disk gone"));
    assert_eq!(kind_names(&events), vec!["StepStarted"]);
}
