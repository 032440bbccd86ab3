//! Secuenciador de eventos: orquesta un intento completo de ejecución de un
//! step como un stream perezoso.
//!
//! `StepEventStream` es un iterador pull-based de una sola pasada:
//! - el consumidor tira y la generación avanza de a una transición de fase,
//! - los eventos ya producidos por una transición se drenan antes de avanzar,
//! - un fallo es el último item (`Err`), nunca un evento, salvo que el
//!   evento con el check fallido ya encolado se entrega antes del fallo,
//! - después del item terminal el stream queda fusionado (`None`).
//!
//! Orden garantizado: start/restart → eventos de carga de inputs → checks de
//! inputs → eventos de compute/outputs → success. El timer de duración cubre
//! compute y finalización de outputs (incluidos los sintetizados), no la
//! carga de inputs.
use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use indexmap::IndexMap;
use log::info;
use serde_json::Value;

use crate::cancel::CancelToken;
use crate::engine::boundary::{map_user_error, user_code_boundary};
use crate::engine::inputs::load_input;
use crate::engine::materialize::materialization_events;
use crate::engine::persist::persistence_for;
use crate::engine::typecheck::do_type_check;
use crate::errors::{StepExecutionError, UserCodeScope};
use crate::event::{StepEvent, StepEventKind};
use crate::model::context::StepContext;
use crate::model::handle::StepOutputHandle;
use crate::model::step::{OutputKind, UserEventIter};
use crate::model::values::{TypeCheck, TypeCheckData, UserEvent};

#[derive(Debug, Clone, Copy)]
enum Phase {
    Start,
    LoadInput(usize),
    CheckInput(usize),
    Compute,
    Drain,
    Synthesize(usize),
    Success,
    Done,
}

/// Stream de eventos de un intento de ejecución de un step.
pub struct StepEventStream<'a> {
    ctx: &'a StepContext<'a>,
    solid: String,
    prior_attempts: u32,
    cancel: Option<CancelToken>,
    phase: Phase,
    pending: VecDeque<StepEvent>,
    deferred: Option<StepExecutionError>,
    inputs: IndexMap<String, Value>,
    user_events: Option<UserEventIter>,
    seen_outputs: HashSet<String>,
    started_at: Option<Instant>,
}

impl<'a> StepEventStream<'a> {
    pub fn new(ctx: &'a StepContext<'a>, prior_attempts: u32) -> Self {
        Self { solid: ctx.solid_path(),
               ctx,
               prior_attempts,
               cancel: None,
               phase: Phase::Start,
               pending: VecDeque::new(),
               deferred: None,
               inputs: IndexMap::new(),
               user_events: None,
               seen_outputs: HashSet::new(),
               started_at: None }
    }

    /// Registra el token que el stream observa entre producciones de
    /// eventos de usuario.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Consume el stream completo y separa eventos de fallo terminal.
    pub fn into_events(self) -> (Vec<StepEvent>, Option<StepExecutionError>) {
        let mut events = Vec::new();
        let mut failure = None;
        for item in self {
            match item {
                Ok(event) => events.push(event),
                Err(err) => failure = Some(err),
            }
        }
        (events, failure)
    }

    fn push(&mut self, kind: StepEventKind) {
        let event = StepEvent::now(self.ctx.run_id, self.ctx.step.key.clone(), self.solid.clone(), kind);
        self.pending.push_back(event);
    }

    /// Una transición de la máquina de fases. Puede encolar varios eventos;
    /// un `Err` es el fallo terminal del stream.
    fn advance(&mut self) -> Result<(), StepExecutionError> {
        let ctx = self.ctx;
        match self.phase {
            Phase::Start => {
                let kind = if self.prior_attempts > 0 {
                    StepEventKind::StepRestarted { prior_attempts: self.prior_attempts }
                } else {
                    StepEventKind::StepStarted
                };
                self.push(kind);
                self.phase = Phase::LoadInput(0);
            }
            Phase::LoadInput(index) => match ctx.step.inputs.get(index) {
                None => self.phase = Phase::CheckInput(0),
                // Los inputs "nothing" sólo expresan dependencia: ni valor,
                // ni eventos, ni check.
                Some(def) if def.pipe_type.is_nothing() => self.phase = Phase::LoadInput(index + 1),
                Some(def) => {
                    let resolved = load_input(ctx, def)?;
                    for kind in resolved.kinds {
                        self.push(kind);
                    }
                    self.inputs.insert(def.name.clone(), resolved.value);
                    self.phase = Phase::LoadInput(index + 1);
                }
            },
            Phase::CheckInput(index) => {
                let Some((name, value)) = self.inputs.get_index(index) else {
                    self.phase = Phase::Compute;
                    return Ok(());
                };
                let def = ctx.step
                             .input_def(name)
                             .ok_or_else(|| StepExecutionError::invariant(format!("resolved input \"{name}\" has no declaration in step \"{}\"", ctx.step.key)))?;
                let check = do_type_check(ctx, &def.pipe_type, value)?;
                let failure = check_failure(&check, || {
                    format!("input \"{name}\" of step \"{}\" failed type check for \"{}\"",
                            ctx.step.key,
                            def.pipe_type.name())
                });
                let kind = StepEventKind::StepInput { input_name: name.clone(),
                                                      check: TypeCheckData::from_check(def.pipe_type.name(), check) };
                self.push(kind);
                if let Some(err) = failure {
                    self.deferred = Some(err);
                } else {
                    self.phase = Phase::CheckInput(index + 1);
                }
            }
            Phase::Compute => {
                self.started_at = Some(Instant::now());
                let inputs = self.inputs.clone();
                let iter: UserEventIter = user_code_boundary(ctx,
                                                             UserCodeScope::Compute,
                                                             || format!("compute function of step \"{}\"", ctx.step.key),
                                                             || ctx.step.compute.execute(ctx, inputs))?;
                self.user_events = Some(iter);
                self.phase = Phase::Drain;
            }
            Phase::Drain => {
                if let Some(token) = &self.cancel {
                    if token.is_cancelled() {
                        return Err(StepExecutionError::Interrupted);
                    }
                }
                let item = self.user_events.as_mut().and_then(|iter| iter.next());
                match item {
                    None => self.phase = Phase::Synthesize(0),
                    Some(Err(err)) => {
                        return Err(map_user_error(ctx,
                                                  UserCodeScope::Compute,
                                                  || format!("user event sequence of step \"{}\"", ctx.step.key),
                                                  err));
                    }
                    Some(Ok(UserEvent::Materialization(materialization))) => {
                        self.push(StepEventKind::StepMaterialization { materialization });
                    }
                    Some(Ok(UserEvent::ExpectationResult(result))) => {
                        self.push(StepEventKind::StepExpectationResult { result });
                    }
                    Some(Ok(UserEvent::Output { output_name, value })) => {
                        self.check_output_declaration(&output_name)?;
                        self.finalize_output(&output_name, &value)?;
                    }
                }
            }
            Phase::Synthesize(index) => match ctx.step.outputs.get(index) {
                None => self.phase = Phase::Success,
                Some(def) => {
                    self.phase = Phase::Synthesize(index + 1);
                    if !self.seen_outputs.contains(&def.name) {
                        match def.kind {
                            OutputKind::Optional => {}
                            OutputKind::NothingTyped => {
                                info!("step \"{}\" finished without nothing-typed output \"{}\", emitting implicit null output",
                                      ctx.step.key,
                                      def.name);
                                let name = def.name.clone();
                                self.seen_outputs.insert(name.clone());
                                self.finalize_output(&name, &Value::Null)?;
                            }
                            OutputKind::Required => {
                                return Err(StepExecutionError::MissingOutput { step_key: ctx.step.key.clone(),
                                                                               output_name: def.name.clone() });
                            }
                        }
                    }
                }
            },
            Phase::Success => {
                let duration_ms = self.started_at
                                      .map(|t| t.elapsed().as_millis() as u64)
                                      .unwrap_or_default();
                self.push(StepEventKind::StepSuccess { duration_ms });
                self.phase = Phase::Done;
            }
            Phase::Done => {}
        }
        Ok(())
    }

    /// Valida nombre declarado y unicidad antes de finalizar; registra el
    /// output como visto.
    fn check_output_declaration(&mut self, output_name: &str) -> Result<(), StepExecutionError> {
        let ctx = self.ctx;
        if ctx.step.output_def(output_name).is_none() {
            return Err(StepExecutionError::invariant(format!(
                "compute for step \"{}\" produced an output \"{output_name}\" that is not declared; declared outputs: {:?}",
                ctx.step.key,
                ctx.step.output_names()
            )));
        }
        if !self.seen_outputs.insert(output_name.to_string()) {
            return Err(StepExecutionError::invariant(format!(
                "compute for step \"{}\" produced output \"{output_name}\" more than once",
                ctx.step.key
            )));
        }
        Ok(())
    }

    /// Finaliza un output: check de tipo (evento siempre emitido),
    /// persistencia por la estrategia configurada y materializaciones de la
    /// run config, en ese orden.
    fn finalize_output(&mut self, output_name: &str, value: &Value) -> Result<(), StepExecutionError> {
        let ctx = self.ctx;
        let def = ctx.step
                     .output_def(output_name)
                     .ok_or_else(|| StepExecutionError::invariant(format!("finalizing undeclared output \"{output_name}\"")))?;
        let handle = StepOutputHandle::new(ctx.step.key.clone(), output_name);
        let version = ctx.version_for(output_name);

        let check = do_type_check(ctx, &def.pipe_type, value)?;
        let failure = check_failure(&check, || {
            format!("output \"{output_name}\" of step \"{}\" failed type check for \"{}\"",
                    ctx.step.key,
                    def.pipe_type.name())
        });
        self.push(StepEventKind::StepOutput { handle: handle.clone(),
                                              check: TypeCheckData::from_check(def.pipe_type.name(), check),
                                              version: version.map(str::to_string) });
        if let Some(err) = failure {
            self.deferred = Some(err);
            return Ok(());
        }

        for kind in persistence_for(def).persist(ctx, def, &handle, value, version)? {
            self.push(kind);
        }
        for kind in materialization_events(ctx, def, value)? {
            self.push(kind);
        }
        Ok(())
    }
}

fn check_failure(check: &TypeCheck, default_description: impl FnOnce() -> String) -> Option<StepExecutionError> {
    if check.success {
        return None;
    }
    Some(StepExecutionError::TypeCheckFailed { description: check.description
                                                                 .clone()
                                                                 .unwrap_or_else(default_description),
                                               metadata_entries: check.metadata_entries.clone() })
}

impl Iterator for StepEventStream<'_> {
    type Item = Result<StepEvent, StepExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if let Some(err) = self.deferred.take() {
                self.phase = Phase::Done;
                return Some(Err(err));
            }
            if matches!(self.phase, Phase::Done) {
                return None;
            }
            if let Err(err) = self.advance() {
                self.phase = Phase::Done;
                return Some(Err(err));
            }
        }
    }
}
