//! Token de cancelación cooperativa.
//!
//! El executor externo clona el token, lo entrega al stream y puede
//! cancelarlo desde otro hilo. El secuenciador lo observa entre producciones
//! de eventos de usuario; una cancelación observada termina el stream con
//! `StepExecutionError::Interrupted` después de drenar lo ya encolado.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
