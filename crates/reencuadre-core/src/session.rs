//! One user's reframe session: validation, generation, rendering and the
//! history save, with at most one generation in flight.

use crate::composer::compose_result;
use crate::error::SessionError;
use crate::history::HistoryStore;
use crate::input::{SessionDraft, SessionInput};
use crate::prompt::build_instruction_prompt;
use crate::reframe::derive_bundle;
use crate::render::RenderTree;
use crate::traits::Engine;
use crate::types::{GeneratedOutput, Request};
use anyhow::Context;
use log::{debug, error, info};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const FLOW_NAME: &str = "reencuadre";

#[derive(Clone)]
pub enum Generator {
    /// Local templates, no network.
    Simulated,
    Remote(Arc<dyn Engine>),
}

pub struct Generation {
    pub input: SessionInput,
    pub output: GeneratedOutput,
    pub rendered: RenderTree,
    /// Pending history save, if a store is attached.
    pub save: Option<JoinHandle<()>>,
}

pub struct ReframeSession {
    generator: Generator,
    history: Option<Arc<dyn HistoryStore>>,
    owner_id: String,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ReframeSession {
    pub fn new(generator: Generator, owner_id: impl Into<String>) -> Self {
        Self {
            generator,
            history: None,
            owner_id: owner_id.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_history(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(store);
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn generate(&self, draft: &SessionDraft) -> Result<Generation, SessionError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Rejecting generate: another request is in flight");
            return Err(SessionError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let input = draft.validate()?;
        let output = self.produce(&input).await?;
        let rendered = output.render();
        let save = self.spawn_save(&input, &output);

        Ok(Generation {
            input,
            output,
            rendered,
            save,
        })
    }

    async fn produce(&self, input: &SessionInput) -> anyhow::Result<GeneratedOutput> {
        match &self.generator {
            Generator::Simulated => {
                let bundle =
                    derive_bundle(&input.selected_emotions, input.timeframe, input.frequency);
                Ok(GeneratedOutput::Composed(compose_result(input, &bundle)))
            }
            Generator::Remote(engine) => {
                let request = Request {
                    flowname: FLOW_NAME.to_string(),
                    payload: build_instruction_prompt(input),
                };
                info!("Requesting reframe from {}", engine.name());
                let response = Pin::from(engine.execute(&request))
                    .await
                    .with_context(|| format!("{} request failed", engine.name()))?;
                Ok(GeneratedOutput::FreeText(response.content))
            }
        }
    }

    fn spawn_save(&self, input: &SessionInput, output: &GeneratedOutput) -> Option<JoinHandle<()>> {
        let store = Arc::clone(self.history.as_ref()?);
        let owner_id = self.owner_id.clone();
        let input = input.clone();
        let output = output.clone();
        Some(tokio::spawn(async move {
            match store.append(&owner_id, &input, &output).await {
                Ok(record) => debug!("Saved reframe {} for {}", record.id, owner_id),
                Err(e) => error!("Failed to save reframe to history: {:#}", e),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::history::{HistoryRecord, HistorySubscription};
    use crate::input::{Frequency, Timeframe};
    use crate::types::{Response, Usage};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::future::Future;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::{watch, Notify};

    struct GatedEngine {
        calls: AtomicUsize,
        gate: Notify,
    }

    impl GatedEngine {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: Notify::new(),
            }
        }
    }

    impl Engine for GatedEngine {
        fn name(&self) -> &str {
            "gated"
        }

        fn execute<'a>(
            &'a self,
            request: &'a Request,
        ) -> Box<dyn Future<Output = Result<Response>> + Send + 'a> {
            Box::new(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.gate.notified().await;
                Ok(Response {
                    content: format!("eco: {}", request.payload.len()),
                    usage: Usage::default(),
                    model: "gated".into(),
                    finish_reason: Some("stop".into()),
                })
            })
        }

        fn extract_content(&self, _value: &Value) -> Option<String> {
            None
        }
    }

    struct FailingEngine;

    impl Engine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        fn execute<'a>(
            &'a self,
            _request: &'a Request,
        ) -> Box<dyn Future<Output = Result<Response>> + Send + 'a> {
            Box::new(async { Err::<Response, _>(anyhow!("upstream unavailable")) })
        }

        fn extract_content(&self, _value: &Value) -> Option<String> {
            None
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        records: Mutex<Vec<HistoryRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl HistoryStore for RecordingStore {
        async fn append(
            &self,
            owner_id: &str,
            input: &SessionInput,
            output: &GeneratedOutput,
        ) -> Result<HistoryRecord> {
            if self.fail {
                return Err(anyhow!("disk full"));
            }
            let record = HistoryRecord::new(owner_id, input, output);
            self.records.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn list(&self, _owner_id: &str) -> Result<Vec<HistoryRecord>> {
            Ok(self.records.lock().unwrap().clone())
        }

        async fn subscribe(&self, _owner_id: &str) -> Result<HistorySubscription> {
            let (_tx, rx) = watch::channel(Vec::new());
            Ok(HistorySubscription::new(rx))
        }
    }

    fn draft() -> SessionDraft {
        let mut draft = SessionDraft {
            situation: "Me despidieron".into(),
            timeframe: Some(Timeframe::Current),
            frequency: Some(Frequency::Repetitive),
            ..Default::default()
        };
        draft.toggle_emotion("Miedo");
        draft.select_object("Piedra");
        draft
    }

    #[test]
    fn simulated_generation_composes_and_renders() {
        let session = ReframeSession::new(Generator::Simulated, "u1");
        let generation = tokio_test::block_on(session.generate(&draft())).unwrap();
        assert!(matches!(generation.output, GeneratedOutput::Composed(_)));
        assert_eq!(generation.rendered.sections.len(), 3);
        assert!(generation.save.is_none());
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_engine() {
        let engine = Arc::new(GatedEngine::new());
        let session = ReframeSession::new(Generator::Remote(engine.clone()), "u1");
        let mut incomplete = draft();
        incomplete.frequency = None;

        let err = session.generate(&incomplete).await.err().unwrap();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::MissingFrequency)
        ));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn second_request_is_rejected_while_first_is_in_flight() {
        let engine = Arc::new(GatedEngine::new());
        let session = Arc::new(ReframeSession::new(
            Generator::Remote(engine.clone()),
            "u1",
        ));

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                let draft = draft();
                session.generate(&draft).await
            })
        };
        while engine.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(session.is_generating());

        let second = session.generate(&draft()).await;
        assert!(matches!(second, Err(SessionError::Busy)));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);

        engine.gate.notify_one();
        let generation = first.await.unwrap().unwrap();
        assert!(matches!(generation.output, GeneratedOutput::FreeText(_)));
        assert!(generation.rendered.sections.is_empty());
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn engine_failure_is_reported_and_releases_the_guard() {
        let session = ReframeSession::new(Generator::Remote(Arc::new(FailingEngine)), "u1");
        let err = session.generate(&draft()).await.err().unwrap();
        assert!(err.to_string().starts_with("Error al generar el reencuadre:"));
        assert!(!session.is_generating());
        assert!(session.generate(&draft()).await.is_err());
    }

    #[tokio::test]
    async fn successful_generation_is_saved_for_the_owner() {
        let store = Arc::new(RecordingStore::default());
        let session = ReframeSession::new(Generator::Simulated, "owner-7").with_history(store.clone());
        let generation = session.generate(&draft()).await.unwrap();
        generation.save.unwrap().await.unwrap();

        let records = store.list("owner-7").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner_id, "owner-7");
        assert_eq!(records[0].input, generation.input);
    }

    #[tokio::test]
    async fn save_failure_does_not_fail_generation() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let session = ReframeSession::new(Generator::Simulated, "u1").with_history(store.clone());
        let generation = session.generate(&draft()).await.unwrap();
        generation.save.unwrap().await.unwrap();
        assert!(store.records.lock().unwrap().is_empty());
    }
}
