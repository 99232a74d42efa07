use crate::{
    config::GeminiConfig,
    encoder::RawImage,
    error::{Result, TryOnError},
    gemini::{GenerationRequest, TryOnClient},
    models::{AttemptState, EncodedImage, GenerationResult},
    slot::{SlotKind, UploadSlot},
    state::ResultStateMachine,
    status::StatusTicker,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

pub const VALIDATION_MESSAGE: &str = "Please upload both your photo and a dress photo.";

/// Failure recorded when an `invoke` future is dropped before it settles.
pub const CANCELLED_MESSAGE: &str = "Failed to generate image: the attempt was cancelled.";

struct Inner {
    subject: UploadSlot,
    garment: UploadSlot,
    machine: ResultStateMachine,
}

/// Owns both upload slots and the attempt state, and drives the
/// generation client.
///
/// At most one attempt is in flight: `invoke` while InProgress is refused
/// with [`TryOnError::AttemptInFlight`] and makes no outbound call.
/// Presentation code observes progress through [`Orchestrator::subscribe`]
/// and [`Orchestrator::status_messages`].
pub struct Orchestrator {
    client: TryOnClient,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<AttemptState>,
    status_tx: Arc<watch::Sender<Option<String>>>,
    status_interval: Duration,
}

impl Orchestrator {
    pub fn new(client: TryOnClient, status_interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(AttemptState::Idle);
        let (status_tx, _) = watch::channel(None);
        Self {
            client,
            inner: Mutex::new(Inner {
                subject: UploadSlot::new(SlotKind::Subject),
                garment: UploadSlot::new(SlotKind::Garment),
                machine: ResultStateMachine::new(),
            }),
            state_tx,
            status_tx: Arc::new(status_tx),
            status_interval,
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let client = TryOnClient::new(config)?;
        Ok(Self::new(client, config.status_interval))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn set_subject_image(&self, raw: RawImage) -> Result<EncodedImage> {
        self.set_image(SlotKind::Subject, raw).await
    }

    pub async fn set_garment_image(&self, raw: RawImage) -> Result<EncodedImage> {
        self.set_image(SlotKind::Garment, raw).await
    }

    async fn set_image(&self, kind: SlotKind, raw: RawImage) -> Result<EncodedImage> {
        // Encode outside the lock; only the store is serialized.
        let image = crate::encoder::encode(raw).await.map_err(|e| {
            log::error!("Error processing {} image: {}", kind, e);
            e
        })?;

        let mut inner = self.lock();
        let slot = match kind {
            SlotKind::Subject => &mut inner.subject,
            SlotKind::Garment => &mut inner.garment,
        };
        Ok(slot.store(image).clone())
    }

    pub fn image(&self, kind: SlotKind) -> Option<EncodedImage> {
        let inner = self.lock();
        match kind {
            SlotKind::Subject => inner.subject.current().cloned(),
            SlotKind::Garment => inner.garment.current().cloned(),
        }
    }

    pub fn state(&self) -> AttemptState {
        self.lock().machine.state().clone()
    }

    pub fn attempts(&self) -> u64 {
        self.lock().machine.attempts()
    }

    /// True iff both slots are filled and no attempt is running.
    pub fn can_invoke(&self) -> bool {
        let inner = self.lock();
        inner.subject.is_filled()
            && inner.garment.is_filled()
            && !inner.machine.state().is_in_progress()
    }

    pub fn subscribe(&self) -> watch::Receiver<AttemptState> {
        self.state_tx.subscribe()
    }

    pub fn status_messages(&self) -> watch::Receiver<Option<String>> {
        self.status_tx.subscribe()
    }

    /// Runs one generation attempt to completion and returns the settled
    /// state. A failed generation is `Ok(AttemptState::Failed(..))`; `Err` is
    /// reserved for refusals that leave the state untouched.
    pub async fn invoke(&self) -> Result<AttemptState> {
        let attempt_id = Uuid::new_v4();

        let request = {
            let mut inner = self.lock();
            if inner.machine.state().is_in_progress() {
                log::warn!("Ignoring invoke: an attempt is already in progress");
                return Err(TryOnError::AttemptInFlight);
            }
            let request = match (inner.subject.current(), inner.garment.current()) {
                (Some(subject), Some(garment)) => {
                    GenerationRequest::new(subject.clone(), garment.clone())
                }
                _ => {
                    log::warn!("Ignoring invoke: {}", VALIDATION_MESSAGE);
                    return Err(TryOnError::Validation(VALIDATION_MESSAGE.to_string()));
                }
            };
            inner.machine.begin()?;
            self.state_tx.send_replace(AttemptState::InProgress);
            request
        };

        log::info!("🎨 [attempt {}] Styling in progress...", attempt_id);
        let guard = AttemptGuard {
            orchestrator: self,
            attempt_id,
            settled: false,
        };
        let ticker = StatusTicker::start(Arc::clone(&self.status_tx), self.status_interval);

        let result = GenerationResult::from(self.client.generate_request(&request).await);
        ticker.stop();

        guard.settle(result)
    }

    fn settle(&self, attempt_id: Uuid, result: GenerationResult) -> Result<AttemptState> {
        let state = self.lock().machine.settle(result)?.clone();
        match &state {
            AttemptState::Succeeded(_) => log::info!("✅ [attempt {}] succeeded", attempt_id),
            AttemptState::Failed(message) => {
                log::error!("❌ [attempt {}] failed: {}", attempt_id, message)
            }
            _ => {}
        }
        self.state_tx.send_replace(state.clone());
        Ok(state)
    }
}

/// Lives across the outbound call. If the `invoke` future is dropped first,
/// the attempt is settled as failed so the orchestrator accepts new attempts.
struct AttemptGuard<'a> {
    orchestrator: &'a Orchestrator,
    attempt_id: Uuid,
    settled: bool,
}

impl AttemptGuard<'_> {
    fn settle(mut self, result: GenerationResult) -> Result<AttemptState> {
        self.settled = true;
        self.orchestrator.settle(self.attempt_id, result)
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        log::warn!("[attempt {}] dropped before completion", self.attempt_id);
        let failure = GenerationResult::Failure(CANCELLED_MESSAGE.to_string());
        if let Err(e) = self.orchestrator.settle(self.attempt_id, failure) {
            log::error!("[attempt {}] could not settle: {}", self.attempt_id, e);
        }
    }
}
