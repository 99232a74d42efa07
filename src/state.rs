use crate::{
    error::{Result, TryOnError},
    models::{AttemptState, GenerationResult},
};

/// Drives [`AttemptState`] through its legal transitions.
///
/// Idle, Succeeded and Failed may all `begin` a new attempt; only InProgress
/// may `settle`. Anything else is an [`TryOnError::InvalidTransition`].
#[derive(Debug, Default)]
pub struct ResultStateMachine {
    state: AttemptState,
    attempts: u64,
}

impl ResultStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    /// Number of attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn begin(&mut self) -> Result<()> {
        if self.state.is_in_progress() {
            return Err(TryOnError::AttemptInFlight);
        }
        self.state = AttemptState::InProgress;
        self.attempts += 1;
        Ok(())
    }

    pub fn settle(&mut self, result: GenerationResult) -> Result<&AttemptState> {
        if !self.state.is_in_progress() {
            return Err(TryOnError::InvalidTransition {
                from: self.state.name(),
                event: "settle",
            });
        }
        self.state = match result {
            GenerationResult::Success(image) => AttemptState::Succeeded(image),
            GenerationResult::Failure(message) => AttemptState::Failed(message),
        };
        Ok(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeneratedImage;

    fn image() -> GeneratedImage {
        GeneratedImage {
            image_data: "aGk=".into(),
            mime_type: "image/png".into(),
            model: "test".into(),
        }
    }

    #[test]
    fn test_full_cycle_and_reentry() {
        let mut machine = ResultStateMachine::new();
        assert_eq!(machine.state(), &AttemptState::Idle);

        machine.begin().unwrap();
        assert!(machine.state().is_in_progress());
        machine
            .settle(GenerationResult::Failure("nope".into()))
            .unwrap();
        assert_eq!(machine.state().error(), Some("nope"));

        // failed -> in progress drops the old error
        machine.begin().unwrap();
        assert_eq!(machine.state(), &AttemptState::InProgress);
        machine.settle(GenerationResult::Success(image())).unwrap();
        assert_eq!(machine.state().image(), Some(&image()));

        machine.begin().unwrap();
        assert_eq!(machine.state().image(), None);
        assert_eq!(machine.attempts(), 3);
    }

    #[test]
    fn test_begin_while_in_progress_is_refused() {
        let mut machine = ResultStateMachine::new();
        machine.begin().unwrap();
        assert!(matches!(machine.begin(), Err(TryOnError::AttemptInFlight)));
        assert_eq!(machine.attempts(), 1);
    }

    #[test]
    fn test_settle_outside_attempt_is_invalid() {
        let mut machine = ResultStateMachine::new();
        let err = machine
            .settle(GenerationResult::Success(image()))
            .unwrap_err();
        assert!(matches!(
            err,
            TryOnError::InvalidTransition { from: "idle", event: "settle" }
        ));
        assert_eq!(machine.state(), &AttemptState::Idle);
    }
}
