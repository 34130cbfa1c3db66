use crate::models::error::PipelineError;
use crate::models::state::PipelineState;

/// Event delegate for pipeline notifications.
///
/// Methods are called from the control thread or the cycle thread, never
/// from a platform audio callback. Implementations should marshal to the
/// UI thread if needed and must not block.
pub trait PipelineDelegate: Send + Sync {
    /// Called on every state transition.
    fn on_state_changed(&self, state: &PipelineState);

    /// Called when the cycle aborts on a fatal error, before the matching
    /// `on_state_changed(Idle)`.
    fn on_error(&self, error: &PipelineError);
}
