use crate::PreviewMetadata;

/// What a preview host can observe about the current target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PreviewState {
    /// No target set.
    #[default]
    Idle,
    /// A lookup for the current target is in flight.
    Loading,
    Ready(PreviewMetadata),
    /// The lookup failed. Error detail is logged, not exposed.
    Failed,
}

impl PreviewState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PreviewState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PreviewState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PreviewState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PreviewState::Failed)
    }

    pub fn metadata(&self) -> Option<&PreviewMetadata> {
        match self {
            PreviewState::Ready(metadata) => Some(metadata),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PreviewState::Idle => "idle",
            PreviewState::Loading => "loading",
            PreviewState::Ready(_) => "ready",
            PreviewState::Failed => "failed",
        }
    }
}
