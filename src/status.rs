/// Progress of one user-triggered backend action.
///
/// `Failed` is not terminal: invoking the same action again moves back to
/// `Pending`. Nothing retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OpState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl OpState {
    pub fn is_pending(&self) -> bool {
        matches!(self, OpState::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OpState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}
