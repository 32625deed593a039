/// Lifecycle of a generation request as seen by the display layer.
///
/// Any settled status may start a new request (`Loading`); a pending request
/// settles into `Success` or `Error`; every status can be reset to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppStatus {
    #[default]
    Idle,
    /// A request is in flight; the generate control is disabled
    Loading,
    Success,
    Error,
}

impl AppStatus {
    /// Validates whether a transition to the new status is allowed
    pub fn can_transition_to(&self, new_status: AppStatus) -> bool {
        match (self, new_status) {
            // A request can only start when none is pending
            (AppStatus::Loading, AppStatus::Loading) => false,
            (_, AppStatus::Loading) => true,

            // A pending request settles one way or the other
            (AppStatus::Loading, AppStatus::Success | AppStatus::Error) => true,

            // Resets are always allowed
            (_, AppStatus::Idle) => true,

            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AppStatus::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_requests_settle() {
        assert!(AppStatus::Idle.can_transition_to(AppStatus::Loading));
        assert!(AppStatus::Loading.can_transition_to(AppStatus::Success));
        assert!(AppStatus::Loading.can_transition_to(AppStatus::Error));
        assert!(!AppStatus::Idle.can_transition_to(AppStatus::Success));
        assert!(!AppStatus::Loading.can_transition_to(AppStatus::Loading));
        assert!(AppStatus::Error.can_transition_to(AppStatus::Loading));
    }
}
