//! Scan screen lifecycle as a pure state machine
//!
//! ```text
//! AwaitingPermission ──granted──▶ Scanning ──decoded / failed──▶ Reporting ──▶ Terminated
//!         │                                                          ▲
//!         └──────────────denied / camera failure────────────────────┘
//! ```
//!
//! Host callbacks and analyzer results become [`ScreenEvent`]s, the machine
//! answers with the [`ScreenEffect`]s the screen has to carry out. Events that
//! make no sense in the current state are ignored.

use derive_more::Display;
use tracing::debug;

use crate::{
    outcome::{ScanErrorReason, ScanOutcome},
    permission::{Permission, missing_permissions},
};

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Display, uniffi::Enum)]
pub enum ScanScreenState {
    AwaitingPermission,
    Scanning,
    Reporting,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    /// Screen shown, with the permissions the host already holds
    Created { granted: Vec<Permission> },
    /// Answer to a permission request
    PermissionsResult { granted: Vec<Permission> },
    /// The analyzer read a payload
    Decoded { payload: String },
    /// The analyzer read a code whose payload is unusable
    InvalidResult { message: String },
    /// Camera or decoder failure that ends the scan
    Failed { message: Option<String> },
    /// The outcome left through the result channel
    Reported,
    /// Host is tearing the screen down
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEffect {
    RequestPermissions(Vec<Permission>),
    StartScanning,
    Report(ScanOutcome),
    Teardown,
}

#[derive(Debug)]
pub struct ScanStateMachine {
    state: ScanScreenState,
    required: Vec<Permission>,
}

impl ScanStateMachine {
    pub fn new(required: Vec<Permission>) -> Self {
        Self { state: ScanScreenState::AwaitingPermission, required }
    }

    pub fn state(&self) -> ScanScreenState {
        self.state
    }

    pub fn required_permissions(&self) -> &[Permission] {
        &self.required
    }

    pub fn handle(&mut self, event: ScreenEvent) -> Vec<ScreenEffect> {
        use ScanScreenState as State;
        use ScreenEvent as Event;

        match (self.state, event) {
            (State::AwaitingPermission, Event::Created { granted }) => {
                let missing = missing_permissions(&self.required, &granted);
                if missing.is_empty() {
                    self.start_scanning()
                } else {
                    vec![ScreenEffect::RequestPermissions(missing)]
                }
            }

            (State::AwaitingPermission, Event::PermissionsResult { granted }) => {
                let missing = missing_permissions(&self.required, &granted);
                if missing.is_empty() {
                    self.start_scanning()
                } else {
                    debug!("permissions denied: {missing:?}");
                    self.report(ScanOutcome::failure(ScanErrorReason::PermissionMissing))
                }
            }

            (State::Scanning, Event::Decoded { payload }) => {
                self.report(ScanOutcome::success(payload))
            }

            (State::Scanning, Event::InvalidResult { message }) => self.report(
                ScanOutcome::failure_with_message(ScanErrorReason::InvalidResult, message),
            ),

            (State::AwaitingPermission | State::Scanning, Event::Failed { message }) => {
                self.report(ScanOutcome::Failure { reason: ScanErrorReason::Unknown, message })
            }

            (State::Reporting, Event::Reported) => self.terminate(),

            (State::AwaitingPermission | State::Scanning | State::Reporting, Event::Destroyed) => {
                self.terminate()
            }

            (state, event) => {
                debug!("ignoring {event:?} in state {state}");
                vec![]
            }
        }
    }

    fn start_scanning(&mut self) -> Vec<ScreenEffect> {
        self.state = ScanScreenState::Scanning;
        vec![ScreenEffect::StartScanning]
    }

    fn report(&mut self, outcome: ScanOutcome) -> Vec<ScreenEffect> {
        self.state = ScanScreenState::Reporting;
        vec![ScreenEffect::Report(outcome)]
    }

    fn terminate(&mut self) -> Vec<ScreenEffect> {
        self.state = ScanScreenState::Terminated;
        vec![ScreenEffect::Teardown]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_machine() -> ScanStateMachine {
        ScanStateMachine::new(vec![Permission::Camera, Permission::RecordAudio])
    }

    fn all_granted() -> Vec<Permission> {
        vec![Permission::RecordAudio, Permission::Camera]
    }

    #[test]
    fn test_created_with_permissions_starts_scanning() {
        let mut machine = new_machine();

        let effects = machine.handle(ScreenEvent::Created { granted: all_granted() });

        assert_eq!(effects, vec![ScreenEffect::StartScanning]);
        assert_eq!(machine.state(), ScanScreenState::Scanning);
    }

    #[test]
    fn test_created_without_permissions_requests_missing() {
        let mut machine = new_machine();

        let effects = machine.handle(ScreenEvent::Created { granted: vec![Permission::Camera] });

        assert_eq!(effects, vec![ScreenEffect::RequestPermissions(vec![Permission::RecordAudio])]);
        assert_eq!(machine.state(), ScanScreenState::AwaitingPermission);
    }

    #[test]
    fn test_denied_permissions_report_permission_missing() {
        let mut machine = new_machine();
        machine.handle(ScreenEvent::Created { granted: vec![] });

        let effects = machine.handle(ScreenEvent::PermissionsResult { granted: vec![] });
        assert_eq!(
            effects,
            vec![ScreenEffect::Report(ScanOutcome::Failure {
                reason: ScanErrorReason::PermissionMissing,
                message: None,
            })]
        );
        assert_eq!(machine.state(), ScanScreenState::Reporting);

        assert_eq!(machine.handle(ScreenEvent::Reported), vec![ScreenEffect::Teardown]);
        assert_eq!(machine.state(), ScanScreenState::Terminated);
    }

    #[test]
    fn test_granted_after_request_starts_scanning() {
        let mut machine = new_machine();
        machine.handle(ScreenEvent::Created { granted: vec![] });

        let effects = machine.handle(ScreenEvent::PermissionsResult { granted: all_granted() });
        assert_eq!(effects, vec![ScreenEffect::StartScanning]);
    }

    #[test]
    fn test_decode_ignored_before_scanning() {
        let mut machine = new_machine();

        let effects = machine.handle(ScreenEvent::Decoded { payload: "ABC123".into() });

        assert!(effects.is_empty());
        assert_eq!(machine.state(), ScanScreenState::AwaitingPermission);
    }

    #[test]
    fn test_only_first_decode_is_reported() {
        let mut machine = new_machine();
        machine.handle(ScreenEvent::Created { granted: all_granted() });

        let first = machine.handle(ScreenEvent::Decoded { payload: "first".into() });
        let second = machine.handle(ScreenEvent::Decoded { payload: "second".into() });
        let failure = machine.handle(ScreenEvent::Failed { message: None });

        assert_eq!(first, vec![ScreenEffect::Report(ScanOutcome::success("first"))]);
        assert!(second.is_empty());
        assert!(failure.is_empty());
    }

    #[test]
    fn test_invalid_result_and_failure_outcomes() {
        let mut machine = new_machine();
        machine.handle(ScreenEvent::Created { granted: all_granted() });
        let effects = machine.handle(ScreenEvent::InvalidResult { message: "not utf-8".into() });
        assert_eq!(
            effects,
            vec![ScreenEffect::Report(ScanOutcome::failure_with_message(
                ScanErrorReason::InvalidResult,
                "not utf-8"
            ))]
        );

        let mut machine = new_machine();
        let effects = machine.handle(ScreenEvent::Failed { message: Some("no camera".into()) });
        assert_eq!(
            effects,
            vec![ScreenEffect::Report(ScanOutcome::failure_with_message(
                ScanErrorReason::Unknown,
                "no camera"
            ))]
        );
    }

    #[test]
    fn test_destroy_terminates_without_outcome() {
        let mut machine = new_machine();
        machine.handle(ScreenEvent::Created { granted: all_granted() });

        assert_eq!(machine.handle(ScreenEvent::Destroyed), vec![ScreenEffect::Teardown]);
        assert_eq!(machine.state(), ScanScreenState::Terminated);

        // nothing gets out once terminated
        assert!(machine.handle(ScreenEvent::Destroyed).is_empty());
        assert!(machine.handle(ScreenEvent::Decoded { payload: "late".into() }).is_empty());
        assert!(machine.handle(ScreenEvent::Created { granted: all_granted() }).is_empty());
    }
}
