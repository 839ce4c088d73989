//! The single result of a scan attempt

use derive_more::Display;

/// Why a scan attempt failed
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Display, uniffi::Enum)]
pub enum ScanErrorReason {
    /// The camera permission (or another required one) was denied
    PermissionMissing,
    /// A code was read but its payload could not be turned into a string
    InvalidResult,
    /// Any other camera or decoder failure
    Unknown,
}

/// Result code sent alongside the outcome, mirrors the platform activity result codes
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, uniffi::Enum)]
pub enum ResultCode {
    Ok,
    Failed,
}

impl ResultCode {
    pub const fn code(self) -> i32 {
        match self {
            Self::Ok => -1,
            Self::Failed => -2,
        }
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Enum)]
pub enum ScanOutcome {
    Success { payload: String },
    Failure { reason: ScanErrorReason, message: Option<String> },
}

impl ScanOutcome {
    pub fn success(payload: impl Into<String>) -> Self {
        Self::Success { payload: payload.into() }
    }

    pub fn failure(reason: ScanErrorReason) -> Self {
        Self::Failure { reason, message: None }
    }

    pub fn failure_with_message(reason: ScanErrorReason, message: impl Into<String>) -> Self {
        Self::Failure { reason, message: Some(message.into()) }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::Success { .. } => ResultCode::Ok,
            Self::Failure { .. } => ResultCode::Failed,
        }
    }
}

#[uniffi::export]
fn scan_outcome_result_code(outcome: ScanOutcome) -> i32 {
    outcome.result_code().code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_codes_match_activity_results() {
        assert_eq!(scan_outcome_result_code(ScanOutcome::success("ABC123")), -1);
        assert_eq!(
            scan_outcome_result_code(ScanOutcome::failure(ScanErrorReason::PermissionMissing)),
            -2
        );
    }

    #[test]
    fn test_failure_constructors() {
        assert_eq!(
            ScanOutcome::failure(ScanErrorReason::Unknown),
            ScanOutcome::Failure { reason: ScanErrorReason::Unknown, message: None }
        );

        let outcome = ScanOutcome::failure_with_message(ScanErrorReason::InvalidResult, "bad");
        assert!(!outcome.is_success());
        assert_eq!(outcome.result_code(), ResultCode::Failed);
    }
}
