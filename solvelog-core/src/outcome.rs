//! Judge outcome classification
//!
//! Submission records carry a numeric status code. Exactly one code means
//! "accepted"; everything else is a failure of some category. Codes the
//! judge introduces later are kept as [`Status::Unknown`] and treated as
//! generic failures rather than rejected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The status code the judge uses for an accepted submission.
pub const ACCEPTED_CODE: i64 = 10;

/// Judge outcome of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Accepted,
    WrongAnswer,
    MemoryLimitExceeded,
    OutputLimitExceeded,
    TimeLimitExceeded,
    RuntimeError,
    InternalError,
    CompileError,
    Timeout,
    /// A code this build does not know about
    Unknown(i64),
}

/// Coarse failure bucket used by the outcome breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    WrongAnswer,
    ResourceLimit,
    RuntimeError,
    CompileError,
    Other,
}

impl FailureCategory {
    pub fn label(&self) -> &'static str {
        match self {
            FailureCategory::WrongAnswer => "Wrong Answer",
            FailureCategory::ResourceLimit => "Limit Exceeded",
            FailureCategory::RuntimeError => "Runtime Error",
            FailureCategory::CompileError => "Compile Error",
            FailureCategory::Other => "Other",
        }
    }
}

impl Status {
    /// Classify a raw status code. Unknown codes never fail.
    pub fn from_code(code: i64) -> Self {
        match code {
            10 => Status::Accepted,
            11 => Status::WrongAnswer,
            12 => Status::MemoryLimitExceeded,
            13 => Status::OutputLimitExceeded,
            14 => Status::TimeLimitExceeded,
            15 => Status::RuntimeError,
            16 => Status::InternalError,
            20 => Status::CompileError,
            30 => Status::Timeout,
            other => Status::Unknown(other),
        }
    }

    /// The raw code this status was built from.
    pub fn code(&self) -> i64 {
        match self {
            Status::Accepted => ACCEPTED_CODE,
            Status::WrongAnswer => 11,
            Status::MemoryLimitExceeded => 12,
            Status::OutputLimitExceeded => 13,
            Status::TimeLimitExceeded => 14,
            Status::RuntimeError => 15,
            Status::InternalError => 16,
            Status::CompileError => 20,
            Status::Timeout => 30,
            Status::Unknown(code) => *code,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Status::Accepted)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Status::Unknown(_))
    }

    /// Failure bucket, `None` for accepted submissions.
    pub fn failure_category(&self) -> Option<FailureCategory> {
        match self {
            Status::Accepted => None,
            Status::WrongAnswer => Some(FailureCategory::WrongAnswer),
            Status::MemoryLimitExceeded
            | Status::OutputLimitExceeded
            | Status::TimeLimitExceeded
            | Status::Timeout => Some(FailureCategory::ResourceLimit),
            Status::RuntimeError => Some(FailureCategory::RuntimeError),
            Status::CompileError => Some(FailureCategory::CompileError),
            Status::InternalError | Status::Unknown(_) => Some(FailureCategory::Other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Accepted => "Accepted",
            Status::WrongAnswer => "Wrong Answer",
            Status::MemoryLimitExceeded => "Memory Limit Exceeded",
            Status::OutputLimitExceeded => "Output Limit Exceeded",
            Status::TimeLimitExceeded => "Time Limit Exceeded",
            Status::RuntimeError => "Runtime Error",
            Status::InternalError => "Internal Error",
            Status::CompileError => "Compile Error",
            Status::Timeout => "Timeout",
            Status::Unknown(_) => "Failed",
        }
    }
}

/// Stored as the raw code so snapshots survive new codes appearing.
impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Status::from_code)
    }
}
