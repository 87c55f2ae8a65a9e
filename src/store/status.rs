use serde::{Deserialize, Serialize};

/// One capture job's lifecycle. Only `Done` and `Error` are terminal; a
/// terminal (or idle) status moves to `Capturing` on the next user trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Idle,
    Capturing,
    Preprocessing,
    Recognizing,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    pub fn is_processing(self) -> bool {
        matches!(
            self,
            JobStatus::Capturing | JobStatus::Preprocessing | JobStatus::Recognizing
        )
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Idle | Done | Error, Capturing)
                | (Capturing, Preprocessing)
                | (Preprocessing, Recognizing)
                | (Recognizing, Done)
                | (Capturing | Preprocessing | Recognizing, Error)
                | (Done | Error, Idle)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Idle => write!(f, "idle"),
            JobStatus::Capturing => write!(f, "capturing"),
            JobStatus::Preprocessing => write!(f, "preprocessing"),
            JobStatus::Recognizing => write!(f, "recognizing"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}
