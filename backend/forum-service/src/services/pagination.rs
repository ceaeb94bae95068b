use crate::error::{ServiceError, ServiceResult};

/// Half-open window `[start, end)` over an ordered, filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    start: u64,
    end: u64,
}

impl Page {
    /// Rejects `end < start`.
    pub fn new(start: u64, end: u64) -> ServiceResult<Self> {
        if end < start {
            return Err(ServiceError::InvalidArgument(format!(
                "page end ({end}) must not be lower than page start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Rows to skip. Saturates at `i64::MAX`.
    pub fn offset(&self) -> i64 {
        i64::try_from(self.start).unwrap_or(i64::MAX)
    }

    /// Maximum rows to return. Saturates at `i64::MAX`.
    pub fn limit(&self) -> i64 {
        i64::try_from(self.end - self.start).unwrap_or(i64::MAX)
    }
}
