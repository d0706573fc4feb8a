/// Page outcome definitions
///
/// Every URL the crawl actually fetches ends in exactly one of these states.
use std::fmt;

/// Represents how the fetch of a page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Terminal Success States =====
    /// HTML page was fetched and extracted; its links are followed while below the depth limit
    Processed,

    /// Non-HTML page was fetched and extracted; links were not followed
    ContentMismatch,

    // ===== Terminal Error States =====
    /// Page could not be reached (connection refused, DNS failure, timeout) after all retries
    Unreachable,

    /// Response body could not be read on the final attempt
    Failed,
}

impl PageState {
    /// Returns true if the page body was obtained and run through extraction
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed | Self::ContentMismatch)
    }

    /// Returns true if this represents an abandoned branch
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Unreachable | Self::Failed)
    }

    /// Short label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::ContentMismatch => "content_mismatch",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [PageState; 4] = [
        PageState::Processed,
        PageState::ContentMismatch,
        PageState::Unreachable,
        PageState::Failed,
    ];

    #[test]
    fn test_is_success() {
        assert!(PageState::Processed.is_success());
        assert!(PageState::ContentMismatch.is_success());

        assert!(!PageState::Unreachable.is_success());
        assert!(!PageState::Failed.is_success());
    }

    #[test]
    fn test_is_error() {
        assert!(PageState::Unreachable.is_error());
        assert!(PageState::Failed.is_error());

        assert!(!PageState::Processed.is_error());
        assert!(!PageState::ContentMismatch.is_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::Processed), "processed");
        assert_eq!(format!("{}", PageState::ContentMismatch), "content_mismatch");
    }

    #[test]
    fn test_every_state_is_success_or_error() {
        for state in STATES {
            assert_ne!(state.is_success(), state.is_error(), "{:?}", state);
        }
    }
}
