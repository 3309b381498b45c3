//! Submission acknowledgment parsing

use labwatch_core::domain::job::JobId;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ClientError, Result};

#[allow(clippy::expect_used)]
static SUBMITTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Submitted: \['([^']+)'").expect("constant regex pattern is valid")
});

/// Extracts the job id from a submission acknowledgment
///
/// The scheduler announces a successful submission with a line such as
/// `Submitted: ['J:45']`. The first such line wins.
pub fn parse_acknowledgment(acknowledgment: &str) -> Result<JobId> {
    acknowledgment
        .lines()
        .find_map(|line| SUBMITTED.captures(line.trim()))
        .map(|caps| JobId::new(&caps[1]))
        .ok_or_else(|| ClientError::SubmissionFailed {
            acknowledgment: acknowledgment.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_acknowledgment() {
        let id = parse_acknowledgment("Submitted: ['J:45']\n").unwrap();
        assert_eq!(id.as_str(), "J:45");
    }

    #[test]
    fn test_parse_acknowledgment_among_other_lines() {
        let ack = "Inherited ownership from group\nSubmitted: ['J:1234']\nDone\n";
        assert_eq!(parse_acknowledgment(ack).unwrap().as_str(), "J:1234");
    }

    #[test]
    fn test_parse_acknowledgment_takes_first_id() {
        let ack = "Submitted: ['J:1', 'J:2']\n";
        assert_eq!(parse_acknowledgment(ack).unwrap().as_str(), "J:1");
    }

    #[test]
    fn test_missing_id_is_submission_failure() {
        let err = parse_acknowledgment("Exception: XML is invalid\n").unwrap_err();
        assert!(err.is_submission_failure());

        let err = parse_acknowledgment("").unwrap_err();
        assert!(err.is_submission_failure());

        let err = parse_acknowledgment("Submitted: []\n").unwrap_err();
        assert!(err.is_submission_failure());
    }
}
