//! Checks and normalization applied to user input before it reaches the
//! generator or the history store.
//!
//! Prefixes and suffixes are trimmed and NFC-composed before matching, so
//! decomposed kana still match dictionary lemmas.

use unicode_normalization::UnicodeNormalization;

use crate::error::{JrpError, Result};
use crate::models::GenerationRequest;

/// Largest number of phrases generated by a single request
pub const MAX_PHRASES_PER_REQUEST: usize = 10_000;

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a phrase count
    pub fn validate_count(count: usize) -> Result<()> {
        if count == 0 {
            return Err(JrpError::InvalidRequest("number must be at least 1".to_string()));
        }

        if count > MAX_PHRASES_PER_REQUEST {
            return Err(JrpError::InvalidRequest(format!(
                "number too large (max {MAX_PHRASES_PER_REQUEST})"
            )));
        }

        Ok(())
    }

    /// Trim and NFC-normalize a prefix or suffix; blank input becomes `None`
    #[must_use]
    pub fn normalize_affix(raw: Option<&str>) -> Option<String> {
        raw.map(|s| s.trim().nfc().collect::<String>())
            .filter(|s| !s.is_empty())
    }

    /// Validate a generation request and return a normalized copy
    pub fn validate_request(request: &GenerationRequest) -> Result<GenerationRequest> {
        Self::validate_count(request.count)?;

        let prefix = Self::normalize_affix(request.prefix.as_deref());
        let suffix = Self::normalize_affix(request.suffix.as_deref());

        if prefix.is_some() && suffix.is_some() {
            return Err(JrpError::InvalidRequest(
                "prefix and suffix cannot be used together".to_string(),
            ));
        }

        Ok(GenerationRequest {
            count: request.count,
            prefix,
            suffix,
        })
    }

    /// Parse positional id arguments.
    ///
    /// Ids must be positive integers. Duplicates are dropped, keeping the
    /// first occurrence.
    pub fn parse_ids<S: AsRef<str>>(raw: &[S]) -> Result<Vec<i64>> {
        let mut ids = Vec::with_capacity(raw.len());
        for value in raw {
            let value = value.as_ref().trim();
            let id: i64 = value
                .parse()
                .map_err(|_| JrpError::InvalidRequest(format!("invalid id: {value}")))?;
            if id < 1 {
                return Err(JrpError::InvalidRequest(format!("id must be positive: {id}")));
            }
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Split raw keyword arguments on whitespace
    pub fn split_keywords<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
        let keywords: Vec<String> = raw
            .iter()
            .flat_map(|s| s.as_ref().split_whitespace().map(|k| k.nfc().collect::<String>()).collect::<Vec<_>>())
            .collect();

        if keywords.is_empty() {
            return Err(JrpError::NoKeywords);
        }
        Ok(keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn zero_count_is_rejected() {
        let err = InputValidator::validate_count(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(InputValidator::validate_count(1).is_ok());
        assert!(InputValidator::validate_count(MAX_PHRASES_PER_REQUEST + 1).is_err());
    }

    #[test]
    fn blank_affix_is_none() {
        assert_eq!(InputValidator::normalize_affix(Some("  ")), None);
        assert_eq!(InputValidator::normalize_affix(None), None);
        assert_eq!(InputValidator::normalize_affix(Some(" 赤 ")), Some("赤".to_string()));
    }

    #[test]
    fn decomposed_kana_is_composed() {
        // か + combining dakuten
        let decomposed = "\u{304B}\u{3099}";
        assert_eq!(InputValidator::normalize_affix(Some(decomposed)), Some("が".to_string()));
    }

    #[test]
    fn prefix_and_suffix_together_are_rejected() {
        let request = GenerationRequest::new(1).with_prefix("赤").with_suffix("車");
        let err = InputValidator::validate_request(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn blank_suffix_does_not_conflict_with_prefix() {
        let request = GenerationRequest::new(2).with_prefix("赤").with_suffix(" ");
        let normalized = InputValidator::validate_request(&request).unwrap();
        assert_eq!(normalized.prefix.as_deref(), Some("赤"));
        assert_eq!(normalized.suffix, None);
    }

    #[test]
    fn ids_are_parsed_and_deduplicated() {
        let ids = InputValidator::parse_ids(&["3", "1", "3"]).unwrap();
        assert_eq!(ids, vec![3, 1]);
        assert!(InputValidator::parse_ids(&["0"]).is_err());
        assert!(InputValidator::parse_ids(&["abc"]).is_err());
    }

    #[test]
    fn keywords_split_on_whitespace() {
        let keywords = InputValidator::split_keywords(&["赤 船", "青"]).unwrap();
        assert_eq!(keywords, vec!["赤", "船", "青"]);
        let err = InputValidator::split_keywords(&["  "]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoKeywords);
    }
}
