use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::BulkDeleteError;

/// Consistency policy for one bulk delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One transaction; malformed input or zero matches abort everything
    #[default]
    Atomic,
    /// One transaction; every id is classified as deleted or failed
    Partial,
    /// One statement, no transaction; bad ids are silently skipped
    BestEffort,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Atomic => "atomic",
            Strategy::Partial => "partial",
            Strategy::BestEffort => "best_effort",
        }
    }

    /// Missing or empty selects `Atomic`; anything unrecognized is an error.
    pub fn from_selector(selector: Option<&str>) -> Result<Self, BulkDeleteError> {
        match selector {
            None | Some("") => Ok(Strategy::Atomic),
            Some(name) => name.parse(),
        }
    }
}

impl FromStr for Strategy {
    type Err = BulkDeleteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atomic" => Ok(Strategy::Atomic),
            "partial" => Ok(Strategy::Partial),
            "best_effort" => Ok(Strategy::BestEffort),
            other => Err(BulkDeleteError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a bulk delete call as it arrives on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkDeletePayload {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub strategy: Option<String>,
}

/// A validated bulk delete, consumed by exactly one strategy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub ids: Vec<String>,
    pub strategy: Strategy,
}

impl DeletionRequest {
    pub fn new(ids: Vec<String>, strategy: Strategy) -> Result<Self, BulkDeleteError> {
        if ids.is_empty() {
            return Err(BulkDeleteError::EmptyRequest);
        }
        Ok(Self { ids, strategy })
    }
}

impl TryFrom<BulkDeletePayload> for DeletionRequest {
    type Error = BulkDeleteError;

    fn try_from(payload: BulkDeletePayload) -> Result<Self, Self::Error> {
        let strategy = Strategy::from_selector(payload.strategy.as_deref())?;
        Self::new(payload.ids, strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(ids: &[&str], strategy: Option<&str>) -> BulkDeletePayload {
        BulkDeletePayload {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            strategy: strategy.map(str::to_string),
        }
    }

    #[test]
    fn missing_or_empty_strategy_defaults_to_atomic() {
        let req = DeletionRequest::try_from(payload(&["x"], None)).unwrap();
        assert_eq!(req.strategy, Strategy::Atomic);

        let req = DeletionRequest::try_from(payload(&["x"], Some(""))).unwrap();
        assert_eq!(req.strategy, Strategy::Atomic);
    }

    #[test]
    fn recognizes_every_strategy_name() {
        for (name, expected) in [
            ("atomic", Strategy::Atomic),
            ("partial", Strategy::Partial),
            ("best_effort", Strategy::BestEffort),
        ] {
            let req = DeletionRequest::try_from(payload(&["x"], Some(name))).unwrap();
            assert_eq!(req.strategy, expected);
            assert_eq!(expected.to_string(), name);
        }
    }

    #[test]
    fn unknown_strategy_is_rejected_not_defaulted() {
        let err = DeletionRequest::try_from(payload(&["x"], Some("Atomic"))).unwrap_err();
        assert!(matches!(err, BulkDeleteError::UnknownStrategy(ref s) if s == "Atomic"));

        let err = DeletionRequest::try_from(payload(&["x"], Some("best-effort"))).unwrap_err();
        assert!(matches!(err, BulkDeleteError::UnknownStrategy(_)));
    }

    #[test]
    fn empty_id_list_is_rejected() {
        let err = DeletionRequest::try_from(payload(&[], Some("partial"))).unwrap_err();
        assert!(matches!(err, BulkDeleteError::EmptyRequest));
    }

    #[test]
    fn payload_tolerates_missing_fields() {
        let p: BulkDeletePayload = serde_json::from_str(r#"{"strategy":"partial"}"#).unwrap();
        assert!(p.ids.is_empty());

        let p: BulkDeletePayload = serde_json::from_str(r#"{"ids":["a"]}"#).unwrap();
        assert_eq!(p.strategy, None);
    }
}
