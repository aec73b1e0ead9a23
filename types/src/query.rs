//! Records cached in local storage by the search UI.

use serde::{Deserialize, Serialize};

/// A search the user chose to save, as written to the `saved_searches` key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub query: String,
    /// Search type filter ("email", "phone", ...), `None` for all types.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Unix timestamp in milliseconds, as the web client wrote it.
    pub ts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_web_client_field_names() {
        let saved = SavedSearch {
            query: "alice@example.com".into(),
            kind: Some("email".into()),
            ts: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&saved).unwrap();
        assert!(json.contains(r#""type":"email""#));
        assert!(json.contains(r#""ts":1700000000000"#));
    }

    #[test]
    fn round_trips_through_json() {
        let json = r#"{"query":"+1-555-0123","type":null,"ts":0}"#;
        let saved: SavedSearch = serde_json::from_str(json).unwrap();
        assert_eq!(saved.query, "+1-555-0123");
        assert_eq!(saved.kind, None);
    }
}
