//! Rank Response Parser
//!
//! Validates the `{"data": {"rank": [...]}}` envelope and converts each item
//! into a `Token`. Bad items are skipped so one record cannot sink a page.

use serde_json::Value;

use crate::domain::token::{json_kind, Token};
use crate::ports::GmgnError;

/// Parser for GMGN rank responses
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenDataParser;

impl TokenDataParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a rank response into tokens, preserving rank order
    pub fn parse_response(&self, response: &Value) -> Result<Vec<Token>, GmgnError> {
        let object = response
            .as_object()
            .ok_or_else(|| GmgnError::Parsing(format!("Expected object, got {}", json_kind(response))))?;

        let data = object
            .get("data")
            .ok_or_else(|| GmgnError::Parsing("No 'data' key in response".to_string()))?;

        let rank = data
            .as_object()
            .and_then(|d| d.get("rank"))
            .ok_or_else(|| GmgnError::Parsing("Invalid data structure".to_string()))?;

        let items = rank
            .as_array()
            .ok_or_else(|| GmgnError::Parsing("Rank data is not a list".to_string()))?;

        let tokens: Vec<Token> = items
            .iter()
            .filter(|item| item.is_object())
            .filter_map(|item| match Token::from_value(item) {
                Ok(token) => Some(token),
                Err(e) => {
                    tracing::warn!("Failed to parse token: {}", e);
                    None
                }
            })
            .collect();

        tracing::info!("Successfully parsed {} tokens", tokens.len());
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<Vec<Token>, GmgnError> {
        TokenDataParser::new().parse_response(&value)
    }

    #[test]
    fn test_parses_rank_in_order() {
        let tokens = parse(json!({
            "code": 0,
            "data": {"rank": [
                {"id": 1, "symbol": "AAA", "price": 1.5},
                {"id": 2, "symbol": "BBB", "price": "0.25"}
            ]}
        }))
        .unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].symbol, "AAA");
        assert_eq!(tokens[1].price, 0.25);
    }

    #[test]
    fn test_malformed_item_skipped_rest_parsed() {
        let tokens = parse(json!({
            "data": {"rank": [
                {"id": 1, "symbol": "OK1"},
                {"id": 2, "symbol": "BAD", "volume": "lots"},
                "not an object",
                null,
                {"id": 3, "symbol": "OK2"}
            ]}
        }))
        .unwrap();

        let symbols: Vec<&str> = tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["OK1", "OK2"]);
    }

    #[test]
    fn test_envelope_errors() {
        let cases = [
            (json!([1, 2]), "Expected object, got array"),
            (json!("rank"), "Expected object, got string"),
            (json!({"code": 0}), "No 'data' key"),
            (json!({"data": []}), "Invalid data structure"),
            (json!({"data": {"items": []}}), "Invalid data structure"),
            (json!({"data": {"rank": {"a": 1}}}), "Rank data is not a list"),
        ];
        for (value, expected) in cases {
            match parse(value) {
                Err(GmgnError::Parsing(msg)) => assert!(msg.contains(expected), "{}", msg),
                other => panic!("expected parsing error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_rank() {
        assert!(parse(json!({"data": {"rank": []}})).unwrap().is_empty());
    }
}
