//! Shared HTTP response helpers

use reqwest::Response;

/// Body of a failed response, or empty when it cannot be read
pub(crate) async fn error_body(response: Response) -> String {
    body_or_empty(response.text().await)
}

fn body_or_empty(body: Result<String, reqwest::Error>) -> String {
    body.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error body: {}", e);
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readable_body_kept() {
        assert_eq!(body_or_empty(Ok("rate limited".to_string())), "rate limited");
    }

    #[test]
    fn test_unreadable_body_is_empty() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert_eq!(body_or_empty(Err(err)), "");
    }
}
