// src/cloud_handler.rs
use async_trait::async_trait;
use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::data_types::{FetchRequest, RawGrid};
use crate::error::{Result, TickerError};

pub const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const SHEET_RANGE: &str = "A1:Z100";

/// Anything that can hand the ticker a grid of cells.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_grid(&self, request: &FetchRequest) -> Result<RawGrid>;
}

/// Reads a fixed range of a spreadsheet through the Sheets values API,
/// authenticated with an API key.
pub struct CloudHandler {
    client: reqwest::Client,
    endpoint: String,
}

impl CloudHandler {
    pub fn new() -> Self {
        CloudHandler::with_endpoint(SHEETS_API)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        CloudHandler {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Values URL for a sheet; the key goes in the query string.
    pub fn values_url(&self, source_id: &str) -> String {
        format!("{}/{}/values/{}", self.endpoint, source_id, SHEET_RANGE)
    }
}

impl Default for CloudHandler {
    fn default() -> Self {
        CloudHandler::new()
    }
}

#[async_trait]
impl SheetSource for CloudHandler {
    async fn fetch_grid(&self, request: &FetchRequest) -> Result<RawGrid> {
        let url = self.values_url(&request.source_id);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .query(&[("key", request.access_key.as_str())])
            .send()
            .await
            .map_err(|e| TickerError::Network(e.without_url().to_string()))?;

        let status = response.status();
        log::debug!("Response Status: {status}");

        if !status.is_success() {
            return Err(TickerError::RemoteFetch {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TickerError::Network(format!("failed to read response body: {e}")))?;

        Ok(parse_values(&body))
    }
}

/// Decodes a values response. Anything that is not a usable `ValueRange`
/// counts as an empty sheet.
pub fn parse_values(body: &str) -> RawGrid {
    if body.trim().is_empty() {
        return RawGrid::new();
    }

    let range: Option<ValueRange> = match serde_json::from_str(body) {
        Ok(range) => range,
        Err(e) => {
            log::warn!("Ignoring malformed values response: {e}");
            return RawGrid::new();
        }
    };

    range
        .and_then(|range| range.values)
        .map(|rows| {
            rows.into_iter()
                .map(|row| row.into_iter().map(cell_to_string).collect())
                .collect()
        })
        .unwrap_or_default()
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_url_targets_fixed_range() {
        let handler = CloudHandler::with_endpoint("http://localhost:1234/v4/spreadsheets/");
        assert_eq!(
            handler.values_url("abc"),
            "http://localhost:1234/v4/spreadsheets/abc/values/A1:Z100"
        );
    }

    #[test]
    fn default_endpoint_is_sheets_api() {
        assert_eq!(CloudHandler::new().endpoint(), SHEETS_API);
    }

    #[test]
    fn parses_values_rows() {
        let grid = parse_values(
            r#"{"range": "Sheet1!A1:Z100", "majorDimension": "ROWS",
                "values": [["text", "title"], ["hello", "T1"], ["world"]]}"#,
        );

        assert_eq!(
            grid,
            vec![
                vec!["text".to_string(), "title".to_string()],
                vec!["hello".to_string(), "T1".to_string()],
                vec!["world".to_string()],
            ]
        );
    }

    #[test]
    fn absent_values_is_empty_grid() {
        assert!(parse_values(r#"{"range": "Sheet1!A1:Z100"}"#).is_empty());
    }

    #[test]
    fn empty_or_null_body_is_empty_grid() {
        assert!(parse_values("").is_empty());
        assert!(parse_values("  \n").is_empty());
        assert!(parse_values("null").is_empty());
    }

    #[test]
    fn malformed_body_is_empty_grid() {
        assert!(parse_values("<html>oops</html>").is_empty());
    }

    #[test]
    fn non_string_cells_are_rendered() {
        let grid = parse_values(r#"{"values": [["text", "n"], ["x", 42], [null, true]]}"#);
        assert_eq!(grid[1], vec!["x".to_string(), "42".to_string()]);
        assert_eq!(grid[2], vec![String::new(), "true".to_string()]);
    }
}
