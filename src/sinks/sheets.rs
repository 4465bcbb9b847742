use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Sink, SinkError};
use crate::auth::TokenProvider;
use crate::config::SheetsConfig;
use crate::submission::Submission;

const SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

const EMPTY_HEADER_ROW: &str = "No values in the header row - fill the first row with header values before trying to interact with rows";

#[derive(Debug, Deserialize)]
struct SpreadsheetInfo {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: i64,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Appends submissions as rows of the first sheet in a spreadsheet.
///
/// Every delivery authenticates from scratch and reloads the sheet metadata
/// and header row, so edits to the spreadsheet are picked up immediately.
pub struct SheetsSink {
    client: reqwest::Client,
    tokens: TokenProvider,
    spreadsheet_url: Url,
}

impl SheetsSink {
    pub fn new(client: reqwest::Client, config: &SheetsConfig) -> Result<Self, String> {
        let mut spreadsheet_url = Url::parse(&config.api_url)
            .map_err(|e| format!("Invalid SHEETS_API_URL: {e}"))?;
        spreadsheet_url
            .path_segments_mut()
            .map_err(|_| "Invalid SHEETS_API_URL: cannot be a base".to_string())?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", config.sheet_id.as_str()]);

        Ok(Self {
            tokens: TokenProvider::new(client.clone(), config.credentials.clone(), SCOPES),
            client,
            spreadsheet_url,
        })
    }

    pub async fn append(&self, submission: &Submission) -> Result<(), String> {
        let token = self.tokens.fetch().await?.token;

        let sheet = self.first_sheet(&token).await?;
        let headers = self.header_row(&token, &sheet).await?;
        let row = row_values(&headers, submission);

        let mut url = self.values_url(&format!("{}!A1:append", a1_sheet_name(&sheet.title)));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "OVERWRITE");

        self.call(Method::POST, url, &token, Some(json!({ "values": [row] })), "append")
            .await?;

        tracing::debug!("Appended row to sheet '{}' ({})", sheet.title, sheet.sheet_id);
        Ok(())
    }

    async fn first_sheet(&self, token: &str) -> Result<SheetProperties, String> {
        let mut url = self.spreadsheet_url.clone();
        url.query_pairs_mut().append_pair("fields", "sheets.properties");

        let info: SpreadsheetInfo = serde_json::from_value(
            self.call(Method::GET, url, token, None, "metadata load").await?,
        )
        .map_err(|e| format!("Invalid Google Sheets metadata: {e}"))?;

        info.sheets
            .into_iter()
            .map(|s| s.properties)
            .min_by_key(|p| p.index)
            .ok_or_else(|| "Spreadsheet has no sheets".to_string())
    }

    async fn header_row(&self, token: &str, sheet: &SheetProperties) -> Result<Vec<String>, String> {
        let url = self.values_url(&format!("{}!1:1", a1_sheet_name(&sheet.title)));

        let range: ValueRange = serde_json::from_value(
            self.call(Method::GET, url, token, None, "header load").await?,
        )
        .map_err(|e| format!("Invalid Google Sheets header row: {e}"))?;

        let headers: Vec<String> = range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .iter()
            .map(|cell| match cell {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(EMPTY_HEADER_ROW.to_string());
        }

        Ok(headers)
    }

    fn values_url(&self, range: &str) -> Url {
        let mut url = self.spreadsheet_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("values").push(range);
        }
        url
    }

    async fn call(
        &self,
        method: Method,
        url: Url,
        token: &str,
        body: Option<Value>,
        operation: &str,
    ) -> Result<Value, String> {
        let mut req = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| format!("Google Sheets {operation} request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(format!("Google Sheets {operation} failed ({status}): {detail}"));
        }

        resp.json()
            .await
            .map_err(|e| format!("Invalid Google Sheets {operation} response: {e}"))
    }
}

/// Quote a sheet title for use in A1 notation.
fn a1_sheet_name(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Lay a submission out along the header row.
fn row_values(headers: &[String], submission: &Submission) -> Vec<Value> {
    headers
        .iter()
        .map(|header| match submission.get(header) {
            None | Some(Value::Null) => Value::String(String::new()),
            Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => v.clone(),
            Some(nested) => Value::String(nested.to_string()),
        })
        .collect()
}

#[async_trait]
impl Sink for SheetsSink {
    fn name(&self) -> &str {
        "sheets"
    }

    async fn deliver(&self, submission: &Submission) -> Result<(), SinkError> {
        self.append(submission).await?;
        Ok(())
    }
}
