use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use dash_stuck::config::{ENV_SPREADSHEET_ID, Settings};
use dash_stuck::export::RowSink;
use dash_stuck::fetch::auth::ApiKey;
use dash_stuck::fetch::{BasicClient, HttpClient, execute_json};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::credentials::TokenSource;

const SHEETS_API: &str = "https://sheets.googleapis.com";

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Serialize)]
struct ValueRange<'a> {
    values: &'a [Vec<String>],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<UpdateValuesResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    #[serde(default)]
    updated_rows: Option<usize>,
}

/// Appends rows to one tab of a Google spreadsheet.
///
/// Credentials are resolved on the first append, so building the sink never
/// touches the network.
pub struct GoogleSheetsSink<C = BasicClient> {
    http: C,
    base_url: String,
    settings: Settings,
}

impl GoogleSheetsSink<BasicClient> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(BasicClient::new()?, SHEETS_API, settings.clone()))
    }
}

impl<C> GoogleSheetsSink<C> {
    pub fn new(http: C, base_url: &str, settings: Settings) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        }
    }

    fn spreadsheet_id(&self) -> Result<&str> {
        self.settings
            .spreadsheet_id
            .as_deref()
            .with_context(|| format!("{ENV_SPREADSHEET_ID} must be set to save to Google Sheets"))
    }

    fn spreadsheet_url(&self, extra: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets base URL '{}' cannot hold a path", self.base_url))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id()?])
            .extend(extra);
        Ok(url)
    }

    fn metadata_url(&self) -> Result<Url> {
        let mut url = self.spreadsheet_url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");
        Ok(url)
    }

    fn append_url(&self) -> Result<Url> {
        let range = format!("{}:append", a1_sheet(&self.settings.worksheet));
        let mut url = self.spreadsheet_url(&["values", &range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

impl<C: HttpClient> GoogleSheetsSink<C> {
    async fn worksheet_titles<A: HttpClient>(&self, client: &A) -> Result<Vec<String>> {
        let req = Request::new(Method::GET, self.metadata_url()?);
        let meta: SpreadsheetMeta = execute_json(client, req).await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }
}

#[async_trait]
impl<C: HttpClient> RowSink for GoogleSheetsSink<C> {
    fn describe(&self) -> String {
        format!(
            "sheet '{}' of spreadsheet {}",
            self.settings.worksheet,
            self.settings.spreadsheet_id.as_deref().unwrap_or("<unset>")
        )
    }

    #[tracing::instrument(
        skip_all,
        fields(worksheet = %self.settings.worksheet, rows = rows.len())
    )]
    async fn append_rows(&self, _header: &[&str], rows: &[Vec<String>]) -> Result<usize> {
        let spreadsheet_id = self.spreadsheet_id()?.to_string();
        let token = TokenSource::from_settings(&self.settings)?
            .access_token()
            .await?;
        let client = ApiKey::bearer(&self.http, &token)?;

        let titles = self.worksheet_titles(&client).await?;
        if !titles.iter().any(|t| t == &self.settings.worksheet) {
            bail!(
                "worksheet '{}' not found in spreadsheet {} (available: {})",
                self.settings.worksheet,
                spreadsheet_id,
                titles.join(", ")
            );
        }
        debug!(tabs = titles.len(), "Worksheet located");

        let mut req = Request::new(Method::POST, self.append_url()?);
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(serde_json::to_vec(&ValueRange { values: rows })?.into());

        let resp: AppendResponse = execute_json(&client, req).await?;
        let appended = resp
            .updates
            .and_then(|u| u.updated_rows)
            .unwrap_or(rows.len());

        info!(appended, spreadsheet_id = %spreadsheet_id, "Rows appended to sheet");
        Ok(appended)
    }
}

/// A1 reference to a whole sheet. Titles with anything but letters, digits
/// and underscores are quoted, doubling embedded quotes.
fn a1_sheet(title: &str) -> String {
    if !title.is_empty() && title.chars().all(|c| c.is_alphanumeric() || c == '_') {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}
