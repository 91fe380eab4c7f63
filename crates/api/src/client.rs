use anyhow::bail;
use serde_json::Value;
use tracing::{error, warn};

use wristband_config::ConfigStore;
use wristband_oauth::OAuthFlow;

use crate::records::RecordType;

/// Issues authenticated GETs against the WHOOP developer API, refreshing the
/// access token once on 401.
pub struct RecordClient {
    http: reqwest::Client,
    base_url: String,
    store: ConfigStore,
    flow: OAuthFlow,
}

impl RecordClient {
    pub fn new(store: ConfigStore, flow: OAuthFlow, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            store,
            flow,
        }
    }

    /// Fetch all records of one type and return them verbatim.
    ///
    /// A 401 triggers a single refresh-then-retry; any other non-200 response
    /// is logged and degrades to an empty list. The profile endpoint returns
    /// a single object, which is wrapped in a one-element list.
    pub async fn get_records(&self, record_type: RecordType) -> anyhow::Result<Vec<Value>> {
        let Some(token) = self.access_token() else {
            error!("access token not found in config, run `wristband auth login` first");
            bail!("not authenticated");
        };

        let mut resp = self.fetch(record_type, &token).await?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            warn!("access token expired, refreshing");
            let token = self.refresh_tokens().await?;
            resp = self.fetch(record_type, &token).await?;
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(%status, %record_type, %body, "error fetching records");
            return Ok(Vec::new());
        }

        let body: Value = resp.json().await?;
        let records = match record_type {
            RecordType::Profile => vec![body],
            _ => body
                .get("records")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        };
        Ok(records)
    }

    fn access_token(&self) -> Option<String> {
        self.store.load().access_token.filter(|t| !t.is_empty())
    }

    async fn fetch(
        &self,
        record_type: RecordType,
        token: &str,
    ) -> anyhow::Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, record_type.endpoint());
        Ok(self.http.get(&url).bearer_auth(token).send().await?)
    }

    /// Run one refresh against the token endpoint and persist the new pair.
    /// Stored tokens are only touched after a successful refresh.
    async fn refresh_tokens(&self) -> anyhow::Result<String> {
        let config = self.store.load();
        let Some(refresh_token) = config.refresh_token.filter(|t| !t.is_empty()) else {
            bail!("no refresh token in config, run `wristband auth login` first");
        };
        let tokens = self.flow.refresh(&refresh_token).await?;
        self.store
            .update_tokens(&tokens.access_token, &tokens.refresh_token)?;
        Ok(tokens.access_token)
    }
}
