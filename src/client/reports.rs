use crate::error::{ReportError, Result};
use crate::request::ReportRequest;
use crate::schema::ReportTree;
use log::{debug, warn};
use reqwest::{Client, StatusCode};

pub struct ReportFetcher {
    client: Client,
    base_url: String,
}

impl ReportFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, request: &ReportRequest) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), request.path)
    }

    /// Issues one report request.
    ///
    /// 401/403 map to [`ReportError::Auth`], any other non-2xx to
    /// [`ReportError::Transport`]. A body that is not a report degrades to an
    /// empty tree so one bad period does not abort a multi-slice run.
    pub async fn fetch(&self, request: &ReportRequest, access_token: &str) -> Result<ReportTree> {
        let url = self.url_for(request);

        let mut builder = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(*name, *value);
        }

        let res = builder.send().await?;
        let status = res.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = res.text().await?;
            return Err(ReportError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        if !status.is_success() {
            let body = res.text().await?;
            return Err(ReportError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let body = res.text().await?;
        debug!("[{}] Received {} bytes", request, body.len());

        match ReportTree::from_json_str(&body) {
            Ok(tree) => Ok(tree),
            Err(ReportError::MalformedReport(reason)) => {
                warn!("[{}] Malformed report payload, treating as empty: {}", request, reason);
                Ok(ReportTree::default())
            }
            Err(e) => Err(e),
        }
    }
}
