//! Salesforce CRM implementation.
//!
//! Logs in with username/password through the partner SOAP endpoint and uses
//! the returned session id as a bearer token against the REST API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::CrmConfig;
use crate::metrics::observe_external_call;

use super::{Account, CaseId, CrmConnector, CrmError, CrmSession, NewCase};

const SERVICE: &str = "salesforce";

static SESSION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:\w+:)?sessionId>([^<]+)</(?:\w+:)?sessionId>").unwrap());
static SERVER_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:\w+:)?serverUrl>([^<]+)</(?:\w+:)?serverUrl>").unwrap());
static FAULT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<faultstring>([^<]*)</faultstring>").unwrap());
static ORIGIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(https?://[^/]+)").unwrap());

/// Opens Salesforce sessions.
pub struct SalesforceConnector {
    client: Client,
    config: CrmConfig,
    login_url: String,
}

impl SalesforceConnector {
    /// Create a connector for the configured org.
    pub fn new(config: CrmConfig) -> Result<Self, CrmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        let login_url = format!("https://{}.salesforce.com", config.login_domain());

        Ok(Self {
            client,
            config,
            login_url,
        })
    }

    /// Override the login host (e.g. for a mock server).
    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    fn soap_login_url(&self) -> String {
        format!(
            "{}/services/Soap/u/{}",
            self.login_url.trim_end_matches('/'),
            self.config.api_version
        )
    }

    fn login_envelope(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:urn="urn:partner.soap.sforce.com">
  <env:Header>
    <urn:CallOptions><urn:client>casegen</urn:client></urn:CallOptions>
  </env:Header>
  <env:Body>
    <n1:login xmlns:n1="urn:partner.soap.sforce.com">
      <n1:username>{}</n1:username>
      <n1:password>{}{}</n1:password>
    </n1:login>
  </env:Body>
</env:Envelope>"#,
            xml_escape(&self.config.username),
            xml_escape(&self.config.password),
            xml_escape(&self.config.security_token),
        )
    }

    async fn login(&self) -> Result<SalesforceSession, CrmError> {
        let url = self.soap_login_url();
        debug!("Salesforce login: url='{}', username='{}'", url, self.config.username);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(self.login_envelope())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let reason = capture(&FAULT_RE, &body).unwrap_or_else(|| format!("HTTP {}", status));
            return Err(CrmError::AuthenticationFailed(reason));
        }

        let session_id = capture(&SESSION_ID_RE, &body)
            .ok_or_else(|| CrmError::Parse("login response has no sessionId".to_string()))?;
        let server_url = capture(&SERVER_URL_RE, &body)
            .ok_or_else(|| CrmError::Parse("login response has no serverUrl".to_string()))?;

        let instance_url = match self.config.instance_url.as_deref() {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => capture(&ORIGIN_RE, &server_url).ok_or_else(|| {
                CrmError::Parse(format!("invalid serverUrl in login response: {}", server_url))
            })?,
        };

        Ok(SalesforceSession {
            client: self.client.clone(),
            instance_url,
            session_id,
            api_version: self.config.api_version.clone(),
        })
    }
}

#[async_trait]
impl CrmConnector for SalesforceConnector {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn connect(&self) -> Result<Box<dyn CrmSession>, CrmError> {
        let start = Instant::now();
        let result = self.login().await;
        observe_external_call(SERVICE, "login", start, result.is_ok());

        let session = result?;
        info!("Connected to Salesforce instance {}", session.instance_url);
        Ok(Box::new(session))
    }
}

/// An authenticated Salesforce REST session.
pub struct SalesforceSession {
    client: Client,
    instance_url: String,
    session_id: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    total_size: u64,
    done: bool,
    #[serde(default)]
    next_records_url: Option<String>,
    records: Vec<Account>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(default)]
    id: Option<String>,
    success: bool,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorEntry {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

impl SalesforceSession {
    /// Instance the session is bound to (scheme and host).
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn data_url(&self) -> String {
        format!("{}/services/data/v{}", self.instance_url, self.api_version)
    }

    /// Send an authenticated request, turning non-success statuses into errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, CrmError> {
        let response = request
            .bearer_auth(&self.session_id)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Vec<ApiErrorEntry>>(&body)
            .ok()
            .filter(|entries| !entries.is_empty())
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|e| match e.error_code {
                        Some(code) => format!("{}: {}", code, e.message),
                        None => e.message,
                    })
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or(body);

        if status.as_u16() == 401 {
            return Err(CrmError::AuthenticationFailed(message));
        }
        Err(CrmError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_page(&self, request: RequestBuilder) -> Result<QueryResponse, CrmError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| CrmError::Parse(format!("Failed to parse query response: {}", e)))
    }

    /// Run a SOQL query, following `nextRecordsUrl` until the result is done.
    async fn query_all(&self, soql: &str) -> Result<Vec<Account>, CrmError> {
        let url = format!("{}/query/", self.data_url());
        let mut page = self
            .fetch_page(self.client.get(&url).query(&[("q", soql)]))
            .await?;
        debug!("Salesforce query reported totalSize={}", page.total_size);

        let mut records = std::mem::take(&mut page.records);
        while !page.done {
            let Some(next) = page.next_records_url.take() else {
                break;
            };
            page = self
                .fetch_page(self.client.get(format!("{}{}", self.instance_url, next)))
                .await?;
            records.append(&mut page.records);
        }

        Ok(records)
    }

    async fn insert_case(&self, case: &NewCase) -> Result<CaseId, CrmError> {
        let url = format!("{}/sobjects/Case/", self.data_url());
        let created: CreateResponse = self
            .send(self.client.post(&url).json(case))
            .await?
            .json()
            .await
            .map_err(|e| CrmError::Parse(format!("Failed to parse create response: {}", e)))?;

        match created.id {
            Some(id) if created.success => Ok(CaseId(id)),
            _ => Err(CrmError::Rejected(
                created.errors.iter().map(describe_error).collect(),
            )),
        }
    }
}

#[async_trait]
impl CrmSession for SalesforceSession {
    async fn query_accounts(&self, limit: u32) -> Result<Vec<Account>, CrmError> {
        let soql = format!("SELECT Id, Name FROM Account LIMIT {}", limit);
        debug!("Salesforce query: {}", soql);

        let start = Instant::now();
        let result = self.query_all(&soql).await;
        observe_external_call(SERVICE, "query", start, result.is_ok());
        result
    }

    async fn create_case(&self, case: &NewCase) -> Result<CaseId, CrmError> {
        debug!(
            "Salesforce create Case: subject='{}', account={:?}",
            case.subject, case.account_id
        );

        let start = Instant::now();
        let result = self.insert_case(case).await;
        observe_external_call(SERVICE, "create_case", start, result.is_ok());
        result
    }
}

fn map_transport_error(e: reqwest::Error) -> CrmError {
    if e.is_timeout() {
        CrmError::Timeout
    } else if e.is_connect() {
        CrmError::ConnectionFailed(e.to_string())
    } else {
        CrmError::Http(e)
    }
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Render one entry of a create response's `errors` list.
fn describe_error(error: &serde_json::Value) -> String {
    let message = error.get("message").and_then(|m| m.as_str());
    let code = error.get("statusCode").and_then(|c| c.as_str());
    match (code, message) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (None, Some(message)) => message.to_string(),
        _ => error.to_string(),
    }
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
