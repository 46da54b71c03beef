//! NotifyHub API client.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::response::unwrap_response;
use crate::types::{
    DomainInfoResponse, DomainRemoval, DomainStatusResponse, DomainVerificationResponse, Job,
    JobHandle, JobList, ListJobsQuery, SendEmailOptions, SendWebhookOptions,
};

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.notifyhub.com";

/// Header carrying the account credential on every request.
const API_KEY_HEADER: &str = "X-API-Key";

/// Environment variable holding the API key for [`NotifyHubClient::from_env`].
pub const API_KEY_ENV: &str = "NOTIFYHUB_API_KEY";

/// Environment variable overriding the endpoint for [`NotifyHubClient::from_env`].
pub const ENDPOINT_ENV: &str = "NOTIFYHUB_ENDPOINT";

/// Configuration for [`NotifyHubClient`].
#[derive(Debug, Clone, Default)]
pub struct NotifyHubConfig {
    /// API key sent with every request. Required.
    pub api_key: String,
    /// Service endpoint; [`DEFAULT_ENDPOINT`] when absent.
    pub base_url: Option<String>,
}

impl NotifyHubConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }
}

/// Operations exposed by the NotifyHub service.
///
/// [`NotifyHubClient`] is the production implementation; tests can substitute
/// a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifyHubApi: Send + Sync {
    /// Queue an email notification.
    async fn send_email(&self, options: &SendEmailOptions) -> Result<JobHandle>;
    /// Queue a webhook notification.
    async fn send_webhook(&self, options: &SendWebhookOptions) -> Result<JobHandle>;
    /// Fetch the current snapshot of a delivery job.
    async fn get_job(&self, job_id: &str) -> Result<Job>;
    /// List delivery jobs, newest first.
    async fn list_jobs(&self, query: &ListJobsQuery) -> Result<JobList>;
    /// Queue a new delivery attempt for a failed job.
    async fn retry_job(&self, job_id: &str) -> Result<JobHandle>;
    /// Start verification for a sending domain.
    async fn request_domain_verification(&self, domain: &str)
    -> Result<DomainVerificationResponse>;
    /// Ask the service to check the domain's DNS records now.
    async fn verify_domain(&self) -> Result<DomainStatusResponse>;
    /// Current domain configuration for the account.
    async fn domain_status(&self) -> Result<DomainInfoResponse>;
    /// Remove the account's domain configuration.
    async fn remove_domain(&self) -> Result<DomainRemoval>;
    /// Liveness check against the service.
    async fn ping(&self) -> Result<Value>;
    /// Service metadata (version, limits). Shape is not guaranteed.
    async fn info(&self) -> Result<Value>;
}

/// Client for the NotifyHub notification API.
///
/// Holds a configured [`reqwest::Client`] with the credential attached, so it
/// is cheap to share and safe to use from multiple tasks at once. No
/// operation retries internally; `retry_job` is an explicit remote call.
#[derive(Clone)]
pub struct NotifyHubClient {
    client: Client,
    base_url: String,
}

impl NotifyHubClient {
    /// Creates a client, failing before any network activity when the API
    /// key is missing or unusable.
    pub fn new(config: NotifyHubConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Configuration("API key is required".to_string()));
        }

        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&config.api_key).map_err(|_| {
            Error::Configuration("API key contains characters not allowed in a header".to_string())
        })?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(concat!("notifyhub-rs/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|error| {
                Error::Configuration(format!("Failed to build HTTP client: {}", error))
            })?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self { client, base_url })
    }

    /// Creates a client from `NOTIFYHUB_API_KEY` and `NOTIFYHUB_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::Configuration(format!("{} is not set", API_KEY_ENV)))?;
        let base_url = std::env::var(ENDPOINT_ENV).ok();
        Self::new(NotifyHubConfig { api_key, base_url })
    }

    /// Endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let outcome = self.client.get(self.url(path)).send().await;
        Ok(unwrap_response(outcome).await?)
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        debug!("GET {}", path);
        let outcome = self.client.get(self.url(path)).query(query).send().await;
        Ok(unwrap_response(outcome).await?)
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("POST {}", path);
        let outcome = self.client.post(self.url(path)).json(body).send().await;
        Ok(unwrap_response(outcome).await?)
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("POST {}", path);
        let outcome = self.client.post(self.url(path)).send().await;
        Ok(unwrap_response(outcome).await?)
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("DELETE {}", path);
        let outcome = self.client.delete(self.url(path)).send().await;
        Ok(unwrap_response(outcome).await?)
    }
}

#[derive(Serialize)]
struct DomainRequest<'a> {
    domain: &'a str,
}

impl NotifyHubClient {
    /// Queue an email notification.
    #[tracing::instrument(skip(self, options))]
    pub async fn send_email(&self, options: &SendEmailOptions) -> Result<JobHandle> {
        self.post("/api/v1/notifications/email", options).await
    }

    /// Queue a webhook notification.
    #[tracing::instrument(skip(self, options))]
    pub async fn send_webhook(&self, options: &SendWebhookOptions) -> Result<JobHandle> {
        self.post("/api/v1/notifications/webhook", options).await
    }

    /// Fetch the current snapshot of a delivery job.
    #[tracing::instrument(skip(self))]
    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        self.get(&format!("/api/v1/notifications/jobs/{}", job_id))
            .await
    }

    /// List delivery jobs matching the query.
    #[tracing::instrument(skip(self, query))]
    pub async fn list_jobs(&self, query: &ListJobsQuery) -> Result<JobList> {
        self.get_with_query("/api/v1/notifications/jobs", query)
            .await
    }

    /// Queue a new delivery attempt for a failed job.
    #[tracing::instrument(skip(self))]
    pub async fn retry_job(&self, job_id: &str) -> Result<JobHandle> {
        self.post_empty(&format!("/api/v1/notifications/jobs/{}/retry", job_id))
            .await
    }

    /// Start verification for a sending domain, returning the DNS records to
    /// publish.
    #[tracing::instrument(skip(self))]
    pub async fn request_domain_verification(
        &self,
        domain: &str,
    ) -> Result<DomainVerificationResponse> {
        self.post("/api/v1/customers/domain/request", &DomainRequest { domain })
            .await
    }

    /// Ask the service to check the domain's DNS records now.
    #[tracing::instrument(skip(self))]
    pub async fn verify_domain(&self) -> Result<DomainStatusResponse> {
        self.post_empty("/api/v1/customers/domain/verify").await
    }

    /// Current domain configuration for the account.
    #[tracing::instrument(skip(self))]
    pub async fn domain_status(&self) -> Result<DomainInfoResponse> {
        self.get("/api/v1/customers/domain/status").await
    }

    /// Remove the account's domain configuration.
    #[tracing::instrument(skip(self))]
    pub async fn remove_domain(&self) -> Result<DomainRemoval> {
        self.delete("/api/v1/customers/domain").await
    }

    /// Liveness check against the service.
    #[tracing::instrument(skip(self))]
    pub async fn ping(&self) -> Result<Value> {
        self.get("/api/v1/ping").await
    }

    /// Service metadata (version, limits). Shape is not guaranteed.
    #[tracing::instrument(skip(self))]
    pub async fn info(&self) -> Result<Value> {
        self.get("/api/v1/info").await
    }
}

#[async_trait]
impl NotifyHubApi for NotifyHubClient {
    async fn send_email(&self, options: &SendEmailOptions) -> Result<JobHandle> {
        NotifyHubClient::send_email(self, options).await
    }

    async fn send_webhook(&self, options: &SendWebhookOptions) -> Result<JobHandle> {
        NotifyHubClient::send_webhook(self, options).await
    }

    async fn get_job(&self, job_id: &str) -> Result<Job> {
        NotifyHubClient::get_job(self, job_id).await
    }

    async fn list_jobs(&self, query: &ListJobsQuery) -> Result<JobList> {
        NotifyHubClient::list_jobs(self, query).await
    }

    async fn retry_job(&self, job_id: &str) -> Result<JobHandle> {
        NotifyHubClient::retry_job(self, job_id).await
    }

    async fn request_domain_verification(
        &self,
        domain: &str,
    ) -> Result<DomainVerificationResponse> {
        NotifyHubClient::request_domain_verification(self, domain).await
    }

    async fn verify_domain(&self) -> Result<DomainStatusResponse> {
        NotifyHubClient::verify_domain(self).await
    }

    async fn domain_status(&self) -> Result<DomainInfoResponse> {
        NotifyHubClient::domain_status(self).await
    }

    async fn remove_domain(&self) -> Result<DomainRemoval> {
        NotifyHubClient::remove_domain(self).await
    }

    async fn ping(&self) -> Result<Value> {
        NotifyHubClient::ping(self).await
    }

    async fn info(&self) -> Result<Value> {
        NotifyHubClient::info(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DomainStatus, JobState, NotificationType};
    use mockito::Matcher;
    use serde_json::json;

    fn test_client(base_url: &str) -> NotifyHubClient {
        NotifyHubClient::new(NotifyHubConfig {
            api_key: "test-key".to_string(),
            base_url: Some(base_url.to_string()),
        })
        .unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = NotifyHubClient::new(NotifyHubConfig::new(""));
        match result {
            Err(Error::Configuration(message)) => assert_eq!(message, "API key is required"),
            other => panic!("Expected configuration error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_new_rejects_blank_api_key() {
        assert!(matches!(
            NotifyHubClient::new(NotifyHubConfig::new("   ")),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_new_rejects_api_key_with_invalid_header_characters() {
        assert!(matches!(
            NotifyHubClient::new(NotifyHubConfig::new("key\nwith-newline")),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_new_defaults_endpoint() {
        let client = NotifyHubClient::new(NotifyHubConfig::new("test-key")).unwrap();
        assert_eq!(client.base_url(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = NotifyHubClient::new(NotifyHubConfig {
            api_key: "test-key".to_string(),
            base_url: Some("https://staging.notifyhub.com/".to_string()),
        })
        .unwrap();
        assert_eq!(client.base_url(), "https://staging.notifyhub.com");
    }

    #[tokio::test]
    async fn test_send_email() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/v1/notifications/email")
            .match_header("x-api-key", "test-key")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "to": "user@example.com",
                "subject": "Welcome",
                "body": "<h1>Hi</h1>"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "data": {
                        "jobId": "job-1",
                        "status": "pending",
                        "type": "email",
                        "createdAt": "2024-01-01T00:00:00Z"
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let handle = client
            .send_email(&SendEmailOptions {
                to: "user@example.com".to_string(),
                subject: "Welcome".to_string(),
                body: "<h1>Hi</h1>".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(handle.job_id, "job-1");
        assert_eq!(handle.status, JobState::Pending);
        assert_eq!(handle.kind, NotificationType::Email);
    }

    #[tokio::test]
    async fn test_send_email_validation_failure() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/v1/notifications/email")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": ["to is required", "subject is required"]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let error = client
            .send_email(&SendEmailOptions::default())
            .await
            .unwrap_err();

        mock.assert_async().await;
        match error {
            Error::Request(error) => {
                assert!(error.is_status(422));
                assert_eq!(error.message, "Validation failed");
                assert_eq!(
                    error.validation_errors,
                    Some(vec![
                        "to is required".to_string(),
                        "subject is required".to_string()
                    ])
                );
            }
            other => panic!("Expected request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_webhook() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/v1/notifications/webhook")
            .match_body(Matcher::PartialJson(json!({
                "url": "https://example.com/hook",
                "method": "POST"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "data": {
                        "jobId": "job-2",
                        "status": "pending",
                        "type": "webhook",
                        "createdAt": "2024-01-01T00:00:00Z"
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let handle = client
            .send_webhook(&SendWebhookOptions {
                url: "https://example.com/hook".to_string(),
                method: Some(crate::types::WebhookMethod::Post),
                payload: Some(json!({ "orderId": "12345" })),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(handle.kind, NotificationType::Webhook);
    }

    #[tokio::test]
    async fn test_get_job() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/notifications/jobs/job-1")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "data": {
                        "id": "job-1",
                        "type": "email",
                        "status": "failed",
                        "attempts": 3,
                        "errorMessage": "mailbox unavailable",
                        "createdAt": "2024-01-01T00:00:00Z"
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let job = client.get_job("job-1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(job.status, JobState::Failed);
        assert_eq!(job.attempts, 3);
        assert_eq!(job.error_message, Some("mailbox unavailable".to_string()));
        assert_eq!(job.completed_at, None);
    }

    #[tokio::test]
    async fn test_get_job_not_found() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/notifications/jobs/missing")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Job not found"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let error = client.get_job("missing").await.unwrap_err();

        mock.assert_async().await;
        match error {
            Error::Request(error) => {
                assert!(error.is_status(404));
                assert_eq!(error.message, "Job not found");
                assert_eq!(error.validation_errors, None);
            }
            other => panic!("Expected request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_jobs_sends_filters() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/notifications/jobs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".to_string(), "2".to_string()),
                Matcher::UrlEncoded("type".to_string(), "webhook".to_string()),
                Matcher::UrlEncoded("status".to_string(), "failed".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "data": {
                        "data": [
                            {
                                "id": "job-9",
                                "type": "webhook",
                                "status": "failed",
                                "attempts": 5,
                                "createdAt": "2024-01-01T00:00:00Z"
                            }
                        ],
                        "pagination": { "page": 2, "total": 41 }
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let list = client
            .list_jobs(&ListJobsQuery {
                page: Some(2),
                kind: Some(NotificationType::Webhook),
                status: Some(JobState::Failed),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(list.jobs.len(), 1);
        assert_eq!(list.jobs[0].id, "job-9");
        assert_eq!(list.pagination, json!({ "page": 2, "total": 41 }));
    }

    #[tokio::test]
    async fn test_retry_job() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/v1/notifications/jobs/job-1/retry")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "data": {
                        "jobId": "job-1",
                        "status": "pending",
                        "type": "email",
                        "createdAt": "2024-01-02T00:00:00Z"
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let handle = client.retry_job("job-1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(handle.job_id, "job-1");
        assert_eq!(handle.status, JobState::Pending);
    }

    #[tokio::test]
    async fn test_request_domain_verification() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/v1/customers/domain/request")
            .match_body(Matcher::Json(json!({ "domain": "myapp.com" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "domain": "myapp.com",
                    "status": "pending",
                    "dnsRecords": [
                        {
                            "id": 1,
                            "type": "TXT",
                            "host": "_notifyhub.myapp.com",
                            "value": "nh-verify=abc123",
                            "description": "Ownership proof"
                        }
                    ],
                    "instructions": {
                        "message": "Add these records at your DNS provider",
                        "steps": ["Open your DNS console", "Add the records"],
                        "estimatedTime": "up to 24 hours"
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let response = client.request_domain_verification("myapp.com").await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.domain, "myapp.com");
        assert_eq!(response.status, DomainStatus::Pending);
        assert_eq!(response.dns_records.len(), 1);
        assert_eq!(response.dns_records[0].record_type, "TXT");
        assert_eq!(response.instructions.steps.len(), 2);
    }

    #[tokio::test]
    async fn test_verify_domain() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/v1/customers/domain/verify")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "domain": "myapp.com",
                    "verified": false,
                    "message": "TXT record not found yet",
                    "validationResults": { "txt": false }
                }"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let status = client.verify_domain().await.unwrap();

        mock.assert_async().await;
        assert!(!status.verified);
        assert_eq!(status.validation_results, Some(json!({ "txt": false })));
    }

    #[tokio::test]
    async fn test_domain_status() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/customers/domain/status")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "domain": "myapp.com",
                    "verified": true,
                    "status": "verified",
                    "requestedAt": "2024-01-01T00:00:00Z",
                    "verifiedAt": "2024-01-02T00:00:00Z"
                }"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let info = client.domain_status().await.unwrap();

        mock.assert_async().await;
        assert_eq!(info.domain, Some("myapp.com".to_string()));
        assert_eq!(info.status, DomainStatus::Verified);
        assert_eq!(info.verified_at, Some("2024-01-02T00:00:00Z".to_string()));
    }

    #[tokio::test]
    async fn test_remove_domain() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("DELETE", "/api/v1/customers/domain")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Domain configuration removed"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let removal = client.remove_domain().await.unwrap();

        mock.assert_async().await;
        assert_eq!(removal.message, "Domain configuration removed");
    }

    #[tokio::test]
    async fn test_ping() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/ping")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"status": "ok"}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let pong = client.ping().await.unwrap();

        mock.assert_async().await;
        assert_eq!(pong, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_mock_api_substitutes_for_the_client() {
        async fn queued_job_id(api: &dyn NotifyHubApi, options: &SendEmailOptions) -> String {
            api.send_email(options).await.unwrap().job_id
        }

        let mut api = MockNotifyHubApi::new();
        api.expect_send_email().returning(|_| {
            Ok(JobHandle {
                job_id: "job-7".to_string(),
                status: JobState::Pending,
                kind: NotificationType::Email,
                created_at: "2024-01-01T00:00:00Z".to_string(),
            })
        });

        let job_id = queued_job_id(&api, &SendEmailOptions::default()).await;
        assert_eq!(job_id, "job-7");
    }
}
