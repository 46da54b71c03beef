//! Request and response types for the NotifyHub API.
//!
//! Wire field names are camelCase; enum values match the service's lowercase
//! (job and notification kinds) and uppercase (HTTP methods) spellings.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

/// Kind of notification a job delivers.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Email,
    Webhook,
}

impl FromStr for NotificationType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(NotificationType::Email),
            "webhook" => Ok(NotificationType::Webhook),
            _ => Err(anyhow!(
                "Invalid notification type '{}'. Expected 'email' or 'webhook'.",
                s
            )),
        }
    }
}

/// Lifecycle state of a delivery job, owned and advanced by the service.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl FromStr for JobState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobState::Pending),
            "processing" => Ok(JobState::Processing),
            "completed" => Ok(JobState::Completed),
            "failed" => Ok(JobState::Failed),
            _ => Err(anyhow!(
                "Invalid job status '{}'. Expected 'pending', 'processing', 'completed' or 'failed'.",
                s
            )),
        }
    }
}

/// HTTP method the service uses when delivering a webhook.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum WebhookMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl FromStr for WebhookMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(WebhookMethod::Get),
            "POST" => Ok(WebhookMethod::Post),
            "PUT" => Ok(WebhookMethod::Put),
            "PATCH" => Ok(WebhookMethod::Patch),
            "DELETE" => Ok(WebhookMethod::Delete),
            _ => Err(anyhow!(
                "Invalid webhook method '{}'. Expected GET, POST, PUT, PATCH or DELETE.",
                s
            )),
        }
    }
}

/// Payload for queueing an email notification.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailOptions {
    pub to: String,
    pub subject: String,
    /// HTML or plain-text message body.
    pub body: String,
    /// Sender address; the account default applies when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Deduplication key; resubmitting the same key returns the same job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

/// Payload for queueing a webhook notification.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SendWebhookOptions {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<WebhookMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Extra headers forwarded with the delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

/// Filters for listing delivery jobs.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ListJobsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<NotificationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobState>,
}

/// Identifier returned when a notification is queued or retried.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub job_id: String,
    pub status: JobState,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub created_at: String,
}

/// Snapshot of a delivery job.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub status: JobState,
    pub attempts: u32,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// One page of delivery jobs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct JobList {
    #[serde(rename = "data")]
    pub jobs: Vec<Job>,
    /// Pagination metadata. The service does not guarantee its shape, so it
    /// is passed through as raw JSON.
    #[serde(default)]
    pub pagination: Value,
}

/// Verification state of a sending domain.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    NotConfigured,
    Pending,
    Verified,
}

/// DNS record the customer must publish to verify a domain.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DnsRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub record_type: String,
    pub host: String,
    pub value: String,
    pub description: String,
}

/// Setup guidance returned alongside the DNS records.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainInstructions {
    pub message: String,
    pub steps: Vec<String>,
    pub estimated_time: String,
}

/// Response to a domain verification request.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainVerificationResponse {
    pub domain: String,
    pub status: DomainStatus,
    pub dns_records: Vec<DnsRecord>,
    pub instructions: DomainInstructions,
}

/// Result of a verification attempt.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainStatusResponse {
    pub domain: String,
    pub verified: bool,
    pub message: String,
    #[serde(default)]
    pub validation_results: Option<Value>,
}

/// Current domain configuration for the account.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainInfoResponse {
    pub domain: Option<String>,
    pub verified: bool,
    pub status: DomainStatus,
    #[serde(default)]
    pub dns_records: Option<Value>,
    #[serde(default)]
    pub requested_at: Option<String>,
    #[serde(default)]
    pub verified_at: Option<String>,
}

/// Acknowledgement returned when a domain configuration is removed.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DomainRemoval {
    pub message: String,
}
