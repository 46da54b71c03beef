//! Client SDK for the NotifyHub notification API.
//!
//! Wraps the hosted service (email/webhook dispatch, job status polling,
//! domain verification) with typed request/response shapes and one normalized
//! error type. The service has shipped several response envelope and error
//! body shapes over time; this crate collapses all of them into a single
//! contract, so callers only ever see a typed payload or a [`NotifyHubError`].
//!
//! ```no_run
//! use notifyhub::{NotifyHubClient, SendEmailOptions};
//!
//! #[tokio::main]
//! async fn main() -> notifyhub::Result<()> {
//!     let client = NotifyHubClient::from_env()?;
//!
//!     let job = client
//!         .send_email(&SendEmailOptions {
//!             to: "user@example.com".to_string(),
//!             subject: "Welcome to MyApp!".to_string(),
//!             body: "<h1>Welcome!</h1><p>Thanks for signing up.</p>".to_string(),
//!             idempotency_key: Some("user-123-welcome".to_string()),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("Email queued: {}", job.job_id);
//!
//!     let status = client.get_job(&job.job_id).await?;
//!     println!("Job status: {:?}", status.status);
//!     Ok(())
//! }
//! ```
//!
//! Failed calls carry the HTTP status, the raw body, and any per-field
//! validation messages the service reported:
//!
//! ```no_run
//! # async fn example(client: &notifyhub::NotifyHubClient) {
//! use notifyhub::Error;
//!
//! match client.get_job("job-1").await {
//!     Ok(job) => println!("{:?}", job.status),
//!     Err(Error::Request(error)) if error.is_status(404) => println!("no such job"),
//!     Err(error) => eprintln!("{}", error),
//! }
//! # }
//! ```

pub mod client;
pub mod error;
pub mod response;
pub mod types;

pub use client::{DEFAULT_ENDPOINT, NotifyHubApi, NotifyHubClient, NotifyHubConfig};
pub use error::{Error, NotifyHubError, Result};
pub use response::unwrap_response;
pub use types::{
    DnsRecord, DomainInfoResponse, DomainInstructions, DomainRemoval, DomainStatus,
    DomainStatusResponse, DomainVerificationResponse, Job, JobHandle, JobList, JobState,
    ListJobsQuery, NotificationType, SendEmailOptions, SendWebhookOptions, WebhookMethod,
};
