use anyhow::{Result, anyhow};
use clap::Parser;
use notifyhub::{
    Error, ListJobsQuery, NotifyHubClient, NotifyHubConfig, SendEmailOptions, SendWebhookOptions,
};
use serde::Serialize;
use std::collections::HashMap;

/// notifyhub - NotifyHub command line client
///
/// Send email and webhook notifications, inspect delivery jobs, and manage
/// sending-domain verification.
///
/// The API key is read from --api-key or the NOTIFYHUB_API_KEY environment
/// variable. Results are printed as JSON on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key used to authenticate against the service
    #[arg(
        long = "api-key",
        env = "NOTIFYHUB_API_KEY",
        value_name = "KEY",
        global = true,
        hide_env_values = true
    )]
    api_key: Option<String>,

    /// Service endpoint (defaults to https://api.notifyhub.com)
    #[arg(
        long = "endpoint",
        env = "NOTIFYHUB_ENDPOINT",
        value_name = "URL",
        global = true
    )]
    endpoint: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check that the service is reachable
    Ping,

    /// Show service metadata
    Info,

    /// Queue an email notification
    SendEmail(SendEmailArgs),

    /// Queue a webhook notification
    SendWebhook(SendWebhookArgs),

    /// Show a delivery job
    GetJob(JobArgs),

    /// List delivery jobs
    ListJobs(ListJobsArgs),

    /// Queue a new delivery attempt for a failed job
    RetryJob(JobArgs),

    /// Request verification for a sending domain
    DomainRequest(DomainRequestArgs),

    /// Ask the service to check the domain's DNS records now
    DomainVerify,

    /// Show the current domain configuration
    DomainStatus,

    /// Remove the domain configuration
    DomainRemove,
}

#[derive(clap::Args, Debug)]
struct SendEmailArgs {
    /// Recipient address
    #[arg(long)]
    to: String,

    /// Subject line
    #[arg(long)]
    subject: String,

    /// HTML or plain-text body
    #[arg(long)]
    body: String,

    /// Sender address (account default when omitted)
    #[arg(long)]
    from: Option<String>,

    /// Deduplication key
    #[arg(long = "idempotency-key", value_name = "KEY")]
    idempotency_key: Option<String>,
}

impl SendEmailArgs {
    fn into_options(self) -> SendEmailOptions {
        SendEmailOptions {
            to: self.to,
            subject: self.subject,
            body: self.body,
            from: self.from,
            idempotency_key: self.idempotency_key,
        }
    }
}

#[derive(clap::Args, Debug)]
struct SendWebhookArgs {
    /// Delivery URL
    #[arg(long)]
    url: String,

    /// HTTP method (GET, POST, PUT, PATCH or DELETE)
    #[arg(long, value_name = "METHOD")]
    method: Option<String>,

    /// JSON payload to deliver
    #[arg(long, value_name = "JSON")]
    payload: Option<String>,

    /// Extra header to forward with the delivery; repeatable
    #[arg(long = "header", value_name = "NAME=VALUE")]
    headers: Vec<String>,

    /// Deduplication key
    #[arg(long = "idempotency-key", value_name = "KEY")]
    idempotency_key: Option<String>,
}

impl SendWebhookArgs {
    fn try_into_options(self) -> Result<SendWebhookOptions> {
        let method = self.method.as_deref().map(str::parse).transpose()?;
        let payload = self
            .payload
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|error| anyhow!("Invalid JSON payload: {}", error))?;
        let headers = if self.headers.is_empty() {
            None
        } else {
            Some(parse_headers(&self.headers)?)
        };

        Ok(SendWebhookOptions {
            url: self.url,
            method,
            payload,
            headers,
            idempotency_key: self.idempotency_key,
        })
    }
}

#[derive(clap::Args, Debug)]
struct JobArgs {
    /// Job identifier
    #[arg(value_name = "JOB_ID")]
    job_id: String,
}

#[derive(clap::Args, Debug)]
struct ListJobsArgs {
    /// Page number
    #[arg(long)]
    page: Option<u32>,

    /// Page size
    #[arg(long)]
    limit: Option<u32>,

    /// Filter by notification type (email or webhook)
    #[arg(long = "type", value_name = "TYPE")]
    kind: Option<String>,

    /// Filter by job status (pending, processing, completed or failed)
    #[arg(long, value_name = "STATUS")]
    status: Option<String>,
}

impl ListJobsArgs {
    fn try_into_query(self) -> Result<ListJobsQuery> {
        Ok(ListJobsQuery {
            page: self.page,
            limit: self.limit,
            kind: self.kind.as_deref().map(str::parse).transpose()?,
            status: self.status.as_deref().map(str::parse).transpose()?,
        })
    }
}

#[derive(clap::Args, Debug)]
struct DomainRequestArgs {
    /// Domain to verify, e.g. "myapp.com"
    #[arg(value_name = "DOMAIN")]
    domain: String,
}

fn parse_headers(raw: &[String]) -> Result<HashMap<String, String>> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
                .filter(|(name, _)| !name.is_empty())
                .ok_or_else(|| anyhow!("Invalid header '{}'. Expected NAME=VALUE.", entry))
        })
        .collect()
}

/// Keeps the status code and validation details visible when a request fails.
fn render(error: Error) -> anyhow::Error {
    match error {
        Error::Request(error) => anyhow!(error.full_message()),
        other => anyhow::Error::new(other),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{}", rendered),
        Err(error) => eprintln!("Failed to render response: {}", error),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let client = NotifyHubClient::new(NotifyHubConfig {
        api_key: cli.api_key.unwrap_or_default(),
        base_url: cli.endpoint,
    })
    .map_err(render)?;

    run(cli.command, &client).await
}

async fn run(command: Commands, client: &NotifyHubClient) -> Result<()> {
    match command {
        Commands::Ping => print_json(&client.ping().await.map_err(render)?),
        Commands::Info => print_json(&client.info().await.map_err(render)?),
        Commands::SendEmail(args) => print_json(
            &client
                .send_email(&args.into_options())
                .await
                .map_err(render)?,
        ),
        Commands::SendWebhook(args) => {
            let options = args.try_into_options()?;
            print_json(&client.send_webhook(&options).await.map_err(render)?)
        }
        Commands::GetJob(args) => {
            print_json(&client.get_job(&args.job_id).await.map_err(render)?)
        }
        Commands::ListJobs(args) => {
            let query = args.try_into_query()?;
            print_json(&client.list_jobs(&query).await.map_err(render)?)
        }
        Commands::RetryJob(args) => {
            print_json(&client.retry_job(&args.job_id).await.map_err(render)?)
        }
        Commands::DomainRequest(args) => print_json(
            &client
                .request_domain_verification(&args.domain)
                .await
                .map_err(render)?,
        ),
        Commands::DomainVerify => print_json(&client.verify_domain().await.map_err(render)?),
        Commands::DomainStatus => print_json(&client.domain_status().await.map_err(render)?),
        Commands::DomainRemove => print_json(&client.remove_domain().await.map_err(render)?),
    }
    Ok(())
}
