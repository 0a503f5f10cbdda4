//! Command line and environment configuration

use crate::lifecycle::{Lifecycle, LifecycleOptions, LifecycleReport};
use crate::plan::LifecyclePlan;
use anyhow::Context;
use clap::Parser;
use fibery_client::{ClientConfig, FiberyClient, FiberyError, LogSink};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Provision a Fibery database, populate it, read it back and tear it down
#[derive(Debug, Parser)]
#[command(name = "fibery-lifecycle", version, about)]
pub struct Cli {
    /// Fibery commands endpoint
    #[arg(long, env = "API_FIBERY_URL")]
    pub url: Option<String>,

    /// Fibery API token
    #[arg(long, env = "API_FIBERY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "API_FIBERY_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// JSON plan file; the built-in employee dataset is used when absent
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Owning application, overrides the plan
    #[arg(long)]
    pub app: Option<String>,

    /// Database name, overrides the plan
    #[arg(long)]
    pub schema: Option<String>,

    /// Pause between steps in seconds
    #[arg(long, default_value_t = 5)]
    pub step_delay_secs: u64,

    /// Read back the field list after creating the database
    #[arg(long)]
    pub describe_fields: bool,

    /// Do not log retrieved rows as a table
    #[arg(long)]
    pub no_table: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Client configuration from flags and environment
    #[must_use]
    pub fn client_config(&self, plan: &LifecyclePlan) -> ClientConfig {
        ClientConfig::new(
            self.url.clone().unwrap_or_default(),
            self.token.clone().unwrap_or_default(),
        )
        .with_timeout(Duration::from_secs(self.timeout_secs))
        .with_identity_keys(plan.identity_keys.clone())
    }

    /// Plan file or built-in dataset, with overrides applied
    pub fn plan(&self) -> anyhow::Result<LifecyclePlan> {
        let mut plan = match &self.plan {
            Some(path) => LifecyclePlan::from_path(path)?,
            None => LifecyclePlan::demo(),
        };
        if let Some(app) = &self.app {
            plan = plan.with_app(app.clone());
        }
        if let Some(schema) = &self.schema {
            plan = plan.with_schema(schema.clone());
        }
        Ok(plan)
    }

    /// Step options
    #[must_use]
    pub fn options(&self) -> LifecycleOptions {
        LifecycleOptions::default()
            .with_step_delay(Duration::from_secs(self.step_delay_secs))
            .with_describe_fields(self.describe_fields)
            .with_table(!self.no_table)
    }

    /// Run the whole lifecycle over HTTP
    pub async fn run(&self, log: Arc<dyn LogSink>) -> anyhow::Result<LifecycleReport> {
        let plan = self.plan()?;
        let config = self.client_config(&plan);
        let client = FiberyClient::connect(&config, log.clone())
            .context("API_FIBERY_URL and API_FIBERY_TOKEN environment variables are required")?;

        let report = Lifecycle::new(client, log, self.options())
            .run(&plan)
            .await?;
        Ok(report)
    }
}

/// Log wording for an aborted run; input errors point at the plan
#[must_use]
pub fn abort_message(err: &anyhow::Error) -> &'static str {
    let rejected_input = err
        .downcast_ref::<FiberyError>()
        .is_some_and(FiberyError::is_input_error);
    if rejected_input {
        "Lifecycle aborted, check the plan"
    } else {
        "Lifecycle aborted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fibery-lifecycle").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn flags_override_plan() {
        let cli = parse(&[
            "--url",
            "https://acme.fibery.io/api/commands",
            "--token",
            "t",
            "--app",
            "Ops",
            "--schema",
            "Staff",
            "--step-delay-secs",
            "0",
            "--no-table",
        ]);
        let plan = cli.plan().unwrap();
        assert_eq!(plan.app, "Ops");
        assert_eq!(plan.schema, "Staff");

        let options = cli.options();
        assert!(options.step_delay.is_zero());
        assert!(!options.show_table);

        let config = cli.client_config(&plan);
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_credentials_fail_validation() {
        let cli = Cli {
            url: None,
            token: None,
            timeout_secs: 30,
            plan: None,
            app: None,
            schema: None,
            step_delay_secs: 0,
            describe_fields: false,
            no_table: true,
            log_level: "info".to_string(),
            json_logs: false,
        };
        let plan = cli.plan().unwrap();
        assert!(cli.client_config(&plan).validate().is_err());
    }

    #[test]
    fn abort_message_points_at_plan_for_input_errors() {
        let input = anyhow::Error::from(FiberyError::NoValidEntities);
        assert_eq!(abort_message(&input), "Lifecycle aborted, check the plan");

        let remote = anyhow::Error::from(FiberyError::Api("500: boom".to_string()));
        assert_eq!(abort_message(&remote), "Lifecycle aborted");
    }
}
