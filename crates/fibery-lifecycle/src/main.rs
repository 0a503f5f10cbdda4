use clap::Parser;
use fibery_client::TracingLog;
use fibery_lifecycle::{abort_message, exit_status, telemetry, Cli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init_tracing(&cli.log_level, cli.json_logs);
    let log = TracingLog::shared("fibery-lifecycle");

    let result = cli.run(log.clone()).await;
    match &result {
        Ok(report) => log.success(format_args!(
            "Lifecycle finished: {} row(s) read, database deleted: {}",
            report.rows.len(),
            report.schema_deleted
        )),
        Err(err) => log.error(format_args!("{}: {err:#}", abort_message(err))),
    }

    ExitCode::from(exit_status(&result))
}
