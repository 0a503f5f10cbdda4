//! Fixed lifecycle sequence
//!
//! verify -> create database -> add records -> read records ->
//! delete records -> delete database
//!
//! Every step aborts the run on error except database creation returning
//! `false` and the final database deletion. Records are identified by the
//! plan's identity keys, whatever the client was built with.

use crate::pause::pause;
use crate::plan::LifecyclePlan;
use crate::table::render_table;
use fibery_client::{result_rows, FiberyClient, FiberyResult, LogSink, Transport};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Exit status of a completed run
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status of an aborted run
pub const EXIT_FAILURE: u8 = 1;

/// Knobs that do not change what is sent
#[derive(Debug, Clone, Copy)]
pub struct LifecycleOptions {
    /// Cosmetic pause between steps
    pub step_delay: Duration,
    /// Log retrieved rows as a table
    pub show_table: bool,
    /// Read back the field list after creating the database
    pub describe_fields: bool,
}

impl LifecycleOptions {
    /// No pause, no table, no field read-back
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            step_delay: Duration::ZERO,
            show_table: false,
            describe_fields: false,
        }
    }

    /// With step delay
    #[must_use]
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// With field read-back
    #[must_use]
    pub fn with_describe_fields(mut self, enabled: bool) -> Self {
        self.describe_fields = enabled;
        self
    }

    /// With table output
    #[must_use]
    pub fn with_table(mut self, enabled: bool) -> Self {
        self.show_table = enabled;
        self
    }
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_secs(5),
            show_table: true,
            describe_fields: false,
        }
    }
}

/// What a completed run observed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifecycleReport {
    /// Database created or already present
    pub schema_ready: bool,
    /// Field read-back, empty unless requested
    pub fields: IndexMap<String, String>,
    /// Raw add response
    pub added: Value,
    /// Rows returned by the read step
    pub rows: Vec<Value>,
    /// Raw delete response
    pub deleted: Value,
    /// Database deletion succeeded
    pub schema_deleted: bool,
}

/// Runs a plan against one client
pub struct Lifecycle<T: Transport> {
    client: FiberyClient<T>,
    log: Arc<dyn LogSink>,
    options: LifecycleOptions,
}

impl<T: Transport> Lifecycle<T> {
    /// Create runner
    pub fn new(client: FiberyClient<T>, log: Arc<dyn LogSink>, options: LifecycleOptions) -> Self {
        Self {
            client,
            log,
            options,
        }
    }

    /// Run every step of `plan`
    pub async fn run(&self, plan: &LifecyclePlan) -> FiberyResult<LifecycleReport> {
        let app = plan.app.as_str();
        let schema = plan.schema.as_str();
        let log = self.log.as_ref();
        let mut report = LifecycleReport::default();

        log.info(format_args!("# Check connection in app {app}"));
        self.client.verify().await?;
        log.success(format_args!("Connection success"));

        log.info(format_args!(
            "# Start proccess create database {schema} in app {app}"
        ));
        report.schema_ready = self.client.create_schema(app, schema, &plan.fields).await?;
        if report.schema_ready {
            log.debug(format_args!(
                "Database {schema} exists in the application {app}"
            ));
            if self.options.describe_fields {
                self.describe_fields(app, schema, &mut report).await;
            }
        } else {
            log.warning(format_args!(
                "Database {schema} state unknown, continuing"
            ));
        }

        self.pause().await;
        log.info(format_args!("# Add data to database {schema} in app {app}"));
        report.added = self
            .client
            .add_records_keyed(app, schema, &plan.records_to_add, &plan.identity_keys)
            .await?;
        log.debug(format_args!("{}", report.added));

        self.pause().await;
        log.info(format_args!(
            "# Return data from database {schema} in app {app}"
        ));
        let read = self
            .client
            .query_records_limited(
                app,
                schema,
                plan.field_names().as_slice(),
                plan.query_limit(),
            )
            .await?;
        log.debug(format_args!("{read}"));
        report.rows = result_rows(&read).to_vec();
        if self.options.show_table {
            log.success(format_args!(
                "Data of the database {schema}: \n{}",
                render_table(&report.rows)
            ));
        }

        self.pause().await;
        log.info(format_args!(
            "# Delete data to database {schema} in app {app}"
        ));
        report.deleted = self
            .client
            .delete_records_keyed(app, schema, &plan.records_to_delete, &plan.identity_keys)
            .await?;
        log.debug(format_args!("{}", report.deleted));

        self.pause().await;
        log.info(format_args!("# Delete the database {schema} in app {app}"));
        report.schema_deleted = self.client.delete_schema(app, schema).await;
        log.debug(format_args!(
            "Delete the database {schema} in app {app}. Result {}.",
            report.schema_deleted
        ));

        Ok(report)
    }

    async fn describe_fields(&self, app: &str, schema: &str, report: &mut LifecycleReport) {
        match self.client.list_fields(app, schema).await {
            Ok(fields) => {
                self.log.debug(format_args!(
                    "List of field names and types in the database {schema}: {fields:?}"
                ));
                report.fields = fields;
            }
            Err(err) => {
                self.log
                    .warning(format_args!("Could not read fields of {schema}: {err}"));
            }
        }
    }

    async fn pause(&self) {
        pause(self.options.step_delay, self.log.as_ref()).await;
    }
}

/// Process exit status for a run result
#[must_use]
pub fn exit_status<T, E>(result: &Result<T, E>) -> u8 {
    if result.is_ok() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status_maps_result() {
        assert_eq!(exit_status::<(), ()>(&Ok(())), 0);
        assert_eq!(exit_status::<(), ()>(&Err(())), 1);
    }

    #[test]
    fn quiet_options_skip_cosmetics() {
        let options = LifecycleOptions::quiet();
        assert!(options.step_delay.is_zero());
        assert!(!options.show_table);
        assert!(!options.describe_fields);
        assert!(LifecycleOptions::default().show_table);
    }
}
