//! Fibery Lifecycle - scripted database lifecycle against a Fibery workspace
//!
//! Runs a fixed sequence through [`fibery_client::FiberyClient`]:
//! 1. Verify the endpoint and token
//! 2. Create the database (an existing one is reused)
//! 3. Add records in one batch
//! 4. Read them back
//! 5. Delete records in one batch
//! 6. Delete the database
//!
//! # Example
//!
//! ```rust,ignore
//! use fibery_lifecycle::{Lifecycle, LifecycleOptions, LifecyclePlan};
//!
//! let report = Lifecycle::new(client, log, LifecycleOptions::default())
//!     .run(&LifecyclePlan::demo())
//!     .await?;
//! ```

#![warn(unreachable_pub)]

pub mod cli;
pub mod lifecycle;
pub mod pause;
pub mod plan;
pub mod table;
pub mod telemetry;

// Re-exports for convenience
pub use cli::{abort_message, Cli};
pub use lifecycle::{
    exit_status, Lifecycle, LifecycleOptions, LifecycleReport, EXIT_FAILURE, EXIT_SUCCESS,
};
pub use plan::LifecyclePlan;
pub use table::render_table;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
