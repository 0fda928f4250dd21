//! pwquality-conf library
//!
//! Reconciles `/etc/security/pwquality.conf` against a desired set of password
//! quality parameters, rewriting only the lines that need to change.

pub mod backup;
pub mod cli;
pub mod engine;
pub mod error;
pub mod params;
pub mod parser;
pub mod reconcile;
pub mod writer;

// Re-export main types for convenience
pub use engine::{
    ApplyOptions, DEFAULT_CONFIG_PATH, PassState, Plan, ReconciliationResult, plan,
    reconcile_file,
};
pub use error::{ErrorKind, PwqualityError};
pub use params::{DesiredParameters, ParamValue, PwqualityParams};
pub use parser::{ConfigLine, CurrentConfig, LineKind, ParsedConfig, parse, read_config};
pub use reconcile::{ChangeSet, reconcile};
pub use writer::rewrite;
