use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::DEFAULT_CONFIG_PATH;
use crate::params::PwqualityParams;

/// pwquality - manage password quality requirements
#[derive(Parser, Debug)]
#[command(name = "pwquality")]
#[command(about = "Manage password quality requirements in pwquality.conf")]
#[command(version)]
pub struct Cli {
    /// Configuration file to manage
    #[arg(long, global = true, env = "PWQUALITY_CONF", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Dry-run mode: report what would change without backing up or writing.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply password quality parameters to the configuration file
    Apply(ApplyArgs),
    /// Show the current configuration
    Show,
    /// List the parameters pam_pwquality recognizes
    Params,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// JSON file with parameters; explicit flags override its values
    #[arg(long, value_name = "FILE")]
    pub params_file: Option<PathBuf>,

    /// Create a timestamped backup of the file when it is modified
    #[arg(long)]
    pub backup: bool,

    #[command(flatten)]
    pub params: ParamArgs,
}

/// One flag per recognized pwquality parameter
#[derive(Args, Debug, Default)]
pub struct ParamArgs {
    /// Characters in the new password that must not be present in the old one
    #[arg(long, allow_negative_numbers = true)]
    pub difok: Option<i64>,
    /// Minimum acceptable size for the new password
    #[arg(long, allow_negative_numbers = true)]
    pub minlen: Option<i64>,
    /// Maximum credit for digits (negative: minimum number of digits)
    #[arg(long, allow_negative_numbers = true)]
    pub dcredit: Option<i64>,
    /// Maximum credit for uppercase characters (negative: minimum count)
    #[arg(long, allow_negative_numbers = true)]
    pub ucredit: Option<i64>,
    /// Maximum credit for lowercase characters (negative: minimum count)
    #[arg(long, allow_negative_numbers = true)]
    pub lcredit: Option<i64>,
    /// Maximum credit for other characters (negative: minimum count)
    #[arg(long, allow_negative_numbers = true)]
    pub ocredit: Option<i64>,
    /// Minimum number of required character classes
    #[arg(long, allow_negative_numbers = true)]
    pub minclass: Option<i64>,
    /// Maximum number of allowed same consecutive characters (0 disables)
    #[arg(long, allow_negative_numbers = true)]
    pub maxrepeat: Option<i64>,
    /// Maximum number of consecutive characters of the same class
    #[arg(long, allow_negative_numbers = true)]
    pub maxclassrepeat: Option<i64>,
    /// Maximum length of monotonic character sequences (0 disables)
    #[arg(long, allow_negative_numbers = true)]
    pub maxsequence: Option<i64>,
    /// Check for words from the passwd GECOS field (0 disables)
    #[arg(long, allow_negative_numbers = true)]
    pub gecoscheck: Option<i64>,
    /// Check the password against a dictionary
    #[arg(long, value_name = "BOOL")]
    pub dictcheck: Option<bool>,
    /// Check whether the password contains the user name
    #[arg(long, value_name = "BOOL")]
    pub usercheck: Option<bool>,
    /// Comma-separated words that must not be contained in the password
    #[arg(long, value_delimiter = ',', value_name = "WORDS")]
    pub badwords: Option<Vec<String>>,
    /// Path to the cracklib dictionaries
    #[arg(long, value_name = "PATH")]
    pub dictpath: Option<String>,
    /// Length of user name substrings to check for
    #[arg(long, allow_negative_numbers = true)]
    pub usersubstr: Option<i64>,
    /// Reject failing passwords (0 only warns)
    #[arg(long, allow_negative_numbers = true)]
    pub enforcing: Option<i64>,
    /// Number of prompts before returning an error
    #[arg(long, allow_negative_numbers = true)]
    pub retry: Option<i64>,
    /// Enforce the checks for the root user
    #[arg(long, value_name = "BOOL")]
    pub enforce_for_root: Option<bool>,
    /// Skip the checks for users not in /etc/passwd
    #[arg(long, value_name = "BOOL")]
    pub local_users_only: Option<bool>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl ApplyArgs {
    /// Parameters given on the command line, including `--backup`
    pub fn flag_params(&self) -> PwqualityParams {
        let p = &self.params;
        PwqualityParams {
            difok: p.difok,
            minlen: p.minlen,
            dcredit: p.dcredit,
            ucredit: p.ucredit,
            lcredit: p.lcredit,
            ocredit: p.ocredit,
            minclass: p.minclass,
            maxrepeat: p.maxrepeat,
            maxclassrepeat: p.maxclassrepeat,
            maxsequence: p.maxsequence,
            gecoscheck: p.gecoscheck,
            dictcheck: p.dictcheck,
            usercheck: p.usercheck,
            badwords: p.badwords.clone(),
            dictpath: p.dictpath.clone(),
            usersubstr: p.usersubstr,
            enforcing: p.enforcing,
            retry: p.retry,
            enforce_for_root: p.enforce_for_root,
            local_users_only: p.local_users_only,
            backup: self.backup,
        }
    }
}
