use std::{convert::Infallible, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "wardenctl", version)]
#[command(about = "Manage Warden user accounts and check access grants")]
pub struct Cli {
    /// Path to warden.toml (defaults to ./warden.toml or ./config/warden.toml)
    #[arg(long, global = true, env = "WARDEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Env file to load before reading the environment
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply the embedded database migrations
    Migrate,
    /// Verify a password and print the account with its access grants
    Login {
        /// Username, or email when it contains '@'
        login: String,
        #[command(flatten)]
        password: PasswordArg,
    },
    /// Look up and administer user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Check whether a user holds an access grant (exit status 1 when denied)
    CheckAccess {
        /// User id
        user: Uuid,
        /// Access name, either `scope` or `scope::action`
        access: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Show one account by id, username or email
    Get {
        /// A UUID, an email (contains '@') or a username
        user: UserRef,
    },
    /// Create an account
    Create {
        #[arg(long)]
        company: Uuid,
        #[arg(long)]
        group: Uuid,
        #[arg(long)]
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Region id; an empty value stores no region
        #[arg(long)]
        region: Option<OptionalId>,
        /// Branch id; an empty value stores no branch
        #[arg(long)]
        branch: Option<OptionalId>,
        #[command(flatten)]
        password: PasswordArg,
        #[command(flatten)]
        actor: ActorArg,
    },
    /// Change group, name, region or branch. Omitted fields keep their value
    Update {
        id: Uuid,
        #[arg(long)]
        group: Option<Uuid>,
        #[arg(long)]
        name: Option<String>,
        /// New region id; pass an empty value to clear it
        #[arg(long)]
        region: Option<OptionalId>,
        /// New branch id; pass an empty value to clear it
        #[arg(long)]
        branch: Option<OptionalId>,
        #[command(flatten)]
        actor: ActorArg,
    },
    /// Delete an account
    Delete { id: Uuid },
    /// Replace an account's password
    Passwd {
        id: Uuid,
        #[command(flatten)]
        password: PasswordArg,
        #[command(flatten)]
        actor: ActorArg,
    },
}

#[derive(Args, Debug)]
pub struct PasswordArg {
    /// Plaintext password
    #[arg(long, env = "WARDEN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct ActorArg {
    /// Id of the user performing the change, recorded as `updated_by`
    #[arg(long, env = "WARDEN_ACTOR")]
    pub actor: Uuid,
}

/// A UUID argument where an empty string means "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalId(pub Option<Uuid>);

impl FromStr for OptionalId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self(None));
        }
        Uuid::parse_str(raw).map(|id| Self(Some(id)))
    }
}

/// How `user get` interprets its argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Id(Uuid),
    Login(String),
}

impl FromStr for UserRef {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match Uuid::parse_str(raw.trim()) {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Login(raw.trim().to_string()),
        })
    }
}
