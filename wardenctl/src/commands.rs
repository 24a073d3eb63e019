use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use tracing::info;
use warden_config::Config;
use warden_core::{
    auth::AuthCrypto,
    database::PostgresDatabase,
    domain::{Actor, CreateUserRequest, User, UserLookup, UserUpdate},
    services::{AccessChecker, CredentialVerifier, UserService},
};
use zeroize::Zeroizing;

use crate::cli::{Command, UserAction, UserRef};

pub async fn run(command: Command, config: &Config) -> Result<ExitCode> {
    let db = connect(config).await?;

    match command {
        Command::Migrate => {
            db.initialize_schema()
                .await
                .context("database migration failed")?;
            info!("database migrations applied");
        }
        Command::Login { login, password } => {
            let password = Zeroizing::new(password.password);
            let verifier = CredentialVerifier::new(
                db.users(),
                db.access(),
                crypto(config)?,
            );
            let user = verifier
                .login(&login, &password)
                .await
                .with_context(|| format!("login failed for '{login}'"))?;
            print_user(&user);
        }
        Command::User { action } => run_user(action, &db, config).await?,
        Command::CheckAccess { user, access } => {
            let checker = AccessChecker::new(db.users(), db.access());
            let granted = checker
                .has_access(user, &access)
                .await
                .context("access check failed")?;
            if granted {
                println!("granted");
            } else {
                println!("denied");
                return Ok(ExitCode::from(1));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_user(
    action: UserAction,
    db: &PostgresDatabase,
    config: &Config,
) -> Result<()> {
    match action {
        UserAction::Get { user } => {
            let service = UserService::new(db.users(), crypto(config)?);
            let found = match user {
                UserRef::Id(id) => service.get(id).await,
                UserRef::Login(login) => match UserLookup::from_login(&login) {
                    UserLookup::Email(email) => service.get_by_email(&email).await,
                    UserLookup::Username(name) => {
                        service.get_by_username(&name).await
                    }
                    UserLookup::Id(id) => service.get(id).await,
                },
            }
            .context("user lookup failed")?;
            print_user(&found);
        }
        UserAction::Create {
            company,
            group,
            username,
            name,
            email,
            region,
            branch,
            password,
            actor,
        } => {
            let service = UserService::new(db.users(), crypto(config)?);
            let created = service
                .create(
                    CreateUserRequest {
                        company_id: company,
                        region_id: region.and_then(|id| id.0),
                        branch_id: branch.and_then(|id| id.0),
                        group_id: group,
                        username,
                        name,
                        email,
                        password: password.password,
                    },
                    Actor(actor.actor),
                )
                .await
                .context("failed to create user")?;
            print_user(&created);
        }
        UserAction::Update {
            id,
            group,
            name,
            region,
            branch,
            actor,
        } => {
            let service = UserService::new(db.users(), crypto(config)?);
            let update = UserUpdate {
                id,
                region_id: region.map(|region| region.0),
                branch_id: branch.map(|branch| branch.0),
                group_id: group,
                name,
            };
            service
                .update(update, Actor(actor.actor))
                .await
                .with_context(|| format!("failed to update user {id}"))?;
            println!("updated {id}");
        }
        UserAction::Delete { id } => {
            let service = UserService::new(db.users(), crypto(config)?);
            service
                .delete(id)
                .await
                .with_context(|| format!("failed to delete user {id}"))?;
            println!("deleted {id}");
        }
        UserAction::Passwd {
            id,
            password,
            actor,
        } => {
            let service = UserService::new(db.users(), crypto(config)?);
            let password = Zeroizing::new(password.password);
            service
                .change_password(id, &password, Actor(actor.actor))
                .await
                .with_context(|| format!("failed to change password for {id}"))?;
            println!("password changed for {id}");
        }
    }

    Ok(())
}

async fn connect(config: &Config) -> Result<PostgresDatabase> {
    let url = config.database.primary_url.as_deref().context(
        "no database URL configured; set DATABASE_URL or database.url",
    )?;
    PostgresDatabase::new(url, config.database.pool_settings())
        .await
        .context("failed to connect to PostgreSQL")
}

fn crypto(config: &Config) -> Result<Arc<AuthCrypto>> {
    let crypto = config
        .auth
        .build_crypto()
        .context("invalid password hashing configuration")?;
    Ok(Arc::new(crypto))
}

fn print_user(user: &User) {
    let optional = |id: Option<uuid::Uuid>| {
        id.map_or_else(|| "-".to_string(), |id| id.to_string())
    };

    println!("id:       {}", user.id);
    println!("username: {}", user.username);
    println!("name:     {}", user.name);
    println!("email:    {}", user.email);
    println!("company:  {}", user.company_id);
    println!("region:   {}", optional(user.region_id));
    println!("branch:   {}", optional(user.branch_id));
    println!("group:    {} ({})", user.group.name, user.group.id);
    if !user.group.access.is_empty() {
        let names: Vec<_> =
            user.group.access.iter().map(|a| a.name.as_str()).collect();
        println!("access:   {}", names.join(", "));
    }
}
