use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::Duration;
use tracing_subscriber::EnvFilter;
use warden_application::SessionTokenSettings;
use warden_core::AppError;
use warden_domain::{MemberId, SystemPermission};
use warden_infrastructure::MIN_SECRET_LENGTH;

/// What the process does after loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCommand {
    /// Apply migrations, seed and serve HTTP.
    Serve,
    /// Apply migrations and exit.
    Migrate,
    /// Print a non-expiring token carrying only the listed permissions and exit.
    ServiceToken {
        member_id: MemberId,
        permissions: Vec<SystemPermission>,
    },
}

/// Which identity provider verifies sign-in credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProviderKind {
    /// Argon2id hashes stored with members.
    Password,
    /// Every sign-in is rejected.
    Disabled,
}

impl FromStr for IdentityProviderKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "password" => Ok(Self::Password),
            "disabled" => Ok(Self::Disabled),
            other => Err(AppError::Validation(format!(
                "unknown IDENTITY_PROVIDER '{other}', expected 'password' or 'disabled'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    database_url: Option<String>,
    pub identity_provider: IdentityProviderKind,
    pub frontend_url: String,
    pub session_token_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub token_settings: SessionTokenSettings,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = parse_command(env::args().skip(1).collect())?;

        let database_url = database_url_for(&command, env::var("DATABASE_URL").ok())?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let session_token_secret = required_env("SESSION_TOKEN_SECRET")?;
        if session_token_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "SESSION_TOKEN_SECRET must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let access_minutes = optional_number("ACCESS_TOKEN_TTL_MINUTES", 15)?;
        let refresh_days = optional_number("REFRESH_TOKEN_TTL_DAYS", 7)?;
        let access_ttl = Duration::try_minutes(access_minutes)
            .ok_or_else(|| out_of_range("ACCESS_TOKEN_TTL_MINUTES"))?;
        let refresh_ttl = Duration::try_days(refresh_days)
            .ok_or_else(|| out_of_range("REFRESH_TOKEN_TTL_DAYS"))?;
        let token_settings = SessionTokenSettings::new(access_ttl, refresh_ttl)?;

        let identity_provider = env::var("IDENTITY_PROVIDER")
            .map_or(Ok(IdentityProviderKind::Password), |value| value.parse())?;

        Ok(Self {
            command,
            database_url,
            identity_provider,
            frontend_url,
            session_token_secret,
            api_host,
            api_port,
            token_settings,
        })
    }

    pub fn database_url(&self) -> Result<&str, AppError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_command(arguments: Vec<String>) -> Result<ApiCommand, AppError> {
    match arguments.first().map(String::as_str) {
        None => Ok(ApiCommand::Serve),
        Some("migrate") => Ok(ApiCommand::Migrate),
        Some("service-token") => {
            let member_id = arguments
                .get(1)
                .ok_or_else(|| {
                    AppError::Validation("service-token requires a member id".to_owned())
                })?
                .parse::<MemberId>()?;
            let permissions = arguments
                .iter()
                .skip(2)
                .map(|name| name.parse::<SystemPermission>())
                .collect::<Result<Vec<_>, _>>()?;
            if permissions.is_empty() {
                return Err(AppError::Validation(
                    "service-token requires at least one permission".to_owned(),
                ));
            }

            Ok(ApiCommand::ServiceToken {
                member_id,
                permissions,
            })
        }
        Some(other) => Err(AppError::Validation(format!(
            "unknown command '{other}', expected 'migrate' or \
             'service-token <member_id> <permission>...'"
        ))),
    }
}

/// Only commands that touch the database need DATABASE_URL.
fn database_url_for(
    command: &ApiCommand,
    value: Option<String>,
) -> Result<Option<String>, AppError> {
    match (command, value) {
        (_, Some(value)) => Ok(Some(value)),
        (ApiCommand::ServiceToken { .. }, None) => Ok(None),
        (_, None) => Err(AppError::Validation("DATABASE_URL is required".to_owned())),
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_number(name: &str, default: i64) -> Result<i64, AppError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        Err(_) => Ok(default),
    }
}

fn out_of_range(name: &str) -> AppError {
    AppError::Validation(format!("{name} is out of range"))
}
