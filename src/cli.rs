use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use time::Duration;

const DEFAULT_AUTH_COOKIE_NAME: &str = "slambook_auth";

pub(crate) enum RunOutcome {
    Serve {
        addr: SocketAddr,
        config: slambook::config::AppConfig,
    },
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    if let Some(Command::AuthKey) = cli.command {
        let code = run_auth_key();
        return RunOutcome::Exit(code);
    }

    let data_root = match cli.data_root.as_ref() {
        Some(root) => root.clone(),
        None => {
            eprintln!("error: --data-root is required unless using a subcommand");
            return RunOutcome::Exit(2);
        }
    };
    if let Err(err) = std::fs::create_dir_all(&data_root) {
        eprintln!("error: failed to create data root: {err}");
        return RunOutcome::Exit(2);
    }
    let data_root = match std::fs::canonicalize(&data_root) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("error: failed to resolve data root: {err}");
            return RunOutcome::Exit(2);
        }
    };

    let auth = match resolve_auth_config(&cli) {
        Ok(auth) => auth,
        Err(err) => {
            eprintln!("error: {err}");
            return RunOutcome::Exit(2);
        }
    };

    RunOutcome::Serve {
        addr: cli.bind,
        config: slambook::config::AppConfig {
            data_root,
            app_name: cli.app_name,
            public_origin: cli.public_origin,
            auth,
        },
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "slambook",
    version,
    about = "Personal slam book server: collect and export friends' answers"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(long)]
    data_root: Option<PathBuf>,
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
    #[arg(long, default_value = "Slam Book")]
    app_name: String,
    /// Origin used in shareable fill links, e.g. https://slam.example.
    #[arg(long, env = "SLAMBOOK_PUBLIC_ORIGIN")]
    public_origin: Option<String>,
    #[arg(long, env = "SLAMBOOK_AUTH_KEY")]
    auth_key: Option<String>,
    #[arg(long, env = "SLAMBOOK_AUTH_TOKEN_TTL")]
    auth_token_ttl: Option<String>,
    #[arg(long, env = "SLAMBOOK_AUTH_COOKIE_NAME")]
    auth_cookie_name: Option<String>,
    #[arg(long, env = "SLAMBOOK_AUTH_COOKIE_SECURE")]
    auth_cookie_secure: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a random base64 auth key and print it.
    AuthKey,
}

fn run_auth_key() -> i32 {
    let secret = match slambook::auth::generate_auth_key() {
        Ok(secret) => secret,
        Err(err) => {
            eprintln!("failed to generate auth key: {err}");
            return 1;
        }
    };
    println!("{secret}");
    0
}

fn resolve_auth_config(cli: &Cli) -> Result<slambook::config::AuthConfig, String> {
    let key = match cli.auth_key.as_deref() {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err("auth key cannot be empty".to_string());
            }
            Some(trimmed.to_string())
        }
        None => None,
    };

    if let Some(name) = cli.auth_cookie_name.as_deref()
        && name.trim().is_empty()
    {
        return Err("auth cookie name cannot be empty".to_string());
    }

    let token_ttl = match cli.auth_token_ttl.as_deref() {
        Some(raw) => parse_auth_token_ttl(raw)?,
        None => default_auth_token_ttl(),
    };
    let cookie_name = cli
        .auth_cookie_name
        .as_deref()
        .map(|name| name.trim().to_string())
        .unwrap_or_else(|| DEFAULT_AUTH_COOKIE_NAME.to_string());

    Ok(slambook::config::AuthConfig {
        key,
        token_ttl,
        cookie_name,
        cookie_secure: cli.auth_cookie_secure,
    })
}

fn default_auth_token_ttl() -> Duration {
    Duration::days(14)
}

fn parse_auth_token_ttl(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("auth token ttl cannot be empty".to_string());
    }

    let (amount, unit) = match value.chars().last() {
        Some(ch) if ch.is_ascii_alphabetic() => {
            (&value[..value.len() - 1], ch.to_ascii_lowercase())
        }
        _ => (value, 's'),
    };

    let amount: i64 = amount
        .parse()
        .map_err(|_| format!("invalid auth token ttl '{value}'; expected <number>[s|m|h|d]"))?;

    if amount <= 0 {
        return Err("auth token ttl must be greater than 0".to_string());
    }

    match unit {
        's' => Ok(Duration::seconds(amount)),
        'm' => Ok(Duration::minutes(amount)),
        'h' => Ok(Duration::hours(amount)),
        'd' => Ok(Duration::days(amount)),
        _ => Err(format!(
            "invalid auth token ttl '{value}'; expected <number>[s|m|h|d]"
        )),
    }
}
