//! CLI probe for the greenlight core.
//!
//! # Responsibility
//! - Load configuration from the environment (and `.env`, when present).
//! - Open the configured database, applying pending migrations.
//! - Report core and schema versions for quick local sanity checks.
//! - `register <name> <email> <password>` creates an account through the
//!   configured stores and credential cost.

use greenlight_core::db::migrations::{current_version, latest_version};
use greenlight_core::{
    core_version, init_logging, open_db, CoreConfig, Models, UserService, UserServiceError,
};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "usage: greenlight_cli [register <name> <email> <password>]";

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("greenlight: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let config = CoreConfig::from_env()?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    match args.as_slice() {
        [] => probe(&conn, &config),
        [command, name, email, password] if command == "register" => {
            register(&conn, &config, name, email, password)
        }
        _ => Err(USAGE.into()),
    }
}

fn probe(conn: &Connection, config: &CoreConfig) -> Result<(), Box<dyn Error>> {
    let schema_version = current_version(conn)?;
    info!(
        "event=cli_probe module=cli status=ok db_path={} schema_version={schema_version}",
        config.db_path.display()
    );

    println!("greenlight_core version={}", core_version());
    println!("db_path={}", config.db_path.display());
    println!("schema_version={schema_version} latest={}", latest_version());
    println!("query_timeout_ms={}", config.query_timeout.as_millis());
    Ok(())
}

fn register(
    conn: &Connection,
    config: &CoreConfig,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn Error>> {
    let models = Models::from_config(conn, config);
    let users = UserService::from_config(models.users, config);

    match users.register(name, email, password) {
        Ok(user) => {
            println!("registered user id={} email={}", user.id, user.email);
            Ok(())
        }
        Err(UserServiceError::Validation(errors)) => {
            for (field, message) in &errors {
                eprintln!("{field}: {message}");
            }
            Err("registration rejected".into())
        }
        Err(err) => Err(err.into()),
    }
}
