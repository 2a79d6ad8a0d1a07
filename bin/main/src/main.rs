extern crate tracing as log;

use std::sync::Arc;

use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    FmtSubscriber,
};

pub mod cli;

use cli::{CliOptions, Command};
use client::{Api, HttpApi, RegisterForm};
use config::{Config, ConfigError};
use models::User;
use session::{SessionManager, Stage};
use task_runner::TaskRunner;

async fn load_config(args: &CliOptions) -> anyhow::Result<Config> {
    log::debug!("Loading config from: {}", args.config_path.display());
    let mut config = match Config::load(&args.config_path).await {
        Ok(config) => config,
        Err(ConfigError::IOError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            if args.write_config {
                log::warn!("Config file not found, but `--write-config` given, therefore assuming defaults");

                Config::default()
            } else {
                log::debug!("Config file not found, using defaults");

                Config::default()
            }
        }
        Err(e) => return Err(e.into()),
    };

    log::debug!("Applying environment overrides to configuration");
    config.apply_overrides();

    Ok(config)
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = CliOptions::parse()?;

    let level_filter = match args.verbose {
        None | Some(0) => LevelFilter::INFO,
        Some(1) => LevelFilter::DEBUG,
        Some(2) | _ => LevelFilter::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(level_filter.into())
                .add_directive("hyper::client::pool=info".parse()?)
                .add_directive("hyper::proto=info".parse()?),
        )
        .finish();

    log::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    log::debug!("Arguments: {:?}", args);

    let config = load_config(&args).await?;

    if args.write_config {
        log::info!("Saving config to: {}", args.config_path.display());
        config.save(&args.config_path).await?;

        return Ok(());
    }

    let api = Arc::new(HttpApi::new(&config)?);
    let manager = SessionManager::new(&config, api.clone());

    let Some(command) = args.command else {
        anyhow::bail!("No command given, try `storygrid run` (or `--help`)");
    };

    match command {
        Command::Login(cmd) => {
            let password = password_from(cmd.password)?;

            let resp = manager.login(&cmd.email, &password).await?;

            match resp.user {
                Some(user) => println!("Logged in as {}", user.display_name()),
                None => println!("Logged in"),
            }
        }

        Command::Register(cmd) => {
            let password = password_from(cmd.password)?;

            let resp = api
                .register(&RegisterForm {
                    email: cmd.email,
                    username: cmd.username,
                    password,
                    first_name: cmd.first_name,
                    last_name: cmd.last_name,
                    country: cmd.country,
                })
                .await?;

            if let Some(message) = resp.message {
                println!("{message}");
            }

            match resp.user {
                Some(user) => println!("Registered {}, log in with `storygrid login`", user.display_name()),
                None => println!("Registered, log in with `storygrid login`"),
            }
        }

        Command::Whoami(_) => {
            manager.bootstrap().await;

            match manager.session().user {
                Some(user) => print_user(&user),
                None => println!("Not logged in."),
            }
        }

        Command::Refresh(_) => {
            manager.bootstrap().await;

            if !manager.session().is_authenticated() {
                anyhow::bail!("Not logged in.");
            }

            let user = manager.refresh_profile().await?;
            print_user(&user);
        }

        Command::Logout(_) => {
            manager.logout().await;

            println!("Logged out.");
        }

        Command::Run(cmd) => run(manager, cmd).await?,
    }

    Ok(())
}

fn password_from(arg: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = arg {
        return Ok(password);
    }

    if let Ok(password) = std::env::var("STORYGRID_PASSWORD") {
        return Ok(password);
    }

    anyhow::bail!("No password given, pass `--password` or set STORYGRID_PASSWORD")
}

fn print_user(user: &User) {
    println!("{}", user.display_name());
    println!("  id:      {}", user.id);

    if let Some(ref email) = user.email {
        println!("  email:   {email}");
    }

    if let Some(ref role) = user.role {
        println!("  role:    {role}");
    }

    if let Some(ref country) = user.country {
        println!("  country: {country}");
    }

    if let Some(ref bio) = user.bio {
        println!("  bio:     {bio}");
    }
}

async fn run(manager: SessionManager, _cmd: cli::RunCommand) -> anyhow::Result<()> {
    manager.bootstrap().await;

    let session = manager.session();
    match session.stage {
        Stage::Authenticated => log::info!(
            "Session resumed as {}",
            session.user.as_ref().map_or("<unknown>", |u| u.display_name())
        ),
        _ => log::info!("No active session, log in with `storygrid login`"),
    }

    log::info!("Starting tasks...");
    let runner = TaskRunner::new();
    session::tasks::add_session_tasks(&manager, &runner);

    log::trace!("Setting up shutdown signal for Ctrl+C");
    let shutdown = runner.signal();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        shutdown.stop();
    });

    let mut updates = manager.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let session = updates.borrow_and_update().clone();

            log::info!(
                "Session: {:?} (user: {}, loading: {})",
                session.stage,
                session.user.as_ref().map_or("-", |u| u.display_name()),
                session.is_loading,
            );
        }
    });

    runner.wait().await?;

    Ok(())
}
