use std::path::PathBuf;

/// StoryGrid client
#[derive(Debug, argh::FromArgs)]
pub struct CliOptions {
    /// print version information and exit
    #[argh(switch, short = 'V')]
    pub version: bool,

    /// logging level (0 = Info, 1 = Debug, 2 = Trace) [env STORYGRID_VERBOSE]
    #[argh(option, short = 'v')]
    pub verbose: Option<u8>,

    /// path to the configuration file
    #[argh(option, short = 'c', default = "PathBuf::from(\"storygrid.toml\")")]
    pub config_path: PathBuf,

    /// write out the default configuration when no config file is found
    #[argh(switch)]
    pub write_config: bool,

    #[argh(subcommand)]
    pub command: Option<Command>,
}

impl CliOptions {
    pub fn parse() -> Result<Self, anyhow::Error> {
        let mut args: CliOptions = argh::from_env();

        if args.version {
            println!("StoryGrid client {}", env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }

        if args.verbose.is_none() {
            if let Ok(verbose) = std::env::var("STORYGRID_VERBOSE") {
                args.verbose = verbose.parse().ok();
            }
        }

        Ok(args)
    }
}

#[derive(Debug, argh::FromArgs)]
#[argh(subcommand)]
pub enum Command {
    Login(LoginCommand),
    Register(RegisterCommand),
    Whoami(WhoamiCommand),
    Refresh(RefreshCommand),
    Logout(LogoutCommand),
    Run(RunCommand),
}

/// log in and persist the session
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "login")]
pub struct LoginCommand {
    /// account email
    #[argh(option)]
    pub email: String,

    /// account password [env STORYGRID_PASSWORD]
    #[argh(option)]
    pub password: Option<String>,
}

/// create a new account
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "register")]
pub struct RegisterCommand {
    /// account email
    #[argh(option)]
    pub email: String,

    /// public username
    #[argh(option)]
    pub username: String,

    /// account password [env STORYGRID_PASSWORD]
    #[argh(option)]
    pub password: Option<String>,

    /// given name
    #[argh(option)]
    pub first_name: Option<String>,

    /// family name
    #[argh(option)]
    pub last_name: Option<String>,

    /// country code
    #[argh(option)]
    pub country: Option<String>,
}

/// show the currently authenticated user
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "whoami")]
pub struct WhoamiCommand {}

/// re-fetch the authenticated user's profile
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "refresh")]
pub struct RefreshCommand {}

/// end the session and clear stored credentials
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "logout")]
pub struct LogoutCommand {}

/// stay resident, revalidating the session periodically
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "run")]
pub struct RunCommand {}
