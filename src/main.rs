use anyhow::Result;
use clap::Parser;
use esm_versions::commands::{self, ALL_TARGET, CheckOptions, config::ConfigOverrides};
use esm_versions::package::Attribute;

/// esm_versions - inspect and upgrade the esm_tools packages
///
/// Reports the installed version, location and git state of every package of
/// the esm_tools family, upgrades them, or removes user-level installs.
///
/// If the GITHUB_TOKEN environment variable is set, it will be used for
/// authentication against the release API.
///
/// Examples:
///   esm_versions check                       # Report on every package
///   esm_versions upgrade esm_master==6.1.0   # Install a specific version
#[derive(Parser, Debug)]
#[command(author, version = env!("ESM_VERSIONS_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Discover packages from the organization's repositories instead of the built-in list
    #[arg(long = "from-github", global = true)]
    pub from_github: bool,

    /// Python interpreter the packages are installed for (defaults to python3)
    #[arg(
        long = "python",
        env = "ESM_VERSIONS_PYTHON",
        value_name = "PATH",
        global = true
    )]
    pub python: Option<String>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Organization publishing the packages (defaults to esm-tools)
    #[arg(long = "org", value_name = "NAME", global = true)]
    pub organization: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show installed versions, locations and available upgrades
    Check(CheckArgs),

    /// Upgrade one package or all installed ones
    #[command(alias = "update")]
    Upgrade(UpgradeArgs),

    /// Print attributes of a single package
    Get(GetArgs),

    /// Remove user-level installs of all packages
    Clean(CleanArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Only report on this package
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[derive(clap::Args, Debug)]
pub struct UpgradeArgs {
    /// "all", a package name, or name=version / name==version
    #[arg(value_name = "TARGET", default_value = ALL_TARGET)]
    pub target: String,
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Package name
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// Attribute to print; all attributes when omitted
    #[arg(value_name = "ATTRIBUTE", value_enum)]
    pub attribute: Option<Attribute>,
}

#[derive(clap::Args, Debug)]
pub struct CleanArgs {
    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = esm_versions::runtime::RealRuntime;

    let overrides = ConfigOverrides {
        python: cli.python,
        api_url: cli.api_url,
        organization: cli.organization,
        from_github: cli.from_github,
    };
    let config = commands::config::Config::load(&runtime, overrides);

    match cli.command {
        Commands::Check(args) => {
            let options = CheckOptions {
                package: args.package,
                no_color: args.no_color,
            };
            commands::check(runtime, config, options).await?
        }
        Commands::Upgrade(args) => commands::upgrade(runtime, config, &args.target).await?,
        Commands::Get(args) => {
            commands::get(runtime, config, &args.package, args.attribute).await?
        }
        Commands::Clean(args) => commands::clean(runtime, config, args.yes).await?,
    }
    Ok(())
}
