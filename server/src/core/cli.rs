use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DEBUG, ENV_HOST, ENV_NO_AUTH, ENV_ORGANIZATION, ENV_PORT, ENV_TEMPLATE_PATH,
};

#[derive(Parser)]
#[command(name = "weims")]
#[command(version, about = "Equipment inventory reporting server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Disable proxy authentication and act as a local superadmin (for development)
    #[arg(long, global = true, env = ENV_NO_AUTH)]
    pub no_auth: bool,

    /// Enable debug logging of report queries
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Word template used for Word exports and PDF branding
    #[arg(long, global = true, env = ENV_TEMPLATE_PATH)]
    pub template: Option<PathBuf>,

    /// Organization name shown on exports
    #[arg(long, global = true, env = ENV_ORGANIZATION)]
    pub organization: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Insert the default equipment categories and statuses
    Seed,
    /// Write a default branded Word template to the configured template path
    InitTemplate {
        /// Overwrite an existing template
        #[arg(short, long)]
        force: bool,
    },
    /// Delete local data directory (database, templates). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub no_auth: bool,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub organization: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        no_auth: cli.no_auth,
        debug: cli.debug,
        config: cli.config,
        template: cli.template,
        organization: cli.organization,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_system_commands() {
        let cli = Cli::try_parse_from(["weims", "system", "init-template", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::System {
                command: SystemCommands::InitTemplate { force: true }
            })
        ));

        let cli = Cli::try_parse_from(["weims", "system", "seed"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::System {
                command: SystemCommands::Seed
            })
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["weims", "start", "--port", "8080", "--no-auth"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Start)));
        assert_eq!(cli.port, Some(8080));
        assert!(cli.no_auth);
    }
}
