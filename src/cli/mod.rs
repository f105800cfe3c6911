// Command line interface
// One subcommand per service, plus configuration validation

pub mod commands;

use clap::{Args, Parser, Subcommand};
use colored::*;

/// Marketplace services: two in-memory backends and two stateless frontends
#[derive(Parser)]
#[command(name = "marketplace")]
#[command(version)]
#[command(about = "Distributed marketplace services over line-delimited JSON on TCP", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every service subcommand
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Configuration file path (defaults apply when it does not exist)
    #[arg(short, long, default_value = "marketplace.toml")]
    pub config: String,

    /// Listen address, overriding the configuration and environment
    #[arg(short, long)]
    pub bind: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Customer Database (accounts, sessions, ratings)
    CustomerDb(ServiceArgs),

    /// Run the Product Database (items, search, carts)
    ProductDb(ServiceArgs),

    /// Run the Seller Server frontend
    SellerServer(ServiceArgs),

    /// Run the Buyer Server frontend
    BuyerServer(ServiceArgs),

    /// Validate a configuration file with environment overrides applied
    Validate {
        #[arg(short, long, default_value = "marketplace.toml")]
        file: String,
    },
}

impl Commands {
    /// Whether this command runs a long-lived service
    pub fn is_service(&self) -> bool {
        !matches!(self, Commands::Validate { .. })
    }
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}

/// One-line startup banner
pub fn print_banner(service: &str, addr: &str) {
    println!(
        "{} {} {}",
        "marketplace".bright_cyan().bold(),
        service.bright_white().bold(),
        format!("listening on {}", addr).cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_subcommands() {
        let cli = Cli::parse_from(["marketplace", "customer-db", "--bind", "127.0.0.1:9000"]);
        match cli.command {
            Commands::CustomerDb(args) => {
                assert_eq!(args.bind.as_deref(), Some("127.0.0.1:9000"));
                assert_eq!(args.config, "marketplace.toml");
            }
            _ => panic!("expected customer-db"),
        }

        let cli = Cli::parse_from(["marketplace", "buyer-server", "-c", "prod.toml"]);
        assert!(cli.command.is_service());
    }

    #[test]
    fn test_validate_is_not_a_service() {
        let cli = Cli::parse_from(["marketplace", "validate", "--file", "x.toml"]);
        assert!(!cli.command.is_service());
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["marketplace", "start"]).is_err());
    }
}
