use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cv-relay")]
#[command(about = "Forwards CV email attachments to an HTTP API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the polling loop
    Run,
    /// Check IMAP and API connectivity, then exit
    Health,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_without_subcommand() {
        let cli = Cli::try_parse_from(["cv-relay"]);
        assert!(cli.is_ok());
        assert!(cli.unwrap().command.is_none());
    }

    #[test]
    fn test_cli_health_subcommand() {
        let cli = Cli::try_parse_from(["cv-relay", "health"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Health)));
    }

    #[test]
    fn test_cli_run_subcommand() {
        let cli = Cli::try_parse_from(["cv-relay", "run"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Run)));
    }

    #[test]
    fn test_cli_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["cv-relay", "frobnicate"]).is_err());
    }
}
