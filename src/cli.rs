use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "readmore",
    about = "Find read-more blocks and pick read-more targets",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List published posts containing the read-more block
    Search {
        /// Start date of the window (YYYY-MM-DD)
        #[arg(long = "date-after")]
        date_after: Option<String>,

        /// End date of the window (YYYY-MM-DD)
        #[arg(long = "date-before")]
        date_before: Option<String>,

        /// Marker to look for instead of the configured one
        #[arg(long)]
        marker: Option<String>,
    },

    /// Serve the content listing API
    Serve,

    /// Interactively search for a post to link to
    Pick {
        /// Base URL of a running `readmore serve`; falls back to config.json, then the local database
        #[arg(short, long)]
        endpoint: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_dates() {
        let cli = Cli::parse_from([
            "readmore",
            "search",
            "--date-after",
            "2024-01-01",
            "--date-before",
            "2024-01-31",
        ]);
        match cli.command {
            Commands::Search { date_after, date_before, marker } => {
                assert_eq!(date_after.as_deref(), Some("2024-01-01"));
                assert_eq!(date_before.as_deref(), Some("2024-01-31"));
                assert!(marker.is_none());
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_pick_endpoint() {
        let cli = Cli::parse_from(["readmore", "pick", "-e", "http://localhost:8180"]);
        assert!(matches!(
            cli.command,
            Commands::Pick { endpoint: Some(ref e) } if e == "http://localhost:8180"
        ));
    }
}
