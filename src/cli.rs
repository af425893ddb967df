use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use url::Url;

use crate::catalog::FilterSelection;
use crate::retriever::{
    CatalogConfig, DEFAULT_API_URL, DEFAULT_RELAY_PATH_BASE, DEFAULT_RELAY_QUERY_BASE,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Human,
    Json,
    Html,
}

#[derive(Debug, Parser)]
#[command(
    name = "f2p-catalog",
    version,
    about = "Browse the free-to-play games catalog by platform and genre"
)]
pub struct Cli {
    #[arg(long, global = true, value_enum, default_value_t = OutputFormatArg::Human)]
    pub format: OutputFormatArg,
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub json: bool,
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    #[arg(long, global = true, default_value = DEFAULT_API_URL)]
    pub api_url: Url,
    #[arg(long, global = true, default_value = DEFAULT_RELAY_PATH_BASE)]
    pub relay_path_base: String,
    #[arg(long, global = true, default_value = DEFAULT_RELAY_QUERY_BASE)]
    pub relay_query_base: Url,
    #[arg(long, global = true, default_value_t = 10)]
    pub callback_timeout_sec: u64,
    #[arg(long, global = true, default_value_t = 500)]
    pub sample_delay_ms: u64,
}

impl SourceArgs {
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig {
            api_url: self.api_url.clone(),
            relay_path_base: self.relay_path_base.clone(),
            relay_query_base: self.relay_query_base.clone(),
            callback_timeout: Duration::from_secs(self.callback_timeout_sec),
            sample_delay: Duration::from_millis(self.sample_delay_ms),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load the catalog and print one filtered view.
    List(FilterArgs),
    /// Load the catalog and print the category options.
    Genres,
    /// Load the catalog, then change filters interactively from stdin.
    Browse(FilterArgs),
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Substring of the platform, e.g. "PC" or "Browser".
    #[arg(long)]
    pub platform: Option<String>,
    /// Exact genre name.
    #[arg(long)]
    pub category: Option<String>,
}

impl FilterArgs {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection::new(self.platform.as_deref(), self.category.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Html,
}

impl Cli {
    pub fn resolved_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            match self.format {
                OutputFormatArg::Human => OutputFormat::Human,
                OutputFormatArg::Json => OutputFormat::Json,
                OutputFormatArg::Html => OutputFormat::Html,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_public_endpoints() {
        let cli = Cli::try_parse_from(["f2p-catalog", "list"]).unwrap();
        let config = cli.source.config();

        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.callback_timeout, Duration::from_secs(10));
        assert_eq!(config.sample_delay, Duration::from_millis(500));
        assert_eq!(cli.resolved_format(), OutputFormat::Human);
    }

    #[test]
    fn json_flag_wins_over_format() {
        let cli = Cli::try_parse_from(["f2p-catalog", "--format", "html", "genres", "--json"])
            .unwrap();
        assert_eq!(cli.resolved_format(), OutputFormat::Json);
    }

    #[test]
    fn list_filters_become_a_selection() {
        let cli = Cli::try_parse_from(["f2p-catalog", "list", "--category", "Shooter"]).unwrap();
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.selection(), FilterSelection::new(None, Some("Shooter")));
    }

    #[test]
    fn bad_api_url_is_rejected() {
        assert!(Cli::try_parse_from(["f2p-catalog", "--api-url", "not a url", "list"]).is_err());
    }
}
