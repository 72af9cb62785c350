//! CLI runner - executes commands

use std::env;
use std::path::Path;

use tracing::info;

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::{ListOptions, PageClient};
use crate::config::{ClientConfig, FileConfig};
use crate::error::{Error, Result};
use crate::output::{render_csv, render_json, render_jsonl, render_pretty, write_rendered};
use crate::types::{AccessToken, TimeBound};

/// Environment variable consulted when no token is given explicitly
pub const TOKEN_ENV_VAR: &str = "PAGEFEED_TOKEN";

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Posts {
                page,
                count,
                since,
                until,
                feed,
                reactions,
                api_version,
                format,
                output,
            } => {
                let opts = ListOptions {
                    count: *count,
                    since: since.as_deref().map(TimeBound::from),
                    until: until.as_deref().map(TimeBound::from),
                    include_feed: *feed,
                    with_reactions: *reactions,
                    verbose: true,
                    api_version: api_version.clone(),
                };
                self.posts(page, &opts, *format, output.as_deref()).await
            }
            Commands::Check { page, api_version } => {
                self.check(page, api_version.as_deref()).await
            }
        }
    }

    /// Fetch posts and write the table
    async fn posts(
        &self,
        page: &str,
        opts: &ListOptions,
        format: OutputFormat,
        output: Option<&Path>,
    ) -> Result<()> {
        let client = self.build_client(None)?;
        let records = client.list_posts(page, opts).await?;

        let rendered = match format {
            OutputFormat::Jsonl => render_jsonl(&records)?,
            OutputFormat::Json => render_json(&records)?,
            OutputFormat::Csv => render_csv(&records),
            OutputFormat::Pretty => render_pretty(&records),
        };
        write_rendered(&rendered, output)?;

        if let Some(path) = output {
            info!("Wrote {} posts to {}", records.len(), path.display());
        }
        Ok(())
    }

    /// Probe the page and report the outcome
    async fn check(&self, page: &str, api_version: Option<&str>) -> Result<()> {
        let client = self.build_client(api_version)?;
        let result = client.check(page).await;

        println!("{}", serde_json::to_string_pretty(&result)?);

        if let Some(message) = result.message {
            return Err(Error::Other(format!(
                "Check failed for '{page}': {message}"
            )));
        }
        Ok(())
    }

    /// Assemble a client from the settings file, flags, and environment
    fn build_client(&self, api_version: Option<&str>) -> Result<PageClient> {
        let file = self.load_file_config()?;
        let token = self.resolve_token(file.as_ref())?;

        let mut config = ClientConfig::default();
        if let Some(file) = &file {
            config = file.apply_to(config);
        }
        if let Some(version) = api_version {
            config.api_version = Some(version.to_string());
        }
        config.validate()?;

        Ok(PageClient::new(config, token))
    }

    /// Load the optional settings file
    fn load_file_config(&self) -> Result<Option<FileConfig>> {
        match &self.cli.config {
            Some(path) => Ok(Some(FileConfig::from_yaml_file(path)?)),
            None => Ok(None),
        }
    }

    /// Resolve the access token: flag, then settings file, then environment
    fn resolve_token(&self, file: Option<&FileConfig>) -> Result<AccessToken> {
        if let Some(token) = &self.cli.token {
            return Ok(AccessToken::new(token.clone()));
        }
        if let Some(token) = file.and_then(|f| f.token.clone()) {
            return Ok(token);
        }
        match env::var(TOKEN_ENV_VAR) {
            Ok(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(Error::MissingToken),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn runner(args: &[&str]) -> Runner {
        Runner::new(Cli::parse_from(args))
    }

    // All arms run in one test so the environment variable is never touched
    // concurrently.
    #[test]
    fn test_token_resolution_order() {
        let file = FileConfig {
            token: Some(AccessToken::new("file-token")),
            ..FileConfig::default()
        };
        env::set_var(TOKEN_ENV_VAR, "env-token");

        // the flag beats both the settings file and the environment
        let with_flag = runner(&["pagefeed", "--token", "flag-token", "check", "acme"]);
        let token = with_flag.resolve_token(Some(&file)).unwrap();
        assert_eq!(token.secret(), "flag-token");

        // the settings file beats the environment
        let bare = runner(&["pagefeed", "check", "acme"]);
        let token = bare.resolve_token(Some(&file)).unwrap();
        assert_eq!(token.secret(), "file-token");

        // a settings file without a token falls through to the environment
        let token = bare.resolve_token(Some(&FileConfig::default())).unwrap();
        assert_eq!(token.secret(), "env-token");

        // the environment is the last resort
        let token = bare.resolve_token(None).unwrap();
        assert_eq!(token.secret(), "env-token");

        // an empty variable does not count as a token
        env::set_var(TOKEN_ENV_VAR, "");
        let err = bare.resolve_token(None).unwrap_err();
        assert!(matches!(err, Error::MissingToken));

        env::remove_var(TOKEN_ENV_VAR);
        let err = bare.resolve_token(None).unwrap_err();
        assert!(matches!(err, Error::MissingToken));
    }
}
