// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::io::Read;

use clap::CommandFactory;
use console::style;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::domain::{AnalysisOutcome, RawSubmission};
use crate::error::{Error, Result};
use crate::services::{
    gateway::{self, explanation_prompt, suggestions_prompt},
    orchestrator::Orchestrator,
    validator,
};

pub struct App {
    cli: Cli,
    config: Config,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let config = Config::load(&cli)?;
        debug!(
            provider = %config.provider,
            model = %config.model,
            timeout_secs = config.timeout_secs,
            "config loaded"
        );
        let cancel_token = CancellationToken::new();
        Ok(Self {
            cli,
            config,
            cancel_token,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup Ctrl+C handler with CancellationToken
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        // Handle subcommands
        if let Some(ref cmd) = self.cli.command {
            return self.handle_command(cmd);
        }

        self.run_analysis().await
    }

    async fn run_analysis(&self) -> Result<()> {
        let raw = self.collect_submission()?;

        // Fast-reject before any network traffic. The orchestrator
        // validates again for library callers; the validator is pure, so
        // running it twice is harmless.
        let outcome = match validator::validate(&raw) {
            Err(Error::InvalidInput(message)) => AnalysisOutcome::InputRejected {
                input_error: message,
            },
            Err(e) => return Err(e),
            Ok(request) => {
                if self.cli.show_prompt {
                    eprintln!("{}", style("--- SUGGESTIONS PROMPT ---").dim());
                    eprintln!("{}", suggestions_prompt(&request));
                    eprintln!("{}", style("--- EXPLANATION PROMPT ---").dim());
                    eprintln!("{}", explanation_prompt(&request));
                    eprintln!("{}", style("--- END PROMPTS ---").dim());
                }

                if self.cancel_token.is_cancelled() {
                    return Err(Error::Cancelled);
                }

                self.print_status(&format!(
                    "Contacting {} ({})...",
                    self.config.provider, self.config.model
                ));

                let gateway = gateway::create_gateway(&self.config)?;
                debug!(gateway = gateway.name(), "verifying gateway");
                gateway.verify().await?;

                self.print_status("Analyzing code...");

                let orchestrator = Orchestrator::new(gateway);
                orchestrator
                    .analyze(&raw, self.cancel_token.clone())
                    .await?
            }
        };

        if self.cli.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            return Ok(());
        }

        match outcome {
            AnalysisOutcome::Success {
                suggestions,
                bugs,
                vulnerabilities,
                explanation,
            } => {
                println!(
                    "{}",
                    format_report(&suggestions, &bugs, &vulnerabilities, &explanation)
                );
                Ok(())
            }
            AnalysisOutcome::InputRejected { input_error } => Err(Error::InvalidInput(input_error)),
            AnalysisOutcome::ProcessingFailed { error } => Err(Error::AnalysisFailed(error)),
        }
    }

    /// Assemble the raw key-value submission from CLI flags, a file
    /// argument, or stdin. No validation happens here.
    fn collect_submission(&self) -> Result<RawSubmission> {
        let code = match self.cli.file {
            Some(ref path) => Some(std::fs::read_to_string(path)?),
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                (!buf.is_empty()).then_some(buf)
            }
        };

        Ok(RawSubmission {
            code,
            language: self.cli.language.clone(),
        })
    }

    fn handle_command(&self, cmd: &Commands) -> Result<()> {
        match cmd {
            Commands::Init => {
                let path = Config::create_default()?;
                self.print_info(&format!("Created config at {}", path.display()));
                Ok(())
            }
            Commands::Config => {
                if let Some(path) = Config::config_path() {
                    eprintln!("{} {}", style("Config file:").bold(), path.display());
                }
                let rendered = toml::to_string_pretty(&self.config)
                    .map_err(|e| Error::Config(e.to_string()))?;
                println!("{rendered}");
                Ok(())
            }
            Commands::Completions { shell } => {
                let mut cmd = Cli::command();
                clap_complete::generate(*shell, &mut cmd, "codesonar", &mut std::io::stdout());
                Ok(())
            }
        }
    }

    fn print_status(&self, msg: &str) {
        eprintln!("{} {}", style("==>").cyan().bold(), msg);
    }

    fn print_info(&self, msg: &str) {
        eprintln!("{} {}", style("info:").cyan(), msg);
    }
}

/// Render a successful analysis as the three labeled sections plus the
/// explanation, in pass-through order.
pub fn format_report(
    suggestions: &[String],
    bugs: &[String],
    vulnerabilities: &[String],
    explanation: &str,
) -> String {
    let mut out = String::new();

    for (title, items) in [
        ("Suggestions", suggestions),
        ("Bugs", bugs),
        ("Vulnerabilities", vulnerabilities),
    ] {
        out.push_str(&format!(
            "{} ({})\n",
            style(title).bold().underlined(),
            items.len()
        ));
        if items.is_empty() {
            out.push_str("  (none)\n");
        }
        for (i, item) in items.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, item));
        }
        out.push('\n');
    }

    out.push_str(&format!("{}\n", style("Explanation").bold().underlined()));
    out.push_str(&format!("  {explanation}\n"));

    out
}
