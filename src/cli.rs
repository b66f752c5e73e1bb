// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(name = "codesonar")]
#[command(version)]
#[command(about = "AI-powered code analysis: suggestions, bugs, vulnerabilities", long_about = None)]
pub struct Cli {
    /// Code file to analyze (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Declared source language (javascript, python, java)
    #[arg(short, long, env = "CODESONAR_LANGUAGE")]
    pub language: Option<String>,

    /// LLM provider (ollama, openai)
    #[arg(short, long, env = "CODESONAR_PROVIDER")]
    pub provider: Option<String>,

    /// Model name
    #[arg(short, long, env = "CODESONAR_MODEL")]
    pub model: Option<String>,

    /// Print the raw analysis result as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the prompts sent to the LLM
    #[arg(long)]
    pub show_prompt: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Initialize config file
    Init,
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
