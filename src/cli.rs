//! Command-line interface definition for ShopTally
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for managing items, the user name, and reports.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ShopTally - shopping expense tracker
///
/// Add items with prices, keep a running total, and archive finished
/// lists as reports.
#[derive(Parser, Debug, Clone)]
#[command(name = "shoptally")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Database file to use instead of the configured one
    #[arg(long)]
    pub storage_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for ShopTally
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add an item to the current list
    Add {
        /// Item name
        name: String,

        /// Item price in VND
        #[arg(allow_hyphen_values = true)]
        price: String,
    },

    /// Show the current list
    List {
        /// Print items as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the name and/or price of an item
    Update {
        /// Item ID (full or unique prefix)
        id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New price in VND
        #[arg(short, long, allow_hyphen_values = true)]
        price: Option<String>,
    },

    /// Delete an item
    Delete {
        /// Item ID (full or unique prefix)
        id: String,
    },

    /// Remove every item from the current list
    Clear,

    /// Show the running total
    Total,

    /// Show or set the name recorded on reports
    User {
        /// New display name; omit to show the current one
        name: Option<String>,
    },

    /// Manage saved reports
    Report {
        /// Report subcommand
        #[command(subcommand)]
        command: ReportCommand,
    },
}

/// Report subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ReportCommand {
    /// Finalize the current list as a report and start a new one
    Save,

    /// List saved reports, newest first
    List {
        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a saved report by its position in `report list`
    Delete {
        /// 1-based position, newest first
        index: usize,
    },

    /// Delete every saved report
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            storage_path: None,
            verbose: false,
            json_logs: false,
            command: Commands::List { json: false },
        }
    }
}
