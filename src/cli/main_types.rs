use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "opsdash")]
#[command(about = "Command line dashboard for an ops server")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Namespace override for this invocation
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Namespace selection
    Namespace {
        #[command(subcommand)]
        command: NamespaceCommands,
    },
    /// List resources of a kind
    List {
        /// Resource kind
        kind: Kind,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Records per page
        #[arg(long, default_value = "10")]
        page_size: u64,
        /// Search term
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one resource in detail
    Get {
        /// Resource kind
        kind: Kind,
        /// Resource name
        name: String,
    },
    /// Create a resource from a JSON file
    Create {
        /// Resource kind
        kind: Kind,
        /// Path to the JSON definition
        #[arg(long)]
        file: String,
    },
    /// Update a resource from a JSON file
    Update {
        /// Resource kind
        kind: Kind,
        /// Resource name
        name: String,
        /// Path to the JSON definition
        #[arg(long)]
        file: String,
    },
    /// Delete a resource
    Delete {
        /// Resource kind
        kind: Kind,
        /// Resource name
        name: String,
    },
    /// Launch a run from a task or pipeline definition
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
    /// List the nodes of a cluster
    Nodes {
        /// Cluster name
        cluster: String,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Records per page
        #[arg(long, default_value = "10")]
        page_size: u64,
        /// Search term
        #[arg(long)]
        search: Option<String>,
    },
    /// Browse event subjects, or the events under one subject
    Events {
        /// Subject to read events from; omit to list subjects
        #[arg(long)]
        subject: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Records per page
        #[arg(long, default_value = "10")]
        page_size: u64,
        /// Search term (subject listing only)
        #[arg(long)]
        search: Option<String>,
    },
    /// Resource counts overview
    Summary,
    /// Ask the copilot a question
    Copilot {
        /// Question text
        input: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a session token and verify it against the server
    Login {
        /// Session token; prompted for when omitted
        #[arg(long)]
        token: Option<String>,
    },
    /// Logout and clear the session
    Logout,
    /// Show authentication status
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NamespaceCommands {
    /// List server namespaces, marking the active one
    List,
    /// Switch the active namespace
    Use {
        /// Namespace name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RunCommands {
    /// Run a task by name
    Task {
        /// Task name
        name: String,
        /// Variable override in key=value format
        #[arg(long, action = clap::ArgAction::Append)]
        var: Vec<String>,
    },
    /// Run a pipeline by name
    Pipeline {
        /// Pipeline name
        name: String,
        /// Variable override in key=value format
        #[arg(long, action = clap::ArgAction::Append)]
        var: Vec<String>,
    },
}

/// Resource kinds served through the generic accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Cluster,
    Host,
    Task,
    Taskrun,
    Pipeline,
    Pipelinerun,
    Eventhook,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["opsdash", "list", "task"]).expect("parse failed");
        match cli.command {
            Commands::List {
                kind,
                page,
                page_size,
                search,
            } => {
                assert_eq!(kind, Kind::Task);
                assert_eq!(page, 1);
                assert_eq!(page_size, 10);
                assert!(search.is_none());
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_kind_value_parsing() {
        let cli = Cli::try_parse_from(["opsdash", "get", "pipelinerun", "release-42"])
            .expect("parse failed");
        match cli.command {
            Commands::Get { kind, name } => {
                assert_eq!(kind, Kind::Pipelinerun);
                assert_eq!(name, "release-42");
            }
            _ => panic!("expected get command"),
        }
    }

    #[test]
    fn test_run_collects_repeated_vars() {
        let cli = Cli::try_parse_from([
            "opsdash", "run", "task", "nightly", "--var", "env=prod", "--var", "region=us-1",
        ])
        .expect("parse failed");
        match cli.command {
            Commands::Run {
                command: RunCommands::Task { name, var },
            } => {
                assert_eq!(name, "nightly");
                assert_eq!(var, vec!["env=prod", "region=us-1"]);
            }
            _ => panic!("expected run task command"),
        }
    }

    #[test]
    fn test_global_flags_anywhere() {
        let cli = Cli::try_parse_from(["opsdash", "summary", "-n", "team-a", "-v"])
            .expect("parse failed");
        assert!(cli.verbose);
        assert_eq!(cli.namespace.as_deref(), Some("team-a"));
    }
}
