use clap::Parser;
use opsdash::cli::dispatcher::Dispatcher;
use opsdash::cli::main_types::Cli;
use opsdash::storage::config::{Config, Profile};
use opsdash::storage::credentials::SessionStore;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load Config
    let config_path = cli
        .config_dir
        .as_ref()
        .map(|dir| PathBuf::from(dir).join("config.toml"));

    let mut config = match Config::load(config_path.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {}", err);
            std::process::exit(1);
        }
    };

    // Determine the profile to use
    let profile_name = cli
        .profile
        .or(config.default_profile.clone())
        .unwrap_or_else(|| "default".to_string());

    // Create a default profile if it doesn't exist
    if config.get_profile(&profile_name).is_none() {
        if cli.verbose {
            println!("Creating default profile: {}", profile_name);
        }

        config.set_profile(profile_name.clone(), Profile::default());

        // Set as default if no default is set
        if config.default_profile.is_none() {
            config.default_profile = Some(profile_name.clone());
        }

        // Save the updated config
        if let Err(err) = config.save(config_path.clone()) {
            if cli.verbose {
                println!("Warning: Failed to save config: {}", err);
            }
        }
    }

    if cli.verbose {
        println!("Verbose mode is enabled");
        println!("Using profile: {}", profile_name);

        if let Some(config_dir) = &cli.config_dir {
            println!("Using config directory: {}", config_dir);
        }

        if let Some(namespace) = &cli.namespace {
            println!("Using namespace override: {}", namespace);
        }
    }

    // Load the persisted session for the profile
    let session = match SessionStore::for_profile(&profile_name) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Error loading session: {}", err);
            SessionStore::new(Some(profile_name.clone()))
        }
    };

    // Create dispatcher
    let mut dispatcher = Dispatcher::new(
        config,
        config_path,
        Arc::new(session),
        profile_name,
        cli.namespace,
        cli.verbose,
    );

    // Execute the command
    if let Err(e) = dispatcher.dispatch(cli.command).await {
        eprintln!("{} {}", e.severity().emoji(), e.display_friendly());
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }

    Ok(())
}
