use crate::api::client::OpsClient;
use crate::api::models::{Page, PageShape};
use crate::api::resources::{ListQuery, Ops};
use crate::cli::main_types::{
    AuthCommands, Commands, ConfigCommands, Kind, NamespaceCommands, RunCommands,
};
use crate::cli::views;
use crate::core::auth::TokenInput;
use crate::core::services::auth_service::AuthService;
use crate::core::services::namespace_service::NamespaceService;
use crate::core::services::run_service::RunService;
use crate::display::TableDisplay;
use crate::error::{ApiError, AppError, AuthError, CliError, StorageError};
use crate::storage::config::{Config, Profile};
use crate::storage::credentials::SessionStore;
use crate::utils::validation::{validate_name, validate_url};
use crate::utils::variables::parse_override;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

pub struct Dispatcher {
    config: Config,
    config_path: Option<PathBuf>,
    session: Arc<SessionStore>,
    profile_name: String,
    namespace_override: Option<String>,
    verbose: bool,
}

impl Dispatcher {
    // Static helper function for verbose logging (used before self exists)
    fn print_verbose(verbose: bool, msg: &str) {
        if verbose {
            println!("Verbose: {}", msg);
        }
    }

    // Instance method for verbose logging
    fn log_verbose(&self, msg: &str) {
        Self::print_verbose(self.verbose, msg);
    }

    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        session: Arc<SessionStore>,
        profile_name: String,
        namespace_override: Option<String>,
        verbose: bool,
    ) -> Self {
        if session.get().is_some() {
            Self::print_verbose(
                verbose,
                &format!("Session token loaded for profile: {}", profile_name),
            );
        } else {
            Self::print_verbose(
                verbose,
                &format!("No saved session token found for profile: {}", profile_name),
            );
        }

        Self {
            config,
            config_path,
            session,
            profile_name,
            namespace_override,
            verbose,
        }
    }

    pub async fn dispatch(&mut self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Auth { command } => self.handle_auth_command(command).await,
            Commands::Config { command } => self.handle_config_command(command).await,
            Commands::Namespace { command } => self.handle_namespace_command(command).await,
            Commands::List {
                kind,
                page,
                page_size,
                search,
            } => self.handle_list(kind, page, page_size, search).await,
            Commands::Get { kind, name } => self.handle_get(kind, name).await,
            Commands::Create { kind, file } => self.handle_create(kind, file).await,
            Commands::Update { kind, name, file } => self.handle_update(kind, name, file).await,
            Commands::Delete { kind, name } => self.handle_delete(kind, name).await,
            Commands::Run { command } => self.handle_run_command(command).await,
            Commands::Nodes {
                cluster,
                page,
                page_size,
                search,
            } => self.handle_nodes(cluster, page, page_size, search).await,
            Commands::Events {
                subject,
                page,
                page_size,
                search,
            } => self.handle_events(subject, page, page_size, search).await,
            Commands::Summary => self.handle_summary().await,
            Commands::Copilot { input } => self.handle_copilot(input).await,
        }
    }

    fn profile(&self) -> Result<&Profile, AppError> {
        self.config.get_profile(&self.profile_name).ok_or_else(|| {
            AppError::Cli(CliError::InvalidArguments(format!(
                "Profile '{}' not found. Please configure a profile first.",
                self.profile_name
            )))
        })
    }

    fn client(&self) -> Result<OpsClient, AppError> {
        let profile = self.profile()?;
        let client = match profile.timeout_seconds {
            Some(timeout_secs) => OpsClient::with_timeout(
                profile.server_url.clone(),
                self.session.clone(),
                timeout_secs,
            )?,
            None => OpsClient::new(profile.server_url.clone(), self.session.clone())?,
        };
        Ok(client)
    }

    fn ops(&self) -> Result<Ops, AppError> {
        Ok(Ops::new(self.client()?))
    }

    /// Namespace for this invocation: the command-line override wins over
    /// the profile's persisted selection
    fn namespace(&self) -> String {
        match &self.namespace_override {
            Some(namespace) => namespace.clone(),
            None => self.config.namespace_for(&self.profile_name).to_string(),
        }
    }

    fn display(&self) -> TableDisplay {
        TableDisplay::new().with_colors(atty::is(atty::Stream::Stdout))
    }

    fn save_config(&self) -> Result<(), AppError> {
        self.config.save(self.config_path.clone())?;
        Ok(())
    }

    fn update_profile(&mut self, update: impl FnOnce(&mut Profile)) {
        let mut profile = self
            .config
            .get_profile(&self.profile_name)
            .cloned()
            .unwrap_or_default();
        update(&mut profile);
        self.config.set_profile(self.profile_name.clone(), profile);
    }

    fn read_payload(&self, file: &str) -> Result<Value, AppError> {
        let content = fs::read_to_string(file).map_err(|source| StorageError::FileIo {
            path: file.to_string(),
            source,
        })?;
        let payload = serde_json::from_str(&content).map_err(|e| {
            AppError::Cli(CliError::InvalidArguments(format!(
                "Invalid JSON in {}: {}",
                file, e
            )))
        })?;
        Ok(payload)
    }

    async fn handle_auth_command(&self, commands: AuthCommands) -> Result<(), AppError> {
        match commands {
            AuthCommands::Login { token } => {
                self.log_verbose("Attempting auth login command");
                let input = TokenInput::collect(token.as_deref())?;
                input.validate()?;

                let server_url = self.profile()?.server_url.clone();
                validate_url(&server_url)?;
                let service = AuthService::new(self.session.clone(), self.client()?);

                if service.login(&input.token).await? {
                    println!(
                        "✅ Successfully logged in with profile: {}",
                        self.profile_name
                    );
                    println!("Connected to: {}", server_url);
                    Ok(())
                } else {
                    println!("❌ Login failed: the server rejected the token");
                    Err(AppError::Auth(AuthError::TokenRejected))
                }
            }
            AuthCommands::Logout => {
                self.log_verbose("Attempting auth logout command");
                let service = AuthService::new(self.session.clone(), self.client()?);
                service.logout()?;
                println!(
                    "✅ Successfully logged out from profile: {}",
                    self.profile_name
                );
                Ok(())
            }
            AuthCommands::Status => {
                self.log_verbose("Attempting auth status command");

                let server_url = self.profile()?.server_url.clone();
                let service = AuthService::new(self.session.clone(), self.client()?);
                let status = service.status().await;

                println!("Authentication Status:");
                println!("=====================");
                println!("Profile: {}", status.profile_name);
                println!("Server: {}", server_url);

                if !status.session_present {
                    println!("Session: (none)");
                    println!("Run 'opsdash auth login' to authenticate");
                } else if status.is_authenticated {
                    println!("Session: ✅ token accepted by the server");
                } else {
                    println!("Session: ❌ token stored but rejected or unreachable");
                }

                Ok(())
            }
        }
    }

    async fn handle_config_command(&mut self, commands: ConfigCommands) -> Result<(), AppError> {
        match commands {
            ConfigCommands::Show => {
                self.log_verbose("Attempting config show command");

                println!("Current Configuration:");
                println!("=====================");

                if let Some(default_profile) = &self.config.default_profile {
                    println!("Default Profile: {}", default_profile);
                } else {
                    println!("Default Profile: (not set)");
                }

                println!("\nProfiles:");
                if self.config.profiles.is_empty() {
                    println!("  No profiles configured");
                } else {
                    for (name, profile) in &self.config.profiles {
                        println!("  [{}]", name);
                        println!("    Server URL: {}", profile.server_url);
                        if let Some(namespace) = &profile.namespace {
                            println!("    Namespace: {}", namespace);
                        }
                        if let Some(timeout) = profile.timeout_seconds {
                            println!("    Timeout: {} seconds", timeout);
                        }
                    }
                }

                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                self.log_verbose(&format!(
                    "Attempting config set - key: {}, value: {}",
                    key, value
                ));

                match key.as_str() {
                    "server_url" => {
                        validate_url(&value)?;
                        self.update_profile(|profile| profile.server_url = value.clone());
                    }
                    "namespace" => {
                        validate_name(&value)?;
                        self.update_profile(|profile| profile.namespace = Some(value.clone()));
                    }
                    "timeout_seconds" => {
                        let timeout = value.parse::<u64>().map_err(|_| {
                            AppError::Cli(CliError::InvalidArguments(format!(
                                "Invalid timeout '{}': expected seconds as an integer",
                                value
                            )))
                        })?;
                        self.update_profile(|profile| profile.timeout_seconds = Some(timeout));
                    }
                    "default_profile" => {
                        if self.config.get_profile(&value).is_none() {
                            return Err(AppError::Cli(CliError::InvalidArguments(format!(
                                "Profile '{}' not found. Please configure a profile first.",
                                value
                            ))));
                        }
                        self.config.default_profile = Some(value.clone());
                    }
                    _ => {
                        return Err(AppError::Cli(CliError::InvalidArguments(format!(
                            "Unknown key '{}'. Valid keys: server_url, namespace, timeout_seconds, default_profile",
                            key
                        ))));
                    }
                }

                self.save_config()?;
                println!("✅ Set {} = {}", key, value);
                Ok(())
            }
        }
    }

    async fn handle_namespace_command(
        &mut self,
        commands: NamespaceCommands,
    ) -> Result<(), AppError> {
        match commands {
            NamespaceCommands::List => {
                self.log_verbose("Attempting namespace list command");

                let service = NamespaceService::new(self.ops()?);
                let (namespaces, active) = service
                    .reconcile(&mut self.config, &self.profile_name)
                    .await?;
                if let Err(err) = self.save_config() {
                    self.log_verbose(&format!("Failed to save config: {}", err));
                }

                if namespaces.is_empty() {
                    println!("No namespaces found.");
                } else {
                    println!(
                        "{}",
                        self.display().render_namespace_list(&namespaces, &active)
                    );
                }
                Ok(())
            }
            NamespaceCommands::Use { name } => {
                self.log_verbose(&format!("Attempting namespace use command - name: {}", name));
                validate_name(&name)?;

                let service = NamespaceService::new(self.ops()?);
                service
                    .select(&mut self.config, &self.profile_name, &name)
                    .await?;
                self.save_config()?;

                println!("✅ Namespace set to: {}", name);
                Ok(())
            }
        }
    }

    async fn handle_list(
        &self,
        kind: Kind,
        page: u64,
        page_size: u64,
        search: Option<String>,
    ) -> Result<(), AppError> {
        let namespace = self.namespace();
        let spec = views::resource_spec(kind);
        self.log_verbose(&format!(
            "Listing {} in namespace: {} (page {})",
            spec.kind, namespace, page
        ));

        let query = ListQuery {
            page_size,
            page,
            search: search.unwrap_or_default(),
        };
        let accessor = self.ops()?.accessor(spec);
        let data = accessor.list(&namespace, &query).await?;
        let records = Page::from_data(&data, spec.page_shape);

        let display = self.display();
        println!(
            "{}",
            display.render_record_list(&records.list, views::list_columns(kind))?
        );
        if records.total > 0 {
            println!("{}", display.render_page_footer(&records));
        }
        Ok(())
    }

    async fn handle_get(&self, kind: Kind, name: String) -> Result<(), AppError> {
        validate_name(&name)?;
        let namespace = self.namespace();
        let label = views::kind_label(kind);
        self.log_verbose(&format!(
            "Fetching {} '{}' from namespace: {}",
            label, name, namespace
        ));

        let accessor = self.ops()?.accessor(views::resource_spec(kind));
        let record = accessor.get(&namespace, &name).await?;
        if record.is_null() {
            println!("❌ {} '{}' not found in namespace: {}", label, name, namespace);
            return Err(AppError::Api(ApiError::Rejected {
                message: format!("{} '{}' not found", label, name),
            }));
        }

        println!("{}", self.display().render_record_details(&record)?);
        Ok(())
    }

    async fn handle_create(&self, kind: Kind, file: String) -> Result<(), AppError> {
        let namespace = self.namespace();
        let label = views::kind_label(kind);
        let payload = self.read_payload(&file)?;
        let name = payload
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("(unnamed)")
            .to_string();
        self.log_verbose(&format!(
            "Creating {} '{}' in namespace: {}",
            label, name, namespace
        ));

        let accessor = self.ops()?.accessor(views::resource_spec(kind));
        let envelope = accessor.create(&namespace, &payload).await?;
        if envelope.is_success() {
            println!("✅ Created {} '{}' in namespace: {}", label, name, namespace);
            Ok(())
        } else {
            println!("❌ Create failed: {}", envelope.message);
            Err(AppError::Api(ApiError::Rejected {
                message: envelope.message,
            }))
        }
    }

    async fn handle_update(&self, kind: Kind, name: String, file: String) -> Result<(), AppError> {
        validate_name(&name)?;
        let namespace = self.namespace();
        let label = views::kind_label(kind);
        let payload = self.read_payload(&file)?;
        self.log_verbose(&format!(
            "Updating {} '{}' in namespace: {}",
            label, name, namespace
        ));

        let accessor = self.ops()?.accessor(views::resource_spec(kind));
        let envelope = accessor.update(&namespace, &name, &payload).await?;
        if envelope.is_success() {
            println!("✅ Updated {} '{}' in namespace: {}", label, name, namespace);
            Ok(())
        } else {
            println!("❌ Update failed: {}", envelope.message);
            Err(AppError::Api(ApiError::Rejected {
                message: envelope.message,
            }))
        }
    }

    async fn handle_delete(&self, kind: Kind, name: String) -> Result<(), AppError> {
        validate_name(&name)?;
        let namespace = self.namespace();
        let label = views::kind_label(kind);
        self.log_verbose(&format!(
            "Deleting {} '{}' from namespace: {}",
            label, name, namespace
        ));

        let accessor = self.ops()?.accessor(views::resource_spec(kind));
        let envelope = accessor.delete(&namespace, &name).await?;
        if envelope.is_success() {
            println!("✅ Deleted {} '{}' from namespace: {}", label, name, namespace);
            Ok(())
        } else {
            println!("❌ Delete failed: {}", envelope.message);
            Err(AppError::Api(ApiError::Rejected {
                message: envelope.message,
            }))
        }
    }

    async fn handle_run_command(&self, commands: RunCommands) -> Result<(), AppError> {
        let namespace = self.namespace();
        let service = RunService::new(self.ops()?);

        let (label, name, outcome) = match commands {
            RunCommands::Task { name, var } => {
                validate_name(&name)?;
                let overrides = parse_overrides(&var)?;
                self.log_verbose(&format!(
                    "Running task '{}' in namespace: {} with {} override(s)",
                    name,
                    namespace,
                    overrides.len()
                ));
                let outcome = service.run_task(&namespace, &name, &overrides).await?;
                ("task", name, outcome)
            }
            RunCommands::Pipeline { name, var } => {
                validate_name(&name)?;
                let overrides = parse_overrides(&var)?;
                self.log_verbose(&format!(
                    "Running pipeline '{}' in namespace: {} with {} override(s)",
                    name,
                    namespace,
                    overrides.len()
                ));
                let outcome = service.run_pipeline(&namespace, &name, &overrides).await?;
                ("pipeline", name, outcome)
            }
        };

        if outcome.success {
            println!(
                "✅ Run created for {} '{}' in namespace: {}",
                label, name, namespace
            );
            Ok(())
        } else {
            println!("❌ Run failed: {}", outcome.message);
            Err(AppError::Api(ApiError::Rejected {
                message: outcome.message,
            }))
        }
    }

    async fn handle_nodes(
        &self,
        cluster: String,
        page: u64,
        page_size: u64,
        search: Option<String>,
    ) -> Result<(), AppError> {
        validate_name(&cluster)?;
        let namespace = self.namespace();
        self.log_verbose(&format!(
            "Listing nodes of cluster '{}' in namespace: {}",
            cluster, namespace
        ));

        let query = ListQuery {
            page_size,
            page,
            search: search.unwrap_or_default(),
        };
        let data = self
            .ops()?
            .cluster_nodes(&namespace, &cluster, &query)
            .await?;
        let records = Page::from_data(&data, PageShape::Paged);

        let display = self.display();
        println!(
            "{}",
            display.render_record_list(&records.list, views::NODE_COLUMNS)?
        );
        if records.total > 0 {
            println!("{}", display.render_page_footer(&records));
        }
        Ok(())
    }

    async fn handle_events(
        &self,
        subject: Option<String>,
        page: u64,
        page_size: u64,
        search: Option<String>,
    ) -> Result<(), AppError> {
        let query = ListQuery {
            page_size,
            page,
            search: search.unwrap_or_default(),
        };
        let ops = self.ops()?;
        let display = self.display();

        match subject {
            Some(subject) => {
                validate_name(&subject)?;
                self.log_verbose(&format!("Listing events under subject: {}", subject));

                let data = ops.events(&subject, &query).await?;
                let records = Page::from_data(&data, PageShape::Paged);
                println!(
                    "{}",
                    display.render_record_list(&records.list, views::EVENT_COLUMNS)?
                );
                if records.total > 0 {
                    println!("{}", display.render_page_footer(&records));
                }
            }
            None => {
                self.log_verbose("Listing event subjects");

                let data = ops.event_subjects(&query).await?;
                let subjects = Page::from_data(&data, PageShape::Paged);
                if subjects.is_empty() {
                    println!("No event subjects found.");
                } else {
                    for subject in subjects.list.iter().filter_map(Value::as_str) {
                        println!("{}", subject);
                    }
                    println!("{}", display.render_page_footer(&subjects));
                }
            }
        }
        Ok(())
    }

    async fn handle_summary(&self) -> Result<(), AppError> {
        self.log_verbose("Fetching resource summary");

        let summary = self.ops()?.summary().await?;
        println!("{}", self.display().render_summary(&summary)?);
        Ok(())
    }

    async fn handle_copilot(&self, input: Vec<String>) -> Result<(), AppError> {
        let question = input.join(" ").trim().to_string();
        if question.is_empty() {
            return Err(AppError::Cli(CliError::InvalidArguments(
                "Ask a question, e.g. 'opsdash copilot why is the nightly run failing'"
                    .to_string(),
            )));
        }
        self.log_verbose(&format!("Asking copilot: {}", question));

        let envelope = self.ops()?.copilot(&question).await?;
        if !envelope.is_success() {
            println!("❌ Copilot request failed: {}", envelope.message);
            return Err(AppError::Api(ApiError::Rejected {
                message: envelope.message,
            }));
        }

        // The answer is markdown text; anything else is printed as JSON
        match envelope.data.as_str() {
            Some(answer) => println!("{}", answer),
            None => println!("{}", envelope.data),
        }
        Ok(())
    }
}

fn parse_overrides(raw: &[String]) -> Result<Vec<(String, String)>, AppError> {
    raw.iter().map(|entry| parse_override(entry)).collect()
}
