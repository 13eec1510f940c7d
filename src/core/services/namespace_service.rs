use crate::api::resources::Ops;
use crate::error::{AppError, CliError};
use crate::storage::config::{Config, Profile};

/// Keeps the persisted namespace selection consistent with what the
/// server actually has.
pub struct NamespaceService {
    ops: Ops,
}

impl NamespaceService {
    pub fn new(ops: Ops) -> Self {
        Self { ops }
    }

    pub async fn list(&self) -> Result<Vec<String>, AppError> {
        Ok(self.ops.namespaces().await?)
    }

    /// Fetch the server's namespaces and resolve the active one for a
    /// profile.
    ///
    /// The persisted selection survives only while the server still
    /// reports that namespace; otherwise the first server namespace takes
    /// over and the config is updated in place. The caller persists the
    /// config afterwards.
    pub async fn reconcile(
        &self,
        config: &mut Config,
        profile: &str,
    ) -> Result<(Vec<String>, String), AppError> {
        let namespaces = self.list().await?;
        let selected = config.namespace_for(profile).to_string();

        let active = match choose_fallback(&namespaces, &selected) {
            Some(fallback) => {
                persist_selection(config, profile, &fallback);
                fallback
            }
            None => selected,
        };

        Ok((namespaces, active))
    }

    /// Persist an explicit namespace selection after verifying the server
    /// knows it.
    pub async fn select(
        &self,
        config: &mut Config,
        profile: &str,
        namespace: &str,
    ) -> Result<(), AppError> {
        let namespaces = self.list().await?;
        if !namespaces.iter().any(|ns| ns == namespace) {
            return Err(AppError::Cli(CliError::InvalidArguments(format!(
                "Namespace '{}' does not exist on the server",
                namespace
            ))));
        }

        persist_selection(config, profile, namespace);
        Ok(())
    }
}

// Selection survives only while the server still reports it
fn choose_fallback(namespaces: &[String], selected: &str) -> Option<String> {
    if namespaces.is_empty() || namespaces.iter().any(|ns| ns == selected) {
        None
    } else {
        Some(namespaces[0].clone())
    }
}

fn persist_selection(config: &mut Config, profile: &str, namespace: &str) {
    if !config.set_namespace(profile, namespace.to_string()) {
        let fresh = Profile {
            namespace: Some(namespace.to_string()),
            ..Profile::default()
        };
        config.set_profile(profile.to_string(), fresh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespaces(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_selection_kept_while_server_reports_it() {
        let list = namespaces(&["default", "ops-system"]);
        assert_eq!(choose_fallback(&list, "ops-system"), None);
    }

    #[test]
    fn test_missing_selection_falls_back_to_first() {
        let list = namespaces(&["default", "team-a"]);
        assert_eq!(
            choose_fallback(&list, "removed-ns"),
            Some("default".to_string())
        );
    }

    #[test]
    fn test_empty_server_list_keeps_selection() {
        assert_eq!(choose_fallback(&[], "ops-system"), None);
    }

    #[test]
    fn test_persist_selection_creates_missing_profile() {
        let mut config = Config::default();

        persist_selection(&mut config, "staging", "team-a");

        assert_eq!(config.namespace_for("staging"), "team-a");
    }

    #[test]
    fn test_persist_selection_updates_existing_profile() {
        let mut config = Config::default();
        config.set_profile("default".to_string(), Profile::default());

        persist_selection(&mut config, "default", "team-b");

        assert_eq!(config.namespace_for("default"), "team-b");
        assert_eq!(config.profiles.len(), 1);
    }
}
