/// Authentication state reported to the CLI layer
#[derive(Debug, Clone)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub profile_name: String,
    pub session_present: bool,
}

/// Result of a run-creation request
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub success: bool,
    pub message: String,
}
