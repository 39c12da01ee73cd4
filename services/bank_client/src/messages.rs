//! User-facing text for replies and failures

use network::{MonitorUpdate, RpcError};
use types::{AccountAction, AccountSnapshot, DomainFailure};

/// Message shown for each domain status
pub fn status_message(failure: DomainFailure) -> &'static str {
    match failure {
        DomainFailure::NotFound => "Account not found: check the account number",
        DomainFailure::Unauthorized => "Authentication failed: name or password is incorrect",
        DomainFailure::Insufficient => "Insufficient funds for this operation",
    }
}

pub fn describe_error(error: &RpcError) -> String {
    match error {
        RpcError::Domain(failure) => status_message(*failure).to_string(),
        RpcError::Protocol(e) => format!("Unexpected reply from server: {}", e),
        RpcError::Transport(e) => format!("Could not reach server: {}", e),
    }
}

/// One-line summary of an account projection
pub fn render_snapshot(snapshot: &AccountSnapshot) -> String {
    let verb = match snapshot.action {
        AccountAction::Closed => "closed with final balance",
        _ => "balance",
    };
    format!(
        "[{}] account {} ({}): {} {} {}",
        snapshot.action, snapshot.number, snapshot.holder, verb, snapshot.balance, snapshot.currency
    )
}

/// One line per monitoring push
pub fn render_update(update: &MonitorUpdate) -> String {
    match update {
        MonitorUpdate::Account(snapshot) => render_snapshot(snapshot),
        MonitorUpdate::Failure(failure) => {
            format!("[{}] {}", failure.status(), status_message(*failure))
        }
    }
}
