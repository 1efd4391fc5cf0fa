pub mod account;
pub mod calendar;
pub mod config;
pub mod plan;

use studyflow_core::storage::{AccountStore, UserRecord};

/// The logged-in user, or a readable error telling the caller to log in.
pub fn require_session(accounts: &AccountStore) -> Result<UserRecord, Box<dyn std::error::Error>> {
    match accounts.current_user()? {
        Some(user) => Ok(user),
        None => Err("no active session; run `account login` first".into()),
    }
}
