use clap::Subcommand;
use studyflow_core::storage::{AccountStore, NewUser, UserRecord};

use super::require_session;

#[derive(Subcommand)]
pub enum AccountAction {
    /// Register a new account
    Signup {
        username: String,
        email: String,
        password: String,
        /// Self-reported mood
        #[arg(long)]
        mood: Option<String>,
        /// Agree to the terms and conditions
        #[arg(long)]
        agree_terms: bool,
    },
    /// Log in and start a session
    Login { email: String, password: String },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Show {
        #[arg(long)]
        json: bool,
    },
    /// List all users, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Update the logged-in user's mood
    SetMood { mood: String },
    /// Update the logged-in user's avatar
    SetAvatar { avatar: String },
    /// Flip a notification switch for the logged-in user
    SetNotification {
        channel: String,
        #[arg(long)]
        off: bool,
    },
    /// Delete an account
    Delete { username: String },
    /// Aggregate account statistics
    Stats,
}

fn print_user(user: &UserRecord, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!("{} <{}>", user.username, user.email);
        if let Some(mood) = &user.mood {
            println!("  mood: {mood}");
        }
        if let Some(avatar) = &user.avatar {
            println!("  avatar: {avatar}");
        }
        if let Some(last_login) = user.last_login {
            println!("  last login: {last_login}");
        }
    }
    Ok(())
}

pub fn run(action: AccountAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = AccountStore::open()?;
    match action {
        AccountAction::Signup {
            username,
            email,
            password,
            mood,
            agree_terms,
        } => {
            let user = store.signup(&NewUser {
                username,
                email,
                password,
                mood,
                agreed_to_terms: agree_terms,
            })?;
            println!("account created: {}", user.username);
        }
        AccountAction::Login { email, password } => {
            let user = store.login(&email, &password)?;
            println!("logged in as {}", user.username);
        }
        AccountAction::Logout => {
            store.logout()?;
            println!("logged out");
        }
        AccountAction::Show { json } => {
            let user = require_session(&store)?;
            print_user(&user, json)?;
        }
        AccountAction::List { json } => {
            let users = store.list_users()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                for user in users {
                    println!("{} <{}>", user.username, user.email);
                }
            }
        }
        AccountAction::SetMood { mood } => {
            let user = require_session(&store)?;
            store.set_mood(&user.username, Some(&mood))?;
            println!("mood updated");
        }
        AccountAction::SetAvatar { avatar } => {
            let user = require_session(&store)?;
            store.set_avatar(&user.username, Some(&avatar))?;
            println!("avatar updated");
        }
        AccountAction::SetNotification { channel, off } => {
            let user = require_session(&store)?;
            store.set_notification(&user.username, &channel, !off)?;
            println!(
                "notifications for '{channel}' {}",
                if off { "disabled" } else { "enabled" }
            );
        }
        AccountAction::Delete { username } => {
            store.delete_user(&username)?;
            println!("account deleted: {username}");
        }
        AccountAction::Stats => {
            let stats = store.stats()?;
            println!("total users:    {}", stats.total_users);
            println!("recent signups: {}", stats.recent_signups);
            for (mood, count) in &stats.mood_distribution {
                println!("  {mood}: {count}");
            }
        }
    }
    Ok(())
}
