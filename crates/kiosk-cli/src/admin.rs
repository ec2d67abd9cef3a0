//! `kiosk user ...` subcommands.
//!
//! Thin wrappers over the directory pass-through operations. Records are
//! printed to stdout as JSON in the kiosk API format.

use anyhow::{Context, bail};
use clap::Subcommand;
use kiosk_core::{CardId, UserRecord};
use kiosk_directory::{CardLookup, Directory, NewUser, UserRepository, UserUpdate};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Show the user holding a card
    Get {
        /// Card identifier, or user id with --by-id
        key: String,

        /// Look up by user id instead of card
        #[arg(long)]
        by_id: bool,
    },

    /// Find a user by (partial) name
    Find { name: String },

    /// List all users
    List,

    /// Register a new user
    Create {
        card_id: String,
        name: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value_t = 0.0)]
        balance: f64,
    },

    /// Change fields of the user holding a card
    Update {
        card_id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Move the user to another card
        #[arg(long)]
        new_card: Option<String>,

        #[arg(long)]
        active: Option<bool>,
    },

    /// Set a balance (negative amounts are stored as zero)
    Balance {
        /// Card identifier, or user id with --by-id
        key: String,

        #[arg(allow_negative_numbers = true)]
        amount: f64,

        #[arg(long)]
        by_id: bool,
    },

    /// Remove the user holding a card
    Delete { card_id: String },
}

/// Run one admin command against the directory.
///
/// # Errors
///
/// Fails on invalid input, on directory errors, and when the targeted user
/// does not exist.
pub async fn execute(directory: &Directory, command: UserCommand) -> anyhow::Result<()> {
    let users = directory.users();

    match command {
        UserCommand::Get { key, by_id } => {
            let user = if by_id {
                users.find_by_id(&key).await?
            } else {
                users.find_by_card_id(&card(&key)?).await?
            };
            print_user(&user.with_context(|| format!("no user found for {key}"))?)
        }

        UserCommand::Find { name } => {
            let user = users.find_by_name(&name).await?;
            print_user(&user.with_context(|| format!("no user matches {name:?}"))?)
        }

        UserCommand::List => {
            let all = users.list().await?;
            println!("{}", serde_json::to_string_pretty(&all)?);
            Ok(())
        }

        UserCommand::Create {
            card_id,
            name,
            phone,
            balance,
        } => {
            let new_user = NewUser::new(card(&card_id)?, name)
                .contact_number(phone)
                .balance(balance);
            let created = users.create(&new_user).await?;
            info!(user_id = %created.id, card_id = %created.card_id, "User created");
            print_user(&created)
        }

        UserCommand::Update {
            card_id,
            name,
            phone,
            new_card,
            active,
        } => {
            let mut changes = UserUpdate::new();
            if let Some(name) = name {
                changes = changes.name(name);
            }
            if let Some(phone) = phone {
                changes = changes.contact_number(phone);
            }
            if let Some(new_card) = new_card {
                changes = changes.card_id(card(&new_card)?);
            }
            if let Some(active) = active {
                changes = changes.active(active);
            }
            if changes.is_empty() {
                bail!("nothing to update; pass --name, --phone, --new-card or --active");
            }

            ensure_matched(users.update(&card(&card_id)?, &changes).await?, &card_id)?;
            info!(card_id = %card_id, "User updated");
            Ok(())
        }

        UserCommand::Balance { key, amount, by_id } => {
            let matched = if by_id {
                users.update_balance_by_id(&key, amount).await?
            } else {
                users.update_balance(&card(&key)?, amount).await?
            };
            ensure_matched(matched, &key)?;
            info!(key = %key, balance = amount.max(0.0), "Balance updated");
            Ok(())
        }

        UserCommand::Delete { card_id } => {
            ensure_matched(users.delete(&card(&card_id)?).await?, &card_id)?;
            info!(card_id = %card_id, "User deleted");
            Ok(())
        }
    }
}

fn card(raw: &str) -> anyhow::Result<CardId> {
    CardId::new(raw).with_context(|| format!("invalid card identifier {raw:?}"))
}

fn ensure_matched(matched: bool, key: &str) -> anyhow::Result<()> {
    if !matched {
        bail!("no user found for {key}");
    }
    Ok(())
}

fn print_user(user: &UserRecord) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(user)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(subcommand)]
        command: UserCommand,
    }

    #[test]
    fn test_parse_negative_balance() {
        let parsed = Harness::try_parse_from(["user", "balance", "123", "-5"]).unwrap();
        match parsed.command {
            UserCommand::Balance { key, amount, by_id } => {
                assert_eq!(key, "123");
                assert_eq!(amount, -5.0);
                assert!(!by_id);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_defaults() {
        let parsed = Harness::try_parse_from(["user", "create", "123", "Alice"]).unwrap();
        match parsed.command {
            UserCommand::Create {
                card_id,
                name,
                phone,
                balance,
            } => {
                assert_eq!(card_id, "123");
                assert_eq!(name, "Alice");
                assert_eq!(phone, "");
                assert_eq!(balance, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_blank_card_rejected() {
        assert!(card("   ").is_err());
        assert!(ensure_matched(false, "123").is_err());
        assert!(ensure_matched(true, "123").is_ok());
    }
}
