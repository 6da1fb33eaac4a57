use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{ContactMessage, EngineError, NewContactCmd, ResultEngine, contacts};

use super::{Engine, normalize_required_name, with_tx};

/// Longest accepted contact message, in characters.
const MAX_MESSAGE_CHARS: usize = 5000;

fn normalize_email(raw: &str) -> ResultEngine<String> {
    let email = raw.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(EngineError::InvalidInput("invalid email".to_string()));
    }
    Ok(email.to_string())
}

impl Engine {
    /// Stores a contact form message. Name, email and message are trimmed
    /// and required.
    pub async fn submit_contact(&self, cmd: NewContactCmd) -> ResultEngine<ContactMessage> {
        let name = normalize_required_name(&cmd.name, "name")?;
        let email = normalize_email(&cmd.email)?;
        let message = normalize_required_name(&cmd.message, "message")?;
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(EngineError::InvalidInput("message too long".to_string()));
        }

        with_tx!(self, |db_tx| {
            let contact = ContactMessage {
                id: Uuid::new_v4(),
                name,
                email,
                message,
                created_at: Utc::now(),
            };
            contacts::ActiveModel::from(&contact).insert(&db_tx).await?;
            tracing::info!(contact_id = %contact.id, "contact message received");
            Ok(contact)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_checked() {
        assert_eq!(normalize_email("  ann@example.com ").unwrap(), "ann@example.com");
        for bad in ["", "ann", "@example.com", "ann@", "ann@@example.com", "a nn@example.com"] {
            assert!(normalize_email(bad).is_err(), "{bad}");
        }
    }
}
