//! Mailing-list operations over the `subscribers` sequence.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::id::unique_id;
use crate::model::Subscriber;

pub fn list(subscribers: &[Subscriber]) -> Vec<Subscriber> {
    subscribers.to_vec()
}

/// Adds `email` to the list. Duplicate detection is an exact, case-sensitive match.
pub fn subscribe(
    subscribers: &mut Vec<Subscriber>,
    email: &str,
    now: DateTime<Utc>,
) -> Result<Subscriber> {
    if email.is_empty() || !email.contains('@') {
        return Err(Error::Validation("Valid email required".to_string()));
    }
    if subscribers.iter().any(|s| s.email == email) {
        return Err(Error::Conflict("Email already subscribed".to_string()));
    }

    let id = unique_id(|candidate| subscribers.iter().any(|s| s.id == candidate));
    let subscriber = Subscriber {
        id,
        email: email.to_string(),
        subscribed_at: now,
    };
    subscribers.push(subscriber.clone());
    Ok(subscriber)
}

pub fn delete(subscribers: &mut Vec<Subscriber>, id: &str) -> Result<Subscriber> {
    let index = subscribers
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(Error::subscriber_not_found)?;
    Ok(subscribers.remove(index))
}
