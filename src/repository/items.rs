//! Item operations over the `items` sequence of a loaded snapshot.
//!
//! Stored order is insertion order; nothing here sorts.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::id::unique_id;
use crate::model::{Item, ItemPatch, ItemStatus, NewItem};

pub fn list_active(items: &[Item]) -> Vec<Item> {
    items.iter().filter(|i| i.is_active()).cloned().collect()
}

pub fn list_all(items: &[Item]) -> Vec<Item> {
    items.to_vec()
}

pub fn get<'a>(items: &'a [Item], id: &str) -> Result<&'a Item> {
    items
        .iter()
        .find(|i| i.id == id)
        .ok_or_else(Error::item_not_found)
}

/// Appends a new active item and returns it.
pub fn create(items: &mut Vec<Item>, fields: NewItem, now: DateTime<Utc>) -> Result<Item> {
    validate_price(fields.price)?;

    let id = unique_id(|candidate| items.iter().any(|i| i.id == candidate));
    let item = Item {
        id,
        title: fields.title,
        kind: fields.kind,
        content: fields.content,
        price: fields.price,
        image: fields.image,
        created_at: now,
        status: ItemStatus::Active,
    };
    items.push(item.clone());
    Ok(item)
}

/// Merges `patch` over the stored item. Identity and creation time stay pinned.
pub fn update(items: &mut [Item], id: &str, patch: ItemPatch) -> Result<Item> {
    let item = items
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(Error::item_not_found)?;

    if let Some(price) = patch.price {
        validate_price(price)?;
        item.price = price;
    }
    if let Some(title) = patch.title {
        item.title = title;
    }
    if let Some(kind) = patch.kind {
        item.kind = kind;
    }
    if let Some(content) = patch.content {
        item.content = content;
    }
    if let Some(image) = patch.image {
        item.image = image;
    }
    if let Some(status) = patch.status {
        item.status = status;
    }

    Ok(item.clone())
}

/// Removes the item and hands it back.
pub fn delete(items: &mut Vec<Item>, id: &str) -> Result<Item> {
    let index = items
        .iter()
        .position(|i| i.id == id)
        .ok_or_else(Error::item_not_found)?;
    Ok(items.remove(index))
}

fn validate_price(price: f64) -> Result<()> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(Error::Validation(
            "price must be a non-negative number".to_string(),
        ))
    }
}
