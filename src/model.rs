use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Display treatment of an item. `Product` is the only kind with a purchase
/// affordance; otherwise the kinds behave the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Art,
    Article,
    Product,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Art => "art",
            ItemKind::Article => "article",
            ItemKind::Product => "product",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "art" => Ok(ItemKind::Art),
            "article" => Ok(ItemKind::Article),
            "product" => Ok(ItemKind::Product),
            other => Err(format!("unknown item type: {}", other)),
        }
    }
}

/// Visibility flag. Only active items show up in the public listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub content: String,
    /// Zero means free. There is no currency.
    pub price: f64,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub status: ItemStatus,
}

impl Item {
    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }
}

/// Fields accepted when creating an item. Identity, creation time and status
/// are assigned by the repository, so any such keys in the payload are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image: String,
}

/// Partial update. Absent fields keep their stored value; `id` and
/// `createdAt` are not representable here and can never be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: String,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

/// The single admin credential, stored in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
}

impl Default for AdminCredential {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "paradox".to_string(),
        }
    }
}

/// The whole persisted dataset. Always loaded and saved as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub subscribers: Vec<Subscriber>,
    pub admin: AdminCredential,
}

impl Snapshot {
    /// Built-in dataset used whenever the persisted copy is missing or unreadable.
    pub fn seed() -> Self {
        Self {
            items: vec![
                seed_item(
                    "1",
                    "Nebula's Embrace",
                    ItemKind::Art,
                    "A digital masterpiece capturing the ethereal dance of cosmic gases in the \
                     Orion Nebula. This piece explores the paradox of creation through \
                     destruction, as stars are born from the very chaos that consumes them. The \
                     swirling violets and deep cyans represent the duality of \
                     existence\u{2014}light emerging from darkness, order from entropy.",
                    299.99,
                    "https://images.unsplash.com/photo-1462331940025-496dfbfc7564?w=800&q=80",
                    (2024, 1, 15, 10, 30, 0),
                ),
                seed_item(
                    "2",
                    "The Paradox Protocol",
                    ItemKind::Article,
                    "In the vast expanse of digital consciousness, we find ourselves at the \
                     intersection of ancient wisdom and future technology. The Winchester Paradox \
                     is not merely a concept\u{2014}it is a living, breathing entity that exists \
                     in the space between what was and what will be.\n\nThis article explores the \
                     philosophical underpinnings of paradoxical existence, drawing from quantum \
                     mechanics, Eastern philosophy, and the emerging field of digital \
                     metaphysics. We examine how contradictions can coexist, how the observer \
                     shapes the observed, and how meaning emerges from the void.\n\nThe protocol \
                     demands that we embrace uncertainty, that we find comfort in the unknown, \
                     and that we recognize the infinite possibilities contained within every \
                     moment of indecision.",
                    0.0,
                    "https://images.unsplash.com/photo-1451187580459-43490279c0fa?w=800&q=80",
                    (2024, 2, 1, 14, 45, 0),
                ),
                seed_item(
                    "3",
                    "Void Crystal Pendant",
                    ItemKind::Product,
                    "Handcrafted obsidian pendant infused with bioluminescent resin. Each piece \
                     is unique, containing a fragment of the void that seems to pulse with inner \
                     light. The crystal has been treated with a proprietary process that creates \
                     the illusion of depth\u{2014}stare long enough, and you might see the \
                     universe staring back.",
                    149.99,
                    "https://images.unsplash.com/photo-1617038260897-41a1f14a8ca0?w=800&q=80",
                    (2024, 2, 10, 9, 0, 0),
                ),
            ],
            subscribers: Vec::new(),
            admin: AdminCredential::default(),
        }
    }
}

fn seed_item(
    id: &str,
    title: &str,
    kind: ItemKind,
    content: &str,
    price: f64,
    image: &str,
    (year, month, day, hour, min, sec): (i32, u32, u32, u32, u32, u32),
) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        content: content.to_string(),
        price,
        image: image.to_string(),
        created_at: Utc
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .unwrap_or_default(),
        status: ItemStatus::Active,
    }
}
