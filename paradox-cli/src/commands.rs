//! Operator subcommands that work on a data file directly, without a server.
//!
//! These never go through the recovering store: a broken file is reported,
//! not reset.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use paradox_lib::{Item, ItemKind, JsonFileStore, Snapshot, SnapshotStore};

/// Read a data file strictly.
pub async fn read_data(data_path: &Path) -> Result<Snapshot> {
    if !data_path.exists() {
        bail!("{} does not exist", data_path.display());
    }
    JsonFileStore::new(data_path)
        .read_strict()
        .await
        .with_context(|| format!("Parsing {} failed", data_path.display()))
}

/// Write the seed dataset. Refuses to replace an existing file unless `force`.
pub async fn run_init(data_path: &Path, force: bool, out: &mut impl Write) -> Result<()> {
    if data_path.exists() && !force {
        bail!(
            "{} already exists, use --force to overwrite",
            data_path.display()
        );
    }

    JsonFileStore::new(data_path)
        .save(&Snapshot::seed())
        .await
        .with_context(|| format!("Failed to create {}", data_path.display()))?;

    writeln!(out, "Created {} with default data", data_path.display())?;
    Ok(())
}

/// Items shown by `list`: active only unless `all`, optionally one kind.
pub fn select_items(snapshot: &Snapshot, all: bool, kind: Option<ItemKind>) -> Vec<&Item> {
    snapshot
        .items
        .iter()
        .filter(|i| all || i.is_active())
        .filter(|i| kind.map_or(true, |k| i.kind == k))
        .collect()
}

pub async fn run_list(
    data_path: &Path,
    all: bool,
    kind: Option<ItemKind>,
    out: &mut impl Write,
) -> Result<()> {
    let snapshot = read_data(data_path).await?;
    for item in select_items(&snapshot, all, kind) {
        let price = if item.price == 0.0 {
            "free".to_string()
        } else {
            format!("{:.2}", item.price)
        };
        let status = if item.is_active() { "" } else { " [inactive]" };
        writeln!(
            out,
            "{}  {:<8} {} ({}){}",
            item.id, item.kind, item.title, price, status
        )?;
    }
    Ok(())
}

pub async fn run_subscribers(data_path: &Path, out: &mut impl Write) -> Result<()> {
    let snapshot = read_data(data_path).await?;
    for subscriber in &snapshot.subscribers {
        writeln!(
            out,
            "{}  {}  {}",
            subscriber.id,
            subscriber.email,
            subscriber.subscribed_at.to_rfc3339()
        )?;
    }
    Ok(())
}

pub async fn run_validate(data_path: &Path, out: &mut impl Write) -> Result<()> {
    let snapshot = read_data(data_path).await?;
    let active = snapshot.items.iter().filter(|i| i.is_active()).count();
    writeln!(
        out,
        "\u{2713} {} is valid: {} items ({} active), {} subscribers",
        data_path.display(),
        snapshot.items.len(),
        active,
        snapshot.subscribers.len()
    )?;
    Ok(())
}
