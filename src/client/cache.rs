use crate::model::{Item, ItemKind, Subscriber};

/// Which listing a cache mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemScope {
    /// Public views: only active items (`GET /api/items`).
    Active,
    /// Admin views: every item (`GET /api/items/all`).
    All,
}

impl ItemScope {
    fn admits(&self, item: &Item) -> bool {
        match self {
            ItemScope::Active => item.is_active(),
            ItemScope::All => true,
        }
    }
}

/// Client-side mirror of the catalog.
///
/// After a successful mutation the record returned by the server is spliced
/// in; the server's copy always wins over whatever the client submitted.
/// Callers only apply records from successful responses, so a failed
/// mutation never touches the cache.
#[derive(Debug, Clone)]
pub struct ClientCache {
    scope: ItemScope,
    items: Vec<Item>,
    subscribers: Vec<Subscriber>,
}

impl ClientCache {
    pub fn new(scope: ItemScope) -> Self {
        Self {
            scope,
            items: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn scope(&self) -> ItemScope {
        self.scope
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn subscribers(&self) -> &[Subscriber] {
        &self.subscribers
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Gallery filter: cached items of one kind, in cached order.
    pub fn items_of_kind(&self, kind: ItemKind) -> Vec<&Item> {
        self.items.iter().filter(|i| i.kind == kind).collect()
    }

    pub fn replace_items(&mut self, items: Vec<Item>) {
        self.items = items.into_iter().filter(|i| self.scope.admits(i)).collect();
    }

    pub fn replace_subscribers(&mut self, subscribers: Vec<Subscriber>) {
        self.subscribers = subscribers;
    }

    pub fn apply_created_item(&mut self, item: Item) {
        self.apply_updated_item(item);
    }

    /// Replace the cached copy by id, append if unseen, or drop it when the
    /// record no longer belongs in this scope.
    pub fn apply_updated_item(&mut self, item: Item) {
        let position = self.items.iter().position(|i| i.id == item.id);
        match (position, self.scope.admits(&item)) {
            (Some(index), true) => self.items[index] = item,
            (Some(index), false) => {
                self.items.remove(index);
            }
            (None, true) => self.items.push(item),
            (None, false) => {}
        }
    }

    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
    }

    pub fn apply_subscribed(&mut self, subscriber: Subscriber) {
        match self.subscribers.iter().position(|s| s.id == subscriber.id) {
            Some(index) => self.subscribers[index] = subscriber,
            None => self.subscribers.push(subscriber),
        }
    }

    pub fn remove_subscriber(&mut self, id: &str) {
        self.subscribers.retain(|s| s.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemStatus, Snapshot};

    fn seeded(scope: ItemScope) -> ClientCache {
        let mut cache = ClientCache::new(scope);
        cache.replace_items(Snapshot::seed().items);
        cache
    }

    #[test]
    fn update_replaces_in_place() {
        let mut cache = seeded(ItemScope::All);
        let mut item = cache.items()[1].clone();
        item.title = "Renamed".to_string();
        cache.apply_updated_item(item);

        assert_eq!(cache.items().len(), 3);
        assert_eq!(cache.items()[1].title, "Renamed");
    }

    #[test]
    fn deactivated_item_leaves_active_cache_only() {
        let mut active = seeded(ItemScope::Active);
        let mut all = seeded(ItemScope::All);
        let mut item = active.items()[0].clone();
        item.status = ItemStatus::Inactive;

        active.apply_updated_item(item.clone());
        all.apply_updated_item(item.clone());

        assert!(active.item(&item.id).is_none());
        assert_eq!(all.item(&item.id).map(|i| i.status), Some(ItemStatus::Inactive));
    }

    #[test]
    fn replace_filters_by_scope() {
        let mut items = Snapshot::seed().items;
        items[2].status = ItemStatus::Inactive;
        let mut cache = ClientCache::new(ItemScope::Active);
        cache.replace_items(items);
        assert_eq!(cache.items().len(), 2);
    }

    #[test]
    fn created_item_is_appended() {
        let mut cache = seeded(ItemScope::Active);
        let mut item = cache.items()[0].clone();
        item.id = "new".to_string();
        cache.apply_created_item(item);
        assert_eq!(cache.items().last().map(|i| i.id.as_str()), Some("new"));
    }

    #[test]
    fn kind_filter() {
        let cache = seeded(ItemScope::Active);
        let products = cache.items_of_kind(ItemKind::Product);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Void Crystal Pendant");
    }

    #[test]
    fn removals() {
        let mut cache = seeded(ItemScope::All);
        cache.remove_item("2");
        assert!(cache.item("2").is_none());
        cache.remove_item("missing");
        assert_eq!(cache.items().len(), 2);
    }
}
