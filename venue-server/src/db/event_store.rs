//! redb-backed event collection
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `events` | event id | JSON-serialized `Event` |
//!
//! Presentation order is derived from each record's `display_order`; there is
//! no separate ordering index. Every mutating operation runs in a single write
//! transaction, so readers either see the whole change or none of it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};
use shared::models::{Event, EventUpdate};

use super::{EventStore, RankPlan, StorageError, StorageResult, sort_by_display_order};

/// key = event id, value = JSON-serialized Event
const EVENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("events");

/// Event store backed by redb
#[derive(Clone)]
pub struct RedbEventStore {
    db: Arc<Database>,
}

impl RedbEventStore {
    /// Open or create the database at the given path
    ///
    /// redb commits are durable once `commit()` returns (copy-on-write with an
    /// atomic root swap), which is what gives reorders their all-or-nothing
    /// visibility.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(EVENTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

fn collect_sorted(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
) -> StorageResult<Vec<Event>> {
    let mut events = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        events.push(serde_json::from_slice::<Event>(value.value())?);
    }
    sort_by_display_order(&mut events);
    Ok(events)
}

fn put(table: &mut Table<'_, &'static str, &'static [u8]>, event: &Event) -> StorageResult<()> {
    let bytes = serde_json::to_vec(event)?;
    table.insert(event.id.as_str(), bytes.as_slice())?;
    Ok(())
}

impl EventStore for RedbEventStore {
    fn load_all(&self) -> StorageResult<Vec<Event>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;
        collect_sorted(&table)
    }

    fn get(&self, id: &str) -> StorageResult<Option<Event>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;
        let event = match table.get(id)? {
            Some(guard) => Some(serde_json::from_slice(guard.value())?),
            None => None,
        };
        Ok(event)
    }

    fn create(&self, mut event: Event) -> StorageResult<Event> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(EVENTS_TABLE)?;
            let existing = collect_sorted(&table)?;
            event.display_order = existing.len() as u32;
            put(&mut table, &event)?;
        }
        txn.commit()?;
        Ok(event)
    }

    fn update(&self, id: &str, update: EventUpdate, now: DateTime<Utc>) -> StorageResult<Event> {
        let txn = self.db.begin_write()?;
        let event = {
            let mut table = txn.open_table(EVENTS_TABLE)?;
            let mut event: Event = match table.get(id)? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => return Err(StorageError::EventNotFound(id.to_string())),
            };
            event.apply(update, now);
            put(&mut table, &event)?;
            event
        };
        txn.commit()?;
        Ok(event)
    }

    fn delete(&self, id: &str) -> StorageResult<Vec<Event>> {
        let txn = self.db.begin_write()?;
        let remaining = {
            let mut table = txn.open_table(EVENTS_TABLE)?;
            if table.remove(id)?.is_none() {
                return Err(StorageError::EventNotFound(id.to_string()));
            }

            // Close the gap left by the removed rank
            let mut remaining = collect_sorted(&table)?;
            for (rank, event) in remaining.iter_mut().enumerate() {
                let rank = rank as u32;
                if event.display_order != rank {
                    event.display_order = rank;
                    put(&mut table, event)?;
                }
            }
            remaining
        };
        txn.commit()?;
        Ok(remaining)
    }

    fn rerank(&self, plan: &mut RankPlan<'_>) -> StorageResult<Vec<Event>> {
        let txn = self.db.begin_write()?;
        let ordered = {
            let mut table = txn.open_table(EVENTS_TABLE)?;
            let current = collect_sorted(&table)?;
            let previous: Vec<String> = current.iter().map(|e| e.id.clone()).collect();
            let mut stored: HashMap<String, Event> = current
                .iter()
                .map(|e| (e.id.clone(), e.clone()))
                .collect();

            // Dropping the uncommitted transaction aborts it
            let planned = plan(current).map_err(StorageError::Rejected)?;

            let mut ordered = Vec::with_capacity(previous.len());
            let wanted = planned.iter().map(|e| e.id.as_str());
            for id in wanted.chain(previous.iter().map(String::as_str)) {
                if let Some(event) = stored.remove(id) {
                    ordered.push(event);
                }
            }

            for (rank, event) in ordered.iter_mut().enumerate() {
                let rank = rank as u32;
                if event.display_order != rank {
                    event.display_order = rank;
                    put(&mut table, event)?;
                }
            }
            ordered
        };
        txn.commit()?;
        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn event(id: &str, order: u32) -> Event {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        Event {
            id: id.to_string(),
            title: format!("Event {id}"),
            date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            start_time: None,
            description: None,
            image_url: None,
            ticket_url: None,
            display_order: order,
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_empty_store() {
        let store = RedbEventStore::open_in_memory().unwrap();
        assert!(store.load_all().unwrap().is_empty());
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_create_appends_at_end() {
        let store = RedbEventStore::open_in_memory().unwrap();
        let a = store.create(event("a", 99)).unwrap();
        let b = store.create(event("b", 0)).unwrap();
        assert_eq!(a.display_order, 0);
        assert_eq!(b.display_order, 1);

        let all = store.load_all().unwrap();
        assert_eq!(ids(&all), vec!["a", "b"]);
    }

    fn ranks(events: &[Event]) -> Vec<u32> {
        events.iter().map(|e| e.display_order).collect()
    }

    fn seeded(list: &[&str]) -> RedbEventStore {
        let store = RedbEventStore::open_in_memory().unwrap();
        for id in list {
            store.create(event(id, 0)).unwrap();
        }
        store
    }

    /// Plan that puts `wanted` first, like a client-supplied order
    fn put_first(wanted: &'static [&'static str]) -> impl FnMut(Vec<Event>) -> Result<Vec<Event>, String> {
        move |mut events: Vec<Event>| {
            events.sort_by_key(|e| {
                wanted
                    .iter()
                    .position(|w| *w == e.id)
                    .unwrap_or(usize::MAX)
            });
            Ok(events)
        }
    }

    fn renamed(title: &str) -> EventUpdate {
        EventUpdate {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_rerank_persists_plan_order() {
        let store = seeded(&["x", "y", "z"]);
        let result = store.rerank(&mut put_first(&["y", "z", "x"])).unwrap();
        assert_eq!(ids(&result), vec!["y", "z", "x"]);
        assert_eq!(ranks(&result), vec![0, 1, 2]);
        assert_eq!(store.load_all().unwrap(), result);
    }

    #[test]
    fn test_rerank_keeps_left_out_events_and_skips_unknown_ids() {
        let store = seeded(&["a", "b", "c", "d"]);
        let result = store
            .rerank(&mut |_events: Vec<Event>| Ok(vec![event("ghost", 0), event("c", 0)]))
            .unwrap();
        assert_eq!(ids(&result), vec!["c", "a", "b", "d"]);
        assert_eq!(ranks(&result), vec![0, 1, 2, 3]);
        assert!(store.get("ghost").unwrap().is_none());
    }

    #[test]
    fn test_rerank_writes_only_ranks() {
        let store = seeded(&["a", "b"]);
        let result = store
            .rerank(&mut |events: Vec<Event>| {
                Ok(events
                    .into_iter()
                    .rev()
                    .map(|mut e| {
                        e.title = "Clobbered".to_string();
                        e
                    })
                    .collect())
            })
            .unwrap();
        assert_eq!(ids(&result), vec!["b", "a"]);
        assert_eq!(store.get("a").unwrap().unwrap().title, "Event a");
    }

    #[test]
    fn test_rejected_plan_leaves_store_untouched() {
        let store = seeded(&["a", "b", "c"]);
        let err = store
            .rerank(&mut |_events: Vec<Event>| Err("not a permutation".to_string()))
            .unwrap_err();
        assert!(matches!(err, StorageError::Rejected(msg) if msg == "not a permutation"));

        let all = store.load_all().unwrap();
        assert_eq!(ids(&all), vec!["a", "b", "c"]);
        assert_eq!(ranks(&all), vec![0, 1, 2]);
    }

    #[test]
    fn test_update_missing_event() {
        let store = RedbEventStore::open_in_memory().unwrap();
        let err = store.update("ghost", renamed("X"), Utc::now()).unwrap_err();
        assert!(matches!(err, StorageError::EventNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_update_applies_fields() {
        let store = seeded(&["a"]);
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 8, 0, 0).unwrap();
        let updated = store.update("a", renamed("  Renamed "), now).unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.updated_at, now);
        assert_eq!(store.get("a").unwrap().unwrap(), updated);
    }

    #[test]
    fn test_update_after_reorder_keeps_new_rank() {
        let store = seeded(&["a", "b", "c"]);
        // A client holding this copy saw `a` at rank 0
        let seen = store.get("a").unwrap().unwrap();
        assert_eq!(seen.display_order, 0);

        store.rerank(&mut put_first(&["c", "b", "a"])).unwrap();
        let updated = store.update("a", renamed("Late Show"), Utc::now()).unwrap();
        assert_eq!(updated.display_order, 2);

        let all = store.load_all().unwrap();
        assert_eq!(ids(&all), vec!["c", "b", "a"]);
        assert_eq!(ranks(&all), vec![0, 1, 2]);
    }

    #[test]
    fn test_rerank_after_delete_does_not_restore_event() {
        let store = seeded(&["a", "b", "c"]);
        store.delete("b").unwrap();

        // The plan still names the deleted event
        let result = store.rerank(&mut put_first(&["c", "b", "a"])).unwrap();
        assert_eq!(ids(&result), vec!["c", "a"]);
        assert_eq!(ranks(&result), vec![0, 1]);
        assert!(store.get("b").unwrap().is_none());
    }

    #[test]
    fn test_concurrent_rerank_and_delete_keep_ranks_contiguous() {
        let ids_all = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let store = seeded(&ids_all);

        let mut workers = Vec::new();
        for round in 0..4 {
            let store = store.clone();
            workers.push(std::thread::spawn(move || {
                for _ in 0..10 {
                    let plan: &'static [&'static str] = if round % 2 == 0 {
                        &["h", "g", "f", "e", "d", "c", "b", "a"]
                    } else {
                        &["a", "c", "e", "g", "b", "d", "f", "h"]
                    };
                    store.rerank(&mut put_first(plan)).unwrap();
                }
            }));
        }
        let deleter = {
            let store = store.clone();
            std::thread::spawn(move || {
                for id in ["b", "e", "g"] {
                    store.delete(id).unwrap();
                }
            })
        };
        for worker in workers {
            worker.join().unwrap();
        }
        deleter.join().unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(ranks(&all), vec![0, 1, 2, 3, 4]);
        for id in ["b", "e", "g"] {
            assert!(store.get(id).unwrap().is_none());
        }
    }

    #[test]
    fn test_delete_compacts_ranks() {
        let store = RedbEventStore::open_in_memory().unwrap();
        for id in ["a", "b", "c", "d"] {
            store.create(event(id, 0)).unwrap();
        }

        let remaining = store.delete("b").unwrap();
        assert_eq!(ids(&remaining), vec!["a", "c", "d"]);
        let ranks: Vec<u32> = remaining.iter().map(|e| e.display_order).collect();
        assert_eq!(ranks, vec![0, 1, 2]);

        let reloaded = store.load_all().unwrap();
        assert_eq!(reloaded, remaining);
    }

    #[test]
    fn test_delete_missing_event() {
        let store = RedbEventStore::open_in_memory().unwrap();
        assert!(matches!(
            store.delete("nope"),
            Err(StorageError::EventNotFound(_))
        ));
    }

    #[test]
    fn test_reopen_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.redb");
        {
            let store = RedbEventStore::open(&path).unwrap();
            store.create(event("keep", 0)).unwrap();
        }
        let store = RedbEventStore::open(&path).unwrap();
        assert_eq!(ids(&store.load_all().unwrap()), vec!["keep"]);
    }
}
