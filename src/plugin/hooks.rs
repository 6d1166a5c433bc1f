//! Hook implementations

use serde_json::Value;

use super::{Plugin, Scope};
use crate::audit::{
    compute_diff, is_enabled, is_equal, is_loggable, Action, ChangeLog, IdentityKey,
    OperationContext, UpdateDiff,
};
use crate::error::{LoggableError, LoggableResult};
use crate::models::Model;

impl Plugin {
    /// Remember the loaded state of every loggable entity in the result
    pub fn after_query<E: Model + 'static>(&self, scope: &Scope<'_, E>) -> LoggableResult<()> {
        let ctx = scope.context();

        for entity in scope.target().iter() {
            if !is_loggable(entity) || !is_enabled(entity, ctx) {
                continue;
            }

            let Some(snapshot) = snapshot_of(entity) else {
                continue;
            };

            self.identity.save(IdentityKey::of(entity), snapshot)?;
        }

        Ok(())
    }

    /// Write a `create` record for every loggable entity
    pub fn after_create<E: Model + 'static>(
        &self,
        scope: &Scope<'_, E>,
    ) -> LoggableResult<Vec<ChangeLog>> {
        let ctx = scope.context();
        let mut writes = Writes::default();

        for entity in scope.target().iter() {
            if !is_loggable(entity) || !is_enabled(entity, ctx) {
                continue;
            }

            let Some(snapshot) = snapshot_of(entity) else {
                continue;
            };
            let Some(mut record) = build(entity, &snapshot, Action::Create, ctx, None) else {
                continue;
            };

            if writes.insert(scope, self.table_name(), &mut record) {
                self.remember(entity, snapshot);
                writes.push(record);
            }
        }

        writes.finish()
    }

    /// Write an `update` record for every loggable entity
    ///
    /// With lazy update enabled, entities whose state matches their last
    /// record on the configured fields produce no record.
    pub fn after_update<E: Model + 'static>(
        &self,
        scope: &Scope<'_, E>,
    ) -> LoggableResult<Vec<ChangeLog>> {
        let ctx = scope.context();
        let mut writes = Writes::default();

        for entity in scope.target().iter() {
            if !is_loggable(entity) || !is_enabled(entity, ctx) {
                continue;
            }

            let Some(snapshot) = snapshot_of(entity) else {
                continue;
            };

            if self.settings.lazy_update && self.unchanged_since_last_record(scope, entity, &snapshot) {
                tracing::debug!(
                    object_type = entity.table_name(),
                    object_id = %entity.primary_key(),
                    "state matches last change log, skipping update record"
                );
                continue;
            }

            let diff = if self.settings.compute_diff {
                self.diff_against_previous(entity, &snapshot)
            } else {
                None
            };

            let Some(mut record) = build(entity, &snapshot, Action::Update, ctx, diff.as_ref()) else {
                continue;
            };

            if writes.insert(scope, self.table_name(), &mut record) {
                self.remember(entity, snapshot);
                writes.push(record);
            }
        }

        writes.finish()
    }

    /// Write a `delete` record for every loggable entity
    pub fn after_delete<E: Model + 'static>(
        &self,
        scope: &Scope<'_, E>,
    ) -> LoggableResult<Vec<ChangeLog>> {
        let ctx = scope.context();
        let mut writes = Writes::default();

        for entity in scope.target().iter() {
            if !is_loggable(entity) || !is_enabled(entity, ctx) {
                continue;
            }

            let Some(snapshot) = snapshot_of(entity) else {
                continue;
            };
            let Some(mut record) = build(entity, &snapshot, Action::Delete, ctx, None) else {
                continue;
            };

            if writes.insert(scope, self.table_name(), &mut record) {
                if let Err(e) = self.identity.remove(&IdentityKey::of(entity)) {
                    tracing::warn!(error = %e, "failed to forget deleted entity snapshot");
                }
                writes.push(record);
            }
        }

        writes.finish()
    }

    fn unchanged_since_last_record<E: Model>(
        &self,
        scope: &Scope<'_, E>,
        entity: &E,
        snapshot: &Value,
    ) -> bool {
        let object_id = entity.primary_key().to_string();

        let last = match scope
            .store()
            .last_record_of(self.table_name(), entity.table_name(), &object_id)
        {
            Ok(last) => last,
            Err(e) => {
                tracing::warn!(
                    object_type = entity.table_name(),
                    object_id = %object_id,
                    error = %e,
                    "failed to fetch last change log for lazy update"
                );
                return false;
            }
        };

        let Some(last) = last else {
            return false;
        };

        match last.object() {
            Ok(recorded) => is_equal(&recorded, snapshot, &self.settings.lazy_update_fields),
            Err(e) => {
                tracing::warn!(record_id = %last.id, error = %e, "unreadable raw_object in change log");
                false
            }
        }
    }

    fn diff_against_previous<E: Model + 'static>(&self, entity: &E, snapshot: &Value) -> Option<UpdateDiff> {
        let loggable = entity.as_loggable()?;

        let previous = match self.identity.lookup(&IdentityKey::of(entity)) {
            Ok(Some(previous)) => previous,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read previous snapshot");
                return None;
            }
        };

        match self.schemas.schema_for(entity, loggable) {
            Ok(schema) => compute_diff(&previous, snapshot, &schema),
            Err(e) => {
                tracing::warn!(error = %e, "failed to resolve trackable fields");
                None
            }
        }
    }

    fn remember<E: Model>(&self, entity: &E, snapshot: Value) {
        if let Err(e) = self.identity.save(IdentityKey::of(entity), snapshot) {
            tracing::warn!(
                object_type = entity.table_name(),
                error = %e,
                "failed to remember entity snapshot"
            );
        }
    }
}

fn snapshot_of<E: Model>(entity: &E) -> Option<Value> {
    match serde_json::to_value(entity) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::error!(
                object_type = entity.table_name(),
                object_id = %entity.primary_key(),
                error = %e,
                "failed to serialize entity, skipping change log"
            );
            None
        }
    }
}

fn build<E: Model>(
    entity: &E,
    snapshot: &Value,
    action: Action,
    ctx: &OperationContext,
    diff: Option<&UpdateDiff>,
) -> Option<ChangeLog> {
    let record = ChangeLog::from_snapshot(entity, snapshot, action, ctx)
        .and_then(|record| match diff {
            Some(diff) => record.with_diff(diff),
            None => Ok(record),
        });

    match record {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::error!(
                object_type = entity.table_name(),
                object_id = %entity.primary_key(),
                action = action.as_str(),
                error = %e,
                "failed to build change log"
            );
            None
        }
    }
}

/// Outcome of the row writes of one hook invocation
///
/// A failed insert does not stop the remaining entities from being audited.
#[derive(Default)]
struct Writes {
    written: Vec<ChangeLog>,
    failures: Vec<LoggableError>,
}

impl Writes {
    /// Persist `record`, returning whether the write succeeded
    fn insert<E>(&mut self, scope: &Scope<'_, E>, table: &str, record: &mut ChangeLog) -> bool {
        match scope.store().insert(table, record) {
            Ok(()) => {
                tracing::debug!(
                    record_id = %record.id,
                    object_type = %record.object_type,
                    object_id = %record.object_id,
                    action = record.action.as_str(),
                    "change log written"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    object_type = %record.object_type,
                    object_id = %record.object_id,
                    action = record.action.as_str(),
                    error = %e,
                    "failed to write change log"
                );
                self.failures.push(e);
                false
            }
        }
    }

    fn push(&mut self, record: ChangeLog) {
        self.written.push(record);
    }

    /// The written rows, or an error when any write failed
    ///
    /// A lone failure with nothing written comes back unchanged; otherwise
    /// the error carries the rows that did persist.
    fn finish(mut self) -> LoggableResult<Vec<ChangeLog>> {
        if self.failures.is_empty() {
            return Ok(self.written);
        }

        if self.failures.len() == 1 && self.written.is_empty() {
            return Err(self.failures.remove(0));
        }

        let failed = self.failures.len();
        Err(LoggableError::PartialWrite {
            written: self.written,
            failed,
            first: Box::new(self.failures.remove(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::NULL_JSON;
    use crate::config::Settings;
    use crate::error::LoggableError;
    use crate::models::{FieldDescriptor, Loggable, PrimaryKey, User};
    use crate::storage::{ChangeLogStore, MemoryStore};
    use serde::ser::{Error as _, Serializer};
    use serde::Serialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ITEM_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::untracked("id"),
        FieldDescriptor::tracked("source"),
        FieldDescriptor::tracked("count"),
        FieldDescriptor::untracked("touched"),
    ];

    #[derive(Debug, Clone, Serialize)]
    struct Item {
        id: i64,
        source: String,
        count: u32,
        touched: u32,
        #[serde(skip)]
        disabled: bool,
    }

    impl Item {
        fn new(id: i64, source: &str) -> Self {
            Self {
                id,
                source: source.to_string(),
                count: 0,
                touched: 0,
                disabled: false,
            }
        }
    }

    impl Model for Item {
        fn table_name(&self) -> &str {
            "items"
        }

        fn primary_key(&self) -> PrimaryKey {
            self.id.into()
        }

        fn as_loggable(&self) -> Option<&dyn Loggable> {
            Some(self)
        }
    }

    impl Loggable for Item {
        fn fields(&self) -> &'static [FieldDescriptor] {
            ITEM_FIELDS
        }

        fn is_enabled(&self) -> bool {
            !self.disabled
        }
    }

    #[derive(Serialize)]
    struct Plain {
        id: i64,
    }

    impl Model for Plain {
        fn table_name(&self) -> &str {
            "plains"
        }

        fn primary_key(&self) -> PrimaryKey {
            self.id.into()
        }
    }

    struct FailingStore;

    impl ChangeLogStore for FailingStore {
        fn insert(&self, _table: &str, _record: &mut ChangeLog) -> LoggableResult<()> {
            Err(LoggableError::Storage("disk full".into()))
        }

        fn records(&self, _table: &str, _object_id: &str) -> LoggableResult<Vec<ChangeLog>> {
            Err(LoggableError::Storage("unavailable".into()))
        }

        fn get(&self, _table: &str, _record_id: &str) -> LoggableResult<Option<ChangeLog>> {
            Ok(None)
        }

        fn recent(&self, _table: &str, _count: usize) -> LoggableResult<Vec<ChangeLog>> {
            Ok(Vec::new())
        }
    }

    /// Delegates to a memory store but fails the `fail_on`-th insert
    struct FlakyStore {
        inner: MemoryStore,
        fail_on: usize,
        inserts: AtomicUsize,
    }

    impl FlakyStore {
        fn failing_on(fail_on: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_on,
                inserts: AtomicUsize::new(0),
            }
        }
    }

    impl ChangeLogStore for FlakyStore {
        fn insert(&self, table: &str, record: &mut ChangeLog) -> LoggableResult<()> {
            if self.inserts.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(LoggableError::Storage("connection reset".into()));
            }
            self.inner.insert(table, record)
        }

        fn records(&self, table: &str, object_id: &str) -> LoggableResult<Vec<ChangeLog>> {
            self.inner.records(table, object_id)
        }

        fn get(&self, table: &str, record_id: &str) -> LoggableResult<Option<ChangeLog>> {
            self.inner.get(table, record_id)
        }

        fn recent(&self, table: &str, count: usize) -> LoggableResult<Vec<ChangeLog>> {
            self.inner.recent(table, count)
        }
    }

    /// Answers the typed last-record query but refuses full history scans
    struct NoHistoryStore(MemoryStore);

    impl ChangeLogStore for NoHistoryStore {
        fn insert(&self, table: &str, record: &mut ChangeLog) -> LoggableResult<()> {
            self.0.insert(table, record)
        }

        fn records(&self, _table: &str, _object_id: &str) -> LoggableResult<Vec<ChangeLog>> {
            Err(LoggableError::Storage("history scan not allowed".into()))
        }

        fn get(&self, table: &str, record_id: &str) -> LoggableResult<Option<ChangeLog>> {
            self.0.get(table, record_id)
        }

        fn recent(&self, table: &str, count: usize) -> LoggableResult<Vec<ChangeLog>> {
            self.0.recent(table, count)
        }

        fn last_record_of(
            &self,
            table: &str,
            object_type: &str,
            object_id: &str,
        ) -> LoggableResult<Option<ChangeLog>> {
            self.0.last_record_of(table, object_type, object_id)
        }
    }

    /// Loggable entity whose serialization always fails
    struct Broken {
        id: i64,
    }

    impl Serialize for Broken {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot serialize broken entity"))
        }
    }

    impl Model for Broken {
        fn table_name(&self) -> &str {
            "brokens"
        }

        fn primary_key(&self) -> PrimaryKey {
            self.id.into()
        }

        fn as_loggable(&self) -> Option<&dyn Loggable> {
            Some(self)
        }
    }

    impl Loggable for Broken {
        fn fields(&self) -> &'static [FieldDescriptor] {
            &[]
        }
    }

    fn plugin() -> Plugin {
        Plugin::register("change_logs").unwrap()
    }

    #[test]
    fn test_non_loggable_produces_nothing() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let plain = Plain { id: 1 };
        let scope = Scope::one(&plain, &ctx, &store);

        plugin.after_query(&scope).unwrap();
        assert!(plugin.after_create(&scope).unwrap().is_empty());
        assert!(plugin.after_update(&scope).unwrap().is_empty());
        assert!(plugin.after_delete(&scope).unwrap().is_empty());

        assert_eq!(store.count("change_logs").unwrap(), 0);
        assert!(plugin.identity().is_empty().unwrap());
    }

    #[test]
    fn test_suppressed_context_produces_nothing() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new().suppressed();
        let item = Item::new(1, "a");
        let scope = Scope::one(&item, &ctx, &store);

        assert!(plugin.after_create(&scope).unwrap().is_empty());
        assert!(plugin.after_update(&scope).unwrap().is_empty());
        assert!(plugin.after_delete(&scope).unwrap().is_empty());
        assert_eq!(store.count("change_logs").unwrap(), 0);
    }

    #[test]
    fn test_disabled_instance_produces_nothing() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let mut item = Item::new(1, "a");
        item.disabled = true;

        let written = plugin.after_create(&Scope::one(&item, &ctx, &store)).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_create_record() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new().with_user(User::new("alice", "1", "admin"));
        let item = Item::new(1, "a");

        let written = plugin.after_create(&Scope::one(&item, &ctx, &store)).unwrap();

        assert_eq!(written.len(), 1);
        let record = &written[0];
        assert_eq!(record.action, Action::Create);
        assert_eq!(record.raw_diff, NULL_JSON);
        assert_eq!(record.object().unwrap().get("source"), Some(&json!("a")));
        assert_eq!(record.actor().name, "alice");
        assert!(record.created_at.is_some());
        assert_eq!(store.all("change_logs").unwrap(), written);
    }

    #[test]
    fn test_update_after_read_has_single_field_diff() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let mut item = Item::new(1, "a");

        plugin.after_query(&Scope::one(&item, &ctx, &store)).unwrap();

        item.source = "b".into();
        item.touched += 1;
        let written = plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap();

        let diff = written[0].diff().unwrap().unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.get("source").unwrap().old, json!("a"));
        assert_eq!(diff.get("source").unwrap().new, json!("b"));
    }

    #[test]
    fn test_update_without_prior_read_has_null_diff() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let item = Item::new(1, "a");

        let written = plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written[0].raw_diff, NULL_JSON);
    }

    #[test]
    fn test_update_with_diff_disabled() {
        let plugin = Plugin::new(Settings::default().with_compute_diff(false)).unwrap();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let mut item = Item::new(1, "a");

        plugin.after_query(&Scope::one(&item, &ctx, &store)).unwrap();
        item.source = "b".into();
        let written = plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap();

        assert_eq!(written[0].raw_diff, NULL_JSON);
    }

    #[test]
    fn test_update_refreshes_snapshot() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let mut item = Item::new(1, "a");

        plugin.after_create(&Scope::one(&item, &ctx, &store)).unwrap();
        item.source = "b".into();
        plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap();
        item.count = 3;
        let written = plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap();

        let diff = written[0].diff().unwrap().unwrap();
        assert_eq!(diff.fields().collect::<Vec<_>>(), vec!["count"]);
    }

    #[test]
    fn test_lazy_update_skips_unchanged() {
        let plugin = Plugin::new(Settings::default().with_lazy_update(["source"])).unwrap();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let mut item = Item::new(1, "a");

        plugin.after_create(&Scope::one(&item, &ctx, &store)).unwrap();

        // Only an ignored field changed
        item.touched = 9;
        assert!(plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap().is_empty());

        item.source = "b".into();
        assert_eq!(plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap().len(), 1);
        assert_eq!(store.count("change_logs").unwrap(), 2);
    }

    #[test]
    fn test_lazy_update_whole_snapshot() {
        let plugin = Plugin::new(Settings::default().with_lazy_update(Vec::<String>::new())).unwrap();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let mut item = Item::new(1, "a");

        plugin.after_create(&Scope::one(&item, &ctx, &store)).unwrap();
        assert!(plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap().is_empty());

        item.touched = 1;
        assert_eq!(plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap().len(), 1);
    }

    #[test]
    fn test_lazy_update_without_history_records() {
        let plugin = Plugin::new(Settings::default().with_lazy_update(["source"])).unwrap();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let item = Item::new(1, "a");

        let written = plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn test_delete_record() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let item = Item::new(1, "a");

        plugin.after_query(&Scope::one(&item, &ctx, &store)).unwrap();
        let written = plugin.after_delete(&Scope::one(&item, &ctx, &store)).unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written[0].action, Action::Delete);
        assert_eq!(written[0].raw_diff, NULL_JSON);
        assert!(plugin.identity().is_empty().unwrap());
    }

    #[test]
    fn test_query_over_result_set() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let items = vec![Item::new(1, "a"), Item::new(2, "b"), Item::new(3, "c")];

        plugin.after_query(&Scope::many(&items, &ctx, &store)).unwrap();

        assert_eq!(plugin.identity().len().unwrap(), 3);
        let snapshot = plugin
            .identity()
            .lookup(&IdentityKey::new("items", &PrimaryKey::Int(2)))
            .unwrap()
            .unwrap();
        assert_eq!(snapshot["source"], json!("b"));
        assert_eq!(store.count("change_logs").unwrap(), 0);
    }

    #[test]
    fn test_create_over_result_set() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let mut items = vec![Item::new(1, "a"), Item::new(2, "b")];
        items[1].disabled = true;

        let written = plugin.after_create(&Scope::many(&items, &ctx, &store)).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].object_id, "1");
    }

    #[test]
    fn test_repeated_create_writes_distinct_rows() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let item = Item::new(1, "a");

        let first = plugin.after_create(&Scope::one(&item, &ctx, &store)).unwrap();
        let second = plugin.after_create(&Scope::one(&item, &ctx, &store)).unwrap();

        assert_ne!(first[0].id, second[0].id);
        assert_eq!(store.count("change_logs").unwrap(), 2);
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let plugin = plugin();
        let ctx = OperationContext::new();
        let item = Item::new(1, "a");

        let err = plugin
            .after_create(&Scope::one(&item, &ctx, &FailingStore))
            .unwrap_err();
        assert!(matches!(err, LoggableError::Storage(_)));
        // Nothing was recorded, so no baseline either
        assert!(plugin.identity().is_empty().unwrap());
    }

    #[test]
    fn test_lazy_update_query_failure_falls_through_to_write() {
        let plugin = Plugin::new(Settings::default().with_lazy_update(["source"])).unwrap();
        let ctx = OperationContext::new();
        let item = Item::new(1, "a");

        // The history lookup fails, so the hook goes on to write and surfaces that error
        let err = plugin
            .after_update(&Scope::one(&item, &ctx, &FailingStore))
            .unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_history_and_last_record() {
        let plugin = plugin();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let mut item = Item::new(1, "a");

        plugin.after_create(&Scope::one(&item, &ctx, &store)).unwrap();
        item.source = "b".into();
        plugin.after_update(&Scope::one(&item, &ctx, &store)).unwrap();

        let history = plugin.history(&store, "1").unwrap();
        assert_eq!(history.len(), 2);
        let last = plugin.last_record(&store, "1").unwrap().unwrap();
        assert_eq!(last.action, Action::Update);
        assert!(plugin.last_record(&store, "2").unwrap().is_none());
    }

    #[test]
    fn test_failed_write_does_not_stop_remaining_entities() {
        let plugin = plugin();
        let store = FlakyStore::failing_on(2);
        let ctx = OperationContext::new();
        let items: Vec<_> = (1..=4).map(|i| Item::new(i, "a")).collect();

        plugin.after_query(&Scope::many(&items, &ctx, &store)).unwrap();
        let err = plugin
            .after_delete(&Scope::many(&items, &ctx, &store))
            .unwrap_err();

        match &err {
            LoggableError::PartialWrite { written, failed, first } => {
                assert_eq!(*failed, 1);
                assert!(matches!(**first, LoggableError::Storage(_)));
                let ids: Vec<_> = written.iter().map(|r| r.object_id.as_str()).collect();
                assert_eq!(ids, vec!["1", "3", "4"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.written().len(), 3);
        assert_eq!(store.inner.count("change_logs").unwrap(), 3);

        // Only the entity whose delete row was lost keeps its baseline
        assert_eq!(plugin.identity().len().unwrap(), 1);
        assert!(plugin
            .identity()
            .lookup(&IdentityKey::new("items", &PrimaryKey::Int(2)))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_failed_create_keeps_other_baselines() {
        let plugin = plugin();
        let store = FlakyStore::failing_on(1);
        let ctx = OperationContext::new();
        let items = vec![Item::new(1, "a"), Item::new(2, "b")];

        let err = plugin
            .after_create(&Scope::many(&items, &ctx, &store))
            .unwrap_err();

        assert_eq!(err.written().len(), 1);
        assert_eq!(err.written()[0].object_id, "2");
        assert_eq!(plugin.identity().len().unwrap(), 1);
    }

    #[test]
    fn test_unserializable_entity_is_skipped() {
        let plugin = Plugin::new(Settings::default().with_lazy_update(Vec::<String>::new())).unwrap();
        let store = MemoryStore::new();
        let ctx = OperationContext::new();
        let broken = Broken { id: 1 };
        let scope = Scope::one(&broken, &ctx, &store);

        plugin.after_query(&scope).unwrap();
        assert_eq!(plugin.after_create(&scope).unwrap(), Vec::new());
        assert_eq!(plugin.after_update(&scope).unwrap(), Vec::new());
        assert_eq!(plugin.after_delete(&scope).unwrap(), Vec::new());

        assert_eq!(store.count("change_logs").unwrap(), 0);
        assert!(plugin.identity().is_empty().unwrap());
    }

    #[test]
    fn test_lazy_update_uses_typed_last_record() {
        let plugin = Plugin::new(Settings::default().with_lazy_update(["source"])).unwrap();
        let store = NoHistoryStore(MemoryStore::new());
        let ctx = OperationContext::new();
        let item = Item::new(1, "a");

        plugin.after_create(&Scope::one(&item, &ctx, &store)).unwrap();

        assert!(plugin
            .after_update(&Scope::one(&item, &ctx, &store))
            .unwrap()
            .is_empty());
        assert_eq!(store.0.count("change_logs").unwrap(), 1);
    }
}
