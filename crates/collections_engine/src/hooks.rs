//! Lifecycle hook contract.
//!
//! Hooks let an application intercept the operation chain around the
//! adapter call. Every method has a pass-through default, so implementors
//! override only the stages they care about. Hooks are injected as a trait
//! object at collection construction.

use collections_core::{Record, ReadOptions, Result, UpdateDocument};

/// What `before_save` is about to hand to the adapter: a fresh record or an
/// update against existing ones. `before_create` and `before_update`
/// produce it, and a hook may rewrite it — including rerouting a create
/// into an update (upsert-style) or vice versa.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveIntent {
    /// Persist a new record.
    Create { record: Record },
    /// Apply an update document to matching records.
    Update {
        filter: Record,
        update: UpdateDocument,
        options: ReadOptions,
    },
}

impl SaveIntent {
    /// True when this intent persists a new record.
    pub fn is_new(&self) -> bool {
        matches!(self, SaveIntent::Create { .. })
    }
}

/// Interception points around the adapter call.
pub trait LifecycleHooks: Send + Sync {
    /// Shapes a validated record into a create intent.
    fn before_create(&self, record: Record) -> Result<SaveIntent> {
        Ok(SaveIntent::Create { record })
    }

    /// Shapes a validated update into an update intent.
    fn before_update(
        &self,
        filter: Record,
        update: UpdateDocument,
        options: ReadOptions,
    ) -> Result<SaveIntent> {
        Ok(SaveIntent::Update {
            filter,
            update,
            options,
        })
    }

    /// Last stop before the adapter write; routes by intent.
    fn before_save(&self, intent: SaveIntent) -> Result<SaveIntent> {
        Ok(intent)
    }

    fn before_read(
        &self,
        filter: Record,
        options: ReadOptions,
    ) -> Result<(Record, ReadOptions)> {
        Ok((filter, options))
    }

    fn before_delete(
        &self,
        filter: Record,
        options: ReadOptions,
    ) -> Result<(Record, ReadOptions)> {
        Ok((filter, options))
    }

    fn before_query(
        &self,
        filter: Record,
        options: ReadOptions,
    ) -> Result<(Record, ReadOptions)> {
        Ok((filter, options))
    }

    fn after_create(&self, result: Option<Record>) -> Result<Option<Record>> {
        Ok(result)
    }

    fn after_update(&self, result: Option<Record>) -> Result<Option<Record>> {
        Ok(result)
    }

    fn after_read(&self, result: Option<Record>) -> Result<Option<Record>> {
        Ok(result)
    }

    fn after_query(&self, results: Vec<Record>) -> Result<Vec<Record>> {
        Ok(results)
    }

    fn after_delete(&self, deleted: u64) -> Result<u64> {
        Ok(deleted)
    }
}

/// The hooks a collection gets when none are supplied: every stage passes
/// its arguments through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl LifecycleHooks for DefaultHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use collections_core::{record, Value};

    #[test]
    fn test_default_hooks_pass_through() {
        let hooks = DefaultHooks;
        let doc = record([("id", Value::from("a"))]);

        let intent = hooks.before_create(doc.clone()).unwrap();
        assert_eq!(intent, SaveIntent::Create { record: doc.clone() });
        assert!(intent.is_new());

        let routed = hooks.before_save(intent).unwrap();
        assert!(routed.is_new());

        assert_eq!(hooks.after_create(Some(doc.clone())).unwrap(), Some(doc));
        assert_eq!(hooks.after_delete(3).unwrap(), 3);
    }

    #[test]
    fn test_update_intent_is_not_new() {
        let hooks = DefaultHooks;
        let intent = hooks
            .before_update(Record::new(), UpdateDocument::default(), ReadOptions::default())
            .unwrap();
        assert!(!intent.is_new());
    }
}
