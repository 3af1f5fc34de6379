//! Storage adapter contract.
//!
//! An adapter binds a collection to an actual backend. The trait ships
//! default method bodies so a collection constructed without one still
//! behaves predictably: the validation entry points run the compiled plan,
//! and every persistence verb logs a not-implemented diagnostic and returns
//! an empty result instead of crashing the chain.

use collections_core::{Record, ReadOptions, Result, UpdateDocument};
use collections_validator::{
    validate_insert, validate_query, validate_update, ValidationPlan,
};
use tracing::warn;

/// Persistence backend for one collection.
///
/// The validation methods receive the compiled plan and the mutable payload
/// and are expected to run the matching rule lists, leaving normalized
/// identifiers and filled defaults behind in the payload. Backends that
/// validate elsewhere may override them as no-ops.
pub trait StorageAdapter: Send + Sync {
    /// Runs the insert rule list over a record bound for `create`.
    fn validate_entity(&self, plan: &ValidationPlan, record: &mut Record) -> Result<()> {
        validate_insert(plan, record)?;
        Ok(())
    }

    /// Runs the query rule list over a filter document.
    fn validate_query(
        &self,
        plan: &ValidationPlan,
        filter: &mut Record,
        _options: &ReadOptions,
    ) -> Result<()> {
        validate_query(plan, filter)?;
        Ok(())
    }

    /// Runs the query rule list over the filter and the four update rule
    /// lists over the update document.
    fn validate_update(
        &self,
        plan: &ValidationPlan,
        filter: &mut Record,
        update: &mut UpdateDocument,
        _options: &ReadOptions,
    ) -> Result<()> {
        validate_query(plan, filter)?;
        validate_update(plan, update)?;
        Ok(())
    }

    /// Persists a validated record, returning the saved form.
    fn create(&self, _record: &Record) -> Result<Option<Record>> {
        warn!("adapter does not implement create");
        Ok(None)
    }

    /// Fetches a single record matching the filter.
    fn read(&self, _filter: &Record, _options: &ReadOptions) -> Result<Option<Record>> {
        warn!("adapter does not implement read");
        Ok(None)
    }

    /// Applies an update document, returning the updated record when the
    /// backend reports one.
    fn update(
        &self,
        _filter: &Record,
        _update: &UpdateDocument,
        _options: &ReadOptions,
    ) -> Result<Option<Record>> {
        warn!("adapter does not implement update");
        Ok(None)
    }

    /// Deletes matching records, returning how many were removed.
    fn delete(&self, _filter: &Record, _options: &ReadOptions) -> Result<u64> {
        warn!("adapter does not implement delete");
        Ok(0)
    }

    /// Fetches every record matching the filter.
    fn query(&self, _filter: &Record, _options: &ReadOptions) -> Result<Vec<Record>> {
        warn!("adapter does not implement query");
        Ok(Vec::new())
    }

    /// Counts matching records.
    fn count(&self, _filter: &Record) -> Result<u64> {
        warn!("adapter does not implement count");
        Ok(0)
    }

    /// Removes the collection's backing storage entirely.
    fn drop_storage(&self) -> Result<()> {
        warn!("adapter does not implement drop");
        Ok(())
    }
}

/// The adapter a collection gets when none is supplied. Validates against
/// the plan and persists nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAdapter;

impl StorageAdapter for NullAdapter {}
