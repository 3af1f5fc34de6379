//! The collection operation pipeline.
//!
//! A [`Collection`] binds a compiled schema to a storage adapter and a set
//! of lifecycle hooks, and drives the seven operation verbs as fixed
//! sequential chains:
//!
//! | verb   | chain                                                               |
//! |--------|---------------------------------------------------------------------|
//! | create | validate entity → before_create → before_save → adapter → after     |
//! | read   | validate query → before_read → adapter                              |
//! | update | validate update → before_update → before_save → adapter → after     |
//! | delete | validate query → before_delete → adapter → after                    |
//! | query  | validate query → before_query → adapter → after                     |
//! | count  | validate query → before_query → adapter                             |
//! | drop   | adapter                                                             |
//!
//! Every entry point clones its arguments before validation, so identifier
//! normalization and default-fill never touch the caller's values.

use crate::{DefaultHooks, LifecycleHooks, NullAdapter, SaveIntent, StorageAdapter};
use collections_core::{CollectionConfig, Record, ReadOptions, Result, UpdateDocument};
use collections_validator::{
    render_channel, CompiledSchema, IdNormalizer, ProjectionMap, RelationDescriptor,
    SchemaCompiler, TemplateDelimiters, ValidationPlan,
};
use tracing::debug;

/// A schema-validated view over one entity collection.
pub struct Collection {
    name: String,
    id_field: String,
    compiled: CompiledSchema,
    adapter: Box<dyn StorageAdapter>,
    hooks: Box<dyn LifecycleHooks>,
    delimiters: TemplateDelimiters,
}

impl Collection {
    /// Starts building a collection from its configuration.
    pub fn builder(config: CollectionConfig) -> CollectionBuilder {
        CollectionBuilder::new(config)
    }

    /// Builds a collection with the null adapter and default hooks.
    pub fn from_config(config: CollectionConfig) -> Self {
        CollectionBuilder::new(config).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// The compiled rule lists.
    pub fn plan(&self) -> &ValidationPlan {
        &self.compiled.plan
    }

    /// Relations declared by `entity` attributes.
    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.compiled.relations
    }

    /// The exclusion projection for non-readable fields.
    pub fn projection(&self) -> &ProjectionMap {
        &self.compiled.projection
    }

    /// Renders the collection's event channel names against a saved record.
    pub fn event_channels(&self, record: &Record) -> Vec<String> {
        self.compiled
            .event_channels
            .iter()
            .map(|template| render_channel(template, record, &self.delimiters))
            .collect()
    }

    /// Validates and persists a new record.
    pub fn create(&self, record: &Record) -> Result<Option<Record>> {
        debug!(collection = %self.name, "create");
        let mut record = record.clone();
        self.adapter.validate_entity(&self.compiled.plan, &mut record)?;
        let intent = self.hooks.before_create(record)?;
        self.save(intent)
    }

    /// Fetches a single record matching the filter.
    pub fn read(&self, filter: &Record, options: &ReadOptions) -> Result<Option<Record>> {
        debug!(collection = %self.name, "read");
        let mut filter = filter.clone();
        let options = self.with_projection(options.clone());
        self.adapter
            .validate_query(&self.compiled.plan, &mut filter, &options)?;
        let (filter, options) = self.hooks.before_read(filter, options)?;
        let result = self.adapter.read(&filter, &options)?;
        self.hooks.after_read(result)
    }

    /// Validates and applies an update document.
    pub fn update(
        &self,
        filter: &Record,
        update: &UpdateDocument,
        options: &ReadOptions,
    ) -> Result<Option<Record>> {
        debug!(collection = %self.name, "update");
        let mut filter = filter.clone();
        let mut update = update.clone();
        self.adapter
            .validate_update(&self.compiled.plan, &mut filter, &mut update, options)?;
        let intent = self.hooks.before_update(filter, update, options.clone())?;
        self.save(intent)
    }

    /// Deletes matching records, returning how many were removed.
    pub fn delete(&self, filter: &Record, options: &ReadOptions) -> Result<u64> {
        debug!(collection = %self.name, "delete");
        let mut filter = filter.clone();
        self.adapter
            .validate_query(&self.compiled.plan, &mut filter, options)?;
        let (filter, options) = self.hooks.before_delete(filter, options.clone())?;
        let deleted = self.adapter.delete(&filter, &options)?;
        self.hooks.after_delete(deleted)
    }

    /// Fetches every record matching the filter.
    pub fn query(&self, filter: &Record, options: &ReadOptions) -> Result<Vec<Record>> {
        debug!(collection = %self.name, "query");
        let mut filter = filter.clone();
        let options = self.with_projection(options.clone());
        self.adapter
            .validate_query(&self.compiled.plan, &mut filter, &options)?;
        let (filter, options) = self.hooks.before_query(filter, options)?;
        let results = self.adapter.query(&filter, &options)?;
        self.hooks.after_query(results)
    }

    /// Counts matching records.
    pub fn count(&self, filter: &Record) -> Result<u64> {
        debug!(collection = %self.name, "count");
        let mut filter = filter.clone();
        let options = ReadOptions::default();
        self.adapter
            .validate_query(&self.compiled.plan, &mut filter, &options)?;
        let (filter, _options) = self.hooks.before_query(filter, options)?;
        self.adapter.count(&filter)
    }

    /// Removes the collection's backing storage.
    pub fn drop_collection(&self) -> Result<()> {
        debug!(collection = %self.name, "drop");
        self.adapter.drop_storage()
    }

    /// Routes a save intent through `before_save` to the adapter write and
    /// its after-hook. A hook may have rerouted the intent, so the write
    /// side dispatches on the routed shape, not the entry verb.
    fn save(&self, intent: SaveIntent) -> Result<Option<Record>> {
        match self.hooks.before_save(intent)? {
            SaveIntent::Create { record } => {
                let result = self.adapter.create(&record)?;
                self.hooks.after_create(result)
            }
            SaveIntent::Update {
                filter,
                update,
                options,
            } => {
                let result = self.adapter.update(&filter, &update, &options)?;
                self.hooks.after_update(result)
            }
        }
    }

    /// Injects the compiled exclusion projection when the caller supplied
    /// none, so non-readable fields stay hidden by default.
    fn with_projection(&self, mut options: ReadOptions) -> ReadOptions {
        if options.projection.is_none() && !self.compiled.projection.is_empty() {
            options.projection = Some(self.compiled.projection.clone());
        }
        options
    }
}

/// Assembles a [`Collection`], compiling the schema at `build`.
pub struct CollectionBuilder {
    config: CollectionConfig,
    normalizer: IdNormalizer,
    adapter: Box<dyn StorageAdapter>,
    hooks: Box<dyn LifecycleHooks>,
    delimiters: TemplateDelimiters,
}

impl CollectionBuilder {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config,
            normalizer: IdNormalizer::identity(),
            adapter: Box::new(NullAdapter),
            hooks: Box::new(DefaultHooks),
            delimiters: TemplateDelimiters::default(),
        }
    }

    /// Sets the identifier normalizer applied by the compiled transform
    /// rules.
    pub fn normalizer(mut self, normalizer: IdNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Sets the storage adapter.
    pub fn adapter(mut self, adapter: impl StorageAdapter + 'static) -> Self {
        self.adapter = Box::new(adapter);
        self
    }

    /// Sets the lifecycle hooks.
    pub fn hooks(mut self, hooks: impl LifecycleHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Sets the event channel template delimiters.
    pub fn delimiters(mut self, delimiters: TemplateDelimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Compiles the schema and assembles the collection.
    pub fn build(self) -> Collection {
        let compiled = SchemaCompiler::new(self.normalizer).compile(&self.config);
        debug!(
            collection = %self.config.name,
            rules = compiled.plan.len(),
            relations = compiled.relations.len(),
            "compiled collection schema"
        );
        Collection {
            name: self.config.name.clone(),
            id_field: self.config.id_field.clone(),
            compiled,
            adapter: self.adapter,
            hooks: self.hooks,
            delimiters: self.delimiters,
        }
    }
}
