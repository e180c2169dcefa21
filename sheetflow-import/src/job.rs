//! Import job definition: batch size, rules and the capability hooks.
//!
//! A job declares any subset of the capabilities below. They are resolved
//! once in [`ImportJobBuilder::build`]; the importer never checks for them again
//! per batch.
//!
//! | capability | effect |
//! |---|---|
//! | [`RuleProvider`] | rules, message overrides, attribute names |
//! | [`RowAugmenter`] | derives extra columns per validated record |
//! | [`TransactionalSink`] | persists a batch inside begin/commit/rollback |
//! | [`PlainSink`] | receives a batch, no transaction |

use sheetflow_io::ReaderOptions;
use sheetflow_rules::{RuleEngine, RuleError, RuleSet, ValidationEngine};
use sheetflow_types::{Batch, CellValue, Record};
use std::fmt;

use crate::error::{ImportError, ImportResult, SinkResult};
use crate::transaction::TransactionManager;

/// Rows per batch when the job does not say otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Supplies the rules checked against every batch.
pub trait RuleProvider {
    fn rules(&self) -> Result<RuleSet, RuleError>;

    /// Message overrides keyed by `column.rule` or `rule`.
    fn messages(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Display names for columns, used in messages.
    fn attributes(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

impl RuleProvider for RuleSet {
    fn rules(&self) -> Result<RuleSet, RuleError> {
        Ok(self.clone())
    }
}

impl<T: RuleProvider + ?Sized> RuleProvider for &T {
    fn rules(&self) -> Result<RuleSet, RuleError> {
        (**self).rules()
    }

    fn messages(&self) -> Vec<(String, String)> {
        (**self).messages()
    }

    fn attributes(&self) -> Vec<(String, String)> {
        (**self).attributes()
    }
}

/// Adds derived columns to a validated record before it reaches the sink.
///
/// Runs once per record, so a batch keeps its row count and order.
pub trait RowAugmenter {
    fn add_columns(&self, record: Record) -> SinkResult<Record>;
}

impl<T: RowAugmenter + ?Sized> RowAugmenter for &T {
    fn add_columns(&self, record: Record) -> SinkResult<Record> {
        (**self).add_columns(record)
    }
}

/// Persists a batch inside a transaction owned by the sink.
pub trait TransactionalSink {
    /// Transaction scope wrapped around [`safely_persist`](Self::safely_persist).
    fn transactions(&mut self) -> &mut dyn TransactionManager;

    /// Writes the batch. Any error rolls back the whole batch.
    fn safely_persist(&mut self, batch: &Batch) -> SinkResult<()>;
}

impl<T: TransactionalSink + ?Sized> TransactionalSink for &mut T {
    fn transactions(&mut self) -> &mut dyn TransactionManager {
        (**self).transactions()
    }

    fn safely_persist(&mut self, batch: &Batch) -> SinkResult<()> {
        (**self).safely_persist(batch)
    }
}

/// Receives each validated batch without a transaction.
pub trait PlainSink {
    fn handle(&mut self, batch: &Batch) -> SinkResult<()>;
}

impl<T: PlainSink + ?Sized> PlainSink for &mut T {
    fn handle(&mut self, batch: &Batch) -> SinkResult<()> {
        (**self).handle(batch)
    }
}

/// Sets fixed values on every record, overwriting existing cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantColumns {
    columns: Vec<(String, CellValue)>,
}

impl ConstantColumns {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.columns.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for ConstantColumns {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl RowAugmenter for ConstantColumns {
    fn add_columns(&self, mut record: Record) -> SinkResult<Record> {
        for (column, value) in &self.columns {
            record.insert(column.clone(), value.clone());
        }
        Ok(record)
    }
}

struct FnAugmenter<F>(F);

impl<F> RowAugmenter for FnAugmenter<F>
where
    F: Fn(Record) -> SinkResult<Record>,
{
    fn add_columns(&self, record: Record) -> SinkResult<Record> {
        (self.0)(record)
    }
}

struct FnSink<F>(F);

impl<F> PlainSink for FnSink<F>
where
    F: FnMut(&Batch) -> SinkResult<()>,
{
    fn handle(&mut self, batch: &Batch) -> SinkResult<()> {
        (self.0)(batch)
    }
}

pub(crate) enum Sink<'a> {
    Transactional(Box<dyn TransactionalSink + 'a>),
    Plain(Box<dyn PlainSink + 'a>),
    DryRun,
}

/// A fully resolved import job.
pub struct ImportJob<'a> {
    pub(crate) batch_size: usize,
    pub(crate) rules: RuleSet,
    pub(crate) engine: Box<dyn ValidationEngine + 'a>,
    pub(crate) augmenter: Option<Box<dyn RowAugmenter + 'a>>,
    pub(crate) sink: Sink<'a>,
    pub(crate) reader: ReaderOptions,
}

impl fmt::Debug for ImportJob<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = match self.sink {
            Sink::Transactional(_) => "transactional",
            Sink::Plain(_) => "plain",
            Sink::DryRun => "dry-run",
        };
        f.debug_struct("ImportJob")
            .field("batch_size", &self.batch_size)
            .field("rules", &self.rules.len())
            .field("augmented", &self.augmenter.is_some())
            .field("sink", &sink)
            .field("reader", &self.reader)
            .finish()
    }
}

impl<'a> ImportJob<'a> {
    pub fn builder() -> ImportJobBuilder<'a> {
        ImportJobBuilder::default()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn reader_options(&self) -> &ReaderOptions {
        &self.reader
    }

    /// True when no sink was declared.
    pub fn is_dry_run(&self) -> bool {
        matches!(self.sink, Sink::DryRun)
    }
}

/// Builder for [`ImportJob`].
pub struct ImportJobBuilder<'a> {
    batch_size: usize,
    rules: Result<RuleSet, RuleError>,
    messages: Vec<(String, String)>,
    attributes: Vec<(String, String)>,
    engine: Option<Box<dyn ValidationEngine + 'a>>,
    custom: RuleEngine,
    augmenter: Option<Box<dyn RowAugmenter + 'a>>,
    transactional: Option<Box<dyn TransactionalSink + 'a>>,
    plain: Option<Box<dyn PlainSink + 'a>>,
    reader: ReaderOptions,
}

impl Default for ImportJobBuilder<'_> {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            rules: Ok(RuleSet::new()),
            messages: Vec::new(),
            attributes: Vec::new(),
            engine: None,
            custom: RuleEngine::new(),
            augmenter: None,
            transactional: None,
            plain: None,
            reader: ReaderOptions::default(),
        }
    }
}

impl<'a> ImportJobBuilder<'a> {
    #[must_use]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Takes rules, messages and attributes from `provider`.
    #[must_use]
    pub fn rules(mut self, provider: impl RuleProvider) -> Self {
        self.rules = provider.rules();
        self.messages.extend(provider.messages());
        self.attributes.extend(provider.attributes());
        self
    }

    #[must_use]
    pub fn messages<K, V>(mut self, messages: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn attributes<K, V>(mut self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Registers a predicate for a custom rule kind on the default engine.
    #[must_use]
    pub fn custom_rule<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&CellValue, Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.custom = self.custom.with_rule(name, predicate);
        self
    }

    /// Replaces the default [`RuleEngine`]. Messages, attributes and custom
    /// rules given to this builder are then ignored.
    #[must_use]
    pub fn engine(mut self, engine: impl ValidationEngine + 'a) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }

    #[must_use]
    pub fn augmenter(mut self, augmenter: impl RowAugmenter + 'a) -> Self {
        self.augmenter = Some(Box::new(augmenter));
        self
    }

    /// Closure form of [`augmenter`](Self::augmenter).
    #[must_use]
    pub fn add_columns<F>(self, f: F) -> Self
    where
        F: Fn(Record) -> SinkResult<Record> + 'a,
    {
        self.augmenter(FnAugmenter(f))
    }

    #[must_use]
    pub fn transactional_sink(mut self, sink: impl TransactionalSink + 'a) -> Self {
        self.transactional = Some(Box::new(sink));
        self
    }

    #[must_use]
    pub fn plain_sink(mut self, sink: impl PlainSink + 'a) -> Self {
        self.plain = Some(Box::new(sink));
        self
    }

    /// Closure form of [`plain_sink`](Self::plain_sink).
    #[must_use]
    pub fn handle<F>(self, f: F) -> Self
    where
        F: FnMut(&Batch) -> SinkResult<()> + 'a,
    {
        self.plain_sink(FnSink(f))
    }

    #[must_use]
    pub fn reader_options(mut self, options: ReaderOptions) -> Self {
        self.reader = options;
        self
    }

    /// Resolves the job. Fails before any row is read when the definition is
    /// unusable.
    pub fn build(self) -> ImportResult<ImportJob<'a>> {
        if self.batch_size == 0 {
            return Err(ImportError::JobDefinition(
                "batch size must be at least 1".to_string(),
            ));
        }
        let rules = self
            .rules
            .map_err(|e| ImportError::JobDefinition(format!("invalid rules: {e}")))?;

        let sink = match (self.transactional, self.plain) {
            (Some(_), Some(_)) => {
                return Err(ImportError::JobDefinition(
                    "declare either a transactional or a plain sink, not both".to_string(),
                ));
            }
            (Some(sink), None) => Sink::Transactional(sink),
            (None, Some(sink)) => Sink::Plain(sink),
            (None, None) => Sink::DryRun,
        };

        let engine = match self.engine {
            Some(engine) => engine,
            None => Box::new(
                self.custom
                    .with_messages(self.messages)
                    .with_attributes(self.attributes),
            ),
        };

        Ok(ImportJob {
            batch_size: self.batch_size,
            rules,
            engine,
            augmenter: self.augmenter,
            sink,
            reader: self.reader,
        })
    }
}
