use super::{parse, ContentExpr, GrammarSyntaxError};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

static GLOBAL: Lazy<ExprCache> = Lazy::new(ExprCache::new);

/// A read-through cache from expression strings to parsed expressions.
///
/// Entries are immutable once inserted and never invalidated, so a single
/// cache can be shared by any number of schemas and threads.
#[derive(Debug, Default)]
pub struct ExprCache {
    entries: RwLock<HashMap<String, Arc<ContentExpr>>>,
}

impl ExprCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by [`parse_cached`].
    pub fn global() -> &'static ExprCache {
        &GLOBAL
    }

    /// Return the parsed expression for `source`, parsing it on first use.
    /// Syntax errors are not cached.
    pub fn get_or_parse(&self, source: &str) -> Result<Arc<ContentExpr>, GrammarSyntaxError> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(expr) = entries.get(source) {
                trace!(expression = source, "content expression cache hit");
                return Ok(Arc::clone(expr));
            }
        }

        trace!(expression = source, "content expression cache miss");
        let expr = Arc::new(parse(source)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(source.to_owned()).or_insert(expr)))
    }

    /// Number of cached expressions
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse an expression through the global [`ExprCache`].
pub fn parse_cached(source: &str) -> Result<Arc<ContentExpr>, GrammarSyntaxError> {
    ExprCache::global().get_or_parse(source)
}
