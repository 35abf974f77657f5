//! Schema value model and dynamic resolution.
//!
//! A [`Schema`] is a JSON-Schema-like fragment whose leaves are either plain
//! JSON values or deferred producers: a [`SchemaHelper`] computes a whole
//! sub-fragment from the request context, a [`SchemaCallback`] defers a
//! single value until call time. [`resolve`] substitutes every deferred node
//! and yields a plain `serde_json::Value` ready for validation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{BoxError, ResolveError};
use crate::types::RequestContext;

/// A schema fragment whose field values are computed per request rather than
/// stored statically.
///
/// Implementations produce their fragment from the request context; the
/// produced fragment may itself contain further helper or callback nodes and
/// is resolved recursively with the same context.
pub trait SchemaHelper: Send + Sync {
    fn resolve(&self, ctx: &RequestContext) -> Result<Schema, BoxError>;
}

/// A single deferred value inside a schema.
///
/// The closure captures whatever arguments it needs; invoking it substitutes
/// the produced fragment in place.
#[derive(Clone)]
pub struct SchemaCallback(Arc<dyn Fn() -> Result<Schema, BoxError> + Send + Sync>);

impl SchemaCallback {
    pub fn new(func: impl Fn() -> Result<Schema, BoxError> + Send + Sync + 'static) -> Self {
        SchemaCallback(Arc::new(func))
    }

    /// Invoke the deferred producer.
    pub fn invoke(&self) -> Result<Schema, BoxError> {
        (self.0)()
    }
}

impl std::fmt::Debug for SchemaCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SchemaCallback(..)")
    }
}

/// A schema fragment: plain JSON, or a tree with deferred parts.
#[derive(Clone)]
pub enum Schema {
    /// Plain JSON fragment with no deferred parts.
    Static(Value),
    /// Object whose member values may themselves be deferred.
    Object(BTreeMap<String, Schema>),
    /// Array of fragments.
    Array(Vec<Schema>),
    /// Fragment computed per request by a helper.
    Helper(Arc<dyn SchemaHelper>),
    /// Single deferred value.
    Callback(SchemaCallback),
}

impl Schema {
    /// Build an object fragment from named members.
    pub fn object<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Schema::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap a deferred value producer.
    pub fn callback(func: impl Fn() -> Result<Schema, BoxError> + Send + Sync + 'static) -> Self {
        Schema::Callback(SchemaCallback::new(func))
    }

    /// Wrap a request-context-aware helper.
    pub fn helper(helper: impl SchemaHelper + 'static) -> Self {
        Schema::Helper(Arc::new(helper))
    }

    /// True if the tree contains a callback node at any depth.
    ///
    /// Pure detection: no callback is invoked.
    pub fn contains_callback(&self) -> bool {
        match self {
            Schema::Callback(_) => true,
            Schema::Object(members) => members.values().any(Schema::contains_callback),
            Schema::Array(items) => items.iter().any(Schema::contains_callback),
            Schema::Static(_) | Schema::Helper(_) => false,
        }
    }

    /// True if the tree contains any deferred node (callback or helper) and
    /// therefore must be resolved against a request context before use.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Schema::Callback(_) | Schema::Helper(_) => true,
            Schema::Object(members) => members.values().any(Schema::is_dynamic),
            Schema::Array(items) => items.iter().any(Schema::is_dynamic),
            Schema::Static(_) => false,
        }
    }

    /// Convert to a plain JSON value without invoking anything.
    ///
    /// Returns `Some` exactly when the tree is not dynamic.
    pub fn to_static(&self) -> Option<Value> {
        match self {
            Schema::Static(value) => Some(value.clone()),
            Schema::Object(members) => {
                let mut map = Map::new();
                for (key, sub) in members {
                    map.insert(key.clone(), sub.to_static()?);
                }
                Some(Value::Object(map))
            }
            Schema::Array(items) => {
                let values: Option<Vec<Value>> = items.iter().map(Schema::to_static).collect();
                Some(Value::Array(values?))
            }
            Schema::Helper(_) | Schema::Callback(_) => None,
        }
    }

    /// See [`resolve`].
    pub fn resolve(&self, ctx: &RequestContext) -> Result<Value, ResolveError> {
        resolve(self, ctx)
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Schema::Static(value)
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schema::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Schema::Object(members) => f.debug_tuple("Object").field(members).finish(),
            Schema::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Schema::Helper(_) => f.write_str("Helper(..)"),
            Schema::Callback(cb) => cb.fmt(f),
        }
    }
}

/// Resolve a schema tree into a plain JSON value.
///
/// Rebuilds the tree, invoking every helper against `ctx` and every callback
/// with its captured arguments; produced fragments are resolved recursively
/// with the same context, so nesting deferred nodes inside deferred nodes is
/// fine. Plain leaves pass through unchanged and the input is never mutated.
///
/// # Errors
///
/// A helper or callback failure propagates unchanged as [`ResolveError`];
/// classification is left to the caller.
pub fn resolve(schema: &Schema, ctx: &RequestContext) -> Result<Value, ResolveError> {
    match schema {
        Schema::Static(value) => Ok(value.clone()),
        Schema::Object(members) => {
            let mut map = Map::new();
            for (key, sub) in members {
                map.insert(key.clone(), resolve(sub, ctx)?);
            }
            Ok(Value::Object(map))
        }
        Schema::Array(items) => {
            let values: Result<Vec<Value>, ResolveError> =
                items.iter().map(|item| resolve(item, ctx)).collect();
            Ok(Value::Array(values?))
        }
        Schema::Helper(helper) => {
            let produced = helper.resolve(ctx).map_err(ResolveError::Helper)?;
            resolve(&produced, ctx)
        }
        Schema::Callback(callback) => {
            let produced = callback.invoke().map_err(ResolveError::Callback)?;
            resolve(&produced, ctx)
        }
    }
}
