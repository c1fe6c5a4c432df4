use crate::error::Error;
use crate::pattern::RoutePattern;
use crate::query::{QueryMap, QueryRead};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Decoded path parameters of a match.
pub type Params = HashMap<String, String>;

/// Typed query object: insertion-ordered keys, JSON values.
pub type QueryObject = serde_json::Map<String, Value>;

/// Typed metadata object produced by a route's meta hook.
pub type MetaObject = serde_json::Map<String, Value>;

pub type ReaderFactory = Arc<dyn Fn(QueryMap) -> Box<dyn QueryRead + Send + Sync> + Send + Sync>;
pub type QueryFn = Arc<dyn Fn(&dyn QueryRead) -> QueryObject + Send + Sync>;
pub type MetaFn = Arc<dyn Fn(&dyn QueryRead, &Params) -> MetaObject + Send + Sync>;
pub type ValueEncoder = Arc<dyn Fn(&Value) -> String + Send + Sync>;
pub type QuerySerializer<C> =
    Arc<dyn Fn(&QueryObject, &SerializeArgs<'_, C>) -> String + Send + Sync>;
pub type LabelFn<C> = Arc<dyn Fn(&LabelArgs<'_, C>) -> String + Send + Sync>;

/// Data handed to label and custom href hooks.
pub struct LabelArgs<'a, C> {
    pub params: &'a Params,
    pub query: &'a QueryObject,
    pub meta: &'a MetaObject,
    pub context: Option<&'a C>,
}

/// Data handed to a custom query serializer.
pub struct SerializeArgs<'a, C> {
    pub params: &'a Params,
    pub meta: &'a MetaObject,
    pub context: Option<&'a C>,
    /// The reader handed to [`build_href`](crate::build_href), or a
    /// reconstruction from the typed query object. The reconstruction is
    /// best-effort: multi-value grouping collapsed upstream can not be
    /// recovered from it.
    pub query_params: &'a dyn QueryRead,
}

/// A static or computed display label.
pub enum Label<C> {
    Text(String),
    Render(LabelFn<C>),
}

impl<C> Label<C> {
    pub fn dynamic(f: impl Fn(&LabelArgs<'_, C>) -> String + Send + Sync + 'static) -> Self {
        Label::Render(Arc::new(f))
    }

    pub fn render(&self, args: &LabelArgs<'_, C>) -> String {
        match self {
            Label::Text(text) => text.clone(),
            Label::Render(f) => f(args),
        }
    }
}

impl<C> Clone for Label<C> {
    fn clone(&self) -> Self {
        match self {
            Label::Text(text) => Label::Text(text.clone()),
            Label::Render(f) => Label::Render(f.clone()),
        }
    }
}

impl<C> fmt::Debug for Label<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Label::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl<C> From<&str> for Label<C> {
    fn from(text: &str) -> Self {
        Label::Text(text.to_owned())
    }
}

impl<C> From<String> for Label<C> {
    fn from(text: String) -> Self {
        Label::Text(text)
    }
}

/// One entry of a route table.
///
/// `path` is the route's identity; `title` is mandatory, everything else
/// optional. Absent hooks can be filled table-wide with
/// [`apply_defaults`]. `C` is the application context type handed through
/// to labels and serializers at render time.
pub struct Route<C> {
    pub path: RoutePattern,
    pub parent_path: Option<RoutePattern>,
    pub title: Label<C>,
    pub breadcrumb: Option<Label<C>>,
    /// Overrides href construction entirely when present.
    pub href: Option<LabelFn<C>>,
    pub reader_factory: Option<ReaderFactory>,
    pub get_query: Option<QueryFn>,
    pub get_meta: Option<MetaFn>,
    pub encode_query_value: Option<ValueEncoder>,
    pub serialize_query: Option<QuerySerializer<C>>,
}

impl<C> Route<C> {
    pub fn new(path: RoutePattern, title: impl Into<Label<C>>) -> Self {
        Self {
            path,
            parent_path: None,
            title: title.into(),
            breadcrumb: None,
            href: None,
            reader_factory: None,
            get_query: None,
            get_meta: None,
            encode_query_value: None,
            serialize_query: None,
        }
    }

    /// Validates `path` and builds a route in one step.
    pub fn parse(path: &str, title: impl Into<Label<C>>) -> Result<Self, Error> {
        Ok(Self::new(RoutePattern::parse(path)?, title))
    }

    pub fn with_parent(mut self, parent: RoutePattern) -> Self {
        self.parent_path = Some(parent);
        self
    }

    pub fn with_breadcrumb(mut self, label: impl Into<Label<C>>) -> Self {
        self.breadcrumb = Some(label.into());
        self
    }

    pub fn with_href(
        mut self,
        f: impl Fn(&LabelArgs<'_, C>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.href = Some(Arc::new(f));
        self
    }

    pub fn with_reader_factory(
        mut self,
        f: impl Fn(QueryMap) -> Box<dyn QueryRead + Send + Sync> + Send + Sync + 'static,
    ) -> Self {
        self.reader_factory = Some(Arc::new(f));
        self
    }

    pub fn with_query_fn(
        mut self,
        f: impl Fn(&dyn QueryRead) -> QueryObject + Send + Sync + 'static,
    ) -> Self {
        self.get_query = Some(Arc::new(f));
        self
    }

    pub fn with_meta_fn(
        mut self,
        f: impl Fn(&dyn QueryRead, &Params) -> MetaObject + Send + Sync + 'static,
    ) -> Self {
        self.get_meta = Some(Arc::new(f));
        self
    }

    pub fn with_encoder(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.encode_query_value = Some(Arc::new(f));
        self
    }

    pub fn with_serializer(
        mut self,
        f: impl Fn(&QueryObject, &SerializeArgs<'_, C>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.serialize_query = Some(Arc::new(f));
        self
    }
}

impl<C> Clone for Route<C> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            parent_path: self.parent_path.clone(),
            title: self.title.clone(),
            breadcrumb: self.breadcrumb.clone(),
            href: self.href.clone(),
            reader_factory: self.reader_factory.clone(),
            get_query: self.get_query.clone(),
            get_meta: self.get_meta.clone(),
            encode_query_value: self.encode_query_value.clone(),
            serialize_query: self.serialize_query.clone(),
        }
    }
}

impl<C> fmt::Debug for Route<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("parent_path", &self.parent_path)
            .field("title", &self.title)
            .finish()
    }
}

/// Table-wide fallbacks for routes that lack their own hooks.
pub struct RouteDefaults<C> {
    pub reader_factory: Option<ReaderFactory>,
    pub encode_query_value: Option<ValueEncoder>,
    pub serialize_query: Option<QuerySerializer<C>>,
}

impl<C> Default for RouteDefaults<C> {
    fn default() -> Self {
        Self {
            reader_factory: None,
            encode_query_value: None,
            serialize_query: None,
        }
    }
}

impl<C> RouteDefaults<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reader_factory(
        mut self,
        f: impl Fn(QueryMap) -> Box<dyn QueryRead + Send + Sync> + Send + Sync + 'static,
    ) -> Self {
        self.reader_factory = Some(Arc::new(f));
        self
    }

    pub fn with_encoder(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.encode_query_value = Some(Arc::new(f));
        self
    }

    pub fn with_serializer(
        mut self,
        f: impl Fn(&QueryObject, &SerializeArgs<'_, C>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.serialize_query = Some(Arc::new(f));
        self
    }
}

/// Returns a new table where every route missing a hook gets it from
/// `defaults`. Per-route customizations are never overwritten; the input
/// table is untouched.
///
/// A reader factory is mandatory, and at least one of encoder and
/// serializer must be present so every route ends up with a way to
/// produce query values.
pub fn apply_defaults<C>(
    routes: &[Route<C>],
    defaults: &RouteDefaults<C>,
) -> Result<Vec<Route<C>>, Error> {
    let factory = defaults
        .reader_factory
        .as_ref()
        .ok_or(Error::MissingReaderFactory)?;
    if defaults.encode_query_value.is_none() && defaults.serialize_query.is_none() {
        return Err(Error::MissingValueProducer);
    }

    Ok(routes
        .iter()
        .map(|route| {
            let mut route = route.clone();
            if route.reader_factory.is_none() {
                route.reader_factory = Some(factory.clone());
            }
            if route.encode_query_value.is_none() {
                route.encode_query_value = defaults.encode_query_value.clone();
            }
            if route.serialize_query.is_none() {
                route.serialize_query = defaults.serialize_query.clone();
            }
            route
        })
        .collect())
}
