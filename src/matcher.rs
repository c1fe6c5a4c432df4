use crate::error::Error;
use crate::href::{build_href, HrefParts};
use crate::nested::{breadcrumb_trail, nested_routes, NestedRoute};
use crate::query::{QueryMap, QueryRead, QueryReader};
use crate::route::{LabelArgs, MetaObject, Params, QueryObject, Route};

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Base used to interpret relative inputs; never observable in output.
const RELATIVE_BASE: &str = "http://relative.invalid/";

const CANDIDATE_LIMIT: usize = 25;

/// An ordered route table.
///
/// Resolution scans in table order and the first matching pattern wins,
/// so more specific patterns must come before more general ones. The
/// table is never mutated by resolution; concurrent use is safe.
pub struct Router<C> {
    routes: Vec<Route<C>>,
}

impl<C> Router<C> {
    pub fn new(routes: Vec<Route<C>>) -> Self {
        Self { routes }
    }

    pub fn with_route(mut self, route: Route<C>) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_routes<I>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = Route<C>>,
    {
        self.routes.extend(routes);
        self
    }

    pub fn routes(&self) -> &[Route<C>] {
        &self.routes
    }

    /// Resolves `url` (absolute or relative) against the table.
    ///
    /// A URL matching no route is an absent result, not an error; use
    /// [`resolve`](Self::resolve) when a miss should fail.
    pub fn find(&self, url: &str) -> Option<MatchResult<'_, C>> {
        let parts = UrlParts::split(url)?;
        find_in(&self.routes, &parts)
    }

    /// Like [`find`](Self::find), but a miss or an uninterpretable input
    /// is an error naming the url and the known paths.
    pub fn resolve(&self, url: &str) -> Result<MatchResult<'_, C>, Error> {
        let parts = UrlParts::split(url).ok_or_else(|| Error::InvalidUrl {
            input: url.to_owned(),
        })?;
        match find_in(&self.routes, &parts) {
            Some(found) => Ok(found),
            None => Err(Error::NoMatch {
                url: url.to_owned(),
                candidates: candidate_list(&self.routes),
            }),
        }
    }

    /// The parent/child forest declared by the routes' `parent_path`
    /// links. Routes whose parent is not in the table are dropped.
    pub fn nested(&self) -> Vec<NestedRoute<'_, C>> {
        nested_routes(&self.routes)
    }

    /// Resolves `url` and walks its ancestor chain, returning labels from
    /// root to the matched route. `context` reaches only the matched
    /// route, not its ancestors.
    pub fn breadcrumbs(&self, url: &str, context: Option<&C>) -> Option<Vec<String>> {
        let found = self.find(url)?;
        Some(breadcrumb_trail(&self.routes, &found, context))
    }
}

/// Everything known about one resolved URL. Created fresh per call and
/// owned by the caller; nothing is cached.
pub struct MatchResult<'r, C> {
    pub route: &'r Route<C>,
    pub params: Params,
    pub query: QueryObject,
    pub meta: MetaObject,
    pub full_path: String,
    pub fragment: Option<String>,
}

impl<'r, C> MatchResult<'r, C> {
    pub fn title(&self, context: Option<&C>) -> String {
        self.route.title.render(&self.label_args(context))
    }

    /// The route's breadcrumb label, falling back to its title.
    pub fn breadcrumb(&self, context: Option<&C>) -> String {
        let args = self.label_args(context);
        match &self.route.breadcrumb {
            Some(label) => label.render(&args),
            None => self.route.title.render(&args),
        }
    }

    /// Rebuilds an href from the matched params, query and fragment,
    /// honoring the route's custom href hook when present.
    pub fn href(&self, context: Option<&C>) -> Result<String, Error> {
        if let Some(custom) = &self.route.href {
            return Ok(custom(&self.label_args(context)));
        }
        build_href(
            self.route,
            HrefParts {
                params: &self.params,
                query: &self.query,
                context,
                fragment: self.fragment.as_deref(),
                query_params: None,
            },
        )
    }

    /// Deserializes the typed query object into a caller type.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.query.clone()))
    }

    /// Deserializes the typed metadata object into a caller type.
    pub fn meta_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.meta.clone()))
    }

    fn label_args<'a>(&'a self, context: Option<&'a C>) -> LabelArgs<'a, C> {
        LabelArgs {
            params: &self.params,
            query: &self.query,
            meta: &self.meta,
            context,
        }
    }
}

impl<C> fmt::Debug for MatchResult<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("route", &self.route.path)
            .field("params", &self.params)
            .field("full_path", &self.full_path)
            .field("fragment", &self.fragment)
            .finish()
    }
}

struct UrlParts {
    /// Path without its leading slash, still percent-encoded.
    path: String,
    /// Query pairs decoded exactly once by the query-string parser.
    query: QueryMap,
    fragment: Option<String>,
}

impl UrlParts {
    fn split(input: &str) -> Option<Self> {
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse(RELATIVE_BASE).ok()?;
                base.join(input).ok()?
            }
            Err(_) => return None,
        };
        if url.cannot_be_a_base() {
            return None;
        }

        let path = url.path();
        let path = path.strip_prefix('/').unwrap_or(path).to_owned();

        let query = match url.query() {
            Some(raw) => QueryMap::from_pairs(form_urlencoded::parse(raw.as_bytes())),
            None => QueryMap::new(),
        };

        let fragment = url
            .fragment()
            .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned());

        Some(Self {
            path,
            query,
            fragment,
        })
    }
}

fn find_in<'r, C>(routes: &'r [Route<C>], parts: &UrlParts) -> Option<MatchResult<'r, C>> {
    for route in routes {
        let compiled = match route.path.compile() {
            Ok(compiled) => compiled,
            Err(_) => continue,
        };
        let caps = match compiled.match_path(&parts.path) {
            Some(caps) => caps,
            None => continue,
        };

        let mut params = Params::new();
        for (name, value) in caps {
            let decoded = percent_decode_str(&value).decode_utf8_lossy().into_owned();
            params.insert(name, decoded);
        }

        let reader: Box<dyn QueryRead + Send + Sync> = match &route.reader_factory {
            Some(factory) => factory(parts.query.clone()),
            None => Box::new(QueryReader::new(parts.query.clone())),
        };
        let reader: &dyn QueryRead = &*reader;
        let query = match &route.get_query {
            Some(f) => f(reader),
            None => QueryObject::new(),
        };
        let meta = match &route.get_meta {
            Some(f) => f(reader, &params),
            None => MetaObject::new(),
        };

        return Some(MatchResult {
            route,
            params,
            query,
            meta,
            full_path: format!("/{}", parts.path),
            fragment: parts.fragment.clone(),
        });
    }
    None
}

fn candidate_list<C>(routes: &[Route<C>]) -> String {
    let mut out = String::new();
    for (i, route) in routes.iter().take(CANDIDATE_LIMIT).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('/');
        out.push_str(route.path.as_str());
    }
    if routes.len() > CANDIDATE_LIMIT {
        out.push_str(", …");
    }
    out
}
