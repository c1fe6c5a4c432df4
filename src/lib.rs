#![forbid(unsafe_code)]

mod encode;
mod error;
mod href;
mod matcher;
mod nested;
mod pattern;
mod query;
mod route;

pub use crate::encode::{encode_component, safe_string};
pub use crate::error::Error;
pub use crate::href::{build_href, HrefParts};
pub use crate::matcher::{MatchResult, Router};
pub use crate::nested::{nested_routes, NestedRoute};
pub use crate::pattern::RoutePattern;
pub use crate::query::{EnumLookup, QueryMap, QueryRead, QueryReader};
pub use crate::route::{
    apply_defaults, Label, LabelArgs, LabelFn, MetaFn, MetaObject, Params, QueryFn, QueryObject,
    QuerySerializer, ReaderFactory, Route, RouteDefaults, SerializeArgs, ValueEncoder,
};
