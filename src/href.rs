use crate::encode::{encode_component, encode_pair, safe_string};
use crate::error::Error;
use crate::query::{QueryMap, QueryRead, QueryReader};
use crate::route::{MetaObject, Params, QueryObject, Route, SerializeArgs};

use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Inputs for [`build_href`].
pub struct HrefParts<'a, C> {
    pub params: &'a Params,
    pub query: &'a QueryObject,
    pub context: Option<&'a C>,
    /// An explicit fragment wins over any fragment carried by a match.
    pub fragment: Option<&'a str>,
    /// Reader handed to a custom serializer. When absent, a lossy
    /// reconstruction from `query` is used instead.
    pub query_params: Option<&'a dyn QueryRead>,
}

impl<'a, C> HrefParts<'a, C> {
    pub fn new(params: &'a Params, query: &'a QueryObject) -> Self {
        Self {
            params,
            query,
            context: None,
            fragment: None,
            query_params: None,
        }
    }
}

/// Builds `/path?query#fragment` for a route.
///
/// Every parameter named by the route's pattern must be present in
/// `parts.params`; extra entries are ignored with a warning. Each `[name]`
/// token occurrence is substituted with the percent-encoded value, so a
/// parameter used twice in the pattern lands twice in the path. Casing is
/// emitted exactly as produced.
pub fn build_href<C>(route: &Route<C>, parts: HrefParts<'_, C>) -> Result<String, Error> {
    let expected = route.path.param_names();

    let missing: Vec<String> = expected
        .iter()
        .filter(|name| !parts.params.contains_key(name.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        let mut provided: Vec<String> = parts.params.keys().cloned().collect();
        provided.sort();
        return Err(Error::MissingParams {
            pattern: route.path.to_string(),
            missing,
            provided,
            expected,
        });
    }

    let unused: Vec<&str> = parts
        .params
        .keys()
        .map(String::as_str)
        .filter(|key| !expected.iter().any(|name| name == key))
        .collect();
    if !unused.is_empty() {
        tracing::warn!(
            pattern = %route.path,
            unused = ?unused,
            "ignoring parameters not named by the route pattern"
        );
    }

    let mut path = route.path.as_str().to_owned();
    for name in &expected {
        if let Some(value) = parts.params.get(name) {
            let token = format!("[{}]", name);
            path = path.replace(&token, &encode_component(value, &[]));
        }
    }

    let query = serialize_query_part(route, &parts);
    let fragment = parts.fragment.map(encode_fragment);

    let mut href = String::with_capacity(path.len() + 2);
    href.push('/');
    href.push_str(&path);
    if let Some(query) = query {
        href.push('?');
        href.push_str(&query);
    }
    if let Some(fragment) = fragment {
        if !fragment.is_empty() {
            href.push('#');
            href.push_str(&fragment);
        }
    }
    Ok(href)
}

fn serialize_query_part<C>(route: &Route<C>, parts: &HrefParts<'_, C>) -> Option<String> {
    if let Some(serializer) = &route.serialize_query {
        let synthetic;
        let reader: &dyn QueryRead = match parts.query_params {
            Some(reader) => reader,
            None => {
                synthetic = synthetic_reader(parts.query);
                &synthetic
            }
        };
        let meta = match &route.get_meta {
            Some(f) => f(reader, parts.params),
            None => MetaObject::new(),
        };
        let args = SerializeArgs {
            params: parts.params,
            meta: &meta,
            context: parts.context,
            query_params: reader,
        };
        // the serializer's output is taken verbatim after trimming
        let out = serializer(parts.query, &args);
        let out = out.trim();
        if out.is_empty() {
            return None;
        }
        return Some(out.to_owned());
    }

    let mut pairs: Vec<String> = Vec::new();
    for (key, value) in parts.query.iter() {
        match value {
            Value::Null => continue,
            Value::Array(items) => {
                // emitted order is the sorted raw form, unlike the
                // arrival-ordered reader side
                let mut raws: Vec<String> =
                    items.iter().map(|item| raw_value(route, item)).collect();
                raws.sort();
                raws.dedup();
                for raw in raws {
                    pairs.push(encode_pair(key, &raw, &[]));
                }
            }
            other => pairs.push(encode_pair(key, &raw_value(route, other), &[])),
        }
    }
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("&"))
    }
}

/// Raw (not yet percent-encoded) form of one query value. A custom
/// encoder only ever supplies this raw form; the reserved-character pass
/// in [`encode_pair`] runs regardless.
fn raw_value<C>(route: &Route<C>, value: &Value) -> String {
    match &route.encode_query_value {
        Some(encoder) => encoder(value),
        None => safe_string(value),
    }
}

fn synthetic_reader(query: &QueryObject) -> QueryReader {
    let mut map = QueryMap::new();
    for (key, value) in query.iter() {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    map.push(key, &safe_string(item));
                }
            }
            other => map.push(key, &safe_string(other)),
        }
    }
    QueryReader::new(map)
}

/// Fragments may arrive encoded or raw. If decoding and re-encoding
/// reproduces the input (hex case aside), it was already encoded and is
/// emitted unchanged; otherwise the raw text is encoded.
fn encode_fragment(text: &str) -> String {
    let decoded = percent_decode_str(text).decode_utf8_lossy();
    let reencoded = encode_component(&decoded, &[]);
    if reencoded.eq_ignore_ascii_case(text) {
        text.to_owned()
    } else {
        encode_component(text, &[])
    }
}
