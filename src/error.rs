/// Errors raised while validating patterns, applying table defaults or
/// building hrefs. Resolution misses are not errors; see
/// [`Router::find`](crate::Router::find).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    #[error(
        "missing path parameters for {pattern:?}: missing {missing:?}, provided {provided:?}, expected {expected:?}"
    )]
    MissingParams {
        pattern: String,
        missing: Vec<String>,
        provided: Vec<String>,
        expected: Vec<String>,
    },

    #[error("{input:?} can not be interpreted as a url")]
    InvalidUrl { input: String },

    #[error("no route matched {url:?}; known paths: {candidates}")]
    NoMatch { url: String, candidates: String },

    #[error("route defaults require a query reader factory")]
    MissingReaderFactory,

    #[error("route defaults require a value encoder or a query serializer")]
    MissingValueProducer,
}
