use std::str::FromStr;

/// Multi-valued query data as parsed from a query string: per key, the
/// trimmed, non-empty values in arrival order with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryMap {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Self::default();
        for (key, value) in pairs {
            map.push(key.as_ref(), value.as_ref());
        }
        map
    }

    pub(crate) fn push(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if let Some((_, values)) = self.entries.iter_mut().find(|(k, _)| k == key) {
            if !values.iter().any(|v| v == value) {
                values.push(value.to_owned());
            }
            return;
        }
        self.entries.push((key.to_owned(), vec![value.to_owned()]));
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Options for [`QueryRead::enumerated`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumLookup {
    /// Also accept a variant key regardless of ASCII case.
    pub case_insensitive: bool,
    /// Also accept a variant *value* and map it back to its key.
    pub convert: bool,
}

/// Read access to parsed query data.
///
/// `value` and `values` are the base capability; the typed getters come
/// for free and parse the first raw value, yielding `None` when parsing
/// fails. Custom readers wrap a [`QueryReader`] and delegate the two
/// required methods.
pub trait QueryRead {
    /// First value for `key`.
    fn value(&self, key: &str) -> Option<&str>;

    /// All distinct values for `key`, in arrival order.
    fn values(&self, key: &str) -> &[String];

    fn number(&self, key: &str) -> Option<f64> {
        self.value(key)?.parse().ok()
    }

    fn integer(&self, key: &str) -> Option<i64> {
        self.value(key)?.parse().ok()
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        self.value(key)?.parse().ok()
    }

    #[cfg(feature = "date")]
    fn date(&self, key: &str) -> Option<chrono::NaiveDate> {
        self.value(key)?.parse().ok()
    }

    /// Looks the first value up in a `(key, value)` variant table.
    ///
    /// Strategy order: exact key match, case-insensitive key match (if
    /// enabled), value-to-key reverse lookup (if enabled). The first
    /// strategy that hits wins.
    fn enumerated<'t>(
        &self,
        key: &str,
        table: &'t [(&'t str, &'t str)],
        opts: EnumLookup,
    ) -> Option<&'t (&'t str, &'t str)> {
        let raw = self.value(key)?;
        if let Some(entry) = table.iter().find(|(k, _)| *k == raw) {
            return Some(entry);
        }
        if opts.case_insensitive {
            if let Some(entry) = table.iter().find(|(k, _)| k.eq_ignore_ascii_case(raw)) {
                return Some(entry);
            }
        }
        if opts.convert {
            if let Some(entry) = table.iter().find(|(_, v)| *v == raw) {
                return Some(entry);
            }
        }
        None
    }
}

/// The base reader over a [`QueryMap`].
#[derive(Debug, Clone, Default)]
pub struct QueryReader {
    map: QueryMap,
}

impl QueryReader {
    pub fn new(map: QueryMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &QueryMap {
        &self.map
    }

    /// Parses the first value for `key` into any [`FromStr`] type.
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.value(key)?.parse().ok()
    }
}

impl QueryRead for QueryReader {
    fn value(&self, key: &str) -> Option<&str> {
        self.map.get(key)?.first().map(String::as_str)
    }

    fn values(&self, key: &str) -> &[String] {
        self.map.get(key).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(pairs: &[(&str, &str)]) -> QueryReader {
        QueryReader::new(QueryMap::from_pairs(pairs.iter().cloned()))
    }

    #[test]
    fn values_are_trimmed_deduplicated_ordered() {
        let r = reader(&[
            ("tag", "  react"),
            ("tag", "react"),
            ("tag", "typescript"),
            ("tag", ""),
        ]);
        assert_eq!(r.values("tag"), ["react", "typescript"]);
        assert_eq!(r.value("tag"), Some("react"));
        assert!(r.values("missing").is_empty());
    }

    #[test]
    fn typed_getters_absorb_parse_failures() {
        let r = reader(&[("n", "12"), ("f", "2.5"), ("b", "true"), ("bad", "x")]);
        assert_eq!(r.integer("n"), Some(12));
        assert_eq!(r.number("f"), Some(2.5));
        assert_eq!(r.boolean("b"), Some(true));
        assert_eq!(r.integer("bad"), None);
        assert_eq!(r.boolean("bad"), None);
        assert_eq!(r.number("missing"), None);
        assert_eq!(r.parse::<u8>("n"), Some(12));
    }

    #[cfg(feature = "date")]
    #[test]
    fn date_getter_parses_iso_dates() {
        let r = reader(&[("since", "2025-06-01"), ("bad", "junk")]);
        assert_eq!(
            r.date("since"),
            chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(r.date("bad"), None);
    }

    #[test]
    fn enumerated_lookup_strategy_order() {
        const SORT: &[(&str, &str)] = &[("Newest", "n"), ("Oldest", "o")];

        let r = reader(&[("sort", "Newest")]);
        assert_eq!(r.enumerated("sort", SORT, EnumLookup::default()), Some(&SORT[0]));

        let r = reader(&[("sort", "newest")]);
        assert_eq!(r.enumerated("sort", SORT, EnumLookup::default()), None);
        let opts = EnumLookup {
            case_insensitive: true,
            ..EnumLookup::default()
        };
        assert_eq!(r.enumerated("sort", SORT, opts), Some(&SORT[0]));

        let r = reader(&[("sort", "o")]);
        assert_eq!(r.enumerated("sort", SORT, opts), None);
        let opts = EnumLookup {
            convert: true,
            ..opts
        };
        assert_eq!(r.enumerated("sort", SORT, opts), Some(&SORT[1]));
    }
}
