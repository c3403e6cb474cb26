//! Header records and merge policy.
//!
//! A [`Header`] is a name with an ordered list of values. Headers are merged
//! into an outgoing request in order, and by default every value is
//! *appended*: giving the same name twice yields two values on the wire.
//! A header built with [`Header::replace`] drops the values already present
//! for its name before adding its own, so the last write wins.
//!
//! ```
//! use cora_core::{Header, apply_headers};
//! use http::HeaderMap;
//!
//! let mut map = HeaderMap::new();
//! apply_headers(
//!     &[
//!         Header::single("Accept", "text/html"),
//!         Header::single("Accept", "application/json"),
//!         Header::single("X-Mode", "a"),
//!         Header::replace("X-Mode", ["b"]),
//!     ],
//!     &mut map,
//! )
//! .expect("valid headers");
//!
//! assert_eq!(map.get_all("accept").iter().count(), 2);
//! assert_eq!(map.get("x-mode").map(|v| v.as_bytes()), Some(&b"b"[..]));
//! ```

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::{Error, Result};

/// How a [`Header`] combines with values already set for the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeaderMode {
    /// Add the values next to the existing ones.
    #[default]
    Append,
    /// Remove the existing values first.
    Replace,
}

/// A named, multi-valued header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    values: Vec<String>,
    mode: HeaderMode,
}

impl Header {
    /// Creates an appending header with the given values.
    #[must_use]
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            mode: HeaderMode::Append,
        }
    }

    /// Creates an appending header with a single value.
    #[must_use]
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, [value.into()])
    }

    /// Creates a header that overwrites any previous value for its name.
    ///
    /// With no values, the header is simply removed.
    #[must_use]
    pub fn replace<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            mode: HeaderMode::Replace,
            ..Self::new(name, values)
        }
    }

    /// Header name, as given.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header values, in order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Merge mode.
    #[must_use]
    pub const fn mode(&self) -> HeaderMode {
        self.mode
    }

    /// Merges this header into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the name or one of the values is not
    /// a valid HTTP header token. `target` is left untouched in that case.
    pub fn apply_to(&self, target: &mut HeaderMap) -> Result<()> {
        let name = HeaderName::from_bytes(self.name.as_bytes())
            .map_err(|e| Error::invalid_header(format!("{:?}: {e}", self.name)))?;
        let values = self
            .values
            .iter()
            .map(|value| {
                HeaderValue::from_str(value)
                    .map_err(|e| Error::invalid_header(format!("{name}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        if self.mode == HeaderMode::Replace {
            target.remove(&name);
        }
        for value in values {
            target.append(name.clone(), value);
        }
        Ok(())
    }
}

impl<N, V> From<(N, V)> for Header
where
    N: Into<String>,
    V: Into<String>,
{
    fn from((name, value): (N, V)) -> Self {
        Self::single(name, value)
    }
}

/// Merges `headers` into `target`, in order.
///
/// # Errors
///
/// Stops at the first invalid header, see [`Header::apply_to`].
pub fn apply_headers<'a>(
    headers: impl IntoIterator<Item = &'a Header>,
    target: &mut HeaderMap,
) -> Result<()> {
    headers
        .into_iter()
        .try_for_each(|header| header.apply_to(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(map: &HeaderMap, name: &str) -> Vec<String> {
        map.get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn header_constructors() {
        let header = Header::new("Accept", ["text/html", "application/json"]);
        assert_eq!(header.name(), "Accept");
        assert_eq!(header.values(), ["text/html", "application/json"]);
        assert_eq!(header.mode(), HeaderMode::Append);

        let header = Header::replace("Accept", ["*/*"]);
        assert_eq!(header.mode(), HeaderMode::Replace);

        let header = Header::from(("X-Id", "42"));
        assert_eq!(header, Header::single("X-Id", "42"));
    }

    #[test]
    fn duplicate_names_append() {
        let mut map = HeaderMap::new();
        apply_headers(
            &[
                Header::single("X-Tag", "a"),
                Header::new("x-tag", ["b", "c"]),
            ],
            &mut map,
        )
        .expect("valid headers");

        assert_eq!(values(&map, "x-tag"), ["a", "b", "c"]);
    }

    #[test]
    fn replace_wins_over_earlier_values() {
        let mut map = HeaderMap::new();
        apply_headers(
            &[
                Header::new("X-Tag", ["a", "b"]),
                Header::replace("X-Tag", ["z"]),
            ],
            &mut map,
        )
        .expect("valid headers");

        assert_eq!(values(&map, "x-tag"), ["z"]);
    }

    #[test]
    fn replace_without_values_removes() {
        let mut map = HeaderMap::new();
        apply_headers(
            &[
                Header::single("X-Tag", "a"),
                Header::replace("X-Tag", Vec::<String>::new()),
            ],
            &mut map,
        )
        .expect("valid headers");

        assert!(map.get("x-tag").is_none());
    }

    #[test]
    fn invalid_name_is_rejected() {
        let mut map = HeaderMap::new();
        let err = Header::single("bad name", "x")
            .apply_to(&mut map)
            .expect_err("space in name");
        assert!(matches!(err, Error::InvalidHeader(_)));
        assert!(map.is_empty());
    }

    #[test]
    fn invalid_value_leaves_map_untouched() {
        let mut map = HeaderMap::new();
        map.insert("x-tag", HeaderValue::from_static("keep"));

        let err = Header::replace("X-Tag", ["ok", "bad\nvalue"])
            .apply_to(&mut map)
            .expect_err("newline in value");
        assert!(err.is_construction());
        assert_eq!(values(&map, "x-tag"), ["keep"]);
    }
}
