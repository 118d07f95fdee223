//! Header overlay: the mutable header set plugin code works on.
//!
//! The overlay is built once per request from the wire header vector. At that
//! moment a copy of the decoded headers is kept as the snapshot, and every later
//! change only touches the current set. The rewrite sent back to the gateway is
//! the [`HeaderDiff`] between the two.
//!
//! Names are case-insensitive (they are stored lowercased by [`HeaderMap`]) and
//! a name may carry several values. Diffing only looks at the first value of
//! each name. Names leave the runner in canonical form, see [`canonical_name`].

use http::header::{AsHeaderName, GetAll, Iter};
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::{trace, warn};

use crate::protocol::HeaderError;

/// Case-insensitive multi-value header store with an immutable snapshot of the original headers.
#[derive(Debug, Clone, Default)]
pub struct HeaderOverlay {
    current: HeaderMap,
    snapshot: HeaderMap,
}

impl HeaderOverlay {
    /// Creates an overlay whose snapshot is `original`.
    pub fn new(original: HeaderMap) -> Self {
        Self { snapshot: original.clone(), current: original }
    }

    /// Builds an overlay from raw name/value pairs, in order.
    ///
    /// Entries that are not valid header names or values are left out of both
    /// the current set and the snapshot, so they never show up in a diff.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let mut headers = HeaderMap::new();
        for (name, value) in entries {
            match (HeaderName::from_bytes(name), HeaderValue::from_bytes(value)) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => warn!(header_name = %String::from_utf8_lossy(name), "skip header that can't be represented"),
            }
        }
        Self::new(headers)
    }

    /// Returns the first value of `name`.
    pub fn get<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.current.get(name)
    }

    /// Returns every value of `name`.
    pub fn get_all<K: AsHeaderName>(&self, name: K) -> GetAll<'_, HeaderValue> {
        self.current.get_all(name)
    }

    pub fn contains_key<K: AsHeaderName>(&self, name: K) -> bool {
        self.current.contains_key(name)
    }

    /// Replaces every value of `name` with `value`.
    pub fn set<K, V>(&mut self, name: K, value: V) -> Result<(), HeaderError>
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let (name, value) = parse_pair(name, value)?;
        self.current.insert(name, value);
        Ok(())
    }

    /// Appends `value` to the values of `name`.
    pub fn add<K, V>(&mut self, name: K, value: V) -> Result<(), HeaderError>
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let (name, value) = parse_pair(name, value)?;
        self.current.append(name, value);
        Ok(())
    }

    /// Removes every value of `name`, returning whether it was present.
    pub fn remove<K: AsHeaderName>(&mut self, name: K) -> bool {
        self.current.remove(name).is_some()
    }

    /// Number of values in the current set.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, HeaderValue> {
        self.current.iter()
    }

    /// The headers as they were decoded from the wire.
    pub fn snapshot(&self) -> &HeaderMap {
        &self.snapshot
    }

    /// Computes the operations that turn the snapshot into the current set.
    pub fn diff(&self) -> HeaderDiff {
        diff(&self.snapshot, &self.current)
    }
}

impl AsRef<HeaderMap> for HeaderOverlay {
    fn as_ref(&self) -> &HeaderMap {
        &self.current
    }
}

impl AsMut<HeaderMap> for HeaderOverlay {
    fn as_mut(&mut self) -> &mut HeaderMap {
        &mut self.current
    }
}

fn parse_pair<K, V>(name: K, value: V) -> Result<(HeaderName, HeaderValue), HeaderError>
where
    HeaderName: TryFrom<K>,
    <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
    HeaderValue: TryFrom<V>,
    <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
{
    let name = HeaderName::try_from(name).map_err(Into::<http::Error>::into)?;
    let value = HeaderValue::try_from(value).map_err(Into::<http::Error>::into)?;
    Ok((name, value))
}

/// Spells `name` the way the gateway's own header handling does: the first
/// letter and every letter after a `-` uppercased, the rest lowercased.
///
/// ```
/// use ext_plugin_http::protocol::canonical_name;
/// use http::HeaderName;
///
/// assert_eq!(canonical_name(&HeaderName::from_static("x-trace")), "X-Trace");
/// assert_eq!(canonical_name(&HeaderName::from_static("www-authenticate")), "Www-Authenticate");
/// ```
pub fn canonical_name(name: &HeaderName) -> String {
    let mut upper = true;
    name.as_str()
        .chars()
        .map(|c| {
            let c = if upper { c.to_ascii_uppercase() } else { c };
            upper = c == '-';
            c
        })
        .collect()
}

/// A single header change to apply on the gateway side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderOp {
    /// Set the header to this value, replacing what the gateway has.
    Set(HeaderName, HeaderValue),
    /// Drop the header.
    Delete(HeaderName),
}

impl HeaderOp {
    pub fn name(&self) -> &HeaderName {
        match self {
            HeaderOp::Set(name, _) | HeaderOp::Delete(name) => name,
        }
    }

    pub fn value(&self) -> Option<&HeaderValue> {
        match self {
            HeaderOp::Set(_, value) => Some(value),
            HeaderOp::Delete(_) => None,
        }
    }
}

/// Ordered header operations; deletes come first, then sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderDiff {
    ops: Vec<HeaderOp>,
}

impl HeaderDiff {
    pub fn ops(&self) -> &[HeaderOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeaderOp> {
        self.ops.iter()
    }
}

impl IntoIterator for HeaderDiff {
    type Item = HeaderOp;
    type IntoIter = std::vec::IntoIter<HeaderOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a HeaderDiff {
    type Item = &'a HeaderOp;
    type IntoIter = std::slice::Iter<'a, HeaderOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// Diffs two header sets by name, then by first value.
///
/// - a name only in `snapshot` yields [`HeaderOp::Delete`]
/// - a name only in `current`, or whose first value differs, yields [`HeaderOp::Set`]
///   with the first current value
///
/// Each name appears at most once. The result depends only on the two arguments.
pub fn diff(snapshot: &HeaderMap, current: &HeaderMap) -> HeaderDiff {
    let mut ops = Vec::new();

    for name in snapshot.keys() {
        if !current.contains_key(name) {
            trace!(header_name = %name, "header deleted");
            ops.push(HeaderOp::Delete(name.clone()));
        }
    }

    for name in current.keys() {
        let Some(value) = current.get(name) else {
            continue;
        };
        if snapshot.get(name) != Some(value) {
            trace!(header_name = %name, "header set");
            ops.push(HeaderOp::Set(name.clone(), value.clone()));
        }
    }

    HeaderDiff { ops }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(entries: &[(&str, &str)]) -> HeaderOverlay {
        HeaderOverlay::from_entries(entries.iter().map(|(name, value)| (name.as_bytes(), value.as_bytes())))
    }

    fn set(name: &'static str, value: &'static str) -> HeaderOp {
        HeaderOp::Set(HeaderName::from_static(name), HeaderValue::from_static(value))
    }

    fn delete(name: &'static str) -> HeaderOp {
        HeaderOp::Delete(HeaderName::from_static(name))
    }

    #[test]
    fn untouched_overlay_has_empty_diff() {
        let headers = overlay(&[("Host", "example.com"), ("Accept", "*/*")]);
        assert_eq!(headers.get("host").unwrap(), "example.com");
        assert!(headers.diff().is_empty());
    }

    #[test]
    fn empty_overlay_has_empty_diff() {
        let headers = overlay(&[]);
        assert!(headers.is_empty());
        assert!(headers.diff().is_empty());
    }

    #[test]
    fn delete_update_and_add() {
        let mut headers = overlay(&[("A", "1"), ("B", "2")]);

        assert!(headers.remove("B"));
        headers.set("A", "3").unwrap();
        headers.set("C", "4").unwrap();

        let diff = headers.diff();
        assert_eq!(diff.len(), 3);
        assert!(diff.ops().contains(&delete("b")));
        assert!(diff.ops().contains(&set("a", "3")));
        assert!(diff.ops().contains(&set("c", "4")));
        assert_eq!(diff.ops()[0], delete("b"));
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut headers = overlay(&[("X-Trace", "abc")]);

        assert!(headers.contains_key("x-trace"));
        headers.set("X-TRACE", "abc").unwrap();

        assert_eq!(headers.len(), 1);
        assert!(headers.diff().is_empty());
    }

    #[test]
    fn setting_same_value_is_not_a_change() {
        let mut headers = overlay(&[("A", "1")]);
        headers.set("A", "1").unwrap();
        assert!(headers.diff().is_empty());
    }

    #[test]
    fn only_first_value_is_compared() {
        let mut headers = overlay(&[("Accept", "text/html"), ("Accept", "application/json")]);
        assert_eq!(headers.get_all("accept").iter().count(), 2);

        // a change past the first value is not reported
        headers.set("Accept", "text/html").unwrap();
        assert!(headers.diff().is_empty());

        headers.set("Accept", "*/*").unwrap();
        headers.add("Accept", "text/plain").unwrap();
        assert_eq!(headers.diff().ops(), &[set("accept", "*/*")]);
    }

    #[test]
    fn add_to_new_name_is_a_set() {
        let mut headers = overlay(&[]);
        headers.add("X-New", "1").unwrap();
        headers.add("X-New", "2").unwrap();

        assert_eq!(headers.diff().ops(), &[set("x-new", "1")]);
    }

    #[test]
    fn diff_is_recomputed_from_current_state() {
        let mut headers = overlay(&[("A", "1")]);

        headers.set("A", "2").unwrap();
        let first = headers.diff();
        assert_eq!(first.ops(), &[set("a", "2")]);

        headers.set("A", "1").unwrap();
        assert!(headers.diff().is_empty());
        // the earlier result is a value, not a view
        assert_eq!(first.ops(), &[set("a", "2")]);
        assert_eq!(headers.snapshot().get("a").unwrap(), "1");
    }

    #[test]
    fn diff_is_pure() {
        let mut snapshot = HeaderMap::new();
        snapshot.insert("a", HeaderValue::from_static("1"));
        let mut current = snapshot.clone();
        current.insert("b", HeaderValue::from_static("2"));

        assert_eq!(diff(&snapshot, &current), diff(&snapshot, &current));
        assert_eq!(diff(&snapshot, &current).ops(), &[set("b", "2")]);
        assert_eq!(diff(&current, &snapshot).ops(), &[delete("b")]);
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let headers = overlay(&[("bad name", "1"), ("Good", "ok"), ("Bad-Value", "a\nb")]);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("good").unwrap(), "ok");
        assert!(headers.diff().is_empty());
    }

    #[test]
    fn keeps_opaque_wire_values() {
        let headers = HeaderOverlay::from_entries([(&b"X-Raw"[..], &b"\xe9t\xe9"[..])]);

        assert_eq!(headers.get("x-raw").unwrap().as_bytes(), b"\xe9t\xe9");
        assert!(headers.diff().is_empty());
    }

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_name(&HeaderName::from_static("a")), "A");
        assert_eq!(canonical_name(&HeaderName::from_static("content-type")), "Content-Type");
        assert_eq!(canonical_name(&HeaderName::from_static("x-b3-traceid")), "X-B3-Traceid");
        assert_eq!(canonical_name(&HeaderName::from_static("x--y")), "X--Y");
    }

    #[test]
    fn rejects_invalid_plugin_input() {
        let mut headers = overlay(&[]);
        assert!(headers.set("bad name", "1").is_err());
        assert!(headers.add("Good", "a\r\nb").is_err());
        assert!(headers.is_empty());
    }

    #[test]
    fn direct_map_access_is_diffed() {
        let mut headers = overlay(&[("A", "1")]);
        headers.as_mut().clear();

        assert!(headers.as_ref().is_empty());
        assert_eq!(headers.diff().ops(), &[delete("a")]);
    }
}
