use std::fmt;

/// Composite key identifying a cached request, e.g. `["events", "e1"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryKey(parts.into_iter().map(Into::into).collect())
    }

    /// Key of the event list, also the prefix of every event key.
    pub fn events() -> Self {
        QueryKey::new(["events"])
    }

    /// Key of a single event.
    pub fn event(id: &str) -> Self {
        QueryKey::new(["events", id])
    }

    /// True if `prefix`'s parts are a leading run of this key's parts.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
