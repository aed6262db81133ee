/// Delimiter separating an event name from its optional namespace tag.
pub const NAMESPACE_DELIMITER: char = '.';

/// A registration key split into its base event name and optional namespace.
///
/// The grammar is `name` or `name.namespace`: at most one tag, split on the
/// first delimiter only, so `"sync.remote.push"` is the event `sync` tagged
/// `remote.push`. An empty suffix (`"sync."`) means no namespace.
///
/// # Example
/// ```
/// use ns_events::EventKey;
///
/// let key = EventKey::parse("click.toolbar");
/// assert_eq!(key.name, "click");
/// assert_eq!(key.namespace, Some("toolbar"));
///
/// assert_eq!(EventKey::parse("click").namespace, None);
/// assert_eq!(EventKey::parse("click.").namespace, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventKey<'a> {
    /// Base event name, the primary key of the registry.
    pub name: &'a str,
    /// Optional tag enabling bulk removal of listeners across events.
    pub namespace: Option<&'a str>,
}

impl<'a> EventKey<'a> {
    /// Split a raw key on the first [`NAMESPACE_DELIMITER`].
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once(NAMESPACE_DELIMITER) {
            Some((name, namespace)) => Self {
                name,
                namespace: (!namespace.is_empty()).then_some(namespace),
            },
            None => Self {
                name: raw,
                namespace: None,
            },
        }
    }
}
