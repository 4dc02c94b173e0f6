//! An insertion-ordered dictionary that can hold multiple values per key.
//!
//! Submitted form data and query strings can repeat a key, and the order in
//! which fields arrive matters when the data is echoed back into a template.
//! [`MultiValueDict`] keeps keys in first-insertion order and values in
//! append order.

/// A dictionary that maps keys to lists of values, preserving key order.
///
/// [`get`](MultiValueDict::get) returns the **last** value for a key, while
/// [`get_list`](MultiValueDict::get_list) returns all values.
///
/// # Examples
///
/// ```
/// use shapeup_core::utils::MultiValueDict;
///
/// let mut d = MultiValueDict::new();
/// d.append("color", "red");
/// d.append("size", "large");
/// d.append("color", "blue");
///
/// assert_eq!(d.get(&"color"), Some(&"blue"));
/// assert_eq!(d.get_list(&"color"), Some(&["red", "blue"][..]));
/// assert_eq!(d.keys().copied().collect::<Vec<_>>(), vec!["color", "size"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueDict<K, V> {
    entries: Vec<(K, Vec<V>)>,
}

impl<K, V> Default for MultiValueDict<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> MultiValueDict<K, V> {
    /// Creates an empty `MultiValueDict`.
    pub fn new() -> Self {
        Self::default()
    }

    fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Returns the last value associated with the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.get_list(key).and_then(<[V]>::last)
    }

    /// Returns all values associated with the key.
    pub fn get_list<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.position(key).map(|i| self.entries[i].1.as_slice())
    }

    /// Sets the value for a key, replacing any existing values but keeping
    /// the key's original position.
    pub fn set(&mut self, key: K, value: V) {
        match self.position(&key) {
            Some(i) => self.entries[i].1 = vec![value],
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Appends a value to the list for the given key.
    pub fn append(&mut self, key: K, value: V) {
        match self.position(&key) {
            Some(i) => self.entries[i].1.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Removes a key and returns its values.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Vec<V>>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Returns `true` if the dictionary contains the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.position(key).is_some()
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Returns an iterator over `(key, values)` pairs, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the dictionary contains no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> IntoIterator for MultiValueDict<K, V> {
    type Item = (K, Vec<V>);
    type IntoIter = std::vec::IntoIter<(K, Vec<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for MultiValueDict<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (k, v) in iter {
            dict.append(k, v);
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let d: MultiValueDict<String, String> = MultiValueDict::new();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn test_get_returns_last() {
        let mut d = MultiValueDict::new();
        d.append("a".to_string(), 1);
        d.append("a".to_string(), 2);
        assert_eq!(d.get("a"), Some(&2));
        assert_eq!(d.get_list("a"), Some(&[1, 2][..]));
    }

    #[test]
    fn test_set_replaces_and_keeps_position() {
        let mut d = MultiValueDict::new();
        d.append("a", 1);
        d.append("b", 2);
        d.append("a", 3);
        d.set("a", 9);
        assert_eq!(d.get_list(&"a"), Some(&[9][..]));
        assert_eq!(d.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut d = MultiValueDict::new();
        d.append("a", 1);
        d.append("b", 2);
        assert_eq!(d.remove(&"a"), Some(vec![1]));
        assert!(!d.contains_key(&"a"));
        assert_eq!(d.len(), 1);
        assert_eq!(d.remove(&"zzz"), None);
    }

    #[test]
    fn test_missing_key() {
        let d: MultiValueDict<String, i32> = MultiValueDict::new();
        assert_eq!(d.get("missing"), None);
        assert!(d.get_list("missing").is_none());
    }

    #[test]
    fn test_from_iter_groups_values() {
        let d: MultiValueDict<&str, i32> = vec![("x", 1), ("y", 2), ("x", 3)].into_iter().collect();
        assert_eq!(d.len(), 2);
        assert_eq!(d.get_list(&"x"), Some(&[1, 3][..]));
    }

    #[test]
    fn test_into_iter_preserves_order() {
        let mut d = MultiValueDict::new();
        d.append("z", 1);
        d.append("a", 2);
        let keys: Vec<_> = d.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
