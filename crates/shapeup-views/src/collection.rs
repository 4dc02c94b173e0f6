//! Seams to the persistence layer.
//!
//! Views never query storage themselves. Listing goes through a
//! [`Collection`], an ordered, countable, cheaply cloned handle to a result
//! set. Single objects are [`Entity`] values whose fields can be read back as
//! [`FieldValues`].

use serde::Serialize;

use shapeup_core::ShapeupResult;

use crate::fields::FieldValues;

/// An ordered, countable result set that can be re-derived by cloning.
///
/// Cloning a collection must yield an independent handle over the same
/// results; the lister clones the listed collection before paginating it.
pub trait Collection: Clone + Send + Sync {
    type Item: Serialize + Clone + Send + Sync;

    /// Number of items in the collection.
    fn count(&self) -> usize;

    /// Whether the collection has any items.
    fn exists(&self) -> bool {
        self.count() > 0
    }

    /// Items in `start..end`, clamped to the collection bounds.
    fn slice(&self, start: usize, end: usize) -> Vec<Self::Item>;

    /// Every item, in order.
    fn items(&self) -> Vec<Self::Item> {
        self.slice(0, self.count())
    }
}

impl<T: Serialize + Clone + Send + Sync> Collection for Vec<T> {
    type Item = T;

    fn count(&self) -> usize {
        self.len()
    }

    fn slice(&self, start: usize, end: usize) -> Vec<T> {
        let end = end.min(self.len());
        let start = start.min(end);
        self[start..end].to_vec()
    }

    fn items(&self) -> Vec<T> {
        self.clone()
    }
}

/// A persisted object that can report its current field values.
///
/// The default implementation reads the fields through `Serialize`; override
/// it when the serialized form carries more than the editable fields.
pub trait Entity: Serialize + Send + Sync {
    fn field_values(&self) -> ShapeupResult<FieldValues> {
        FieldValues::from_serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Note {
        pk: u32,
        body: String,
    }

    impl Entity for Note {}

    #[test]
    fn test_vec_collection() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(items.count(), 5);
        assert!(items.exists());
        assert_eq!(items.slice(1, 3), vec![2, 3]);
        assert_eq!(items.slice(3, 99), vec![4, 5]);
        assert!(items.slice(9, 12).is_empty());
        assert_eq!(Collection::items(&items).len(), 5);
    }

    #[test]
    fn test_empty_collection() {
        let items: Vec<String> = Vec::new();
        assert!(!items.exists());
        assert!(Collection::items(&items).is_empty());
    }

    #[test]
    fn test_entity_field_values() {
        let note = Note {
            pk: 3,
            body: "hello".into(),
        };
        let fields = note.field_values().unwrap();
        assert_eq!(fields.get_str("body"), Some("hello"));
        assert_eq!(fields.get("pk"), Some(&serde_json::json!(3)));
    }
}
