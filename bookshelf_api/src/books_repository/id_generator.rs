use crate::api::BookId;

/// Source of the opaque ids assigned to new books
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> BookId;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> BookId {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod id_generator_tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_uuid_ids_are_distinct() {
        let generator = UuidIdGenerator;
        let ids: HashSet<BookId> = (0..100).map(|_| generator.generate()).collect();
        assert_eq!(ids.len(), 100);
    }
}
