use std::collections::HashSet;
use uuid::Uuid;

/// Unique-ID generator for cloned entries
///
/// Issues random version-4 UUIDs in their hyphenated textual form. Every ID
/// handed out by one generator is distinct: a collision with an earlier ID
/// is redrawn.
#[derive(Debug, Clone, Default)]
pub struct IDGenerator {
    issued: HashSet<Uuid>,
}

impl IDGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve IDs already present in a document so they are never reissued
    pub fn reserve<'a>(&mut self, existing: impl IntoIterator<Item = &'a str>) {
        self.issued
            .extend(existing.into_iter().filter_map(|id| Uuid::parse_str(id).ok()));
    }

    /// Generate next unique ID
    pub fn new_id(&mut self) -> String {
        loop {
            let id = Uuid::new_v4();
            if self.issued.insert(id) {
                return id.hyphenated().to_string();
            }
        }
    }

    /// Number of IDs issued or reserved so far
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}
