use std::collections::HashMap;

/// Maps tracker-local ids onto session-wide global ids.
///
/// The counter belongs to the session: a segment reset forgets the local ids but
/// keeps counting, so a pothole seen again after a blackout gets a new global id.
#[derive(Debug, Clone)]
pub struct IdentityRegistry {
    mapping: HashMap<u64, u32>,
    next_id: u32,
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self {
            mapping: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn resolve(&mut self, local_id: u64) -> u32 {
        if let Some(&id) = self.mapping.get(&local_id) {
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.mapping.insert(local_id, id);

        log::debug!("local track {} -> pothole {}", local_id, id);

        id
    }

    #[inline]
    pub fn get(&self, local_id: u64) -> Option<u32> {
        self.mapping.get(&local_id).copied()
    }

    pub fn reset(&mut self) {
        self.mapping.clear();
    }

    #[inline]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Number of global ids handed out so far
    #[inline]
    pub fn allocated(&self) -> u32 {
        self.next_id - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
