use crate::core::types::SongId;

/// Posting list for a term
/// Note: Sorted by doc_id, so id-ordered scans can walk it directly
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    pub doc_ids: Vec<SongId>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            doc_ids: Vec::new(),
        }
    }

    pub fn add(&mut self, doc_id: SongId) {
        if let Err(pos) = self.doc_ids.binary_search(&doc_id) {
            self.doc_ids.insert(pos, doc_id);
        }
    }

    /// Returns true when a posting for `doc_id` was present.
    pub fn remove(&mut self, doc_id: SongId) -> bool {
        match self.doc_ids.binary_search(&doc_id) {
            Ok(pos) => {
                self.doc_ids.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, doc_id: SongId) -> bool {
        self.doc_ids.binary_search(&doc_id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = SongId> + '_ {
        self.doc_ids.iter().copied()
    }
}

/// Merges sorted id lists into one sorted, duplicate-free list.
pub fn union_sorted<'a, I>(lists: I) -> Vec<SongId>
where
    I: IntoIterator<Item = &'a PostingList>,
{
    let mut result: Vec<SongId> = Vec::new();

    for list in lists {
        let mut merged = Vec::with_capacity(result.len() + list.len());
        let mut left = result.iter().copied().peekable();
        let mut right = list.doc_ids().peekable();

        loop {
            match (left.peek().copied(), right.peek().copied()) {
                (Some(a), Some(b)) if a == b => {
                    merged.push(a);
                    left.next();
                    right.next();
                }
                (Some(a), Some(b)) if a < b => {
                    merged.push(a);
                    left.next();
                }
                (Some(_), Some(b)) => {
                    merged.push(b);
                    right.next();
                }
                (Some(a), None) => {
                    merged.push(a);
                    left.next();
                }
                (None, Some(b)) => {
                    merged.push(b);
                    right.next();
                }
                (None, None) => break,
            }
        }

        result = merged;
    }

    result
}
