use std::collections::HashMap;

use crate::error::EvalError;
use crate::model::ReconstructedCandidate;

/// Candidates keyed by `GlobalEventNumber`. Read-only once built.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    by_id: HashMap<i64, ReconstructedCandidate>,
}

impl CandidateIndex {
    /// Index `candidates`, failing on the first repeated identifier.
    pub fn build<I>(candidates: I) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = ReconstructedCandidate>,
    {
        let candidates = candidates.into_iter();
        let mut by_id = HashMap::with_capacity(candidates.size_hint().0);
        for candidate in candidates {
            let id = candidate.global_event_number;
            if by_id.insert(id, candidate).is_some() {
                return Err(EvalError::DuplicateIdentifier { id });
            }
        }
        Ok(Self { by_id })
    }

    /// `None` means the truth event at `id` was not reconstructed.
    pub fn lookup(&self, id: i64) -> Option<&ReconstructedCandidate> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vec3;

    fn cand(id: i64) -> ReconstructedCandidate {
        ReconstructedCandidate {
            global_event_number: id,
            e_position: Vec3::default(),
            p_position: Vec3::default(),
            e_energy: 1.0,
            p_energy: 2.0,
        }
    }

    #[test]
    fn lookup_hit_and_miss() {
        let index = CandidateIndex::build(vec![cand(3), cand(7), cand(11)]).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup(7).map(|c| c.global_event_number), Some(7));
        assert!(index.lookup(5).is_none());
    }

    #[test]
    fn duplicate_identifier_rejected() {
        let err = CandidateIndex::build(vec![cand(1), cand(2), cand(1)]).unwrap_err();
        assert!(matches!(err, EvalError::DuplicateIdentifier { id: 1 }));
    }

    #[test]
    fn empty_table_is_valid() {
        let index = CandidateIndex::build(Vec::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.lookup(0).is_none());
    }
}
