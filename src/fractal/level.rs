//! Flat per-depth storage of parts and their render matrices

use super::matrix::RenderMatrix;
use super::part::{PartState, BRANCHING_FACTOR};

/// All parts at one depth of the tree plus their derived render matrices.
///
/// `parts[i]`'s parent is `parts[i / BRANCHING_FACTOR]` of the level above.
/// `matrices` always has the same length as `parts` and is only written by
/// the updater.
#[derive(Clone, Debug)]
pub struct LevelStore {
    depth: usize,
    parts: Vec<PartState>,
    matrices: Vec<RenderMatrix>,
}

impl LevelStore {
    /// Wrap freshly built parts; matrices start as identity until the first update
    pub(crate) fn new(depth: usize, parts: Vec<PartState>) -> Self {
        debug_assert_eq!(parts.len(), Self::expected_len(depth));
        let matrices = vec![RenderMatrix::IDENTITY; parts.len()];
        Self { depth, parts, matrices }
    }

    /// Number of parts at `depth`: `BRANCHING_FACTOR^depth`
    pub fn expected_len(depth: usize) -> usize {
        BRANCHING_FACTOR.pow(depth as u32)
    }

    /// Index of the parent of part `index` in the level above
    #[inline]
    pub fn parent_index(index: usize) -> usize {
        index / BRANCHING_FACTOR
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Instance count handed to rendering
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[PartState] {
        &self.parts
    }

    pub fn matrices(&self) -> &[RenderMatrix] {
        &self.matrices
    }

    /// Mutable access for the updater, parts and matrices index-for-index
    pub(crate) fn split_mut(&mut self) -> (&mut [PartState], &mut [RenderMatrix]) {
        (&mut self.parts, &mut self.matrices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_len() {
        assert_eq!(LevelStore::expected_len(0), 1);
        assert_eq!(LevelStore::expected_len(1), 5);
        assert_eq!(LevelStore::expected_len(3), 125);
    }

    #[test]
    fn test_parent_index() {
        assert_eq!(LevelStore::parent_index(0), 0);
        assert_eq!(LevelStore::parent_index(4), 0);
        assert_eq!(LevelStore::parent_index(5), 1);
        assert_eq!(LevelStore::parent_index(24), 4);
    }

    #[test]
    fn test_new_level_has_matching_matrices() {
        let parts: Vec<_> = (0..5).map(|i| PartState::new(i, 1.0, 0.1)).collect();
        let level = LevelStore::new(1, parts);
        assert_eq!(level.len(), 5);
        assert_eq!(level.matrices().len(), 5);
        assert!(level.matrices().iter().all(|m| *m == RenderMatrix::IDENTITY));
        assert_eq!(level.depth(), 1);
    }
}
