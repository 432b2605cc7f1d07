use crate::model::network::VertexId;

use super::restriction_error::RestrictionError;

/// an ordered sequence of vertex ids, length >= 2, forbidden as a contiguous
/// subsequence of any path. indexed by its first vertex in
/// [`super::RestrictionsIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub vertices: Vec<VertexId>,
}

impl Restriction {
    pub fn new(vertices: Vec<VertexId>) -> Result<Restriction, RestrictionError> {
        if vertices.len() < 2 {
            return Err(RestrictionError::SequenceTooShort(format!(
                "{:?}",
                vertices
            )));
        }
        Ok(Restriction { vertices })
    }

    pub fn first_vertex(&self) -> VertexId {
        self.vertices[0]
    }

    /// whether appending `candidate` to `trailing` would produce a contiguous
    /// run matching this restriction's full vertex sequence, i.e. the last
    /// `len(self.vertices) - 1` entries of `trailing` plus `candidate` equal
    /// `self.vertices` exactly. `trailing` holds vertices visited so far, in
    /// order, ending at the vertex about to be extended from.
    pub fn forbids_extension(&self, trailing: &[VertexId], candidate: VertexId) -> bool {
        let needed = self.vertices.len() - 1;
        if trailing.len() < needed {
            return false;
        }
        let tail = &trailing[trailing.len() - needed..];
        tail == &self.vertices[..needed] && candidate == self.vertices[needed]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(id: usize) -> VertexId {
        VertexId(id)
    }

    #[test]
    fn test_forbids_exact_match() {
        let r = Restriction::new(vec![v(1), v(2), v(3)]).unwrap();
        assert!(r.forbids_extension(&[v(1), v(2)], v(3)));
    }

    #[test]
    fn test_allows_non_matching_tail() {
        let r = Restriction::new(vec![v(1), v(2), v(3)]).unwrap();
        assert!(!r.forbids_extension(&[v(9), v(2)], v(3)));
        assert!(!r.forbids_extension(&[v(1), v(2)], v(4)));
    }

    #[test]
    fn test_too_short_sequence_rejected() {
        assert!(Restriction::new(vec![v(1)]).is_err());
    }
}
