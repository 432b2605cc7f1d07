use indexmap::IndexMap;
use serde::Deserialize;

use crate::model::network::VertexId;
use crate::util::fs::read_utils;

use super::restriction::Restriction;
use super::restriction_error::RestrictionError;

/// one row of a restrictions table CSV: a restricted sequence for one profile,
/// with vertex ids packed into a single delimited field (teacher pattern:
/// `RestrictionRow` in `model/frontier/default/vehicle_restrictions`).
#[derive(Debug, Clone, Deserialize)]
struct RestrictionRow {
    profile_id: u16,
    vertex_sequence: String,
}

impl RestrictionRow {
    fn parse_sequence(&self) -> Result<Vec<VertexId>, RestrictionError> {
        self.vertex_sequence
            .split(';')
            .map(|s| {
                s.trim()
                    .parse::<usize>()
                    .map(VertexId)
                    .map_err(|_| RestrictionError::InvalidVertexId(s.to_string()))
            })
            .collect()
    }
}

/// path to a restrictions table CSV.
#[derive(Debug, Clone)]
pub struct RestrictionsConfig {
    pub restriction_list_input_file: String,
}

/// per-profile restriction sequences indexed by first vertex for O(1) lookup
/// during search.
#[derive(Debug, Default)]
pub struct RestrictionsIndex {
    by_profile: IndexMap<u16, IndexMap<VertexId, Vec<Restriction>>>,
}

impl TryFrom<&RestrictionsConfig> for RestrictionsIndex {
    type Error = RestrictionError;

    fn try_from(config: &RestrictionsConfig) -> Result<Self, Self::Error> {
        let rows: Vec<RestrictionRow> =
            read_utils::iterator_from_csv(&config.restriction_list_input_file, true)
                .map_err(|source| RestrictionError::CsvError {
                    source: csv::Error::from(source),
                })?
                .collect::<Result<Vec<_>, _>>()?;

        let mut index = RestrictionsIndex::default();
        for row in rows {
            let vertices = row.parse_sequence()?;
            let restriction = Restriction::new(vertices)?;
            index.insert(row.profile_id, restriction);
        }
        Ok(index)
    }
}

impl RestrictionsIndex {
    pub fn empty() -> Self {
        RestrictionsIndex::default()
    }

    pub fn insert(&mut self, profile_id: u16, restriction: Restriction) {
        self.by_profile
            .entry(profile_id)
            .or_default()
            .entry(restriction.first_vertex())
            .or_default()
            .push(restriction);
    }

    /// restrictions for `profile_id` whose first vertex is `vertex_id`. empty
    /// when the profile has no restrictions at all or none start there.
    pub fn by_first_vertex(&self, profile_id: u16, vertex_id: VertexId) -> &[Restriction] {
        self.by_profile
            .get(&profile_id)
            .and_then(|by_vertex| by_vertex.get(&vertex_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// the vertex count of the longest restriction registered for
    /// `profile_id`, or 0 if the profile has none. used to size the trailing
    /// vertex buffer an edge-based search needs to carry per state.
    pub fn max_restriction_len(&self, profile_id: u16) -> usize {
        self.by_profile
            .get(&profile_id)
            .map(|by_vertex| {
                by_vertex
                    .values()
                    .flat_map(|restrictions| restrictions.iter())
                    .map(|r| r.vertices.len())
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    pub fn is_empty_for(&self, profile_id: u16) -> bool {
        self.by_profile
            .get(&profile_id)
            .map(IndexMap::is_empty)
            .unwrap_or(true)
    }

    /// whether extending `trailing` (the vertices visited so far) with
    /// `candidate` would match any restriction registered for `profile_id`.
    /// restrictions are indexed by their first vertex, which for a
    /// restriction of length `len` sits `len - 1` entries back from the end
    /// of `trailing`, not at `trailing.last()`; this checks every registered
    /// restriction length in turn, anchoring the lookup at the
    /// corresponding position each time.
    pub fn forbids_extension(&self, profile_id: u16, trailing: &[VertexId], candidate: VertexId) -> bool {
        let max_len = self.max_restriction_len(profile_id);
        (2..=max_len).any(|len| {
            let needed = len - 1;
            if trailing.len() < needed {
                return false;
            }
            let anchor = trailing[trailing.len() - needed];
            self.by_first_vertex(profile_id, anchor)
                .iter()
                .any(|r| r.forbids_extension(trailing, candidate))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut index = RestrictionsIndex::empty();
        index.insert(
            0,
            Restriction::new(vec![VertexId(1), VertexId(2), VertexId(3)]).unwrap(),
        );
        assert_eq!(index.by_first_vertex(0, VertexId(1)).len(), 1);
        assert!(index.by_first_vertex(0, VertexId(2)).is_empty());
        assert!(index.by_first_vertex(1, VertexId(1)).is_empty());
    }

    #[test]
    fn test_forbids_extension_through_index() {
        let mut index = RestrictionsIndex::empty();
        index.insert(
            0,
            Restriction::new(vec![VertexId(1), VertexId(2), VertexId(3)]).unwrap(),
        );
        assert!(index.forbids_extension(0, &[VertexId(1), VertexId(2)], VertexId(3)));
        assert!(!index.forbids_extension(0, &[VertexId(1), VertexId(2)], VertexId(9)));
    }
}
