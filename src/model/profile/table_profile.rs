use serde::Deserialize;

use crate::util::fs::read_utils;

use super::profile::{Factor, Profile, TraversalDirection};
use super::profile_error::ProfileError;

/// one row of a profile factor table CSV: the per-edge-profile cost factor,
/// allowed direction, and stoppability for a single vehicle/mode configuration.
#[derive(Debug, Clone, Deserialize)]
struct ProfileFactorRow {
    edge_profile_id: u16,
    value: f64,
    direction: String,
    can_stop: bool,
}

impl ProfileFactorRow {
    fn direction(&self) -> Result<TraversalDirection, ProfileError> {
        match self.direction.to_lowercase().as_str() {
            "forward" => Ok(TraversalDirection::Forward),
            "backward" => Ok(TraversalDirection::Backward),
            "both" => Ok(TraversalDirection::Both),
            other => Err(ProfileError::InvalidRow(format!(
                "unrecognized direction '{other}', expected forward, backward, or both"
            ))),
        }
    }
}

/// path to a profile factor table CSV plus a human-readable name for the profile.
#[derive(Debug, Clone)]
pub struct TableProfileConfig {
    pub name: String,
    pub factor_table_input_file: String,
}

/// the default, array-backed [`Profile`] implementation: a dense lookup table
/// keyed by edge profile id, loaded from a CSV row-per-profile-id file. ids
/// missing from the file are treated as impassable rather than an error,
/// since factor tables are commonly sparse.
#[derive(Debug)]
pub struct TableProfile {
    name: String,
    factors: Vec<Factor>,
    stoppable: Vec<bool>,
}

impl TryFrom<&TableProfileConfig> for TableProfile {
    type Error = ProfileError;

    fn try_from(config: &TableProfileConfig) -> Result<Self, Self::Error> {
        let rows: Vec<ProfileFactorRow> =
            read_utils::iterator_from_csv(&config.factor_table_input_file, true)
                .map_err(|source| ProfileError::CsvError {
                    source: csv::Error::from(source),
                })?
                .collect::<Result<Vec<_>, _>>()?;

        let max_id = rows.iter().map(|r| r.edge_profile_id).max().unwrap_or(0) as usize;
        let mut factors = vec![Factor::IMPASSABLE; max_id + 1];
        let mut stoppable = vec![true; max_id + 1];

        for row in &rows {
            let direction = row.direction()?;
            let idx = row.edge_profile_id as usize;
            factors[idx] = Factor {
                value: row.value,
                direction,
            };
            stoppable[idx] = row.can_stop;
        }

        Ok(TableProfile {
            name: config.name.clone(),
            factors,
            stoppable,
        })
    }
}

impl TableProfile {
    pub fn from_rows(
        name: String,
        rows: Vec<(u16, f64, TraversalDirection, bool)>,
    ) -> Result<Self, ProfileError> {
        let max_id = rows.iter().map(|r| r.0).max().unwrap_or(0) as usize;
        let mut factors = vec![Factor::IMPASSABLE; max_id + 1];
        let mut stoppable = vec![true; max_id + 1];
        for (id, value, direction, can_stop) in rows {
            factors[id as usize] = Factor { value, direction };
            stoppable[id as usize] = can_stop;
        }
        Ok(TableProfile {
            name,
            factors,
            stoppable,
        })
    }
}

impl Profile for TableProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn factor(&self, edge_profile_id: u16) -> Result<Factor, ProfileError> {
        Ok(self
            .factors
            .get(edge_profile_id as usize)
            .copied()
            .unwrap_or(Factor::IMPASSABLE))
    }

    fn can_stop_on(&self, edge_profile_id: u16) -> Result<bool, ProfileError> {
        Ok(self
            .stoppable
            .get(edge_profile_id as usize)
            .copied()
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_missing_id_is_impassable() {
        let table = TableProfile::from_rows(
            "car".to_string(),
            vec![(0, 12.5, TraversalDirection::Both, true)],
        )
        .unwrap();
        assert!(table.factor(0).unwrap().is_traversable());
        assert!(!table.factor(5).unwrap().is_traversable());
    }

    #[test]
    fn test_can_stop_on_defaults_true_for_known_id() {
        let table = TableProfile::from_rows(
            "bike".to_string(),
            vec![(1, 4.0, TraversalDirection::Forward, false)],
        )
        .unwrap();
        assert!(!table.can_stop_on(1).unwrap());
        assert!(!table.can_stop_on(9).unwrap());
    }
}
