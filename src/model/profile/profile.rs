use super::profile_error::ProfileError;

/// direction of legal traversal for an edge profile, as returned by [`Profile::factor`].
/// `Both` means the edge may be traversed forward or backward; `Forward`/`Backward`
/// encode a oneway restriction relative to the edge's stored `(from, to)` order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TraversalDirection {
    Forward,
    Backward,
    Both,
}

impl TraversalDirection {
    pub fn allows_forward(&self) -> bool {
        matches!(self, TraversalDirection::Forward | TraversalDirection::Both)
    }

    pub fn allows_backward(&self) -> bool {
        matches!(self, TraversalDirection::Backward | TraversalDirection::Both)
    }
}

/// the traversal cost factor and direction for one edge profile id.
/// a `value` of zero means the edge profile is not traversable at all.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Factor {
    pub value: f64,
    pub direction: TraversalDirection,
}

impl Factor {
    pub const IMPASSABLE: Factor = Factor {
        value: 0.0,
        direction: TraversalDirection::Both,
    };

    pub fn is_traversable(&self) -> bool {
        self.value > 0.0
    }
}

/// a vehicle/mode configuration: a pure mapping from edge profile id to a
/// traversal factor and direction, plus a stoppability predicate.
/// modeled as a capability interface rather than a type hierarchy, so
/// callers can supply table-backed, formula-backed, or test doubles
/// interchangeably.
pub trait Profile: Send + Sync {
    /// human-readable identifier, used in error messages and `supports_all` checks.
    fn name(&self) -> &str;

    /// the traversal cost factor and direction for the given edge profile id.
    /// a zero-valued factor means the edge is not traversable under this profile.
    fn factor(&self, edge_profile_id: u16) -> Result<Factor, ProfileError>;

    /// whether a route may begin or end while standing on an edge of this profile
    /// (used by the resolver when `verify_all_stoppable` is configured).
    fn can_stop_on(&self, edge_profile_id: u16) -> Result<bool, ProfileError>;
}

#[cfg(test)]
pub mod test {
    use super::*;

    /// a minimal in-memory profile for tests: every profile id maps to a speed
    /// factor in meters/second, with odd ids marked oneway-forward and a
    /// configurable set of "no stopping" ids (e.g. highways).
    pub struct MockProfile {
        pub speeds_mps: Vec<f64>,
        pub oneway_forward: Vec<bool>,
        pub no_stop: Vec<u16>,
    }

    impl MockProfile {
        pub fn uniform(speed_mps: f64, n_profiles: usize) -> Self {
            MockProfile {
                speeds_mps: vec![speed_mps; n_profiles],
                oneway_forward: vec![false; n_profiles],
                no_stop: vec![],
            }
        }
    }

    impl Profile for MockProfile {
        fn name(&self) -> &str {
            "mock"
        }

        fn factor(&self, edge_profile_id: u16) -> Result<Factor, ProfileError> {
            let speed = self
                .speeds_mps
                .get(edge_profile_id as usize)
                .ok_or(ProfileError::EdgeProfileNotFound(
                    edge_profile_id,
                    self.speeds_mps.len(),
                ))?;
            if *speed <= 0.0 {
                return Ok(Factor::IMPASSABLE);
            }
            let oneway = self
                .oneway_forward
                .get(edge_profile_id as usize)
                .copied()
                .unwrap_or(false);
            let direction = if oneway {
                TraversalDirection::Forward
            } else {
                TraversalDirection::Both
            };
            Ok(Factor {
                value: *speed,
                direction,
            })
        }

        fn can_stop_on(&self, edge_profile_id: u16) -> Result<bool, ProfileError> {
            Ok(!self.no_stop.contains(&edge_profile_id))
        }
    }
}
