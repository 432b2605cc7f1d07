use crate::model::network::Edge;
use crate::model::profile::profile::TraversalDirection;
use crate::model::profile::ProfileFactorCache;

use super::direction::Direction;

/// the traversal weight of `edge` in the given `direction` under `cache`, or
/// `None` if the edge's profile is impassable or does not permit that
/// direction of travel.
///
/// weight is distance divided by the profile factor: a factor of `1.0` is
/// neutral (weight equals distance), values above `1.0` make an edge
/// comparatively cheaper to traverse, values below `1.0` make it more
/// expensive.
pub fn traversal_weight(edge: &Edge, direction: Direction, cache: &ProfileFactorCache) -> Option<f64> {
    let factor = cache.factor(edge.profile_id);
    if !factor.is_traversable() {
        return None;
    }
    let allowed = match direction {
        Direction::Forward => factor.direction.allows_forward(),
        Direction::Reverse => factor.direction.allows_backward(),
    };
    if !allowed {
        return None;
    }
    Some(edge.distance / factor.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::Edge;
    use crate::model::profile::profile::test::MockProfile;
    use crate::model::profile::profile::Profile;

    #[test]
    fn test_neutral_factor_equals_distance() {
        let edge = Edge::new(0, 0, 1, 100.0, 0, 0, None, false);
        let profile = MockProfile::uniform(1.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        assert_eq!(
            traversal_weight(&edge, Direction::Forward, &cache),
            Some(100.0)
        );
    }

    #[test]
    fn test_impassable_profile_is_none() {
        let edge = Edge::new(0, 0, 1, 100.0, 0, 0, None, false);
        let profile = MockProfile::uniform(0.0, 1);
        let cache = ProfileFactorCache::build(&profile, 1).unwrap();
        assert_eq!(traversal_weight(&edge, Direction::Forward, &cache), None);
    }

    #[test]
    fn test_oneway_blocks_opposite_direction() {
        let edge = Edge::new(0, 0, 1, 100.0, 1, 0, None, false);
        let profile = MockProfile {
            speeds_mps: vec![1.0, 1.0],
            oneway_forward: vec![false, true],
            no_stop: vec![],
        };
        let cache = ProfileFactorCache::build(&profile, 2).unwrap();
        assert_eq!(
            traversal_weight(&edge, Direction::Forward, &cache),
            Some(100.0)
        );
        assert_eq!(traversal_weight(&edge, Direction::Reverse, &cache), None);
    }
}
