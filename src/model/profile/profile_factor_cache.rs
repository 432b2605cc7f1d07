use super::profile::{Factor, Profile};
use super::profile_error::ProfileError;

/// a dense, precomputed `(factor, stoppable)` array for one profile, indexed
/// directly by edge profile id. every search kernel and the resolver consult
/// this cache instead of calling [`Profile::factor`] per edge once a profile
/// has been resolved for a query, trading a one-time scan for branch-free
/// lookups on the hot path.
#[derive(Debug, Clone)]
pub struct ProfileFactorCache {
    factors: Vec<Factor>,
    stoppable: Vec<bool>,
}

impl ProfileFactorCache {
    /// builds a cache covering edge profile ids `0..n_profiles`, consulting
    /// `profile` once per id. ids for which `profile.factor` errors are left
    /// impassable rather than aborting the whole build, since a sparse
    /// profile id space is expected.
    pub fn build<P: Profile + ?Sized>(
        profile: &P,
        n_profiles: usize,
    ) -> Result<ProfileFactorCache, ProfileError> {
        let mut factors = Vec::with_capacity(n_profiles);
        let mut stoppable = Vec::with_capacity(n_profiles);
        for id in 0..n_profiles {
            let id = id as u16;
            let factor = profile.factor(id).unwrap_or(Factor::IMPASSABLE);
            let can_stop = profile.can_stop_on(id).unwrap_or(false);
            factors.push(factor);
            stoppable.push(can_stop);
        }
        Ok(ProfileFactorCache { factors, stoppable })
    }

    pub fn factor(&self, edge_profile_id: u16) -> Factor {
        self.factors
            .get(edge_profile_id as usize)
            .copied()
            .unwrap_or(Factor::IMPASSABLE)
    }

    pub fn can_stop_on(&self, edge_profile_id: u16) -> bool {
        self.stoppable
            .get(edge_profile_id as usize)
            .copied()
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::profile::profile::test::MockProfile;

    #[test]
    fn test_cache_matches_profile() {
        let profile = MockProfile::uniform(10.0, 4);
        let cache = ProfileFactorCache::build(&profile, 4).unwrap();
        for id in 0..4u16 {
            assert_eq!(cache.factor(id), profile.factor(id).unwrap());
            assert_eq!(cache.can_stop_on(id), profile.can_stop_on(id).unwrap());
        }
    }

    #[test]
    fn test_cache_out_of_range_is_impassable() {
        let profile = MockProfile::uniform(10.0, 2);
        let cache = ProfileFactorCache::build(&profile, 2).unwrap();
        assert!(!cache.factor(50).is_traversable());
        assert!(!cache.can_stop_on(50));
    }
}
