pub mod profile;
pub mod profile_error;
pub mod profile_factor_cache;
pub mod table_profile;

pub use profile::{Factor, Profile, TraversalDirection};
pub use profile_error::ProfileError;
pub use profile_factor_cache::ProfileFactorCache;
pub use table_profile::{TableProfile, TableProfileConfig};
