pub mod restriction;
pub mod restriction_error;
pub mod restrictions_index;

pub use restriction::Restriction;
pub use restriction_error::RestrictionError;
pub use restrictions_index::{RestrictionsConfig, RestrictionsIndex};
