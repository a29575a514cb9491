pub mod assertion;
pub mod mapper;
pub mod profile;

pub use assertion::{AssertionError, AssertionSigner, SignedAssertion};
pub use mapper::{Claim, ClaimSet, ClaimTypeMap, ClaimsMapper, UserRecord, map_user};
pub use profile::{Profile, ProfileService};
