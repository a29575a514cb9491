pub mod decider;
pub mod origin;
pub mod origin_registry;
pub mod path_allow_list;

pub use decider::{CorsDecision, CorsPolicyDecider, RegisteredOriginPolicy};
pub use origin::{ClientOrigin, Origin, OriginError};
pub use origin_registry::OriginRegistry;
pub use path_allow_list::{PathAllowList, PathPattern, PathPatternError, PatternSource};
