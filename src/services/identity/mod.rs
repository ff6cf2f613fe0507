pub mod store;
pub mod types;
pub mod user_details;

pub use store::{IdentityStore, InMemoryIdentityStore};
pub use types::{Credentials, IdentityError, Principal, UserRecord};
pub use user_details::{IdentityService, UserDetailsService};
