//! Customer profiles composed onto user accounts.

mod repo;
mod repo_types;

pub use repo_types::{Customer, NewCustomer};
