pub mod account;
pub mod users;
