pub mod account;
pub mod health;
pub mod privileges;
pub mod users;
