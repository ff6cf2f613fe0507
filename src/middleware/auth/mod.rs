pub mod access;
pub mod basic;
