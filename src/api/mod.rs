pub mod idm;
