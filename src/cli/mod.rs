pub mod config;
pub mod create;
pub mod list;
pub mod login;
pub mod logout;
pub mod upload;
