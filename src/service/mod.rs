pub mod auth;
pub mod crypto;
pub mod event;
pub mod importer;
pub mod invite_code;
pub mod log;
pub mod maintenance;
pub mod photo;
pub mod saved;
pub mod site;
pub mod user;
