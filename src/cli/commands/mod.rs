//! CLI command modules

pub mod classify;
pub mod cover;
pub mod coverage;
pub mod generate;
pub mod history;
pub mod info;
pub mod init;
pub mod languages;
pub mod scan;
pub mod test_path;
pub mod validate;
