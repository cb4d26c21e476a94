pub mod create;
pub mod delete;
pub mod export;
pub mod get;
pub mod import;
pub mod search;
pub mod update;
