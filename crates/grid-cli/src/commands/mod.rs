pub mod diff;
pub mod dispatch;
pub mod identity;
pub mod import;
pub mod save;
pub mod schema;
pub mod shared;
pub mod show;
pub mod sql;
pub mod tables;
