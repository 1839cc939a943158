pub mod json_store;
pub mod notice;
pub mod rows;
pub mod session;
pub mod sync_worker;
