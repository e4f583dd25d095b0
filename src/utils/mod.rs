pub mod db_utils;
pub mod pending_store;
pub mod teacher_cache;
