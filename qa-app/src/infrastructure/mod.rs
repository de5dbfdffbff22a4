pub mod memory;
pub mod security;

#[cfg(feature = "db")]
pub mod db;
