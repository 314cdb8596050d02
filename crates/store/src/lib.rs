// SQLite-backed plan storage

pub mod db;
pub mod seed;

pub use db::PlanDb;
