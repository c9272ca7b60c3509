// Library for tests to access modules

pub mod aggregator;
pub mod chain_repo;
pub mod config;
pub mod models;
pub mod routes;
pub mod snapshot_repo;
pub mod worker;
