pub mod analyze;
pub mod extract;
pub mod identity;
pub mod match_stats;
pub mod rehost;
pub mod season;
pub mod series;

#[cfg(test)]
pub(crate) mod fixtures;
