//! Contracts of the external collaborators the aggregator drives.

pub mod sensors;
