//! Application layer: the composition pipeline and the commands built on it.

pub mod build;
pub mod fragment;
pub mod init;
pub mod merge;
pub mod output;
pub mod replication;
pub mod scan;
pub mod splice;
pub mod tags;
