//! Migrates a photo and video library into a space-efficient copy.
//!
//! Files are discovered by [`scan`], described by a [`metadata::MetadataTool`],
//! sorted by [`classify`] and written by the strategies in [`convert`]. The
//! [`pipeline`] drives them one file at a time and returns a [`report::RunReport`].

pub mod classify;
pub mod config;
pub mod convert;
pub mod encoder;
pub mod error;
pub mod exiftool;
pub mod item;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod stamp;
