//! Core library for the SPB message dashboard.
//!
//! Rows are read from a single worksheet through an [`io::SheetSource`],
//! expanded into success records by [`expand`] (including the `R2` records
//! generated by catalog-transfer rules), and summarised by [`stats`]. The
//! fetch cycle and its degrade-to-empty policy live in [`sync`]; [`server`]
//! exposes the results over HTTP.

pub mod spb;

pub use spb::dashboard::{
    DashboardError, Result, config, error, expand, io, model, server, stats, sync,
};
