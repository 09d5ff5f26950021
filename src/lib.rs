//! Ratescope - adaptive throughput reporting with a live plot
//!
//! This library turns per-interval byte counts into fixed-width human-readable
//! figures (`"9.41 Gbit"`, `" 512 MByte"`), keeps a running transfer total for
//! the run, and drives an external gnuplot process that redraws the
//! throughput series as samples arrive.

pub mod plot;
pub mod report;
pub mod units;
