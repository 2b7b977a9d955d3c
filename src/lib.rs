//! # tbaudit
//!
//! Audits Thunderbird profile directories for the damage manual folder moves
//! and external syncs (rsync and friends) leave behind:
//!
//! - **Duplicate folder files**: two `*.msf` indexes or `*.sbd` containers with
//!   the same base name in one directory
//! - **Empty containers**: `*.sbd` directories with nothing left in them
//! - **Suggestions only**: every finding comes with a rationale and, on request,
//!   shell commands; nothing is ever removed by this crate

pub mod audit;
pub mod cli;
pub mod common;
pub mod duplicates;
pub mod profiles;
pub mod report;
pub mod scanner;
