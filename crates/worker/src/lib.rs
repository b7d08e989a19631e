//! Command-line front end for the booth generation dispatcher.
//!
//! Loads credentials from the environment, turns one input photo plus a
//! list of instructions into dispatcher jobs, and writes each generated
//! image to disk.

pub mod cli;
pub mod config;
pub mod output;
pub mod run;
