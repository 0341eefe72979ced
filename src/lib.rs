//! Cognit - local installation store for AI agent cognitives
//!
//! Skills, agents, prompts and rules are materialized once into a canonical
//! store, fanned out to each coding tool's directory by symlink or copy, and
//! recorded in a versioned lock file that `check` and `sync` reconcile
//! against the disk.
//!
//! The core never touches process globals: the filesystem, environment, home
//! directory, clock and network collaborators are all passed in.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod domain;
pub mod env;
pub mod error;
pub mod events;
pub mod filesystem;
pub mod git;
pub mod hash;
pub mod installer;
pub mod lockfile;
pub mod logging;
pub mod path_utils;
pub mod paths;
pub mod platform;
pub mod reconcile;
pub mod retry;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{CognitError, Result};
