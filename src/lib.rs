//! Idempotent bootstrap for a single-node MongoDB replica set.
//!
//! A server started with `--replSet` is running but unusable until someone
//! calls `replSetInitiate` exactly once. This crate is that someone: run it
//! against a fresh container and it initiates the replica set, then waits
//! for the node to win the election for its own one-member set; run it
//! against an already-configured node and it confirms the status and exits
//! without touching anything.
//!
//! # Flow
//!
//! 1. Wait a fixed startup delay (the server may still be coming up).
//! 2. Query `replSetGetStatus`; success means the replica set exists and
//!    the run is already done.
//! 3. Submit the supplied configuration via `replSetInitiate`; a rejection
//!    is fatal.
//! 4. Poll status until the node reports `myState == 1` (primary). Failed
//!    polls during the election are retried, not fatal.
//!
//! # Modules
//!
//! - [`admin`]: the administrative-connection trait and its MongoDB driver
//!   implementation
//! - [`bootstrap`]: the runner and its timing/bounding options
//! - [`config`]: the replica set configuration document
//! - [`error`]: error taxonomy
//! - [`status`]: status reply parsing and member-state names

pub mod admin;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod status;
