#![forbid(unsafe_code)]
//! Turntable: transactional, reversible migration steps for host layout upgrades.
//!
//! A migration is an ordered pipeline of discrete steps. Each step can
//! snapshot the state it is about to mutate into a per-run scratch directory,
//! apply its change, and restore the snapshot if a later step fails. The
//! pipeline runner drives the sequence with all-or-nothing effective
//! semantics: the first failing step triggers a reverse-order rollback of
//! everything that already ran, and rollback failures are surfaced next to
//! the original error, never swallowed.
//!
//! Mutations that land on disk do so through staged writes (temp file in the
//! target directory, then rename) so an interrupted rewrite can never leave
//! a truncated file behind. This crate forbids `unsafe` and uses `rustix`
//! for syscalls.

pub mod adapters;
pub mod constants;
pub mod fs;
pub mod logging;
pub mod migrations;
pub mod pipeline;
pub mod steps;
pub mod types;

pub use pipeline::Pipeline;
