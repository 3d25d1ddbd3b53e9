//! # CLI Module
//!
//! Command-line access to an API definition, for checking routing and
//! parameter contracts without a host server.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the compiled routing table:
//!
//! ```bash
//! paramgate routes --definition api.yaml
//! ```
//!
//! ### `match`
//!
//! Resolve a method and path to a route:
//!
//! ```bash
//! paramgate match --definition api.yaml --method GET --path /api/v1/pets/7
//! ```
//!
//! ### `check`
//!
//! Run a full dispatch, including format negotiation and validation, and
//! print the coerced parameters or the error response:
//!
//! ```bash
//! paramgate check --definition api.yaml --method POST --path /api/v1/payments \
//!     --body '{"kind": "card"}' -H 'Accept: application/json'
//! ```
//!
//! Results are JSON on stdout. `check` exits non-zero when the request is
//! rejected.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, CommandOutput, Commands};
