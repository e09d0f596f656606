//! Target instruction tree.
//!
//! The lowering produces a structured, stack-based instruction tree per
//! method body: nested blocks and loops identified by [`wasm_nodes::BlockId`],
//! branches that exit an enclosing block or continue an enclosing loop,
//! and typed arithmetic, memory and call instructions.
//!
//! ## Module Structure
//!
//! - `wasm_nodes` - Node definitions and result-type inference
//! - `analysis` - Branch-target collection and structural scoping checks
//! - `display` - Pretty-printing for debugging and logs

pub mod analysis;
pub mod display;
pub mod wasm_nodes;
