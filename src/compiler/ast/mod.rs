//! Source AST.
//!
//! The decompiler front end recovers structured statements and expressions
//! from object-oriented bytecode and hands them to this backend. The node
//! definitions here are closed sum types: every construct the front end
//! can produce has an explicit variant, so an unhandled case in the
//! lowering is a missing match arm, not a silent fall-through.

pub mod ast_nodes;
