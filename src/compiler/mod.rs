//! Compiler backend modules.
//!
//! ## Module Structure
//!
//! - `ast` - Source AST node definitions (what the decompiler hands us)
//! - `wasm` - Target instruction tree, analysis passes and pretty-printing
//! - `codegen` - The lowering itself: expressions, statements, intrinsics,
//!   negation, encoding and the per-method driver
//! - `compiler_errors` - Unified error type and error macros
//! - `compiler_dev_logging` - Feature-gated debug logging macros

pub mod ast;
pub mod codegen;
pub mod compiler_dev_logging;
pub mod compiler_errors;
pub mod wasm;
