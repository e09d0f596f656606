//! Canopy - a structured WASM lowering backend.
//!
//! Canopy takes the typed, structured AST that an upstream decompiler
//! recovers from object-oriented bytecode and lowers each method body into
//! a structured WASM instruction tree: nested blocks and loops, explicit
//! forward/backward branches, typed arithmetic and typed memory access.
//!
//! The crate is a library. The decompiler front end, module assembly and
//! final binary emission live elsewhere; class layout and symbol naming
//! are supplied by the caller through the traits in
//! [`compiler::codegen::context`].

pub mod compiler;
pub mod settings;

pub use compiler::codegen::build_function::{
    LoweredFunction, MethodBody, build_function, build_functions,
};
pub use compiler::compiler_errors::{CompileError, ErrorType};
pub use settings::BackendSettings;
