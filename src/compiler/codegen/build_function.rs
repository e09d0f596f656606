//! Per-method lowering entry points.
//!
//! `build_function` lowers one method body; `build_functions` fans a
//! batch out across threads. Lowering is pure over its inputs apart from
//! the builder-local scope stack and block-id counter, so methods can be
//! lowered in parallel as long as the layout and name collaborators are
//! immutable for the duration (they are `Sync` by trait bound).

use crate::codegen_log;
use crate::compiler::ast::ast_nodes::Statement;
use crate::compiler::codegen::context::{CodegenEnv, FunctionLocals, WasmBuilder};
use crate::compiler::codegen::encode::validate_function;
use crate::compiler::compiler_errors::CompileError;
use crate::compiler::wasm::wasm_nodes::{WasmExpr, WasmNumType};
use rayon::prelude::*;

/// One method body ready for lowering.
#[derive(Debug, Clone)]
pub struct MethodBody {
    /// Mangled symbol of the method, used for reporting and downstream
    /// assembly
    pub name: String,
    pub locals: FunctionLocals,
    pub results: Vec<WasmNumType>,
    pub statements: Vec<Statement>,
}

/// A lowered method body.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredFunction {
    pub name: String,
    pub body: Vec<WasmExpr>,
}

/// Lowers one method body to a target instruction list.
pub fn build_function(
    statements: &[Statement],
    locals: &FunctionLocals,
    env: &CodegenEnv,
) -> Result<Vec<WasmExpr>, CompileError> {
    let mut builder = WasmBuilder::new(env, locals);

    let mut body = Vec::with_capacity(statements.len());
    for statement in statements {
        if let Some(lowered) = builder.lower_statement(statement)? {
            body.push(lowered);
        }
    }

    debug_assert!(builder.scopes_balanced());

    #[cfg(feature = "checked_lowering")]
    crate::compiler::wasm::analysis::validate_branch_scoping(&body)?;

    codegen_log!(
        "{}",
        crate::compiler::wasm::display::display_function(&body)
    );

    Ok(body)
}

/// Lowers a batch of method bodies in parallel.
///
/// Returns every lowered function on full success, or every error the
/// batch produced. When `validate_output` is set in the settings, each
/// lowered body is also encoded and run through wasmparser before it
/// counts as a success.
pub fn build_functions(
    methods: &[MethodBody],
    env: &CodegenEnv,
) -> Result<Vec<LoweredFunction>, Vec<CompileError>> {
    let results: Vec<Result<LoweredFunction, CompileError>> = methods
        .par_iter()
        .map(|method| {
            let body = build_function(&method.statements, &method.locals, env)?;
            if env.settings.validate_output {
                validate_function(&body, &method.locals, &method.results)?;
            }
            Ok(LoweredFunction {
                name: method.name.clone(),
                body,
            })
        })
        .collect();

    let mut lowered = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(function) => lowered.push(function),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(lowered)
    } else {
        Err(errors)
    }
}
