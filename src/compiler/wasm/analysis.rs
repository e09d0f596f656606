//! Analysis passes over lowered instruction trees.
//!
//! Both passes here are pure functions over a finished subtree. The
//! lowering uses [`collect_branch_targets`] to decide whether a loop's
//! exit wrapper was ever branched to (and can be elided otherwise);
//! [`validate_branch_scoping`] checks the structural invariant that every
//! branch targets an enclosing block.

use crate::compiler::compiler_errors::CompileError;
use crate::compiler::wasm::wasm_nodes::{BlockId, WasmExpr};
use crate::return_compiler_error;
use rustc_hash::FxHashSet;

/// Collects the ids of every block targeted by a branch, break or switch
/// anywhere inside `expr`.
pub fn collect_branch_targets(expr: &WasmExpr) -> FxHashSet<BlockId> {
    let mut targets = FxHashSet::default();
    collect_into(expr, &mut targets);
    targets
}

fn collect_into(expr: &WasmExpr, targets: &mut FxHashSet<BlockId>) {
    match expr {
        WasmExpr::Block { body, .. } => {
            for part in body {
                collect_into(part, targets);
            }
        }
        WasmExpr::Branch {
            condition,
            target,
            result,
        } => {
            targets.insert(*target);
            collect_into(condition, targets);
            if let Some(result) = result {
                collect_into(result, targets);
            }
        }
        WasmExpr::Break { target, result } => {
            targets.insert(*target);
            if let Some(result) = result {
                collect_into(result, targets);
            }
        }
        WasmExpr::Call { args, .. } => {
            for arg in args {
                collect_into(arg, targets);
            }
        }
        WasmExpr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            collect_into(condition, targets);
            for part in then_branch {
                collect_into(part, targets);
            }
            for part in else_branch {
                collect_into(part, targets);
            }
        }
        WasmExpr::I32Const(_)
        | WasmExpr::I64Const(_)
        | WasmExpr::F32Const(_)
        | WasmExpr::F64Const(_)
        | WasmExpr::GetLocal { .. } => {}
        WasmExpr::SetLocal { value, .. } => collect_into(value, targets),
        WasmExpr::IntBinary { first, second, .. }
        | WasmExpr::FloatBinary { first, second, .. } => {
            collect_into(first, targets);
            collect_into(second, targets);
        }
        WasmExpr::Load { address, .. } => collect_into(address, targets),
        WasmExpr::Store { address, value, .. } => {
            collect_into(address, targets);
            collect_into(value, targets);
        }
        WasmExpr::Switch {
            selector,
            targets: switch_targets,
            default_target,
        } => {
            collect_into(selector, targets);
            targets.extend(switch_targets.iter().copied());
            targets.insert(*default_target);
        }
        WasmExpr::Return { value } => {
            if let Some(value) = value {
                collect_into(value, targets);
            }
        }
        WasmExpr::Drop { value } => collect_into(value, targets),
        WasmExpr::Conversion { value, .. } => collect_into(value, targets),
    }
}

/// Checks that every branch inside `body` targets a block that encloses
/// it. A violation is a bug in the lowering, not a property of the input
/// program.
pub fn validate_branch_scoping(body: &[WasmExpr]) -> Result<(), CompileError> {
    let mut active = Vec::new();
    for expr in body {
        check_scoping(expr, &mut active)?;
    }
    Ok(())
}

fn check_target(target: BlockId, active: &[BlockId]) -> Result<(), CompileError> {
    if active.contains(&target) {
        return Ok(());
    }
    return_compiler_error!(
        "Branch targets block {} which does not enclose it",
        target.0
    );
}

fn check_scoping(expr: &WasmExpr, active: &mut Vec<BlockId>) -> Result<(), CompileError> {
    match expr {
        WasmExpr::Block { id, body, .. } => {
            active.push(*id);
            let result = body.iter().try_for_each(|part| check_scoping(part, active));
            active.pop();
            result
        }
        WasmExpr::Branch {
            condition,
            target,
            result,
        } => {
            check_target(*target, active)?;
            check_scoping(condition, active)?;
            if let Some(result) = result {
                check_scoping(result, active)?;
            }
            Ok(())
        }
        WasmExpr::Break { target, result } => {
            check_target(*target, active)?;
            if let Some(result) = result {
                check_scoping(result, active)?;
            }
            Ok(())
        }
        WasmExpr::Call { args, .. } => {
            args.iter().try_for_each(|arg| check_scoping(arg, active))
        }
        WasmExpr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            check_scoping(condition, active)?;
            then_branch
                .iter()
                .try_for_each(|part| check_scoping(part, active))?;
            else_branch
                .iter()
                .try_for_each(|part| check_scoping(part, active))
        }
        WasmExpr::I32Const(_)
        | WasmExpr::I64Const(_)
        | WasmExpr::F32Const(_)
        | WasmExpr::F64Const(_)
        | WasmExpr::GetLocal { .. } => Ok(()),
        WasmExpr::SetLocal { value, .. } => check_scoping(value, active),
        WasmExpr::IntBinary { first, second, .. }
        | WasmExpr::FloatBinary { first, second, .. } => {
            check_scoping(first, active)?;
            check_scoping(second, active)
        }
        WasmExpr::Load { address, .. } => check_scoping(address, active),
        WasmExpr::Store { address, value, .. } => {
            check_scoping(address, active)?;
            check_scoping(value, active)
        }
        WasmExpr::Switch {
            selector,
            targets,
            default_target,
        } => {
            check_scoping(selector, active)?;
            for target in targets {
                check_target(*target, active)?;
            }
            check_target(*default_target, active)
        }
        WasmExpr::Return { value } => match value {
            Some(value) => check_scoping(value, active),
            None => Ok(()),
        },
        WasmExpr::Drop { value } => check_scoping(value, active),
        WasmExpr::Conversion { value, .. } => check_scoping(value, active),
    }
}
