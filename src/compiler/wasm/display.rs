//! Instruction tree pretty-printing.
//!
//! Produces an indented, WAT-flavoured rendering of a lowered function
//! body for debugging and the `show_codegen` logging feature.

use crate::compiler::wasm::wasm_nodes::{
    FloatBinaryOp, FloatWidth, IntBinaryOp, IntWidth, MemoryAccess, WasmExpr,
};

/// Pretty-prints a lowered function body.
pub fn display_function(body: &[WasmExpr]) -> String {
    let mut output = String::new();
    for expr in body {
        display_expr(expr, 0, &mut output);
    }
    output
}

fn push_line(output: &mut String, indent: usize, line: &str) {
    for _ in 0..indent {
        output.push_str("  ");
    }
    output.push_str(line);
    output.push('\n');
}

fn display_list(body: &[WasmExpr], indent: usize, output: &mut String) {
    for expr in body {
        display_expr(expr, indent, output);
    }
}

fn display_expr(expr: &WasmExpr, indent: usize, output: &mut String) {
    match expr {
        WasmExpr::Block { id, is_loop, body } => {
            let keyword = if *is_loop { "loop" } else { "block" };
            push_line(output, indent, &format!("{} ${}", keyword, id.0));
            display_list(body, indent + 1, output);
            push_line(output, indent, "end");
        }
        WasmExpr::Branch {
            condition,
            target,
            result,
        } => {
            push_line(output, indent, &format!("br_if ${}", target.0));
            display_expr(condition, indent + 1, output);
            if let Some(result) = result {
                push_line(output, indent + 1, "carrying");
                display_expr(result, indent + 2, output);
            }
        }
        WasmExpr::Break { target, result } => {
            push_line(output, indent, &format!("br ${}", target.0));
            if let Some(result) = result {
                push_line(output, indent + 1, "carrying");
                display_expr(result, indent + 2, output);
            }
        }
        WasmExpr::Call {
            symbol,
            imported,
            args,
            ..
        } => {
            let marker = if *imported { " (imported)" } else { "" };
            push_line(output, indent, &format!("call {}{}", symbol, marker));
            display_list(args, indent + 1, output);
        }
        WasmExpr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            push_line(output, indent, "if");
            display_expr(condition, indent + 1, output);
            push_line(output, indent, "then");
            display_list(then_branch, indent + 1, output);
            if !else_branch.is_empty() {
                push_line(output, indent, "else");
                display_list(else_branch, indent + 1, output);
            }
            push_line(output, indent, "end");
        }
        WasmExpr::I32Const(value) => push_line(output, indent, &format!("i32.const {}", value)),
        WasmExpr::I64Const(value) => push_line(output, indent, &format!("i64.const {}", value)),
        WasmExpr::F32Const(value) => push_line(output, indent, &format!("f32.const {}", value)),
        WasmExpr::F64Const(value) => push_line(output, indent, &format!("f64.const {}", value)),
        WasmExpr::GetLocal { index, .. } => {
            push_line(output, indent, &format!("local.get {}", index))
        }
        WasmExpr::SetLocal { index, value } => {
            push_line(output, indent, &format!("local.set {}", index));
            display_expr(value, indent + 1, output);
        }
        WasmExpr::IntBinary {
            width,
            op,
            first,
            second,
        } => {
            let prefix = match width {
                IntWidth::I32 => "i32",
                IntWidth::I64 => "i64",
            };
            push_line(
                output,
                indent,
                &format!("{}.{}", prefix, int_op_name(*op)),
            );
            display_expr(first, indent + 1, output);
            display_expr(second, indent + 1, output);
        }
        WasmExpr::FloatBinary {
            width,
            op,
            first,
            second,
        } => {
            let prefix = match width {
                FloatWidth::F32 => "f32",
                FloatWidth::F64 => "f64",
            };
            push_line(
                output,
                indent,
                &format!("{}.{}", prefix, float_op_name(*op)),
            );
            display_expr(first, indent + 1, output);
            display_expr(second, indent + 1, output);
        }
        WasmExpr::Load { access, address } => {
            push_line(output, indent, &format!("load.{}", access_name(*access)));
            display_expr(address, indent + 1, output);
        }
        WasmExpr::Store {
            access,
            address,
            value,
        } => {
            push_line(output, indent, &format!("store.{}", access_name(*access)));
            display_expr(address, indent + 1, output);
            display_expr(value, indent + 1, output);
        }
        WasmExpr::Switch {
            selector,
            targets,
            default_target,
        } => {
            let target_list: Vec<String> = targets.iter().map(|t| format!("${}", t.0)).collect();
            push_line(
                output,
                indent,
                &format!(
                    "br_table [{}] default ${}",
                    target_list.join(" "),
                    default_target.0
                ),
            );
            display_expr(selector, indent + 1, output);
        }
        WasmExpr::Return { value } => {
            push_line(output, indent, "return");
            if let Some(value) = value {
                display_expr(value, indent + 1, output);
            }
        }
        WasmExpr::Drop { value } => {
            push_line(output, indent, "drop");
            display_expr(value, indent + 1, output);
        }
        WasmExpr::Conversion {
            from,
            to,
            signed,
            reinterpret,
            value,
        } => {
            let mode = if *reinterpret {
                "reinterpret"
            } else if *signed {
                "signed"
            } else {
                "unsigned"
            };
            push_line(
                output,
                indent,
                &format!("convert {:?} -> {:?} ({})", from, to, mode),
            );
            display_expr(value, indent + 1, output);
        }
    }
}

fn int_op_name(op: IntBinaryOp) -> &'static str {
    match op {
        IntBinaryOp::Add => "add",
        IntBinaryOp::Sub => "sub",
        IntBinaryOp::Mul => "mul",
        IntBinaryOp::DivSigned => "div_s",
        IntBinaryOp::DivUnsigned => "div_u",
        IntBinaryOp::RemSigned => "rem_s",
        IntBinaryOp::RemUnsigned => "rem_u",
        IntBinaryOp::And => "and",
        IntBinaryOp::Or => "or",
        IntBinaryOp::Xor => "xor",
        IntBinaryOp::Shl => "shl",
        IntBinaryOp::ShrSigned => "shr_s",
        IntBinaryOp::ShrUnsigned => "shr_u",
        IntBinaryOp::Eq => "eq",
        IntBinaryOp::Ne => "ne",
        IntBinaryOp::LtSigned => "lt_s",
        IntBinaryOp::LtUnsigned => "lt_u",
        IntBinaryOp::LeSigned => "le_s",
        IntBinaryOp::LeUnsigned => "le_u",
        IntBinaryOp::GtSigned => "gt_s",
        IntBinaryOp::GtUnsigned => "gt_u",
        IntBinaryOp::GeSigned => "ge_s",
        IntBinaryOp::GeUnsigned => "ge_u",
    }
}

fn float_op_name(op: FloatBinaryOp) -> &'static str {
    match op {
        FloatBinaryOp::Add => "add",
        FloatBinaryOp::Sub => "sub",
        FloatBinaryOp::Mul => "mul",
        FloatBinaryOp::Div => "div",
        FloatBinaryOp::Eq => "eq",
        FloatBinaryOp::Ne => "ne",
        FloatBinaryOp::Lt => "lt",
        FloatBinaryOp::Le => "le",
        FloatBinaryOp::Gt => "gt",
        FloatBinaryOp::Ge => "ge",
    }
}

fn access_name(access: MemoryAccess) -> &'static str {
    match access {
        MemoryAccess::I8 => "i8",
        MemoryAccess::U8 => "u8",
        MemoryAccess::I16 => "i16",
        MemoryAccess::U16 => "u16",
        MemoryAccess::I32 => "i32",
        MemoryAccess::I64 => "i64",
        MemoryAccess::F32 => "f32",
        MemoryAccess::F64 => "f64",
    }
}
