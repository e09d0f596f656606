//! Boolean negation rewriting.
//!
//! Loop exits and short-circuit operators constantly need the negation of
//! a freshly lowered 0/1-valued expression. A generic `xor 1` works but
//! piles up, so negation prefers a rewrite: cancel an existing `xor 1`,
//! or flip the operator of a comparison. Double negation therefore always
//! collapses back to the original shape.

use crate::compiler::wasm::wasm_nodes::{FloatBinaryOp, IntBinaryOp, IntWidth, WasmExpr};

/// Produces the logical negation of a 0/1-valued instruction.
pub fn negate(expr: WasmExpr) -> WasmExpr {
    match expr {
        WasmExpr::IntBinary {
            width,
            op,
            first,
            second,
        } => {
            if width == IntWidth::I32 && op == IntBinaryOp::Xor {
                if is_one(&first) {
                    return *second;
                }
                if is_one(&second) {
                    return *first;
                }
            }
            match inverted_int_op(op) {
                Some(inverted) => WasmExpr::IntBinary {
                    width,
                    op: inverted,
                    first,
                    second,
                },
                None => xor_with_one(WasmExpr::IntBinary {
                    width,
                    op,
                    first,
                    second,
                }),
            }
        }
        WasmExpr::FloatBinary {
            width,
            op,
            first,
            second,
        } => match inverted_float_op(op) {
            Some(inverted) => WasmExpr::FloatBinary {
                width,
                op: inverted,
                first,
                second,
            },
            None => xor_with_one(WasmExpr::FloatBinary {
                width,
                op,
                first,
                second,
            }),
        },
        other => xor_with_one(other),
    }
}

fn xor_with_one(expr: WasmExpr) -> WasmExpr {
    WasmExpr::IntBinary {
        width: IntWidth::I32,
        op: IntBinaryOp::Xor,
        first: Box::new(expr),
        second: Box::new(WasmExpr::I32Const(1)),
    }
}

fn is_one(expr: &WasmExpr) -> bool {
    matches!(expr, WasmExpr::I32Const(1))
}

/// The algebraic inverse of an integer comparison; signedness is
/// preserved. `None` for non-comparison operators.
fn inverted_int_op(op: IntBinaryOp) -> Option<IntBinaryOp> {
    match op {
        IntBinaryOp::Eq => Some(IntBinaryOp::Ne),
        IntBinaryOp::Ne => Some(IntBinaryOp::Eq),
        IntBinaryOp::LtSigned => Some(IntBinaryOp::GeSigned),
        IntBinaryOp::LtUnsigned => Some(IntBinaryOp::GeUnsigned),
        IntBinaryOp::LeSigned => Some(IntBinaryOp::GtSigned),
        IntBinaryOp::LeUnsigned => Some(IntBinaryOp::GtUnsigned),
        IntBinaryOp::GtSigned => Some(IntBinaryOp::LeSigned),
        IntBinaryOp::GtUnsigned => Some(IntBinaryOp::LeUnsigned),
        IntBinaryOp::GeSigned => Some(IntBinaryOp::LtSigned),
        IntBinaryOp::GeUnsigned => Some(IntBinaryOp::LtUnsigned),
        _ => None,
    }
}

fn inverted_float_op(op: FloatBinaryOp) -> Option<FloatBinaryOp> {
    match op {
        FloatBinaryOp::Eq => Some(FloatBinaryOp::Ne),
        FloatBinaryOp::Ne => Some(FloatBinaryOp::Eq),
        FloatBinaryOp::Lt => Some(FloatBinaryOp::Ge),
        FloatBinaryOp::Le => Some(FloatBinaryOp::Gt),
        FloatBinaryOp::Gt => Some(FloatBinaryOp::Le),
        FloatBinaryOp::Ge => Some(FloatBinaryOp::Lt),
        _ => None,
    }
}
