//! Expression lowering.
//!
//! Each source expression lowers to exactly one value-producing target
//! instruction. Operands always lower left to right, so their side
//! effects keep source order. Short-circuit `&&`/`||` are the only
//! expressions that introduce control flow: a wrapper block whose early
//! exit carries the constant answer.

use crate::compiler::ast::ast_nodes::{
    BinaryOp, ConstantValue, Expr, FieldRef, InvocationKind, MethodRef, NumericType, UnaryOp,
};
use crate::compiler::codegen::context::WasmBuilder;
use crate::compiler::codegen::negation::negate;
use crate::compiler::codegen::types::{
    field_access, int_width, value_kind_type, wasm_num_type, zero_constant,
};
use crate::compiler::compiler_errors::CompileError;
use crate::compiler::wasm::wasm_nodes::{
    FloatBinaryOp, FloatWidth, IntBinaryOp, IntWidth, WasmExpr, WasmNumType,
};
use crate::{return_compiler_error, return_unsupported_error};

impl<'a> WasmBuilder<'a> {
    pub(crate) fn lower_expression(&mut self, expr: &Expr) -> Result<WasmExpr, CompileError> {
        match expr {
            Expr::Binary {
                op,
                ty,
                first,
                second,
            } => self.lower_binary(*op, *ty, first, second),
            Expr::Unary { op, ty, operand } => self.lower_unary(*op, *ty, operand),
            Expr::Constant(value) => lower_constant(value),
            Expr::Variable { index } => self.lower_variable(*index),
            Expr::Field { receiver, field } => self.lower_field_read(receiver.as_deref(), field),
            Expr::Conditional {
                condition,
                consequent,
                alternative,
            } => {
                let condition = self.lower_expression(condition)?;
                let consequent = self.lower_expression(consequent)?;
                let alternative = self.lower_expression(alternative)?;
                Ok(WasmExpr::Conditional {
                    condition: Box::new(condition),
                    then_branch: vec![consequent],
                    else_branch: vec![alternative],
                })
            }
            Expr::Subscript { .. } => {
                return_unsupported_error!("Array element access is not lowered by this backend")
            }
            Expr::Invocation { kind, method, args } => self.lower_invocation(*kind, method, args),
            Expr::New { class_name } => self.lower_construction(class_name),
            Expr::NewArray { .. } | Expr::NewMultiArray { .. } => {
                return_unsupported_error!("Array construction is not lowered by this backend")
            }
            Expr::Cast { value, .. } => self.lower_expression(value),
            Expr::PrimitiveCast {
                source,
                target,
                value,
            } => {
                let value = self.lower_expression(value)?;
                Ok(WasmExpr::Conversion {
                    from: wasm_num_type(*source),
                    to: wasm_num_type(*target),
                    signed: true,
                    reinterpret: false,
                    value: Box::new(value),
                })
            }
            Expr::InstanceOf { class_name, .. } => {
                return_unsupported_error!(
                    "Instance-of tests are not lowered by this backend";
                    { ClassName => class_name.clone() }
                )
            }
            Expr::UnwrapArray { array } => self.lower_expression(array),
        }
    }

    // ========================================================================
    // Binary Operations
    // ========================================================================

    fn lower_binary(
        &mut self,
        op: BinaryOp,
        ty: Option<NumericType>,
        first: &Expr,
        second: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        match op {
            BinaryOp::Add => {
                self.lower_numeric_binary(IntBinaryOp::Add, FloatBinaryOp::Add, ty, first, second)
            }
            BinaryOp::Subtract => {
                self.lower_numeric_binary(IntBinaryOp::Sub, FloatBinaryOp::Sub, ty, first, second)
            }
            BinaryOp::Multiply => {
                self.lower_numeric_binary(IntBinaryOp::Mul, FloatBinaryOp::Mul, ty, first, second)
            }
            BinaryOp::Divide => self.lower_numeric_binary(
                IntBinaryOp::DivSigned,
                FloatBinaryOp::Div,
                ty,
                first,
                second,
            ),
            BinaryOp::Modulo => self.lower_modulo(ty, first, second),
            BinaryOp::BitAnd => {
                self.lower_int_only_binary(IntBinaryOp::And, ty, first, second, "bitwise and")
            }
            BinaryOp::BitOr => {
                self.lower_int_only_binary(IntBinaryOp::Or, ty, first, second, "bitwise or")
            }
            BinaryOp::BitXor => {
                self.lower_int_only_binary(IntBinaryOp::Xor, ty, first, second, "bitwise xor")
            }
            BinaryOp::Equals => {
                self.lower_numeric_binary(IntBinaryOp::Eq, FloatBinaryOp::Eq, ty, first, second)
            }
            BinaryOp::NotEquals => {
                self.lower_numeric_binary(IntBinaryOp::Ne, FloatBinaryOp::Ne, ty, first, second)
            }
            BinaryOp::Greater => self.lower_numeric_binary(
                IntBinaryOp::GtSigned,
                FloatBinaryOp::Gt,
                ty,
                first,
                second,
            ),
            BinaryOp::GreaterOrEquals => self.lower_numeric_binary(
                IntBinaryOp::GeSigned,
                FloatBinaryOp::Ge,
                ty,
                first,
                second,
            ),
            BinaryOp::Less => self.lower_numeric_binary(
                IntBinaryOp::LtSigned,
                FloatBinaryOp::Lt,
                ty,
                first,
                second,
            ),
            BinaryOp::LessOrEquals => self.lower_numeric_binary(
                IntBinaryOp::LeSigned,
                FloatBinaryOp::Le,
                ty,
                first,
                second,
            ),
            BinaryOp::ShiftLeft => {
                self.lower_int_only_binary(IntBinaryOp::Shl, ty, first, second, "shift left")
            }
            BinaryOp::ShiftRight => self.lower_int_only_binary(
                IntBinaryOp::ShrSigned,
                ty,
                first,
                second,
                "arithmetic shift right",
            ),
            BinaryOp::ShiftRightUnsigned => self.lower_int_only_binary(
                IntBinaryOp::ShrUnsigned,
                ty,
                first,
                second,
                "logical shift right",
            ),
            BinaryOp::Compare => self.lower_three_way_compare(ty, first, second),
            BinaryOp::And => self.lower_short_circuit_and(first, second),
            BinaryOp::Or => self.lower_short_circuit_or(first, second),
        }
    }

    /// Lowers an operator with both an integer and a float form, selected
    /// by the expression's declared type (32-bit integer when absent).
    fn lower_numeric_binary(
        &mut self,
        int_op: IntBinaryOp,
        float_op: FloatBinaryOp,
        ty: Option<NumericType>,
        first: &Expr,
        second: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        let first = Box::new(self.lower_expression(first)?);
        let second = Box::new(self.lower_expression(second)?);

        Ok(match ty.unwrap_or(NumericType::Int) {
            NumericType::Int => WasmExpr::IntBinary {
                width: IntWidth::I32,
                op: int_op,
                first,
                second,
            },
            NumericType::Long => WasmExpr::IntBinary {
                width: IntWidth::I64,
                op: int_op,
                first,
                second,
            },
            NumericType::Float => WasmExpr::FloatBinary {
                width: FloatWidth::F32,
                op: float_op,
                first,
                second,
            },
            NumericType::Double => WasmExpr::FloatBinary {
                width: FloatWidth::F64,
                op: float_op,
                first,
                second,
            },
        })
    }

    /// Lowers an integer-only operator. Applying one to a float-typed
    /// expression is an upstream invariant violation.
    fn lower_int_only_binary(
        &mut self,
        int_op: IntBinaryOp,
        ty: Option<NumericType>,
        first: &Expr,
        second: &Expr,
        op_name: &str,
    ) -> Result<WasmExpr, CompileError> {
        let ty = ty.unwrap_or(NumericType::Int);
        let width = match int_width(ty) {
            Some(width) => width,
            None => {
                return_compiler_error!(
                    "Integer operation '{}' applied to a {:?}-typed expression",
                    op_name,
                    ty
                )
            }
        };

        let first = Box::new(self.lower_expression(first)?);
        let second = Box::new(self.lower_expression(second)?);
        Ok(WasmExpr::IntBinary {
            width,
            op: int_op,
            first,
            second,
        })
    }

    /// Integer remainder is native; float remainder has no target
    /// instruction and becomes a runtime helper call.
    fn lower_modulo(
        &mut self,
        ty: Option<NumericType>,
        first: &Expr,
        second: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        let ty = ty.unwrap_or(NumericType::Int);
        match ty {
            NumericType::Int | NumericType::Long => {
                self.lower_int_only_binary(IntBinaryOp::RemSigned, Some(ty), first, second, "modulo")
            }
            NumericType::Float | NumericType::Double => {
                let symbol = self.env.names.remainder_helper(ty);
                self.lower_helper_call(symbol, Some(wasm_num_type(ty)), first, second)
            }
        }
    }

    /// Three-way ordering compare always goes through a runtime helper;
    /// there is no native instruction for it at any type.
    fn lower_three_way_compare(
        &mut self,
        ty: Option<NumericType>,
        first: &Expr,
        second: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        let ty = ty.unwrap_or(NumericType::Int);
        let symbol = self.env.names.compare_helper(ty);
        self.lower_helper_call(symbol, Some(WasmNumType::I32), first, second)
    }

    fn lower_helper_call(
        &mut self,
        symbol: String,
        returns: Option<WasmNumType>,
        first: &Expr,
        second: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        let first = self.lower_expression(first)?;
        let second = self.lower_expression(second)?;
        Ok(WasmExpr::Call {
            symbol,
            imported: false,
            returns,
            args: vec![first, second],
        })
    }

    /// `a && b`: evaluate `a`; leave the block with 0 when it is false,
    /// otherwise fall through and let `b` be the block's value. `b` is
    /// structurally present but never evaluated when the branch fires.
    fn lower_short_circuit_and(
        &mut self,
        first: &Expr,
        second: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        let block_id = self.fresh_block();

        let first = self.lower_expression(first)?;
        let branch = WasmExpr::Branch {
            condition: Box::new(negate(first)),
            target: block_id,
            result: Some(Box::new(WasmExpr::I32Const(0))),
        };

        let second = self.lower_expression(second)?;
        Ok(WasmExpr::Block {
            id: block_id,
            is_loop: false,
            body: vec![branch, second],
        })
    }

    /// `a || b`: symmetric to `&&`, leaving with 1 when `a` is true.
    fn lower_short_circuit_or(
        &mut self,
        first: &Expr,
        second: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        let block_id = self.fresh_block();

        let first = self.lower_expression(first)?;
        let branch = WasmExpr::Branch {
            condition: Box::new(first),
            target: block_id,
            result: Some(Box::new(WasmExpr::I32Const(1))),
        };

        let second = self.lower_expression(second)?;
        Ok(WasmExpr::Block {
            id: block_id,
            is_loop: false,
            body: vec![branch, second],
        })
    }

    // ========================================================================
    // Unary Operations
    // ========================================================================

    fn lower_unary(
        &mut self,
        op: UnaryOp,
        ty: Option<NumericType>,
        operand: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        match op {
            UnaryOp::IntToByte => self.lower_narrowing_extend(operand, 24, true),
            UnaryOp::IntToShort => self.lower_narrowing_extend(operand, 16, true),
            UnaryOp::IntToChar => self.lower_narrowing_extend(operand, 16, false),
            UnaryOp::Not => {
                let operand = self.lower_expression(operand)?;
                Ok(negate(operand))
            }
            UnaryOp::Negate => self.lower_negate(ty, operand),
            UnaryOp::NullCheck => self.lower_expression(operand),
            UnaryOp::ArrayLength => {
                return_unsupported_error!("Array length is not lowered by this backend")
            }
        }
    }

    /// Sub-word truncation: shift left then shift back right by the same
    /// amount, arithmetic for signed kinds and logical for char.
    fn lower_narrowing_extend(
        &mut self,
        operand: &Expr,
        bits: i32,
        signed: bool,
    ) -> Result<WasmExpr, CompileError> {
        let value = self.lower_expression(operand)?;
        let shifted = WasmExpr::IntBinary {
            width: IntWidth::I32,
            op: IntBinaryOp::Shl,
            first: Box::new(value),
            second: Box::new(WasmExpr::I32Const(bits)),
        };
        let shift_back = if signed {
            IntBinaryOp::ShrSigned
        } else {
            IntBinaryOp::ShrUnsigned
        };
        Ok(WasmExpr::IntBinary {
            width: IntWidth::I32,
            op: shift_back,
            first: Box::new(shifted),
            second: Box::new(WasmExpr::I32Const(bits)),
        })
    }

    /// Arithmetic negation subtracts the operand from a zero of its type.
    fn lower_negate(
        &mut self,
        ty: Option<NumericType>,
        operand: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        let ty = ty.unwrap_or(NumericType::Int);
        let operand = Box::new(self.lower_expression(operand)?);
        let zero = Box::new(zero_constant(ty));

        Ok(match ty {
            NumericType::Int => WasmExpr::IntBinary {
                width: IntWidth::I32,
                op: IntBinaryOp::Sub,
                first: zero,
                second: operand,
            },
            NumericType::Long => WasmExpr::IntBinary {
                width: IntWidth::I64,
                op: IntBinaryOp::Sub,
                first: zero,
                second: operand,
            },
            NumericType::Float => WasmExpr::FloatBinary {
                width: FloatWidth::F32,
                op: FloatBinaryOp::Sub,
                first: zero,
                second: operand,
            },
            NumericType::Double => WasmExpr::FloatBinary {
                width: FloatWidth::F64,
                op: FloatBinaryOp::Sub,
                first: zero,
                second: operand,
            },
        })
    }

    // ========================================================================
    // Variables, Fields, Calls
    // ========================================================================

    fn lower_variable(&mut self, index: usize) -> Result<WasmExpr, CompileError> {
        match self.locals.slot_for(index) {
            Some((slot, ty)) => Ok(WasmExpr::GetLocal { index: slot, ty }),
            None => return_compiler_error!(
                "Variable index {} is outside the method's local frame",
                index
            ),
        }
    }

    /// Address of a field: the receiver's value plus the field's byte
    /// offset, or the bare offset for static fields.
    pub(crate) fn field_address(
        &mut self,
        receiver: Option<&Expr>,
        field: &FieldRef,
    ) -> Result<WasmExpr, CompileError> {
        let offset = self.env.layout.field_offset(field) as i32;
        match receiver {
            None => Ok(WasmExpr::I32Const(offset)),
            Some(receiver) => {
                let base = self.lower_expression(receiver)?;
                Ok(WasmExpr::IntBinary {
                    width: IntWidth::I32,
                    op: IntBinaryOp::Add,
                    first: Box::new(base),
                    second: Box::new(WasmExpr::I32Const(offset)),
                })
            }
        }
    }

    fn lower_field_read(
        &mut self,
        receiver: Option<&Expr>,
        field: &FieldRef,
    ) -> Result<WasmExpr, CompileError> {
        let address = self.field_address(receiver, field)?;
        let access = field_access(self.env.layout.field_kind(field));
        Ok(WasmExpr::Load {
            access,
            address: Box::new(address),
        })
    }

    fn lower_invocation(
        &mut self,
        kind: InvocationKind,
        method: &MethodRef,
        args: &[Expr],
    ) -> Result<WasmExpr, CompileError> {
        // The reserved address class never goes through call lowering
        if method.class_name == self.env.settings.address_class {
            return self.lower_address_invocation(method, args);
        }

        match kind {
            InvocationKind::Static | InvocationKind::Special => {
                let symbol = self.env.names.mangle_method(method);
                let imported = self.env.names.is_imported(method);
                let returns = method.returns.map(value_kind_type);

                let mut lowered_args = Vec::with_capacity(args.len());
                for arg in args {
                    lowered_args.push(self.lower_expression(arg)?);
                }
                Ok(WasmExpr::Call {
                    symbol,
                    imported,
                    returns,
                    args: lowered_args,
                })
            }
            InvocationKind::Virtual => {
                return_unsupported_error!(
                    "Virtual dispatch is not lowered by this backend";
                    { ClassName => method.class_name.clone(), MethodName => method.name.clone() }
                )
            }
        }
    }

    /// Object construction calls the allocator with the class's identity
    /// tag as its only argument.
    fn lower_construction(&mut self, class_name: &str) -> Result<WasmExpr, CompileError> {
        let tag = self.env.layout.class_tag(class_name);
        Ok(WasmExpr::Call {
            symbol: self.env.names.allocation_symbol(),
            imported: false,
            returns: Some(WasmNumType::I32),
            args: vec![WasmExpr::I32Const(tag)],
        })
    }
}

fn lower_constant(value: &ConstantValue) -> Result<WasmExpr, CompileError> {
    match value {
        // A null reference is address zero
        ConstantValue::Null => Ok(WasmExpr::I32Const(0)),
        ConstantValue::Int(value) => Ok(WasmExpr::I32Const(*value)),
        ConstantValue::Long(value) => Ok(WasmExpr::I64Const(*value)),
        ConstantValue::Float(value) => Ok(WasmExpr::F32Const(*value)),
        ConstantValue::Double(value) => Ok(WasmExpr::F64Const(*value)),
        ConstantValue::String(_) => {
            return_compiler_error!("String constants have no lowering in this backend")
        }
    }
}
