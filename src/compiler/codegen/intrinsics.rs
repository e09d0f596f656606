//! The reserved raw-memory address API.
//!
//! One class (named by `BackendSettings::address_class`) stands for raw
//! 32-bit addresses. Its methods are not calls at all: they lower
//! directly to address arithmetic and typed memory access. For instance
//! methods the receiver is the first element of the argument list, so
//! `args[0]` is always the address operand.

use crate::compiler::ast::ast_nodes::{Expr, MethodRef, ValueKind};
use crate::compiler::codegen::context::WasmBuilder;
use crate::compiler::compiler_errors::CompileError;
use crate::compiler::wasm::wasm_nodes::{
    IntBinaryOp, IntWidth, MemoryAccess, WasmExpr, WasmNumType,
};
use crate::return_compiler_error;

impl<'a> WasmBuilder<'a> {
    pub(crate) fn lower_address_invocation(
        &mut self,
        method: &MethodRef,
        args: &[Expr],
    ) -> Result<WasmExpr, CompileError> {
        match method.name.as_str() {
            // Representation changes with no runtime effect
            "toInt" | "toStructure" | "fromInt" => self.address_operand(method, args, 0),

            "toLong" => {
                let value = self.address_operand(method, args, 0)?;
                Ok(widen_address(value))
            }
            "fromLong" => {
                let value = self.address_operand(method, args, 0)?;
                Ok(narrow_to_address(value))
            }

            "add" => self.lower_address_add(method, args),

            "getByte" => self.lower_address_load(method, args, MemoryAccess::I8),
            "getShort" => self.lower_address_load(method, args, MemoryAccess::I16),
            "getChar" => self.lower_address_load(method, args, MemoryAccess::U16),
            "getInt" => self.lower_address_load(method, args, MemoryAccess::I32),
            "getLong" => self.lower_address_load(method, args, MemoryAccess::I64),
            "getFloat" => self.lower_address_load(method, args, MemoryAccess::F32),
            "getDouble" => self.lower_address_load(method, args, MemoryAccess::F64),

            "putByte" => self.lower_address_store(method, args, MemoryAccess::I8),
            "putShort" => self.lower_address_store(method, args, MemoryAccess::I16),
            "putChar" => self.lower_address_store(method, args, MemoryAccess::U16),
            "putInt" => self.lower_address_store(method, args, MemoryAccess::I32),
            "putLong" => self.lower_address_store(method, args, MemoryAccess::I64),
            "putFloat" => self.lower_address_store(method, args, MemoryAccess::F32),
            "putDouble" => self.lower_address_store(method, args, MemoryAccess::F64),

            other => {
                return_compiler_error!(
                    "Unknown operation '{}' on the raw address class",
                    other;
                    { ClassName => method.class_name.clone(), OperationName => other }
                )
            }
        }
    }

    fn address_operand(
        &mut self,
        method: &MethodRef,
        args: &[Expr],
        position: usize,
    ) -> Result<WasmExpr, CompileError> {
        match args.get(position) {
            Some(arg) => self.lower_expression(arg),
            None => return_compiler_error!(
                "Address operation '{}' is missing operand {}",
                method.name,
                position
            ),
        }
    }

    /// `add(base, offset)`: a plain 32-bit add. A declared-long offset is
    /// narrowed first; addresses are always 32 bits here.
    fn lower_address_add(
        &mut self,
        method: &MethodRef,
        args: &[Expr],
    ) -> Result<WasmExpr, CompileError> {
        let base = self.address_operand(method, args, 0)?;
        let mut offset = self.address_operand(method, args, 1)?;
        if method.params.first() == Some(&ValueKind::Long) {
            offset = narrow_to_address(offset);
        }
        Ok(WasmExpr::IntBinary {
            width: IntWidth::I32,
            op: IntBinaryOp::Add,
            first: Box::new(base),
            second: Box::new(offset),
        })
    }

    fn lower_address_load(
        &mut self,
        method: &MethodRef,
        args: &[Expr],
        access: MemoryAccess,
    ) -> Result<WasmExpr, CompileError> {
        let address = self.address_operand(method, args, 0)?;
        Ok(WasmExpr::Load {
            access,
            address: Box::new(address),
        })
    }

    /// Stores evaluate the address before the value, preserving source
    /// evaluation order.
    fn lower_address_store(
        &mut self,
        method: &MethodRef,
        args: &[Expr],
        access: MemoryAccess,
    ) -> Result<WasmExpr, CompileError> {
        let address = self.address_operand(method, args, 0)?;
        let value = self.address_operand(method, args, 1)?;
        Ok(WasmExpr::Store {
            access,
            address: Box::new(address),
            value: Box::new(value),
        })
    }
}

fn widen_address(value: WasmExpr) -> WasmExpr {
    WasmExpr::Conversion {
        from: WasmNumType::I32,
        to: WasmNumType::I64,
        signed: false,
        reinterpret: false,
        value: Box::new(value),
    }
}

fn narrow_to_address(value: WasmExpr) -> WasmExpr {
    WasmExpr::Conversion {
        from: WasmNumType::I64,
        to: WasmNumType::I32,
        signed: false,
        reinterpret: false,
        value: Box::new(value),
    }
}
