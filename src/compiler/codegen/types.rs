//! Numeric type and field kind mapping.
//!
//! Small total functions from the source type vocabulary to the target
//! one. The field access table is load-bearing: sub-word fields must keep
//! their exact width and extension behaviour or struct layouts silently
//! corrupt.

use crate::compiler::ast::ast_nodes::{NumericType, ValueKind};
use crate::compiler::wasm::wasm_nodes::{FloatWidth, IntWidth, MemoryAccess, WasmExpr, WasmNumType};

/// Target value type of an arithmetic expression type.
pub fn wasm_num_type(ty: NumericType) -> WasmNumType {
    match ty {
        NumericType::Int => WasmNumType::I32,
        NumericType::Long => WasmNumType::I64,
        NumericType::Float => WasmNumType::F32,
        NumericType::Double => WasmNumType::F64,
    }
}

/// Integer width of an arithmetic type, or `None` for float types.
pub fn int_width(ty: NumericType) -> Option<IntWidth> {
    match ty {
        NumericType::Int => Some(IntWidth::I32),
        NumericType::Long => Some(IntWidth::I64),
        NumericType::Float | NumericType::Double => None,
    }
}

/// Float width of an arithmetic type, or `None` for integer types.
pub fn float_width(ty: NumericType) -> Option<FloatWidth> {
    match ty {
        NumericType::Float => Some(FloatWidth::F32),
        NumericType::Double => Some(FloatWidth::F64),
        NumericType::Int | NumericType::Long => None,
    }
}

/// Target value type of a field/parameter kind. References are 32-bit
/// addresses.
pub fn value_kind_type(kind: ValueKind) -> WasmNumType {
    match kind {
        ValueKind::Boolean
        | ValueKind::Byte
        | ValueKind::Short
        | ValueKind::Char
        | ValueKind::Int
        | ValueKind::Reference => WasmNumType::I32,
        ValueKind::Long => WasmNumType::I64,
        ValueKind::Float => WasmNumType::F32,
        ValueKind::Double => WasmNumType::F64,
    }
}

/// Memory access used for a field of the given kind.
///
/// boolean/byte: 1 byte signed; short: 2 bytes signed; char: 2 bytes
/// zero-extending; int and references: 4 bytes; long: 8 bytes; float and
/// double use the float accesses of their width.
pub fn field_access(kind: ValueKind) -> MemoryAccess {
    match kind {
        ValueKind::Boolean | ValueKind::Byte => MemoryAccess::I8,
        ValueKind::Short => MemoryAccess::I16,
        ValueKind::Char => MemoryAccess::U16,
        ValueKind::Int | ValueKind::Reference => MemoryAccess::I32,
        ValueKind::Long => MemoryAccess::I64,
        ValueKind::Float => MemoryAccess::F32,
        ValueKind::Double => MemoryAccess::F64,
    }
}

/// Zero constant of the given arithmetic type.
pub fn zero_constant(ty: NumericType) -> WasmExpr {
    match ty {
        NumericType::Int => WasmExpr::I32Const(0),
        NumericType::Long => WasmExpr::I64Const(0),
        NumericType::Float => WasmExpr::F32Const(0.0),
        NumericType::Double => WasmExpr::F64Const(0.0),
    }
}
