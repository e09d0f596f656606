//! Target instruction tree node definitions.
//!
//! Branch structure is deliberately restricted: a [`WasmExpr::Break`] or
//! [`WasmExpr::Branch`] may only target a block that encloses it in the
//! final tree (forward exit for plain blocks, backward continuation for
//! loops). The lowering upholds this by construction;
//! [`super::analysis::validate_branch_scoping`] checks it.

/// Identity of a block within one lowered function body.
///
/// Allocated sequentially by the lowering context; branches refer to
/// their target block by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// The four WASM value types this backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasmNumType {
    I32,
    I64,
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    I32,
    I64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntBinaryOp {
    Add,
    Sub,
    Mul,
    DivSigned,
    DivUnsigned,
    RemSigned,
    RemUnsigned,
    And,
    Or,
    Xor,
    Shl,
    ShrSigned,
    ShrUnsigned,
    Eq,
    Ne,
    LtSigned,
    LtUnsigned,
    LeSigned,
    LeUnsigned,
    GtSigned,
    GtUnsigned,
    GeSigned,
    GeUnsigned,
}

impl IntBinaryOp {
    /// Comparisons produce an i32 regardless of operand width.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            IntBinaryOp::Eq
                | IntBinaryOp::Ne
                | IntBinaryOp::LtSigned
                | IntBinaryOp::LtUnsigned
                | IntBinaryOp::LeSigned
                | IntBinaryOp::LeUnsigned
                | IntBinaryOp::GtSigned
                | IntBinaryOp::GtUnsigned
                | IntBinaryOp::GeSigned
                | IntBinaryOp::GeUnsigned
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FloatBinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            FloatBinaryOp::Eq
                | FloatBinaryOp::Ne
                | FloatBinaryOp::Lt
                | FloatBinaryOp::Le
                | FloatBinaryOp::Gt
                | FloatBinaryOp::Ge
        )
    }
}

/// Width and extension behaviour of a memory access.
///
/// Sub-word integer loads extend into an i32: `I8`/`I16` sign-extend,
/// `U8`/`U16` zero-extend. Stores of either signedness truncate the same
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccess {
    I8,
    U8,
    I16,
    U16,
    I32,
    I64,
    F32,
    F64,
}

impl MemoryAccess {
    pub fn bytes(self) -> u8 {
        match self {
            MemoryAccess::I8 | MemoryAccess::U8 => 1,
            MemoryAccess::I16 | MemoryAccess::U16 => 2,
            MemoryAccess::I32 | MemoryAccess::F32 => 4,
            MemoryAccess::I64 | MemoryAccess::F64 => 8,
        }
    }

    /// The value type a load of this access produces.
    pub fn loaded_type(self) -> WasmNumType {
        match self {
            MemoryAccess::I8
            | MemoryAccess::U8
            | MemoryAccess::I16
            | MemoryAccess::U16
            | MemoryAccess::I32 => WasmNumType::I32,
            MemoryAccess::I64 => WasmNumType::I64,
            MemoryAccess::F32 => WasmNumType::F32,
            MemoryAccess::F64 => WasmNumType::F64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WasmExpr {
    /// Structural block. Plain blocks are forward branch targets (a branch
    /// jumps past their end); loop blocks are backward targets (a branch
    /// jumps to their top).
    Block {
        id: BlockId,
        is_loop: bool,
        body: Vec<WasmExpr>,
    },

    /// Conditional branch to an enclosing block. `result` is the value
    /// the branch carries out when taken; it is evaluated before the
    /// condition and discarded on fall-through.
    Branch {
        condition: Box<WasmExpr>,
        target: BlockId,
        result: Option<Box<WasmExpr>>,
    },

    /// Unconditional branch to an enclosing block
    Break {
        target: BlockId,
        result: Option<Box<WasmExpr>>,
    },

    /// Direct call by mangled symbol. `imported` marks host-provided
    /// routines. `returns` is recorded at lowering time so the tree can
    /// be typed without signature lookups.
    Call {
        symbol: String,
        imported: bool,
        returns: Option<WasmNumType>,
        args: Vec<WasmExpr>,
    },

    /// If/else over a 0/1-valued condition
    Conditional {
        condition: Box<WasmExpr>,
        then_branch: Vec<WasmExpr>,
        else_branch: Vec<WasmExpr>,
    },

    I32Const(i32),
    I64Const(i64),
    F32Const(f32),
    F64Const(f64),

    GetLocal {
        index: u32,
        ty: WasmNumType,
    },

    SetLocal {
        index: u32,
        value: Box<WasmExpr>,
    },

    IntBinary {
        width: IntWidth,
        op: IntBinaryOp,
        first: Box<WasmExpr>,
        second: Box<WasmExpr>,
    },

    FloatBinary {
        width: FloatWidth,
        op: FloatBinaryOp,
        first: Box<WasmExpr>,
        second: Box<WasmExpr>,
    },

    Load {
        access: MemoryAccess,
        address: Box<WasmExpr>,
    },

    Store {
        access: MemoryAccess,
        address: Box<WasmExpr>,
        value: Box<WasmExpr>,
    },

    /// Multi-way dispatch: selector `n` branches to `targets[n]`, any
    /// other value to `default_target`
    Switch {
        selector: Box<WasmExpr>,
        targets: Vec<BlockId>,
        default_target: BlockId,
    },

    Return {
        value: Option<Box<WasmExpr>>,
    },

    /// Discard the value of an instruction used in statement position
    Drop {
        value: Box<WasmExpr>,
    },

    /// Numeric conversion. `signed` picks sign- vs zero-extension for
    /// widening and signed vs unsigned float conversion; `reinterpret`
    /// requests a same-width bit cast instead of a value conversion.
    Conversion {
        from: WasmNumType,
        to: WasmNumType,
        signed: bool,
        reinterpret: bool,
        value: Box<WasmExpr>,
    },
}

impl WasmExpr {
    /// The value type this instruction leaves on the stack, or `None` for
    /// instructions used purely in statement position.
    ///
    /// A plain block's type is its last body element's type (value-carrying
    /// branches out of a block always agree with that by construction);
    /// loop blocks never carry a value.
    pub fn result_type(&self) -> Option<WasmNumType> {
        match self {
            WasmExpr::Block { is_loop, body, .. } => {
                if *is_loop {
                    None
                } else {
                    body.last().and_then(WasmExpr::result_type)
                }
            }
            WasmExpr::Branch { .. } | WasmExpr::Break { .. } => None,
            WasmExpr::Call { returns, .. } => *returns,
            WasmExpr::Conditional { then_branch, .. } => {
                then_branch.last().and_then(WasmExpr::result_type)
            }
            WasmExpr::I32Const(_) => Some(WasmNumType::I32),
            WasmExpr::I64Const(_) => Some(WasmNumType::I64),
            WasmExpr::F32Const(_) => Some(WasmNumType::F32),
            WasmExpr::F64Const(_) => Some(WasmNumType::F64),
            WasmExpr::GetLocal { ty, .. } => Some(*ty),
            WasmExpr::SetLocal { .. } => None,
            WasmExpr::IntBinary { width, op, .. } => {
                if op.is_comparison() {
                    Some(WasmNumType::I32)
                } else {
                    Some(match width {
                        IntWidth::I32 => WasmNumType::I32,
                        IntWidth::I64 => WasmNumType::I64,
                    })
                }
            }
            WasmExpr::FloatBinary { width, op, .. } => {
                if op.is_comparison() {
                    Some(WasmNumType::I32)
                } else {
                    Some(match width {
                        FloatWidth::F32 => WasmNumType::F32,
                        FloatWidth::F64 => WasmNumType::F64,
                    })
                }
            }
            WasmExpr::Load { access, .. } => Some(access.loaded_type()),
            WasmExpr::Store { .. } => None,
            WasmExpr::Switch { .. } => None,
            WasmExpr::Return { .. } => None,
            WasmExpr::Drop { .. } => None,
            WasmExpr::Conversion { to, .. } => Some(*to),
        }
    }
}
