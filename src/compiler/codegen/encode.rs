//! Function-body encoding and validation.
//!
//! Renders a lowered instruction tree into a `wasm_encoder::Function`.
//! Block ids become relative label depths here; a branch whose target is
//! not on the label stack is a lowering bug and fails the encode.
//!
//! `validate_function` wraps one encoded body in a throwaway module -
//! synthesizing an import for every called symbol - and runs wasmparser
//! over it. The real module assembly lives downstream; this exists so
//! lowering bugs surface here, with context, instead of in a consumer.

use crate::compiler::codegen::context::FunctionLocals;
use crate::compiler::compiler_errors::CompileError;
use crate::compiler::wasm::wasm_nodes::{
    BlockId, FloatBinaryOp, FloatWidth, IntBinaryOp, IntWidth, MemoryAccess, WasmExpr, WasmNumType,
};
use crate::return_encoding_error;
use rustc_hash::FxHashMap;
use wasm_encoder::{
    BlockType, CodeSection, EntityType, Function, FunctionSection, ImportSection, Instruction,
    MemArg, MemorySection, MemoryType, Module, TypeSection, ValType,
};

pub fn val_type(ty: WasmNumType) -> ValType {
    match ty {
        WasmNumType::I32 => ValType::I32,
        WasmNumType::I64 => ValType::I64,
        WasmNumType::F32 => ValType::F32,
        WasmNumType::F64 => ValType::F64,
    }
}

/// Encodes a lowered body as a function whose locals are exactly the
/// method frame (no declared parameters; slot numbering matches
/// [`FunctionLocals`]). `functions` maps call symbols to function
/// indices.
pub fn encode_function(
    body: &[WasmExpr],
    locals: &FunctionLocals,
    functions: &FxHashMap<String, u32>,
) -> Result<Function, CompileError> {
    let mut function = Function::new(local_groups(locals));
    let mut labels: Vec<Option<BlockId>> = Vec::new();

    for expr in body {
        encode_expr(expr, &mut function, &mut labels, functions)?;
    }
    function.instruction(&Instruction::End);
    Ok(function)
}

/// Run-length encodes the local declaration list.
fn local_groups(locals: &FunctionLocals) -> Vec<(u32, ValType)> {
    let mut groups: Vec<(u32, ValType)> = Vec::new();
    for ty in &locals.types {
        let ty = val_type(*ty);
        match groups.last_mut() {
            Some((count, last)) if *last == ty => *count += 1,
            _ => groups.push((1, ty)),
        }
    }
    groups
}

fn branch_depth(labels: &[Option<BlockId>], target: BlockId) -> Result<u32, CompileError> {
    match labels.iter().rev().position(|label| *label == Some(target)) {
        Some(depth) => Ok(depth as u32),
        None => return_encoding_error!(
            "Branch target block {} is not an enclosing label",
            target.0
        ),
    }
}

fn list_block_type(body: &[WasmExpr]) -> BlockType {
    match body.last().and_then(WasmExpr::result_type) {
        Some(ty) => BlockType::Result(val_type(ty)),
        None => BlockType::Empty,
    }
}

fn encode_list(
    body: &[WasmExpr],
    function: &mut Function,
    labels: &mut Vec<Option<BlockId>>,
    functions: &FxHashMap<String, u32>,
) -> Result<(), CompileError> {
    for expr in body {
        encode_expr(expr, function, labels, functions)?;
    }
    Ok(())
}

fn encode_expr(
    expr: &WasmExpr,
    function: &mut Function,
    labels: &mut Vec<Option<BlockId>>,
    functions: &FxHashMap<String, u32>,
) -> Result<(), CompileError> {
    match expr {
        WasmExpr::Block { id, is_loop, body } => {
            if *is_loop {
                function.instruction(&Instruction::Loop(BlockType::Empty));
            } else {
                function.instruction(&Instruction::Block(list_block_type(body)));
            }
            labels.push(Some(*id));
            let result = encode_list(body, function, labels, functions);
            labels.pop();
            result?;
            function.instruction(&Instruction::End);
        }
        WasmExpr::Branch {
            condition,
            target,
            result,
        } => {
            // The carried value sits under the condition; it leaves with
            // the branch or gets dropped on fall-through
            if let Some(result) = result {
                encode_expr(result, function, labels, functions)?;
            }
            encode_expr(condition, function, labels, functions)?;
            function.instruction(&Instruction::BrIf(branch_depth(labels, *target)?));
            if result.is_some() {
                function.instruction(&Instruction::Drop);
            }
        }
        WasmExpr::Break { target, result } => {
            if let Some(result) = result {
                encode_expr(result, function, labels, functions)?;
            }
            function.instruction(&Instruction::Br(branch_depth(labels, *target)?));
        }
        WasmExpr::Call { symbol, args, .. } => {
            for arg in args {
                encode_expr(arg, function, labels, functions)?;
            }
            match functions.get(symbol) {
                Some(index) => {
                    function.instruction(&Instruction::Call(*index));
                }
                None => return_encoding_error!("No function index for symbol '{}'", symbol),
            }
        }
        WasmExpr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            encode_expr(condition, function, labels, functions)?;
            function.instruction(&Instruction::If(list_block_type(then_branch)));
            // An if/else owns one label; nothing in this backend branches
            // to it, but it still occupies a depth
            labels.push(None);
            let result = (|| {
                encode_list(then_branch, function, labels, functions)?;
                if !else_branch.is_empty() {
                    function.instruction(&Instruction::Else);
                    encode_list(else_branch, function, labels, functions)?;
                }
                Ok(())
            })();
            labels.pop();
            result?;
            function.instruction(&Instruction::End);
        }
        WasmExpr::I32Const(value) => {
            function.instruction(&Instruction::I32Const(*value));
        }
        WasmExpr::I64Const(value) => {
            function.instruction(&Instruction::I64Const(*value));
        }
        WasmExpr::F32Const(value) => {
            function.instruction(&Instruction::F32Const((*value).into()));
        }
        WasmExpr::F64Const(value) => {
            function.instruction(&Instruction::F64Const((*value).into()));
        }
        WasmExpr::GetLocal { index, .. } => {
            function.instruction(&Instruction::LocalGet(*index));
        }
        WasmExpr::SetLocal { index, value } => {
            encode_expr(value, function, labels, functions)?;
            function.instruction(&Instruction::LocalSet(*index));
        }
        WasmExpr::IntBinary {
            width,
            op,
            first,
            second,
        } => {
            encode_expr(first, function, labels, functions)?;
            encode_expr(second, function, labels, functions)?;
            function.instruction(&int_instruction(*width, *op));
        }
        WasmExpr::FloatBinary {
            width,
            op,
            first,
            second,
        } => {
            encode_expr(first, function, labels, functions)?;
            encode_expr(second, function, labels, functions)?;
            function.instruction(&float_instruction(*width, *op));
        }
        WasmExpr::Load { access, address } => {
            encode_expr(address, function, labels, functions)?;
            function.instruction(&load_instruction(*access));
        }
        WasmExpr::Store {
            access,
            address,
            value,
        } => {
            encode_expr(address, function, labels, functions)?;
            encode_expr(value, function, labels, functions)?;
            function.instruction(&store_instruction(*access));
        }
        WasmExpr::Switch {
            selector,
            targets,
            default_target,
        } => {
            encode_expr(selector, function, labels, functions)?;
            let mut depths = Vec::with_capacity(targets.len());
            for target in targets {
                depths.push(branch_depth(labels, *target)?);
            }
            let default_depth = branch_depth(labels, *default_target)?;
            function.instruction(&Instruction::BrTable(depths.into(), default_depth));
        }
        WasmExpr::Return { value } => {
            if let Some(value) = value {
                encode_expr(value, function, labels, functions)?;
            }
            function.instruction(&Instruction::Return);
        }
        WasmExpr::Drop { value } => {
            encode_expr(value, function, labels, functions)?;
            if value.result_type().is_some() {
                function.instruction(&Instruction::Drop);
            }
        }
        WasmExpr::Conversion {
            from,
            to,
            signed,
            reinterpret,
            value,
        } => {
            encode_expr(value, function, labels, functions)?;
            if let Some(instruction) = conversion_instruction(*from, *to, *signed, *reinterpret)? {
                function.instruction(&instruction);
            }
        }
    }
    Ok(())
}

fn memarg(access: MemoryAccess) -> MemArg {
    let align = match access.bytes() {
        1 => 0,
        2 => 1,
        4 => 2,
        _ => 3,
    };
    MemArg {
        offset: 0,
        align,
        memory_index: 0,
    }
}

fn load_instruction(access: MemoryAccess) -> Instruction<'static> {
    let memarg = memarg(access);
    match access {
        MemoryAccess::I8 => Instruction::I32Load8S(memarg),
        MemoryAccess::U8 => Instruction::I32Load8U(memarg),
        MemoryAccess::I16 => Instruction::I32Load16S(memarg),
        MemoryAccess::U16 => Instruction::I32Load16U(memarg),
        MemoryAccess::I32 => Instruction::I32Load(memarg),
        MemoryAccess::I64 => Instruction::I64Load(memarg),
        MemoryAccess::F32 => Instruction::F32Load(memarg),
        MemoryAccess::F64 => Instruction::F64Load(memarg),
    }
}

fn store_instruction(access: MemoryAccess) -> Instruction<'static> {
    let memarg = memarg(access);
    match access {
        MemoryAccess::I8 | MemoryAccess::U8 => Instruction::I32Store8(memarg),
        MemoryAccess::I16 | MemoryAccess::U16 => Instruction::I32Store16(memarg),
        MemoryAccess::I32 => Instruction::I32Store(memarg),
        MemoryAccess::I64 => Instruction::I64Store(memarg),
        MemoryAccess::F32 => Instruction::F32Store(memarg),
        MemoryAccess::F64 => Instruction::F64Store(memarg),
    }
}

fn int_instruction(width: IntWidth, op: IntBinaryOp) -> Instruction<'static> {
    match width {
        IntWidth::I32 => match op {
            IntBinaryOp::Add => Instruction::I32Add,
            IntBinaryOp::Sub => Instruction::I32Sub,
            IntBinaryOp::Mul => Instruction::I32Mul,
            IntBinaryOp::DivSigned => Instruction::I32DivS,
            IntBinaryOp::DivUnsigned => Instruction::I32DivU,
            IntBinaryOp::RemSigned => Instruction::I32RemS,
            IntBinaryOp::RemUnsigned => Instruction::I32RemU,
            IntBinaryOp::And => Instruction::I32And,
            IntBinaryOp::Or => Instruction::I32Or,
            IntBinaryOp::Xor => Instruction::I32Xor,
            IntBinaryOp::Shl => Instruction::I32Shl,
            IntBinaryOp::ShrSigned => Instruction::I32ShrS,
            IntBinaryOp::ShrUnsigned => Instruction::I32ShrU,
            IntBinaryOp::Eq => Instruction::I32Eq,
            IntBinaryOp::Ne => Instruction::I32Ne,
            IntBinaryOp::LtSigned => Instruction::I32LtS,
            IntBinaryOp::LtUnsigned => Instruction::I32LtU,
            IntBinaryOp::LeSigned => Instruction::I32LeS,
            IntBinaryOp::LeUnsigned => Instruction::I32LeU,
            IntBinaryOp::GtSigned => Instruction::I32GtS,
            IntBinaryOp::GtUnsigned => Instruction::I32GtU,
            IntBinaryOp::GeSigned => Instruction::I32GeS,
            IntBinaryOp::GeUnsigned => Instruction::I32GeU,
        },
        IntWidth::I64 => match op {
            IntBinaryOp::Add => Instruction::I64Add,
            IntBinaryOp::Sub => Instruction::I64Sub,
            IntBinaryOp::Mul => Instruction::I64Mul,
            IntBinaryOp::DivSigned => Instruction::I64DivS,
            IntBinaryOp::DivUnsigned => Instruction::I64DivU,
            IntBinaryOp::RemSigned => Instruction::I64RemS,
            IntBinaryOp::RemUnsigned => Instruction::I64RemU,
            IntBinaryOp::And => Instruction::I64And,
            IntBinaryOp::Or => Instruction::I64Or,
            IntBinaryOp::Xor => Instruction::I64Xor,
            IntBinaryOp::Shl => Instruction::I64Shl,
            IntBinaryOp::ShrSigned => Instruction::I64ShrS,
            IntBinaryOp::ShrUnsigned => Instruction::I64ShrU,
            IntBinaryOp::Eq => Instruction::I64Eq,
            IntBinaryOp::Ne => Instruction::I64Ne,
            IntBinaryOp::LtSigned => Instruction::I64LtS,
            IntBinaryOp::LtUnsigned => Instruction::I64LtU,
            IntBinaryOp::LeSigned => Instruction::I64LeS,
            IntBinaryOp::LeUnsigned => Instruction::I64LeU,
            IntBinaryOp::GtSigned => Instruction::I64GtS,
            IntBinaryOp::GtUnsigned => Instruction::I64GtU,
            IntBinaryOp::GeSigned => Instruction::I64GeS,
            IntBinaryOp::GeUnsigned => Instruction::I64GeU,
        },
    }
}

fn float_instruction(width: FloatWidth, op: FloatBinaryOp) -> Instruction<'static> {
    match width {
        FloatWidth::F32 => match op {
            FloatBinaryOp::Add => Instruction::F32Add,
            FloatBinaryOp::Sub => Instruction::F32Sub,
            FloatBinaryOp::Mul => Instruction::F32Mul,
            FloatBinaryOp::Div => Instruction::F32Div,
            FloatBinaryOp::Eq => Instruction::F32Eq,
            FloatBinaryOp::Ne => Instruction::F32Ne,
            FloatBinaryOp::Lt => Instruction::F32Lt,
            FloatBinaryOp::Le => Instruction::F32Le,
            FloatBinaryOp::Gt => Instruction::F32Gt,
            FloatBinaryOp::Ge => Instruction::F32Ge,
        },
        FloatWidth::F64 => match op {
            FloatBinaryOp::Add => Instruction::F64Add,
            FloatBinaryOp::Sub => Instruction::F64Sub,
            FloatBinaryOp::Mul => Instruction::F64Mul,
            FloatBinaryOp::Div => Instruction::F64Div,
            FloatBinaryOp::Eq => Instruction::F64Eq,
            FloatBinaryOp::Ne => Instruction::F64Ne,
            FloatBinaryOp::Lt => Instruction::F64Lt,
            FloatBinaryOp::Le => Instruction::F64Le,
            FloatBinaryOp::Gt => Instruction::F64Gt,
            FloatBinaryOp::Ge => Instruction::F64Ge,
        },
    }
}

fn conversion_instruction(
    from: WasmNumType,
    to: WasmNumType,
    signed: bool,
    reinterpret: bool,
) -> Result<Option<Instruction<'static>>, CompileError> {
    use WasmNumType::*;

    if from == to {
        return Ok(None);
    }
    if reinterpret {
        return match (from, to) {
            (I32, F32) => Ok(Some(Instruction::F32ReinterpretI32)),
            (F32, I32) => Ok(Some(Instruction::I32ReinterpretF32)),
            (I64, F64) => Ok(Some(Instruction::F64ReinterpretI64)),
            (F64, I64) => Ok(Some(Instruction::I64ReinterpretF64)),
            _ => return_encoding_error!(
                "Reinterpret conversion between {:?} and {:?} has no same-width encoding",
                from,
                to
            ),
        };
    }

    let instruction = match (from, to) {
        (I32, I64) => {
            if signed {
                Instruction::I64ExtendI32S
            } else {
                Instruction::I64ExtendI32U
            }
        }
        (I64, I32) => Instruction::I32WrapI64,
        (I32, F32) => {
            if signed {
                Instruction::F32ConvertI32S
            } else {
                Instruction::F32ConvertI32U
            }
        }
        (I32, F64) => {
            if signed {
                Instruction::F64ConvertI32S
            } else {
                Instruction::F64ConvertI32U
            }
        }
        (I64, F32) => {
            if signed {
                Instruction::F32ConvertI64S
            } else {
                Instruction::F32ConvertI64U
            }
        }
        (I64, F64) => {
            if signed {
                Instruction::F64ConvertI64S
            } else {
                Instruction::F64ConvertI64U
            }
        }
        (F32, I32) => {
            if signed {
                Instruction::I32TruncF32S
            } else {
                Instruction::I32TruncF32U
            }
        }
        (F32, I64) => {
            if signed {
                Instruction::I64TruncF32S
            } else {
                Instruction::I64TruncF32U
            }
        }
        (F64, I32) => {
            if signed {
                Instruction::I32TruncF64S
            } else {
                Instruction::I32TruncF64U
            }
        }
        (F64, I64) => {
            if signed {
                Instruction::I64TruncF64S
            } else {
                Instruction::I64TruncF64U
            }
        }
        (F32, F64) => Instruction::F64PromoteF32,
        (F64, F32) => Instruction::F32DemoteF64,
        (I32, I32) | (I64, I64) | (F32, F32) | (F64, F64) => return Ok(None),
    };
    Ok(Some(instruction))
}

/// The signature of a called symbol, recovered from the call site.
struct CallSignature {
    symbol: String,
    params: Vec<ValType>,
    returns: Option<ValType>,
}

fn collect_call_signatures(
    expr: &WasmExpr,
    seen: &mut FxHashMap<String, u32>,
    signatures: &mut Vec<CallSignature>,
) -> Result<(), CompileError> {
    if let WasmExpr::Call {
        symbol,
        returns,
        args,
        ..
    } = expr
    {
        if !seen.contains_key(symbol) {
            let mut params = Vec::with_capacity(args.len());
            for arg in args {
                match arg.result_type() {
                    Some(ty) => params.push(val_type(ty)),
                    None => return_encoding_error!(
                        "Call to '{}' passes a value-less instruction as an argument",
                        symbol
                    ),
                }
            }
            seen.insert(symbol.clone(), signatures.len() as u32);
            signatures.push(CallSignature {
                symbol: symbol.clone(),
                params,
                returns: returns.map(val_type),
            });
        }
    }
    for_each_child(expr, |child| collect_call_signatures(child, seen, signatures))
}

fn for_each_child(
    expr: &WasmExpr,
    mut visit: impl FnMut(&WasmExpr) -> Result<(), CompileError>,
) -> Result<(), CompileError> {
    match expr {
        WasmExpr::Block { body, .. } => body.iter().try_for_each(visit),
        WasmExpr::Branch {
            condition, result, ..
        } => {
            visit(condition)?;
            match result {
                Some(result) => visit(result),
                None => Ok(()),
            }
        }
        WasmExpr::Break { result, .. } => match result {
            Some(result) => visit(result),
            None => Ok(()),
        },
        WasmExpr::Call { args, .. } => args.iter().try_for_each(visit),
        WasmExpr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            visit(condition)?;
            then_branch.iter().try_for_each(&mut visit)?;
            else_branch.iter().try_for_each(visit)
        }
        WasmExpr::I32Const(_)
        | WasmExpr::I64Const(_)
        | WasmExpr::F32Const(_)
        | WasmExpr::F64Const(_)
        | WasmExpr::GetLocal { .. } => Ok(()),
        WasmExpr::SetLocal { value, .. } => visit(value),
        WasmExpr::IntBinary { first, second, .. }
        | WasmExpr::FloatBinary { first, second, .. } => {
            visit(first)?;
            visit(second)
        }
        WasmExpr::Load { address, .. } => visit(address),
        WasmExpr::Store { address, value, .. } => {
            visit(address)?;
            visit(value)
        }
        WasmExpr::Switch { selector, .. } => visit(selector),
        WasmExpr::Return { value } => match value {
            Some(value) => visit(value),
            None => Ok(()),
        },
        WasmExpr::Drop { value } => visit(value),
        WasmExpr::Conversion { value, .. } => visit(value),
    }
}

/// Encodes `body` into a minimal throwaway module and validates it with
/// wasmparser. Every called symbol becomes a synthesized import with the
/// signature its first call site implies.
pub fn validate_function(
    body: &[WasmExpr],
    locals: &FunctionLocals,
    results: &[WasmNumType],
) -> Result<(), CompileError> {
    let mut seen = FxHashMap::default();
    let mut signatures = Vec::new();
    for expr in body {
        collect_call_signatures(expr, &mut seen, &mut signatures)?;
    }

    let mut types = TypeSection::new();
    for signature in &signatures {
        types
            .ty()
            .function(signature.params.clone(), signature.returns.into_iter());
    }
    let result_types: Vec<ValType> = results.iter().map(|ty| val_type(*ty)).collect();
    types.ty().function(Vec::new(), result_types);

    let mut imports = ImportSection::new();
    for (index, signature) in signatures.iter().enumerate() {
        imports.import(
            "env",
            &signature.symbol,
            EntityType::Function(index as u32),
        );
    }

    let mut function_section = FunctionSection::new();
    function_section.function(signatures.len() as u32);

    let mut memories = MemorySection::new();
    memories.memory(MemoryType {
        minimum: 1,
        maximum: None,
        memory64: false,
        shared: false,
        page_size_log2: None,
    });

    let function = encode_function(body, locals, &seen)?;
    let mut code = CodeSection::new();
    code.function(&function);

    let mut module = Module::new();
    module
        .section(&types)
        .section(&imports)
        .section(&function_section)
        .section(&memories)
        .section(&code);
    let bytes = module.finish();

    match wasmparser::validate(&bytes) {
        Ok(_) => Ok(()),
        Err(error) => return_encoding_error!(
            "Lowered function failed validation: {}",
            error.message()
        ),
    }
}
