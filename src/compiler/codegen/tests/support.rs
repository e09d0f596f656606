//! Shared fixtures for codegen tests: in-memory collaborator
//! implementations, AST shorthand constructors and a small interpreter
//! that executes lowered instruction trees directly.
//!
//! The interpreter follows the target semantics: falling off a loop body
//! exits the loop, a branch to a loop re-enters it at the top, a branch
//! to a plain block exits past its end, and branch-carried values become
//! the value of the exited block.

use crate::compiler::ast::ast_nodes::{
    BinaryOp, ConstantValue, Expr, FieldRef, InvocationKind, LabelId, Lvalue, MethodRef,
    NumericType, Statement, SwitchClause, ValueKind,
};
use crate::compiler::codegen::context::{
    ClassLayout, CodegenEnv, FunctionLocals, NameResolution, WasmBuilder,
};
use crate::compiler::compiler_errors::CompileError;
use crate::compiler::wasm::wasm_nodes::{
    BlockId, FloatBinaryOp, IntBinaryOp, MemoryAccess, WasmExpr, WasmNumType,
};
use crate::settings::BackendSettings;
use rustc_hash::{FxHashMap, FxHashSet};

// ============================================================================
// Collaborator Fixtures
// ============================================================================

#[derive(Default)]
pub struct TestLayout {
    offsets: FxHashMap<(String, String), u32>,
    kinds: FxHashMap<(String, String), ValueKind>,
    tags: FxHashMap<String, i32>,
    initializers: FxHashSet<String>,
    raw_structures: FxHashSet<String>,
}

impl TestLayout {
    pub fn new() -> Self {
        TestLayout::default()
    }

    pub fn with_field(
        mut self,
        class_name: &str,
        field_name: &str,
        kind: ValueKind,
        offset: u32,
    ) -> Self {
        let key = (class_name.to_string(), field_name.to_string());
        self.offsets.insert(key.clone(), offset);
        self.kinds.insert(key, kind);
        self
    }

    pub fn with_tag(mut self, class_name: &str, tag: i32) -> Self {
        self.tags.insert(class_name.to_string(), tag);
        self
    }

    pub fn with_initializer(mut self, class_name: &str) -> Self {
        self.initializers.insert(class_name.to_string());
        self
    }

    pub fn with_raw_structure(mut self, class_name: &str) -> Self {
        self.raw_structures.insert(class_name.to_string());
        self
    }
}

impl ClassLayout for TestLayout {
    fn field_offset(&self, field: &FieldRef) -> u32 {
        *self
            .offsets
            .get(&(field.class_name.clone(), field.name.clone()))
            .expect("field should be registered in the test layout")
    }

    fn field_kind(&self, field: &FieldRef) -> ValueKind {
        *self
            .kinds
            .get(&(field.class_name.clone(), field.name.clone()))
            .expect("field should be registered in the test layout")
    }

    fn class_tag(&self, class_name: &str) -> i32 {
        *self
            .tags
            .get(class_name)
            .expect("class tag should be registered in the test layout")
    }

    fn has_static_initializer(&self, class_name: &str) -> bool {
        self.initializers.contains(class_name)
    }

    fn is_raw_layout_structure(&self, class_name: &str) -> bool {
        self.raw_structures.contains(class_name)
    }
}

#[derive(Default)]
pub struct TestNames {
    imported: FxHashSet<String>,
}

impl TestNames {
    pub fn new() -> Self {
        TestNames::default()
    }

    pub fn with_imported(mut self, symbol: &str) -> Self {
        self.imported.insert(symbol.to_string());
        self
    }
}

pub fn mangled(class_name: &str, method_name: &str) -> String {
    format!("{}_{}", class_name.replace('.', "_"), method_name)
}

fn type_suffix(ty: NumericType) -> &'static str {
    match ty {
        NumericType::Int => "int",
        NumericType::Long => "long",
        NumericType::Float => "float",
        NumericType::Double => "double",
    }
}

impl NameResolution for TestNames {
    fn mangle_method(&self, method: &MethodRef) -> String {
        mangled(&method.class_name, &method.name)
    }

    fn is_imported(&self, method: &MethodRef) -> bool {
        self.imported.contains(&self.mangle_method(method))
    }

    fn initializer_symbol(&self, class_name: &str) -> String {
        format!("{}_clinit", class_name.replace('.', "_"))
    }

    fn allocation_symbol(&self) -> String {
        "rt_alloc".to_string()
    }

    fn remainder_helper(&self, ty: NumericType) -> String {
        format!("rt_rem_{}", type_suffix(ty))
    }

    fn compare_helper(&self, ty: NumericType) -> String {
        format!("rt_cmp_{}", type_suffix(ty))
    }
}

/// Owns the collaborators so tests can borrow a [`CodegenEnv`] from one
/// place.
pub struct TestContext {
    pub layout: TestLayout,
    pub names: TestNames,
    pub settings: BackendSettings,
}

impl TestContext {
    pub fn new() -> Self {
        TestContext {
            layout: TestLayout::new(),
            names: TestNames::new(),
            settings: BackendSettings::default(),
        }
    }

    pub fn with_layout(layout: TestLayout) -> Self {
        TestContext {
            layout,
            names: TestNames::new(),
            settings: BackendSettings::default(),
        }
    }

    pub fn env(&self) -> CodegenEnv<'_> {
        CodegenEnv {
            layout: &self.layout,
            names: &self.names,
            settings: &self.settings,
        }
    }
}

pub fn int_locals(count: usize) -> FunctionLocals {
    FunctionLocals::new(0, vec![WasmNumType::I32; count])
}

pub fn lower_expr(
    context: &TestContext,
    locals: &FunctionLocals,
    expr: &Expr,
) -> Result<WasmExpr, CompileError> {
    let env = context.env();
    let mut builder = WasmBuilder::new(&env, locals);
    builder.lower_expression(expr)
}

pub fn lower_stmt(
    context: &TestContext,
    locals: &FunctionLocals,
    statement: &Statement,
) -> Result<Option<WasmExpr>, CompileError> {
    let env = context.env();
    let mut builder = WasmBuilder::new(&env, locals);
    builder.lower_statement(statement)
}

// ============================================================================
// AST Shorthand
// ============================================================================

pub fn int_const(value: i32) -> Expr {
    Expr::Constant(ConstantValue::Int(value))
}

pub fn long_const(value: i64) -> Expr {
    Expr::Constant(ConstantValue::Long(value))
}

pub fn double_const(value: f64) -> Expr {
    Expr::Constant(ConstantValue::Double(value))
}

pub fn variable(index: usize) -> Expr {
    Expr::Variable { index }
}

pub fn binary(op: BinaryOp, ty: Option<NumericType>, first: Expr, second: Expr) -> Expr {
    Expr::Binary {
        op,
        ty,
        first: Box::new(first),
        second: Box::new(second),
    }
}

pub fn call_static(
    class_name: &str,
    name: &str,
    params: Vec<ValueKind>,
    returns: Option<ValueKind>,
    args: Vec<Expr>,
) -> Expr {
    Expr::Invocation {
        kind: InvocationKind::Static,
        method: MethodRef::new(class_name, name, params, returns),
        args,
    }
}

/// Statement that evaluates an expression purely for its side effects.
pub fn eval_stmt(expr: Expr) -> Statement {
    Statement::Assignment {
        left: None,
        right: expr,
    }
}

pub fn assign_local(index: usize, value: Expr) -> Statement {
    Statement::Assignment {
        left: Some(Lvalue::Local { index }),
        right: value,
    }
}

pub fn switch_clause(conditions: Vec<i32>, body: Vec<Statement>) -> SwitchClause {
    SwitchClause { conditions, body }
}

pub fn labeled(id: u32) -> Option<LabelId> {
    Some(LabelId(id))
}

/// A call statement used as an observable side effect in interpreter
/// tests; `marker` distinguishes call sites in the log.
pub fn effect(marker: i32) -> Statement {
    eval_stmt(call_static(
        "test.Probe",
        "effect",
        vec![ValueKind::Int],
        None,
        vec![int_const(marker)],
    ))
}

pub const EFFECT_SYMBOL: &str = "test_Probe_effect";

// ============================================================================
// Tree Interpreter
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Value {
    pub fn as_i32(self) -> i32 {
        match self {
            Value::I32(value) => value,
            other => panic!("expected an i32 value, got {:?}", other),
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Value::I64(value) => value,
            other => panic!("expected an i64 value, got {:?}", other),
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            Value::F32(value) => value,
            other => panic!("expected an f32 value, got {:?}", other),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Value::F64(value) => value,
            other => panic!("expected an f64 value, got {:?}", other),
        }
    }
}

enum Flow {
    Normal(Option<Value>),
    Branch(BlockId, Option<Value>),
    Return(Option<Value>),
}

pub struct Machine {
    pub locals: Vec<Value>,
    pub memory: Vec<u8>,
    /// Every call the execution performed, in order
    pub call_log: Vec<(String, Vec<Value>)>,
    call_results: FxHashMap<String, Value>,
}

impl Machine {
    pub fn new(locals: Vec<Value>) -> Self {
        Machine {
            locals,
            memory: vec![0; 1 << 16],
            call_log: Vec::new(),
            call_results: FxHashMap::default(),
        }
    }

    pub fn with_call_result(mut self, symbol: &str, value: Value) -> Self {
        self.call_results.insert(symbol.to_string(), value);
        self
    }

    /// Executes a lowered function body and returns its return value.
    pub fn run(&mut self, body: &[WasmExpr]) -> Option<Value> {
        match self.eval_list(body) {
            Flow::Normal(value) => value,
            Flow::Return(value) => value,
            Flow::Branch(target, _) => {
                panic!("branch to block {} escaped the function body", target.0)
            }
        }
    }

    /// Evaluates a single expression tree and returns its value.
    pub fn eval_value(&mut self, expr: &WasmExpr) -> Option<Value> {
        match self.eval(expr) {
            Flow::Normal(value) => value,
            Flow::Return(value) => value,
            Flow::Branch(target, _) => {
                panic!("branch to block {} escaped the expression", target.0)
            }
        }
    }

    fn eval_list(&mut self, body: &[WasmExpr]) -> Flow {
        let mut last = None;
        for expr in body {
            match self.eval(expr) {
                Flow::Normal(value) => last = value,
                other => return other,
            }
        }
        Flow::Normal(last)
    }

    fn eval(&mut self, expr: &WasmExpr) -> Flow {
        match expr {
            WasmExpr::Block { id, is_loop, body } => {
                if *is_loop {
                    loop {
                        match self.eval_list(body) {
                            // A branch to the loop re-enters it at the top
                            Flow::Branch(target, _) if target == *id => continue,
                            Flow::Normal(_) => return Flow::Normal(None),
                            other => return other,
                        }
                    }
                } else {
                    match self.eval_list(body) {
                        Flow::Branch(target, value) if target == *id => Flow::Normal(value),
                        other => other,
                    }
                }
            }
            WasmExpr::Branch {
                condition,
                target,
                result,
            } => {
                // The carried value is computed before the condition and
                // discarded when the branch is not taken
                let carried = match result {
                    Some(result) => match self.eval(result) {
                        Flow::Normal(value) => value,
                        other => return other,
                    },
                    None => None,
                };
                let condition = match self.eval(condition) {
                    Flow::Normal(value) => value.expect("branch condition should be a value"),
                    other => return other,
                };
                if condition.as_i32() != 0 {
                    Flow::Branch(*target, carried)
                } else {
                    Flow::Normal(None)
                }
            }
            WasmExpr::Break { target, result } => {
                let carried = match result {
                    Some(result) => match self.eval(result) {
                        Flow::Normal(value) => value,
                        other => return other,
                    },
                    None => None,
                };
                Flow::Branch(*target, carried)
            }
            WasmExpr::Call {
                symbol,
                returns,
                args,
                ..
            } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    match self.eval(arg) {
                        Flow::Normal(value) => {
                            values.push(value.expect("call argument should be a value"))
                        }
                        other => return other,
                    }
                }
                self.call_log.push((symbol.clone(), values));
                let result = self.call_results.get(symbol).copied();
                if returns.is_some() {
                    Flow::Normal(Some(result.unwrap_or(Value::I32(0))))
                } else {
                    Flow::Normal(None)
                }
            }
            WasmExpr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = match self.eval(condition) {
                    Flow::Normal(value) => value.expect("if condition should be a value"),
                    other => return other,
                };
                if condition.as_i32() != 0 {
                    self.eval_list(then_branch)
                } else {
                    self.eval_list(else_branch)
                }
            }
            WasmExpr::I32Const(value) => Flow::Normal(Some(Value::I32(*value))),
            WasmExpr::I64Const(value) => Flow::Normal(Some(Value::I64(*value))),
            WasmExpr::F32Const(value) => Flow::Normal(Some(Value::F32(*value))),
            WasmExpr::F64Const(value) => Flow::Normal(Some(Value::F64(*value))),
            WasmExpr::GetLocal { index, .. } => {
                Flow::Normal(Some(self.locals[*index as usize]))
            }
            WasmExpr::SetLocal { index, value } => {
                let value = match self.eval(value) {
                    Flow::Normal(value) => value.expect("stored value should be a value"),
                    other => return other,
                };
                self.locals[*index as usize] = value;
                Flow::Normal(None)
            }
            WasmExpr::IntBinary {
                width: _,
                op,
                first,
                second,
            } => {
                let first = match self.eval(first) {
                    Flow::Normal(value) => value.expect("operand should be a value"),
                    other => return other,
                };
                let second = match self.eval(second) {
                    Flow::Normal(value) => value.expect("operand should be a value"),
                    other => return other,
                };
                Flow::Normal(Some(apply_int_op(*op, first, second)))
            }
            WasmExpr::FloatBinary {
                width: _,
                op,
                first,
                second,
            } => {
                let first = match self.eval(first) {
                    Flow::Normal(value) => value.expect("operand should be a value"),
                    other => return other,
                };
                let second = match self.eval(second) {
                    Flow::Normal(value) => value.expect("operand should be a value"),
                    other => return other,
                };
                Flow::Normal(Some(apply_float_op(*op, first, second)))
            }
            WasmExpr::Load { access, address } => {
                let address = match self.eval(address) {
                    Flow::Normal(value) => value.expect("address should be a value"),
                    other => return other,
                };
                Flow::Normal(Some(self.load(*access, address.as_i32() as u32 as usize)))
            }
            WasmExpr::Store {
                access,
                address,
                value,
            } => {
                let address = match self.eval(address) {
                    Flow::Normal(value) => value.expect("address should be a value"),
                    other => return other,
                };
                let value = match self.eval(value) {
                    Flow::Normal(value) => value.expect("stored value should be a value"),
                    other => return other,
                };
                self.store(*access, address.as_i32() as u32 as usize, value);
                Flow::Normal(None)
            }
            WasmExpr::Switch {
                selector,
                targets,
                default_target,
            } => {
                let selector = match self.eval(selector) {
                    Flow::Normal(value) => value.expect("selector should be a value").as_i32(),
                    other => return other,
                };
                let target = if selector >= 0 && (selector as usize) < targets.len() {
                    targets[selector as usize]
                } else {
                    *default_target
                };
                Flow::Branch(target, None)
            }
            WasmExpr::Return { value } => {
                let value = match value {
                    Some(value) => match self.eval(value) {
                        Flow::Normal(value) => value,
                        other => return other,
                    },
                    None => None,
                };
                Flow::Return(value)
            }
            WasmExpr::Drop { value } => match self.eval(value) {
                Flow::Normal(_) => Flow::Normal(None),
                other => other,
            },
            WasmExpr::Conversion {
                from: _,
                to,
                signed,
                reinterpret,
                value,
            } => {
                let value = match self.eval(value) {
                    Flow::Normal(value) => value.expect("converted value should be a value"),
                    other => return other,
                };
                Flow::Normal(Some(convert(value, *to, *signed, *reinterpret)))
            }
        }
    }

    fn load(&self, access: MemoryAccess, address: usize) -> Value {
        let m = &self.memory;
        match access {
            MemoryAccess::I8 => Value::I32(m[address] as i8 as i32),
            MemoryAccess::U8 => Value::I32(m[address] as i32),
            MemoryAccess::I16 => {
                Value::I32(i16::from_le_bytes([m[address], m[address + 1]]) as i32)
            }
            MemoryAccess::U16 => {
                Value::I32(u16::from_le_bytes([m[address], m[address + 1]]) as i32)
            }
            MemoryAccess::I32 => Value::I32(i32::from_le_bytes(
                m[address..address + 4].try_into().unwrap(),
            )),
            MemoryAccess::I64 => Value::I64(i64::from_le_bytes(
                m[address..address + 8].try_into().unwrap(),
            )),
            MemoryAccess::F32 => Value::F32(f32::from_le_bytes(
                m[address..address + 4].try_into().unwrap(),
            )),
            MemoryAccess::F64 => Value::F64(f64::from_le_bytes(
                m[address..address + 8].try_into().unwrap(),
            )),
        }
    }

    fn store(&mut self, access: MemoryAccess, address: usize, value: Value) {
        match access {
            MemoryAccess::I8 | MemoryAccess::U8 => {
                self.memory[address] = value.as_i32() as u8;
            }
            MemoryAccess::I16 | MemoryAccess::U16 => {
                let bytes = (value.as_i32() as u16).to_le_bytes();
                self.memory[address..address + 2].copy_from_slice(&bytes);
            }
            MemoryAccess::I32 => {
                self.memory[address..address + 4].copy_from_slice(&value.as_i32().to_le_bytes());
            }
            MemoryAccess::I64 => {
                self.memory[address..address + 8].copy_from_slice(&value.as_i64().to_le_bytes());
            }
            MemoryAccess::F32 => {
                self.memory[address..address + 4].copy_from_slice(&value.as_f32().to_le_bytes());
            }
            MemoryAccess::F64 => {
                self.memory[address..address + 8].copy_from_slice(&value.as_f64().to_le_bytes());
            }
        }
    }
}

fn bool_value(condition: bool) -> Value {
    Value::I32(if condition { 1 } else { 0 })
}

fn apply_int_op(op: IntBinaryOp, first: Value, second: Value) -> Value {
    match (first, second) {
        (Value::I32(a), Value::I32(b)) => apply_i32_op(op, a, b),
        (Value::I64(a), Value::I64(b)) => apply_i64_op(op, a, b),
        (a, b) => panic!("mismatched integer operands: {:?} and {:?}", a, b),
    }
}

fn apply_i32_op(op: IntBinaryOp, a: i32, b: i32) -> Value {
    let ua = a as u32;
    let ub = b as u32;
    match op {
        IntBinaryOp::Add => Value::I32(a.wrapping_add(b)),
        IntBinaryOp::Sub => Value::I32(a.wrapping_sub(b)),
        IntBinaryOp::Mul => Value::I32(a.wrapping_mul(b)),
        IntBinaryOp::DivSigned => Value::I32(a.wrapping_div(b)),
        IntBinaryOp::DivUnsigned => Value::I32((ua / ub) as i32),
        IntBinaryOp::RemSigned => Value::I32(a.wrapping_rem(b)),
        IntBinaryOp::RemUnsigned => Value::I32((ua % ub) as i32),
        IntBinaryOp::And => Value::I32(a & b),
        IntBinaryOp::Or => Value::I32(a | b),
        IntBinaryOp::Xor => Value::I32(a ^ b),
        IntBinaryOp::Shl => Value::I32(a.wrapping_shl(ub)),
        IntBinaryOp::ShrSigned => Value::I32(a.wrapping_shr(ub)),
        IntBinaryOp::ShrUnsigned => Value::I32((ua.wrapping_shr(ub)) as i32),
        IntBinaryOp::Eq => bool_value(a == b),
        IntBinaryOp::Ne => bool_value(a != b),
        IntBinaryOp::LtSigned => bool_value(a < b),
        IntBinaryOp::LtUnsigned => bool_value(ua < ub),
        IntBinaryOp::LeSigned => bool_value(a <= b),
        IntBinaryOp::LeUnsigned => bool_value(ua <= ub),
        IntBinaryOp::GtSigned => bool_value(a > b),
        IntBinaryOp::GtUnsigned => bool_value(ua > ub),
        IntBinaryOp::GeSigned => bool_value(a >= b),
        IntBinaryOp::GeUnsigned => bool_value(ua >= ub),
    }
}

fn apply_i64_op(op: IntBinaryOp, a: i64, b: i64) -> Value {
    let ua = a as u64;
    let ub = b as u64;
    match op {
        IntBinaryOp::Add => Value::I64(a.wrapping_add(b)),
        IntBinaryOp::Sub => Value::I64(a.wrapping_sub(b)),
        IntBinaryOp::Mul => Value::I64(a.wrapping_mul(b)),
        IntBinaryOp::DivSigned => Value::I64(a.wrapping_div(b)),
        IntBinaryOp::DivUnsigned => Value::I64((ua / ub) as i64),
        IntBinaryOp::RemSigned => Value::I64(a.wrapping_rem(b)),
        IntBinaryOp::RemUnsigned => Value::I64((ua % ub) as i64),
        IntBinaryOp::And => Value::I64(a & b),
        IntBinaryOp::Or => Value::I64(a | b),
        IntBinaryOp::Xor => Value::I64(a ^ b),
        IntBinaryOp::Shl => Value::I64(a.wrapping_shl(ub as u32)),
        IntBinaryOp::ShrSigned => Value::I64(a.wrapping_shr(ub as u32)),
        IntBinaryOp::ShrUnsigned => Value::I64(ua.wrapping_shr(ub as u32) as i64),
        IntBinaryOp::Eq => bool_value(a == b),
        IntBinaryOp::Ne => bool_value(a != b),
        IntBinaryOp::LtSigned => bool_value(a < b),
        IntBinaryOp::LtUnsigned => bool_value(ua < ub),
        IntBinaryOp::LeSigned => bool_value(a <= b),
        IntBinaryOp::LeUnsigned => bool_value(ua <= ub),
        IntBinaryOp::GtSigned => bool_value(a > b),
        IntBinaryOp::GtUnsigned => bool_value(ua > ub),
        IntBinaryOp::GeSigned => bool_value(a >= b),
        IntBinaryOp::GeUnsigned => bool_value(ua >= ub),
    }
}

fn apply_float_op(op: FloatBinaryOp, first: Value, second: Value) -> Value {
    match (first, second) {
        (Value::F32(a), Value::F32(b)) => match op {
            FloatBinaryOp::Add => Value::F32(a + b),
            FloatBinaryOp::Sub => Value::F32(a - b),
            FloatBinaryOp::Mul => Value::F32(a * b),
            FloatBinaryOp::Div => Value::F32(a / b),
            FloatBinaryOp::Eq => bool_value(a == b),
            FloatBinaryOp::Ne => bool_value(a != b),
            FloatBinaryOp::Lt => bool_value(a < b),
            FloatBinaryOp::Le => bool_value(a <= b),
            FloatBinaryOp::Gt => bool_value(a > b),
            FloatBinaryOp::Ge => bool_value(a >= b),
        },
        (Value::F64(a), Value::F64(b)) => match op {
            FloatBinaryOp::Add => Value::F64(a + b),
            FloatBinaryOp::Sub => Value::F64(a - b),
            FloatBinaryOp::Mul => Value::F64(a * b),
            FloatBinaryOp::Div => Value::F64(a / b),
            FloatBinaryOp::Eq => bool_value(a == b),
            FloatBinaryOp::Ne => bool_value(a != b),
            FloatBinaryOp::Lt => bool_value(a < b),
            FloatBinaryOp::Le => bool_value(a <= b),
            FloatBinaryOp::Gt => bool_value(a > b),
            FloatBinaryOp::Ge => bool_value(a >= b),
        },
        (a, b) => panic!("mismatched float operands: {:?} and {:?}", a, b),
    }
}

fn convert(value: Value, to: WasmNumType, signed: bool, reinterpret: bool) -> Value {
    if reinterpret {
        return match (value, to) {
            (Value::I32(v), WasmNumType::F32) => Value::F32(f32::from_bits(v as u32)),
            (Value::F32(v), WasmNumType::I32) => Value::I32(v.to_bits() as i32),
            (Value::I64(v), WasmNumType::F64) => Value::F64(f64::from_bits(v as u64)),
            (Value::F64(v), WasmNumType::I64) => Value::I64(v.to_bits() as i64),
            (v, to) => panic!("unsupported reinterpretation of {:?} as {:?}", v, to),
        };
    }
    match (value, to) {
        (Value::I32(v), WasmNumType::I32) => Value::I32(v),
        (Value::I32(v), WasmNumType::I64) => {
            if signed {
                Value::I64(v as i64)
            } else {
                Value::I64(v as u32 as i64)
            }
        }
        (Value::I32(v), WasmNumType::F32) => Value::F32(v as f32),
        (Value::I32(v), WasmNumType::F64) => Value::F64(v as f64),
        (Value::I64(v), WasmNumType::I32) => Value::I32(v as i32),
        (Value::I64(v), WasmNumType::I64) => Value::I64(v),
        (Value::I64(v), WasmNumType::F32) => Value::F32(v as f32),
        (Value::I64(v), WasmNumType::F64) => Value::F64(v as f64),
        (Value::F32(v), WasmNumType::I32) => Value::I32(v as i32),
        (Value::F32(v), WasmNumType::I64) => Value::I64(v as i64),
        (Value::F32(v), WasmNumType::F32) => Value::F32(v),
        (Value::F32(v), WasmNumType::F64) => Value::F64(v as f64),
        (Value::F64(v), WasmNumType::I32) => Value::I32(v as i32),
        (Value::F64(v), WasmNumType::I64) => Value::I64(v as i64),
        (Value::F64(v), WasmNumType::F32) => Value::F32(v as f32),
        (Value::F64(v), WasmNumType::F64) => Value::F64(v),
    }
}
