//! Lowering context and collaborator interfaces.
//!
//! The two traits here are the seams to the rest of the compiler: class
//! layout (field offsets, class tags, initializer knowledge) and name
//! resolution (symbol mangling, import detection, runtime helper
//! symbols). Both must be `Sync` because the driver lowers method bodies
//! in parallel.
//!
//! Break and continue resolution uses an explicit lexical scope stack on
//! the builder rather than shared maps: a scope is pushed when lowering
//! enters a labeled block, loop or switch and popped when it leaves, so
//! label bindings can never leak across sibling subtrees even when the
//! front end reuses label text.

use crate::compiler::ast::ast_nodes::{FieldRef, LabelId, MethodRef, NumericType, ValueKind};
use crate::compiler::compiler_errors::CompileError;
use crate::compiler::wasm::wasm_nodes::{BlockId, WasmNumType};
use crate::return_compiler_error;
use crate::settings::BackendSettings;

/// Class layout provider.
///
/// Must be total over every class and field reachable from the ASTs being
/// lowered; layout is computed before lowering starts.
pub trait ClassLayout: Sync {
    /// Byte offset of a field within its class (or within the static
    /// area for static fields)
    fn field_offset(&self, field: &FieldRef) -> u32;

    /// Declared kind of a field, which decides access width
    fn field_kind(&self, field: &FieldRef) -> ValueKind;

    /// Numeric identity of a class, passed to the allocator
    fn class_tag(&self, class_name: &str) -> i32;

    /// Whether the class declares static initialization code
    fn has_static_initializer(&self, class_name: &str) -> bool;

    /// Whether the class is a raw memory-layout structure (no object
    /// header, no initializer, never allocated through the GC)
    fn is_raw_layout_structure(&self, class_name: &str) -> bool;
}

/// Name resolution collaborator.
pub trait NameResolution: Sync {
    /// Target-callable symbol for a method
    fn mangle_method(&self, method: &MethodRef) -> String;

    /// Whether the method resolves to a host-provided import
    fn is_imported(&self, method: &MethodRef) -> bool;

    /// Symbol of a class's static initializer
    fn initializer_symbol(&self, class_name: &str) -> String;

    /// Symbol of the allocation routine used for object construction
    fn allocation_symbol(&self) -> String;

    /// Runtime helper for float/double remainder
    fn remainder_helper(&self, ty: NumericType) -> String;

    /// Runtime helper for three-way ordering compare
    fn compare_helper(&self, ty: NumericType) -> String;
}

/// Everything the lowering needs besides the method body itself.
pub struct CodegenEnv<'a> {
    pub layout: &'a dyn ClassLayout,
    pub names: &'a dyn NameResolution,
    pub settings: &'a BackendSettings,
}

/// The local variable frame of one method.
///
/// Source variable indices are flat across the whole frame; the lowered
/// function only sees the slots from `first_index` up, so slot = source
/// index - `first_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionLocals {
    pub first_index: usize,
    pub types: Vec<WasmNumType>,
}

impl FunctionLocals {
    pub fn new(first_index: usize, types: Vec<WasmNumType>) -> Self {
        FunctionLocals { first_index, types }
    }

    /// Resolves a source variable index to a local slot and its type.
    pub fn slot_for(&self, index: usize) -> Option<(u32, WasmNumType)> {
        let slot = index.checked_sub(self.first_index)?;
        let ty = *self.types.get(slot)?;
        Some((slot as u32, ty))
    }
}

/// What kind of statement a scope belongs to. Only loops can be implicit
/// break/continue targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    Loop { continue_target: BlockId },
    Block,
    Switch,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope {
    pub label: Option<LabelId>,
    pub kind: ScopeKind,
    pub break_target: BlockId,
}

/// Per-method lowering state. Created fresh for every method body and
/// discarded when it returns.
pub struct WasmBuilder<'a> {
    pub(crate) env: &'a CodegenEnv<'a>,
    pub(crate) locals: &'a FunctionLocals,
    scopes: Vec<Scope>,
    next_block: u32,
}

impl<'a> WasmBuilder<'a> {
    pub fn new(env: &'a CodegenEnv<'a>, locals: &'a FunctionLocals) -> Self {
        WasmBuilder {
            env,
            locals,
            scopes: Vec::new(),
            next_block: 0,
        }
    }

    /// Allocates a fresh block id.
    pub(crate) fn fresh_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        id
    }

    pub(crate) fn push_scope(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Resolves the target of a break: the labeled scope when a label is
    /// given, otherwise the innermost loop.
    pub(crate) fn resolve_break(&self, label: Option<LabelId>) -> Result<BlockId, CompileError> {
        match label {
            Some(label) => match self.find_labeled(label) {
                Some(scope) => Ok(scope.break_target),
                None => {
                    return_compiler_error!("Break targets label {} which is not in scope", label.0)
                }
            },
            None => match self.innermost_loop() {
                Some(scope) => Ok(scope.break_target),
                None => return_compiler_error!("Break outside of any loop"),
            },
        }
    }

    /// Resolves the target of a continue; the named statement must be a
    /// loop.
    pub(crate) fn resolve_continue(&self, label: Option<LabelId>) -> Result<BlockId, CompileError> {
        let scope = match label {
            Some(label) => match self.find_labeled(label) {
                Some(scope) => scope,
                None => {
                    return_compiler_error!(
                        "Continue targets label {} which is not in scope",
                        label.0
                    )
                }
            },
            None => match self.innermost_loop() {
                Some(scope) => scope,
                None => return_compiler_error!("Continue outside of any loop"),
            },
        };
        match scope.kind {
            ScopeKind::Loop { continue_target } => Ok(continue_target),
            _ => return_compiler_error!("Continue targets a statement that is not a loop"),
        }
    }

    fn find_labeled(&self, label: LabelId) -> Option<&Scope> {
        self.scopes
            .iter()
            .rev()
            .find(|scope| scope.label == Some(label))
    }

    fn innermost_loop(&self) -> Option<&Scope> {
        self.scopes
            .iter()
            .rev()
            .find(|scope| matches!(scope.kind, ScopeKind::Loop { .. }))
    }

    /// True once every scope pushed during lowering has been popped again.
    pub(crate) fn scopes_balanced(&self) -> bool {
        self.scopes.is_empty()
    }
}
