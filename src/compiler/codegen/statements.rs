//! Statement lowering and control-flow reconstruction.
//!
//! The target format has no goto: a branch either exits an enclosing
//! block or re-enters an enclosing loop. Loops become a wrapper block
//! (the break target) around a loop block (the continue target); switch
//! fallthrough comes purely from block nesting order; breaks and
//! continues resolve through the builder's scope stack.
//!
//! A statement may lower to nothing (`Ok(None)`) - a class-init marker
//! for a class with no initializer is the one real case.

use crate::compiler::ast::ast_nodes::{
    Expr, FieldRef, LabelId, Lvalue, Statement, SwitchClause,
};
use crate::compiler::codegen::context::{Scope, ScopeKind, WasmBuilder};
use crate::compiler::codegen::negation::negate;
use crate::compiler::codegen::types::field_access;
use crate::compiler::compiler_errors::CompileError;
use crate::compiler::wasm::analysis::collect_branch_targets;
use crate::compiler::wasm::wasm_nodes::{BlockId, IntBinaryOp, IntWidth, WasmExpr};
use crate::{return_compiler_error, return_unsupported_error};

/// Largest branch-table span we are willing to materialize. A switch
/// whose case constants are sparser than this should have been lowered to
/// comparisons upstream.
const MAX_SWITCH_TABLE_SIZE: i64 = 1 << 16;

impl<'a> WasmBuilder<'a> {
    pub(crate) fn lower_statement(
        &mut self,
        statement: &Statement,
    ) -> Result<Option<WasmExpr>, CompileError> {
        match statement {
            Statement::Assignment { left, right } => self.lower_assignment(left.as_ref(), right),
            Statement::Sequence(parts) => {
                let id = self.fresh_block();
                let body = self.lower_statement_list(parts)?;
                Ok(Some(WasmExpr::Block {
                    id,
                    is_loop: false,
                    body,
                }))
            }
            Statement::Conditional {
                condition,
                consequent,
                alternative,
            } => {
                let condition = self.lower_expression(condition)?;
                let then_branch = self.lower_statement_list(consequent)?;
                let else_branch = self.lower_statement_list(alternative)?;
                Ok(Some(WasmExpr::Conditional {
                    condition: Box::new(condition),
                    then_branch,
                    else_branch,
                }))
            }
            Statement::Block { label, body } => self.lower_block_statement(*label, body),
            Statement::While {
                label,
                condition,
                body,
            } => self.lower_while(*label, condition.as_ref(), body),
            Statement::Switch {
                label,
                value,
                clauses,
                default_clause,
            } => self.lower_switch(*label, value, clauses, default_clause),
            Statement::Break { label } => {
                let target = self.resolve_break(*label)?;
                Ok(Some(WasmExpr::Break {
                    target,
                    result: None,
                }))
            }
            Statement::Continue { label } => {
                let target = self.resolve_continue(*label)?;
                Ok(Some(WasmExpr::Break {
                    target,
                    result: None,
                }))
            }
            Statement::Return { value } => {
                let value = match value {
                    Some(value) => Some(Box::new(self.lower_expression(value)?)),
                    None => None,
                };
                Ok(Some(WasmExpr::Return { value }))
            }
            Statement::Throw { .. } => {
                return_unsupported_error!("Exception throwing is not lowered by this backend")
            }
            Statement::TryCatch { .. } => {
                return_unsupported_error!("Exception handling is not lowered by this backend")
            }
            Statement::MonitorEnter { .. } | Statement::MonitorExit { .. } => {
                return_unsupported_error!("Monitor statements are not lowered by this backend")
            }
            Statement::InitClass { class_name } => Ok(self.lower_init_class(class_name)),
            Statement::GotoPart { part } => {
                return_unsupported_error!(
                    "Goto fragment {} survived decompilation and cannot be lowered",
                    part
                )
            }
        }
    }

    /// Lowers a statement list into a flat instruction list, skipping
    /// statements that lower to nothing.
    pub(crate) fn lower_statement_list(
        &mut self,
        parts: &[Statement],
    ) -> Result<Vec<WasmExpr>, CompileError> {
        let mut body = Vec::with_capacity(parts.len());
        for part in parts {
            if let Some(lowered) = self.lower_statement(part)? {
                body.push(lowered);
            }
        }
        Ok(body)
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    fn lower_assignment(
        &mut self,
        left: Option<&Lvalue>,
        right: &Expr,
    ) -> Result<Option<WasmExpr>, CompileError> {
        match left {
            None => {
                let value = self.lower_expression(right)?;
                // Only value-producing instructions need a discard
                if value.result_type().is_some() {
                    Ok(Some(WasmExpr::Drop {
                        value: Box::new(value),
                    }))
                } else {
                    Ok(Some(value))
                }
            }
            Some(Lvalue::Local { index }) => {
                let slot = match self.locals.slot_for(*index) {
                    Some((slot, _)) => slot,
                    None => return_compiler_error!(
                        "Assignment to variable index {} outside the method's local frame",
                        index
                    ),
                };
                let value = self.lower_expression(right)?;
                Ok(Some(WasmExpr::SetLocal {
                    index: slot,
                    value: Box::new(value),
                }))
            }
            Some(Lvalue::Field { receiver, field }) => {
                Ok(Some(self.store_field(receiver.as_deref(), field, right)?))
            }
        }
    }

    /// Field stores compute the address first, then the value, keeping
    /// left-to-right source order.
    fn store_field(
        &mut self,
        receiver: Option<&Expr>,
        field: &FieldRef,
        value: &Expr,
    ) -> Result<WasmExpr, CompileError> {
        let address = self.field_address(receiver, field)?;
        let access = field_access(self.env.layout.field_kind(field));
        let value = self.lower_expression(value)?;
        Ok(WasmExpr::Store {
            access,
            address: Box::new(address),
            value: Box::new(value),
        })
    }

    // ========================================================================
    // Blocks and Loops
    // ========================================================================

    fn lower_block_statement(
        &mut self,
        label: Option<LabelId>,
        parts: &[Statement],
    ) -> Result<Option<WasmExpr>, CompileError> {
        let id = self.fresh_block();

        let body = if label.is_some() {
            self.push_scope(Scope {
                label,
                kind: ScopeKind::Block,
                break_target: id,
            });
            let body = self.lower_statement_list(parts);
            self.pop_scope();
            body?
        } else {
            self.lower_statement_list(parts)?
        };

        Ok(Some(WasmExpr::Block {
            id,
            is_loop: false,
            body,
        }))
    }

    /// A while loop is an exit wrapper around a loop block. The condition
    /// (negated) branches out of the wrapper; the body ends with an
    /// unconditional branch back to the loop head so falling off the body
    /// re-tests the condition. If nothing ever branches to the wrapper,
    /// it is structurally redundant and only the loop is emitted.
    fn lower_while(
        &mut self,
        label: Option<LabelId>,
        condition: Option<&Expr>,
        parts: &[Statement],
    ) -> Result<Option<WasmExpr>, CompileError> {
        let wrapper = self.fresh_block();
        let loop_id = self.fresh_block();

        self.push_scope(Scope {
            label,
            kind: ScopeKind::Loop {
                continue_target: loop_id,
            },
            break_target: wrapper,
        });
        let body = self.lower_loop_body(condition, parts, wrapper);
        self.pop_scope();

        let mut body = body?;
        body.push(WasmExpr::Break {
            target: loop_id,
            result: None,
        });

        let loop_block = WasmExpr::Block {
            id: loop_id,
            is_loop: true,
            body,
        };

        if collect_branch_targets(&loop_block).contains(&wrapper) {
            Ok(Some(WasmExpr::Block {
                id: wrapper,
                is_loop: false,
                body: vec![loop_block],
            }))
        } else {
            Ok(Some(loop_block))
        }
    }

    fn lower_loop_body(
        &mut self,
        condition: Option<&Expr>,
        parts: &[Statement],
        wrapper: BlockId,
    ) -> Result<Vec<WasmExpr>, CompileError> {
        let mut body = Vec::with_capacity(parts.len() + 2);

        if let Some(condition) = condition {
            let condition = self.lower_expression(condition)?;
            body.push(WasmExpr::Branch {
                condition: Box::new(negate(condition)),
                target: wrapper,
                result: None,
            });
        }

        for part in parts {
            if let Some(lowered) = self.lower_statement(part)? {
                body.push(lowered);
            }
        }
        Ok(body)
    }

    // ========================================================================
    // Switch
    // ========================================================================

    /// Switch lowering builds a chain of nested blocks:
    ///
    /// ```text
    /// block $default          ;; break target; default body at its tail
    ///   block $case_n
    ///     ...
    ///       block $case_0
    ///         block $dispatch
    ///           br_table ...
    ///         end             ;; clause 0's body starts here
    ///         <clause 0 body>
    ///       end               ;; clause 1's body starts here
    ///     ...
    ///   end                   ;; default body starts here
    ///   <default body>
    /// end
    /// ```
    ///
    /// Exiting a block lands right after it, so the branch table sends
    /// each selector value to the block *before* the clause's body, and a
    /// body without a terminating break falls into the next declared
    /// clause, then into the default body. Source breaks resolve to the
    /// outermost block through the scope stack.
    fn lower_switch(
        &mut self,
        label: Option<LabelId>,
        value: &Expr,
        clauses: &[SwitchClause],
        default_clause: &[Statement],
    ) -> Result<Option<WasmExpr>, CompileError> {
        // Lower the discriminant exactly once
        let selector = self.lower_expression(value)?;

        let dispatch_id = self.fresh_block();
        let case_ids: Vec<BlockId> = clauses.iter().map(|_| self.fresh_block()).collect();
        let outer_id = self.fresh_block();

        self.push_scope(Scope {
            label,
            kind: ScopeKind::Switch,
            break_target: outer_id,
        });
        let lowered = self.lower_switch_bodies(clauses, default_clause);
        self.pop_scope();
        let (clause_bodies, default_body) = lowered?;

        // Each clause is entered by exiting the block built just before
        // it; an unmatched selector exits the innermost chain entirely,
        // landing at the default body.
        let entry_targets: Vec<BlockId> = (0..clauses.len())
            .map(|index| {
                if index == 0 {
                    dispatch_id
                } else {
                    case_ids[index - 1]
                }
            })
            .collect();
        let default_target = match case_ids.last() {
            Some(last) => *last,
            None => dispatch_id,
        };

        let (table, selector) =
            build_switch_table(selector, clauses, &entry_targets, default_target)?;

        let dispatch = WasmExpr::Switch {
            selector: Box::new(selector),
            targets: table,
            default_target,
        };

        let mut chain = WasmExpr::Block {
            id: dispatch_id,
            is_loop: false,
            body: vec![dispatch],
        };
        for (index, clause_body) in clause_bodies.into_iter().enumerate() {
            let mut body = Vec::with_capacity(clause_body.len() + 1);
            body.push(chain);
            body.extend(clause_body);
            chain = WasmExpr::Block {
                id: case_ids[index],
                is_loop: false,
                body,
            };
        }

        let mut outer_body = Vec::with_capacity(default_body.len() + 1);
        outer_body.push(chain);
        outer_body.extend(default_body);
        Ok(Some(WasmExpr::Block {
            id: outer_id,
            is_loop: false,
            body: outer_body,
        }))
    }

    #[allow(clippy::type_complexity)]
    fn lower_switch_bodies(
        &mut self,
        clauses: &[SwitchClause],
        default_clause: &[Statement],
    ) -> Result<(Vec<Vec<WasmExpr>>, Vec<WasmExpr>), CompileError> {
        let mut clause_bodies = Vec::with_capacity(clauses.len());
        for clause in clauses {
            clause_bodies.push(self.lower_statement_list(&clause.body)?);
        }
        let default_body = self.lower_statement_list(default_clause)?;
        Ok((clause_bodies, default_body))
    }

    // ========================================================================
    // Class Initialization
    // ========================================================================

    /// A class-init marker emits one initializer call per access site, and
    /// nothing at all for raw layout structures or classes without an
    /// initializer.
    fn lower_init_class(&mut self, class_name: &str) -> Option<WasmExpr> {
        if self.env.layout.is_raw_layout_structure(class_name) {
            return None;
        }
        if !self.env.layout.has_static_initializer(class_name) {
            return None;
        }
        Some(WasmExpr::Call {
            symbol: self.env.names.initializer_symbol(class_name),
            imported: false,
            returns: None,
            args: Vec::new(),
        })
    }
}

/// Builds the dense branch table over the span of all case constants.
/// The selector is biased by the smallest constant when it is nonzero;
/// slots no constant claims fall to the default target.
fn build_switch_table(
    selector: WasmExpr,
    clauses: &[SwitchClause],
    entry_targets: &[BlockId],
    default_target: BlockId,
) -> Result<(Vec<BlockId>, WasmExpr), CompileError> {
    let constants: Vec<(i32, usize)> = clauses
        .iter()
        .enumerate()
        .flat_map(|(index, clause)| clause.conditions.iter().map(move |c| (*c, index)))
        .collect();

    if constants.is_empty() {
        return Ok((Vec::new(), selector));
    }

    let min = constants.iter().map(|(c, _)| *c).min().unwrap_or(0);
    let max = constants.iter().map(|(c, _)| *c).max().unwrap_or(0);
    let span = i64::from(max) - i64::from(min) + 1;
    if span > MAX_SWITCH_TABLE_SIZE {
        return_compiler_error!(
            "Switch case constants span {} slots; the front end must lower sparse switches",
            span
        );
    }

    let mut table = vec![default_target; span as usize];
    for (constant, clause_index) in constants {
        let slot = (i64::from(constant) - i64::from(min)) as usize;
        table[slot] = entry_targets[clause_index];
    }

    let selector = if min != 0 {
        WasmExpr::IntBinary {
            width: IntWidth::I32,
            op: IntBinaryOp::Sub,
            first: Box::new(selector),
            second: Box::new(WasmExpr::I32Const(min)),
        }
    } else {
        selector
    };

    Ok((table, selector))
}
