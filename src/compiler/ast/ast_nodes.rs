//! Source AST node definitions.
//!
//! These mirror what the decompiler produces: a typed, structured,
//! imperative tree per method body. Control flow is already structured
//! (loops, labeled blocks, switch with fallthrough); there are no
//! arbitrary gotos except the `GotoPart` fragments the decompiler emits
//! when it gives up, which this backend rejects.

/// Identity of a labeled statement within one method body.
///
/// Labels are compared by id, never by their source text: the front end
/// may reuse the same textual label on sibling subtrees, so it assigns a
/// fresh `LabelId` to every labeled statement it emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub u32);

/// The numeric type attached to arithmetic expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    Int,
    Long,
    Float,
    Double,
}

/// The kind of a field, parameter or return value.
///
/// Unlike [`NumericType`] this includes the sub-word primitives and
/// references, because memory access width depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Reference,
}

/// A reference to a field of a structured heap type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub class_name: String,
    pub name: String,
}

impl FieldRef {
    pub fn new(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        FieldRef {
            class_name: class_name.into(),
            name: name.into(),
        }
    }
}

/// A reference to a method by logical signature.
///
/// `params` lists the declared parameter kinds only; for instance
/// invocations the receiver travels as the first element of the
/// argument expression list, not as a declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRef {
    pub class_name: String,
    pub name: String,
    pub params: Vec<ValueKind>,
    pub returns: Option<ValueKind>,
}

impl MethodRef {
    pub fn new(
        class_name: impl Into<String>,
        name: impl Into<String>,
        params: Vec<ValueKind>,
        returns: Option<ValueKind>,
    ) -> Self {
        MethodRef {
            class_name: class_name.into(),
            name: name.into(),
            params,
            returns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    Equals,
    NotEquals,
    Greater,
    GreaterOrEquals,
    Less,
    LessOrEquals,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    /// Three-way ordering compare producing -1/0/1
    Compare,
    /// Short-circuit logical and
    And,
    /// Short-circuit logical or
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Truncate an int to 8 bits and sign-extend it back
    IntToByte,
    /// Truncate an int to 16 bits and sign-extend it back
    IntToShort,
    /// Truncate an int to 16 bits and zero-extend it back
    IntToChar,
    /// Logical not over a 0/1-valued operand
    Not,
    /// Arithmetic negation
    Negate,
    /// Runtime null check; the checked value passes through
    NullCheck,
    /// Array length (array operations are rejected by this backend)
    ArrayLength,
}

/// A literal constant.
///
/// `Null` is the null reference. `String` exists because the front end can
/// produce string literals; this backend has no representation for them
/// and fails the method.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    Static,
    /// Non-virtual instance call (constructors, private and super calls)
    Special,
    Virtual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Binary operation. `ty` is the declared result type; when the front
    /// end omits it the operation is 32-bit integer.
    Binary {
        op: BinaryOp,
        ty: Option<NumericType>,
        first: Box<Expr>,
        second: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        ty: Option<NumericType>,
        operand: Box<Expr>,
    },

    Constant(ConstantValue),

    /// Reference to a local variable by flat index into the method frame
    Variable { index: usize },

    /// Field read. A missing receiver means a static field; its address is
    /// the field offset from the class layout provider.
    Field {
        receiver: Option<Box<Expr>>,
        field: FieldRef,
    },

    /// Ternary conditional
    Conditional {
        condition: Box<Expr>,
        consequent: Box<Expr>,
        alternative: Box<Expr>,
    },

    /// Array element read (rejected)
    Subscript { array: Box<Expr>, index: Box<Expr> },

    /// Method invocation. For instance invocations the receiver is the
    /// first element of `args`.
    Invocation {
        kind: InvocationKind,
        method: MethodRef,
        args: Vec<Expr>,
    },

    /// Object construction
    New { class_name: String },

    /// Array construction (rejected)
    NewArray {
        item_kind: ValueKind,
        length: Box<Expr>,
    },

    /// Multi-dimensional array construction (rejected)
    NewMultiArray {
        item_kind: ValueKind,
        dimensions: Vec<Expr>,
    },

    /// Reference cast; value-preserving at this level
    Cast {
        target_class: String,
        value: Box<Expr>,
    },

    /// Numeric widening/narrowing cast
    PrimitiveCast {
        source: NumericType,
        target: NumericType,
        value: Box<Expr>,
    },

    /// Instance-of test (rejected)
    InstanceOf {
        value: Box<Expr>,
        class_name: String,
    },

    /// Unwrap an array object to its backing data; value-preserving here
    UnwrapArray { array: Box<Expr> },
}

/// An assignment destination.
///
/// A closed enum: the front end can only assign to locals and fields, so
/// "unsupported lvalue" is unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum Lvalue {
    Local { index: usize },
    Field {
        receiver: Option<Box<Expr>>,
        field: FieldRef,
    },
}

/// One `case` group of a switch statement: the constants that select it
/// and its body. Bodies without a trailing break fall through to the next
/// declared clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchClause {
    pub conditions: Vec<i32>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Evaluate `right` and store it in `left`; with no destination the
    /// value is evaluated for its side effects and discarded
    Assignment {
        left: Option<Lvalue>,
        right: Expr,
    },

    /// Sequential group of statements
    Sequence(Vec<Statement>),

    /// If/else
    Conditional {
        condition: Expr,
        consequent: Vec<Statement>,
        alternative: Vec<Statement>,
    },

    /// Plain block; a label makes it a break target
    Block {
        label: Option<LabelId>,
        body: Vec<Statement>,
    },

    /// While loop; no condition means an unconditional loop
    While {
        label: Option<LabelId>,
        condition: Option<Expr>,
        body: Vec<Statement>,
    },

    Switch {
        label: Option<LabelId>,
        value: Expr,
        clauses: Vec<SwitchClause>,
        default_clause: Vec<Statement>,
    },

    /// Break out of a labeled statement, or of the innermost loop when no
    /// label is given
    Break { label: Option<LabelId> },

    /// Continue a labeled loop, or the innermost loop when no label is
    /// given
    Continue { label: Option<LabelId> },

    Return { value: Option<Expr> },

    /// Throw an exception (rejected)
    Throw { exception: Expr },

    /// Try/catch (rejected)
    TryCatch {
        protected: Vec<Statement>,
        exception_class: Option<String>,
        exception_variable: Option<usize>,
        handler: Vec<Statement>,
    },

    /// Monitor enter/exit (rejected)
    MonitorEnter { object: Expr },
    MonitorExit { object: Expr },

    /// Run the static initializer of a class if it has one
    InitClass { class_name: String },

    /// Decompiler goto fragment (rejected)
    GotoPart { part: u32 },
}
