use colour::{e_dark_yellow_ln, e_red_ln, e_yellow};
use std::collections::HashMap;

/// An error produced while lowering or encoding a method body.
///
/// Lowering is deterministic, so every error here is reproducible from the
/// same input AST. `Compiler` errors mean the upstream decompiler broke an
/// invariant; `Unsupported` errors mean the method uses a construct this
/// backend deliberately rejects.
#[derive(Debug)]
pub struct CompileError {
    pub msg: String,
    pub error_type: ErrorType,

    // Structured detail for tooling; keys are closed, values free-form
    pub metadata: HashMap<ErrorMetaDataKey, String>,
}

#[derive(Debug, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    CompilationStage,
    PrimarySuggestion,

    ExpectedType,
    FoundType,
    ClassName,
    MethodName,
    FieldName,
    OperationName,
}

#[derive(Debug, Eq, PartialEq)]
pub enum ErrorType {
    /// Internal fault: the source AST violated an invariant the decompiler
    /// is supposed to uphold
    Compiler,
    /// The method uses a construct this backend rejects outright
    Unsupported,
    /// Failure while encoding or validating the lowered instruction tree
    WasmEncoding,
    Config,
    File,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Compiler => "Compiler Bug",
        ErrorType::Unsupported => "Unsupported Construct",
        ErrorType::WasmEncoding => "WASM Encoding",
        ErrorType::Config => "Malformed Config",
        ErrorType::File => "File Error",
    }
}

impl CompileError {
    pub fn new(msg: impl Into<String>, error_type: ErrorType) -> CompileError {
        CompileError {
            msg: msg.into(),
            error_type,
            metadata: HashMap::new(),
        }
    }

    /// Create an internal fault (a decompiler invariant violation, not a
    /// user mistake)
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::Compiler)
    }

    /// Create an error for a construct this backend rejects
    pub fn unsupported_error(msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::Unsupported)
    }

    /// Create an error from the encoding/validation stage
    pub fn encoding_error(msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::WasmEncoding)
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        CompileError::new(msg, ErrorType::Config)
    }

    pub fn file_error(path: &std::path::Path, msg: impl Into<String>) -> Self {
        CompileError::new(
            format!("{}: {}", path.display(), msg.into()),
            ErrorType::File,
        )
    }

    pub fn with_metadata(mut self, key: ErrorMetaDataKey, value: impl Into<String>) -> Self {
        self.metadata.insert(key, value.into());
        self
    }
}

/// Returns a new CompileError for internal lowering faults.
///
/// Usage:
/// `return_compiler_error!("Unknown variable index {}", index)`;
/// `return_compiler_error!("message", { MethodName => name })`;
#[macro_export]
macro_rules! return_compiler_error {
    ($fmt:expr, $($arg:expr),+ ; { $( $key:ident => $value:expr ),* $(,)? }) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: format!($fmt, $($arg),+),
            error_type: $crate::compiler::compiler_errors::ErrorType::Compiler,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler::compiler_errors::ErrorMetaDataKey::$key, String::from($value)); )*
                map
            },
        });
    }};
    ($fmt:expr, $($arg:expr),+ $(,)?) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: format!($fmt, $($arg),+),
            error_type: $crate::compiler::compiler_errors::ErrorType::Compiler,
            metadata: std::collections::HashMap::new(),
        });
    }};
    ($msg:expr) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            error_type: $crate::compiler::compiler_errors::ErrorType::Compiler,
            metadata: std::collections::HashMap::new(),
        });
    }};
}

/// Returns a new CompileError for constructs the backend rejects.
///
/// Usage: `return_unsupported_error!("Virtual dispatch is not lowered", { MethodName => name })`;
#[macro_export]
macro_rules! return_unsupported_error {
    ($fmt:expr, $($arg:expr),+ ; { $( $key:ident => $value:expr ),* $(,)? }) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: format!($fmt, $($arg),+),
            error_type: $crate::compiler::compiler_errors::ErrorType::Unsupported,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler::compiler_errors::ErrorMetaDataKey::$key, String::from($value)); )*
                map
            },
        });
    }};
    ($fmt:expr, $($arg:expr),+ $(,)?) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: format!($fmt, $($arg),+),
            error_type: $crate::compiler::compiler_errors::ErrorType::Unsupported,
            metadata: std::collections::HashMap::new(),
        });
    }};
    ($msg:expr ; { $( $key:ident => $value:expr ),* $(,)? }) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            error_type: $crate::compiler::compiler_errors::ErrorType::Unsupported,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler::compiler_errors::ErrorMetaDataKey::$key, String::from($value)); )*
                map
            },
        });
    }};
    ($msg:expr) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            error_type: $crate::compiler::compiler_errors::ErrorType::Unsupported,
            metadata: std::collections::HashMap::new(),
        });
    }};
}

/// Returns a new CompileError from the encoding/validation stage.
#[macro_export]
macro_rules! return_encoding_error {
    ($fmt:expr, $($arg:expr),+ $(,)?) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: format!($fmt, $($arg),+),
            error_type: $crate::compiler::compiler_errors::ErrorType::WasmEncoding,
            metadata: std::collections::HashMap::new(),
        });
    }};
    ($msg:expr) => {{
        return Err($crate::compiler::compiler_errors::CompileError {
            msg: $msg.into(),
            error_type: $crate::compiler::compiler_errors::ErrorType::WasmEncoding,
            metadata: std::collections::HashMap::new(),
        });
    }};
}

/// Prints a batch of errors to stderr with colour formatting
pub fn print_errors(errors: &[CompileError]) {
    for error in errors {
        print_formatted_error(error);
    }
    if errors.len() > 1 {
        e_red_ln!("{} errors", errors.len());
    }
}

pub fn print_formatted_error(error: &CompileError) {
    e_red_ln!("[{}]", error_type_to_str(&error.error_type));
    e_dark_yellow_ln!("{}", error.msg);
    for (key, value) in &error.metadata {
        e_yellow!("  {:?}: ", key);
        eprintln!("{}", value);
    }
}
