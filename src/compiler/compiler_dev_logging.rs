// CODEGEN LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_codegen")]
macro_rules! codegen_log {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_codegen"))]
macro_rules! codegen_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// SETTINGS LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_settings")]
macro_rules! settings_log {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_settings"))]
macro_rules! settings_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}
