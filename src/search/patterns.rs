//! Static pattern data for keyword extraction and error classification.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use regex::Regex;
use std::sync::LazyLock;

/// Error-signature patterns, applied per line in this order.
///
/// Each pattern has exactly one capture group; group 1 is the keyword.
pub static ERROR_SIGNATURES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Exception class names
        Regex::new(r"([A-Z][a-zA-Z0-9_]+Error)").expect("static regex: error class"),
        // File operation error codes
        Regex::new(r"(ENOENT|EACCES|EPERM|EEXIST)").expect("static regex: errno codes"),
        // Module resolution
        Regex::new(r"(Cannot find module|Module not found)").expect("static regex: module"),
        // Connection and timeout
        Regex::new(r"(Connection refused|ECONNREFUSED|timeout)").expect("static regex: connection"),
        // Call on a non-function
        Regex::new(r"(undefined is not a function|is not a function)")
            .expect("static regex: not a function"),
        // ORM and database errors
        Regex::new(r"(DatabaseError|MongoError|SequelizeError)").expect("static regex: database"),
        // Property access
        Regex::new(r"(Cannot read property|Cannot access|is undefined)")
            .expect("static regex: property access"),
        // Source and markup file paths after at/from/in
        Regex::new(r"(?:at |from |in )([^()\n:]+\.(?:js|ts|jsx|tsx|vue|html|css|scss|json))")
            .expect("static regex: file path"),
    ]
});

/// Punctuation stripped from the end of generic tokens.
pub const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// An error classification signature.
#[derive(Debug)]
pub struct ErrorTypeSignature {
    /// Case-insensitive pattern.
    pub pattern: Regex,
    /// Label assigned when the pattern matches.
    pub error_type: &'static str,
}

/// Label used when no classification signature matches.
pub const UNKNOWN_ERROR_TYPE: &str = "Unknown Error";

/// Classification signatures, checked in order; the first match wins.
pub static ERROR_TYPE_SIGNATURES: LazyLock<Vec<ErrorTypeSignature>> = LazyLock::new(|| {
    vec![
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(TypeError|ReferenceError|SyntaxError|RangeError)")
                .expect("static regex: syntax error"),
            error_type: "Syntax Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(ENOENT|EACCES|EPERM|EEXIST)")
                .expect("static regex: filesystem error"),
            error_type: "File System Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(Cannot find module|Module not found)")
                .expect("static regex: module error"),
            error_type: "Module Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(Connection refused|ECONNREFUSED|timeout|ETIMEDOUT)")
                .expect("static regex: connection error"),
            error_type: "Connection Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(Uncaught|unhandled)")
                .expect("static regex: unhandled exception"),
            error_type: "Unhandled Exception",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(undefined is not a function|is not a function)")
                .expect("static regex: type error"),
            error_type: "Type Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(
                r"(?i)(DatabaseError|MongoError|SequelizeError|PrismaClientKnownRequestError)",
            )
            .expect("static regex: database error"),
            error_type: "Database Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(AUTH_|Authorization|Authentication|token|jwt)")
                .expect("static regex: auth error"),
            error_type: "Authentication Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(Cannot read property|Cannot access|is undefined)")
                .expect("static regex: property access error"),
            error_type: "Property Access Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(Component|React|Vue|Angular|DOM)")
                .expect("static regex: ui component error"),
            error_type: "UI Component Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(404|500|403|401|422|400)").expect("static regex: http error"),
            error_type: "HTTP Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(npm ERR|yarn error|package\.json)")
                .expect("static regex: package error"),
            error_type: "Package Management Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(webpack|babel|rollup|vite|esbuild)")
                .expect("static regex: build error"),
            error_type: "Build Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(test|expect|assert|describe|it\(|test\()")
                .expect("static regex: test error"),
            error_type: "Test Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(memory leak|Out of memory|heap)")
                .expect("static regex: memory error"),
            error_type: "Memory Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(TypeScript|TS|type annotations|interface)")
                .expect("static regex: type definition error"),
            error_type: "Type Definition Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(lint|eslint|tslint|prettier)")
                .expect("static regex: lint error"),
            error_type: "Lint Error",
        },
        ErrorTypeSignature {
            pattern: Regex::new(r"(?i)(environment variable|env|process\.env|Environment)")
                .expect("static regex: environment error"),
            error_type: "Environment Variable Error",
        },
    ]
});
