//! Name registries: classifies an identifier as a reserved package, a
//! built-in type, a built-in function (kept as-is or lowered to a runtime
//! call), or user-defined. Static tables live in `lazy_static!`-backed
//! `HashSet`s at module scope, the same pattern used elsewhere in this
//! crate for `#[remain::sorted]` enums and default-value tables.

use lazy_static::lazy_static;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Classification {
    BuiltinType,
    BuiltinFuncKept,
    BuiltinFuncToLower,
    ReservedIdent,
    ReservedPackage,
    SpecialFuncName,
    User,
}

lazy_static! {
    static ref RESERVED_PACKAGES: HashSet<&'static str> = [
        "fmt", "os", "io", "net", "http", "url", "time", "sync", "strings", "bytes", "errors",
        "context", "json", "xml", "base64", "hex", "sql", "testing", "reflect", "unsafe", "math",
        "rand", "big", "sort", "regexp", "unicode", "utf8", "path", "filepath", "flag", "log",
        "slog", "bufio", "scanner", "template", "tar", "zip", "gzip", "zlib", "crypto", "md5",
        "sha1", "sha256", "sha512", "aes", "des", "rsa", "ecdsa", "tls", "x509", "runtime",
        "debug", "pprof", "trace",
    ]
    .into_iter()
    .collect();
    static ref BUILTIN_TYPES: HashSet<&'static str> = [
        "bool", "byte", "complex64", "complex128", "error", "float32", "float64", "int", "int8",
        "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32",
        "uint64", "uintptr", "any", "comparable",
    ]
    .into_iter()
    .collect();
    static ref BUILTIN_FUNCS_KEPT: HashSet<&'static str> = [
        "append", "cap", "close", "complex", "copy", "delete", "imag", "len", "new", "panic",
        "print", "println", "real", "recover", "clear", "max", "min",
    ]
    .into_iter()
    .collect();
    static ref BUILTIN_FUNCS_TO_LOWER: HashSet<&'static str> =
        ["grow", "clone", "free", "dlopen", "dlsym", "dlclose", "dlerror"]
            .into_iter()
            .collect();
    static ref RESERVED_IDENTS: HashSet<&'static str> =
        ["nil", "true", "false", "iota", "_"].into_iter().collect();
    static ref SPECIAL_FUNC_NAMES: HashSet<&'static str> =
        ["init", "main", "Error", "String"].into_iter().collect();
    /// The closed acronym set recognized for translate-name mode.
    pub static ref ACRONYMS: HashSet<&'static str> = [
        "http", "https", "url", "uri", "id", "uuid", "api", "rest", "json", "xml", "html", "css",
        "sql", "tcp", "udp", "ip", "dns", "tls", "ssl", "ssh", "ftp", "smtp", "imap", "pop",
        "rpc", "grpc", "cpu", "gpu", "ram", "io", "os", "ui", "gui", "cli", "ascii", "utf", "utc",
    ]
    .into_iter()
    .collect();
}

/// One registry per identifier class (package/type/function/variable), each
/// a read-only classification table plus a per-file set of user-registered
/// names, to remember user-defined symbols across the current file.
#[derive(Debug, Default)]
pub struct Registry {
    user_defined: HashSet<String>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_user(&mut self, name: impl Into<String>) {
        self.user_defined.insert(name.into());
    }

    #[must_use]
    pub fn is_user_defined(&self, name: &str) -> bool {
        self.user_defined.contains(name)
    }

    #[must_use]
    pub fn classify_package(&self, name: &str) -> Classification {
        if RESERVED_PACKAGES.contains(name) {
            Classification::ReservedPackage
        } else {
            Classification::User
        }
    }

    #[must_use]
    pub fn classify_type(&self, name: &str) -> Classification {
        if BUILTIN_TYPES.contains(name) {
            Classification::BuiltinType
        } else {
            Classification::User
        }
    }

    #[must_use]
    pub fn classify_func(&self, name: &str) -> Classification {
        if BUILTIN_FUNCS_TO_LOWER.contains(name) {
            Classification::BuiltinFuncToLower
        } else if BUILTIN_FUNCS_KEPT.contains(name) {
            Classification::BuiltinFuncKept
        } else if SPECIAL_FUNC_NAMES.contains(name) {
            Classification::SpecialFuncName
        } else {
            Classification::User
        }
    }

    #[must_use]
    pub fn classify_ident(&self, name: &str) -> Classification {
        if RESERVED_IDENTS.contains(name) {
            Classification::ReservedIdent
        } else {
            Classification::User
        }
    }
}

#[must_use]
pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(name)
}

#[must_use]
pub fn is_lowerable_builtin(name: &str) -> bool {
    BUILTIN_FUNCS_TO_LOWER.contains(name)
}

#[must_use]
pub fn is_kept_builtin(name: &str) -> bool {
    BUILTIN_FUNCS_KEPT.contains(name)
}

/// Converts a name between `snake_case` and `PascalCase`/`camelCase` with
/// acronym-aware handling, preserving Go export status (leading-letter
/// case). Disabled by default (`crate::config`); this function is only
/// reached when `translate_names` is turned on.
#[must_use]
pub fn translate_name(name: &str, exported: bool) -> String {
    use heck::{ToPascalCase, ToSnakeCase};
    if name.is_empty() {
        return name.to_string();
    }
    let looks_snake = name.contains('_') && name == name.to_lowercase();
    let mut converted = if looks_snake {
        uppercase_acronym_words(&name.to_pascal_case())
    } else {
        name.to_snake_case()
    };
    if exported {
        let mut chars = converted.chars();
        if let Some(first) = chars.next() {
            converted = first.to_uppercase().collect::<String>() + chars.as_str();
        }
    } else {
        let mut chars = converted.chars();
        if let Some(first) = chars.next() {
            converted = first.to_lowercase().collect::<String>() + chars.as_str();
        }
    }
    converted
}

/// `heck`'s `ToPascalCase` title-cases every word; re-uppercase the ones
/// that are in the closed acronym set (`HttpClient`, not `HTTPClient` →
/// `Http` stays `Http` unless it's a whole recognised acronym word).
fn uppercase_acronym_words(pascal: &str) -> String {
    let mut out = String::new();
    let mut word = String::new();
    let flush = |word: &mut String, out: &mut String| {
        if ACRONYMS.contains(word.to_lowercase().as_str()) {
            out.push_str(&word.to_uppercase());
        } else {
            out.push_str(word);
        }
        word.clear();
    };
    for c in pascal.chars() {
        if c.is_uppercase() && !word.is_empty() {
            flush(&mut word, &mut out);
        }
        word.push(c);
    }
    flush(&mut word, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_builtin_type() {
        let reg = Registry::new();
        assert_eq!(reg.classify_type("string"), Classification::BuiltinType);
        assert_eq!(reg.classify_type("Widget"), Classification::User);
    }

    #[test]
    fn classifies_lowerable_builtin() {
        let reg = Registry::new();
        assert_eq!(reg.classify_func("clone"), Classification::BuiltinFuncToLower);
        assert_eq!(reg.classify_func("append"), Classification::BuiltinFuncKept);
    }

    #[test]
    fn translate_name_preserves_export_status() {
        assert_eq!(translate_name("http_client", true), "HttpClient");
        assert_eq!(translate_name("HTTPClient", false), "httpClient");
    }

    #[test]
    fn user_registration_round_trips() {
        let mut reg = Registry::new();
        reg.register_user("Widget");
        assert!(reg.is_user_defined("Widget"));
        assert!(!reg.is_user_defined("Gadget"));
    }
}
