//! Name mangling
//!
//! Turns a function identity into a C-linkable symbol:
//!
//! ```text
//! sanitize(path) "_" sanitize(module) "_" name { delimiter type }
//! ```
//!
//! `/Users/alice/dev/zvdb-minz` + `simple_add` + `add_numbers(u8, u8)`
//! becomes `_Users_alice_dev_zvdb_minz_simple_add_add_numbers$u8$u8`.
//! An empty path drops its component entirely. The same identity always
//! produces the same symbol, and the `Mangler` registry rejects two
//! distinct identities that would share one.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use log::{debug, trace};
use mzc_common::{CompilerError, ScalarType};
use mzc_ir::FunctionId;
use crate::emit::c_expr::shift_macro;
use crate::options::{CodegenOptions, ManglingMode};
use crate::runtime::RuntimeFn;

/// A symbol ready to be written into C
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MangledSymbol(String);

impl MangledSymbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MangledSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether `name` is a plain C identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Characters legacy mode keeps verbatim in path and module components
pub const LEGACY_VERBATIM: &[char] = &['-', '.'];

/// Sanitise one path or module component.
///
/// Path separators always become `_`. In canonical mode every other
/// character outside `[A-Za-z0-9_]` does too, and a leading digit gets a
/// `_` prefix. Legacy mode keeps the `LEGACY_VERBATIM` characters and
/// replaces the rest.
pub fn sanitize(component: &str, mode: ManglingMode) -> String {
    let mut out = String::with_capacity(component.len() + 1);
    for c in component.chars() {
        let mapped = match c {
            c if c.is_ascii_alphanumeric() || c == '_' => c,
            c if mode == ManglingMode::Legacy && LEGACY_VERBATIM.contains(&c) => c,
            _ => '_',
        };
        out.push(mapped);
    }
    if mode == ManglingMode::Canonical && out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Whether a raw symbol only uses identifier characters and the delimiter
pub fn is_sanitized(symbol: &str, delimiter: char) -> bool {
    spelled_with(symbol, |c| c.is_ascii_alphanumeric() || c == '_' || c == delimiter)
}

/// Whether a raw symbol could come out of legacy mangling
fn is_legacy_spelling(symbol: &str, delimiter: char) -> bool {
    spelled_with(symbol, |c| {
        c.is_ascii_alphanumeric() || c == '_' || c == delimiter || LEGACY_VERBATIM.contains(&c)
    })
}

fn spelled_with(symbol: &str, allowed: impl Fn(char) -> bool) -> bool {
    match symbol.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    symbol.chars().all(allowed)
}

/// C name of a local or parameter
pub fn local_name(name: &str) -> String {
    format!("v_{name}")
}

/// C name of the `index`-th string constant of a function
pub fn string_constant_name(symbol: &MangledSymbol, index: usize) -> String {
    format!("{}_str{}", symbol.as_str(), index)
}

/// Names `<stdio.h>` may declare or define as macros
const STDIO_NAMES: &[&str] = &[
    "FILE", "fpos_t", "size_t", "NULL", "EOF", "BUFSIZ", "FILENAME_MAX", "FOPEN_MAX",
    "L_tmpnam", "TMP_MAX", "SEEK_SET", "SEEK_CUR", "SEEK_END", "_IOFBF", "_IOLBF", "_IONBF",
    "stdin", "stdout", "stderr", "clearerr", "fclose", "feof", "ferror", "fflush", "fgetc",
    "fgetpos", "fgets", "fopen", "fprintf", "fputc", "fputs", "fread", "freopen", "fscanf",
    "fseek", "fsetpos", "ftell", "fwrite", "getc", "getchar", "gets", "perror", "printf",
    "putc", "putchar", "puts", "remove", "rename", "rewind", "scanf", "setbuf", "setvbuf",
    "snprintf", "sprintf", "sscanf", "tmpfile", "tmpnam", "ungetc", "vfprintf", "vfscanf",
    "vprintf", "vscanf", "vsnprintf", "vsprintf", "vsscanf",
];

/// Typedef and limit macro names of `<stdint.h>`
fn is_stdint_name(symbol: &str) -> bool {
    let unsigned = symbol.strip_prefix('u').unwrap_or(symbol);
    if unsigned.starts_with("int") && symbol.ends_with("_t") {
        return true;
    }
    const MACRO_PREFIXES: &[&str] = &["INT", "UINT", "SIZE", "PTRDIFF", "WCHAR", "WINT", "SIG_ATOMIC"];
    MACRO_PREFIXES.iter().any(|prefix| symbol.starts_with(prefix))
        && ["_MAX", "_MIN", "_C"].iter().any(|suffix| symbol.ends_with(suffix))
}

/// File-scope names the generated file already uses: the preamble's
/// typedefs and macros, the included headers, the runtime helpers and the
/// entry wrapper
pub fn is_reserved_symbol(symbol: &str) -> bool {
    symbol == "main"
        || symbol == "String"
        || STDIO_NAMES.contains(&symbol)
        || is_stdint_name(symbol)
        || ScalarType::ALL.iter().any(|ty| ty.c_alias() == symbol)
        || ScalarType::ALL
            .iter()
            .filter(|ty| ty.is_fixed_point())
            .any(|ty| shift_macro(*ty) == symbol)
        || RuntimeFn::all().iter().any(|f| f.name() == symbol)
}

/// Key under which two spellings of the same symbol compare equal
fn canonical_key(symbol: &str, delimiter: char) -> String {
    symbol
        .chars()
        .map(|c| if LEGACY_VERBATIM.contains(&c) && c != delimiter { '_' } else { c })
        .collect()
}

/// A call target after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCallee {
    /// Symbol written at the call site
    pub symbol: MangledSymbol,
    /// The function the call reaches
    pub target: FunctionId,
    /// The call site spells the symbol differently from the definition
    pub is_alias: bool,
}

/// Mangler with a per-unit registry of defined symbols
#[derive(Debug)]
pub struct Mangler {
    mode: ManglingMode,
    delimiter: char,
    /// Symbol to identity, ordered for deterministic iteration
    registry: BTreeMap<MangledSymbol, FunctionId>,
    /// Identity to symbol, lookup only
    by_id: HashMap<FunctionId, MangledSymbol>,
}

impl Mangler {
    pub fn new(options: &CodegenOptions) -> Result<Self, CompilerError> {
        options.validate()?;
        Ok(Self {
            mode: options.mangling,
            delimiter: options.param_delimiter,
            registry: BTreeMap::new(),
            by_id: HashMap::new(),
        })
    }

    /// Mangle without touching the registry
    pub fn mangle(&self, id: &FunctionId) -> Result<MangledSymbol, CompilerError> {
        if id.module.is_empty() {
            return Err(CompilerError::InvalidIdentifier { name: format!("{id} (empty module name)") });
        }
        if !is_identifier(&id.name) {
            return Err(CompilerError::InvalidIdentifier { name: id.name.clone() });
        }

        let mut symbol = String::new();
        if !id.path.is_empty() {
            symbol.push_str(&sanitize(&id.path, self.mode));
            symbol.push('_');
        }
        symbol.push_str(&sanitize(&id.module, self.mode));
        symbol.push('_');
        symbol.push_str(&id.name);
        for ty in &id.param_types {
            symbol.push(self.delimiter);
            symbol.push_str(ty.mangle_name());
        }

        trace!("Mangled {} -> {}", id, symbol);
        Ok(MangledSymbol(symbol))
    }

    /// Mangle and record a defined function
    pub fn register(&mut self, id: &FunctionId) -> Result<MangledSymbol, CompilerError> {
        let symbol = self.mangle(id)?;
        if is_reserved_symbol(symbol.as_str()) {
            return Err(CompilerError::MangleCollision {
                symbol: symbol.to_string(),
                first: "the C runtime".to_string(),
                second: id.to_string(),
            });
        }
        if let Some(existing) = self.registry.get(&symbol) {
            return Err(CompilerError::MangleCollision {
                symbol: symbol.to_string(),
                first: existing.to_string(),
                second: id.to_string(),
            });
        }
        debug!("Registered {} as {}", id, symbol);
        self.registry.insert(symbol.clone(), id.clone());
        self.by_id.insert(id.clone(), symbol.clone());
        Ok(symbol)
    }

    /// Symbol of a registered function
    pub fn resolve(&self, id: &FunctionId) -> Result<MangledSymbol, CompilerError> {
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| CompilerError::UnknownFunction { name: id.to_string() })
    }

    /// Resolve a symbol the front end mangled itself.
    ///
    /// Canonical mode requires the symbol to be sanitised and registered.
    /// Legacy mode passes the spelling through verbatim as long as it only
    /// uses `LEGACY_VERBATIM` characters beyond a sanitised symbol and
    /// names a registered function once both spellings are sanitised, so a
    /// call site may spell the path differently from the definition.
    pub fn resolve_symbol(&self, raw: &str) -> Result<ResolvedCallee, CompilerError> {
        if let Some(target) = self.registry.get(&MangledSymbol(raw.to_string())) {
            return Ok(ResolvedCallee {
                symbol: MangledSymbol(raw.to_string()),
                target: target.clone(),
                is_alias: false,
            });
        }

        match self.mode {
            ManglingMode::Canonical => {
                if !is_sanitized(raw, self.delimiter) {
                    return Err(CompilerError::UnsanitizedSymbol { symbol: raw.to_string() });
                }
                Err(CompilerError::UnknownFunction { name: raw.to_string() })
            }
            ManglingMode::Legacy => {
                if !is_legacy_spelling(raw, self.delimiter) {
                    return Err(CompilerError::UnsanitizedSymbol { symbol: raw.to_string() });
                }
                let key = canonical_key(raw, self.delimiter);
                let target = self
                    .registry
                    .iter()
                    .find(|(symbol, _)| canonical_key(symbol.as_str(), self.delimiter) == key)
                    .map(|(_, id)| id.clone())
                    .ok_or_else(|| CompilerError::UnknownFunction { name: raw.to_string() })?;
                debug!("Legacy call site spelling {} resolves to {}", raw, target);
                Ok(ResolvedCallee {
                    symbol: MangledSymbol(raw.to_string()),
                    target,
                    is_alias: true,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
