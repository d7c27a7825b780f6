//! Lowering of function descriptors into register operations
//!
//! `lower_unit` mangles and registers every function first so calls may
//! reference functions defined later in the unit, then lowers each
//! function on its own. Nothing but the read-only `LoweringContext` is
//! shared between functions.

mod expr;
mod function;
mod locals;
mod ops;

pub use function::{Flow, FunctionLowering, LoweringOutput, LoweringState};
pub use locals::{DefinedSet, LocalTable};
pub use ops::{LocalInfo, LoweredFunction, Op, RuntimeArg};

use std::collections::{BTreeMap, HashMap, HashSet};
use log::{debug, info};
use mzc_common::{CompilerError, Diagnostic, ScalarType};
use mzc_ir::{ConstantDecl, FunctionId, Unit};
use crate::mangle::{is_identifier, local_name, string_constant_name, MangledSymbol, Mangler};
use crate::options::CodegenOptions;

/// Call signature of a registered function
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub symbol: MangledSymbol,
    pub params: Vec<ScalarType>,
    pub return_type: Option<ScalarType>,
}

/// Read-only state shared by all function lowerings of a unit
pub struct LoweringContext<'a> {
    pub options: &'a CodegenOptions,
    pub mangler: Mangler,
    pub signatures: HashMap<FunctionId, Signature>,
    pub constants: HashMap<&'a str, &'a ConstantDecl>,
}

/// The function wrapped by the C `main`
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPoint {
    pub symbol: MangledSymbol,
    pub return_type: Option<ScalarType>,
}

/// A fully lowered unit
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredUnit {
    pub name: String,
    pub functions: Vec<LoweredFunction>,
    /// Call-site spellings that need their own prototype
    pub aliases: BTreeMap<MangledSymbol, Signature>,
    pub entry: Option<EntryPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lower every function of `unit`
pub fn lower_unit(unit: &Unit, options: &CodegenOptions) -> Result<LoweredUnit, CompilerError> {
    info!("Lowering unit '{}' with {} functions", unit.name, unit.functions.len());

    let mut mangler = Mangler::new(options)?;
    let mut signatures = HashMap::new();
    for function in &unit.functions {
        for param in &function.params {
            if !is_identifier(&param.name) {
                return Err(CompilerError::InvalidIdentifier { name: param.name.clone() });
            }
        }
        let id = function.id();
        let symbol = mangler.register(&id)?;
        signatures.insert(
            id,
            Signature {
                symbol,
                params: function.param_types(),
                return_type: function.return_type,
            },
        );
    }

    let mut constants = HashMap::new();
    for constant in &unit.constants {
        if constants.insert(constant.name.as_str(), constant).is_some() {
            return Err(CompilerError::InvalidIdentifier {
                name: format!("{} (constant defined twice)", constant.name),
            });
        }
    }

    let ctx = LoweringContext { options, mangler, signatures, constants };

    let mut functions = Vec::with_capacity(unit.functions.len());
    let mut aliases = BTreeMap::new();
    let mut diagnostics = Vec::new();
    for function in &unit.functions {
        if function.is_external {
            let symbol = ctx.mangler.resolve(&function.id())?;
            debug!("Function '{}' is external, declaring {}", function.name, symbol);
            functions.push(LoweredFunction::external(
                &function.name,
                symbol,
                function.params.clone(),
                function.return_type,
            ));
            continue;
        }

        let output = FunctionLowering::new(&ctx, function)?.lower()?;
        for (alias, target) in output.aliases {
            let signature = ctx
                .signatures
                .get(&target)
                .ok_or_else(|| CompilerError::UnknownFunction { name: target.to_string() })?;
            aliases.insert(alias.clone(), Signature { symbol: alias, ..signature.clone() });
        }
        diagnostics.extend(output.diagnostics);
        functions.push(output.function);
    }

    check_name_clashes(&functions)?;
    let entry = find_entry(unit, &ctx)?;

    Ok(LoweredUnit {
        name: unit.name.clone(),
        functions,
        aliases,
        entry,
        diagnostics,
    })
}

/// Locate the start function named by the options, if the unit has one
fn find_entry(unit: &Unit, ctx: &LoweringContext<'_>) -> Result<Option<EntryPoint>, CompilerError> {
    let Some(name) = ctx.options.entry_point.as_deref() else {
        return Ok(None);
    };

    let candidates: Vec<_> = unit.functions_named(name).filter(|f| !f.is_external).collect();
    let function = match candidates.as_slice() {
        [] => {
            debug!("Unit '{}' has no '{}', no entry wrapper", unit.name, name);
            return Ok(None);
        }
        [function] => *function,
        _ => {
            return Err(CompilerError::InvalidEntryPoint {
                message: format!("{} functions are named '{}'", candidates.len(), name),
            });
        }
    };

    if !function.params.is_empty() {
        return Err(CompilerError::InvalidEntryPoint {
            message: format!("'{}' takes {} parameters, expected none", name, function.params.len()),
        });
    }

    let symbol = ctx.mangler.resolve(&function.id())?;
    debug!("Entry point is {}", symbol);
    Ok(Some(EntryPoint { symbol, return_type: function.return_type }))
}

/// Locals and string constants share the C namespace with function symbols
fn check_name_clashes(functions: &[LoweredFunction]) -> Result<(), CompilerError> {
    let symbols: HashSet<&str> = functions.iter().map(|f| f.symbol.as_str()).collect();
    for function in functions {
        let names = function
            .locals
            .iter()
            .map(|local| local_name(&local.name))
            .chain((0..function.strings.len()).map(|i| string_constant_name(&function.symbol, i)));
        for name in names {
            if symbols.contains(name.as_str()) {
                return Err(CompilerError::MangleCollision {
                    first: format!("function {}", name),
                    second: format!("a local or string constant of {}", function.symbol),
                    symbol: name,
                });
            }
        }
    }
    Ok(())
}
