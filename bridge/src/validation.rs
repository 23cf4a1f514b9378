//! Guest module validation — export-table checks at load time.
//!
//! Validates that a compiled module can be driven by the bridge before it
//! is instantiated. Checks:
//!
//! 1. `memory` export present
//! 2. Mandatory function exports present with the expected signatures
//! 3. `init`, if exported, takes and returns nothing
//! 4. No imports (the host environment provides no bindings)
//!
//! Optional prompt getters are not checked here; a guest
//! missing one fails when it is first called.

use wasmtime::{ExternType, FuncType, Module, ValType};

use advent_guestapi::types::{EXPORT_INIT, EXPORT_INPUT_PTR, EXPORT_MEMORY, EXPORT_RUN_COMMAND};

use crate::error::BridgeError;

/// Expected export: (name, param_count_of_i32, result_count_of_i32).
const REQUIRED_EXPORTS: &[(&str, usize, usize)] = &[
    ("get_output_ptr", 0, 1),
    ("get_output_len", 0, 1),
    (EXPORT_INPUT_PTR, 0, 1),
    (EXPORT_RUN_COMMAND, 1, 0),
];

/// Validate that a module exposes the export table the bridge needs.
pub fn validate_module(module: &Module) -> Result<(), BridgeError> {
    validate_exports(module)?;
    validate_imports(module)?;
    Ok(())
}

/// Check that all mandatory exports are present with correct signatures.
fn validate_exports(module: &Module) -> Result<(), BridgeError> {
    let has_memory = module
        .exports()
        .any(|e| e.name() == EXPORT_MEMORY && matches!(e.ty(), ExternType::Memory(_)));
    if !has_memory {
        return Err(BridgeError::ValidationError(format!(
            "module must export '{}'",
            EXPORT_MEMORY
        )));
    }

    for &(name, params, results) in REQUIRED_EXPORTS {
        let func_ty = function_export(module, name)?.ok_or_else(|| {
            BridgeError::ValidationError(format!("missing required export: {}", name))
        })?;
        check_signature(name, &func_ty, params, results)?;
    }

    if let Some(func_ty) = function_export(module, EXPORT_INIT)? {
        check_signature(EXPORT_INIT, &func_ty, 0, 0)?;
    }

    Ok(())
}

/// Look up a function export by name. `Ok(None)` if absent.
fn function_export(module: &Module, name: &str) -> Result<Option<FuncType>, BridgeError> {
    let Some(export) = module.exports().find(|e| e.name() == name) else {
        return Ok(None);
    };
    match export.ty() {
        ExternType::Func(ft) => Ok(Some(ft)),
        _ => Err(BridgeError::ValidationError(format!(
            "export '{}' must be a function",
            name
        ))),
    }
}

/// All params and results in the guest ABI are i32.
fn check_signature(
    name: &str,
    func_ty: &FuncType,
    expected_params: usize,
    expected_results: usize,
) -> Result<(), BridgeError> {
    let params: Vec<ValType> = func_ty.params().collect();
    let results: Vec<ValType> = func_ty.results().collect();

    if params.len() != expected_params || !params.iter().all(is_i32) {
        return Err(BridgeError::ValidationError(format!(
            "export '{}' has wrong param signature: expected {} i32 params, got {} params",
            name,
            expected_params,
            params.len()
        )));
    }

    if results.len() != expected_results || !results.iter().all(is_i32) {
        return Err(BridgeError::ValidationError(format!(
            "export '{}' has wrong result signature: expected {} i32 results, got {} results",
            name,
            expected_results,
            results.len()
        )));
    }

    Ok(())
}

fn is_i32(vt: &ValType) -> bool {
    matches!(vt, ValType::I32)
}

/// The host links no imports; reject any the module declares.
fn validate_imports(module: &Module) -> Result<(), BridgeError> {
    if let Some(import) = module.imports().next() {
        return Err(BridgeError::ValidationError(format!(
            "import not provided by host: {}::{}",
            import.module(),
            import.name()
        )));
    }
    Ok(())
}
