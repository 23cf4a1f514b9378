//! Guest adapter — wasmtime engine, module loading, and typed export calls.
//!
//! `WasmGuest` compiles and validates a guest module, instantiates it with
//! an empty import set, and exposes its export table through
//! [`GuestExports`]. Mandatory exports are resolved once at load; optional
//! prompt getters are resolved on every call, so a guest lacking one only
//! fails when the host actually needs it.

use std::path::Path;

use tracing::{debug, info};
use wasmtime::{
    Config, Engine, Instance, Linker, Memory, Module, Store, StoreLimits, StoreLimitsBuilder,
    Trap, TypedFunc, WasmParams, WasmResults,
};

use advent_guestapi::types::{EXPORT_INIT, EXPORT_INPUT_PTR, EXPORT_MEMORY, EXPORT_RUN_COMMAND};
use advent_guestapi::{GuestError, GuestExports, GuestMemory, Slot};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::validation::validate_module;

/// Bytes per linear-memory page.
const WASM_PAGE_SIZE: usize = 65_536;

/// Per-instance data held in the wasmtime `Store`.
pub struct GuestState {
    limits: StoreLimits,
}

/// A loaded, instantiated guest module.
///
/// Owns the store, so only one call into the guest can be in progress at
/// a time and memory views are always borrowed from the live instance.
pub struct WasmGuest {
    store: Store<GuestState>,
    instance: Instance,
    memory: Memory,
    init: Option<TypedFunc<(), ()>>,
    output_ptr: TypedFunc<(), i32>,
    output_len: TypedFunc<(), i32>,
    input_ptr: TypedFunc<(), i32>,
    run_command: TypedFunc<i32, ()>,
    fuel_limit: Option<u64>,
}

impl WasmGuest {
    /// Load a guest from module bytes (binary or WAT text).
    ///
    /// Validates the export table before instantiating.
    pub fn new(wasm_bytes: &[u8], config: &BridgeConfig) -> Result<Self, BridgeError> {
        let engine = create_engine(config)?;
        let module = Module::new(&engine, wasm_bytes)?;
        validate_module(&module)?;
        info!(
            bytes = wasm_bytes.len(),
            digest = %blake3::hash(wasm_bytes).to_hex(),
            "guest module compiled"
        );
        Self::instantiate(&engine, &module, config)
    }

    /// Load from a `.wasm` (or `.wat`) file path.
    pub fn from_file(path: &Path, config: &BridgeConfig) -> Result<Self, BridgeError> {
        debug!(path = %path.display(), "reading guest module");
        let bytes = std::fs::read(path)?;
        Self::new(&bytes, config)
    }

    fn instantiate(
        engine: &Engine,
        module: &Module,
        config: &BridgeConfig,
    ) -> Result<Self, BridgeError> {
        let limits = StoreLimitsBuilder::new()
            .memory_size(config.max_memory_pages as usize * WASM_PAGE_SIZE)
            .instances(1)
            .build();
        let mut store = Store::new(engine, GuestState { limits });
        store.limiter(|state| &mut state.limits);
        if let Some(fuel) = config.fuel_limit {
            // A start function runs during instantiation and needs fuel too.
            store.set_fuel(fuel)?;
        }

        // No host bindings: the guest is self-contained.
        let linker: Linker<GuestState> = Linker::new(engine);
        let instance = linker.instantiate(&mut store, module)?;

        let memory = instance
            .get_memory(&mut store, EXPORT_MEMORY)
            .ok_or_else(|| BridgeError::ValidationError("no memory export".into()))?;

        let init = instance
            .get_func(&mut store, EXPORT_INIT)
            .map(|f| f.typed::<(), ()>(&store))
            .transpose()?;
        let output_ptr =
            instance.get_typed_func::<(), i32>(&mut store, Slot::Output.ptr_export())?;
        let output_len =
            instance.get_typed_func::<(), i32>(&mut store, Slot::Output.len_export())?;
        let input_ptr = instance.get_typed_func::<(), i32>(&mut store, EXPORT_INPUT_PTR)?;
        let run_command = instance.get_typed_func::<i32, ()>(&mut store, EXPORT_RUN_COMMAND)?;

        Ok(Self {
            store,
            instance,
            memory,
            init,
            output_ptr,
            output_len,
            input_ptr,
            run_command,
            fuel_limit: config.fuel_limit,
        })
    }

    /// Resolve an optional `() -> i32` getter at call time.
    fn optional_getter(&mut self, name: &str) -> Result<TypedFunc<(), i32>, GuestError> {
        let func = self
            .instance
            .get_func(&mut self.store, name)
            .ok_or_else(|| GuestError::missing_export(name))?;
        func.typed::<(), i32>(&self.store)
            .map_err(|e| GuestError::Trap(format!("export '{}' has wrong signature: {}", name, e)))
    }

    fn getter(&mut self, slot: Slot, want_ptr: bool) -> Result<i32, GuestError> {
        let func = match (slot, want_ptr) {
            (Slot::Output, true) => self.output_ptr.clone(),
            (Slot::Output, false) => self.output_len.clone(),
            (_, true) => self.optional_getter(slot.ptr_export())?,
            (_, false) => self.optional_getter(slot.len_export())?,
        };
        invoke(&mut self.store, self.fuel_limit, &func, ())
    }
}

impl GuestMemory for WasmGuest {
    fn view(&self) -> &[u8] {
        self.memory.data(&self.store)
    }

    fn view_mut(&mut self) -> &mut [u8] {
        self.memory.data_mut(&mut self.store)
    }
}

impl GuestExports for WasmGuest {
    fn has_init(&self) -> bool {
        self.init.is_some()
    }

    fn init(&mut self) -> Result<(), GuestError> {
        let init = self
            .init
            .as_ref()
            .ok_or_else(|| GuestError::missing_export(EXPORT_INIT))?;
        invoke(&mut self.store, self.fuel_limit, init, ())
    }

    fn slot_ptr(&mut self, slot: Slot) -> Result<i32, GuestError> {
        self.getter(slot, true)
    }

    fn slot_len(&mut self, slot: Slot) -> Result<i32, GuestError> {
        self.getter(slot, false)
    }

    fn input_ptr(&mut self) -> Result<i32, GuestError> {
        invoke(&mut self.store, self.fuel_limit, &self.input_ptr, ())
    }

    fn run_command(&mut self, len: i32) -> Result<(), GuestError> {
        invoke(&mut self.store, self.fuel_limit, &self.run_command, len)
    }
}

/// Create a wasmtime engine for running guests.
fn create_engine(config: &BridgeConfig) -> Result<Engine, BridgeError> {
    let mut wasm_config = Config::new();

    // Fuel metering only when a budget is configured
    wasm_config.consume_fuel(config.fuel_limit.is_some());

    // One unshared linear memory; the host is its only other writer
    wasm_config.wasm_threads(false);
    wasm_config.wasm_multi_memory(false);

    Ok(Engine::new(&wasm_config)?)
}

/// Call a typed export, topping up fuel first when metering is on.
fn invoke<P, R>(
    store: &mut Store<GuestState>,
    fuel_limit: Option<u64>,
    func: &TypedFunc<P, R>,
    params: P,
) -> Result<R, GuestError>
where
    P: WasmParams,
    R: WasmResults,
{
    if let Some(fuel) = fuel_limit {
        store
            .set_fuel(fuel)
            .map_err(|e| GuestError::Trap(format!("refuel: {}", e)))?;
    }
    handle_trap(func.call(&mut *store, params))
}

/// Convert a guest call failure into a [`GuestError`].
///
/// Fuel exhaustion → `GuestError::FuelExhausted`
/// Other traps → `GuestError::Trap`
fn handle_trap<R>(result: Result<R, anyhow::Error>) -> Result<R, GuestError> {
    result.map_err(|e| match e.downcast_ref::<Trap>() {
        Some(Trap::OutOfFuel) => GuestError::FuelExhausted,
        _ => GuestError::Trap(format!("{:#}", e)),
    })
}
