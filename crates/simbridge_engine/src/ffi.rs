//! # Raw C Boundary
//!
//! The literal plugin ABI:
//!
//! ```c
//! bool starting_config(uint8_t buf[], uint64_t *len);
//! bool starting_state(const uint8_t config[], uint64_t config_len,
//!                     uint8_t buf[], uint64_t *len);
//! bool state_step(const uint8_t input[], uint64_t input_len,
//!                 const uint8_t config[], uint64_t config_len,
//!                 const uint8_t state[], uint64_t state_len,
//!                 uint8_t out_state[], uint64_t *out_state_len);
//! ```
//!
//! Both directions live here:
//! - **Export**: turn any [`SimulationEngine`] into those three symbols
//!   ([`export_simulation!`](crate::export_simulation) or
//!   [`SimulationSymbols::of`]).
//! - **Import**: wrap three such function pointers as a
//!   [`SimulationEngine`] ([`ForeignEngine`]).
//!
//! Panics never cross the boundary: an engine that panics reports `Fatal`.

#![allow(unsafe_code)]

use std::panic::{self, AssertUnwindSafe};
use std::slice;

use simbridge_core::Outcome;

use crate::engine::SimulationEngine;

/// `bool starting_config(uint8_t buf[], uint64_t *len)`
pub type StartingConfigFn = unsafe extern "C" fn(buf: *mut u8, len: *mut u64) -> bool;

/// `bool starting_state(const uint8_t config[], uint64_t config_len, uint8_t buf[], uint64_t *len)`
pub type StartingStateFn =
    unsafe extern "C" fn(config: *const u8, config_len: u64, buf: *mut u8, len: *mut u64) -> bool;

/// `bool state_step(...)`, see the module docs for the full signature.
pub type StateStepFn = unsafe extern "C" fn(
    input: *const u8,
    input_len: u64,
    config: *const u8,
    config_len: u64,
    state: *const u8,
    state_len: u64,
    out_state: *mut u8,
    out_state_len: *mut u64,
) -> bool;

/// The three entry points of one simulation plugin.
#[derive(Clone, Copy, Debug)]
pub struct SimulationSymbols {
    /// `starting_config` entry point.
    pub starting_config: StartingConfigFn,
    /// `starting_state` entry point.
    pub starting_state: StartingStateFn,
    /// `state_step` entry point.
    pub state_step: StateStepFn,
}

impl SimulationSymbols {
    /// Builds C entry points for `E`.
    ///
    /// Every call constructs `E::default()`, so engines exported this way
    /// must not depend on anything but their inputs.
    #[must_use]
    pub fn of<E: SimulationEngine + Default>() -> Self {
        Self {
            starting_config: starting_config_trampoline::<E>,
            starting_state: starting_state_trampoline::<E>,
            state_step: state_step_trampoline::<E>,
        }
    }
}

unsafe extern "C" fn starting_config_trampoline<E: SimulationEngine + Default>(
    buf: *mut u8,
    len: *mut u64,
) -> bool {
    // SAFETY: forwarded verbatim; the caller upholds the C contract.
    unsafe { export_starting_config(&E::default(), buf, len) }
}

unsafe extern "C" fn starting_state_trampoline<E: SimulationEngine + Default>(
    config: *const u8,
    config_len: u64,
    buf: *mut u8,
    len: *mut u64,
) -> bool {
    // SAFETY: forwarded verbatim; the caller upholds the C contract.
    unsafe { export_starting_state(&E::default(), config, config_len, buf, len) }
}

#[allow(clippy::too_many_arguments)]
unsafe extern "C" fn state_step_trampoline<E: SimulationEngine + Default>(
    input: *const u8,
    input_len: u64,
    config: *const u8,
    config_len: u64,
    state: *const u8,
    state_len: u64,
    out_state: *mut u8,
    out_state_len: *mut u64,
) -> bool {
    // SAFETY: forwarded verbatim; the caller upholds the C contract.
    unsafe {
        export_state_step(
            &E::default(),
            input,
            input_len,
            config,
            config_len,
            state,
            state_len,
            out_state,
            out_state_len,
        )
    }
}

/// Borrows a read-only input region. Zero-length inputs may be null.
///
/// # Safety
///
/// A non-null `ptr` must be valid for reads of `len` bytes for `'a`.
unsafe fn input_slice<'a>(ptr: *const u8, len: u64) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    let len = usize::try_from(len).ok()?;
    // SAFETY: non-null and valid for `len` bytes per the function contract.
    Some(unsafe { slice::from_raw_parts(ptr, len) })
}

/// Borrows the caller's output buffer. Zero-capacity buffers may be null.
///
/// # Safety
///
/// A non-null `ptr` must be valid for writes of `len` bytes for `'a` and
/// not aliased.
unsafe fn output_slice<'a>(ptr: *mut u8, len: u64) -> Option<&'a mut [u8]> {
    if len == 0 {
        return Some(Default::default());
    }
    if ptr.is_null() {
        return None;
    }
    let len = usize::try_from(len).ok()?;
    // SAFETY: non-null, valid and exclusive for `len` bytes per the contract.
    Some(unsafe { slice::from_raw_parts_mut(ptr, len) })
}

/// Runs `call` with panics folded into `Fatal`, then writes the flat result.
fn finish<F>(offered: u64, len: &mut u64, call: F) -> bool
where
    F: FnOnce() -> Outcome,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(call))
        .unwrap_or(Outcome::Fatal)
        .checked(offered)
        .unwrap_or(Outcome::Fatal);
    let (ok, written) = outcome.into_raw();
    *len = written;
    ok
}

/// Serves `starting_config` for `engine` over raw pointers.
///
/// A null `len` fails without touching anything; a null `buf` paired with
/// a non-zero capacity fails fatally.
///
/// # Safety
///
/// `len` must be null or valid for reads and writes; `buf` must be null or
/// valid for writes of `*len` bytes.
pub unsafe fn export_starting_config<E: SimulationEngine + ?Sized>(
    engine: &E,
    buf: *mut u8,
    len: *mut u64,
) -> bool {
    // SAFETY: null or valid per the function contract.
    let Some(len) = (unsafe { len.as_mut() }) else {
        return false;
    };
    let offered = *len;
    // SAFETY: `buf` is valid for `offered` bytes per the function contract.
    let Some(out) = (unsafe { output_slice(buf, offered) }) else {
        *len = 0;
        return false;
    };
    finish(offered, len, || engine.starting_config(out))
}

/// Serves `starting_state` for `engine` over raw pointers.
///
/// # Safety
///
/// As [`export_starting_config`], plus `config` must be null or valid for
/// reads of `config_len` bytes.
pub unsafe fn export_starting_state<E: SimulationEngine + ?Sized>(
    engine: &E,
    config: *const u8,
    config_len: u64,
    buf: *mut u8,
    len: *mut u64,
) -> bool {
    // SAFETY: null or valid per the function contract.
    let Some(len) = (unsafe { len.as_mut() }) else {
        return false;
    };
    let offered = *len;
    // SAFETY: both regions valid per the function contract.
    let (Some(config), Some(out)) = (unsafe { input_slice(config, config_len) }, unsafe {
        output_slice(buf, offered)
    }) else {
        *len = 0;
        return false;
    };
    finish(offered, len, || engine.starting_state(config, out))
}

/// Serves `state_step` for `engine` over raw pointers.
///
/// # Safety
///
/// As [`export_starting_state`], for all three inputs and the output.
#[allow(clippy::too_many_arguments)]
pub unsafe fn export_state_step<E: SimulationEngine + ?Sized>(
    engine: &E,
    input: *const u8,
    input_len: u64,
    config: *const u8,
    config_len: u64,
    state: *const u8,
    state_len: u64,
    out_state: *mut u8,
    out_state_len: *mut u64,
) -> bool {
    // SAFETY: null or valid per the function contract.
    let Some(len) = (unsafe { out_state_len.as_mut() }) else {
        return false;
    };
    let offered = *len;
    // SAFETY: every region valid per the function contract.
    let regions = unsafe {
        (
            input_slice(input, input_len),
            input_slice(config, config_len),
            input_slice(state, state_len),
            output_slice(out_state, offered),
        )
    };
    let (Some(input), Some(config), Some(state), Some(out)) = regions else {
        *len = 0;
        return false;
    };
    finish(offered, len, || engine.state_step(input, config, state, out))
}

/// A simulation reached through raw C entry points.
pub struct ForeignEngine {
    name: String,
    symbols: SimulationSymbols,
}

impl ForeignEngine {
    /// Wraps three entry points.
    ///
    /// # Safety
    ///
    /// The entry points must honour the C contract: write at most `*len`
    /// bytes, read at most the given input lengths, and keep no pointer
    /// after returning.
    #[must_use]
    pub unsafe fn new(name: impl Into<String>, symbols: SimulationSymbols) -> Self {
        Self {
            name: name.into(),
            symbols,
        }
    }

    /// Returns the wrapped entry points.
    #[must_use]
    pub const fn symbols(&self) -> SimulationSymbols {
        self.symbols
    }
}

impl SimulationEngine for ForeignEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn starting_config(&self, out: &mut [u8]) -> Outcome {
        let offered = out.len() as u64;
        let mut len = offered;
        // SAFETY: `out` is valid for `offered` bytes; the symbol's behaviour
        // was vouched for in `ForeignEngine::new`.
        let ok = unsafe { (self.symbols.starting_config)(out.as_mut_ptr(), &mut len) };
        Outcome::from_raw(ok, offered, len)
    }

    fn starting_state(&self, config: &[u8], out: &mut [u8]) -> Outcome {
        let offered = out.len() as u64;
        let mut len = offered;
        // SAFETY: as in `starting_config`.
        let ok = unsafe {
            (self.symbols.starting_state)(
                config.as_ptr(),
                config.len() as u64,
                out.as_mut_ptr(),
                &mut len,
            )
        };
        Outcome::from_raw(ok, offered, len)
    }

    fn state_step(&self, input: &[u8], config: &[u8], state: &[u8], out: &mut [u8]) -> Outcome {
        let offered = out.len() as u64;
        let mut len = offered;
        // SAFETY: as in `starting_config`.
        let ok = unsafe {
            (self.symbols.state_step)(
                input.as_ptr(),
                input.len() as u64,
                config.as_ptr(),
                config.len() as u64,
                state.as_ptr(),
                state.len() as u64,
                out.as_mut_ptr(),
                &mut len,
            )
        };
        Outcome::from_raw(ok, offered, len)
    }
}

/// Exports a `Default`-constructible engine type as the three C symbols.
///
/// ```rust,ignore
/// simbridge_engine::export_simulation!(my_sim::Orbits);
/// ```
#[macro_export]
macro_rules! export_simulation {
    ($engine:ty) => {
        /// Plugin entry point: default configuration.
        ///
        /// # Safety
        ///
        /// `buf` must be valid for writes of `*len` bytes.
        #[allow(unsafe_code)]
        #[no_mangle]
        pub unsafe extern "C" fn starting_config(buf: *mut u8, len: *mut u64) -> bool {
            let engine = <$engine as ::core::default::Default>::default();
            unsafe { $crate::ffi::export_starting_config(&engine, buf, len) }
        }

        /// Plugin entry point: initial state.
        ///
        /// # Safety
        ///
        /// `config` must be valid for `config_len` bytes, `buf` for `*len`.
        #[allow(unsafe_code)]
        #[no_mangle]
        pub unsafe extern "C" fn starting_state(
            config: *const u8,
            config_len: u64,
            buf: *mut u8,
            len: *mut u64,
        ) -> bool {
            let engine = <$engine as ::core::default::Default>::default();
            unsafe { $crate::ffi::export_starting_state(&engine, config, config_len, buf, len) }
        }

        /// Plugin entry point: advance one step.
        ///
        /// # Safety
        ///
        /// Every pointer must be valid for its paired length.
        #[allow(unsafe_code, clippy::too_many_arguments)]
        #[no_mangle]
        pub unsafe extern "C" fn state_step(
            input: *const u8,
            input_len: u64,
            config: *const u8,
            config_len: u64,
            state: *const u8,
            state_len: u64,
            out_state: *mut u8,
            out_state_len: *mut u64,
        ) -> bool {
            let engine = <$engine as ::core::default::Default>::default();
            unsafe {
                $crate::ffi::export_state_step(
                    &engine,
                    input,
                    input_len,
                    config,
                    config_len,
                    state,
                    state_len,
                    out_state,
                    out_state_len,
                )
            }
        }
    };
}
