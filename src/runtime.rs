//! Runtime bridge protocol.
//!
//! The generated wrappers and the runtime helper package communicate through
//! a tiny fixed contract: a DOM marker element, a single global state slot,
//! and two per-key aggregation functions over the project configuration.
//! This module is the canonical model of that contract: the wire constants
//! the templates embed, the slot store, and the aggregation semantics the
//! generated code relies on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Once, RwLock};

use futures_util::future::{try_join_all, BoxFuture};
use lazy_static::lazy_static;
use serde_json::{Map, Value};

use crate::patterns::{is_page_of_the_list, RoutePattern};

// ═══════════════════════════════════════════════════════════════════════════════
// WIRE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Global slot the generated code reads and writes.
pub const NEXT_LOAD_SLOT: &str = "__NEXT_LOAD__";
/// Id and test-id of the DOM marker element carrying the embedded payload.
pub const DATA_ELEMENT_ID: &str = "__NEXT_LOAD_DATA__";
pub const DATA_HYDRATE_ATTR: &str = "data-hydrate";
pub const DATA_PAGE_ATTR: &str = "data-page";
/// Package the generated imports resolve against.
pub const RUNTIME_PACKAGE: &str = "next-load";
/// Bundler alias pointing at the project's configuration module.
pub const CONFIG_ALIAS: &str = "@next-load-root/next.load";
/// Hydration-read hook applied by generated client components.
pub const HYDRATE_HOOK: &str = "_useHydrate";

// ═══════════════════════════════════════════════════════════════════════════════
// STATE SLOT
// ═══════════════════════════════════════════════════════════════════════════════

/// The single-slot cache bridging server-embedded state into client renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotState {
    pub hydrate: Value,
    pub page: String,
}

lazy_static! {
    static ref SLOT: RwLock<Option<SlotState>> = RwLock::new(None);
}

static MISSING_SLOT_WARNING: Once = Once::new();

pub fn set_slot(hydrate: Value, page: &str) {
    *SLOT.write().unwrap() = Some(SlotState {
        hydrate,
        page: page.to_string(),
    });
}

pub fn get_slot() -> Option<SlotState> {
    SLOT.read().unwrap().clone()
}

pub fn reset_slot() {
    *SLOT.write().unwrap() = None;
}

/// The slot is fresh exactly when its page tag equals the rendered route.
pub fn slot_is_fresh(route: &str) -> bool {
    SLOT.read()
        .unwrap()
        .as_ref()
        .map(|slot| slot.page == route)
        .unwrap_or(false)
}

/// Read the current payload. An uninitialized slot signals the build plugin
/// was never wired; warn once and return null payload.
pub fn consume() -> Value {
    match SLOT.read().unwrap().as_ref() {
        Some(slot) => slot.hydrate.clone(),
        None => {
            MISSING_SLOT_WARNING.call_once(|| {
                eprintln!("next-load: Did you forget to add the next-load-plugin?");
            });
            Value::Null
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AGGREGATION
// ═══════════════════════════════════════════════════════════════════════════════

pub type LoadFn =
    Box<dyn Fn(Option<Value>, &str) -> BoxFuture<'static, Result<Value, String>> + Send + Sync>;
pub type HydrateFn = Box<dyn Fn(Value, &str) -> Value + Send + Sync>;

/// One named data group of the project configuration.
pub struct ConfigEntry {
    pub pages: Vec<RoutePattern>,
    pub load: Option<LoadFn>,
    pub hydrate: Option<HydrateFn>,
}

/// Ordered project configuration (key order shapes the aggregated object).
#[derive(Default)]
pub struct LoadConfig {
    pub entries: Vec<(String, ConfigEntry)>,
}

impl LoadConfig {
    pub fn entry(&self, key: &str) -> Option<&ConfigEntry> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, entry)| entry)
    }
}

/// Falsy load results are dropped from the aggregated object. This mirrors
/// the skip rule the generated code has always had; legitimate zero, false
/// and empty-string results are casualties of it.
pub fn is_skippable_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Invoke every matching key's loader concurrently and join the results into
/// one keyed object. A single rejection is fatal to the whole aggregation.
pub async fn load_all(
    props: Option<&Value>,
    route: &str,
    config: &LoadConfig,
) -> Result<Value, String> {
    let mut keys = Vec::new();
    let mut pending = Vec::new();
    for (key, entry) in &config.entries {
        if !is_page_of_the_list(route, &entry.pages) {
            continue;
        }
        let Some(load) = &entry.load else { continue };
        keys.push(key.clone());
        pending.push(load(props.cloned(), route));
    }

    let results = try_join_all(pending).await?;

    let mut aggregated = Map::new();
    for (key, value) in keys.into_iter().zip(results) {
        if is_skippable_value(&value) {
            continue;
        }
        aggregated.insert(key, value);
    }
    Ok(Value::Object(aggregated))
}

/// Project each aggregated value through its key's `hydrate` function when
/// the key's pages match the route; keys without one pass through unchanged.
pub fn hydrate_all(data: &Value, route: &str, config: &LoadConfig) -> Value {
    let Value::Object(map) = data else {
        return data.clone();
    };
    let mut projected = Map::new();
    for (key, value) in map {
        let hydrated = config
            .entry(key)
            .filter(|entry| is_page_of_the_list(route, &entry.pages))
            .and_then(|entry| entry.hydrate.as_ref())
            .map(|hydrate| hydrate(value.clone(), route));
        projected.insert(key.clone(), hydrated.unwrap_or_else(|| value.clone()));
    }
    Value::Object(projected)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLIENT HYDRATION STATE MACHINE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationPhase {
    Idle,
    Loading { route: String, generation: u64 },
    Loaded { route: String },
}

/// Mount-time fetch-once-per-route machine with a monotonically increasing
/// request generation. A completion whose generation is no longer current is
/// discarded, so a superseded in-flight load can never overwrite fresher
/// data.
pub struct HydrationMachine {
    phase: RwLock<HydrationPhase>,
    generation: AtomicU64,
}

impl Default for HydrationMachine {
    fn default() -> Self {
        HydrationMachine {
            phase: RwLock::new(HydrationPhase::Idle),
            generation: AtomicU64::new(0),
        }
    }
}

impl HydrationMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> HydrationPhase {
        self.phase.read().unwrap().clone()
    }

    /// A load is due unless this exact route is already loading or loaded.
    pub fn should_load(&self, route: &str) -> bool {
        match &*self.phase.read().unwrap() {
            HydrationPhase::Idle => true,
            HydrationPhase::Loading { route: current, .. }
            | HydrationPhase::Loaded { route: current } => current != route,
        }
    }

    /// Start a load for the route, superseding any in-flight one.
    pub fn begin_load(&self, route: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.phase.write().unwrap() = HydrationPhase::Loading {
            route: route.to_string(),
            generation,
        };
        generation
    }

    /// Report a finished load. Returns false (and changes nothing) when a
    /// newer load has started since.
    pub fn complete(&self, route: &str, generation: u64) -> bool {
        if generation != self.generation.load(Ordering::SeqCst) {
            return false;
        }
        *self.phase.write().unwrap() = HydrationPhase::Loaded {
            route: route.to_string(),
        };
        true
    }

    /// Route change resets to idle; same-route navigation is a no-op.
    pub fn navigate(&self, route: &str) {
        let mut phase = self.phase.write().unwrap();
        let stale = match &*phase {
            HydrationPhase::Idle => false,
            HydrationPhase::Loading { route: current, .. }
            | HydrationPhase::Loaded { route: current } => current != route,
        };
        if stale {
            *phase = HydrationPhase::Idle;
        }
    }
}
