// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Function Registry
//!
//! Maps aggregate call names to factories. Built-in functions are registered
//! on construction; callers may add their own through
//! [`FunctionRegistry::register_aggregate_factory`].

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::aggregate::{AvgFunction, CountFunction, MaxFunction, MinFunction, SumFunction};
use super::window::{CumeDistFunction, LagFunction, LeadFunction, NtileFunction};
use super::{AggregateFunction, FunctionInfo};
use crate::core::{Error, Result};

/// Global function registry instance
static GLOBAL_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// Get the global function registry
#[inline]
pub fn global_registry() -> &'static FunctionRegistry {
    GLOBAL_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Type alias for aggregate function factory
type AggregateFnFactory = Arc<dyn Fn() -> Box<dyn AggregateFunction> + Send + Sync>;

/// Function registry for aggregate calls
pub struct FunctionRegistry {
    /// Aggregate factories keyed by upper-case name
    aggregate_functions: RwLock<FxHashMap<String, AggregateFnFactory>>,
    /// Function info cache
    function_info: RwLock<FxHashMap<String, FunctionInfo>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new function registry with all built-in functions registered
    pub fn new() -> Self {
        let registry = Self {
            aggregate_functions: RwLock::new(FxHashMap::default()),
            function_info: RwLock::new(FxHashMap::default()),
        };

        registry.register_aggregate::<CountFunction>();
        registry.register_aggregate::<SumFunction>();
        registry.register_aggregate::<AvgFunction>();
        registry.register_aggregate::<MinFunction>();
        registry.register_aggregate::<MaxFunction>();

        registry.register_aggregate::<CumeDistFunction>();
        registry.register_aggregate::<NtileFunction>();
        registry.register_aggregate::<LeadFunction>();
        registry.register_aggregate::<LagFunction>();

        registry
    }

    /// Register an aggregate function type
    pub fn register_aggregate<F: AggregateFunction + Default + 'static>(&self) {
        let instance = F::default();
        let name = instance.name().to_uppercase();
        let info = instance.info();

        self.aggregate_functions
            .write()
            .insert(name.clone(), Arc::new(|| Box::new(F::default())));
        self.function_info.write().insert(name, info);
    }

    /// Register an aggregate under its own name using a factory closure
    pub fn register_aggregate_factory<F>(&self, factory: F)
    where
        F: Fn() -> Box<dyn AggregateFunction> + Send + Sync + 'static,
    {
        let instance = factory();
        let name = instance.name().to_uppercase();
        let info = instance.info();

        self.aggregate_functions
            .write()
            .insert(name.clone(), Arc::new(factory));
        self.function_info.write().insert(name, info);
    }

    /// Get a new instance of an aggregate function by name
    pub fn get_aggregate(&self, name: &str) -> Option<Box<dyn AggregateFunction>> {
        let funcs = self.aggregate_functions.read();
        if let Some(f) = funcs.get(name) {
            return Some(f());
        }
        funcs.get(&name.to_uppercase()).map(|f| f())
    }

    /// Get a new instance or fail with [`Error::FunctionNotFound`]
    pub fn create(&self, name: &str) -> Result<Box<dyn AggregateFunction>> {
        self.get_aggregate(name)
            .ok_or_else(|| Error::FunctionNotFound(name.to_uppercase()))
    }

    /// Check if a function name is registered
    pub fn is_aggregate(&self, name: &str) -> bool {
        let funcs = self.aggregate_functions.read();
        funcs.contains_key(name) || funcs.contains_key(&name.to_uppercase())
    }

    /// Get function info by name
    pub fn get_info(&self, name: &str) -> Option<FunctionInfo> {
        self.function_info.read().get(&name.to_uppercase()).cloned()
    }

    /// List all aggregate function names, sorted
    pub fn list_aggregates(&self) -> Vec<String> {
        let mut names: Vec<String> = self.aggregate_functions.read().keys().cloned().collect();
        names.sort();
        names
    }
}
