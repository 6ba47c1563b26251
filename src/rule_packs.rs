// ABOUTME: Registry of loaded rule pack versions with exactly one active version
// ABOUTME: Loads packs from a directory once at startup and serves historical versions for replay
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Rule Pack Registry
//!
//! Packs are immutable once registered. A version can only be registered
//! once; re-registering the same version with different content is a
//! configuration error, since stored decisions reference packs by version.

use crate::config::EngineConfig;
use cadence_core::errors::{AppError, AppResult};
use cadence_intelligence::config::{RulePack, BASELINE_VERSION};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Loaded rule packs keyed by version
#[derive(Debug, Clone)]
pub struct RulePackRegistry {
    packs: BTreeMap<String, Arc<RulePack>>,
    active: String,
}

impl RulePackRegistry {
    /// Registry holding only the built-in baseline pack, active
    #[must_use]
    pub fn with_baseline() -> Self {
        let mut packs = BTreeMap::new();
        packs.insert(BASELINE_VERSION.to_owned(), Arc::new(RulePack::baseline()));
        Self {
            packs,
            active: BASELINE_VERSION.to_owned(),
        }
    }

    /// Build the registry described by the process configuration: baseline,
    /// plus every pack in `rule_pack_dir`, with `active_rule_pack` (or the
    /// newest version) active
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` for unreadable or invalid packs, conflicting
    /// duplicate versions, or an unknown `active_rule_pack`
    pub fn from_config(config: &EngineConfig) -> AppResult<Self> {
        let mut registry = Self::with_baseline();
        if let Some(dir) = &config.rule_pack_dir {
            registry.load_dir(dir)?;
        }
        match &config.active_rule_pack {
            Some(version) => registry.set_active(version)?,
            None => registry.activate_newest(),
        }
        info!(
            active = %registry.active,
            loaded = ?registry.versions(),
            "Rule packs loaded"
        );
        Ok(registry)
    }

    /// Register every `*.yaml`, `*.yml` and `*.json` file in `dir`
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` when the directory cannot be read or any pack fails to load
    pub fn load_dir(&mut self, dir: &Path) -> AppResult<usize> {
        let entries = fs::read_dir(dir).map_err(|e| {
            AppError::config(format!(
                "cannot read rule pack directory {}: {e}",
                dir.display()
            ))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| AppError::config(format!("cannot list {}: {e}", dir.display())))?
                .path();
            let is_pack = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "yaml" | "yml" | "json"));
            if is_pack {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let pack = RulePack::from_path(path)?;
            debug!(path = %path.display(), version = %pack.version, "Rule pack parsed");
            self.register(pack)?;
        }
        Ok(paths.len())
    }

    /// Register one pack. Idempotent for identical content.
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` if the pack fails validation or the version is
    /// already registered with different content
    pub fn register(&mut self, pack: RulePack) -> AppResult<()> {
        pack.validate()?;
        if let Some(existing) = self.packs.get(&pack.version) {
            if **existing == pack {
                return Ok(());
            }
            return Err(AppError::config(format!(
                "rule pack version {} already registered with different content",
                pack.version
            )));
        }
        self.packs.insert(pack.version.clone(), Arc::new(pack));
        Ok(())
    }

    /// Make `version` the active pack
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` if the version is not registered
    pub fn set_active(&mut self, version: &str) -> AppResult<()> {
        if !self.packs.contains_key(version) {
            return Err(AppError::config(format!(
                "rule pack version {version} is not loaded"
            )));
        }
        version.clone_into(&mut self.active);
        Ok(())
    }

    fn activate_newest(&mut self) {
        if let Some(newest) = self.packs.keys().next_back() {
            newest.clone_into(&mut self.active);
        }
    }

    /// The active pack
    ///
    /// # Errors
    ///
    /// Returns `INTERNAL_ERROR` if the active version is missing from the registry
    pub fn active(&self) -> AppResult<Arc<RulePack>> {
        self.get(&self.active).ok_or_else(|| {
            AppError::internal(format!("active rule pack {} missing", self.active))
        })
    }

    /// Version string of the active pack
    #[must_use]
    pub fn active_version(&self) -> &str {
        &self.active
    }

    /// Look up any registered version
    #[must_use]
    pub fn get(&self, version: &str) -> Option<Arc<RulePack>> {
        self.packs.get(version).cloned()
    }

    /// Registered versions, ascending
    #[must_use]
    pub fn versions(&self) -> Vec<&str> {
        self.packs.keys().map(String::as_str).collect()
    }
}

impl Default for RulePackRegistry {
    fn default() -> Self {
        Self::with_baseline()
    }
}
