// ABOUTME: Core types and constants for the Cadence adjustment engine
// ABOUTME: Foundation crate with error handling, constants, and data models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Cadence Core
//!
//! Foundation crate providing shared types and constants for the Cadence
//! nutrition and training adjustment engine. This crate is designed to change
//! infrequently, enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Physiological facts and service identifiers
//! - **models**: Profiles, check-ins, engine state, plans, and decision records

/// Unified error handling system with standard error codes
pub mod errors;

/// Physiological and service constants
pub mod constants;

/// Core data models
pub mod models;
