// Copyright 2026 company-scout contributors
// SPDX-License-Identifier: Apache-2.0

//! Company Scout runtime — browser-driven collectors and their orchestrator.
//!
//! This library crate exposes the runtime modules for integration testing.

pub mod cli;
pub mod collector;
pub mod config;
pub mod orchestrator;
pub mod renderer;
pub mod sources;
