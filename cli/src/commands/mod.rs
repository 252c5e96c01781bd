// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the gatekeeper CLI

pub mod demo;
pub mod export;
pub mod serve;
