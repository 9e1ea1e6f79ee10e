// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for abuse simulation against the intake gateway.
//!
//! Attack patterns are replayed through the full router so admission,
//! normalization and validation are exercised together.

pub mod attacks;
pub mod generators;
pub mod metrics;
