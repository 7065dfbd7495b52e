// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the command line to the lumina backend crates.
//
// `session` sequences one enhancement operation; `settings` owns the
// persisted configuration.

pub mod data_dir;
pub mod session;
pub mod settings;
