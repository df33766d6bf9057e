// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Edit tracking for documents being highlighted.

pub mod partitioning;
pub mod text_change_notifier;

pub use partitioning::DocumentPartitioning;
pub use text_change_notifier::{TextChangeNotification, TextChangeType, calculate_change};
