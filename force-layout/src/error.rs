// Copyright 2025 John Brosnihan
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
//! Error types
//!
//! Topology misuse is never fatal to the simulation. The plain graph
//! operations log a [`TopologyError`] and become no-ops, while the `try_*`
//! variants hand the same error back to callers that want to react to it.

use std::time::Duration;
use thiserror::Error;

/// Misuse of the graph's node and relationship operations
///
/// Identifiers are rendered with `Debug` so that caller-provided text cannot
/// forge log lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The referenced node is not in the graph
    #[error("node {0} does not exist")]
    MissingNode(String),

    /// The source of a relationship is not in the graph
    #[error("relationship {source_id} > {target_id}: source does not exist")]
    MissingSource {
        /// Outgoing endpoint
        source_id: String,
        /// Incoming endpoint
        target_id: String,
    },

    /// The target of a relationship is not in the graph
    #[error("relationship {source_id} > {target_id}: target does not exist")]
    MissingTarget {
        /// Outgoing endpoint
        source_id: String,
        /// Incoming endpoint
        target_id: String,
    },

    /// A node cannot be related to itself
    #[error("relationship between node {0} and itself")]
    SelfLoop(String),

    /// The directed relationship is already present
    #[error("relationship {source_id} > {target_id} already exists")]
    DuplicateRelationship {
        /// Outgoing endpoint
        source_id: String,
        /// Incoming endpoint
        target_id: String,
    },

    /// The directed relationship is not present
    #[error("relationship {source_id} > {target_id} does not exist")]
    MissingRelationship {
        /// Outgoing endpoint
        source_id: String,
        /// Incoming endpoint
        target_id: String,
    },
}

impl TopologyError {
    pub(crate) fn missing_node<K: std::fmt::Debug>(uid: &K) -> Self {
        TopologyError::MissingNode(format!("{:?}", uid))
    }

    pub(crate) fn self_loop<K: std::fmt::Debug>(uid: &K) -> Self {
        TopologyError::SelfLoop(format!("{:?}", uid))
    }

    pub(crate) fn endpoints<K: std::fmt::Debug>(source: &K, target: &K) -> (String, String) {
        (format!("{:?}", source), format!("{:?}", target))
    }
}

/// Invalid physics or driver configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter must be finite and strictly positive
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A parameter must be finite and non-negative
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// The friction coefficient is the fraction of velocity kept after one
    /// second, so it must lie in (0, 1]
    #[error("friction coefficient must be in (0, 1], got {0}")]
    FrictionOutOfRange(f64),

    /// A count parameter must be at least one
    #[error("{0} must be at least 1")]
    ZeroCount(&'static str),

    /// The frame rate is so low that one tick cannot be expressed as a
    /// [`Duration`]
    #[error("target frame rate {0} is too low to schedule")]
    FrameRateTooLow(f64),
}

/// Failure to acquire the graph lock
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// The lock was still held by another thread when the wait expired
    #[error("timed out after {0:?} waiting for the graph lock")]
    Timeout(Duration),
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Result type for configuration validation
pub type ConfigResult<T> = Result<T, ConfigError>;
