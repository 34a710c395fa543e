//! The availability-information algebra and fair-slowness local scheduling
//! policy (FSP) for STaRS, a decentralized scheduler for bag-of-tasks
//! workloads on a tree-structured overlay of compute nodes.
//!
//! This crate is the hard core only: a piecewise rational slowness
//! function (`za`), a piecewise linear availability-before-deadline
//! function (`ldelta`), a bounded lossy clustering aggregator
//! (`clustering`, `summary`), a local task-queue model (`tasklist`), the
//! FSP local scheduler (`fsp`), and the IBP-variant dispatcher
//! (`dispatch`). Network transport, overlay maintenance, the execution
//! backend, persistence, and the simulator are external collaborators and
//! are not part of this crate.
//!
//! # Modules
//!
//! - **`time`**: `Time`/`Duration` plus an injectable `Clock`
//! - **`proxy`**: `TaskProxy`, the queued-task descriptor
//! - **`tasklist`**: `TaskList`, min-slowness ordering and boundary cache
//! - **`za`**: `Z`, the piecewise rational slowness function
//! - **`ldelta`**: `D`, the piecewise linear availability function
//! - **`clustering`**: `MDZCluster`/`ClusteringList`, the lossy aggregator
//! - **`summary`**: `AvailabilityInfo`, the message exchanged between nodes
//! - **`fsp`**: the local scheduler
//! - **`dispatch`**: the IBP-variant dispatcher
//! - **`wire`**: the binary codec for `AvailabilityInfo`/`TaskBag`
//! - **`config`**: tunables, grouped into explicit structs
//! - **`error`**: the error taxonomy

pub mod clustering;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fsp;
pub mod ldelta;
pub mod proxy;
pub mod summary;
pub mod tasklist;
pub mod time;
pub mod wire;
pub mod za;
