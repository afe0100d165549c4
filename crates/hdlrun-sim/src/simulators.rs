//! Simulator toolchain integrations
//!
//! Each integration turns a [`SimJob`](crate::SimJob) into a
//! [`SimPlan`](crate::SimPlan). Nothing here touches the filesystem or runs
//! processes; see [`crate::exec`] for that.

pub mod ghdl;
pub mod icarus;
pub mod nvc;
pub mod verilator;
