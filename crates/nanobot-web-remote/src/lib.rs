//! Typed operations against a remote nanobot installation.
//!
//! Provides:
//! - `Nanobot` - Accessors built purely on a [`RemoteShell`](nanobot_web_core::RemoteShell)
//! - Config, skills, memory, agent instructions, cron, status, logs, restart
//! - Agent chat and the dashboard summary

pub mod agents;
pub mod chat;
pub mod client;
pub mod command;
pub mod config;
pub mod cron;
pub mod dashboard;
pub mod error;
pub mod logs;
pub mod memory;
pub mod service;
pub mod skills;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use client::Nanobot;
pub use command::{CliCommand, CliOutcome};
pub use cron::{CronJob, NewCronJob, ScheduleKind};
pub use dashboard::Dashboard;
pub use error::NanobotError;
pub use memory::MemoryFile;
pub use skills::{Skill, SkillSource};
pub use status::NanobotStatus;
