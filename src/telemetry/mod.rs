//! # Telemetry Module
//!
//! Records controller events to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting events as JSONL (JSON Lines) with timestamps
//! - Writing to rotating log files (max N records per file)
//! - Retaining only the last M files

pub mod logger;
