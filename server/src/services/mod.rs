//! Streak bookkeeping, uptime probing, and the job scheduler.

pub mod scheduler;
pub mod streak;
pub mod uptime;
