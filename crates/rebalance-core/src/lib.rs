//! Rebalance Core - budget reallocation decision engine.
//!
//! This crate turns a table of channel performance records into budget
//! recommendations:
//! - Efficiency/potential classification and decision matrix lookup
//! - Time-decayed, clamped adjustments with cooldown gating
//! - Proportional equilibration to a target total and a rollout plan
//! - Periodic control points and urgency-tagged alerts
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use rebalance_core::{EngineConfig, ReallocationEngine, read_performance_csv};
//!
//! fn main() -> rebalance_core::EngineResult<()> {
//!     let records = read_performance_csv(std::fs::File::open("performance.csv")?)?;
//!     let engine = ReallocationEngine::new(EngineConfig::default())?;
//!     let report = engine.run(&records, Utc::now(), None)?;
//!     println!("{} tasks", report.plan.len());
//!     Ok(())
//! }
//! ```

pub mod alerts;
pub mod classifier;
pub mod config;
pub mod control_points;
pub mod cooldown;
pub mod decay;
pub mod decision;
pub mod engine;
pub mod equilibrate;
pub mod error;
pub mod ingest;
pub mod matrix;
pub mod record;
pub mod schedule;
pub mod tier;

pub use alerts::{ActiveState, Alert, AlertEngine, ChannelState, UrgencyLevel};
pub use classifier::{Classification, ClassificationWarning, PerformanceClassifier, average_conversion};
pub use config::{
    AdjustmentConfig, AlertConfig, ClassificationConfig, ControlPointConfig, CooldownConfig,
    EngineConfig, MatrixConfig, ScheduleConfig,
};
pub use control_points::{CampaignCalendarEntry, ControlPoint, ControlPointScheduler, Frequency, Phase};
pub use cooldown::{CooldownEntry, CooldownGate};
pub use decay::{DecayedFactor, TimeDecayAdjuster};
pub use decision::{AdjustmentRecord, DecisionRow};
pub use engine::{AppliedAdjustment, ApplyMode, ReallocationEngine, ReallocationReport};
pub use equilibrate::{BudgetEquilibrator, Equilibration, EquilibratedRow};
pub use error::{EngineError, EngineResult, ValidationError};
pub use ingest::{read_calendar_csv, read_performance_csv, read_performance_json};
pub use matrix::{DecisionMatrix, DecisionRule, MatrixCell, RawAdjustment};
pub use record::{ChannelKey, ChannelPerformanceRecord, PerformanceRow, validate_batch};
pub use schedule::{ImplementationScheduler, ImplementationTask, TaskUrgency};
pub use tier::{Action, EfficiencyTier, PotentialTier};
