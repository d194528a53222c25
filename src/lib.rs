//! catalog-recon
//!
//! カテゴリツリーのプロジェクト管理とルールファイル照合のCLI

pub mod cli;
pub mod config;
pub mod error;
pub mod project;
pub mod reconcile;
pub mod review;
pub mod rule_source;
