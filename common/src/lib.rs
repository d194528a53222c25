//! Catalog Recon Common Library
//!
//! CLIとデスクトップで共有されるカテゴリツリー、照合エンジン、文書形式

pub mod error;
pub mod normalize;
pub mod similarity;
pub mod progress;
pub mod tree;
pub mod color;
pub mod rules;
pub mod matcher;
pub mod loader;
pub mod codec;
pub mod outline;
pub mod session;
pub mod search;

pub use error::{Error, Result, TreeError};
pub use normalize::{last_segment, normalize_path};
pub use similarity::similarity;
pub use progress::{Flow, NoProgress, Progress, DEFAULT_PROGRESS_INTERVAL};
pub use tree::{CategoryNode, CategoryTree, NodePath, TreeStats};
pub use color::{Color, ColorAssigner, DEFAULT_PALETTE};
pub use rules::{Rule, RuleRow, RuleTable};
pub use matcher::{
    classify_names, scan, ExactMatch, FuzzyMatch, MatchCandidate, MatchKind, MatchOptions,
    ScanResult,
};
pub use loader::LoadOutcome;
pub use codec::{export_outline, from_json, to_json, NodeRecord};
pub use outline::{import_opml, import_outline, parse_opml, OutlineNode};
pub use session::{
    ApplyReport, ReconciliationSession, ReviewDecision, ReviewRequest, ScanSummary,
};
pub use search::{find_best, SearchHit, SEARCH_THRESHOLD};
