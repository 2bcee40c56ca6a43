//! The discarded stream-read rule.
//!
//! `Stream.Read` may return fewer bytes than requested. Code that ignores the
//! returned count silently works on a partially filled buffer. The rule flags
//! `Read` calls on `System.IO.Stream` (or a descendant) whose `int` result is
//! thrown away, and offers a fix that binds the result to a new local.
//!
//! - [`detector`] decides, per call expression, whether to report.
//! - [`rewriter`] turns a reported call statement into a declaration.

pub mod detector;
pub mod rewriter;

pub use detector::{CallSite, SyntacticContext, SyntacticRole, evaluate};
pub use rewriter::{BINDING_NAME, FixPlan, apply_fix, plan_fix};

/// Diagnostic identifier.
pub const RULE_ID: &str = "StreamNoDiscardAnalyzer";

/// Diagnostic category.
pub const CATEGORY: &str = "Bugs";

/// Short rule title.
pub const TITLE: &str = "Stream read return value discarded";

/// Message attached to every finding.
pub const MESSAGE: &str = "Stream read call should not discard return value of actual bytes read";

/// Title of the automated fix.
pub const FIX_TITLE: &str = "Capture return value";

/// Member name the rule targets.
pub const TARGET_MEMBER: &str = "Read";

/// Simple name of the declaring type the rule targets.
pub const TARGET_TYPE: &str = "Stream";

/// Namespace path of the declaring type the rule targets.
pub const TARGET_NAMESPACE: &[&str] = &["System", "IO"];
