//! Applying every fix in a file at once.
//!
//! Each finding is planned against the same unmodified tree. The plans are
//! turned into text edits and applied from the end of the file backwards, so
//! earlier offsets stay valid. An edit overlapping one already taken is
//! skipped rather than merged. The result is parsed once more so callers get a
//! tree that matches the new text.

use std::fmt;
use std::ops::Range;

use tracing::{debug, warn};

use crate::analysis::analyze_source;
use crate::error::{FixError, Result};
use crate::languages::csharp;
use crate::rule::plan_fix;
use crate::syntax::SyntaxTree;
use crate::types::{Finding, TextRange, TextSize};

/// Replace the bytes in `range` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Bytes to replace
    pub range: TextRange,
    /// New text
    pub replacement: String,
}

/// Why a finding's fix was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The fix could not be computed
    Fix(FixError),
    /// The edit overlaps an edit that was already taken
    Overlap {
        /// Range of the edit that was kept
        kept: TextRange,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fix(err) => write!(f, "{err}"),
            Self::Overlap { kept } => write!(f, "overlaps the fix at {kept:?}"),
        }
    }
}

/// A finding that was left alone.
#[derive(Debug, Clone)]
pub struct SkippedFix {
    /// The finding
    pub finding: Finding,
    /// Why it was not fixed
    pub reason: SkipReason,
}

/// The outcome of fixing a whole file.
#[derive(Debug, Clone)]
pub struct BatchFix {
    /// Rewritten source text
    pub text: String,
    /// Tree parsed from `text`
    pub tree: SyntaxTree,
    /// Findings whose fix was applied, in source order
    pub applied: Vec<Finding>,
    /// Findings whose fix was not applied
    pub skipped: Vec<SkippedFix>,
}

impl BatchFix {
    /// Whether any fix changed the text.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Apply the fixes for all `findings` to `tree`.
pub fn fix_all(tree: &SyntaxTree, findings: &[Finding]) -> Result<BatchFix> {
    let mut skipped = Vec::new();
    let mut planned: Vec<(Finding, TextEdit)> = Vec::with_capacity(findings.len());
    for finding in findings {
        match plan_fix(finding, tree) {
            Ok(plan) => planned.push((
                finding.clone(),
                TextEdit {
                    range: plan.range(),
                    replacement: plan.replacement_text(),
                },
            )),
            Err(err) => {
                warn!(range = ?finding.range, error = %err, "Skipping finding that cannot be fixed");
                skipped.push(SkippedFix {
                    finding: finding.clone(),
                    reason: SkipReason::Fix(err),
                });
            }
        }
    }

    planned.sort_by_key(|(_, edit)| std::cmp::Reverse(offsets(edit.range)));

    let mut taken: Vec<(Finding, TextEdit)> = Vec::with_capacity(planned.len());
    for (finding, edit) in planned {
        if let Some((_, last)) = taken.last() {
            if overlaps(edit.range, last.range) || edit.range == last.range {
                skipped.push(SkippedFix {
                    finding,
                    reason: SkipReason::Overlap { kept: last.range },
                });
                continue;
            }
        }
        taken.push((finding, edit));
    }

    if taken.is_empty() {
        return Ok(BatchFix {
            text: tree.text(),
            tree: tree.clone(),
            applied: Vec::new(),
            skipped,
        });
    }

    let mut text = tree.text();
    for (_, edit) in &taken {
        text.replace_range(Range::<usize>::from(edit.range), &edit.replacement);
    }
    let fixed = csharp::parse(&text)?;

    let mut applied: Vec<Finding> = taken.into_iter().map(|(finding, _)| finding).collect();
    applied.reverse();
    skipped.sort_by_key(|s| offsets(s.finding.range));
    debug!(applied = applied.len(), skipped = skipped.len(), "Composed batch fix");

    Ok(BatchFix {
        text,
        tree: fixed,
        applied,
        skipped,
    })
}

/// Sort key for ranges: start, then end.
fn offsets(range: TextRange) -> (TextSize, TextSize) {
    (range.start(), range.end())
}

/// Whether the two ranges share at least one byte.
fn overlaps(a: TextRange, b: TextRange) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

/// Analyze `source` and apply every fix.
pub fn fix_source(source: &str) -> Result<BatchFix> {
    let analysis = analyze_source(source)?;
    fix_all(&analysis.tree, &analysis.findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{MESSAGE, RULE_ID};
    use crate::types::Severity;

    const TWO_READS: &str = "using System.IO;\nclass A\n{\n    void M(Stream s, byte[] b)\n    {\n        s.Read(b, 0, 1);\n        if (b.Length > 0) { s.Read(b, 0, 2); }\n        if (b.Length > 1) s.Read(b, 0, 3);\n    }\n}\n";

    #[test]
    fn fixes_every_finding_in_one_pass() {
        let fixed = fix_source(TWO_READS).expect("fix");

        assert_eq!(fixed.applied.len(), 2);
        assert!(fixed.skipped.is_empty());
        assert_eq!(
            fixed.text,
            "using System.IO;\nclass A\n{\n    void M(Stream s, byte[] b)\n    {\n        var readCount = s.Read(b, 0, 1);\n        if (b.Length > 0) { var readCount = s.Read(b, 0, 2); }\n        if (b.Length > 1) s.Read(b, 0, 3);\n    }\n}\n"
        );
        assert_eq!(fixed.tree.text(), fixed.text);
    }

    #[test]
    fn applied_findings_are_in_source_order() {
        let fixed = fix_source(TWO_READS).expect("fix");
        assert!(fixed.applied[0].range.start() < fixed.applied[1].range.start());
    }

    #[test]
    fn fixed_text_has_no_findings() {
        let fixed = fix_source(TWO_READS).expect("fix");
        let again = analyze_source(&fixed.text).expect("reanalysis");
        assert!(again.findings.is_empty());
    }

    #[test]
    fn nothing_to_fix_keeps_text() {
        let source = "class A { void M() { } }";
        let fixed = fix_source(source).expect("fix");

        assert!(!fixed.changed());
        assert_eq!(fixed.text, source);
    }

    #[test]
    fn duplicate_findings_are_applied_once() {
        let analysis = analyze_source(TWO_READS).expect("analysis");
        let mut findings = analysis.findings.clone();
        findings.push(analysis.findings[0].clone());

        let fixed = fix_all(&analysis.tree, &findings).expect("fix");

        assert_eq!(fixed.applied.len(), 2);
        assert_eq!(fixed.skipped.len(), 1);
        assert!(matches!(fixed.skipped[0].reason, SkipReason::Overlap { .. }));
    }

    #[test]
    fn unfixable_finding_is_skipped_not_fatal() {
        let analysis = analyze_source(TWO_READS).expect("analysis");
        let stale = Finding {
            rule_id: RULE_ID,
            severity: Severity::Warning,
            message: MESSAGE,
            range: TextRange::new(0.into(), 5.into()),
            span: analysis.tree.span(TextRange::new(0.into(), 5.into())),
        };
        let mut findings = analysis.findings.clone();
        findings.push(stale);

        let fixed = fix_all(&analysis.tree, &findings).expect("fix");

        assert_eq!(fixed.applied.len(), 2);
        assert!(matches!(
            fixed.skipped[0].reason,
            SkipReason::Fix(FixError::CallNotFound { .. })
        ));
    }

    #[test]
    fn unbraced_body_is_left_alone() {
        let analysis = analyze_source(TWO_READS).expect("analysis");

        assert_eq!(analysis.findings.len(), 2);
        assert!(
            analysis
                .findings
                .iter()
                .all(|f| &TWO_READS[f.range] != "s.Read(b, 0, 3)")
        );
    }

    #[test]
    fn overlap_is_exclusive_at_boundaries() {
        let range = |start: u32, end: u32| TextRange::new(start.into(), end.into());

        assert!(!overlaps(range(0, 5), range(5, 9)));
        assert!(overlaps(range(0, 5), range(4, 6)));
        assert!(overlaps(range(5, 9), range(4, 6)));
    }
}
