//! Tree-level driver: runs the detector over every call in a tree.

use tracing::debug;

use crate::error::Result;
use crate::languages::csharp::{self, node_kinds::INVOCATION_EXPRESSION};
use crate::rule::{CallSite, evaluate};
use crate::semantics::{Resolver, SemanticModel};
use crate::syntax::SyntaxTree;
use crate::types::Finding;

/// Every finding in `tree`, sorted by offset.
pub fn analyze<R: Resolver + ?Sized>(tree: &SyntaxTree, resolver: &R) -> Vec<Finding> {
    let mut calls = 0usize;
    let mut findings: Vec<Finding> = tree
        .nodes_of_kind(INVOCATION_EXPRESSION)
        .filter_map(|node| CallSite::new(node, tree))
        .inspect(|_| calls += 1)
        .filter_map(|site| evaluate(&site, resolver))
        .collect();
    findings.sort_by_key(|finding| (finding.range.start(), finding.range.end()));
    debug!(calls, findings = findings.len(), "Analyzed syntax tree");
    findings
}

/// A parsed source file and its findings.
#[derive(Debug, Clone)]
pub struct SourceAnalysis {
    /// The lowered tree findings are anchored in
    pub tree: SyntaxTree,
    /// Findings, sorted by offset
    pub findings: Vec<Finding>,
}

/// Parse C# source, build its semantic model and analyze it.
pub fn analyze_source(source: &str) -> Result<SourceAnalysis> {
    let tree = csharp::parse(source)?;
    let model = SemanticModel::build(&tree);
    let findings = analyze(&tree, &model);
    Ok(SourceAnalysis { tree, findings })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn findings_are_sorted_by_offset() {
        let source = "using System.IO;\nclass A\n{\n    void M(Stream s)\n    {\n        s.Read(b, 0, 2);\n        s.Read(b, 0, 1);\n    }\n}\n";
        let analysis = analyze_source(source).expect("analysis");

        let starts: Vec<_> = analysis.findings.iter().map(|f| f.range.start()).collect();
        assert_eq!(starts.len(), 2);
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(analysis.findings[0].span.start_line(), 6);
        assert_eq!(analysis.findings[1].span.start_line(), 7);
    }

    #[test]
    fn file_without_calls_has_no_findings() {
        let analysis = analyze_source("class A { }").expect("analysis");
        assert!(analysis.findings.is_empty());
    }
}
