//! End-to-end detection and fix scenarios on C# sources.
//!
//! Each test parses real C# text, builds the semantic model and runs the rule,
//! so these exercise the front end, resolution, detection and rewriting
//! together.

use readguard::analysis::analyze_source;
use readguard::batch::fix_source;
use readguard::rule::apply_fix;
use readguard::{Finding, Severity};
use rstest::rstest;

/// Wrap a constructor body in the usual test scaffolding.
///
/// The body starts on line 12, column 17.
fn program(body: &str) -> String {
    program_with_types("", body)
}

fn program_with_types(types: &str, body: &str) -> String {
    format!(
        "
    using System;
    using System.IO;

    namespace ConsoleApplication1
    {{{types}
        class TypeName
        {{
            public TypeName()
            {{
                var ms = new MemoryStream();
                {body}
            }}
        }}
    }}"
    )
}

fn findings(source: &str) -> Vec<Finding> {
    analyze_source(source).expect("analysis should succeed").findings
}

#[test]
fn empty_text_has_no_findings() {
    assert!(findings("").is_empty());
}

#[test]
fn discarded_read_is_reported() {
    let source = program("ms.Read(new byte[1],0,1);");

    let found = findings(&source);

    assert_eq!(found.len(), 1);
    let finding = &found[0];
    assert_eq!(finding.rule_id, "StreamNoDiscardAnalyzer");
    assert_eq!(
        finding.message,
        "Stream read call should not discard return value of actual bytes read"
    );
    assert_eq!(finding.severity, Severity::Warning);
    assert_eq!(finding.span.start_line(), 12);
    assert_eq!(finding.span.start_column(), 17);
    assert_eq!(
        &source[finding.range],
        "ms.Read(new byte[1],0,1)"
    );
}

#[test]
fn fix_captures_result_and_keeps_everything_else() {
    let source = program("ms.Read(new byte[1],0,1);");
    let analysis = analyze_source(&source).expect("analysis");

    let fixed = apply_fix(&analysis.findings[0], &analysis.tree).expect("fix applies");

    assert_eq!(
        fixed.text(),
        program("var readCount = ms.Read(new byte[1],0,1);")
    );
}

#[test]
fn fixed_source_is_clean() {
    let source = program("ms.Read(new byte[1],0,1);");

    let fixed = fix_source(&source).expect("fix");

    assert_eq!(fixed.applied.len(), 1);
    assert!(findings(&fixed.text).is_empty());
}

#[rstest]
#[case::assigned("var yx = ms.Read(new byte[1],0,1);")]
#[case::reassigned("int yx; yx = ms.Read(new byte[1],0,1);")]
#[case::comparison("if(x > ms.Read(new byte[1],0,1))\n                    return;")]
#[case::loop_condition("while (ms.Read(new byte[1],0,1) > 0) { }")]
#[case::cast_in_initializer("var yx = (long) ms.Read(new byte[1],0,1);")]
#[case::argument("Console.WriteLine(ms.Read(new byte[1],0,1));")]
#[case::lambda_body("Func<int> next = () => ms.Read(new byte[1],0,1);")]
#[case::unbraced_if_body("if (ms.CanRead) ms.Read(new byte[1],0,1);")]
#[case::unbraced_else_body("if (ms.CanSeek) { } else ms.Read(new byte[1],0,1);")]
#[case::unbraced_while_body("while (ms.CanRead) ms.Read(new byte[1],0,1);")]
fn observed_result_is_not_reported(#[case] body: &str) {
    assert!(findings(&program(body)).is_empty(), "{body}");
}

#[rstest]
#[case::unrelated_read(
    "\n        public class FakeStream {public int Read() => 1;}",
    "var fs = new FakeStream();\n                fs.Read();"
)]
#[case::other_member(
    "\n        public class FakeStream {public int FakeRead() => 1;}",
    "var fs = new FakeStream();\n                fs.FakeRead();"
)]
#[case::void_read(
    "\n        public class FakeStream {public System.Void Read() {}}",
    "var fs = new FakeStream();\n                fs.Read();"
)]
#[case::shadowing_stream(
    "\n        public class Stream {public int Read(byte[] b, int o, int c) => 0;}",
    "var s = new Stream();\n                s.Read(new byte[1],0,1);"
)]
fn non_stream_read_is_not_reported(#[case] types: &str, #[case] body: &str) {
    assert!(findings(&program_with_types(types, body)).is_empty(), "{body}");
}

#[rstest]
#[case::text_reader("var r = new StreamReader(ms);\n                r.Read(new char[1],0,1);")]
#[case::binary_reader("var r = new BinaryReader(ms);\n                r.Read(new byte[1],0,1);")]
#[case::console("Console.Read();")]
fn look_alike_reads_are_not_reported(#[case] body: &str) {
    assert!(findings(&program(body)).is_empty(), "{body}");
}

#[rstest]
#[case::file_stream("var fs = File.OpenRead(\"data.bin\");\n                fs.Read(new byte[1],0,1);")]
#[case::base_stream("var r = new StreamReader(ms);\n                r.BaseStream.Read(new byte[1],0,1);")]
#[case::gzip("var z = new System.IO.Compression.GZipStream(ms, 0);\n                z.Read(new byte[1],0,1);")]
#[case::span_overload("ms.Read(new byte[1]);")]
#[case::parenthesized_receiver("((Stream) ms).Read(new byte[1],0,1);")]
#[case::braced_if_body("if (ms.CanRead) { ms.Read(new byte[1],0,1); }")]
#[case::braced_while_body("while (ms.CanRead) { ms.Read(new byte[1],0,1); }")]
fn stream_family_reads_are_reported(#[case] body: &str) {
    assert_eq!(findings(&program(body)).len(), 1, "{body}");
}

#[test]
fn user_subclass_of_stream_is_reported() {
    let source = program_with_types(
        "\n        public class CountingStream : MemoryStream { }",
        "var cs = new CountingStream();\n                cs.Read(new byte[1],0,1);",
    );
    assert_eq!(findings(&source).len(), 1);
}

#[test]
fn unqualified_read_inside_stream_subclass_is_reported() {
    let source = "using System.IO;\nclass Wrapper : MemoryStream\n{\n    void Drain(byte[] b)\n    {\n        Read(b, 0, b.Length);\n    }\n}\n";
    let found = findings(source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].span.start_line(), 6);
}

#[test]
fn missing_using_means_no_finding() {
    let source = "class A { void M() { var ms = new MemoryStream(); ms.Read(new byte[1],0,1); } }";
    assert!(findings(source).is_empty());
}

#[test]
fn top_level_statements_are_checked() {
    let source = "using System.IO;\n\nvar ms = new MemoryStream();\nms.Read(new byte[1], 0, 1);\n";
    let fixed = fix_source(source).expect("fix");

    assert_eq!(fixed.applied.len(), 1);
    assert_eq!(
        fixed.text,
        "using System.IO;\n\nvar ms = new MemoryStream();\nvar readCount = ms.Read(new byte[1], 0, 1);\n"
    );
}

#[test]
fn file_scoped_namespace_is_resolved() {
    let source = "using System.IO;\n\nnamespace App;\n\nclass A\n{\n    void M(Stream s) { s.Read(new byte[1], 0, 1); }\n}\n";
    assert_eq!(findings(source).len(), 1);
}

#[test]
fn detection_is_idempotent() {
    let source = program("ms.Read(new byte[1],0,1);\n                ms.Read(new byte[2],0,2);");
    assert_eq!(findings(&source), findings(&source));
    assert_eq!(findings(&source).len(), 2);
}

#[test]
fn returned_and_passed_results_are_not_reported() {
    let source = "using System.IO;\nclass A\n{\n    int M(Stream s, byte[] b)\n    {\n        Consume(s.Read(b, 0, 1));\n        return s.Read(b, 0, 1);\n    }\n\n    void Consume(int n) { }\n}\n";
    assert!(findings(source).is_empty());
}

#[test]
fn deeply_nested_expression_is_analyzed() {
    let terms = vec!["s.Length"; 20_000].join(" + ");
    let source = format!(
        "using System.IO;\nclass A\n{{\n    long M(Stream s, byte[] b)\n    {{\n        s.Read(b, 0, 1);\n        return {terms};\n    }}\n}}\n"
    );

    let found = findings(&source);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].span.start_line(), 6);
}
