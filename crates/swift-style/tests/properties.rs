//! Properties that hold for every input: lossless lexing, well-formed trees,
//! deterministic output, suppression and fixed points.

use std::path::Path;
use std::time::{Duration, Instant};
use swift_style::lexer::lex;
use swift_style::rules::{all_rules, Preset};
use swift_style::{Category, Config, Linter, NodeKind, NodeRef, SyntaxTree};

const SAMPLES: &[&str] = &[
    "import Foundation\n\nstruct Point {\n  var x: Double\n  var y: Double\n}\n",
    "let s = \"a \\(b + \"c \\(d)\") e\"\nlet r = #\"raw \\#(x)\"#\n",
    "let m = \"\"\"\n  multi \\(line)\n  \"\"\"\n",
    "switch x {\ncase let .a(v, w) where v > 0:\n  fallthrough\ncase .b:\n  break\n@unknown default:\n}\n",
    "func f<T: Equatable>(_ a: T, b: inout [T]) async throws -> T? {\n  guard let x = a as? T else { return nil }\n  defer { b.removeAll() }\n  return try await g(x)!\n}\n",
    "class C: NSObject {\n  @IBOutlet weak var label: UILabel!\n  private(set) static var n = 0;\n  override init() { super.init() }\n}\n",
    "#if DEBUG\nlet level = 1\n#else\nlet level = 0\n#endif\nlet t = (1, 2).0\nlet h = 0x1p4 + 1_000.5e-3\n",
    "items.map { $0 * 2 }.filter({ $0 > 2 }).forEach { print($0) }\n",
    "/* outer /* inner */ still */ let a = [1: \"x\", 2: \"y\"]\nlet e: [String: Int] = [:]\n",
    "if (a) {\n\tb();\n}\nelse\n{\n  c()   \n}\n",
    "let broken = (1, \nfunc g( {\n}}}\n@@@ ??? }{)(\n",
    "let s = \"unterminated\nlet t = /* open comment\n",
];

fn nodes(tree: &SyntaxTree) -> Vec<NodeRef<'_>> {
    let root = tree.root();
    std::iter::once(root).chain(root.descendants()).collect()
}

fn recommended() -> Linter {
    let mut builder = Linter::builder();
    for rule in all_rules() {
        builder = builder.rule_box(rule);
    }
    builder.build().unwrap()
}

/// Deterministic pseudo-random buffers, biased towards Swift punctuation.
fn garbage(seed: u64, len: usize) -> String {
    const ALPHABET: &[u8] = b"{}()[]<>\"'`#@$\\/*!?:;,.=+-&|^~ \n\tabcxyz019_";
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    let mut bytes = Vec::with_capacity(len);
    for _ in 0..len {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let pick = (state >> 33) as usize;
        if pick % 17 == 0 {
            bytes.push((pick >> 8) as u8);
        } else {
            bytes.push(ALPHABET[pick % ALPHABET.len()]);
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn inputs() -> impl Iterator<Item = String> {
    SAMPLES
        .iter()
        .map(|s| (*s).to_string())
        .chain((0..64).map(|seed| garbage(seed, 16 + (seed as usize * 13) % 300)))
}

#[test]
fn lexing_is_lossless() {
    for input in inputs() {
        let lexed = lex(&input);
        assert_eq!(lexed.reconstruct(), input);

        let mut offset = 0;
        for token in &lexed.tokens {
            assert_eq!(token.span.start, offset, "gap before {token:?} in {input:?}");
            assert!(!token.text.is_empty());
            offset = token.span.end;
        }
        assert_eq!(offset, input.len());
    }
}

#[test]
fn child_spans_nest_and_siblings_do_not_overlap() {
    for input in inputs() {
        let tree = SyntaxTree::parse(&input);
        assert_eq!(tree.root().span().end, input.len());
        for node in nodes(&tree) {
            let span = node.span();
            let mut previous_end = span.start;
            for child in node.children() {
                let child_span = child.span();
                assert!(span.contains(child_span), "{child_span:?} escapes {span:?} in {input:?}");
                assert!(child_span.start >= previous_end, "siblings overlap in {input:?}");
                previous_end = child_span.end;
            }
        }
    }
}

#[test]
fn parser_terminates_on_garbage() {
    for seed in 1000..1200 {
        let input = garbage(seed, 512);
        let tree = SyntaxTree::parse(&input);
        let covered: String = tree.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(covered, input);
    }
}

#[test]
fn linting_never_panics_and_is_ordered() {
    let linter = recommended();
    for input in inputs() {
        let diagnostics = linter.lint(Path::new("Sources/App/Fuzz.swift"), &input);
        assert!(diagnostics.iter().all(|d| d.code != "SW003"), "rule panicked on {input:?}");
        assert!(diagnostics
            .windows(2)
            .all(|w| w[0].sort_key() <= w[1].sort_key()));
    }
}

#[test]
fn long_member_chains_stay_linear() {
    let links = 20_000;
    let input = format!("let v = a{}\n", ".b".repeat(links));
    let started = Instant::now();

    let tree = SyntaxTree::parse(&input);
    let chain = nodes(&tree)
        .into_iter()
        .filter(|n| n.kind() == NodeKind::MemberAccessExpr)
        .count();
    assert_eq!(chain, links);
    let last = tree.tokens().len() - 2;
    assert_eq!(tree.owner(last).kind(), NodeKind::MemberAccessExpr);

    let diagnostics = recommended().lint(Path::new("Sources/App/Chain.swift"), &input);
    assert!(diagnostics.iter().all(|d| d.code != "SW003"));
    assert!(
        started.elapsed() < Duration::from_secs(20),
        "{links} links took {:?}",
        started.elapsed()
    );
}

#[test]
fn output_is_independent_of_registration_order() {
    let forward = recommended();
    let mut builder = Linter::builder();
    for rule in all_rules().into_iter().rev() {
        builder = builder.rule_box(rule);
    }
    let reversed = builder.build().unwrap();

    for input in inputs() {
        let path = Path::new("Sources/App/Order.swift");
        let first = forward.lint(path, &input);
        assert_eq!(first, forward.lint(path, &input));
        assert_eq!(first, reversed.lint(path, &input));
    }
}

#[test]
fn suppressed_violations_never_appear() {
    let linter = recommended();
    let path = Path::new("Sources/App/Main.swift");
    let plain = "func f() {\n  let v = value!\n}\n";
    let marked = "func f() {\n  // swift-style: allow(force-unwrap)\n  let v = value!\n}\n";
    let other_rule = "func f() {\n  // swift-style: allow(SW105)\n  let v = value!\n}\n";

    let count = |source: &str| {
        linter
            .lint(path, source)
            .iter()
            .filter(|d| d.code == "SW301")
            .count()
    };
    assert_eq!(count(plain), 1);
    assert_eq!(count(marked), 0);
    assert_eq!(count(other_rule), 1);
}

#[test]
fn layout_and_naming_fixes_are_idempotent() {
    let mut builder = Linter::builder();
    for rule in Preset::Recommended.rules() {
        if matches!(rule.category(), Category::Layout | Category::Naming) {
            builder = builder.rule_box(rule);
        }
    }
    let linter = builder.build().unwrap();
    let path = Path::new("Sources/App/Main.swift");

    for input in SAMPLES {
        let first = linter.fix(path, input);
        let second = linter.fix(path, &first.output);
        if first.converged {
            assert!(second.fixed.is_empty(), "second pass edited {:?}", first.output);
            assert_eq!(second.output, first.output);
        }
    }
}

#[test]
fn recommended_defaults_match_config() {
    let config = Config::default();
    let linter = swift_style::linter_from_config(config).unwrap();
    assert_eq!(linter.rule_count(), all_rules().len());
}
