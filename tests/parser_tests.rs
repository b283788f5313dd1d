// Parser robustness tests for BCL
//
// Table driven suites run through a small harness, plus structural checks of
// the produced syntax tree.

use bluebook::ast::{Document, NodeKind, Value};
use bluebook::error::{BclError, ErrorKind};
use bluebook::parser::parse;
use pretty_assertions::assert_eq;

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub should_succeed: bool,
    pub expected_error_contains: Option<String>,
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    pub fn run(&self) -> TestSuiteResults {
        let mut results = TestSuiteResults::new(&self.name);

        println!("Running test suite: {}", self.name);
        println!("{}", "=".repeat(50));

        for test in &self.tests {
            let result = run_single_test(test);
            results.add_result(&test.name, result);
        }

        results.print_summary();
        results
    }
}

#[derive(Debug)]
pub struct TestSuiteResults {
    pub suite_name: String,
    pub results: Vec<(String, TestResult)>,
    pub passed: usize,
    pub failed: usize,
    pub crashed: usize,
}

impl TestSuiteResults {
    pub fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            results: Vec::new(),
            passed: 0,
            failed: 0,
            crashed: 0,
        }
    }

    pub fn add_result(&mut self, test_name: &str, result: TestResult) {
        match &result {
            TestResult::Pass => {
                self.passed += 1;
                println!("  ok   {}", test_name);
            }
            TestResult::Fail(msg) => {
                self.failed += 1;
                println!("  FAIL {}: {}", test_name, msg);
            }
            TestResult::Crash(msg) => {
                self.crashed += 1;
                println!("  CRASH {}: {}", test_name, msg);
            }
        }
        self.results.push((test_name.to_string(), result));
    }

    pub fn print_summary(&self) {
        println!();
        println!("Test Suite: {} - Summary", self.suite_name);
        println!("{}", "-".repeat(30));
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Crashed: {}", self.crashed);
        println!("Total:   {}", self.results.len());
        println!();
    }

    pub fn is_all_passed(&self) -> bool {
        self.crashed == 0 && self.failed == 0
    }
}

fn run_single_test(test: &TestCase) -> TestResult {
    // Panics count as crashes, not failures
    let result = std::panic::catch_unwind(|| parse_input(&test.input));

    match result {
        Ok(parse_result) => match (parse_result, test.should_succeed) {
            (Ok(_), true) => TestResult::Pass,
            (Ok(_), false) => {
                TestResult::Fail("Expected parsing to fail, but it succeeded".to_string())
            }
            (Err(error), false) => match &test.expected_error_contains {
                Some(expected) if !error.message.contains(expected) => TestResult::Fail(format!(
                    "Error message '{}' doesn't contain expected text '{}'",
                    error.message, expected
                )),
                _ => TestResult::Pass,
            },
            (Err(error), true) => TestResult::Fail(format!(
                "Expected parsing to succeed, but got error: {}",
                error.message
            )),
        },
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            TestResult::Crash(panic_msg)
        }
    }
}

fn parse_input(input: &str) -> Result<Document, BclError> {
    parse(input)
}

impl TestCase {
    pub fn should_succeed(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    pub fn should_fail(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: None,
        }
    }

    pub fn should_fail_with_message(name: &str, input: &str, expected_msg: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
        }
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_block_header_tests() -> TestSuite {
    let mut suite = TestSuite::new("Block Headers");

    suite.add_test(TestCase::should_succeed(
        "minimal_block",
        "resource \"http_step\" \"s1\" {}",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "string_at_top_level",
        "\"resource\" \"http_step\" \"s1\" {}",
        "Expected a block identifier",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_name",
        "resource \"http_step\" {}",
        "Expected the block name string",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_driver_and_name",
        "resource {}",
        "Expected the block driver string",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "identifier_as_name",
        "resource \"http_step\" s1 {}",
        "Expected the block name string",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_opening_brace",
        "resource \"http_step\" \"s1\" method = \"GET\" }",
        "Expected '{' after the block name",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unclosed_block",
        "resource \"http_step\" \"s1\" { method = \"GET\"",
        "Expected '}' after block",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "stray_closing_brace",
        "resource \"http_step\" \"s1\" {} }",
        "Expected a block identifier",
    ));
    suite.add_test(TestCase::should_fail("nested_block", "resource \"a\" \"b\" { inner \"c\" \"d\" {} }"));

    suite
}

fn create_expression_tests() -> TestSuite {
    let mut suite = TestSuite::new("Expressions");

    suite.add_test(TestCase::should_succeed(
        "string_value",
        "resource \"a\" \"b\" { url = \"http://x\" }",
    ));
    suite.add_test(TestCase::should_succeed(
        "heredoc_value",
        "resource \"a\" \"b\" {\n  body = <<<EOF\n{\"k\": \"v\"}\nEOF\n}",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_assign",
        "resource \"a\" \"b\" { url \"http://x\" }",
        "Expected '=' after field 'url'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_value",
        "resource \"a\" \"b\" { url = }",
        "Expected a string or a list",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "identifier_value",
        "resource \"a\" \"b\" { url = other }",
        "Expected a string or a list",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "string_as_field",
        "resource \"a\" \"b\" { \"url\" = \"x\" }",
        "Expected a field name",
    ));
    suite.add_test(TestCase::should_fail("double_assign", "resource \"a\" \"b\" { url = = \"x\" }"));

    suite
}

fn create_list_tests() -> TestSuite {
    let mut suite = TestSuite::new("Lists");

    suite.add_test(TestCase::should_succeed("empty_list", "resource \"a\" \"b\" { l = [] }"));
    suite.add_test(TestCase::should_succeed(
        "two_items",
        "resource \"a\" \"b\" { l = [\"x\", \"y\"] }",
    ));
    suite.add_test(TestCase::should_succeed(
        "trailing_comma",
        "resource \"a\" \"b\" { l = [\"x\", \"y\",] }",
    ));
    suite.add_test(TestCase::should_succeed(
        "multiline_list",
        "resource \"a\" \"b\" {\n  l = [\n    \"x\", # first\n    \"y\"\n  ]\n}",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_comma",
        "resource \"a\" \"b\" { l = [\"x\" \"y\"] }",
        "Expected ',' or ']' after list item",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "nested_list",
        "resource \"a\" \"b\" { l = [[\"x\"]] }",
        "Expected a string or ']' in list",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "leading_comma",
        "resource \"a\" \"b\" { l = [, \"x\"] }",
        "Expected a string or ']' in list",
    ));
    suite.add_test(TestCase::should_fail("unclosed_list", "resource \"a\" \"b\" { l = [\"x\" }"));

    suite
}

fn create_lexical_tests() -> TestSuite {
    let mut suite = TestSuite::new("Lexical Errors");

    suite.add_test(TestCase::should_fail_with_message(
        "unterminated_string",
        "resource \"a\" \"b\" { url = \"http://x }",
        "unterminated string",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "newline_in_string",
        "resource \"a\" \"b\" { url = \"http://\nx\" }",
        "string does not allow new lines",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unterminated_heredoc",
        "resource \"a\" \"b\" { body = <<<EOF\ntext\n}",
        "unterminated heredoc string",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unexpected_character",
        "resource \"a\" \"b\" { url = \"x\"; }",
        "unexpected character ';'",
    ));

    suite
}

fn create_edge_case_tests() -> TestSuite {
    let mut suite = TestSuite::new("Edge Cases");

    suite.add_test(TestCase::should_succeed("empty_input", ""));
    suite.add_test(TestCase::should_succeed("only_whitespace", "   \n\t  "));
    suite.add_test(TestCase::should_succeed("only_comments", "# one\n# two\n"));
    suite.add_test(TestCase::should_fail("eof_after_identifier", "resource"));
    suite.add_test(TestCase::should_fail("eof_after_assign", "resource \"a\" \"b\" { x ="));

    let many_blocks = "resource \"http_step\" \"s\" { method = \"GET\" }\n".repeat(200);
    suite.add_test(TestCase::should_succeed("many_blocks", &many_blocks));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_parser_tests() {
    let suites = vec![
        create_block_header_tests(),
        create_expression_tests(),
        create_list_tests(),
        create_lexical_tests(),
        create_edge_case_tests(),
    ];

    let mut all_passed = true;
    for suite in suites {
        if !suite.run().is_all_passed() {
            all_passed = false;
        }
    }
    assert!(all_passed, "some parser cases had unexpected results, see output above");
}

#[test]
fn document_structure() {
    let source = r#"
# globals
variable "string" "host" {
  default = "localhost"
}

resource "http_step" "login" {
  method = "POST"
  url = "http://${var.host}/login"
  headers = ["Content-Type", "application/json"]
  body = <<<EOF
{"user": "a"}
EOF
}
"#;

    let document = match parse(source) {
        Ok(document) => document,
        Err(e) => panic!("unexpected error: {}", e),
    };

    let references: Vec<String> = document.blocks.iter().map(|b| b.reference()).collect();
    assert_eq!(
        references,
        vec!["variable.string.host", "resource.http_step.login"]
    );

    let fields: Vec<String> = document.blocks[1]
        .expressions
        .iter()
        .map(|e| e.to_string())
        .collect();
    assert_eq!(
        fields,
        vec![
            "method = \"POST\"",
            "url = \"http://${var.host}/login\"",
            "headers = [\"Content-Type\", \"application/json\"]",
            "body = \"{\\\"user\\\": \\\"a\\\"}\"",
        ]
    );

    let login = &document.blocks[1];
    assert_eq!(login.kind(), NodeKind::Block);
    assert_eq!(login.id.kind(), NodeKind::Identifier);
    assert_eq!(login.driver.kind(), NodeKind::StringLiteral);
    let kinds: Vec<(NodeKind, NodeKind)> = login
        .expressions
        .iter()
        .map(|e| (e.kind(), e.value.kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (NodeKind::Expression, NodeKind::StringLiteral),
            (NodeKind::Expression, NodeKind::StringLiteral),
            (NodeKind::Expression, NodeKind::List),
            (NodeKind::Expression, NodeKind::StringLiteral),
        ]
    );
    match &login.expressions[2].value {
        Value::List(list) => assert_eq!(list.kind(), NodeKind::List),
        other => panic!("expected a list, got {}", other),
    }
}

#[test]
fn block_spans_cover_the_block() {
    let source = "resource \"a\" \"b\" { x = \"y\" }";
    let document = match parse(source) {
        Ok(document) => document,
        Err(e) => panic!("unexpected error: {}", e),
    };

    let block = &document.blocks[0];
    assert_eq!(&source[block.span.start..block.span.end], source);
    let expression = &block.expressions[0];
    assert_eq!(&source[expression.span.start..expression.span.end], "x = \"y\"");
}

#[test]
fn value_accessors_are_typed() {
    let document = match parse("resource \"a\" \"b\" { s = \"v\" l = [\"1\", \"2\"] }") {
        Ok(document) => document,
        Err(e) => panic!("unexpected error: {}", e),
    };
    let expressions = &document.blocks[0].expressions;

    assert!(matches!(expressions[0].value, Value::String(_)));
    assert_eq!(expressions[0].value_as_string("resource.a.b").ok(), Some("v"));
    assert!(expressions[0].value_as_list("resource.a.b").is_err());

    let list = match expressions[1].value_as_list("resource.a.b") {
        Ok(list) => list,
        Err(e) => panic!("unexpected error: {}", e),
    };
    assert_eq!(list.texts(), vec!["1", "2"]);
    assert!(expressions[1].value_as_string("resource.a.b").is_err());
}

#[test]
fn errors_carry_kind_and_line() {
    let error = match parse("resource \"a\" \"b\" {\n  url = \"x\n}") {
        Ok(_) => panic!("expected a lexical error"),
        Err(e) => e,
    };
    assert_eq!(error.kind, ErrorKind::LexError);
    assert_eq!(error.line, 2);

    let error = match parse("resource \"a\" \"b\" {\n\n  url \"x\"\n}") {
        Ok(_) => panic!("expected a parse error"),
        Err(e) => e,
    };
    assert_eq!(error.kind, ErrorKind::ParseError);
    assert_eq!(error.line, 3);
    assert!(error.help.is_some());
}
