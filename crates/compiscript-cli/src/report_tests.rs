use compiscript_compiler::{analyze, lower_program};
use compiscript_tac::program_to_string;

use super::report::{Report, symbols};

#[test]
fn ok_report_with_ir() {
    let analysis =
        analyze("function sum(a: integer, b: integer): integer { return a + b; }").unwrap();
    let mut report = Report::build(&analysis, false);
    assert!(report.ok);
    assert!(report.errors.is_empty());

    let lowered = lower_program(&analysis.ast).unwrap();
    report.ir = Some(program_to_string(&lowered.program));

    insta::assert_snapshot!(serde_json::to_string_pretty(&report).unwrap(), @r#"
    {
      "ok": true,
      "errors": [],
      "ir": "function sum(a, b):\nL0:\n  t0 = a + b\n  return t0"
    }
    "#);
}

#[test]
fn failing_report_carries_codes_and_positions() {
    let analysis = analyze("let x: integer;\nlet x: integer;").unwrap();
    let report = Report::build(&analysis, false);
    assert!(!report.ok);
    assert_eq!(report.errors.len(), 1);

    insta::assert_snapshot!(serde_json::to_string_pretty(&report).unwrap(), @r#"
    {
      "ok": false,
      "errors": [
        {
          "code": "E101",
          "message": "duplicate identifier `x`",
          "line": 2,
          "col": 1
        }
      ]
    }
    "#);
}

#[test]
fn irgen_failures_map_to_a_single_e_irgen_error() {
    let analysis = analyze("try { print(1); } catch (e) { print(2); }").unwrap();
    let mut report = Report::build(&analysis, false);
    assert!(report.ok, "try/catch type-checks fine");

    let error = lower_program(&analysis.ast).unwrap_err();
    report.record_irgen_failure(&error);

    assert!(!report.ok);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code.as_str(), "E_IRGEN");
    assert!(report.errors[0].line.is_none());
}

#[test]
fn symbols_report_shape() {
    let source = r#"
        let total: integer = 0;
        const GREETING: string = "hi";
        function outer(a: integer): integer {
          function inner(b: integer): integer { return a + b; }
          return inner(1);
        }
        class Dog {
          let name: string;
          function speak(): string { return this.name; }
        }
    "#;
    let analysis = analyze(source).unwrap();
    assert!(analysis.is_ok(), "{}", analysis.diagnostics.summary());

    let symbols = symbols(&analysis.tables);
    insta::assert_snapshot!(serde_json::to_string_pretty(&symbols).unwrap(), @r#"
    {
      "globals": [
        {
          "name": "total",
          "kind": "var",
          "type": "integer"
        },
        {
          "name": "GREETING",
          "kind": "const",
          "type": "string"
        },
        {
          "name": "outer",
          "kind": "func",
          "ret": "integer",
          "captured": []
        },
        {
          "name": "Dog",
          "kind": "class"
        }
      ],
      "classes": {
        "Dog": [
          {
            "name": "name",
            "kind": "field",
            "type": "string",
            "mutable": true
          },
          {
            "name": "speak",
            "kind": "method",
            "ret": "string"
          }
        ]
      },
      "functions": {
        "::outer": {
          "params": [
            {
              "name": "a",
              "type": "integer"
            }
          ],
          "return": "integer",
          "captured": []
        },
        "::outer::inner": {
          "params": [
            {
              "name": "b",
              "type": "integer"
            }
          ],
          "return": "integer",
          "captured": [
            "a"
          ]
        },
        "Dog::speak": {
          "params": [],
          "return": "string",
          "captured": []
        }
      }
    }
    "#);
}
