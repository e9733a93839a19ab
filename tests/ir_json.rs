use p4_midend::error::Error;
use p4_midend::ir::builder::*;
use p4_midend::ir::{Direction, Program};
use p4_midend::midend::{MidendOptions, PassManager};

const EXAMPLE: &str = r#"{
  "declarations": [
    {
      "kind": "Control",
      "name": "ingress",
      "parameters": [{ "name": "hdr", "direction": "inout", "type": "headers_t" }],
      "locals": [
        {
          "kind": "Action",
          "name": "set_ttl",
          "body": {
            "components": [
              { "kind": "Declaration", "name": "x", "type": "bit<8>" },
              {
                "kind": "Assignment",
                "left": { "kind": "Path", "name": "x" },
                "right": { "kind": "Constant", "value": 3, "width": 8 }
              },
              {
                "kind": "Assignment",
                "left": {
                  "kind": "Member",
                  "expr": { "kind": "Path", "name": "hdr" },
                  "member": "ttl"
                },
                "right": {
                  "kind": "Binary",
                  "op": "add",
                  "left": { "kind": "Path", "name": "x" },
                  "right": { "kind": "Constant", "value": "0x1", "width": 8 }
                }
              }
            ]
          }
        }
      ],
      "body": {
        "components": [
          {
            "kind": "MethodCall",
            "call": {
              "method": { "kind": "Path", "name": "set_ttl" },
              "type": { "parameters": [] },
              "arguments": []
            }
          }
        ]
      }
    }
  ]
}"#;

fn expected() -> std::rc::Rc<Program> {
    program(vec![control(
        "ingress",
        vec![param("hdr", Direction::InOut, "headers_t")],
        vec![action(
            "set_ttl",
            vec![],
            block(vec![assign(
                member(path("hdr"), "ttl"),
                add(sized_constant(3, 8), sized_constant(1, 8)),
            )]),
        )],
        block(vec![call_statement(path("set_ttl"), vec![], vec![])]),
    )])
}

#[test]
fn test_json_program_is_optimized() {
    let program = Program::from_json(EXAMPLE).unwrap();
    let mut manager = PassManager::from_options(&MidendOptions::default()).unwrap();
    let result = manager.run(&program).unwrap();
    assert_eq!(*result, *expected());
}

#[test]
fn test_json_survives_serialization() {
    let program = Program::from_json(EXAMPLE).unwrap();
    let text = program.to_json().unwrap();
    let reparsed = Program::from_json(&text).unwrap();
    assert_eq!(*program, *reparsed);
}

#[test]
fn test_fixed_point_reaches_same_result() {
    let program = Program::from_json(EXAMPLE).unwrap();
    let options = MidendOptions {
        iterate_to_fixed_point: true,
        ..MidendOptions::default()
    };
    let mut manager = PassManager::from_options(&options).unwrap();
    let result = manager.run(&program).unwrap();
    assert_eq!(*result, *expected());
    assert_eq!(manager.iterations(), 2);
}

#[test]
fn test_malformed_json_is_reported() {
    let err = Program::from_json(r#"{ "declarations": [ { "kind": "Table" } ] }"#).unwrap_err();
    assert!(matches!(err, Error::MalformedIr { .. }));

    let err = Program::from_json(r#"{ "declarations": [ { "kind": "Variable", "name": "x", "type": "bit<8>", "initializer": { "kind": "Constant", "value": "12z" } } ] }"#)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedIr { .. }));
}

#[test]
fn test_dump_prints_p4() {
    let text = expected().to_string();
    assert!(text.contains("action set_ttl() {"));
    assert!(text.contains("hdr.ttl = 8w3 + 8w1;"));
    assert!(text.contains("set_ttl();"));
}
