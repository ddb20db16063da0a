//! End-to-end tests for proto3 compilation.
//!
//! These build a small but realistic multi-namespace program and verify the
//! complete pipeline: path resolution → rendering → files on disk.

use std::fs;

use irproto_core::ir::{
    Class, ClassProperty, Enum, Namespace, Program, ScalarType, TypeRef, ONEOF_MARKER,
};
use irproto_core::{CompileMode, CompilerConfig, Error, Proto3Compiler};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Two namespaces where `Pegasus.Game` references `Bnet.Protocol`.
fn test_program() -> Program {
    let bnet = Namespace::new("Bnet.Protocol")
        .class(
            Class::new("EntityId")
                .property(ClassProperty::scalar("High", ScalarType::Fixed64, 1))
                .property(ClassProperty::scalar("Low", ScalarType::Fixed64, 2)),
        )
        .enumeration(
            Enum::new("ErrorCode")
                .value("OK", 0)
                .value("DENIED", 2)
                .value("REFUSED", 2),
        );

    let game = Namespace::new("Pegasus.Game")
        .class(
            Class::new("Option")
                .property(ClassProperty::scalar("Id", ScalarType::Int32, 1))
                .property(ClassProperty::scalar("Text", ScalarType::String, 2))
                .property(ClassProperty::scalar("Number", ScalarType::Int64, 3))
                .property(
                    ClassProperty::reference("Owner", TypeRef::new("Bnet.Protocol", "EntityId"), 4)
                        .repeated()
                        .packed(false),
                )
                .nested_enum(
                    Enum::new(ONEOF_MARKER)
                        .value("None", 0)
                        .value("Text", 2)
                        .value("Number", 3),
                )
                .nested_enum(Enum::new("Kind").value("PLAY", 1)),
        )
        .class(Class::new("Internal").private(true))
        .enumeration(Enum::new("Zone").value("DECK", 1).value("HAND", 3));

    Program::new().namespace(game).namespace(bnet)
}

#[test]
fn per_namespace_files_are_written() {
    let dir = TempDir::new().unwrap();
    let config = CompilerConfig::new()
        .output_dir(dir.path())
        .package_structured(true);

    let program = test_program();
    let report = Proto3Compiler::new(&program, config).compile().unwrap();

    assert_eq!(report.mode, CompileMode::PerNamespace);
    assert_eq!(
        report.written,
        vec!["bnet/protocol.proto", "pegasus/game.proto"]
    );
    assert_eq!(report.stats.units, 2);
    assert_eq!(report.stats.oneofs, 1);

    let game = fs::read_to_string(dir.path().join("pegasus").join("game.proto")).unwrap();
    assert_eq!(
        game,
        "syntax = \"proto3\";\n\
         package pegasus.game;\n\
         \n\
         // irproto compiled unit\n\
         \n\
         import \"bnet/protocol.proto\";\n\
         \n\
         message Option {\n\
         \tenum Kind {\n\
         \t\tKind_Kind_AUTO_INVALID = 0;\n\
         \t\tKind_PLAY = 1;\n\
         \t}\n\
         \n\
         \tint32 id = 1;\n\
         \toneof message {\n\
         \t\tstring text = 2;\n\
         \t\tint64 number = 3;\n\
         \t}\n\
         \trepeated bnet.protocol.EntityId owner = 4;\n\
         }\n\
         \n\
         enum Zone {\n\
         \tZone_Zone_AUTO_INVALID = 0;\n\
         \tZone_DECK = 1;\n\
         \tZone_HAND = 3;\n\
         }\n\
         \n"
    );

    let bnet = fs::read_to_string(dir.path().join("bnet").join("protocol.proto")).unwrap();
    assert!(bnet.starts_with("syntax = \"proto3\";\npackage bnet.protocol;\n"));
    assert!(!bnet.contains("import"));
    let alias = bnet.find("option allow_alias = true;").unwrap();
    let ok = bnet.find("ErrorCode_OK = 0;").unwrap();
    let denied = bnet.find("ErrorCode_DENIED = 2;").unwrap();
    let refused = bnet.find("ErrorCode_REFUSED = 2;").unwrap();
    assert!(alias < ok && ok < denied && denied < refused);
    assert_eq!(bnet.matches("allow_alias").count(), 1);
}

#[test]
fn flat_layout_uses_dotted_file_names() {
    let dir = TempDir::new().unwrap();
    let program = test_program();
    let report = Proto3Compiler::new(&program, CompilerConfig::new().output_dir(dir.path()))
        .compile()
        .unwrap();

    assert_eq!(
        report.written,
        vec!["bnet.protocol.proto", "pegasus.game.proto"]
    );
    let game = fs::read_to_string(dir.path().join("pegasus.game.proto")).unwrap();
    assert!(game.contains("import \"bnet.protocol.proto\";"));
}

#[test]
fn dump_mode_writes_single_file() {
    let dir = TempDir::new().unwrap();
    let config = CompilerConfig::new()
        .output_dir(dir.path())
        .dump_mode(true)
        .dump_file_name("everything.proto");

    let program = test_program();
    let report = Proto3Compiler::new(&program, config).compile().unwrap();
    assert_eq!(report.mode, CompileMode::DumpAll);
    assert_eq!(report.written, vec!["everything.proto"]);

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let dump = fs::read_to_string(dir.path().join("everything.proto")).unwrap();
    assert!(dump.starts_with("syntax = \"proto3\";\n\n"));
    assert!(!dump.contains("package "));
    assert!(!dump.contains("import "));
    assert!(!dump.contains("Internal"));

    // Program order, not name order
    let game = dump.find("//----- Begin Game -----").unwrap();
    let protocol = dump.find("//----- Begin Protocol -----").unwrap();
    assert!(game < protocol);

    // Enums before classes within a section
    let zone = dump.find("enum Zone {").unwrap();
    let option = dump.find("message Option {").unwrap();
    assert!(zone < option);
}

#[test]
fn output_is_deterministic() {
    let program = test_program();
    let config = CompilerConfig::new().package_structured(true);
    let first = Proto3Compiler::new(&program, config.clone())
        .render_units()
        .unwrap();
    let second = Proto3Compiler::new(&program, config).render_units().unwrap();
    assert_eq!(first, second);
}

#[test]
fn rendered_units_match_written_files() {
    let dir = TempDir::new().unwrap();
    let program = test_program();
    let compiler = Proto3Compiler::new(&program, CompilerConfig::new().output_dir(dir.path()));

    let units = compiler.render_units().unwrap();
    compiler.compile().unwrap();
    for unit in units {
        let on_disk = fs::read_to_string(dir.path().join(&unit.path)).unwrap();
        assert_eq!(on_disk, unit.content);
    }
}

#[test]
fn existing_files_are_truncated() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("bnet.protocol.proto");
    fs::write(&target, "x".repeat(64 * 1024)).unwrap();

    let program = test_program();
    Proto3Compiler::new(&program, CompilerConfig::new().output_dir(dir.path()))
        .compile()
        .unwrap();

    let content = fs::read_to_string(&target).unwrap();
    assert!(content.starts_with("syntax"));
    assert!(!content.contains("xxxx"));
}

#[test]
fn blocked_directory_aborts_run() {
    let dir = TempDir::new().unwrap();
    // A regular file where the "bnet" directory has to go
    fs::write(dir.path().join("bnet"), "").unwrap();

    let program = test_program();
    let config = CompilerConfig::new()
        .output_dir(dir.path())
        .package_structured(true);
    let err = Proto3Compiler::new(&program, config).compile().unwrap_err();

    assert!(err.is_filesystem());
    assert!(matches!(err, Error::DirectoryCreate { .. }));
    // The run stopped before the second namespace
    assert!(!dir.path().join("pegasus").exists());
}

#[test]
fn colliding_namespaces_are_rejected_before_writing() {
    let dir = TempDir::new().unwrap();
    let program = Program::new()
        .namespace(Namespace::new("Game.Net"))
        .namespace(Namespace::new("game.net"));

    let err = Proto3Compiler::new(&program, CompilerConfig::new().output_dir(dir.path()))
        .compile()
        .unwrap_err();
    assert!(matches!(err, Error::PathCollision { .. }));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn duplicate_namespace_identity_is_rejected_before_writing() {
    let dir = TempDir::new().unwrap();
    let program = Program::new()
        .namespace(Namespace::new("Game").class(Class::new("A")))
        .namespace(Namespace::new("Game").class(Class::new("B")));

    let err = Proto3Compiler::new(&program, CompilerConfig::new().output_dir(dir.path()))
        .compile()
        .unwrap_err();
    assert!(matches!(err, Error::PathCollision { .. }));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn escaping_dump_file_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("out");
    let config = CompilerConfig::new()
        .output_dir(&root)
        .dump_mode(true)
        .dump_file_name("../escaped.proto");

    let err = Proto3Compiler::new(&test_program(), config)
        .compile()
        .unwrap_err();
    assert!(matches!(err, Error::PathTraversal { ref name } if name == "../escaped.proto"));
    assert!(!dir.path().join("escaped.proto").exists());
    assert!(!root.exists());
}
