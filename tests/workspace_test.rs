//! ワークスペースの保存・復元と型引数の解釈のテスト

use std::fs;

use monomorph::error::WorkspaceError;
use monomorph::workspace::{GenericDecl, GenericKind};
use monomorph::{PackageBuilder, PackageDb, Type, Universe, Workspace};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use test_case::test_case;

fn emitted(ws: Workspace, name: &str, types: &[&str]) -> Vec<String> {
    let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
    let inst = ws.instantiate(None, name, &types).unwrap();
    inst.translator
        .new_decls()
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn test_json_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("workspace.json");
    fs::write(&path, Workspace::demo().to_json().unwrap()).unwrap();

    let loaded = Workspace::from_json(&fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(
        emitted(loaded, "Pair", &["int", "string"]),
        emitted(Workspace::demo(), "Pair", &["int", "string"])
    );
}

#[test]
fn test_loaded_workspace_keeps_declarations_indexed() {
    let json = Workspace::demo().to_json().unwrap();
    let loaded = Workspace::from_json(&json).unwrap();

    let main = loaded.package(None).unwrap();
    assert_eq!(main.name, "main");
    let map = main.scope["Map"];
    assert!(main.func(map).is_some());
    assert!(main.type_spec(main.scope["Pair"]).is_some());
}

#[test]
fn test_generic_declarations() {
    let ws = Workspace::demo();
    let decl = |name: &str, kind, params: &[&str], methods: &[&str]| GenericDecl {
        package: "main".to_string(),
        name: name.to_string(),
        kind,
        type_params: params.iter().map(|p| p.to_string()).collect(),
        methods: methods.iter().map(|m| m.to_string()).collect(),
    };

    assert_eq!(
        ws.generic_declarations(),
        vec![
            decl("Pair", GenericKind::Type, &["A", "B"], &["Swap", "First"]),
            decl("Map", GenericKind::Func, &["T1", "T2"], &[]),
            decl("Reverse", GenericKind::Func, &["T"], &[]),
            decl("Zero", GenericKind::Func, &["T"], &[]),
            decl("Apply", GenericKind::Func, &["T"], &[]),
            decl("Twice", GenericKind::Func, &["T"], &[]),
            decl("Stack", GenericKind::Type, &["T"], &["Push", "Pop"]),
        ]
    );
}

#[test_case("int", Type::int(); "basic")]
#[test_case(" string ", Type::string(); "surrounding spaces")]
#[test_case("[]int", Type::slice(Type::int()); "slice")]
#[test_case("*[]bool", Type::pointer(Type::slice(Type::bool())); "pointer to slice")]
#[test_case("[3]int", Type::Array { len: 3, elem: Box::new(Type::int()) }; "array")]
#[test_case(
    "map[string][]int",
    Type::Map { key: Box::new(Type::string()), value: Box::new(Type::slice(Type::int())) };
    "map"
)]
#[test_case(
    "map[[2]int]string",
    Type::Map {
        key: Box::new(Type::Array { len: 2, elem: Box::new(Type::int()) }),
        value: Box::new(Type::string()),
    };
    "map with array key"
)]
fn test_resolve_type(text: &str, expected: Type) {
    let ws = Workspace::demo();
    assert_eq!(ws.resolve_type(ws.main, text).unwrap(), expected);
}

#[test]
fn test_resolve_byte_alias() {
    let ws = Workspace::demo();
    let byte = ws.resolve_type(ws.main, "byte").unwrap();
    assert_eq!(byte.to_string(), "uint8");
}

#[test]
fn test_resolve_type_errors() {
    let ws = Workspace::demo();
    let resolve = |text: &str| ws.resolve_type(ws.main, text).unwrap_err();

    assert!(matches!(resolve("Pair"), WorkspaceError::GenericType { name } if name == "Pair"));
    assert!(matches!(resolve("Missing"), WorkspaceError::UnknownType { .. }));
    assert!(matches!(resolve("Map"), WorkspaceError::UnknownType { .. }));
    assert!(matches!(resolve("[x]int"), WorkspaceError::MalformedType { .. }));
    assert!(matches!(resolve("map[int"), WorkspaceError::MalformedType { .. }));
    assert!(matches!(resolve("Pair(int, int)"), WorkspaceError::MalformedType { .. }));
    assert!(matches!(resolve(""), WorkspaceError::MalformedType { .. }));
}

#[test]
fn test_instantiate_by_name() {
    let inst = Workspace::demo()
        .instantiate(None, "Map", &["int".to_string(), "[]string".to_string()])
        .unwrap();

    assert_eq!(inst.kind, GenericKind::Func);
    assert_eq!(inst.name, "Map_int_slice_string");
    assert_eq!(inst.translator.new_decls().len(), 1);
}

#[test]
fn test_instantiate_errors() {
    let err = Workspace::demo()
        .instantiate(Some("other"), "Map", &[])
        .err()
        .unwrap();
    assert!(matches!(err, WorkspaceError::UnknownPackage { name } if name == "other"));

    let err = Workspace::demo()
        .instantiate(None, "Missing", &[])
        .err()
        .unwrap();
    assert!(!err.is_fatal());
    assert_eq!(err.to_string(), "オブジェクトが見つかりません: Missing");

    let err = Workspace::demo()
        .instantiate(None, "Map", &["int".to_string()])
        .err()
        .unwrap();
    assert!(err.is_fatal());
}

#[test]
fn test_variable_cannot_be_instantiated() {
    let b = PackageBuilder::new(Universe::new(), "main");
    b.var_stmt("counter", Some(b.ident("int")), None);
    let (universe, package) = b.finish();
    let id = package.id;
    let mut db = PackageDb::new();
    db.insert(package);

    let err = Workspace::new(universe, db, id)
        .instantiate(None, "counter", &[])
        .err()
        .unwrap();

    assert!(matches!(err, WorkspaceError::NotInstantiable { name } if name == "counter"));
}

/// デモのワークスペースの JSON を書き換えてから読み込む
fn load_edited(edit: impl FnOnce(&mut serde_json::Value)) -> Result<Workspace, WorkspaceError> {
    let mut json: serde_json::Value =
        serde_json::from_str(&Workspace::demo().to_json().unwrap()).unwrap();
    edit(&mut json);
    Workspace::from_json(&json.to_string())
}

#[test]
fn test_unknown_main_package_is_rejected() {
    let err = load_edited(|json| json["main"] = 99.into()).unwrap_err();

    assert!(matches!(err, WorkspaceError::UnknownPackage { name } if name == "#99"));
}

#[test]
fn test_scope_entry_without_object_is_rejected() {
    let err = load_edited(|json| {
        json["packages"]["packages"]["main"]["scope"]["Map"] = 100_000.into();
    })
    .unwrap_err();

    assert!(matches!(
        &err,
        WorkspaceError::DanglingObject { owner, id } if owner == "Map" && *id == 100_000
    ));
    assert!(!err.is_fatal());
}

#[test]
fn test_package_id_outside_universe_is_rejected() {
    let err = load_edited(|json| {
        json["packages"]["packages"]["main"]["id"] = 42.into();
        json["main"] = 42.into();
    })
    .unwrap_err();

    assert!(matches!(err, WorkspaceError::UnknownPackage { name } if name == "main"));
}
