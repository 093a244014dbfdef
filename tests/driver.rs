use std::fs;

use kabsa::{
    ast::{Node, NumberKind},
    driver::{Driver, DriverError, Phase},
    listing,
};

use tempfile::tempdir;

fn quiet(directory: &std::path::Path, unit: &str) -> Driver<Vec<u8>> {
    Driver::new(directory, unit).with_error_stream(Vec::new())
}

fn root_number(driver: &Driver<Vec<u8>>) -> (f64, NumberKind) {
    match driver.ast().map(|ast| ast.root()) {
        Some(Node::Number(number)) => (number.value(), number.kind()),
        other => panic!("expected a numeric root, found {:?}", other),
    }
}

#[test]
fn integer_literal_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("seven.kb");
    fs::write(&input, "7\n").unwrap();

    let mut driver = quiet(dir.path(), "seven");
    driver.parse_file(&input).unwrap();

    assert_eq!(driver.phase(), Phase::Succeeded);
    assert_eq!(root_number(&driver), (7.0, NumberKind::Integer));
}

#[test]
fn double_literal_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("pi.kb");
    fs::write(&input, "3.14").unwrap();

    let mut driver = quiet(dir.path(), "pi");
    driver.parse_file(&input).unwrap();

    assert_eq!(root_number(&driver), (3.14, NumberKind::Double));
}

#[test]
fn malformed_file_has_no_tree() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.kb");
    fs::write(&input, "1 +\n").unwrap();

    let mut driver = quiet(dir.path(), "bad");
    let result = driver.parse_file(&input);

    assert!(matches!(result, Err(DriverError::SyntaxFailure { .. })));
    assert_eq!(driver.phase(), Phase::Failed);
    assert!(driver.ast().is_none());
    assert!(!driver.error_stream().is_empty());
}

#[test]
fn missing_input_then_retry() {
    let dir = tempdir().unwrap();
    let mut driver = quiet(dir.path(), "retry");

    let result = driver.parse_file(dir.path().join("absent.kb"));
    assert!(matches!(result, Err(DriverError::InputUnavailable { .. })));
    assert!(driver.ast().is_none());
    assert!(driver.error_stream().is_empty());

    let input = dir.path().join("present.kb");
    fs::write(&input, "x = 2 * 3").unwrap();

    driver.parse_file(&input).unwrap();
    assert_eq!(driver.ast().unwrap().to_string(), "(= x (* 2 3))");
}

#[test]
fn reset_after_success() {
    let dir = tempdir().unwrap();
    let mut driver = quiet(dir.path(), "unit");
    driver.parse_reader("1".as_bytes(), "inline").unwrap();

    driver.reset();
    driver.reset();

    assert_eq!(driver.phase(), Phase::Idle);
    assert!(driver.ast().is_none());
    assert!(driver.location().is_none());
}

#[test]
fn output_into_missing_directory() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does").join("not").join("exist");

    let driver = quiet(&missing, "prog");
    match driver.write_output("ret\n") {
        Err(DriverError::Output { path, .. }) => assert_eq!(path, missing.join("prog.asm")),
        other => panic!("expected an output error, found {:?}", other),
    }
}

#[test]
fn output_is_overwritten() {
    let dir = tempdir().unwrap();
    let driver = quiet(dir.path(), "prog");

    let path = driver.write_output("first run, with a longer body\n").unwrap();
    assert_eq!(path, dir.path().join("prog.asm"));

    driver.write_output("second\n").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
}

#[test]
fn end_to_end_listing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("square.kb");
    fs::write(
        &input,
        "// cuadrado\nconst k = 3;\nfn sq(v) = v * v;\nsq(k)\n",
    )
    .unwrap();

    let mut driver = quiet(dir.path(), "square");
    driver.parse_file(&input).unwrap();

    let ast = driver.take_ast().unwrap();
    assert_eq!(driver.phase(), Phase::Idle);

    let mut content = Vec::new();
    listing::emit(&ast, driver.unit_name(), &mut content).unwrap();
    let path = driver.write_output(&content).unwrap();

    let written = fs::read_to_string(path).unwrap();
    assert!(written.starts_with("; kabsa listing for unit `square`\n"));
    assert!(written.contains("\tloadc   k\n"));
    assert!(written.contains("\tref     sq\n"));
    assert!(written.ends_with("\tret\n"));
}

#[test]
fn directory_as_input() {
    let dir = tempdir().unwrap();
    let mut driver = quiet(dir.path(), "dir");

    match driver.parse_file(dir.path()) {
        Err(DriverError::InputUnavailable { path, .. }) => assert_eq!(path, dir.path()),
        other => panic!("expected unavailable input, found {:?}", other),
    }

    assert_eq!(driver.phase(), Phase::Failed);
    assert!(driver.error_stream().is_empty());
}

#[test]
fn undecodable_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("latin1.kb");
    fs::write(&input, [b'1', 0xff, b'\n']).unwrap();

    let mut driver = quiet(dir.path(), "latin1");
    let result = driver.parse_file(&input);

    assert!(matches!(result, Err(DriverError::InputUnavailable { .. })));
    assert!(driver.error_stream().is_empty());
}

#[test]
fn assigned_constants_are_listed_as_constants() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("consts.kb");
    fs::write(&input, "const k = 1; k = 2").unwrap();

    let mut driver = quiet(dir.path(), "consts");
    driver.parse_file(&input).unwrap();

    let mut content = Vec::new();
    listing::emit(driver.ast().unwrap(), driver.unit_name(), &mut content).unwrap();

    let text = String::from_utf8(content).unwrap();
    assert!(!text.contains("\tload    k\n"));
    assert_eq!(text.matches("\tloadc   k\n").count(), 2);
}
