//! Integration tests for loading a workspace from disk.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tfindex::{
    Config, Error, Index, LoadErrorKind, QueryOptions, Scope, SectionType, Uri, WorkspaceFolder,
    load_workspace,
};

/// Create a temporary workspace with the given files.
/// Returns the temp directory (must be kept alive) and an index for it.
fn workspace_with_files(files: &[(&str, &str)]) -> (TempDir, Index) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    for (path, content) in files {
        let full_path = dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("failed to write file");
    }

    let root = fs::canonicalize(dir.path()).expect("canonical temp dir");
    let folder = WorkspaceFolder::new("ws", Uri::from_file_path(&root).expect("absolute path"));
    (dir, Index::with_folder(folder))
}

fn root(dir: &TempDir) -> std::path::PathBuf {
    fs::canonicalize(dir.path()).expect("canonical temp dir")
}

#[test]
fn empty_workspace_returns_zero_stats() {
    let (dir, mut index) = workspace_with_files(&[]);

    let stats = load_workspace(&mut index, &root(&dir), &Config::default()).unwrap();

    assert_eq!(stats.files_indexed, 0);
    assert_eq!(stats.sections_found, 0);
    assert!(stats.errors.is_empty());
}

#[test]
fn loads_nested_modules_and_skips_caches() {
    let (dir, mut index) = workspace_with_files(&[
        ("main.tf", "module \"vpc\" {\n  source = \"./modules/vpc\"\n}\n"),
        ("modules/vpc/main.tf", "variable \"cidr\" {}\noutput \"id\" {\n  value = var.cidr\n}\n"),
        (".terraform/modules/cached/main.tf", "variable \"cached\" {}\n"),
        ("terraform.tfvars", "cidr = \"10.0.0.0/16\"\n"),
    ]);

    let stats = load_workspace(&mut index, &root(&dir), &Config::default()).unwrap();

    assert_eq!(stats.files_indexed, 2);
    assert_eq!(stats.sections_found, 3);
    assert_eq!(stats.references_found, 1);
    assert!(index.section("var.cached").is_none());
    assert_eq!(index.groups().len(), 2);
}

#[test]
fn config_file_excludes_paths() {
    let (dir, mut index) = workspace_with_files(&[
        (".tfindex.yaml", "exclude:\n  - \"*.bak.tf\"\n"),
        ("main.tf", "variable \"a\" {}\n"),
        ("old.bak.tf", "variable \"b\" {}\n"),
    ]);
    let root = root(&dir);
    let config = Config::load(&root).unwrap();

    let stats = load_workspace(&mut index, &root, &config).unwrap();

    assert_eq!(stats.files_indexed, 1);
    assert_eq!(stats.files_excluded, 1);
    assert!(index.section("var.b").is_none());
}

#[test]
fn configured_extensions_are_indexed() {
    let (dir, mut index) = workspace_with_files(&[
        ("main.tf", "variable \"a\" {}\n"),
        ("extra.hcl", "variable \"b\" {}\n"),
    ]);
    let config = Config::from_yaml("extensions: [tf, hcl]\n").unwrap();

    load_workspace(&mut index, &root(&dir), &config).unwrap();

    let variables = index
        .query(
            Scope::AllFiles,
            &QueryOptions::new().section_type(SectionType::Variable),
        )
        .unwrap();
    assert_eq!(variables.len(), 2);
}

#[test]
fn invalid_utf8_is_collected_not_fatal() {
    let (dir, mut index) = workspace_with_files(&[("main.tf", "variable \"a\" {}\n")]);
    fs::write(dir.path().join("binary.tf"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let stats = load_workspace(&mut index, &root(&dir), &Config::default()).unwrap();

    assert_eq!(stats.files_indexed, 1);
    assert_eq!(stats.errors.len(), 1);
    assert_eq!(stats.errors[0].kind, LoadErrorKind::EncodingError);
    assert!(stats.errors[0].path.ends_with(Path::new("binary.tf")));
}

#[test]
fn diagnostics_are_counted() {
    let (dir, mut index) = workspace_with_files(&[(
        "main.tf",
        "resource \"only_type\" {}\nvariable \"a\" {}\nvariable \"a\" {}\n",
    )]);

    let stats = load_workspace(&mut index, &root(&dir), &Config::default()).unwrap();

    assert_eq!(stats.diagnostics, 2);
    assert_eq!(index.diagnostics().total(), 2);
}

#[test]
fn invalid_exclude_pattern_fails_the_load() {
    let (dir, mut index) = workspace_with_files(&[("main.tf", "")]);
    let config = Config {
        exclude: vec!["[".to_string()],
        ..Config::default()
    };

    let result = load_workspace(&mut index, &root(&dir), &config);

    assert!(matches!(result, Err(Error::InvalidGlob { .. })));
}
