//! Integration tests for hover text.

use tfindex::{FileIndex, Index, Position, Uri, hover};

const MAIN: &str = "file:///ws/main.tf";

fn index_with(main: &str, other: &str) -> Index {
    let mut index = Index::new();
    for (path, code) in [("file:///ws/other.tf", other), (MAIN, main)] {
        let (file, _) = FileIndex::from_string(Uri::parse(path).unwrap(), code);
        index.add(file.expect("document should index"));
    }
    index
}

fn hover_text(index: &Index, line: u32, character: u32) -> Option<String> {
    let uri = Uri::parse(MAIN).unwrap();
    hover(index, &uri, Position::new(line, character))
        .expect("file-scoped hover never fails")
        .map(|h| h.contents)
}

#[test]
fn variable_shows_its_default() {
    let index = index_with(
        "output \"r\" {\n  value = var.region\n}\n",
        "variable \"region\" {\n  default = \"eu-west-1\"\n}\n",
    );

    assert_eq!(
        hover_text(&index, 1, 12).as_deref(),
        Some("default: \"eu-west-1\"")
    );
}

#[test]
fn variable_without_default_is_not_specified() {
    let index = index_with(
        "output \"r\" {\n  value = var.region\n}\n",
        "variable \"region\" {}\n",
    );

    assert_eq!(
        hover_text(&index, 1, 12).as_deref(),
        Some("`default` not specified")
    );
}

#[test]
fn local_shows_its_value_under_its_name() {
    let index = index_with(
        "output \"t\" {\n  value = local.tags\n}\n",
        "locals {\n  tags = {\n    env = \"prod\"\n  }\n}\n",
    );

    assert_eq!(
        hover_text(&index, 1, 12).as_deref(),
        Some("tags: { env = \"prod\" }")
    );
}

#[test]
fn resource_attribute_is_read_from_the_block() {
    let index = index_with(
        "output \"t\" {\n  value = aws_instance.web.instance_type\n}\n",
        "resource \"aws_instance\" \"web\" {\n  instance_type = \"t3.micro\"\n}\n",
    );

    assert_eq!(
        hover_text(&index, 1, 14).as_deref(),
        Some("instance_type: \"t3.micro\"")
    );
}

#[test]
fn computed_attribute_is_not_specified() {
    let index = index_with(
        "output \"ip\" {\n  value = aws_instance.web.private_ip\n}\n",
        "resource \"aws_instance\" \"web\" {}\n",
    );

    assert_eq!(
        hover_text(&index, 1, 14).as_deref(),
        Some("`private_ip` not specified")
    );
}

#[test]
fn splat_or_bare_target_has_no_hover() {
    let index = index_with(
        "output \"a\" {\n  value = aws_instance.web[*].id\n}\noutput \"b\" {\n  value = aws_instance.web\n}\n",
        "resource \"aws_instance\" \"web\" {}\n",
    );

    assert_eq!(hover_text(&index, 1, 14), None);
    assert_eq!(hover_text(&index, 4, 14), None);
}

#[test]
fn unknown_target_is_reported() {
    let index = index_with("output \"v\" {\n  value = module.vpc.id\n}\n", "");

    assert_eq!(
        hover_text(&index, 1, 12).as_deref(),
        Some("Unknown target `module.vpc`")
    );
}

#[test]
fn no_reference_under_cursor() {
    let index = index_with("output \"v\" {\n  value = var.a\n}\n", "variable \"a\" {}\n");

    assert_eq!(hover_text(&index, 0, 2), None);
}

#[test]
fn hover_range_is_the_reference() {
    let index = index_with(
        "output \"r\" {\n  value = var.region\n}\n",
        "variable \"region\" {}\n",
    );
    let uri = Uri::parse(MAIN).unwrap();

    let result = hover(&index, &uri, Position::new(1, 12)).unwrap().unwrap();

    assert_eq!(result.range.start, Position::new(1, 10));
    assert_eq!(result.range.end, Position::new(1, 20));
}
