//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use std::fs;

use scriptmeta_core::{
    is_preserved_comment, render, sha256_hex, Artifact, DirectiveValue, InjectionPipeline, Linter,
    MetadataConfig, MetadataError, MinifyContract, ViolationSeverity, BLOCK_CLOSE, BLOCK_OPEN,
    ENGINE_VERSION,
};

fn sample_config() -> MetadataConfig {
    MetadataConfig::from_json_str(
        r#"{
            "name": "Foo",
            "version": "1.0",
            "grant": ["unsafeWindow", "xmlHttpRequest"],
            "GM3Compat": true
        }"#,
    )
    .unwrap()
}

#[test]
fn invariant_end_to_end_header_text() {
    let block = render(&sample_config());
    let expected = "// ==UserScript==\n\
                    // @name Foo\n\
                    // @version 1.0\n\
                    // @grant unsafeWindow\n\
                    // @grant GM.xmlHttpRequest\n\
                    // @grant GM_xmlHttpRequest\n\
                    // ==/UserScript==\n\n";
    assert_eq!(block.to_text(), expected);
}

#[test]
fn invariant_injection_preserves_content() {
    let pipeline = InjectionPipeline::new(sample_config());
    let original = "(function(){\n  console.log('hi');\n})();\n";

    let report = pipeline.inject_all(&[Artifact {
        name: "foo.user.js".to_string(),
        content: original.to_string(),
    }]);

    assert_eq!(report.artifacts.len(), 1);
    let injected = &report.artifacts[0];

    // Exactly header + original, no byte of the original altered.
    assert_eq!(injected.content, format!("{}{}", report.header, original));
    assert!(injected.content.ends_with(original));
    assert_eq!(injected.header_bytes, report.header.len());
}

#[test]
fn invariant_empty_build_unit_is_noop() {
    let pipeline = InjectionPipeline::new(sample_config());
    let report = pipeline.inject_all(&[]);

    assert!(report.artifacts.is_empty());
    assert!(report.header.starts_with(BLOCK_OPEN));
    assert_eq!(report.engine_version, ENGINE_VERSION);
}

#[test]
fn invariant_double_injection_duplicates_header() {
    // Prepending is unconditional in the core; the duplicate guard lives
    // in the CLI adapter, not here.
    let pipeline = InjectionPipeline::new(sample_config());

    let first = pipeline.inject_all(&[Artifact {
        name: "foo.user.js".to_string(),
        content: "x();\n".to_string(),
    }]);
    let second = pipeline.inject_all(&[Artifact {
        name: "foo.user.js".to_string(),
        content: first.artifacts[0].content.clone(),
    }]);

    let blocks = second.artifacts[0].content.matches(BLOCK_OPEN).count();
    assert_eq!(blocks, 2);
}

#[test]
fn invariant_render_deterministic_across_pipelines() {
    let a = InjectionPipeline::new(sample_config());
    let b = InjectionPipeline::new(sample_config());

    assert_eq!(a.render_header().to_text(), b.render_header().to_text());
    assert_eq!(
        a.render_header().fingerprint(),
        b.render_header().fingerprint()
    );
}

#[test]
fn invariant_no_legacy_grants_without_compat() {
    let config = MetadataConfig::from_json_str(
        r#"{"name": "Foo", "version": "1.0", "grant": ["setValue", "getValue"]}"#,
    )
    .unwrap();

    let text = render(&config).to_text();
    assert!(!text.contains("GM_"));
    assert!(text.contains("// @grant GM.setValue"));
}

#[test]
fn invariant_compat_key_never_emitted() {
    let text = render(&sample_config()).to_text();
    assert!(!text.contains("GM3Compat"));
}

#[test]
fn invariant_declaration_order_survives() {
    let config = MetadataConfig::from_json_str(
        r#"{"version": "2.0", "author": "someone", "name": "Zed"}"#,
    )
    .unwrap();

    let lines = render(&config);
    assert_eq!(
        lines.directive_lines(),
        ["// @version 2.0", "// @author someone", "// @name Zed"]
    );
}

#[test]
fn invariant_set_replaces_in_place() {
    let mut config = MetadataConfig::new();
    config.set("name", DirectiveValue::Text("Foo".to_string()));
    config.set("version", DirectiveValue::Text("1.0".to_string()));
    config.set("name", DirectiveValue::Text("Bar".to_string()));

    let lines = render(&config);
    assert_eq!(lines.directive_lines(), ["// @name Bar", "// @version 1.0"]);
}

#[test]
fn invariant_shape_error_fails_load() {
    let result = MetadataConfig::from_json_str(r#"{"name": "Foo", "version": 2}"#);

    match result {
        Err(MetadataError::UnsupportedShape { key }) => assert_eq!(key, "version"),
        other => panic!("expected shape error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn invariant_mixed_array_fails_load() {
    let result = MetadataConfig::from_json_str(r#"{"grant": ["setValue", 7]}"#);
    assert!(matches!(
        result,
        Err(MetadataError::UnsupportedShape { .. })
    ));
}

#[test]
fn invariant_non_boolean_compat_fails_load() {
    let result = MetadataConfig::from_json_str(r#"{"GM3Compat": "yes"}"#);
    assert!(matches!(result, Err(MetadataError::CompatFlagShape)));
}

#[test]
fn invariant_non_object_document_fails_load() {
    let result = MetadataConfig::from_json_str(r#"["name", "Foo"]"#);
    assert!(matches!(result, Err(MetadataError::NotAnObject("array"))));
}

#[test]
fn invariant_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meta.json");
    fs::write(&path, r#"{"name": "Foo", "version": "1.0"}"#).unwrap();

    let config = MetadataConfig::load_from_file(&path).unwrap();
    assert_eq!(config.len(), 2);
    assert!(!config.gm3_compat());
}

#[test]
fn invariant_content_hash_matches_final_bytes() {
    let pipeline = InjectionPipeline::new(sample_config());
    let report = pipeline.inject_all(&[Artifact {
        name: "foo.user.js".to_string(),
        content: "y();\n".to_string(),
    }]);

    let injected = &report.artifacts[0];
    assert_eq!(
        injected.content_hash,
        sha256_hex(injected.content.as_bytes())
    );
    assert_eq!(
        report.header_fingerprint,
        sha256_hex(report.header.as_bytes())
    );
}

#[test]
fn invariant_every_header_line_survives_minification() {
    let text = render(&sample_config()).to_text();

    for line in text.lines().filter(|l| !l.is_empty()) {
        assert!(
            is_preserved_comment(line),
            "line would be stripped by the minifier: {:?}",
            line
        );
    }
}

#[test]
fn invariant_minify_contract_names_delimiters() {
    let contract = MinifyContract::current();
    assert_eq!(contract.block_open, BLOCK_OPEN);
    assert_eq!(contract.block_close, BLOCK_CLOSE);
    assert!(contract.markers.contains(&"@license"));
    assert!(!is_preserved_comment("// just a comment"));
}

#[test]
fn invariant_lint_requires_name_and_version() {
    let config = MetadataConfig::from_json_str(r#"{"description": "no identity"}"#).unwrap();
    let result = Linter::new().check(&config);

    assert!(!result.valid);
    assert!(result.has_errors());
    let errored: Vec<_> = result
        .violations
        .iter()
        .filter(|v| v.severity == ViolationSeverity::Error)
        .filter_map(|v| v.directive.as_deref())
        .collect();
    assert!(errored.contains(&"name"));
    assert!(errored.contains(&"version"));
}

#[test]
fn invariant_lint_warns_on_unknown_capability() {
    let config = MetadataConfig::from_json_str(
        r#"{
            "name": "Foo",
            "version": "1.0",
            "match": ["https://example.com/*"],
            "grant": ["unsafeWindow", "teleport"]
        }"#,
    )
    .unwrap();
    let result = Linter::new().check(&config);

    // Warnings do not make the metadata uninstallable.
    assert!(result.valid);
    assert!(result
        .violations
        .iter()
        .any(|v| v.severity == ViolationSeverity::Warning && v.message.contains("teleport")));
}

#[test]
fn invariant_lint_accepts_complete_metadata() {
    let config = MetadataConfig::from_json_str(
        r#"{
            "name": "Foo",
            "version": "1.0",
            "match": ["https://example.com/*"],
            "grant": ["setValue", "xmlHttpRequest"]
        }"#,
    )
    .unwrap();
    let result = Linter::new().check(&config);

    assert!(result.valid);
    assert!(result.violations.is_empty());
}
