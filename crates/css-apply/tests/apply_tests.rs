//! End-to-end property-set processing tests.

use std::io::Write;

use css_apply::{process, process_file, ApplyOptions, Error, PropertySets, WarningKind};
use css_apply_syntax::Document;
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn kinds(warnings: &[css_apply::Warning]) -> Vec<WarningKind> {
    warnings.iter().map(|w| w.kind).collect()
}

const MAIN_INPUT: &str = r#"
/**
 * Paste or drop some CSS here and explore
 * the syntax tree created by chosen parser.
 * Enjoy!
 */

:root {
  --color-black: black;
  /* should be removed */
  --toolbar-theme: {
    background-color: hsl(120, 70%, 95%);
    border-radius: 4px;
    border: 1px solid var(--theme-color late);

    @media (--viewportMedium) {
      font-size: 64px;
      line-height: 64px;
      letter-spacing: -1.5px;
      margin-top: 25px;
      margin-bottom: 23px;
    }
  }
  --toolbar-title-theme: {
    color: green;
  }
  --color-dark: #666666;
  --color-light: #f1f1f1;
  --with-parens: {
    color: tomato;
  }
  --blaa: {
    color: green;
  };
  --blaa2 {
    color: green;
  };
  --nested-set-one: {
    @apply --toolbar-theme;
  }
  --color-white: white;
  --nested-set-two: {
    @apply --with-parens;
    @apply --toolbar-title-theme;

    color: orange;
  }
}

.toolbar {
  @apply --toolbar-theme;
}

.toolbar > .title {
  @apply --toolbar-title-theme;
}

.with-parens {
  @apply (--with-parens);
}

.nested-set-one {
  @apply --nested-set-one;
}

.nested-set-two {
  @apply --nested-set-two;
}

.nested-deeper {
  @media screen {
    @apply --toolbar-theme;
  }
}

@media screen and (min-width: 480px) {
  body {
    background-color: lightgreen;
  }
}

#main {
  border: 1px solid black;
}

ul li {
  padding: 5px;
}
"#;

const MAIN_OUTPUT: &str = r#"
/**
 * Paste or drop some CSS here and explore
 * the syntax tree created by chosen parser.
 * Enjoy!
 */

:root {
  --color-black: black;
  --color-dark: #666666;
  --color-light: #f1f1f1;
  --color-white: white;
}

.toolbar {
  background-color: hsl(120, 70%, 95%);
  border-radius: 4px;
  border: 1px solid var(--theme-color late);

    @media (--viewportMedium) {
      font-size: 64px;
      line-height: 64px;
      letter-spacing: -1.5px;
      margin-top: 25px;
      margin-bottom: 23px;
    }
}

.toolbar > .title {
  color: green;
}

.with-parens {
  color: tomato;
}

.nested-set-one {
  background-color: hsl(120, 70%, 95%);
  border-radius: 4px;
  border: 1px solid var(--theme-color late);

    @media (--viewportMedium) {
      font-size: 64px;
      line-height: 64px;
      letter-spacing: -1.5px;
      margin-top: 25px;
      margin-bottom: 23px;
    }
}

.nested-set-two {
  color: tomato;
  color: green;

  color: orange;
}

.nested-deeper {
  @media screen {
  background-color: hsl(120, 70%, 95%);
  border-radius: 4px;
  border: 1px solid var(--theme-color late);

    @media (--viewportMedium) {
      font-size: 64px;
      line-height: 64px;
      letter-spacing: -1.5px;
      margin-top: 25px;
      margin-bottom: 23px;
    }
  }
}

@media screen and (min-width: 480px) {
  body {
    background-color: lightgreen;
  }
}

#main {
  border: 1px solid black;
}

ul li {
  padding: 5px;
}
"#;

const RULE_SYNTAX_INPUT: &str = r#"
:root {
  --color-white: white;
  --nested-set-two {
    color: orange;
  };
}
"#;

const RULE_SYNTAX_OUTPUT: &str = r#"
:root {
  --color-white: white;
}
"#;

const MISPLACED_INPUT: &str = r#"
:root {
  --should-be-removed: {
    content: 'gone';
  }
}

.should-warn--not-root {
  --wrong-placement: {
    color: green;
  }
}
.toolbar {
  @apply --wrong-placement;
}

.some-other-apply {
  @apply blaa;
}

.should-warn--not-declared {
  @apply --this-should-warn;
}
@media screen {
  @apply --toolbar-theme;
}
--should-warn-about-root-scope-and-be-removed: {
  color: green;
}
@apply --should-warn-about-root-scope-and-be-removed;
"#;

const MISPLACED_OUTPUT: &str = r#"
.should-warn--not-root {
  --wrong-placement: {
    color: green;
  }
}
.toolbar {
  @apply --wrong-placement;
}

.some-other-apply {
  @apply blaa;
}

.should-warn--not-declared {
  @apply --this-should-warn;
}
@media screen {
}
"#;

const MISPLACED_RULE_SYNTAX_INPUT: &str = r#"
:root {
  --should-be-removed {
    content: 'gone';
  }
}

.should-warn--not-root {
  --wrong-placement-2 {
    color: green;
  }
}
.toolbar {
  @apply --wrong-placement-2;
}

.should-warn--not-declared {
  @apply --this-should-warn;
}
--should-warn-about-root-scope-and-be-removed: {
  color: green;
}
@apply --should-warn-about-root-scope-and-be-removed;
"#;

const MISPLACED_RULE_SYNTAX_OUTPUT: &str = r#"
.should-warn--not-root {
  --wrong-placement-2 {
    color: green;
  }
}
.toolbar {
  @apply --wrong-placement-2;
}

.should-warn--not-declared {
  @apply --this-should-warn;
}
"#;

#[test]
fn test_sets_are_removed_and_applied() {
    init_tracing();
    let processed = process(MAIN_INPUT, &ApplyOptions::default()).unwrap();
    assert_eq!(processed.css, MAIN_OUTPUT);
    assert!(
        processed.warnings.is_empty(),
        "unexpected warnings: {:?}",
        processed.warnings
    );
}

#[test]
fn test_rule_syntax_set_is_removed() {
    let processed = process(RULE_SYNTAX_INPUT, &ApplyOptions::default()).unwrap();
    assert_eq!(processed.css, RULE_SYNTAX_OUTPUT);
    assert!(processed.warnings.is_empty());
}

// A top-level `--name: {` definition runs up to the next `;`, so the
// `@apply` that follows it in these documents is removed along with it.
#[test]
fn test_misplaced_sets_are_reported() {
    let processed = process(MISPLACED_INPUT, &ApplyOptions::default()).unwrap();
    assert_eq!(processed.css, MISPLACED_OUTPUT);
    assert_eq!(
        kinds(&processed.warnings),
        [
            WarningKind::MisplacedSet,
            WarningKind::MisplacedSet,
            WarningKind::UnknownSet,
            WarningKind::UnknownSet,
            WarningKind::OrphanedApply,
        ]
    );
    assert_eq!(
        processed.warnings[0].text,
        "Custom property set ignored: not scoped to top-level `:root` \
         (--wrong-placement declared in .should-warn--not-root)"
    );
    assert_eq!(
        processed.warnings[1].text,
        "Custom property set ignored: not scoped to top-level `:root` \
         (--should-warn-about-root-scope-and-be-removed)"
    );
    assert_eq!(
        processed.warnings[3].text,
        "No custom property set declared for `this-should-warn`."
    );
}

#[test]
fn test_misplaced_rule_syntax_sets_are_reported() {
    let processed = process(MISPLACED_RULE_SYNTAX_INPUT, &ApplyOptions::default()).unwrap();
    assert_eq!(processed.css, MISPLACED_RULE_SYNTAX_OUTPUT);
    assert_eq!(
        kinds(&processed.warnings),
        [
            WarningKind::MisplacedSet,
            WarningKind::MisplacedSet,
            WarningKind::UnknownSet,
            WarningKind::UnknownSet,
        ]
    );
    assert_eq!(
        processed.warnings[1].text,
        "Custom property set ignored: not scoped to top-level `:root` \
         (--wrong-placement-2 declared in .should-warn--not-root)"
    );
}

#[test]
fn test_processing_is_idempotent() {
    let options = ApplyOptions::default();
    let once = process(MAIN_INPUT, &options).unwrap();
    let twice = process(&once.css, &options).unwrap();
    assert_eq!(twice.css, once.css);
    assert!(twice.warnings.is_empty());
}

#[test]
fn test_later_definition_overrides() {
    let css = ":root {\n  --a: {\n    color: red;\n  }\n  --a: {\n    color: blue;\n  }\n}\n.x {\n  @apply --a;\n}\n";
    let processed = process(css, &ApplyOptions::default()).unwrap();
    assert_eq!(processed.css, ".x {\n  color: blue;\n}\n");
}

#[test]
fn test_rule_and_declaration_forms_override_each_other() {
    // Declarations are extracted before rules, so the rule form wins. A
    // rule-form set keeps its own indentation, which is added on use.
    let css = ":root {\n  --a {\n    color: red;\n  }\n  --a: {\n    color: blue;\n  }\n}\n.x {\n  @apply --a;\n}\n";
    let processed = process(css, &ApplyOptions::default()).unwrap();
    assert_eq!(processed.css, ".x {\n    color: red;\n}\n");
}

#[test]
fn test_nested_set_defined_after_use() {
    let css = ":root {\n  --outer: {\n    @apply --inner;\n    margin: 0;\n  }\n  --inner: {\n    color: red;\n  }\n}\n.x {\n  @apply --outer;\n}\n";
    let processed = process(css, &ApplyOptions::default()).unwrap();
    assert_eq!(processed.css, ".x {\n  color: red;\n  margin: 0;\n}\n");
}

#[test]
fn test_dangling_reference_is_left_in_place() {
    let css = ".x {\n  @apply --nowhere;\n}\n";
    let processed = process(css, &ApplyOptions::default()).unwrap();
    assert_eq!(processed.css, css);
    assert_eq!(kinds(&processed.warnings), [WarningKind::UnknownSet]);
}

#[test]
fn test_circular_sets_terminate() {
    let css = ":root {\n  --a: {\n    @apply --b;\n    color: red;\n  }\n  --b: {\n    @apply --a;\n    margin: 0;\n  }\n}\n.x {\n  @apply --a;\n}\n.y {\n  @apply --b;\n}\n";
    let processed = process(css, &ApplyOptions::default()).unwrap();
    assert_eq!(
        processed.css,
        ".x {\n  margin: 0;\n  color: red;\n}\n.y {\n  margin: 0;\n}\n"
    );
    assert_eq!(kinds(&processed.warnings), [WarningKind::CircularApply]);
}

#[test]
fn test_preserve_keeps_rule_form_definitions() {
    let css = ":root {\n  --a {\n    color: red;\n  }\n}\n.x {\n  @apply --a;\n}\n";
    let processed = process(css, &ApplyOptions::new().preserve(true)).unwrap();
    assert_eq!(
        processed.css,
        ":root {\n  --a {\n    color: red;\n  }\n}\n.x {\n    color: red;\n}\n"
    );
}

#[test]
fn test_predefined_sets() {
    let options = ApplyOptions::new()
        .with_set("--brand", "color: tomato;")
        .with_set("spacing", "margin: 0;");
    let css = ".x {\n  @apply --brand;\n  @apply (--spacing);\n}\n";
    let processed = process(css, &options).unwrap();
    assert_eq!(processed.css, ".x {color: tomato;margin: 0;\n}\n");
}

#[test]
fn test_document_overrides_predefined_set() {
    let options = ApplyOptions::new().with_set("brand", "color: tomato;");
    let css = ":root {\n  --brand: {\n    color: navy;\n  }\n}\n.x {\n  @apply --brand;\n}\n";
    let processed = process(css, &options).unwrap();
    assert_eq!(processed.css, ".x {\n  color: navy;\n}\n");
}

#[test]
fn test_options_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "preserve = true\n\n[sets]\n\"--brand\" = \"color: tomato;\"").unwrap();

    let options = ApplyOptions::load(file.path()).unwrap();
    assert!(options.preserve);
    assert_eq!(options.sets.get("--brand").map(String::as_str), Some("color: tomato;"));
}

#[test]
fn test_process_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("theme.css");
    std::fs::write(&path, RULE_SYNTAX_INPUT).unwrap();

    let processed = process_file(&path, &ApplyOptions::default()).unwrap();
    assert_eq!(processed.css, RULE_SYNTAX_OUTPUT);

    let err = process_file(dir.path().join("missing.css"), &ApplyOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_resolving_references_one_at_a_time() {
    let mut doc = Document::parse(MAIN_INPUT).unwrap();
    let mut sets = PropertySets::new(ApplyOptions::default());
    sets.prepare(&mut doc).unwrap();
    assert_eq!(
        sets.registry().names().collect::<Vec<_>>(),
        [
            "toolbar-theme",
            "toolbar-title-theme",
            "with-parens",
            "blaa",
            "nested-set-one",
            "nested-set-two",
            "blaa2",
        ]
    );

    // Resolve in reverse document order; the result must not depend on it.
    let mut references = doc.at_rules(doc.root(), css_apply::APPLY).unwrap();
    references.reverse();
    for apply in references {
        sets.resolve(&mut doc, apply).unwrap();
    }
    assert_eq!(doc.to_css(), MAIN_OUTPUT);
}

#[test]
fn test_text_after_set_body_is_kept() {
    let css = ":root {\n  --a: {\n    @apply --b;\n  }\n  --color-white: white;\n  --b: {\n    color: red;\n  }\n}\n.x {\n  @apply --a;\n}\n";
    let processed = process(css, &ApplyOptions::default()).unwrap();
    assert_eq!(
        processed.css,
        ":root {\n  --color-white: white;\n}\n.x {\n  color: red;\n}\n"
    );
    assert!(processed.warnings.is_empty());
}
