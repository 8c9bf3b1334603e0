use serde_json::{json, Map, Value};
use tessera_document::{BlockRegistry, Document, FieldKind, InMemoryRegistry, TemplateWarning};
use tessera_generator::{BlockGenerator, GeneratorError, GENERATED_CATEGORY};

const HERO: &str = r#"<div class="hero"><h2>Title</h2><img src="x.jpg" alt="y"></div>"#;

fn sample(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), json!(v))).collect()
}

#[test]
fn test_full_pipeline() {
    let mut draft = BlockGenerator::new().analyze(HERO, "Hero Banner").unwrap();
    assert_eq!(draft.report().element_count, 3);

    // Configure
    draft.rename_field("heading", "title").unwrap();
    draft.remove_field("image").unwrap();
    draft.set_icon("star");

    let fields: Vec<(&str, FieldKind)> = draft.fields().iter().map(|f| (f.name.as_str(), f.kind)).collect();
    assert_eq!(fields, vec![("title", FieldKind::Text)]);
    assert!(draft.template().contains("<h2>${content.title}</h2>"));
    assert!(draft.template().contains(r#"<img src="x.jpg" alt="y" />"#));

    // Preview
    let preview = draft.preview(&sample(&[("title", "Summer sale")]));
    assert!(preview.warnings.is_empty());
    assert!(preview.output.contains("<h2>Summer sale</h2>"));

    // Save
    let mut registry = InMemoryRegistry::with_builtins();
    let definition = draft.save(&mut registry, false).unwrap();
    assert_eq!(definition.block_type, "hero-banner");
    assert_eq!(definition.category, GENERATED_CATEGORY);
    assert_eq!(definition.icon, "star");
    assert_eq!(
        definition.default_compiled_html.as_deref(),
        Some(r#"<div class="tessera-generated "><div class="hero"><h2>Title</h2><img src="x.jpg" alt="y" /></div></div>"#)
    );
    assert!(registry.contains("hero-banner"));

    // New instances render the default markup
    let mut doc = Document::new("landing");
    doc.insert_block(&registry, "hero-banner", 0).unwrap();
    let block = &doc.blocks()[0];
    assert!(block.locked);
    assert_eq!(block.compiled_html, definition.default_compiled_html);
}

#[test]
fn test_field_configuration_errors() {
    let mut draft = BlockGenerator::new().analyze(HERO, "Hero").unwrap();

    assert!(matches!(
        draft.rename_field("heading", "image"),
        Err(GeneratorError::DuplicateField(name)) if name == "image"
    ));
    assert!(matches!(
        draft.rename_field("heading", "two words"),
        Err(GeneratorError::InvalidFieldName(_))
    ));
    assert!(matches!(draft.remove_field("nope"), Err(GeneratorError::UnknownField(_))));
    assert!(matches!(
        draft.retype_field("nope", FieldKind::Url),
        Err(GeneratorError::UnknownField(_))
    ));

    draft.retype_field("image", FieldKind::Url).unwrap();
    assert_eq!(draft.fields()[1].kind, FieldKind::Url);
    assert!(draft.template().contains(r#"src="${content.image}""#));
}

#[test]
fn test_custom_template_keeps_unknown_tokens() {
    let mut draft = BlockGenerator::new().analyze("<h2>Title</h2>", "Title").unwrap();
    draft.set_template("<h2>${content.heading}</h2><p>${content.subtitle}</p>");

    let preview = draft.preview(&Map::new());
    assert_eq!(preview.output, "<h2>Title</h2><p>${content.subtitle}</p>");
    assert_eq!(
        preview.warnings,
        vec![TemplateWarning::UnknownToken("${content.subtitle}".to_string())]
    );

    let mut registry = InMemoryRegistry::new();
    let definition = draft.save(&mut registry, false).unwrap();
    assert_eq!(
        definition.default_compiled_html.as_deref(),
        Some("<h2>Title</h2><p>${content.subtitle}</p>")
    );
}

#[test]
fn test_custom_template_follows_field_edits() {
    let mut draft = BlockGenerator::new()
        .analyze(r#"<a href="/shop?a=1&amp;b=2">Shop</a>"#, "Shop link")
        .unwrap();
    draft.set_template(r#"<a class="cta" href="${content.link_url}">${content.link}</a>"#);

    draft.rename_field("link", "label").unwrap();
    draft.remove_field("link_url").unwrap();

    assert!(draft.is_customized());
    assert_eq!(draft.template(), r#"<a class="cta" href="/shop?a=1&amp;b=2">${content.label}</a>"#);

    draft.reset_template();
    assert!(!draft.is_customized());
    assert_eq!(
        draft.template(),
        r#"<div class="tessera-generated ${settings.css_class}"><a href="/shop?a=1&amp;b=2">${content.label}</a></div>"#
    );
}

#[test]
fn test_inline_styles_are_kept() {
    let draft = BlockGenerator::new()
        .analyze(r#"<p style="color: red; margin-bottom: 1rem">Hi</p>"#, "Note")
        .unwrap();

    assert!(draft
        .template()
        .contains(r#"<p style="margin-bottom: 1rem; color: red">${content.text}</p>"#));
}

#[test]
fn test_overwrite_is_explicit() {
    let mut registry = InMemoryRegistry::new();
    let mut doc = Document::new("shop");
    let first = BlockGenerator::new().analyze("<h2>One</h2>", "Promo").unwrap();
    first.save(&mut registry, false).unwrap();
    doc.insert_block(&registry, "promo", 0).unwrap();
    let existing = doc.blocks()[0].compiled_html.clone();

    let second = BlockGenerator::new().analyze("<h3>Two</h3>", "Promo").unwrap();
    assert!(matches!(
        second.save(&mut registry, false),
        Err(GeneratorError::TypeExists(t)) if t == "promo"
    ));

    let mut settings = second.clone();
    settings.set_setting("css_class", "wide").unwrap();
    settings.save(&mut registry, true).unwrap();

    let saved = registry.get("promo").unwrap();
    assert!(saved.template.as_deref().unwrap_or_default().contains("<h3>"));
    assert_eq!(saved.settings.get("css_class").map(String::as_str), Some("wide"));
    assert_eq!(doc.blocks()[0].compiled_html, existing);
}
