//! Document-level behaviour: persistence, duplication and reordering

use tessera_document::{
    Block, BlockMove, Breakpoint, Document, DocumentError, Element, ElementTree, ElementType,
    InMemoryRegistry, StyleState,
};

fn sample_document() -> Document {
    let registry = InMemoryRegistry::with_builtins();
    let mut doc = Document::new("product-42");
    doc.insert_block(&registry, "heading", 0).unwrap();
    doc.insert_block(&registry, "image", 1).unwrap();
    doc.insert_block(&registry, "custom-html", 2).unwrap();

    let block = doc.block_mut(2).unwrap();
    let tree = block.document.as_mut().unwrap();
    let root_id = tree.root.id.clone();
    tree.insert(
        &root_id,
        0,
        Element::new("hero", ElementType::Container, "div")
            .with_style(StyleState::Hover, Breakpoint::Mobile, "color", "blue")
            .with_child(Element::new("title", ElementType::Heading, "h2").with_content("Title")),
    )
    .unwrap();
    doc.take_events();
    doc
}

#[test]
fn test_serialization_round_trip() {
    let doc = sample_document();
    let json = doc.to_json().unwrap();
    let loaded = Document::from_json(&json).unwrap();

    assert_eq!(loaded, doc);
    let ids: Vec<&str> = loaded.blocks().iter().map(|b| b.id.as_str()).collect();
    let original: Vec<&str> = doc.blocks().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, original);
    assert_eq!(loaded.block(2).unwrap().document, doc.block(2).unwrap().document);
}

#[test]
fn test_persisted_shape_has_blocks_only() {
    let doc = sample_document();
    let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

    let object = value.as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), vec!["blocks"]);
    let block = &value["blocks"][2];
    assert!(block["document"]["root"].is_object());
    assert_eq!(block["locked"], serde_json::Value::Bool(false));
    assert_eq!(
        block["document"]["root"]["children"][0]["styles"]["hover"]["mobile"]["color"],
        "blue"
    );
}

#[test]
fn test_duplicate_assigns_fresh_ids() {
    let mut doc = sample_document();
    let source_id = doc.block(2).unwrap().id.clone();
    let copy_id = doc.duplicate_block(2).unwrap();

    assert_eq!(doc.len(), 4);
    let copy = doc.block(3).unwrap();
    assert_eq!(copy.id, copy_id);
    assert!(copy.locked);
    assert_eq!(copy.meta.cloned_from.as_deref(), Some(source_id.as_str()));

    let source_ids = doc.block(2).unwrap().document.as_ref().unwrap().ids();
    let copy_ids = copy.document.as_ref().unwrap().ids();
    assert_eq!(copy_ids.len(), source_ids.len());
    assert!(copy_ids.is_disjoint(&source_ids));
    assert!(copy_ids.iter().all(|id| id.starts_with(&copy_id)));
}

#[test]
fn test_duplicate_never_shares_the_source_cache() {
    let mut doc = Document::new("landing");
    let mut source = Block::from_html(
        "landing-1",
        "custom-html",
        "<style data-tessera-block=\"landing-1\">.tessera-content .tsr-landing-1-2{color:red}</style><h2 class=\"tsr-landing-1-2\">Hi</h2>",
    );
    source.document = Some(ElementTree::new(
        Element::fragment("landing-1-1")
            .with_child(Element::new("landing-1-2", ElementType::Heading, "h2").with_content("Hi")),
    ));
    doc.insert_existing(0, source).unwrap();
    let copy_id = doc.duplicate_block(0).unwrap();

    let copy = doc.block(1).unwrap();
    assert!(copy.locked);
    assert_eq!(copy.compiled_html, None);
    assert!(copy.document.as_ref().unwrap().ids().iter().all(|id| id.starts_with(&copy_id)));
    assert!(doc.block(0).unwrap().compiled_html.is_some());

    let imported = Block::from_html("", "custom-html", "<p>plain</p>");
    doc.insert_existing(2, imported).unwrap();
    doc.duplicate_block(2).unwrap();
    assert_eq!(doc.block(3).unwrap().compiled_html.as_deref(), Some("<p>plain</p>"));
}

#[test]
fn test_duplicate_out_of_range() {
    let mut doc = sample_document();
    let before = doc.clone();
    assert_eq!(doc.duplicate_block(3), Err(DocumentError::index(3, 3)));
    assert_eq!(doc, before);
}

#[test]
fn test_move_invertibility() {
    let doc = sample_document();
    for i in 0..doc.len() {
        for j in 0..=doc.len() {
            let mut moved = doc.clone();
            let landing = moved.move_block(i, j).unwrap();
            let back = BlockMove::new(i, j).inverse();
            assert_eq!(back.from, landing);

            moved.move_block(back.from, back.drop).unwrap();
            assert_eq!(moved, doc, "move {} -> {}", i, j);
        }
    }
}

#[test]
fn test_move_down_then_back_with_inverse_drop() {
    let mut doc = sample_document();
    let original = doc.clone();

    // moving block 0 to drop 3 lands at 2; dropping it at 0 restores the order
    assert_eq!(doc.move_block(0, 3), Ok(2));
    assert_eq!(doc.move_block(2, 0), Ok(0));
    assert_eq!(doc, original);
}

#[test]
fn test_move_out_of_range_is_rejected() {
    let mut doc = sample_document();
    let before = doc.clone();

    assert_eq!(doc.move_block(3, 0), Err(DocumentError::index(3, 3)));
    assert_eq!(doc.move_block(0, 4), Err(DocumentError::index(4, 3)));
    assert_eq!(doc, before);
}

#[test]
fn test_cycle_rejection_leaves_tree_unchanged() {
    let mut tree = ElementTree::new(
        Element::new("A", ElementType::Container, "div").with_child(
            Element::new("B", ElementType::Container, "div")
                .with_child(Element::new("C", ElementType::Container, "div")),
        ),
    );
    let before = tree.clone();

    let result = tree.move_element("A", "C", 0);
    assert!(matches!(result, Err(DocumentError::Cycle { .. })));
    assert_eq!(tree, before);
}

#[test]
fn test_plain_load_never_regenerates_ids() {
    let json = r#"{"blocks":[{"id":"custom","type":"text","locked":true,"compiledHtml":"<p>x</p>"}]}"#;
    let doc = Document::from_json(json).unwrap();
    let block: &Block = doc.block(0).unwrap();

    assert_eq!(block.id, "custom");
    assert_eq!(doc.index_of("custom"), Some(0));
}
