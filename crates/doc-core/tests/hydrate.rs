use inkwell_doc_core::{
    Align, BlockKind, BlockNode, Document, Marks, Node, TextNode, hydrate, to_stored_json,
};

fn default_doc() -> Document {
    Document {
        children: vec![Node::paragraph("")],
    }
}

#[test]
fn malformed_payloads_yield_the_default_document() {
    for raw in ["", "42", "\"text\"", "{\"not\":\"an array\"}", "[1, 2, 3]"] {
        assert_eq!(hydrate(raw), default_doc(), "payload: {raw}");
    }
}

#[test]
fn empty_array_yields_the_default_document() {
    assert_eq!(hydrate("[]"), default_doc());
}

#[test]
fn stored_documents_round_trip() {
    let doc = Document {
        children: vec![
            Node::Block(BlockNode {
                kind: BlockKind::Heading2,
                align: Some(Align::Center),
                children: vec![Node::text("Title", Marks::default())],
            }),
            Node::Block(BlockNode {
                kind: BlockKind::Paragraph,
                align: None,
                children: vec![
                    Node::Text(TextNode {
                        text: "plain ".to_string(),
                        marks: Marks::default(),
                    }),
                    Node::Text(TextNode {
                        text: "bold".to_string(),
                        marks: Marks {
                            bold: true,
                            ..Marks::default()
                        },
                    }),
                ],
            }),
            Node::block(
                BlockKind::NumberedList,
                vec![Node::list_item("one"), Node::list_item("two")],
            ),
        ],
    };

    let raw = to_stored_json(&doc).unwrap();
    assert_eq!(hydrate(&raw), doc);
}

#[test]
fn unknown_block_kinds_hydrate_as_paragraphs() {
    let raw = r#"[{"node":"block","kind":"table","children":[{"node":"text","text":"x"}]}]"#;
    let doc = hydrate(raw);

    let Node::Block(block) = &doc.children[0] else {
        panic!("expected a block");
    };
    assert_eq!(block.kind, BlockKind::Paragraph);
    let Node::Text(leaf) = &block.children[0] else {
        panic!("expected a text leaf");
    };
    assert_eq!(leaf.text, "x");
    assert_eq!(leaf.marks, Marks::default());
}

#[test]
fn missing_children_are_repaired_on_hydration() {
    let raw = r#"[{"node":"block","kind":"paragraph"}]"#;
    let doc = hydrate(raw);
    assert_eq!(doc, default_doc());
}

#[test]
fn hydrated_lists_are_normalized() {
    // A list item stored outside a container reverts to a paragraph.
    let raw = r#"[{"node":"block","kind":"list_item","children":[{"node":"text","text":"a"}]}]"#;
    let doc = hydrate(raw);

    let Node::Block(block) = &doc.children[0] else {
        panic!("expected a block");
    };
    assert_eq!(block.kind, BlockKind::Paragraph);
}
