use inkwell_doc_core::{BlockKind, Document, Editor, Node, Point, Selection};

fn bulleted(items: &[&str]) -> Node {
    Node::block(
        BlockKind::BulletedList,
        items.iter().map(|t| Node::list_item(*t)).collect(),
    )
}

fn block_kinds(doc: &Document) -> Vec<BlockKind> {
    doc.children
        .iter()
        .filter_map(|node| match node {
            Node::Block(block) => Some(block.kind),
            Node::Text(_) => None,
        })
        .collect()
}

fn assert_no_orphan_items(doc: &Document) {
    for node in &doc.children {
        let Node::Block(block) = node else {
            continue;
        };
        assert_ne!(
            block.kind,
            BlockKind::ListItem,
            "list item outside a container"
        );
        if block.kind.is_list_container() {
            assert!(!block.children.is_empty(), "empty list container");
            for child in &block.children {
                let Node::Block(item) = child else {
                    panic!("non-block child in a list container");
                };
                assert_eq!(item.kind, BlockKind::ListItem);
            }
        }
    }
}

#[test]
fn toggle_heading_twice_restores_paragraph() {
    let doc = Document {
        children: vec![Node::paragraph("title")],
    };
    let selection = Selection::collapsed(Point::new(vec![0, 0], 2));
    let mut editor = Editor::new(doc.clone(), Some(selection));

    editor.toggle_block(BlockKind::Heading1).unwrap();
    assert_eq!(block_kinds(editor.doc()), vec![BlockKind::Heading1]);

    editor.toggle_block(BlockKind::Heading1).unwrap();
    assert_eq!(editor.doc(), &doc);
}

#[test]
fn toggle_list_twice_restores_paragraph() {
    let doc = Document {
        children: vec![Node::paragraph("item")],
    };
    let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
    let mut editor = Editor::new(doc.clone(), Some(selection));

    editor.toggle_block(BlockKind::BulletedList).unwrap();
    let Node::Block(container) = &editor.doc().children[0] else {
        panic!("expected a block");
    };
    assert_eq!(container.kind, BlockKind::BulletedList);
    assert_eq!(container.children.len(), 1);
    assert_no_orphan_items(editor.doc());

    editor.toggle_block(BlockKind::BulletedList).unwrap();
    assert_eq!(editor.doc(), &doc);
}

#[test]
fn switching_list_kind_replaces_the_container() {
    let doc = Document {
        children: vec![bulleted(&["a", "b", "c"])],
    };
    let selection = Selection {
        anchor: Point::new(vec![0, 0, 0], 0),
        focus: Point::new(vec![0, 2, 0], 1),
    };
    let mut editor = Editor::new(doc, Some(selection));

    editor.toggle_block(BlockKind::NumberedList).unwrap();

    assert_eq!(editor.doc().children.len(), 1);
    let Node::Block(container) = &editor.doc().children[0] else {
        panic!("expected a block");
    };
    assert_eq!(container.kind, BlockKind::NumberedList);
    assert_eq!(container.children.len(), 3);
    assert_no_orphan_items(editor.doc());
}

#[test]
fn unwrapping_part_of_a_list_splits_the_container() {
    let doc = Document {
        children: vec![bulleted(&["a", "b", "c"])],
    };
    let selection = Selection {
        anchor: Point::new(vec![0, 1, 0], 0),
        focus: Point::new(vec![0, 1, 0], 1),
    };
    let mut editor = Editor::new(doc, Some(selection));

    editor.toggle_block(BlockKind::BulletedList).unwrap();

    assert_eq!(
        block_kinds(editor.doc()),
        vec![
            BlockKind::BulletedList,
            BlockKind::Paragraph,
            BlockKind::BulletedList,
        ]
    );
    let Node::Block(before) = &editor.doc().children[0] else {
        panic!("expected a block");
    };
    let Node::Block(after) = &editor.doc().children[2] else {
        panic!("expected a block");
    };
    assert_eq!(before.children.len(), 1);
    assert_eq!(after.children.len(), 1);
    assert_no_orphan_items(editor.doc());
}

#[test]
fn toggling_heading_inside_a_list_unwraps_first() {
    let doc = Document {
        children: vec![bulleted(&["a", "b"])],
    };
    let selection = Selection {
        anchor: Point::new(vec![0, 0, 0], 0),
        focus: Point::new(vec![0, 1, 0], 1),
    };
    let mut editor = Editor::new(doc, Some(selection));

    editor.toggle_block(BlockKind::Heading2).unwrap();

    assert_eq!(
        block_kinds(editor.doc()),
        vec![BlockKind::Heading2, BlockKind::Heading2]
    );
    assert_no_orphan_items(editor.doc());
}

#[test]
fn toggle_block_without_selection_is_a_no_op() {
    let doc = Document {
        children: vec![Node::paragraph("text")],
    };
    let mut editor = Editor::new(doc.clone(), None);

    editor.toggle_block(BlockKind::Heading1).unwrap();
    assert_eq!(editor.doc(), &doc);
}
