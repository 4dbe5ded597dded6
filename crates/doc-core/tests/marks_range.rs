use inkwell_doc_core::{Document, Editor, Mark, Marks, Node, Point, Selection};

fn leaves(doc: &Document, block: usize) -> Vec<(String, bool)> {
    let Node::Block(b) = &doc.children[block] else {
        panic!("expected a block");
    };
    b.children
        .iter()
        .map(|node| match node {
            Node::Text(t) => (t.text.clone(), t.marks.bold),
            Node::Block(_) => panic!("expected a text leaf"),
        })
        .collect()
}

#[test]
fn toggle_bold_splits_partially_covered_leaf() {
    let doc = Document {
        children: vec![Node::paragraph("hello")],
    };
    let selection = Selection {
        anchor: Point::new(vec![0, 0], 1),
        focus: Point::new(vec![0, 0], 4),
    };
    let mut editor = Editor::new(doc, Some(selection));

    editor.toggle_mark(Mark::Bold).unwrap();

    assert_eq!(
        leaves(editor.doc(), 0),
        vec![
            ("h".to_string(), false),
            ("ell".to_string(), true),
            ("o".to_string(), false),
        ]
    );
}

#[test]
fn toggle_bold_twice_over_a_full_leaf_is_identity() {
    let doc = Document {
        children: vec![Node::paragraph("hello")],
    };
    let selection = Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    };
    let mut editor = Editor::new(doc.clone(), Some(selection));

    editor.toggle_mark(Mark::Bold).unwrap();
    assert_eq!(leaves(editor.doc(), 0), vec![("hello".to_string(), true)]);

    editor.toggle_mark(Mark::Bold).unwrap();
    assert_eq!(editor.doc(), &doc);
}

#[test]
fn mark_activity_is_read_at_the_focus_leaf_only() {
    // "ab" plain + "cd" bold; the focus sits in the bold leaf, so toggling
    // removes bold everywhere even though part of the range is plain.
    let doc = Document {
        children: vec![Node::block(
            inkwell_doc_core::BlockKind::Paragraph,
            vec![
                Node::text("ab", Marks::default()),
                Node::text("cd", Marks::default().with(Mark::Bold, true)),
            ],
        )],
    };
    let selection = Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 1], 2),
    };
    let mut editor = Editor::new(doc, Some(selection));

    editor.toggle_mark(Mark::Bold).unwrap();

    assert_eq!(leaves(editor.doc(), 0), vec![("abcd".to_string(), false)]);
}

#[test]
fn toggle_mark_spans_block_boundaries() {
    let doc = Document {
        children: vec![Node::paragraph("ab"), Node::paragraph("cd")],
    };
    let selection = Selection {
        anchor: Point::new(vec![0, 0], 1),
        focus: Point::new(vec![1, 0], 1),
    };
    let mut editor = Editor::new(doc, Some(selection));

    editor.toggle_mark(Mark::Bold).unwrap();

    assert_eq!(
        leaves(editor.doc(), 0),
        vec![("a".to_string(), false), ("b".to_string(), true)]
    );
    assert_eq!(
        leaves(editor.doc(), 1),
        vec![("c".to_string(), true), ("d".to_string(), false)]
    );
}

#[test]
fn unhung_trailing_block_is_not_marked() {
    let doc = Document {
        children: vec![Node::paragraph("one"), Node::paragraph("two")],
    };
    let selection = Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![1, 0], 0),
    };
    let mut editor = Editor::new(doc, Some(selection));

    editor.toggle_mark(Mark::Bold).unwrap();

    assert_eq!(leaves(editor.doc(), 0), vec![("one".to_string(), true)]);
    assert_eq!(leaves(editor.doc(), 1), vec![("two".to_string(), false)]);
}

#[test]
fn toggle_mark_with_collapsed_selection_is_a_no_op() {
    let doc = Document {
        children: vec![Node::paragraph("text")],
    };
    let selection = Selection::collapsed(Point::new(vec![0, 0], 2));
    let mut editor = Editor::new(doc.clone(), Some(selection));

    editor.toggle_mark(Mark::Italic).unwrap();
    assert_eq!(editor.doc(), &doc);
}
