use serde::{Deserialize, Serialize};

use crate::model::{Align, BlockKind, BlockNode, Document, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMarkerKind {
    Bullet,
    Numbered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMarker {
    pub kind: ListMarkerKind,
    /// Always 0: multi-level nesting is unsupported.
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
}

/// One flattened paragraph-equivalent record of the export artifact. A single
/// block may produce several of these (one per list item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportParagraph {
    pub runs: Vec<ExportRun>,
    pub align: Align,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<HeadingLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListMarker>,
}

/// Flattens the tree into the ordered paragraph sequence handed to the
/// external packaging collaborator. Read-only; never fails.
pub fn serialize_document(doc: &Document) -> Vec<ExportParagraph> {
    let mut out = Vec::new();
    for node in &doc.children {
        serialize_node(node, &mut out);
    }
    out
}

fn serialize_node(node: &Node, out: &mut Vec<ExportParagraph>) {
    match node {
        Node::Text(_) => {
            // A stray leaf still exports as a paragraph of its own.
            out.push(ExportParagraph {
                runs: collect_runs(std::slice::from_ref(node)),
                align: Align::Left,
                heading: None,
                list: None,
            });
        }
        Node::Block(block) => match block.kind {
            BlockKind::Heading1 => out.push(heading_paragraph(block, HeadingLevel::H1)),
            BlockKind::Heading2 => out.push(heading_paragraph(block, HeadingLevel::H2)),
            BlockKind::Heading3 => out.push(heading_paragraph(block, HeadingLevel::H3)),
            BlockKind::BulletedList | BlockKind::NumberedList => {
                let marker_kind = if block.kind == BlockKind::BulletedList {
                    ListMarkerKind::Bullet
                } else {
                    ListMarkerKind::Numbered
                };
                for child in &block.children {
                    match child {
                        Node::Block(item) if item.kind == BlockKind::ListItem => {
                            out.push(ExportParagraph {
                                runs: collect_runs(&item.children),
                                align: item.align.unwrap_or(Align::Left),
                                heading: None,
                                list: Some(ListMarker {
                                    kind: marker_kind,
                                    level: 0,
                                }),
                            });
                        }
                        other => serialize_node(other, out),
                    }
                }
            }
            // CodeBlock is serialized identically to Paragraph, and a list
            // item outside a container falls back to the same mapping.
            BlockKind::Paragraph | BlockKind::CodeBlock | BlockKind::ListItem => {
                out.push(ExportParagraph {
                    runs: collect_runs(&block.children),
                    align: block.align.unwrap_or(Align::Left),
                    heading: None,
                    list: None,
                });
            }
        },
    }
}

fn heading_paragraph(block: &BlockNode, level: HeadingLevel) -> ExportParagraph {
    ExportParagraph {
        runs: collect_runs(&block.children),
        align: block.align.unwrap_or(Align::Left),
        heading: Some(level),
        list: None,
    }
}

fn collect_runs(children: &[Node]) -> Vec<ExportRun> {
    let mut runs = Vec::new();
    for node in children {
        match node {
            Node::Text(t) => runs.push(ExportRun {
                text: t.text.clone(),
                bold: t.marks.bold,
                italic: t.marks.italic,
                strike: t.marks.strikethrough,
                underline: t.marks.underline,
            }),
            Node::Block(block) => runs.extend(collect_runs(&block.children)),
        }
    }
    runs
}
