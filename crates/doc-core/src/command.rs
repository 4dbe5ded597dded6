use std::ops::Range;

use crate::export::{ExportParagraph, serialize_document};
use crate::model::{
    Align, BlockKind, BlockPatch, Document, Mark, Marks, Node, PathError, Point, RangeError,
    Selection, block_at_mut, clamp_selection, clamp_to_char_boundary, first_text_point, normalize,
    set_block_properties, unwrap_list_containers, wrap,
};
use crate::query::{
    BlockLabel, block_index_of_point, current_block_label, is_align_active, is_block_active,
    is_mark_active_at_focus, is_point_in_block, point_for_global_offset, point_global_offset,
    text_blocks_in_order, unhang,
};

#[derive(Debug)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PathError> for CommandError {
    fn from(value: PathError) -> Self {
        CommandError::new(value.0)
    }
}

impl From<RangeError> for CommandError {
    fn from(value: RangeError) -> Self {
        CommandError::new(value.0)
    }
}

/// The command/query surface the UI layer talks to. Commands are atomic: they
/// mutate a clone of the tree and commit only on success, so a failed command
/// leaves the document untouched. A missing selection makes every command a
/// successful no-op.
pub struct Editor {
    doc: Document,
    selection: Option<Selection>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(
            Document::default(),
            Some(Selection::collapsed(Point::new(vec![0, 0], 0))),
        )
    }
}

impl Editor {
    pub fn new(doc: Document, selection: Option<Selection>) -> Self {
        let mut doc = doc;
        normalize(&mut doc);
        let selection = selection.map(|s| clamp_selection(&doc, &s));
        Self { doc, selection }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Owned copy of the tree as it stands right now, for deferred consumers.
    pub fn snapshot(&self) -> Document {
        self.doc.clone()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.map(|s| clamp_selection(&self.doc, &s));
    }

    pub fn replace_document(&mut self, doc: Document) {
        self.doc = doc;
        normalize(&mut self.doc);
        self.selection = self
            .selection
            .take()
            .map(|s| clamp_selection(&self.doc, &s));
    }

    pub fn toggle_mark(&mut self, mark: Mark) -> Result<(), CommandError> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if selection.is_collapsed() {
            // Pending caret marks are the host editor's concern.
            return Ok(());
        }

        let target = !is_mark_active_at_focus(&self.doc, &selection, mark);
        let mut doc = self.doc.clone();
        let selection_after = apply_mark_range(&mut doc, &selection, mark, target)?;
        normalize(&mut doc);
        tracing::debug!(?mark, target, "toggled mark");
        self.commit(doc, Some(selection_after));
        Ok(())
    }

    pub fn toggle_block(&mut self, kind: BlockKind) -> Result<(), CommandError> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };

        let active = is_block_active(&self.doc, &selection, kind);
        let mut doc = self.doc.clone();
        let (start, end) = unhang(&doc, &selection);

        // Endpoint offsets within their blocks, so the selection can be
        // rebuilt once the block structure has changed.
        let (start_global, end_global) = {
            let blocks = text_blocks_in_order(&doc);
            let start_global = block_index_of_point(&blocks, &start)
                .map(|ix| {
                    let block = &blocks[ix];
                    let leaf = start.path.get(block.path.len()).copied().unwrap_or(0);
                    point_global_offset(&block.block.children, leaf, start.offset)
                })
                .unwrap_or(0);
            let end_global = block_index_of_point(&blocks, &end)
                .map(|ix| {
                    let block = &blocks[ix];
                    let leaf = block.block.children.len();
                    let leaf = end.path.get(block.path.len()).copied().unwrap_or(leaf);
                    point_global_offset(&block.block.children, leaf, end.offset)
                })
                .unwrap_or(usize::MAX);
            (start_global, end_global)
        };

        // Any enclosing list container is dissolved first so switching
        // between list kinds never leaves a stale container behind.
        let covered = unwrap_list_containers(&mut doc, &start, &end)?;

        let covered = if active {
            set_covered_kinds(&mut doc, covered.clone(), BlockKind::Paragraph)?;
            covered
        } else if kind.is_list_container() {
            set_covered_kinds(&mut doc, covered.clone(), BlockKind::ListItem)?;
            if covered.is_empty() {
                covered
            } else {
                wrap(&mut doc, &[], covered.clone(), kind)?;
                covered.start..covered.start + 1
            }
        } else {
            set_covered_kinds(&mut doc, covered.clone(), kind)?;
            covered
        };

        normalize(&mut doc);
        let selection_after = selection_for_covered(&doc, covered, start_global, end_global);
        tracing::debug!(?kind, active, "toggled block");
        self.commit(doc, selection_after);
        Ok(())
    }

    pub fn toggle_align(&mut self, align: Align) -> Result<(), CommandError> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };

        let mut doc = self.doc.clone();
        let (start, end) = unhang(&doc, &selection);

        // Each block flips on its own prior value, independently.
        let jobs: Vec<(Vec<usize>, Option<Align>)> = {
            let blocks = text_blocks_in_order(&doc);
            let Some(start_ix) = block_index_of_point(&blocks, &start) else {
                return Ok(());
            };
            let Some(end_ix) = block_index_of_point(&blocks, &end) else {
                return Ok(());
            };
            let (start_ix, end_ix) = if start_ix <= end_ix {
                (start_ix, end_ix)
            } else {
                (end_ix, start_ix)
            };
            blocks[start_ix..=end_ix]
                .iter()
                .map(|b| {
                    let next = if b.block.align == Some(align) {
                        None
                    } else {
                        Some(align)
                    };
                    (b.path.clone(), next)
                })
                .collect()
        };

        for (path, next) in jobs {
            set_block_properties(
                &mut doc,
                &path,
                &BlockPatch {
                    kind: None,
                    align: Some(next),
                },
            )?;
        }

        normalize(&mut doc);
        tracing::debug!(?align, "toggled alignment");
        self.commit(doc, None);
        Ok(())
    }

    pub fn query_active_mark(&self, mark: Mark) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|s| is_mark_active_at_focus(&self.doc, s, mark))
    }

    pub fn query_active_block(&self, kind: BlockKind) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|s| is_block_active(&self.doc, s, kind))
    }

    pub fn query_active_align(&self, align: Align) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|s| is_align_active(&self.doc, s, align))
    }

    pub fn current_block_label(&self) -> BlockLabel {
        self.selection
            .as_ref()
            .map(|s| current_block_label(&self.doc, s))
            .unwrap_or(BlockLabel::Normal)
    }

    /// Flattens the tree as it stands at this call; the records share nothing
    /// with the live tree.
    pub fn export_document(&self) -> Vec<ExportParagraph> {
        serialize_document(&self.doc)
    }

    fn commit(&mut self, doc: Document, selection_after: Option<Selection>) {
        self.doc = doc;
        let next = selection_after.or_else(|| self.selection.take());
        self.selection = next.map(|s| clamp_selection(&self.doc, &s));
    }
}

fn set_covered_kinds(
    doc: &mut Document,
    covered: Range<usize>,
    kind: BlockKind,
) -> Result<(), PathError> {
    for i in covered {
        if matches!(doc.children.get(i), Some(Node::Block(_))) {
            set_block_properties(
                doc,
                &[i],
                &BlockPatch {
                    kind: Some(kind),
                    align: None,
                },
            )?;
        }
    }
    Ok(())
}

fn selection_for_covered(
    doc: &Document,
    covered: Range<usize>,
    start_global: usize,
    end_global: usize,
) -> Option<Selection> {
    if covered.is_empty() {
        return first_text_point(doc).map(Selection::collapsed);
    }
    let blocks = text_blocks_in_order(doc);
    let mut in_covered = blocks.iter().filter(|b| covered.contains(&b.path[0]));
    let first = in_covered.next()?;
    let last = in_covered.last().unwrap_or(first);
    Some(Selection {
        anchor: point_for_global_offset(&first.path, &first.block.children, start_global),
        focus: point_for_global_offset(&last.path, &last.block.children, end_global),
    })
}

fn apply_mark_range(
    doc: &mut Document,
    selection: &Selection,
    mark: Mark,
    on: bool,
) -> Result<Selection, PathError> {
    let (start, end) = unhang(doc, selection);

    let mut jobs: Vec<(Vec<usize>, usize, usize)> = Vec::new();
    let anchor_block;
    let focus_block;
    {
        let blocks = text_blocks_in_order(doc);
        let start_ix = block_index_of_point(&blocks, &start)
            .ok_or_else(|| PathError("Selection start is not in a text block".into()))?;
        let end_ix = block_index_of_point(&blocks, &end)
            .ok_or_else(|| PathError("Selection end is not in a text block".into()))?;
        let (start_ix, end_ix) = if start_ix <= end_ix {
            (start_ix, end_ix)
        } else {
            (end_ix, start_ix)
        };

        for (ix, block) in blocks.iter().enumerate().take(end_ix + 1).skip(start_ix) {
            let children = &block.block.children;
            let total = block.block.text_len();
            if total == 0 {
                continue;
            }
            let start_global = if ix == start_ix {
                let leaf = start.path.get(block.path.len()).copied().unwrap_or(0);
                point_global_offset(children, leaf, start.offset)
            } else {
                0
            };
            let end_global = if ix == end_ix {
                let leaf = end
                    .path
                    .get(block.path.len())
                    .copied()
                    .unwrap_or(children.len());
                point_global_offset(children, leaf, end.offset)
            } else {
                total
            };
            if start_global >= end_global {
                continue;
            }
            jobs.push((block.path.clone(), start_global, end_global));
        }

        anchor_block = point_block_offset(&blocks, &selection.anchor);
        focus_block = point_block_offset(&blocks, &selection.focus);
    }

    for (path, start_global, end_global) in &jobs {
        let block = block_at_mut(doc, path)?;
        block.children = apply_marks_in_block(&block.children, *start_global, *end_global, mark, on);
    }

    let remap = |point: &Point, info: &Option<(Vec<usize>, usize)>| -> Point {
        let Some((block_path, global)) = info else {
            return point.clone();
        };
        if !jobs.iter().any(|(path, _, _)| path == block_path) {
            return point.clone();
        }
        match crate::model::node_at(doc, block_path) {
            Ok(Node::Block(block)) => point_for_global_offset(block_path, &block.children, *global),
            _ => point.clone(),
        }
    };

    Ok(Selection {
        anchor: remap(&selection.anchor, &anchor_block),
        focus: remap(&selection.focus, &focus_block),
    })
}

fn point_block_offset(
    blocks: &[crate::query::TextBlockRef<'_>],
    point: &Point,
) -> Option<(Vec<usize>, usize)> {
    let block = blocks.iter().find(|b| is_point_in_block(point, &b.path))?;
    let leaf = point.path.last().copied().unwrap_or(0);
    Some((
        block.path.clone(),
        point_global_offset(&block.block.children, leaf, point.offset),
    ))
}

fn apply_marks_in_block(
    children: &[Node],
    start_global: usize,
    end_global: usize,
    mark: Mark,
    on: bool,
) -> Vec<Node> {
    if start_global >= end_global {
        return children.to_vec();
    }

    let mut out: Vec<Node> = Vec::new();
    let mut cursor = 0usize;

    for node in children {
        let Node::Text(t) = node else {
            out.push(node.clone());
            continue;
        };
        let node_start = cursor;
        let node_end = cursor + t.text.len();
        cursor = node_end;

        if end_global <= node_start || start_global >= node_end {
            out.push(node.clone());
            continue;
        }

        let sel_start = start_global.saturating_sub(node_start).min(t.text.len());
        let sel_end = end_global.saturating_sub(node_start).min(t.text.len());
        let sel_start = clamp_to_char_boundary(&t.text, sel_start);
        let sel_end = clamp_to_char_boundary(&t.text, sel_end);

        if sel_start == 0 && sel_end == t.text.len() {
            let mut next = t.clone();
            next.marks.set(mark, on);
            out.push(Node::Text(next));
            continue;
        }

        let prefix = &t.text[..sel_start];
        let middle = &t.text[sel_start..sel_end];
        let suffix = &t.text[sel_end..];

        if !prefix.is_empty() {
            out.push(Node::text(prefix, t.marks));
        }
        if !middle.is_empty() {
            out.push(Node::text(middle, t.marks.with(mark, on)));
        }
        if !suffix.is_empty() {
            out.push(Node::text(suffix, t.marks));
        }
    }

    if out.is_empty() {
        out.push(Node::text("", Marks::default()));
    }

    out
}
