use crate::model::{
    Align, BlockKind, BlockNode, Document, Mark, Node, Path, Point, Selection, clamp_to_char_boundary,
    node_at,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLabel {
    Normal,
    H1,
    H2,
    H3,
}

pub(crate) struct TextBlockRef<'a> {
    pub path: Path,
    pub block: &'a BlockNode,
}

/// Leaf text blocks in document order, descending through list containers.
pub(crate) fn text_blocks_in_order(doc: &Document) -> Vec<TextBlockRef<'_>> {
    fn walk<'a>(children: &'a [Node], path: &mut Path, out: &mut Vec<TextBlockRef<'a>>) {
        for (ix, node) in children.iter().enumerate() {
            let Node::Block(block) = node else {
                continue;
            };
            path.push(ix);
            if block.kind.is_list_container() {
                walk(&block.children, path, out);
            } else {
                out.push(TextBlockRef {
                    path: path.clone(),
                    block,
                });
            }
            path.pop();
        }
    }

    let mut out = Vec::new();
    walk(&doc.children, &mut Vec::new(), &mut out);
    out
}

pub(crate) fn block_index_of_point(blocks: &[TextBlockRef<'_>], point: &Point) -> Option<usize> {
    blocks.iter().position(|b| point.path.starts_with(&b.path))
}

pub fn ordered_points(selection: &Selection) -> (Point, Point) {
    let mut start = selection.anchor.clone();
    let mut end = selection.focus.clone();

    if start.path == end.path {
        if end.offset < start.offset {
            std::mem::swap(&mut start, &mut end);
        }
        return (start, end);
    }
    if end.path < start.path {
        std::mem::swap(&mut start, &mut end);
    }
    (start, end)
}

/// Orders the selection and, when the trailing boundary sits exactly at the
/// leading edge of a block, pulls it back to the end of the previous block so
/// that block is not counted as selected.
pub fn unhang(doc: &Document, selection: &Selection) -> (Point, Point) {
    let (start, mut end) = ordered_points(selection);
    if start == end || end.offset != 0 {
        return (start, end);
    }

    let blocks = text_blocks_in_order(doc);
    let Some(end_ix) = block_index_of_point(&blocks, &end) else {
        return (start, end);
    };
    let leaf_ix = end
        .path
        .get(blocks[end_ix].path.len())
        .copied()
        .unwrap_or(0);
    if leaf_ix != 0 || end_ix == 0 {
        return (start, end);
    }
    let Some(start_ix) = block_index_of_point(&blocks, &start) else {
        return (start, end);
    };
    if end_ix <= start_ix {
        return (start, end);
    }

    let prev = &blocks[end_ix - 1];
    let last_leaf = prev.block.children.len().saturating_sub(1);
    let last_len = match prev.block.children.last() {
        Some(Node::Text(t)) => t.text.len(),
        _ => 0,
    };
    let mut path = prev.path.clone();
    path.push(last_leaf);
    end = Point::new(path, last_len);
    (start, end)
}

fn blocks_in_range<'a>(
    doc: &'a Document,
    start: &Point,
    end: &Point,
) -> Vec<(Path, &'a BlockNode)> {
    if doc.children.is_empty() {
        return Vec::new();
    }
    let (Some(&a), Some(&b)) = (start.path.first(), end.path.first()) else {
        return Vec::new();
    };
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let b = b.min(doc.children.len() - 1);
    let a = a.min(b);

    let mut out = Vec::new();
    for i in a..=b {
        let Node::Block(block) = &doc.children[i] else {
            continue;
        };
        out.push((vec![i], block));
        if !block.kind.is_list_container() || block.children.is_empty() {
            continue;
        }
        let last = block.children.len() - 1;
        let lo = if i == a {
            start.path.get(1).copied().unwrap_or(0).min(last)
        } else {
            0
        };
        let hi = if i == b {
            end.path.get(1).copied().unwrap_or(last).min(last)
        } else {
            last
        };
        for j in lo..=hi {
            if let Node::Block(item) = &block.children[j] {
                out.push((vec![i, j], item));
            }
        }
    }
    out
}

pub fn is_block_active(doc: &Document, selection: &Selection, kind: BlockKind) -> bool {
    let (start, end) = unhang(doc, selection);
    blocks_in_range(doc, &start, &end)
        .iter()
        .any(|(_, block)| block.kind == kind)
}

pub fn is_align_active(doc: &Document, selection: &Selection, align: Align) -> bool {
    let (start, end) = unhang(doc, selection);
    blocks_in_range(doc, &start, &end)
        .iter()
        .any(|(_, block)| block.align == Some(align))
}

/// Marks that would apply to the next inserted character: read from the leaf
/// at the focus point only, not across the whole range.
pub fn is_mark_active_at_focus(doc: &Document, selection: &Selection, mark: Mark) -> bool {
    match node_at(doc, &selection.focus.path) {
        Ok(Node::Text(t)) => t.marks.contains(mark),
        _ => false,
    }
}

/// Label for the nearest enclosing block at the anchor, checked H1 -> H2 ->
/// H3 -> Normal.
pub fn current_block_label(doc: &Document, selection: &Selection) -> BlockLabel {
    let path = &selection.anchor.path;
    if path.len() < 2 {
        return BlockLabel::Normal;
    }
    match node_at(doc, &path[..path.len() - 1]) {
        Ok(Node::Block(block)) => match block.kind {
            BlockKind::Heading1 => BlockLabel::H1,
            BlockKind::Heading2 => BlockLabel::H2,
            BlockKind::Heading3 => BlockLabel::H3,
            _ => BlockLabel::Normal,
        },
        _ => BlockLabel::Normal,
    }
}

pub(crate) fn point_global_offset(children: &[Node], child_ix: usize, offset: usize) -> usize {
    let mut global = 0usize;
    for (ix, node) in children.iter().enumerate() {
        let Node::Text(t) = node else {
            continue;
        };
        if ix < child_ix {
            global += t.text.len();
            continue;
        }
        if ix == child_ix {
            global += clamp_to_char_boundary(&t.text, offset);
        }
        break;
    }
    global
}

pub(crate) fn point_for_global_offset(
    block_path: &[usize],
    children: &[Node],
    global_offset: usize,
) -> Point {
    let mut remaining = global_offset;
    for (child_ix, node) in children.iter().enumerate() {
        let Node::Text(t) = node else {
            continue;
        };
        if remaining < t.text.len() {
            let mut path = block_path.to_vec();
            path.push(child_ix);
            return Point::new(path, clamp_to_char_boundary(&t.text, remaining));
        }
        if remaining == t.text.len() {
            // Prefer the start of the following leaf so the point stays on a
            // leaf boundary.
            if matches!(children.get(child_ix + 1), Some(Node::Text(_))) {
                let mut path = block_path.to_vec();
                path.push(child_ix + 1);
                return Point::new(path, 0);
            }
            let mut path = block_path.to_vec();
            path.push(child_ix);
            return Point::new(path, t.text.len());
        }
        remaining -= t.text.len();
    }

    for (child_ix, node) in children.iter().enumerate().rev() {
        if let Node::Text(t) = node {
            let mut path = block_path.to_vec();
            path.push(child_ix);
            return Point::new(path, t.text.len());
        }
    }

    let mut path = block_path.to_vec();
    path.push(0);
    Point::new(path, 0)
}

pub(crate) fn is_point_in_block(point: &Point, block_path: &[usize]) -> bool {
    point.path.len() == block_path.len() + 1 && point.path.starts_with(block_path)
}
