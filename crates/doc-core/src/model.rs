use std::ops::Range;

use serde::{Deserialize, Deserializer, Serialize};

pub type Path = Vec<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedList,
    NumberedList,
    ListItem,
    CodeBlock,
}

impl<'de> Deserialize<'de> for BlockKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let kind = String::deserialize(deserializer)?;
        Ok(match kind.as_str() {
            "paragraph" => BlockKind::Paragraph,
            "heading1" => BlockKind::Heading1,
            "heading2" => BlockKind::Heading2,
            "heading3" => BlockKind::Heading3,
            "bulleted_list" => BlockKind::BulletedList,
            "numbered_list" => BlockKind::NumberedList,
            "list_item" => BlockKind::ListItem,
            "code_block" => BlockKind::CodeBlock,
            // Unrecognized kinds hydrate as paragraphs instead of failing the
            // whole document.
            _ => BlockKind::Paragraph,
        })
    }
}

impl BlockKind {
    pub fn is_list_container(self) -> bool {
        matches!(self, BlockKind::BulletedList | BlockKind::NumberedList)
    }

    pub fn is_leaf_block(self) -> bool {
        !self.is_list_container()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Marks {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub code: bool,
}

impl Marks {
    pub fn contains(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strikethrough => self.strikethrough,
            Mark::Code => self.code,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
            Mark::Strikethrough => self.strikethrough = on,
            Mark::Code => self.code = on,
        }
    }

    pub fn with(mut self, mark: Mark, on: bool) -> Self {
        self.set(mark, on);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Block(BlockNode),
    Text(TextNode),
}

impl Node {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Block(BlockNode {
            kind: BlockKind::Paragraph,
            align: None,
            children: vec![Node::text(text, Marks::default())],
        })
    }

    pub fn list_item(text: impl Into<String>) -> Self {
        Node::Block(BlockNode {
            kind: BlockKind::ListItem,
            align: None,
            children: vec![Node::text(text, Marks::default())],
        })
    }

    pub fn block(kind: BlockKind, children: Vec<Node>) -> Self {
        Node::Block(BlockNode {
            kind,
            align: None,
            children,
        })
    }

    pub fn text(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(TextNode {
            text: text.into(),
            marks,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl BlockNode {
    pub fn text_len(&self) -> usize {
        self.children
            .iter()
            .map(|node| match node {
                Node::Text(t) => t.text.len(),
                Node::Block(_) => 0,
            })
            .sum()
    }

    pub fn is_text_empty(&self) -> bool {
        self.text_len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default)]
    pub marks: Marks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            children: vec![Node::paragraph("")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[derive(Debug)]
pub struct PathError(pub String);

#[derive(Debug)]
pub struct RangeError(pub String);

impl From<PathError> for RangeError {
    fn from(value: PathError) -> Self {
        RangeError(value.0)
    }
}

pub fn node_at<'a>(doc: &'a Document, path: &[usize]) -> Result<&'a Node, PathError> {
    let (&first, rest) = path
        .split_first()
        .ok_or_else(|| PathError("Empty path".into()))?;
    let mut node = doc
        .children
        .get(first)
        .ok_or_else(|| PathError(format!("Path out of bounds at depth 0: {first}")))?;
    for (depth, &ix) in rest.iter().enumerate() {
        node = match node {
            Node::Block(block) => block.children.get(ix).ok_or_else(|| {
                PathError(format!("Path out of bounds at depth {}: {ix}", depth + 1))
            })?,
            Node::Text(_) => {
                return Err(PathError(format!("Non-block node at depth {depth}")));
            }
        };
    }
    Ok(node)
}

pub fn node_at_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Node, PathError> {
    let (&first, rest) = path
        .split_first()
        .ok_or_else(|| PathError("Empty path".into()))?;
    let mut node = doc
        .children
        .get_mut(first)
        .ok_or_else(|| PathError(format!("Path out of bounds at depth 0: {first}")))?;
    for (depth, &ix) in rest.iter().enumerate() {
        node = match node {
            Node::Block(block) => block.children.get_mut(ix).ok_or_else(|| {
                PathError(format!("Path out of bounds at depth {}: {ix}", depth + 1))
            })?,
            Node::Text(_) => {
                return Err(PathError(format!("Non-block node at depth {depth}")));
            }
        };
    }
    Ok(node)
}

pub fn block_at_mut<'a>(
    doc: &'a mut Document,
    path: &[usize],
) -> Result<&'a mut BlockNode, PathError> {
    match node_at_mut(doc, path)? {
        Node::Block(block) => Ok(block),
        Node::Text(_) => Err(PathError("Expected a block node".into())),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockPatch {
    pub kind: Option<BlockKind>,
    pub align: Option<Option<Align>>,
}

pub fn set_block_properties(
    doc: &mut Document,
    path: &[usize],
    patch: &BlockPatch,
) -> Result<(), PathError> {
    let block = block_at_mut(doc, path)?;
    if let Some(kind) = patch.kind {
        block.kind = kind;
    }
    if let Some(align) = patch.align {
        block.align = align;
    }
    Ok(())
}

/// Wraps the contiguous sibling run `range` under `parent` (empty path for the
/// document root) in a new container of `kind`. Applies nothing on failure.
pub fn wrap(
    doc: &mut Document,
    parent: &[usize],
    range: Range<usize>,
    kind: BlockKind,
) -> Result<(), RangeError> {
    let children = if parent.is_empty() {
        &mut doc.children
    } else {
        match node_at_mut(doc, parent)? {
            Node::Block(block) => &mut block.children,
            Node::Text(_) => return Err(RangeError("Wrap parent is not a block".into())),
        }
    };

    if range.is_empty() {
        return Err(RangeError("Empty wrap range".into()));
    }
    if range.end > children.len() {
        return Err(RangeError(format!(
            "Wrap range out of bounds: {} > {}",
            range.end,
            children.len()
        )));
    }

    let start = range.start;
    let wrapped: Vec<Node> = children.drain(range).collect();
    children.insert(
        start,
        Node::Block(BlockNode {
            kind,
            align: None,
            children: wrapped,
        }),
    );
    Ok(())
}

/// Removes every list container intersecting the top-level span between
/// `start` and `end` (ordered points), splicing the covered items up into the
/// document as paragraphs. Items outside the covered child range stay behind
/// in a split-off container of the same kind, so a partially covered list
/// keeps its uncovered items wrapped. Returns the top-level index range the
/// covered blocks occupy afterwards.
pub fn unwrap_list_containers(
    doc: &mut Document,
    start: &Point,
    end: &Point,
) -> Result<Range<usize>, PathError> {
    if doc.children.is_empty() {
        return Err(PathError("Document has no blocks".into()));
    }
    let Some(&a) = start.path.first() else {
        return Err(PathError("Selection start has an empty path".into()));
    };
    let Some(&b) = end.path.first() else {
        return Err(PathError("Selection end has an empty path".into()));
    };
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let b = b.min(doc.children.len() - 1);
    let a = a.min(b);

    let mut new_a = a;
    let mut new_b = b;

    for i in (a..=b).rev() {
        let Node::Block(block) = &doc.children[i] else {
            continue;
        };
        if !block.kind.is_list_container() {
            continue;
        }

        let item_count = block.children.len();
        if item_count == 0 {
            doc.children.remove(i);
            if i == b {
                new_b = i.saturating_sub(1);
            } else {
                new_b -= 1;
            }
            if i == a {
                new_a = i;
            }
            continue;
        }

        let mut lo = if i == a {
            start.path.get(1).copied().unwrap_or(0).min(item_count - 1)
        } else {
            0
        };
        let hi = if i == b {
            end.path
                .get(1)
                .copied()
                .unwrap_or(item_count - 1)
                .min(item_count - 1)
        } else {
            item_count - 1
        };
        lo = lo.min(hi);

        let Node::Block(mut container) = doc.children.remove(i) else {
            unreachable!("checked above");
        };
        let kind = container.kind;
        let align = container.align;
        let suffix = container.children.split_off(hi + 1);
        let covered = container.children.split_off(lo);
        let prefix = container.children;

        let has_prefix = !prefix.is_empty();
        let covered_len = covered.len();

        let mut replacement: Vec<Node> = Vec::new();
        if has_prefix {
            replacement.push(Node::Block(BlockNode {
                kind,
                align,
                children: prefix,
            }));
        }
        for node in covered {
            // Items leaving the list revert to paragraphs.
            replacement.push(match node {
                Node::Block(mut item) if item.kind == BlockKind::ListItem => {
                    item.kind = BlockKind::Paragraph;
                    Node::Block(item)
                }
                other => other,
            });
        }
        if !suffix.is_empty() {
            replacement.push(Node::Block(BlockNode {
                kind,
                align,
                children: suffix,
            }));
        }

        let inserted = replacement.len();
        doc.children.splice(i..i, replacement);

        let prefix_len = has_prefix as usize;
        if i == b {
            new_b = i + prefix_len + covered_len - 1;
        } else {
            new_b += inserted - 1;
        }
        if i == a {
            new_a = i + prefix_len;
        }
    }

    let end_ix = (new_b + 1).min(doc.children.len());
    Ok(new_a.min(end_ix)..end_ix)
}

/// Rebuilds the tree so the structural invariants hold: list containers only
/// hold list items, orphan list items revert to paragraphs, every block keeps
/// at least one text leaf, adjacent leaves with equal marks merge, and an
/// empty document gains one empty paragraph.
pub fn normalize(doc: &mut Document) {
    let children = std::mem::take(&mut doc.children);
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for node in children {
        normalize_top(node, &mut out);
    }
    if out.is_empty() {
        out.push(Node::paragraph(""));
    }
    doc.children = out;
}

fn normalize_top(node: Node, out: &mut Vec<Node>) {
    match node {
        Node::Text(text) => {
            // A bare leaf at the top level gets its own paragraph.
            out.push(Node::Block(BlockNode {
                kind: BlockKind::Paragraph,
                align: None,
                children: merge_leaves(vec![text]),
            }));
        }
        Node::Block(block) if block.kind.is_list_container() => normalize_container(block, out),
        Node::Block(mut block) => {
            if block.kind == BlockKind::ListItem {
                block.kind = BlockKind::Paragraph;
            }
            let (block, hoisted) = normalize_leaf_block(block);
            out.push(Node::Block(block));
            for node in hoisted {
                normalize_top(node, out);
            }
        }
    }
}

fn normalize_container(mut container: BlockNode, out: &mut Vec<Node>) {
    let kind = container.kind;
    let align = container.align;
    let mut items: Vec<Node> = Vec::new();

    for child in container.children.drain(..) {
        match child {
            Node::Block(item) if item.kind == BlockKind::ListItem => {
                let (item, hoisted) = normalize_leaf_block(item);
                items.push(Node::Block(item));
                if !hoisted.is_empty() {
                    flush_items(kind, align, &mut items, out);
                    for node in hoisted {
                        normalize_top(node, out);
                    }
                }
            }
            Node::Text(text) => {
                // Loose inline content becomes its own item.
                items.push(Node::Block(BlockNode {
                    kind: BlockKind::ListItem,
                    align: None,
                    children: merge_leaves(vec![text]),
                }));
            }
            Node::Block(other) => {
                // A non-item child leaves the container, splitting it.
                flush_items(kind, align, &mut items, out);
                normalize_top(Node::Block(other), out);
            }
        }
    }

    flush_items(kind, align, &mut items, out);
}

fn flush_items(kind: BlockKind, align: Option<Align>, items: &mut Vec<Node>, out: &mut Vec<Node>) {
    if items.is_empty() {
        return;
    }
    out.push(Node::Block(BlockNode {
        kind,
        align,
        children: std::mem::take(items),
    }));
}

fn normalize_leaf_block(mut block: BlockNode) -> (BlockNode, Vec<Node>) {
    let mut inlines: Vec<TextNode> = Vec::new();
    let mut hoisted: Vec<Node> = Vec::new();
    for child in block.children.drain(..) {
        match child {
            Node::Text(text) => inlines.push(text),
            nested @ Node::Block(_) => hoisted.push(nested),
        }
    }
    block.children = merge_leaves(inlines);
    (block, hoisted)
}

fn merge_leaves(leaves: Vec<TextNode>) -> Vec<Node> {
    let mut merged: Vec<TextNode> = Vec::new();
    for leaf in leaves {
        if let Some(prev) = merged.last_mut() {
            if prev.marks == leaf.marks {
                prev.text.push_str(&leaf.text);
                continue;
            }
        }
        merged.push(leaf);
    }

    let has_text = merged.iter().any(|leaf| !leaf.text.is_empty());
    if has_text {
        merged.retain(|leaf| !leaf.text.is_empty());
    }
    if merged.is_empty() {
        merged.push(TextNode {
            text: String::new(),
            marks: Marks::default(),
        });
    }

    merged.into_iter().map(Node::Text).collect()
}

pub fn first_text_point(doc: &Document) -> Option<Point> {
    fn walk(children: &[Node], path: &mut Path) -> Option<Point> {
        for (ix, node) in children.iter().enumerate() {
            path.push(ix);
            match node {
                Node::Text(_) => return Some(Point::new(path.clone(), 0)),
                Node::Block(block) => {
                    if let Some(point) = walk(&block.children, path) {
                        return Some(point);
                    }
                }
            }
            path.pop();
        }
        None
    }
    walk(&doc.children, &mut Vec::new())
}

/// Moves a possibly stale point to the nearest existing text leaf, clamping
/// the offset to a char boundary inside it.
pub fn normalize_point(doc: &Document, point: &Point) -> Point {
    let mut path: Path = Vec::new();
    let mut children: &[Node] = &doc.children;
    for &ix in &point.path {
        if children.is_empty() {
            break;
        }
        let ix = ix.min(children.len() - 1);
        path.push(ix);
        children = match &children[ix] {
            Node::Block(block) => &block.children,
            Node::Text(_) => &[],
        };
    }

    loop {
        match node_at(doc, &path) {
            Ok(Node::Text(t)) => {
                let offset = clamp_to_char_boundary(&t.text, point.offset);
                return Point::new(path, offset);
            }
            Ok(Node::Block(block)) if !block.children.is_empty() => path.push(0),
            _ => break,
        }
    }

    first_text_point(doc).unwrap_or_else(|| Point::new(vec![0, 0], 0))
}

pub fn clamp_selection(doc: &Document, selection: &Selection) -> Selection {
    Selection {
        anchor: normalize_point(doc, &selection.anchor),
        focus: normalize_point(doc, &selection.focus),
    }
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}
