/// Structural node kinds that receive counter-based identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Block,
    Par,
    Line,
    Word,
    Photo,
    Table,
    Separator,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Block => "block",
            NodeKind::Par => "par",
            NodeKind::Line => "line",
            NodeKind::Word => "word",
            NodeKind::Photo => "photo",
            NodeKind::Table => "table",
            NodeKind::Separator => "separator",
        }
    }
}

const KIND_COUNT: usize = 7;

/// Deterministic per-page-scoped id allocation.
///
/// Counters reset whenever the page index changes, which models a monotonic
/// forward page stream; callers must present pages in non-decreasing index
/// order or counters silently restart.
#[derive(Debug, Default)]
pub struct IdAllocator {
    counters: [u64; KIND_COUNT],
    last_page: Option<usize>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn roll_page(&mut self, page_index: usize) {
        if self.last_page != Some(page_index) {
            self.counters = [0; KIND_COUNT];
            self.last_page = Some(page_index);
        }
    }

    pub fn next_id(&mut self, page_index: usize, kind: NodeKind) -> String {
        self.roll_page(page_index);
        let counter = &mut self.counters[kind as usize];
        let id = format!("{}_{:06}_{:06}", kind.as_str(), page_index, counter);
        *counter += 1;
        id
    }

    pub fn page_id(&mut self, page_index: usize) -> String {
        self.roll_page(page_index);
        format!("page_{:06}", page_index)
    }
}
