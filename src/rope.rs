use std::rc::Rc;

/// Combined lengths below this are flattened into a single leaf on concat,
/// which bounds the node count for the many tiny sequences the machine
/// splices every iteration.
const JOIN_THRESHOLD: usize = 17;

/// Concat results taller than this are rebuilt into a balanced tree. One
/// concatenation happens per VM iteration, so without this the tree height
/// (and substring cost) would grow linearly with iteration count.
const REBALANCE_HEIGHT_THRESHOLD: usize = 80;

/// A node is either a view into a shared backing array or a concatenation
/// of two children. Nodes are never mutated after construction; all sharing
/// is structural.
#[derive(Debug)]
enum Node<T> {
    Leaf {
        data: Rc<[T]>,
        start: usize,
        len: usize,
    },
    Concat {
        left: Rc<Node<T>>,
        right: Rc<Node<T>>,
        len: usize,
        height: usize,
    },
}

/// A persistent rope over copyable elements.
///
/// Every operation returns a new value; existing ropes are never invalidated,
/// so captured slices can outlive the sequence they were cut from.
#[derive(Debug)]
pub struct Rope<T> {
    root: Rc<Node<T>>,
}

impl<T> Clone for Rope<T> {
    fn clone(&self) -> Self {
        Rope {
            root: Rc::clone(&self.root),
        }
    }
}

impl<T: Copy> Node<T> {
    fn from_vec(data: Vec<T>) -> Node<T> {
        let len = data.len();
        Node::Leaf {
            data: data.into(),
            start: 0,
            len,
        }
    }

    fn len(&self) -> usize {
        match self {
            Node::Leaf { len, .. } => *len,
            Node::Concat { len, .. } => *len,
        }
    }

    fn height(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Concat { height, .. } => *height,
        }
    }

    fn get(&self, mut index: usize) -> T {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { data, start, len } => {
                    assert!(index < *len, "index {index} out of bounds of leaf");
                    return data[start + index];
                }
                Node::Concat { left, right, .. } => {
                    if index < left.len() {
                        node = left;
                    } else {
                        index -= left.len();
                        node = right;
                    }
                }
            }
        }
    }

    fn write_to(&self, out: &mut Vec<T>) {
        match self {
            Node::Leaf { data, start, len } => out.extend_from_slice(&data[*start..*start + *len]),
            Node::Concat { left, right, .. } => {
                left.write_to(out);
                right.write_to(out);
            }
        }
    }
}

fn substring<T: Copy>(node: &Rc<Node<T>>, start: usize, len: usize) -> Rc<Node<T>> {
    if len == 0 {
        return Rc::new(Node::from_vec(Vec::new()));
    }
    match &**node {
        Node::Leaf {
            data,
            start: leaf_start,
            len: leaf_len,
        } => {
            assert!(
                start + len <= *leaf_len,
                "substring {start}+{len} out of bounds of length {leaf_len}"
            );
            Rc::new(Node::Leaf {
                data: Rc::clone(data),
                start: leaf_start + start,
                len,
            })
        }
        Node::Concat {
            left,
            right,
            len: total,
            ..
        } => {
            if start == 0 && len == *total {
                return Rc::clone(node);
            }
            if start >= left.len() {
                return substring(right, start - left.len(), len);
            }
            if start + len <= left.len() {
                return substring(left, start, len);
            }
            let left_count = left.len() - start;
            concat(
                substring(left, start, left_count),
                substring(right, 0, len - left_count),
            )
        }
    }
}

fn concat<T: Copy>(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
    if left.len() == 0 {
        return right;
    }
    if right.len() == 0 {
        return left;
    }
    let total = left.len() + right.len();
    if total < JOIN_THRESHOLD {
        let mut flat = Vec::with_capacity(total);
        left.write_to(&mut flat);
        right.write_to(&mut flat);
        return Rc::new(Node::from_vec(flat));
    }
    let height = 1 + left.height().max(right.height());
    let node = Rc::new(Node::Concat {
        left,
        right,
        len: total,
        height,
    });
    if height > REBALANCE_HEIGHT_THRESHOLD {
        rebalance(node)
    } else {
        node
    }
}

/// Rebuilds a tree into balanced form: collect the leaves left to right,
/// then pair-merge halves recursively.
fn rebalance<T: Copy>(node: Rc<Node<T>>) -> Rc<Node<T>> {
    let mut leaves = Vec::new();
    let mut to_visit = vec![node];
    while let Some(n) = to_visit.pop() {
        match &*n {
            Node::Concat { left, right, .. } => {
                to_visit.push(Rc::clone(right));
                to_visit.push(Rc::clone(left));
            }
            Node::Leaf { .. } => leaves.push(n),
        }
    }
    merge(&leaves, 0, leaves.len())
}

fn merge<T: Copy>(leaves: &[Rc<Node<T>>], start: usize, end: usize) -> Rc<Node<T>> {
    match end - start {
        1 => Rc::clone(&leaves[start]),
        2 => concat(Rc::clone(&leaves[start]), Rc::clone(&leaves[start + 1])),
        range => {
            let middle = start + range / 2;
            concat(merge(leaves, start, middle), merge(leaves, middle, end))
        }
    }
}

impl<T: Copy> Rope<T> {
    pub fn new(data: Vec<T>) -> Rope<T> {
        Rope {
            root: Rc::new(Node::from_vec(data)),
        }
    }

    pub fn empty() -> Rope<T> {
        Rope::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tree height; leaves have height 1. Stays bounded by the rebalance
    /// threshold no matter how many concatenations built the rope.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// Element at `index`.
    ///
    /// Panics when `index >= len()`; out-of-range access is a contract
    /// violation, not a recoverable condition.
    pub fn get(&self, index: usize) -> T {
        assert!(
            index < self.len(),
            "index {index} out of bounds of rope of length {}",
            self.len()
        );
        self.root.get(index)
    }

    /// Strict substring sharing the underlying leaves.
    ///
    /// Panics when `start + len` exceeds the rope length.
    pub fn substring(&self, start: usize, len: usize) -> Rope<T> {
        assert!(
            start + len <= self.len(),
            "substring {start}+{len} out of bounds of rope of length {}",
            self.len()
        );
        Rope {
            root: substring(&self.root, start, len),
        }
    }

    pub fn concat(&self, other: &Rope<T>) -> Rope<T> {
        Rope {
            root: concat(Rc::clone(&self.root), Rc::clone(&other.root)),
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.root, 0)
    }

    /// Iterates from `start` without materializing or re-walking the skipped
    /// prefix.
    pub fn iter_from(&self, start: usize) -> Iter<'_, T> {
        Iter::new(&self.root, start)
    }

    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        self.root.write_to(&mut out);
        out
    }
}

/// In-order traversal yielding elements by value.
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
    chunk: &'a [T],
    pos: usize,
}

impl<'a, T: Copy> Iter<'a, T> {
    fn new(root: &'a Node<T>, skip: usize) -> Iter<'a, T> {
        let mut iter = Iter {
            stack: Vec::new(),
            chunk: &[],
            pos: 0,
        };
        if skip < root.len() {
            iter.descend(root, skip);
        }
        iter
    }

    fn descend(&mut self, mut node: &'a Node<T>, mut skip: usize) {
        loop {
            match node {
                Node::Leaf { data, start, len } => {
                    self.chunk = &data[start + skip..start + len];
                    self.pos = 0;
                    return;
                }
                Node::Concat { left, right, .. } => {
                    if skip < left.len() {
                        self.stack.push(right);
                        node = left;
                    } else {
                        skip -= left.len();
                        node = right;
                    }
                }
            }
        }
    }
}

impl<'a, T: Copy> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if self.pos < self.chunk.len() {
                let value = self.chunk[self.pos];
                self.pos += 1;
                return Some(value);
            }
            let node = self.stack.pop()?;
            self.descend(node, 0);
        }
    }
}
