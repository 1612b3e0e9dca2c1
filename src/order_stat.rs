//! Order-statistics multiset.
//!
//! A size-augmented AVL tree: every node records the size of its subtree, so
//! `kth` walks one root-to-leaf path, and rebalancing keeps that path
//! O(log n) whatever the insertion order.
//!
//! ## Median convention
//!
//! [`OrderStatisticStore::median`] returns the `⌊n/2⌋ + 1`-th smallest value:
//! the middle value for odd `n`, the *upper* of the two middle values for even
//! `n`. Every median in this crate goes through this one function.

use std::cmp::Ordering;

use crate::error::{Result, SampleError};

type Link = Option<Box<Node>>;

#[derive(Debug, Clone)]
struct Node {
    value: i64,
    height: u8,
    size: usize,
    left: Link,
    right: Link,
}

impl Node {
    fn leaf(value: i64) -> Box<Self> {
        Box::new(Self {
            value,
            height: 1,
            size: 1,
            left: None,
            right: None,
        })
    }

    fn update(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
        self.size = 1 + size(&self.left) + size(&self.right);
    }

    fn balance(&self) -> i16 {
        height(&self.left) as i16 - height(&self.right) as i16
    }
}

fn height(link: &Link) -> u8 {
    link.as_ref().map_or(0, |n| n.height)
}

fn size(link: &Link) -> usize {
    link.as_ref().map_or(0, |n| n.size)
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update();
    pivot.right = Some(node);
    pivot.update();
    pivot
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update();
    pivot.left = Some(node);
    pivot.update();
    pivot
}

fn rebalance(mut node: Box<Node>) -> Box<Node> {
    node.update();
    let balance = node.balance();
    if balance > 1 {
        if node.left.as_ref().is_some_and(|l| l.balance() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if balance < -1 {
        if node.right.as_ref().is_some_and(|r| r.balance() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn insert(link: Link, value: i64) -> Box<Node> {
    match link {
        None => Node::leaf(value),
        Some(mut node) => {
            // Equal values go right, so duplicates keep insertion order.
            match value.cmp(&node.value) {
                Ordering::Less => node.left = Some(insert(node.left.take(), value)),
                Ordering::Equal | Ordering::Greater => {
                    node.right = Some(insert(node.right.take(), value))
                }
            }
            rebalance(node)
        }
    }
}

/// Dynamic multiset of integers with rank queries.
#[derive(Debug, Clone, Default)]
pub struct OrderStatisticStore {
    root: Link,
}

impl OrderStatisticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one value (duplicates are kept).
    pub fn insert(&mut self, value: i64) {
        self.root = Some(insert(self.root.take(), value));
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Tree height; exposed for balance checks.
    pub fn height(&self) -> usize {
        height(&self.root) as usize
    }

    /// The `k`-th smallest value, 1-indexed.
    ///
    /// Fails with [`SampleError::OutOfRange`] if `k == 0` or `k > len()`.
    pub fn kth(&self, k: usize) -> Result<i64> {
        let out_of_range = SampleError::OutOfRange { k, len: self.len() };
        if k == 0 {
            return Err(out_of_range);
        }

        let mut rank = k;
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            let left = size(&node.left);
            match rank.cmp(&(left + 1)) {
                Ordering::Equal => return Ok(node.value),
                Ordering::Less => cursor = node.left.as_deref(),
                Ordering::Greater => {
                    rank -= left + 1;
                    cursor = node.right.as_deref();
                }
            }
        }
        Err(out_of_range)
    }

    /// The `⌊n/2⌋ + 1`-th smallest value (upper median for even `n`).
    ///
    /// Fails with [`SampleError::EmptyStore`] if nothing was inserted.
    pub fn median(&self) -> Result<i64> {
        let n = self.len();
        if n == 0 {
            return Err(SampleError::EmptyStore);
        }
        self.kth(n / 2 + 1)
    }
}

impl Extend<i64> for OrderStatisticStore {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl FromIterator<i64> for OrderStatisticStore {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}
