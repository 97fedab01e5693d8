//! Command arena and FIFO command lists.
//!
//! Every list (the global queue and each pass sublist) threads its nodes
//! through one shared [`CommandPool`] by index, so splicing a submitted
//! pass into the global queue is O(1).

use easel_protocol::{Command, Handle};

use crate::slab::Slab;

struct Node {
    command: Command,
    next: Option<Handle>,
}

pub struct CommandPool {
    nodes: Slab<Node>,
}

impl CommandPool {
    pub fn new() -> Self {
        Self {
            nodes: Slab::with_capacity(128),
        }
    }

    /// Number of commands currently held by any list.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, command: Command) -> Handle {
        self.nodes.insert(Node {
            command,
            next: None,
        })
    }

    fn node_mut(&mut self, id: Handle) -> &mut Node {
        match self.nodes.get_mut(id) {
            Some(node) => node,
            None => panic!("command list references freed node {}", id),
        }
    }
}

impl Default for CommandPool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct CommandList {
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl CommandList {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push_back(&mut self, pool: &mut CommandPool, command: Command) {
        let id = pool.alloc(command);
        match self.tail {
            Some(tail) => pool.node_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    pub fn push_front(&mut self, pool: &mut CommandPool, command: Command) {
        let id = pool.alloc(command);
        pool.node_mut(id).next = self.head;
        self.head = Some(id);
        if self.tail.is_none() {
            self.tail = Some(id);
        }
        self.len += 1;
    }

    /// Moves every command of `other` to the end of this list, leaving `other` empty.
    pub fn append(&mut self, pool: &mut CommandPool, other: &mut CommandList) {
        let Some(other_head) = other.head else {
            return;
        };
        match self.tail {
            Some(tail) => pool.node_mut(tail).next = Some(other_head),
            None => self.head = Some(other_head),
        }
        self.tail = other.tail;
        self.len += other.len;
        *other = CommandList::new();
    }

    pub fn pop_front(&mut self, pool: &mut CommandPool) -> Option<Command> {
        let id = self.head?;
        let node = match pool.nodes.remove(id) {
            Some(node) => node,
            None => panic!("command list references freed node {}", id),
        };
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        Some(node.command)
    }

    pub fn iter<'a>(&self, pool: &'a CommandPool) -> impl Iterator<Item = &'a Command> + 'a {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = pool.nodes.get(cursor?)?;
            cursor = node.next;
            Some(&node.command)
        })
    }
}
