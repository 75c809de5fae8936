//! The NBT tree: a tagged, recursive value model with ordered children.

use std::borrow::Cow;

use crate::kind::Kind;

/// The typed payload of an NBT node, discriminated by [`Kind`].
///
/// `List` and `Compound` carry an ordered `Vec` of child [`Node`]s rather
/// than a linked list with `next`/`prev` pointers: sibling order is simply
/// vector order, and freeing a subtree is ordinary `Drop`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Raw bytes; no encoding is assumed or validated (see crate docs on
    /// Modified UTF-8).
    ByteArray(Vec<i8>),
    String(Vec<u8>),
    /// `element_kind` is fixed across `items`; an empty list may report
    /// `Kind::End`, a non-empty one never does.
    List {
        element_kind: Kind,
        items: Vec<Node>,
    },
    Compound(Vec<Node>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Payload {
    pub fn kind(&self) -> Kind {
        match self {
            Payload::Byte(_) => Kind::Byte,
            Payload::Short(_) => Kind::Short,
            Payload::Int(_) => Kind::Int,
            Payload::Long(_) => Kind::Long,
            Payload::Float(_) => Kind::Float,
            Payload::Double(_) => Kind::Double,
            Payload::ByteArray(_) => Kind::ByteArray,
            Payload::String(_) => Kind::String,
            Payload::List { .. } => Kind::List,
            Payload::Compound(_) => Kind::Compound,
            Payload::IntArray(_) => Kind::IntArray,
            Payload::LongArray(_) => Kind::LongArray,
        }
    }

    /// Children of a `List` or `Compound`; empty (not absent) for every
    /// other kind.
    pub fn children(&self) -> &[Node] {
        match self {
            Payload::List { items, .. } => items,
            Payload::Compound(children) => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Payload::List { items, .. } => Some(items),
            Payload::Compound(children) => Some(children),
            _ => None,
        }
    }

    /// Lossily decodes a `String` payload as UTF-8 for display; never use
    /// this for anything that re-encodes the tree (see [`Node::key_lossy`]).
    pub fn as_string_lossy(&self) -> Option<Cow<'_, str>> {
        match self {
            Payload::String(bytes) => Some(String::from_utf8_lossy(bytes)),
            _ => None,
        }
    }
}

/// A single NBT value: a [`Payload`] plus an optional key.
///
/// The key is `Some` for the document root and for Compound children, and
/// always `None` for List elements — the same `Node` type serves both
/// contexts, distinguished by where it is stored rather than by a nullable
/// field carrying special meaning on its own.
///
/// The key is raw bytes, not `String`: the wire format does not require its
/// key (or `Payload::String`) to be valid UTF-8, and rewriting invalid bytes
/// through a lossy conversion on decode would make `encode(decode(b)) == b`
/// false for such input. Use [`Node::key_lossy`] for display purposes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub key: Option<Vec<u8>>,
    pub payload: Payload,
}

impl Node {
    pub fn new(key: Option<Vec<u8>>, payload: Payload) -> Self {
        Self { key, payload }
    }

    /// Builds a keyed child suitable for a Compound's children or the
    /// document root.
    pub fn keyed(key: impl AsRef<[u8]>, payload: Payload) -> Self {
        Self::new(Some(key.as_ref().to_vec()), payload)
    }

    /// Builds a keyless value suitable for a List's elements.
    pub fn unkeyed(payload: Payload) -> Self {
        Self::new(None, payload)
    }

    pub fn kind(&self) -> Kind {
        self.payload.kind()
    }

    pub fn key(&self) -> Option<&[u8]> {
        self.key.as_deref()
    }

    /// Lossily decodes the key as UTF-8 for display (logging, debug
    /// printing); never use this for anything that re-encodes the tree.
    pub fn key_lossy(&self) -> Option<Cow<'_, str>> {
        self.key.as_deref().map(String::from_utf8_lossy)
    }

    /// An empty compound node, used as a builder root.
    pub fn empty_compound(key: impl AsRef<[u8]>) -> Self {
        Self::keyed(key, Payload::Compound(Vec::new()))
    }

    /// Appends `child` to this node's children. Panics if this node is not
    /// a List or Compound — callers are expected to build trees bottom-up
    /// and know their own shape, matching the teacher's construction style.
    pub fn push_child(&mut self, child: Node) {
        self.payload
            .children_mut()
            .expect("push_child called on a non-container node")
            .push(child);
    }

    pub fn children(&self) -> &[Node] {
        self.payload.children()
    }
}
