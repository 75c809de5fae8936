//! SNBT: a textual, human-readable rendering of an NBT tree.

use crate::cursor::{SliceWriter, VecWriter, WriteSink};
use crate::error::Result;
use crate::kind::Kind;
use crate::tag::{Node, Payload};

/// Rendering options for [`to_snbt`]/[`to_snbt_into`].
#[derive(Debug, Clone, Copy)]
pub struct SnbtOptions {
    /// Containers nested at or below this depth are rendered fully; deeper
    /// ones are clipped to `{...}`/`[...]`. `None` disables clipping.
    pub max_level: Option<u32>,
    /// When `Some`, each nesting level is indented by this many spaces and
    /// children are placed one per line; when `None`, output is compact.
    pub indent: Option<u32>,
}

impl Default for SnbtOptions {
    fn default() -> Self {
        Self { max_level: None, indent: None }
    }
}

/// Renders `root` as SNBT into a freshly allocated `String`.
pub fn to_snbt(root: &Node, options: SnbtOptions) -> Result<String> {
    let mut sink = VecWriter::new();
    write_node(&mut sink, root, &options, 0)?;
    Ok(String::from_utf8_lossy(&sink.into_inner()).into_owned())
}

/// Renders `root` as SNBT into the caller-supplied fixed window, failing
/// with `BufferOverflow` instead of growing past its end. Returns the
/// number of bytes written.
pub fn to_snbt_into(root: &Node, options: SnbtOptions, buf: &mut [u8]) -> Result<usize> {
    let mut sink = SliceWriter::new(buf);
    write_node(&mut sink, root, &options, 0)?;
    Ok(sink.written())
}

fn is_clipped(options: &SnbtOptions, level: u32) -> bool {
    matches!(options.max_level, Some(max) if level >= max)
}

fn write_indent<W: WriteSink>(sink: &mut W, options: &SnbtOptions, level: u32) -> Result<()> {
    if let Some(width) = options.indent {
        sink.write_bytes(b"\n")?;
        for _ in 0..(width * level) {
            sink.write_bytes(b" ")?;
        }
    }
    Ok(())
}

fn write_key<W: WriteSink>(sink: &mut W, key: Option<&[u8]>) -> Result<()> {
    if let Some(key) = key {
        if !key.is_empty() {
            sink.write_bytes(key)?;
            sink.write_bytes(b":")?;
        }
    }
    Ok(())
}

fn write_node<W: WriteSink>(
    sink: &mut W,
    node: &Node,
    options: &SnbtOptions,
    level: u32,
) -> Result<()> {
    write_key(sink, node.key())?;
    write_payload(sink, &node.payload, options, level)
}

fn write_payload<W: WriteSink>(
    sink: &mut W,
    payload: &Payload,
    options: &SnbtOptions,
    level: u32,
) -> Result<()> {
    match payload {
        Payload::Byte(v) => sink.write_bytes(format!("{v}b").as_bytes()),
        Payload::Short(v) => sink.write_bytes(format!("{v}s").as_bytes()),
        Payload::Int(v) => sink.write_bytes(v.to_string().as_bytes()),
        Payload::Long(v) => sink.write_bytes(format!("{v}l").as_bytes()),
        Payload::Float(v) => sink.write_bytes(format!("{v}f").as_bytes()),
        Payload::Double(v) => sink.write_bytes(format!("{v}d").as_bytes()),
        Payload::ByteArray(items) => write_numeric_array(sink, "B", "b", items),
        Payload::String(bytes) => write_quoted_string(sink, bytes),
        Payload::IntArray(items) => write_numeric_array(sink, "I", "", items),
        Payload::LongArray(items) => write_numeric_array(sink, "L", "l", items),
        Payload::List { items, .. } => {
            write_collection(sink, b'[', b']', items, options, level, false)
        }
        Payload::Compound(children) => {
            write_collection(sink, b'{', b'}', children, options, level, true)
        }
    }
}

fn write_numeric_array<W: WriteSink, T: std::fmt::Display>(
    sink: &mut W,
    array_prefix: &str,
    element_suffix: &str,
    items: &[T],
) -> Result<()> {
    sink.write_bytes(format!("[{array_prefix};").as_bytes())?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            sink.write_bytes(b",")?;
        }
        sink.write_bytes(format!("{item}{element_suffix}").as_bytes())?;
    }
    sink.write_bytes(b"]")
}

/// Escapes only the double quote, matching the reference printer: SNBT
/// strings are not expected to carry control characters worth escaping
/// beyond the delimiter itself.
fn write_quoted_string<W: WriteSink>(sink: &mut W, bytes: &[u8]) -> Result<()> {
    sink.write_bytes(b"\"")?;
    for &b in bytes {
        if b == b'"' {
            sink.write_bytes(b"\\\"")?;
        } else {
            sink.write_bytes(&[b])?;
        }
    }
    sink.write_bytes(b"\"")
}

fn write_collection<W: WriteSink>(
    sink: &mut W,
    open: u8,
    close: u8,
    children: &[Node],
    options: &SnbtOptions,
    level: u32,
    is_compound_key_form: bool,
) -> Result<()> {
    if is_clipped(options, level) {
        sink.write_bytes(&[open])?;
        if !children.is_empty() {
            sink.write_bytes(b"...")?;
        }
        return sink.write_bytes(&[close]);
    }
    sink.write_bytes(&[open])?;
    let next_level = level + 1;
    for (i, child) in children.iter().enumerate() {
        write_indent(sink, options, next_level)?;
        if is_compound_key_form {
            write_node(sink, child, options, next_level)?;
        } else {
            write_payload(sink, &child.payload, options, next_level)?;
        }
        if i + 1 != children.len() {
            sink.write_bytes(b",")?;
        }
    }
    if !children.is_empty() {
        write_indent(sink, options, level)?;
    }
    sink.write_bytes(&[close])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(root: &Node) -> String {
        to_snbt(root, SnbtOptions::default()).unwrap()
    }

    #[test]
    fn renders_scalars_with_type_suffixes() {
        let root = Node::keyed("n", Payload::Short(5));
        assert_eq!(compact(&root), "n:5s");
    }

    #[test]
    fn renders_nested_compound_without_trailing_comma() {
        let mut root = Node::empty_compound("");
        root.push_child(Node::keyed("a", Payload::Int(1)));
        root.push_child(Node::keyed("b", Payload::Int(2)));
        assert_eq!(compact(&root), "{a:1,b:2}");
    }

    #[test]
    fn clips_past_max_level() {
        let mut inner = Node::empty_compound("inner");
        inner.push_child(Node::keyed("x", Payload::Int(1)));
        let mut root = Node::empty_compound("");
        root.push_child(inner);
        let rendered = to_snbt(&root, SnbtOptions { max_level: Some(1), indent: None }).unwrap();
        assert_eq!(rendered, "{inner:{...}}");
    }

    #[test]
    fn renders_long_with_lowercase_suffix() {
        let root = Node::keyed("n", Payload::Long(5));
        assert_eq!(compact(&root), "n:5l");
    }

    #[test]
    fn renders_numeric_arrays_with_reference_element_suffixes() {
        let bytes = Node::keyed("b", Payload::ByteArray(vec![1, 2]));
        assert_eq!(compact(&bytes), "b:[B;1b,2b]");
        let ints = Node::keyed("i", Payload::IntArray(vec![1, 2]));
        assert_eq!(compact(&ints), "i:[I;1,2]");
        let longs = Node::keyed("l", Payload::LongArray(vec![1, 2]));
        assert_eq!(compact(&longs), "l:[L;1l,2l]");
    }

    #[test]
    fn escapes_only_double_quotes() {
        let root = Node::keyed("s", Payload::String(br#"say "hi""#.to_vec()));
        assert_eq!(compact(&root), r#"s:"say \"hi\"""#);
    }

    #[test]
    fn to_snbt_into_overflows_on_undersized_window() {
        let root = Node::keyed("n", Payload::Int(123456));
        let mut buf = [0u8; 2];
        let err = to_snbt_into(&root, SnbtOptions::default(), &mut buf).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::BufferOverflow);
    }

    #[test]
    fn indents_children_one_per_line() {
        let mut root = Node::empty_compound("");
        root.push_child(Node::keyed("a", Payload::Int(1)));
        let rendered =
            to_snbt(&root, SnbtOptions { max_level: None, indent: Some(2) }).unwrap();
        assert_eq!(rendered, "{\n  a:1\n}");
    }
}
