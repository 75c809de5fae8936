//! Linear-search child lookup, mirroring `NBT_GetChild`/`NBT_GetChild_Deep`.

use crate::tag::Node;

/// Finds the first direct child of `parent` whose key matches `key`
/// byte-for-byte.
pub fn get_child<'a>(parent: &'a Node, key: impl AsRef<[u8]>) -> Option<&'a Node> {
    let key = key.as_ref();
    parent.children().iter().find(|child| child.key() == Some(key))
}

/// Chains [`get_child`] across `keys`, descending one level per key.
/// Returns `None` as soon as any step fails to find a match.
pub fn get_child_deep<'a, K: AsRef<[u8]>>(parent: &'a Node, keys: &[K]) -> Option<&'a Node> {
    keys.iter().try_fold(parent, |node, key| get_child(node, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Payload;

    fn sample_tree() -> Node {
        let mut inner = Node::empty_compound("inner");
        inner.push_child(Node::keyed("leaf", Payload::Int(9)));
        let mut root = Node::empty_compound("");
        root.push_child(inner);
        root
    }

    #[test]
    fn finds_direct_child() {
        let root = sample_tree();
        let found = get_child(&root, "inner").unwrap();
        assert_eq!(found.kind(), crate::kind::Kind::Compound);
    }

    #[test]
    fn finds_nested_child_through_chain() {
        let root = sample_tree();
        let found = get_child_deep(&root, &["inner", "leaf"]).unwrap();
        assert_eq!(found.payload, Payload::Int(9));
    }

    #[test]
    fn missing_key_anywhere_in_chain_yields_none() {
        let root = sample_tree();
        assert!(get_child_deep(&root, &["inner", "missing"]).is_none());
        assert!(get_child_deep(&root, &["missing", "leaf"]).is_none());
    }
}
