//! Dependency ordering.
//!
//! Depth-first post-order over the discovered set: each object is emitted
//! after every object it references that is also in the set. Roots are
//! visited in insertion order, so unrelated objects keep their relative order.
//!
//! Cycles are broken rather than rejected. An edge into a node that is still
//! on the traversal stack is skipped, so every object appears exactly once.

use super::discovered::DiscoveredSet;
use crate::object::SavedObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Insertion positions of `set` in dependency order.
fn dependency_order(set: &DiscoveredSet) -> Vec<usize> {
    let objects = set.objects();
    let mut state = vec![VisitState::Unvisited; objects.len()];
    let mut order = Vec::with_capacity(objects.len());
    // (node, index of the next reference to follow)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..objects.len() {
        if state[root] != VisitState::Unvisited {
            continue;
        }
        state[root] = VisitState::InProgress;
        stack.push((root, 0));

        while let Some(top) = stack.len().checked_sub(1) {
            let (node, cursor) = stack[top];
            match objects[node].references.get(cursor) {
                Some(reference) => {
                    stack[top].1 += 1;
                    let Some(target) = set.position(&reference.target()) else {
                        continue;
                    };
                    match state[target] {
                        VisitState::Unvisited => {
                            state[target] = VisitState::InProgress;
                            stack.push((target, 0));
                        }
                        VisitState::InProgress => {
                            tracing::debug!(
                                "Reference cycle through {}:{}, breaking edge from {}:{}",
                                objects[target].object_type,
                                objects[target].id,
                                objects[node].object_type,
                                objects[node].id
                            );
                        }
                        VisitState::Done => {}
                    }
                }
                None => {
                    state[node] = VisitState::Done;
                    order.push(node);
                    stack.pop();
                }
            }
        }
    }

    order
}

/// Consume the set and return its objects in dependency order.
pub(crate) fn sort_objects(set: DiscoveredSet) -> Vec<SavedObject> {
    let order = dependency_order(&set);
    let mut slots: Vec<Option<SavedObject>> = set.into_objects().into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|position| slots[position].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(objects: &[SavedObject]) -> Vec<String> {
        objects
            .iter()
            .map(|o| format!("{}:{}", o.object_type, o.id))
            .collect()
    }

    fn set_of(objects: Vec<SavedObject>) -> DiscoveredSet {
        let mut set = DiscoveredSet::new();
        for obj in objects {
            set.insert(obj);
        }
        set
    }

    #[test]
    fn test_reference_precedes_referrer() {
        let set = set_of(vec![
            SavedObject::new("search", "2").with_reference("name", "index-pattern", "1"),
            SavedObject::new("index-pattern", "1"),
        ]);
        assert_eq!(ids(&sort_objects(set)), vec!["index-pattern:1", "search:2"]);
    }

    #[test]
    fn test_independent_objects_keep_order() {
        let set = set_of(vec![
            SavedObject::new("index-pattern", "3"),
            SavedObject::new("index-pattern", "1"),
            SavedObject::new("index-pattern", "2"),
        ]);
        assert_eq!(
            ids(&sort_objects(set)),
            vec!["index-pattern:3", "index-pattern:1", "index-pattern:2"]
        );
    }

    #[test]
    fn test_diamond() {
        let set = set_of(vec![
            SavedObject::new("dashboard", "d")
                .with_reference("p0", "visualization", "a")
                .with_reference("p1", "visualization", "b"),
            SavedObject::new("visualization", "a").with_reference("i", "index-pattern", "ip"),
            SavedObject::new("visualization", "b").with_reference("i", "index-pattern", "ip"),
            SavedObject::new("index-pattern", "ip"),
        ]);
        assert_eq!(
            ids(&sort_objects(set)),
            vec![
                "index-pattern:ip",
                "visualization:a",
                "visualization:b",
                "dashboard:d"
            ]
        );
    }

    #[test]
    fn test_cycle_is_broken() {
        let set = set_of(vec![
            SavedObject::new("a", "1").with_reference("r", "b", "1"),
            SavedObject::new("b", "1").with_reference("r", "c", "1"),
            SavedObject::new("c", "1").with_reference("r", "a", "1"),
        ]);
        let sorted = sort_objects(set);
        assert_eq!(ids(&sorted), vec!["c:1", "b:1", "a:1"]);
    }

    #[test]
    fn test_self_reference_and_dangling_edges() {
        let set = set_of(vec![
            SavedObject::new("a", "1")
                .with_reference("self", "a", "1")
                .with_reference("gone", "index-pattern", "404"),
        ]);
        assert_eq!(ids(&sort_objects(set)), vec!["a:1"]);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let depth = 50_000;
        let mut objects = Vec::with_capacity(depth);
        for i in 0..depth {
            let mut obj = SavedObject::new("node", i.to_string());
            if i + 1 < depth {
                obj = obj.with_reference("next", "node", (i + 1).to_string());
            }
            objects.push(obj);
        }
        let sorted = sort_objects(set_of(objects));
        assert_eq!(sorted.len(), depth);
        assert_eq!(sorted[0].id, (depth - 1).to_string());
        assert_eq!(sorted[depth - 1].id, "0");
    }
}
