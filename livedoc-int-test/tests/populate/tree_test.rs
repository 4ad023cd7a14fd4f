use livedoc::collection::{Collection, InsertOptions, TreePopulation};
use livedoc::common::Value;
use livedoc::data;
use livedoc::errors::LiveDocResult;
use livedoc::livedoc::LiveDoc;
use livedoc_int_test::test_util::{cleanup, create_test_context, create_users, run_test};

/// root -> (a -> a1), b
fn create_nodes(db: &LiveDoc) -> LiveDocResult<Collection> {
    let nodes = db.create_collection("nodes", data! { name: "", parentId: "" })?;
    for (id, name, parent) in [("r", "Root", ""), ("a", "A", "r"), ("b", "B", "r"), ("a1", "A1", "a")] {
        nodes.insert_with(data! { name: name, parentId: parent }, InsertOptions::with_id(id))?;
    }
    Ok(nodes)
}

fn children_of(nodes: &Collection) -> TreePopulation {
    TreePopulation::new(nodes, "id", "parentId", "children")
}

#[test]
fn test_tree_to_full_depth() {
    run_test(
        create_test_context,
        |ctx| {
            let nodes = create_nodes(&ctx.db())?;
            let root = nodes.by_id("r").unwrap();

            let tree = root.tree(&[children_of(&nodes)], 3)?;
            assert!(tree.is_ghost());
            assert_eq!(tree.get("children.[].name"), Some(Value::from(vec!["A", "B"])));
            assert_eq!(
                tree.get("children.[].children.[].name"),
                Some(Value::from(vec!["A1"]))
            );
            assert_eq!(root.get("children"), None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_tree_stops_at_max_depth() {
    run_test(
        create_test_context,
        |ctx| {
            let nodes = create_nodes(&ctx.db())?;
            let root = nodes.by_id("r").unwrap();

            let tree = root.tree(&[children_of(&nodes)], 1)?;
            assert_eq!(tree.get("children.[].name"), Some(Value::from(vec!["A", "B"])));
            // nodes below the last level carry no children field
            assert_eq!(tree.get("children.[].children"), Some(Value::Array(vec![])));

            let flat = root.tree(&[children_of(&nodes)], 0)?;
            assert_eq!(flat.get("children"), None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_tree_leaf_has_empty_children() {
    run_test(
        create_test_context,
        |ctx| {
            let nodes = create_nodes(&ctx.db())?;
            let leaf = nodes.by_id("b").unwrap().tree(&[children_of(&nodes)], 2)?;
            assert_eq!(leaf.get("children"), Some(Value::Array(vec![])));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_tree_ignores_other_collections() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let nodes = create_nodes(&db)?;
            let users = create_users(&db)?;

            let friends = TreePopulation::new(&users, "friendId", "id", "friends");
            let tree = nodes.by_id("r").unwrap().tree(&[friends, children_of(&nodes)], 2)?;

            assert_eq!(tree.get("friends"), None);
            assert_eq!(tree.get("children.[].name"), Some(Value::from(vec!["A", "B"])));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_tree_over_several_populations() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let friends = TreePopulation::new(&users, "friendId", "id", "friend");
            let fans = TreePopulation::new(&users, "id", "friendId", "fans");

            let tree = users.by_id("u1").unwrap().tree(&[friends, fans], 2)?;
            assert_eq!(tree.get("friend.[].name"), Some(Value::from(vec!["Bo"])));
            assert_eq!(tree.get("fans.[].name"), Some(Value::from(vec!["Bo"])));
            assert_eq!(
                tree.get("friend.[].friend.[].name"),
                Some(Value::from(vec!["Ann"]))
            );
            Ok(())
        },
        cleanup,
    )
}
