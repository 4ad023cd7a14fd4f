use livedoc::collection::Document;
use livedoc::common::{Data, Value};
use livedoc::data;
use livedoc::errors::ErrorKind;
use livedoc::filter::field;
use livedoc::livedoc::LiveDoc;
use livedoc::store::memory::MemoryStorage;
use livedoc::store::StorageProvider;
use livedoc_int_test::test_util::{cleanup, create_test_context, create_users, ids, run_test, user_schema};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Memory storage that can be told to reject writes.
#[derive(Clone, Default)]
struct FlakyStorage {
    memory: MemoryStorage,
    reject: Arc<AtomicBool>,
}

impl StorageProvider for FlakyStorage {
    fn save(&self, document: &Document, data: Data) -> bool {
        !self.reject.load(Ordering::SeqCst) && self.memory.save(document, data)
    }

    fn load(&self, document: &Document) -> Data {
        self.memory.load(document)
    }

    fn delete(&self, document: &Document) {
        self.memory.delete(document)
    }
}

#[test]
fn test_get_nested_values() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let cy = users.by_id("u3").unwrap();

            assert_eq!(cy.get("id"), Some(Value::from("u3")));
            assert_eq!(cy.get("pets.[].kind"), Some(Value::from(vec!["dog", "cat"])));
            assert_eq!(cy.get("pets.[].age"), Some(Value::from(vec![7, 1])));
            assert_eq!(cy.get("pets.kind"), None);
            assert_eq!(cy.get("missing.path"), None);
            assert_eq!(cy.get("_createdAt"), Some(Value::from(cy.created_at())));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_nested_values() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let ann = users.by_id("u1").unwrap();

            ann.set("address.city", "Oslo")?;
            ann.set("address.zip", "0150")?;
            assert_eq!(ann.get("address.city"), Some(Value::from("Oslo")));
            assert_eq!(ann.get("address.zip"), Some(Value::from("0150")));

            // the collection hands out the same document
            let again = users.by_id("u1").unwrap();
            assert_eq!(again.get("address.city"), Some(Value::from("Oslo")));
            assert!(again.updated_at() >= again.created_at());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_rejects_invalid_paths() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let ann = users.by_id("u1").unwrap();

            assert_eq!(ann.set("pets.[].kind", "cow").unwrap_err().kind(), &ErrorKind::InvalidOperation);
            assert_eq!(ann.set("name.first", "A").unwrap_err().kind(), &ErrorKind::InvalidOperation);
            assert_eq!(ann.set("address..city", "Oslo").unwrap_err().kind(), &ErrorKind::ValidationError);
            assert_eq!(ann.get("name"), Some(Value::from("Ann")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_data_replaces_everything() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let bo = users.by_id("u2").unwrap();

            bo.set_data(data! { name: "Bob" })?;
            assert_eq!(bo.get("name"), Some(Value::from("Bob")));
            assert_eq!(bo.get("age"), None);
            assert_eq!(ids(&users.find(&[field("age").lt(18)])), Vec::<String>::new());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_ghost_is_detached() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let ann = users.by_id("u1").unwrap();
            let ghost = ann.ghost();

            assert!(ghost.is_ghost());
            assert_eq!(ghost.id(), "u1");
            assert_eq!(ghost.collection_name(), "users");
            assert_eq!(ghost, ann);
            assert_eq!(ghost.created_at(), ann.created_at());

            ghost.set("name", "Annie")?;
            assert_eq!(ghost.get("name"), Some(Value::from("Annie")));
            assert_eq!(ann.get("name"), Some(Value::from("Ann")));
            assert_eq!(users.size(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_display_includes_id() {
    run_test(
        create_test_context,
        |_ctx| {
            let doc = Document::new("d1", data! { name: "Ann" });
            let text = doc.to_string();
            assert!(text.contains("d1"));
            assert!(text.contains("Ann"));
            assert!(format!("{:?}", doc).starts_with("Document(/d1)"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_wildcard_queries_memoize_paths() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            users.find(&[field("pets.[].kind").includes("cat")]);

            let ann = users.by_id("u1").unwrap();
            assert_eq!(ann.indexed_paths(), vec!["pets.[].kind"]);

            // a write drops what was memoized
            ann.set("pets", Value::Array(vec![]))?;
            assert!(ann.indexed_paths().is_empty());
            assert_eq!(
                ids(&users.find(&[field("pets.[].kind").includes("cat")])),
                vec!["u3"]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_storage_rejection() {
    let storage = FlakyStorage::default();
    let reject = Arc::clone(&storage.reject);
    let memory = storage.memory.clone();

    let db = LiveDoc::builder()
        .storage(storage)
        .refresh_window(Duration::ZERO)
        .open()
        .unwrap();
    let users = db.create_collection("users", user_schema()).unwrap();
    let ann = users.insert(data! { name: "Ann" }).unwrap();
    assert_eq!(memory.len(), 1);

    reject.store(true, Ordering::SeqCst);
    assert_eq!(ann.set("name", "Annie").unwrap_err().kind(), &ErrorKind::StorageError);
    assert_eq!(users.insert(data! { name: "Bo" }).unwrap_err().kind(), &ErrorKind::StorageError);
    assert_eq!(ann.get("name"), Some(Value::from("Ann")));
    assert_eq!(users.size(), 1);

    reject.store(false, Ordering::SeqCst);
    users.delete(&ann).unwrap();
    assert!(memory.is_empty());
}

#[test]
fn test_documents_referencing_each_other() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let ann = users.by_id("u1").unwrap();
            let bo = users.by_id("u2").unwrap();

            ann.set("friend", Value::from(&bo))?;
            bo.set("friend", Value::from(&ann))?;

            let saved = ann.get("friend").and_then(|v| v.as_document().cloned()).unwrap();
            assert!(saved.is_ghost());
            assert_eq!(saved.get("name"), Some(Value::from("Bo")));

            bo.set("name", "Bob")?;
            assert_eq!(saved.get("name"), Some(Value::from("Bo")));

            let populated = users.populate(&users.documents(), "name", false)?;
            assert_eq!(populated.len(), 3);
            assert!(populated.iter().all(|doc| doc.is_ghost()));
            Ok(())
        },
        cleanup,
    )
}
