use livedoc::collection::{InsertOptions, StoreEventInfo, StoreEventListener, StoreEvents};
use livedoc::data;
use livedoc::errors::ErrorKind;
use livedoc::filter::{field, Operation, QueryBuilder};
use livedoc::livedoc::LiveDoc;
use livedoc_int_test::test_util::{
    cleanup, create_sync_test_context, create_test_context, create_users, run_test, user_schema, wait_until,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use test_retry::retry;

#[test]
fn test_reactive_index_follows_inserts_and_deletes() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let adults = users.find_reactive(&[field("age").gte(18)]);
            assert_eq!(adults.ids(), vec!["u1", "u3"]);

            users.insert_with(data! { name: "Dee", age: 20 }, InsertOptions::with_id("u4"))?;
            assert_eq!(adults.ids(), vec!["u1", "u3", "u4"]);

            users.by_id("u1").unwrap().delete()?;
            assert_eq!(adults.ids(), vec!["u3", "u4"]);
            assert_eq!(adults.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_reactive_index_follows_writes_synchronously() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let adults = users.find_reactive(&[field("age").gte(18)]);

            users.by_id("u2").unwrap().set("age", 18)?;
            assert_eq!(adults.ids(), vec!["u1", "u2", "u3"]);

            users.by_id("u3").unwrap().set("age", 12)?;
            assert_eq!(adults.ids(), vec!["u1", "u2"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
#[retry]
fn test_reactive_index_follows_writes_after_window() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let dev_pets = users.find_reactive(&[
                field("tags").includes("dev"),
                field("pets.[].kind").includes("fish"),
            ]);
            assert!(dev_pets.is_empty());

            users
                .by_id("u2")
                .unwrap()
                .set("pets", vec![livedoc::data_value!({ kind: "fish", age: 1 })])?;

            wait_until(Duration::from_secs(1), || dev_pets.ids() == vec!["u2"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
#[retry]
fn test_bursts_of_writes_refresh_once() {
    let db = LiveDoc::builder()
        .refresh_window(Duration::from_millis(200))
        .open()
        .unwrap();
    let users = create_users(&db).unwrap();
    let adults = users.find_reactive(&[field("age").gte(18)]);

    let refreshes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&refreshes);
    db.subscribe(StoreEventListener::on(StoreEvents::IndexUpdated, move |_: StoreEventInfo| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }))
    .unwrap();

    let bo = users.by_id("u2").unwrap();
    for age in 10..20 {
        bo.set("age", age).unwrap();
    }

    wait_until(Duration::from_secs(2), || adults.ids() == vec!["u1", "u2", "u3"]);
    thread::sleep(Duration::from_millis(300));
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reactive_index_with_or_group() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let query = QueryBuilder::new()
                .where_("age", Operation::Gte, 40)
                .or_where(|q| q.where_("name", Operation::Eq, "Bo"));
            let index = users.find_reactive(&query);

            let mut ids = index.ids();
            ids.sort();
            assert_eq!(ids, vec!["u2", "u3"]);

            users.by_id("u2").unwrap().set("name", "Bob")?;
            assert_eq!(index.ids(), vec!["u3"]);
            assert_eq!(index.query().len(), query.predicates().len());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_reactive_index_skips_refresh_when_asked() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let minors = users.find_reactive(&[field("age").lt(18)]);

            users.insert_with(
                data! { name: "Eve", age: 9 },
                InsertOptions {
                    id: Some("u5".to_string()),
                    reactive_update: false,
                },
            )?;
            assert_eq!(minors.ids(), vec!["u2"]);

            users.refresh_reactive_indexes();
            assert_eq!(minors.ids(), vec!["u2", "u5"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_refresh_reactive_index_by_id() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let users = create_users(&db)?;
            let others = db.create_collection("others", user_schema())?;

            let minors = users.find_reactive(&[field("age").lt(18)]);
            let found = users.reactive_index(minors.id()).unwrap();
            assert_eq!(found.id(), minors.id());

            users.insert_with(
                data! { name: "Eve", age: 9 },
                InsertOptions {
                    id: Some("u5".to_string()),
                    reactive_update: false,
                },
            )?;
            users.refresh_reactive_index(minors.id())?;
            assert_eq!(found.ids(), vec!["u2", "u5"]);

            let err = others.refresh_reactive_index(minors.id()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidId);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_reactive_index_caches_wildcard_paths() {
    let db = LiveDoc::builder()
        .dynamic_indexes(false)
        .refresh_window(Duration::ZERO)
        .open()
        .unwrap();
    let users = create_users(&db).unwrap();
    let ann = users.by_id("u1").unwrap();

    users.find(&[field("pets.[].kind").includes("cat")]);
    assert!(ann.indexed_paths().is_empty());

    let cats = users.find_reactive(&[field("pets.[].kind").includes("cat")]);
    assert_eq!(cats.ids(), vec!["u1", "u3"]);
    assert_eq!(ann.indexed_paths(), vec!["pets.[].kind"]);
}

#[test]
fn test_dropped_collection_forgets_reactive_indexes() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let users = create_users(&db)?;
            let adults = users.find_reactive(&[field("age").gte(18)]);

            db.drop_collection("users")?;
            assert!(users.reactive_index(adults.id()).is_none());
            assert!(adults.is_empty());
            Ok(())
        },
        cleanup,
    )
}
