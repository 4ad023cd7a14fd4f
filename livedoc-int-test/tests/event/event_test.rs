use livedoc::collection::{PopulateOptions, StoreEventInfo, StoreEventListener, StoreEvents};
use livedoc::data;
use livedoc::errors::{ErrorKind, LiveDocError};
use livedoc::filter::field;
use livedoc::livedoc::LiveDoc;
use livedoc_int_test::test_util::{
    cleanup, create_posts, create_sync_test_context, create_users, run_test, user_schema,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn wait_for_event<F: Fn() -> bool>(timeout_ms: u64, check: F) {
    awaitility::at_most(Duration::from_millis(timeout_ms)).until(check);
}

/// Records every event of the store.
fn record(db: &LiveDoc) -> Arc<Mutex<Vec<StoreEventInfo>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    db.subscribe(StoreEventListener::new(move |event: StoreEventInfo| {
        sink.lock().unwrap().push(event);
        Ok(())
    }))
    .unwrap();
    events
}

fn types(events: &Mutex<Vec<StoreEventInfo>>) -> Vec<StoreEvents> {
    events.lock().unwrap().iter().map(|e| e.event_type()).collect()
}

#[test]
fn test_insert_events() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let db = ctx.db();
            let users = db.create_collection("users", user_schema())?;
            let events = record(&db);

            let doc = users.insert(data! { name: "Ann" })?;
            wait_for_event(1000, || types(&events).contains(&StoreEvents::InsertComplete));

            assert_eq!(types(&events), vec![StoreEvents::Insert, StoreEvents::InsertComplete]);
            let complete = events.lock().unwrap()[1].clone();
            assert_eq!(complete.collection(), "users");
            assert_eq!(complete.document_id(), Some(doc.id()));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_events() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let db = ctx.db();
            let users = create_users(&db)?;
            let events = record(&db);

            users.find(&[field("age").gte(18)]);
            wait_for_event(1000, || types(&events).contains(&StoreEvents::FindComplete));

            assert_eq!(types(&events), vec![StoreEvents::Find, StoreEvents::FindComplete]);
            assert_eq!(events.lock().unwrap()[1].count(), Some(2));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_and_index_events() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let db = ctx.db();
            let users = create_users(&db)?;
            users.find_reactive(&[field("age").gte(18)]);
            let events = record(&db);

            users.by_id("u2").unwrap().set("age", 20)?;
            wait_for_event(1000, || types(&events).contains(&StoreEvents::IndexUpdated));

            assert_eq!(
                types(&events),
                vec![StoreEvents::DocumentUpdated, StoreEvents::IndexUpdated]
            );
            let recorded = events.lock().unwrap();
            assert_eq!(recorded[0].document_id(), Some("u2"));
            assert_eq!(recorded[1].count(), Some(3));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_events() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let db = ctx.db();
            let users = create_users(&db)?;
            let events = record(&db);

            users.by_id("u3").unwrap().delete()?;
            wait_for_event(1000, || types(&events).contains(&StoreEvents::DeleteComplete));

            assert_eq!(types(&events), vec![StoreEvents::Delete, StoreEvents::DeleteComplete]);
            assert_eq!(events.lock().unwrap()[0].document_id(), Some("u3"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_populate_events() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let db = ctx.db();
            let users = create_users(&db)?;
            let posts = create_posts(&db)?;
            let events = record(&db);

            let ann = users.by_id("u1").unwrap();
            ann.populate_with(PopulateOptions::new("id", &posts).target_field("author"))?;
            wait_for_event(1000, || types(&events).contains(&StoreEvents::PopulateComplete));

            assert_eq!(
                types(&events),
                vec![
                    StoreEvents::Populate,
                    StoreEvents::Find,
                    StoreEvents::FindComplete,
                    StoreEvents::PopulateComplete,
                ]
            );
            let recorded = events.lock().unwrap();
            assert!(recorded.iter().all(|event| event.collection() == "posts"));
            assert_eq!(recorded[3].count(), Some(1));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_collection_events() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let db = ctx.db();
            let events = record(&db);

            let users = db.create_collection("users", user_schema())?;
            users.insert_many(vec![data! { name: "Ann" }, data! { name: "Bo" }])?;
            db.empty_collection("users")?;
            db.drop_collection("users")?;
            wait_for_event(1000, || types(&events).contains(&StoreEvents::DropCollection));

            let lifecycle = types(&events)
                .into_iter()
                .filter(|t| {
                    matches!(
                        t,
                        StoreEvents::AddCollection
                            | StoreEvents::EmptyCollection
                            | StoreEvents::EmptyCollectionComplete
                            | StoreEvents::DropCollection
                    )
                })
                .collect::<Vec<_>>();
            assert_eq!(
                lifecycle,
                vec![
                    StoreEvents::AddCollection,
                    StoreEvents::EmptyCollection,
                    StoreEvents::EmptyCollectionComplete,
                    StoreEvents::EmptyCollection,
                    StoreEvents::EmptyCollectionComplete,
                    StoreEvents::DropCollection,
                ]
            );

            let recorded = events.lock().unwrap();
            let emptied = recorded
                .iter()
                .find(|e| e.event_type() == StoreEvents::EmptyCollectionComplete)
                .unwrap();
            assert_eq!(emptied.count(), Some(2));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failing_listener_does_not_fail_operation() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let db = ctx.db();
            let users = db.create_collection("users", user_schema())?;
            db.subscribe(StoreEventListener::new(|_: StoreEventInfo| {
                Err::<(), _>(LiveDocError::new("listener failed", ErrorKind::EventError))
            }))?;

            let doc = users.insert(data! { name: "Ann" })?;
            assert_eq!(users.size(), 1);
            doc.set("name", "Annie")?;
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unsubscribe() {
    run_test(
        create_sync_test_context,
        |ctx| {
            let db = ctx.db();
            let events = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&events);
            let subscriber = db.subscribe(StoreEventListener::on(
                StoreEvents::AddCollection,
                move |event: StoreEventInfo| {
                    sink.lock().unwrap().push(event.collection().to_string());
                    Ok(())
                },
            ))?;

            db.create_collection("users", user_schema())?;
            wait_for_event(1000, || events.lock().unwrap().len() == 1);

            db.unsubscribe(subscriber)?;
            db.create_collection("posts", data! {})?;
            std::thread::sleep(Duration::from_millis(100));
            assert_eq!(*events.lock().unwrap(), vec!["users".to_string()]);
            Ok(())
        },
        cleanup,
    )
}
