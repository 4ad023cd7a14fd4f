use livedoc::collection::Document;
use livedoc::data;
use livedoc::errors::ErrorKind;
use livedoc::filter::field;
use livedoc_int_test::test_util::{cleanup, create_test_context, create_users, ids, run_test};

#[test]
fn test_delete_document() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let bo = users.by_id("u2").unwrap();

            users.delete(&bo)?;
            assert!(bo.is_deleted());
            assert_eq!(ids(&users.documents()), vec!["u1", "u3"]);
            assert!(users.by_id("u2").is_none());
            assert_eq!(ids(&users.find(&[field("tags").includes("dev")])), vec!["u1"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_through_document() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            users.by_id("u1").unwrap().delete()?;
            assert_eq!(users.size(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_twice() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let ann = users.by_id("u1").unwrap();
            ann.delete()?;

            let err = users.delete(&ann).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DocumentDeleted);
            assert_eq!(users.size(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_ghost_document() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;

            let ghost = users.by_id("u1").unwrap().ghost();
            let err = users.delete(&ghost).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

            let standalone = Document::new("u1", data! { name: "Ann" });
            assert_eq!(standalone.delete().unwrap_err().kind(), &ErrorKind::InvalidOperation);
            assert_eq!(users.size(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_from_other_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let users = create_users(&db)?;
            let admins = db.create_collection("admins", data! { name: "" })?;

            let ann = users.by_id("u1").unwrap();
            let err = admins.delete(&ann).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DocumentDeleted);
            assert!(!ann.is_deleted());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_deleted_document_rejects_writes() {
    run_test(
        create_test_context,
        |ctx| {
            let users = create_users(&ctx.db())?;
            let cy = users.by_id("u3").unwrap();
            cy.delete()?;

            assert_eq!(cy.set("age", 46).unwrap_err().kind(), &ErrorKind::DocumentDeleted);
            assert_eq!(
                cy.set_data(data! { name: "Cy" }).unwrap_err().kind(),
                &ErrorKind::DocumentDeleted
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_empty_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let users = create_users(&db)?;
            let ann = users.by_id("u1").unwrap();

            assert_eq!(db.empty_collection("users")?, 3);
            assert!(ann.is_deleted());
            assert_eq!(users.size(), 0);
            assert!(db.has_collection("users"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_drop_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let users = create_users(&db)?;
            let ann = users.by_id("u1").unwrap();

            db.drop_collection("users")?;
            assert!(ann.is_deleted());
            assert!(!db.has_collection("users"));
            assert_eq!(
                db.collection("users").unwrap_err().kind(),
                &ErrorKind::CollectionNotFound
            );
            Ok(())
        },
        cleanup,
    )
}
