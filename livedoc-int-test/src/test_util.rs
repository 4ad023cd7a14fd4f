use livedoc::collection::{Collection, Document, InsertOptions};
use livedoc::common::Data;
use livedoc::data;
use livedoc::errors::LiveDocResult;
use livedoc::livedoc::LiveDoc;
use std::backtrace::Backtrace;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a test between a setup and a teardown step, retrying failed runs.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> LiveDocResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> LiveDocResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> LiveDocResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx).map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let message = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                if !bt.is_empty() && !bt.contains("disabled") {
                    eprintln!("Backtrace:\n{}", bt);
                }
                e
            }
            Err(panic_err) => {
                if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Panic: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Panic: {}", s)
                } else {
                    "Panic: unknown payload".to_string()
                }
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt,
                MAX_RETRIES,
                start_time.elapsed()
            );
            eprintln!("Error: {}", message);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(message);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

#[derive(Clone)]
pub struct TestContext {
    name: String,
    db: LiveDoc,
}

impl TestContext {
    pub fn new(name: String, db: LiveDoc) -> Self {
        Self { name, db }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn db(&self) -> LiveDoc {
        self.db.clone()
    }
}

pub fn random_name() -> String {
    format!("livedoc-{}", uuid::Uuid::new_v4())
}

/// A store with the default refresh window.
pub fn create_test_context() -> LiveDocResult<TestContext> {
    let name = random_name();
    let db = LiveDoc::builder().name(&name).open()?;
    Ok(TestContext::new(name, db))
}

/// A store whose reactive indexes refresh on every write.
pub fn create_sync_test_context() -> LiveDocResult<TestContext> {
    let name = random_name();
    let db = LiveDoc::builder()
        .name(&name)
        .refresh_window(Duration::ZERO)
        .open()?;
    Ok(TestContext::new(name, db))
}

pub fn cleanup(ctx: TestContext) -> LiveDocResult<()> {
    let db = ctx.db();
    for name in db.collection_names() {
        db.drop_collection(&name)?;
    }
    log::debug!("Cleaned up store {}", ctx.name());
    Ok(())
}

pub fn user_schema() -> Data {
    data! { name: "", age: 0, tags: [], friendId: "", pets: [{ kind: "", age: 0 }] }
}

/// `users` with u1 Ann 30, u2 Bo 17 and u3 Cy 45.
pub fn create_users(db: &LiveDoc) -> LiveDocResult<Collection> {
    let users = db.create_collection("users", user_schema())?;
    users.insert_with(
        data! { name: "Ann", age: 30, tags: ["admin", "dev"], friendId: "u2", pets: [{ kind: "cat", age: 3 }] },
        InsertOptions::with_id("u1"),
    )?;
    users.insert_with(
        data! { name: "Bo", age: 17, tags: ["dev"], friendId: "u1", pets: [] },
        InsertOptions::with_id("u2"),
    )?;
    users.insert_with(
        data! { name: "Cy", age: 45, tags: [], friendId: "u9", pets: [{ kind: "dog", age: 7 }, { kind: "cat", age: 1 }] },
        InsertOptions::with_id("u3"),
    )?;
    Ok(users)
}

/// `posts` referencing users by `author` and `likes`.
pub fn create_posts(db: &LiveDoc) -> LiveDocResult<Collection> {
    let posts = db.create_collection("posts", data! { title: "", author: "", likes: [] })?;
    posts.insert_with(
        data! { title: "Hello", author: "u1", likes: ["u2", "u3"] },
        InsertOptions::with_id("p1"),
    )?;
    posts.insert_with(
        data! { title: "Again", author: "u2", likes: ["u1", "gone"] },
        InsertOptions::with_id("p2"),
    )?;
    Ok(posts)
}

pub fn ids(documents: &[Document]) -> Vec<String> {
    documents.iter().map(|doc| doc.id().to_string()).collect()
}

pub fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) {
    awaitility::at_most(timeout).until(condition);
}
