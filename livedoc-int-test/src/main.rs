use livedoc::data;
use livedoc::errors::LiveDocResult;
use livedoc::filter::field;
use livedoc_int_test::test_util::{cleanup, create_test_context};

fn main() -> LiveDocResult<()> {
    colog::init();
    println!("Starting stress test...");
    let ctx = create_test_context()?;

    let count = 100000;
    let records = ctx.db().create_collection(
        "records",
        data! { firstName: "", lastName: "", processed: false, failed: false },
    )?;
    let pending = records.find_reactive(&[field("processed").eq(false)]);

    let start = std::time::Instant::now();
    let batch = (0..count)
        .map(|_| {
            data! {
                firstName: (uuid::Uuid::new_v4().to_string()),
                lastName: (uuid::Uuid::new_v4().to_string()),
                processed: false,
                failed: false,
            }
        })
        .collect();
    records.insert_many(batch)?;
    println!("Inserted {} records in {:?}", count, start.elapsed());
    println!("{} records pending", pending.len());

    let start = std::time::Instant::now();
    let found = records.find(&[field("failed").eq(false)]);
    println!("Found {} records in {:?}", found.len(), start.elapsed());

    let start = std::time::Instant::now();
    for record in &found {
        record.set("processed", true)?;
    }
    println!("Processed {} records in {:?}", found.len(), start.elapsed());

    let start = std::time::Instant::now();
    records.refresh_reactive_index(pending.id())?;
    println!("Refreshed reactive index to {} records in {:?}", pending.len(), start.elapsed());

    cleanup(ctx)
}
