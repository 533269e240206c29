use std::sync::Arc;
use std::thread;

use reader::{Reader, RowReaderOptions};
use sarg::{
    BoundSearchArgument, ColumnStatistics, PredicateDataType, SearchArgument,
    SearchArgumentFactory,
};
use tests::{scan_all, two_stripe_file};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_shared_types_are_send_and_sync() {
    assert_send_sync::<SearchArgument>();
    assert_send_sync::<Arc<SearchArgument>>();
    assert_send_sync::<ColumnStatistics>();
    assert_send_sync::<BoundSearchArgument>();
}

#[test]
fn test_row_readers_share_search_argument_across_threads() {
    let sarg = Arc::new(
        SearchArgumentFactory::new_builder()
            .start_or()
            .less_than("col1", PredicateDataType::Long, 1200i64)
            .between("col1", PredicateDataType::Long, 5000i64, 6100i64)
            .end()
            .build()
            .expect("Failed to build search argument"),
    );
    let reader = Reader::open(two_stripe_file().expect("Failed to build file"))
        .expect("Failed to open reader");
    let options = RowReaderOptions::new().with_search_argument(Arc::clone(&sarg));

    let scanned: Vec<Vec<u64>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let mut rows = reader
                    .row_reader(&options)
                    .expect("Failed to create row reader");
                scope.spawn(move || {
                    scan_all(&mut rows, 700)
                        .expect("Failed to scan")
                        .iter()
                        .flat_map(|b| b.rows())
                        .collect::<Vec<u64>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("Scan thread panicked"))
            .collect()
    });

    assert_eq!(scanned[0], scanned[1]);
    let expected: Vec<u64> = (0..2000).chain(4500..6500).collect();
    assert_eq!(scanned[0], expected);
    assert_eq!(Arc::strong_count(&sarg), 2);
}
