//! Round-robin distribution of records across recipients.

use std::num::NonZeroUsize;

/// Split `records` into exactly `bucket_count` buckets, round-robin.
///
/// The record at position `i` lands in bucket `i % bucket_count`. Bucket
/// sizes therefore differ by at most one, the first
/// `records.len() % bucket_count` buckets hold the extra record, and records
/// keep their original relative order inside each bucket.
///
/// ```
/// use std::num::NonZeroUsize;
/// use leaddesk_core::distribute;
///
/// let buckets = distribute(vec!['a', 'b', 'c', 'd', 'e'], NonZeroUsize::new(2).unwrap());
/// assert_eq!(buckets, vec![vec!['a', 'c', 'e'], vec!['b', 'd']]);
/// ```
#[must_use]
pub fn distribute<T>(records: Vec<T>, bucket_count: NonZeroUsize) -> Vec<Vec<T>> {
    let n = bucket_count.get();
    let per_bucket = records.len().div_ceil(n);
    let mut buckets: Vec<Vec<T>> = (0..n).map(|_| Vec::with_capacity(per_bucket)).collect();

    for (slot, record) in (0..n).cycle().zip(records) {
        if let Some(bucket) = buckets.get_mut(slot) {
            bucket.push(record);
        }
    }

    buckets
}
