//! Batch-level failure message shared by both executors.

/// Builds the overall error for a batch from `(index, message)` pairs of the
/// failed operations. Returns `None` when nothing failed.
///
/// One failure reads `operation 1 failed: msg`; more than one reads
/// `2 operations failed: [1]: msg; [3]: msg`.
pub fn summarize_failures<I, S>(failures: I) -> Option<String>
where
    I: IntoIterator<Item = (usize, S)>,
    S: AsRef<str>,
{
    let failures: Vec<(usize, S)> = failures.into_iter().collect();
    match failures.as_slice() {
        [] => None,
        [(index, msg)] => Some(format!("operation {} failed: {}", index, msg.as_ref())),
        many => {
            let joined = many
                .iter()
                .map(|(index, msg)| format!("[{}]: {}", index, msg.as_ref()))
                .collect::<Vec<_>>()
                .join("; ");
            Some(format!("{} operations failed: {}", many.len(), joined))
        }
    }
}
