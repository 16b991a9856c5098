//! Parallel utilities with feature-gated implementations
//!
//! With the `native` feature the helpers run on the rayon thread pool;
//! without it they fall back to plain iterators with the same results.

/// Check if parallel processing is available
#[cfg(feature = "native")]
pub fn is_parallel_available() -> bool {
    true
}

/// Check if parallel processing is available
#[cfg(not(feature = "native"))]
pub fn is_parallel_available() -> bool {
    false
}

/// Number of worker threads the helpers will use
#[cfg(feature = "native")]
pub fn worker_count() -> usize {
    rayon::current_num_threads()
}

/// Number of worker threads the helpers will use
#[cfg(not(feature = "native"))]
pub fn worker_count() -> usize {
    1
}

/// Parallel map over a slice, preserving order
#[cfg(feature = "native")]
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    use rayon::prelude::*;
    data.par_iter().map(f).collect()
}

/// Sequential map (fallback when parallel is not available)
#[cfg(not(feature = "native"))]
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    F: Fn(&T) -> U,
{
    data.iter().map(f).collect()
}

/// Parallel map over `0..count`, preserving order
///
/// Each index is handled by exactly one task, so closures writing
/// index-owned output never race.
#[cfg(feature = "native")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Sequential map with index (fallback)
#[cfg(not(feature = "native"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_map() {
        let data = vec![1.0, 2.0, 3.0];
        let result = parallel_map(&data, |x| x * 0.5);
        assert_eq!(result, vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_parallel_map_indexed_keeps_order() {
        let result = parallel_map_indexed(1000, |i| i * i);
        assert!(result.iter().enumerate().all(|(i, &v)| v == i * i));
    }

    #[test]
    fn test_worker_count_positive() {
        assert!(worker_count() >= 1);
        if !is_parallel_available() {
            assert_eq!(worker_count(), 1);
        }
    }
}
