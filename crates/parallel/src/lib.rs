//! Declarative parallel/sequential execution helpers.
//!
//! Per-symbol feature computation is embarrassingly parallel: each
//! symbol's history is read-only and results are merged by symbol key
//! with no ordering requirement. This crate confines the `cfg` logic
//! for parallel vs sequential execution to one place so call sites in
//! the feature builder stay clean.
//!
//! [`map_slice`] accepts a `force_sequential` parameter. When `true`,
//! execution is sequential even if the `parallel` feature is enabled,
//! which keeps profiling and determinism debugging a runtime switch
//! rather than a rebuild.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Map a function over a slice, potentially in parallel.
///
/// Output order matches input order (rayon preserves order), so callers
/// may rely on positional correspondence.
#[inline]
pub fn map_slice<T, F, R>(slice: &[T], f: F, force_sequential: bool) -> Vec<R>
where
    T: Sync,
    F: Fn(&T) -> R + Sync + Send,
    R: Send,
{
    #[cfg(feature = "parallel")]
    {
        if force_sequential {
            slice.iter().map(f).collect()
        } else {
            slice.par_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = force_sequential;
        slice.iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_slice_preserves_order() {
        let input: Vec<u64> = (0..100).collect();
        let doubled = map_slice(&input, |x| x * 2, false);
        assert_eq!(doubled, input.iter().map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn map_slice_sequential_override_matches() {
        let input: Vec<u64> = (0..100).collect();
        assert_eq!(
            map_slice(&input, |x| x + 1, true),
            map_slice(&input, |x| x + 1, false)
        );
    }
}
