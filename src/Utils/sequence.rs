//! Adapter turning lazy estimate producers into concrete containers.
//!
//! The isoconversional estimators are written as iterator producers so a
//! caller can stop at any grid index; most callers, however, want the
//! whole profile at once. `collect_lazy` materializes a producer into a
//! vector and propagates the first error it encounters, so a singular
//! regression at index n surfaces immediately instead of being buried in
//! a partially valid result.

/// Materializes a lazy sequence of fallible items into a vector, stopping
/// at the first error.
pub fn collect_lazy<T, E>(
    producer: impl IntoIterator<Item = Result<T, E>>,
) -> Result<Vec<T>, E> {
    producer.into_iter().collect()
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_all_items_in_order() {
        let items = (0..5).map(Ok::<usize, String>);
        assert_eq!(collect_lazy(items).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn stops_at_first_error() {
        let items = vec![Ok(1), Err("broken".to_string()), Ok(3)];
        assert_eq!(collect_lazy(items), Err("broken".to_string()));
    }
}
