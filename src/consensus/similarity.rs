//! Set similarity

use std::collections::BTreeSet;

/// Overlap coefficient `|A ∩ B| / min(|A|, |B|)`.
///
/// 0 when either set is empty, so two empty sets are not similar.
pub fn overlap_coefficient<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let shared = small.iter().filter(|x| large.contains(x)).count();
    shared as f64 / smaller as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(items: &[&'static str]) -> BTreeSet<&'static str> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_overlap_coefficient() {
        assert_eq!(overlap_coefficient(&s(&["x", "y"]), &s(&["x", "y", "z"])), 1.0);
        assert_eq!(overlap_coefficient(&s(&["x", "y"]), &s(&["x", "y"])), 1.0);
        assert_eq!(overlap_coefficient(&s(&["x"]), &s(&["y"])), 0.0);
        assert_eq!(overlap_coefficient(&s(&["a", "b", "c", "d"]), &s(&["a", "x"])), 0.5);
    }

    #[test]
    fn test_empty_sets_are_dissimilar() {
        assert_eq!(overlap_coefficient(&s(&[]), &s(&[])), 0.0);
        assert_eq!(overlap_coefficient(&s(&[]), &s(&["x"])), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = s(&["a", "b", "c"]);
        let b = s(&["b", "c", "d", "e", "f"]);
        assert_eq!(overlap_coefficient(&a, &b), overlap_coefficient(&b, &a));
    }
}
