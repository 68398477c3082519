//! Sørensen–Dice similarity over byte bigrams.

/// Multiset of two-byte substrings of a label, prepared once so repeated
/// comparisons against many other labels stay cheap.
#[derive(Clone, Debug)]
pub struct DiceString {
  // sorted, with multiplicity; bigram packed as (first << 8) | second
  bigrams: Vec<u16>,
}

impl DiceString {
  pub fn new(s: &str) -> Self {
    let bytes = s.as_bytes();
    // one-byte labels get a padded bigram so equal one-byte labels score 1.0
    let mut bigrams: Vec<u16> = if bytes.len() == 1 {
      vec![u16::from(bytes[0]) << 8]
    } else {
      bytes
        .windows(2)
        .map(|w| u16::from(w[0]) << 8 | u16::from(w[1]))
        .collect()
    };
    bigrams.sort_unstable();
    DiceString { bigrams }
  }

  /// `2*|A∩B| / (|A|+|B|)` over bigram multisets, in `[0.0, 1.0]`.
  pub fn compare(&self, other: &DiceString) -> f32 {
    let total = self.bigrams.len() + other.bigrams.len();
    if total == 0 {
      return 1.0;
    }

    let mut common = 0usize;
    let (mut i, mut j) = (0usize, 0usize);
    while i < self.bigrams.len() && j < other.bigrams.len() {
      match self.bigrams[i].cmp(&other.bigrams[j]) {
        std::cmp::Ordering::Less => i += 1,
        std::cmp::Ordering::Greater => j += 1,
        std::cmp::Ordering::Equal => {
          common += 1;
          i += 1;
          j += 1;
        }
      }
    }

    2.0 * common as f32 / total as f32
  }
}

impl From<&str> for DiceString {
  fn from(s: &str) -> Self {
    DiceString::new(s)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn dice(a: &str, b: &str) -> f32 {
    DiceString::new(a).compare(&DiceString::new(b))
  }

  #[test]
  fn identical_labels_score_one() {
    assert_eq!(dice("", ""), 1.0);
    assert_eq!(dice("x", "x"), 1.0);
    assert_eq!(dice("night", "night"), 1.0);
  }

  #[test]
  fn disjoint_labels_score_zero() {
    assert_eq!(dice("abc", "xyz"), 0.0);
    assert_eq!(dice("a", "b"), 0.0);
  }

  #[test]
  fn similarity_is_symmetric_and_bounded() {
    let pairs = [("night", "nacht"), ("context", "contact"), ("ab", "ba")];
    for (a, b) in pairs {
      let s = dice(a, b);
      assert!((0.0..=1.0).contains(&s));
      assert_eq!(s, dice(b, a));
    }
  }

  #[test]
  fn classic_example() {
    // night/nacht share exactly one of eight bigrams
    assert_eq!(dice("night", "nacht"), 0.25);
  }

  #[test]
  fn multiset_counts_duplicates() {
    // "aaa" = {aa, aa}, "aa" = {aa}: 2*1/(2+1)
    let s = dice("aaa", "aa");
    assert!((s - 2.0 / 3.0).abs() < 1e-6);
  }
}
