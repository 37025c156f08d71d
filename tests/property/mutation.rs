//! Property tests for the mutation primitives: reproducibility and
//! permutation invariants.

use proptest::prelude::*;

use scanprobe::mutate::{pack_words, random_bytes, shuffle_words, split_words, WORD_WIDTH};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_bytes_are_reproducible(size in 0usize..512, seed in any::<u64>()) {
        let first = random_bytes(size, seed);
        prop_assert_eq!(first.len(), size);
        prop_assert_eq!(first, random_bytes(size, seed));
    }

    #[test]
    fn shuffle_preserves_the_multiset(
        words in proptest::collection::vec(any::<u64>(), 0..64),
        seed in any::<u64>(),
    ) {
        let mut shuffled = words.clone();
        shuffle_words(&mut shuffled, seed);
        prop_assert_eq!(shuffled.len(), words.len());

        let mut expected = words;
        let mut actual = shuffled;
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn shuffle_is_reproducible(
        words in proptest::collection::vec(any::<u64>(), 0..64),
        seed in any::<u64>(),
    ) {
        let mut first = words.clone();
        let mut second = words;
        shuffle_words(&mut first, seed);
        shuffle_words(&mut second, seed);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn pack_split_roundtrip(words in proptest::collection::vec(any::<u64>(), 0..64)) {
        prop_assert_eq!(split_words(&pack_words(&words)), words);
    }

    #[test]
    fn split_keeps_whole_words_only(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let words = split_words(&bytes);
        prop_assert_eq!(words.len(), bytes.len() / WORD_WIDTH);
        prop_assert_eq!(pack_words(&words), &bytes[..words.len() * WORD_WIDTH]);
    }
}
