//! Pseudonymous display names.
//!
//! Every session gets a name like "Grumpy Fox", derived purely from its ID
//! so that the same token always maps to the same name. Clients keep test
//! vectors for this mapping, so the word lists, their order, the 40-bit
//! seed and the multiplier must not change.

const ADJECTIVES: &[&str] = &[
    "Happy", "Angry", "Sleepy", "Sneaky", "Giggly", "Dizzy", "Cheeky", "Wacky",
    "Fluffy", "Silly", "Cranky", "Zany", "Fuzzy", "Bouncy", "Goofy", "Chubby",
    "Squishy", "Spooky", "Snuggly", "Whizzy", "Dopey", "Bubbly", "Jolly", "Sassy",
    "Grumpy", "Clumsy", "Merry", "Boozy", "Wobbly", "Nerdy", "Curious", "Zippy",
    "Droopy", "Tipsy", "Dreamy", "Fancy", "Rowdy", "Nifty", "Hairy", "Gloomy",
];

const CREATURES: &[&str] = &[
    "Alligator", "Cat", "Dog", "Elephant", "Giraffe", "Hippo", "Kangaroo", "Lion",
    "Monkey", "Ostrich", "Penguin", "Raccoon", "Sloth", "Tiger", "Unicorn", "Vampire",
    "Yeti", "Zebra", "Dragon", "Narwhal", "Hamster", "Bear", "Fox", "Deer",
    "Dolphin", "Panda", "Polar Bear", "Whale", "Gorilla", "Rhino", "Cheetah", "Seal",
    "Eagle", "Rabbit", "Octopus", "Turtle", "Cobra", "Jaguar", "Wolf", "Puma",
    "Otter", "Lemur", "Hedgehog", "Koala", "Porcupine",
];

/// Number of hex digits (40 bits) read from the token.
const SEED_DIGITS: usize = 10;

const CREATURE_MULTIPLIER: u64 = 13;

/// Seed taken from the first 40 bits of the token's hex digits.
///
/// Separators and any other non-hex characters are skipped. A token with
/// fewer than ten hex digits uses the ones it has; a token with none seeds 0.
pub fn seed(token: &str) -> u64 {
    token
        .chars()
        .filter_map(|c| c.to_digit(16))
        .take(SEED_DIGITS)
        .fold(0u64, |acc, digit| (acc << 4) | u64::from(digit))
}

/// Derive the display name for a session token.
pub fn generate(token: &str) -> String {
    let seed = seed(token);
    let adjective = ADJECTIVES[(seed % ADJECTIVES.len() as u64) as usize];
    let creature =
        CREATURES[((seed * CREATURE_MULTIPLIER) % CREATURES.len() as u64) as usize];
    format!("{adjective} {creature}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_list_sizes() {
        assert_eq!(ADJECTIVES.len(), 40);
        assert_eq!(CREATURES.len(), 45);
    }

    #[test]
    fn test_seed_reads_forty_bits() {
        assert_eq!(seed("123e4567-e89b-12d3-a456-426614174000"), 0x12_3e45_67e8);
        assert_eq!(seed("ffffffff-ffff-ffff-ffff-ffffffffffff"), (1u64 << 40) - 1);
    }

    #[test]
    fn test_seed_ignores_separators_and_case() {
        assert_eq!(seed("12-3E:45 67e8"), seed("123e4567e8"));
        assert_eq!(seed(""), 0);
        assert_eq!(seed("----"), 0);
    }

    #[test]
    fn test_golden_vectors() {
        assert_eq!(generate("123e4567-e89b-12d3-a456-426614174000"), "Grumpy Fox");
        assert_eq!(generate("67e55044-10b1-426f-9247-bb680e5fe0c8"), "Squishy Koala");
        assert_eq!(generate("00000000-0000-0000-0000-000000000000"), "Happy Alligator");
        assert_eq!(generate("ffffffff-ffff-ffff-ffff-ffffffffffff"), "Chubby Vampire");
    }

    #[test]
    fn test_short_token() {
        assert_eq!(generate("a1b2c"), "Rowdy Rabbit");
    }

    #[test]
    fn test_deterministic() {
        let token = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let first = generate(token);
        for _ in 0..100 {
            assert_eq!(generate(token), first);
        }
    }

    #[test]
    fn test_only_first_forty_bits_matter() {
        assert_eq!(
            generate("123e4567-e8ff-ffff-ffff-ffffffffffff"),
            generate("123e4567-e800-0000-0000-000000000000"),
        );
    }
}
