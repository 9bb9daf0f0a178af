//! Move Resolver - Reconcile free-form player output with the legal moves
//!
//! Extraction scans the text for SAN-shaped tokens and keeps the last one,
//! since agents state their decision after their reasoning. A candidate that
//! is missing or not legal falls back to a uniformly random legal move. The
//! only state is the injected RNG, so a seeded resolver is reproducible.

use std::fmt;
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use thiserror::Error;

/// Errors raised by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// There is nothing to choose from, which only a broken rules engine
    /// can cause outside a terminal position
    #[error("No legal moves to choose from")]
    NoLegalMoves,
}

/// Why a fallback move was played
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No move-shaped token in the output
    NoMoveFound,
    /// The last token was not a legal move
    IllegalMove { candidate: String },
    /// The player could not produce any output
    PlayerFailure { detail: String },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoMoveFound => write!(f, "no move found in the output"),
            FallbackReason::IllegalMove { candidate } => {
                write!(f, "illegal move '{}'", candidate)
            }
            FallbackReason::PlayerFailure { detail } => {
                write!(f, "player failure: {}", detail)
            }
        }
    }
}

/// A resolved move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical SAN, always a member of the legal set
    pub san: String,
    /// Token extracted from the text, if any
    pub candidate: Option<String>,
    /// Set when `san` was chosen at random
    pub fallback: Option<FallbackReason>,
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

fn san_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"\b(?:",
            r"[O0]-[O0](?:-[O0])?",
            r"|[KQRBN][a-h]?[1-8]?x?[a-h][1-8]",
            r"|[a-h](?:x[a-h])?[1-8](?:=?[QRBN])?",
            r")[+#]?",
        ))
        .unwrap_or_else(|e| unreachable!("SAN pattern is valid: {e}"))
    })
}

/// Move resolver with an injected RNG
#[derive(Debug, Clone)]
pub struct MoveResolver {
    rng: StdRng,
}

impl MoveResolver {
    /// Resolver seeded from system entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible resolver
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Resolve free text to a legal move
    ///
    /// Always returns a member of `legal` unless `legal` is empty.
    pub fn resolve(&mut self, text: &str, legal: &[String]) -> Result<Resolution, ResolveError> {
        if legal.is_empty() {
            return Err(ResolveError::NoLegalMoves);
        }

        let candidate = Self::last_candidate(text);
        let reason = match &candidate {
            Some(token) => match Self::match_exact(token, legal) {
                Some(san) => {
                    return Ok(Resolution {
                        san,
                        candidate,
                        fallback: None,
                    })
                }
                None => FallbackReason::IllegalMove {
                    candidate: token.clone(),
                },
            },
            None => FallbackReason::NoMoveFound,
        };

        let san = self.random_move(legal)?;
        Ok(Resolution {
            san,
            candidate,
            fallback: Some(reason),
        })
    }

    /// Uniformly random legal move
    pub fn random_move(&mut self, legal: &[String]) -> Result<String, ResolveError> {
        legal
            .choose(&mut self.rng)
            .cloned()
            .ok_or(ResolveError::NoLegalMoves)
    }

    /// Membership check for input that is meant to be the move itself
    ///
    /// Ignores a trailing check or mate marker, a promotion `=` and castling
    /// written with zeros. Returns the canonical entry from `legal`.
    pub fn match_exact(input: &str, legal: &[String]) -> Option<String> {
        let wanted = normalize(input.trim());
        if wanted.is_empty() {
            return None;
        }
        legal.iter().find(|san| normalize(san) == wanted).cloned()
    }

    /// Every SAN-shaped token in `text`, in order of appearance
    pub fn extract_candidates(text: &str) -> Vec<String> {
        san_pattern()
            .find_iter(text)
            .filter(|m| {
                // Reject tokens glued to a longer word, like "e4x" or "Nf3rd"
                !text[m.end()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_alphanumeric())
            })
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// The last SAN-shaped token in `text`
    pub fn last_candidate(text: &str) -> Option<String> {
        Self::extract_candidates(text).pop()
    }
}

impl Default for MoveResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(san: &str) -> String {
    let san = san.trim_end_matches(['+', '#', '!', '?']);
    if san.starts_with('0') {
        san.replace('0', "O")
    } else {
        san.replace('=', "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, RngCore};

    fn legal(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    fn opening() -> Vec<String> {
        legal(&["e4", "d4", "Nf3", "Nc3", "c4", "g3"])
    }

    #[test]
    fn test_single_legal_token() {
        let mut resolver = MoveResolver::seeded(1);
        let resolution = resolver.resolve("I play e4", &opening()).unwrap();
        assert_eq!(resolution.san, "e4");
        assert!(!resolution.is_fallback());
    }

    #[test]
    fn test_last_match_wins() {
        let mut resolver = MoveResolver::seeded(1);
        let text = "I will play the rook move... wait, actually Nf3 is better. Nf3.";
        let resolution = resolver.resolve(text, &opening()).unwrap();
        assert_eq!(resolution.san, "Nf3");
        assert_eq!(resolution.candidate.as_deref(), Some("Nf3"));
    }

    #[test]
    fn test_last_match_wins_over_earlier_illegal_tokens() {
        let mut resolver = MoveResolver::seeded(1);
        let text = "Qxf7 would be nice, Ke2 is silly, Bb5 is not possible yet. d4";
        let resolution = resolver.resolve(text, &opening()).unwrap();
        assert_eq!(resolution.san, "d4");
    }

    #[test]
    fn test_last_token_illegal_falls_back() {
        let mut resolver = MoveResolver::seeded(1);
        let resolution = resolver.resolve("e4 or maybe Qh5", &opening()).unwrap();

        assert!(opening().contains(&resolution.san));
        assert_eq!(
            resolution.fallback,
            Some(FallbackReason::IllegalMove {
                candidate: "Qh5".to_string()
            })
        );
    }

    #[test]
    fn test_no_token_falls_back() {
        let mut resolver = MoveResolver::seeded(1);
        let resolution = resolver
            .resolve("I resign myself to thinking harder.", &opening())
            .unwrap();

        assert!(opening().contains(&resolution.san));
        assert_eq!(resolution.candidate, None);
        assert_eq!(resolution.fallback, Some(FallbackReason::NoMoveFound));
    }

    #[test]
    fn test_empty_legal_set_is_an_error() {
        let mut resolver = MoveResolver::seeded(1);
        assert_eq!(
            resolver.resolve("e4", &[]).unwrap_err(),
            ResolveError::NoLegalMoves
        );
        assert!(resolver.random_move(&[]).is_err());
    }

    #[test]
    fn test_seeded_fallback_is_reproducible() {
        let moves = opening();
        let picks = |seed| {
            let mut resolver = MoveResolver::seeded(seed);
            (0..10)
                .map(|_| resolver.resolve("", &moves).unwrap().san)
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
    }

    #[test]
    fn test_extract_candidates() {
        let found = MoveResolver::extract_candidates(
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Bxc6 dxc6 5. O-O f6 6. d4 exd4 7. Nxd4 Qd7+",
        );
        assert_eq!(
            found,
            vec![
                "e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Bxc6", "dxc6", "O-O", "f6", "d4", "exd4",
                "Nxd4", "Qd7+"
            ]
        );
    }

    #[test]
    fn test_extract_special_forms() {
        assert_eq!(
            MoveResolver::extract_candidates("Castle long: O-O-O, then e8=Q# and Raxd1"),
            vec!["O-O-O", "e8=Q#", "Raxd1"]
        );
        assert_eq!(MoveResolver::extract_candidates("R1e2 Nbd7"), vec!["R1e2", "Nbd7"]);
    }

    #[test]
    fn test_extract_ignores_words() {
        assert!(MoveResolver::extract_candidates("The bishop and the knight are on board").is_empty());
        assert!(MoveResolver::extract_candidates("c3po e4x Nf3rd").is_empty());
    }

    #[test]
    fn test_check_suffix_is_ignored() {
        let moves = legal(&["Qh5+", "Nf3"]);
        let mut resolver = MoveResolver::seeded(1);

        let resolution = resolver.resolve("Going for Qh5", &moves).unwrap();
        assert_eq!(resolution.san, "Qh5+");
        assert!(!resolution.is_fallback());

        assert_eq!(MoveResolver::match_exact("Nf3+", &moves), Some("Nf3".to_string()));
    }

    #[test]
    fn test_castling_with_zeros() {
        let moves = legal(&["O-O", "O-O-O", "Kf1"]);
        let mut resolver = MoveResolver::seeded(1);

        assert_eq!(resolver.resolve("castle 0-0", &moves).unwrap().san, "O-O");
        assert_eq!(MoveResolver::match_exact("0-0-0", &moves), Some("O-O-O".to_string()));
    }

    #[test]
    fn test_promotion_without_equals() {
        let moves = legal(&["e8=Q", "e8=N"]);
        assert_eq!(MoveResolver::match_exact("e8Q", &moves), Some("e8=Q".to_string()));
    }

    #[test]
    fn test_match_exact_rejects_prose() {
        let moves = opening();
        assert_eq!(MoveResolver::match_exact("play e4", &moves), None);
        assert_eq!(MoveResolver::match_exact("", &moves), None);
        assert_eq!(MoveResolver::match_exact(" d4 ", &moves), Some("d4".to_string()));
    }

    #[test]
    fn test_resolve_always_returns_legal_member() {
        let alphabet: Vec<char> = "abcdefghKQRBNOx0123456789-=+# .,!?\n".chars().collect();
        let mut gen = StdRng::seed_from_u64(7);
        let mut resolver = MoveResolver::seeded(7);

        for _ in 0..500 {
            let size = gen.gen_range(1..8);
            let moves: Vec<String> = (0..size)
                .map(|i| format!("{}{}", ["a", "Nb", "Qc", "Rd"][i % 4], gen.gen_range(1..9)))
                .collect();
            let len = (gen.next_u32() % 60) as usize;
            let text: String = (0..len)
                .map(|_| alphabet[gen.gen_range(0..alphabet.len())])
                .collect();

            let resolution = resolver.resolve(&text, &moves).unwrap();
            assert!(moves.contains(&resolution.san), "text {:?}", text);
        }
    }
}
