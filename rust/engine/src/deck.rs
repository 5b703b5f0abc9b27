//! Committed deck: shuffle, publish a hash, deal, reveal.
//!
//! The commitment is `SHA-256(seed_hex || order)` where `order` is the
//! comma-joined list of two-character card codes in shuffled order. It is
//! produced by [`Deck::shuffle`] before any card leaves the deck and never
//! changes afterwards. Once the hand is over, [`Deck::verification_bundle`]
//! reveals the seed and the order so anyone can recompute the hash.

use rand::seq::SliceRandom;
use rand::{CryptoRng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cards::{full_deck, Card};
use crate::errors::DeckError;

const SEED_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    seed: Option<String>,
    commitment: Option<String>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// A deck in canonical order with no commitment yet.
    pub fn new() -> Self {
        Self {
            cards: full_deck(),
            position: 0,
            seed: None,
            commitment: None,
        }
    }

    /// Shuffles with a ChaCha20 stream seeded from OS entropy and returns the
    /// public commitment hash.
    pub fn shuffle(&mut self) -> String {
        let mut rng = ChaCha20Rng::from_os_rng();
        self.shuffle_with(&mut rng)
    }

    /// Shuffles using the supplied cryptographic RNG.
    ///
    /// The seed and the permutation are both drawn from `rng`; the seed is a
    /// secret salt that keeps the commitment from being brute-forced over the
    /// 52! orderings.
    pub fn shuffle_with<R: CryptoRng + ?Sized>(&mut self, rng: &mut R) -> String {
        let mut seed = [0u8; SEED_BYTES];
        rng.fill_bytes(&mut seed);
        let seed_hex = to_hex(&seed);

        self.cards = full_deck();
        self.cards.shuffle(rng);
        self.position = 0;

        let hash = commitment_for(&seed_hex, &self.cards);
        self.seed = Some(seed_hex);
        self.commitment = Some(hash.clone());
        hash
    }

    pub fn commitment(&self) -> Option<&str> {
        self.commitment.as_deref()
    }

    /// Removes the next `n` cards from the top of the deck.
    ///
    /// Nothing is removed when the request fails.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if self.commitment.is_none() {
            return Err(DeckError::NotCommitted);
        }
        let remaining = self.remaining();
        if n > remaining {
            return Err(DeckError::Exhausted {
                requested: n,
                remaining,
            });
        }
        let out = self.cards[self.position..self.position + n].to_vec();
        self.position += n;
        Ok(out)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }

    /// Cards dealt so far, in dealing order.
    pub fn dealt(&self) -> &[Card] {
        &self.cards[..self.position]
    }

    /// Reveals seed, hash, full order and dealt cards.
    ///
    /// Callers must only publish this after the hand has resolved; the seed
    /// and order predict every card still in the deck.
    pub fn verification_bundle(&self) -> Result<VerificationBundle, DeckError> {
        match (&self.seed, &self.commitment) {
            (Some(seed), Some(hash)) => Ok(VerificationBundle {
                seed: seed.clone(),
                hash: hash.clone(),
                order: self.cards.clone(),
                dealt: self.dealt().to_vec(),
            }),
            _ => Err(DeckError::NotCommitted),
        }
    }
}

/// Everything a third party needs to check a shuffle after the fact.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct VerificationBundle {
    /// Hex-encoded shuffle seed (secret until reveal)
    pub seed: String,
    /// Commitment published before the first card was dealt
    pub hash: String,
    /// Full shuffled order of the deck
    pub order: Vec<Card>,
    /// Cards actually dealt during the hand
    pub dealt: Vec<Card>,
}

impl VerificationBundle {
    /// Recomputes the commitment from `seed` and `order`.
    pub fn verify(&self) -> bool {
        commitment_for(&self.seed, &self.order) == self.hash
    }

    /// Stricter audit: the hash matches, the order is a full 52-card deck
    /// with no duplicates, and the dealt cards are the top of that order.
    pub fn ensure_untampered(&self) -> Result<(), DeckError> {
        if !self.verify() {
            return Err(DeckError::CommitmentMismatch(
                "hash does not match seed and order".into(),
            ));
        }
        let mut sorted = self.order.clone();
        sorted.sort_unstable();
        sorted.dedup();
        let mut canonical = full_deck();
        canonical.sort_unstable();
        if sorted != canonical {
            return Err(DeckError::CommitmentMismatch(
                "order is not a complete 52-card deck".into(),
            ));
        }
        if self.dealt.len() > self.order.len() || self.order[..self.dealt.len()] != self.dealt[..] {
            return Err(DeckError::CommitmentMismatch(
                "dealt cards do not follow the committed order".into(),
            ));
        }
        Ok(())
    }
}

/// Free-function form of [`VerificationBundle::verify`].
pub fn verify(bundle: &VerificationBundle) -> bool {
    bundle.verify()
}

pub fn commitment_for(seed_hex: &str, order: &[Card]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed_hex.as_bytes());
    hasher.update(serialize_order(order).as_bytes());
    to_hex(&hasher.finalize())
}

#[cfg(test)]
impl Deck {
    /// Committed deck whose next cards are `top`, then the rest in canonical order.
    pub(crate) fn stacked(top: &[Card]) -> Self {
        let mut cards = top.to_vec();
        cards.extend(full_deck().into_iter().filter(|c| !top.contains(c)));
        let seed = "00".to_string();
        let commitment = commitment_for(&seed, &cards);
        Self {
            cards,
            position: 0,
            seed: Some(seed),
            commitment: Some(commitment),
        }
    }
}

/// Canonical serialization of a card order: codes joined by commas.
pub fn serialize_order(order: &[Card]) -> String {
    order.iter().map(Card::code).collect::<Vec<_>>().join(",")
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
