use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranks run 1..=9 for numbered cards. Rank 0 marks a special card.
pub type Rank = u8;

pub const RANK_NONE: Rank = 0;
pub const RANK_ONE: Rank = 1;
pub const RANK_NINE: Rank = 9;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    /// Only the flower card carries no suit.
    None,
    Black,
    Red,
    Green,
}

/// The three playable suits, in deck order.
pub const SUITS: [Suit; 3] = [Suit::Black, Suit::Green, Suit::Red];

impl Suit {
    pub fn letter(self) -> char {
        match self {
            Suit::None => 'F',
            Suit::Black => 'B',
            Suit::Red => 'R',
            Suit::Green => 'G',
        }
    }

    pub fn from_letter(letter: char) -> Option<Suit> {
        match letter.to_ascii_uppercase() {
            'B' => Some(Suit::Black),
            'R' => Some(Suit::Red),
            'G' => Some(Suit::Green),
            _ => None,
        }
    }

    pub fn paint(self, text: &str) -> ColoredString {
        match self {
            Suit::None => text.magenta(),
            Suit::Black => text.bold(),
            Suit::Red => text.red(),
            Suit::Green => text.green(),
        }
    }
}

/// Stable index of a card in the board's deck arena.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u8);

impl CardId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a card. Placement (container, next card) lives in the deck arena.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const FLOWER: Card = Card {
        rank: RANK_NONE,
        suit: Suit::None,
    };

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn dragon(suit: Suit) -> Self {
        Self {
            rank: RANK_NONE,
            suit,
        }
    }

    pub fn is_special(&self) -> bool {
        self.rank == RANK_NONE || self.suit == Suit::None
    }

    pub fn is_dragon(&self, suit: Suit) -> bool {
        self.suit == suit && self.rank == RANK_NONE
    }

    pub fn is_flower(&self) -> bool {
        self.suit == Suit::None && self.rank == RANK_NONE
    }

    /// Whether `other` may be stacked directly on top of `self` in a work stack.
    pub fn can_receive(&self, other: &Card) -> bool {
        if self.is_special() || other.is_special() {
            return false;
        }
        are_card_ranks_sequential(other, self) && other.suit != self.suit
    }

    pub fn name(&self) -> String {
        if self.is_flower() {
            "FL".to_string()
        } else if self.rank == RANK_NONE {
            format!("D{}", self.suit.letter())
        } else {
            format!("{}{}", self.rank, self.suit.letter())
        }
    }

    pub fn pretty_string(&self) -> String {
        self.suit.paint(&self.name()).to_string()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// True when `lower` is a numbered card exactly one rank below `higher`.
pub fn are_card_ranks_sequential(lower: &Card, higher: &Card) -> bool {
    lower.rank != RANK_NONE && lower.rank.checked_add(1) == Some(higher.rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_cards() {
        assert!(Card::FLOWER.is_special());
        assert!(Card::FLOWER.is_flower());
        assert!(Card::dragon(Suit::Red).is_special());
        assert!(Card::dragon(Suit::Red).is_dragon(Suit::Red));
        assert!(!Card::dragon(Suit::Red).is_dragon(Suit::Green));
        assert!(!Card::dragon(Suit::Red).is_flower());
        assert!(!Card::new(5, Suit::Red).is_special());
        assert!(!Card::FLOWER.is_dragon(Suit::Black));
    }

    #[test]
    fn can_receive_needs_lower_rank_and_different_suit() {
        let five_red = Card::new(5, Suit::Red);
        assert!(five_red.can_receive(&Card::new(4, Suit::Black)));
        assert!(five_red.can_receive(&Card::new(4, Suit::Green)));
        assert!(!five_red.can_receive(&Card::new(4, Suit::Red)));
        assert!(!five_red.can_receive(&Card::new(3, Suit::Black)));
        assert!(!five_red.can_receive(&Card::new(6, Suit::Black)));
    }

    #[test]
    fn special_cards_never_stack() {
        let two_green = Card::new(2, Suit::Green);
        assert!(!two_green.can_receive(&Card::dragon(Suit::Red)));
        assert!(!Card::dragon(Suit::Red).can_receive(&Card::new(1, Suit::Green)));
        assert!(!Card::new(1, Suit::Black).can_receive(&Card::FLOWER));
    }

    #[test]
    fn names() {
        assert_eq!(Card::new(7, Suit::Green).name(), "7G");
        assert_eq!(Card::dragon(Suit::Black).name(), "DB");
        assert_eq!(Card::FLOWER.name(), "FL");
        assert_eq!(Suit::from_letter('r'), Some(Suit::Red));
        assert_eq!(Suit::from_letter('f'), None);
    }

    #[test]
    fn top_rank_has_no_successor() {
        let top = Card::new(Rank::MAX, Suit::Red);
        assert!(!are_card_ranks_sequential(&top, &Card::new(0, Suit::Red)));
        assert!(top.can_receive(&Card::new(Rank::MAX - 1, Suit::Black)));
        assert!(!Card::new(Rank::MAX - 1, Suit::Black).can_receive(&top));
        assert!(are_card_ranks_sequential(&Card::new(8, Suit::Red), &Card::new(9, Suit::Red)));
    }
}
