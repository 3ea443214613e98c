use crate::card::{are_card_ranks_sequential, CardId, RANK_NINE, RANK_ONE};
use crate::config::GameConfig;
use crate::deck::Deck;
use crate::error::EngineError;
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use std::fmt;

const FLOWER_SLOT: usize = GameConfig::TEMP_CELLS;
const FOUNDATION_START: usize = FLOWER_SLOT + 1;
pub(crate) const WORK_STACK_START: usize = FOUNDATION_START + GameConfig::FOUNDATIONS;
const FOUNDATION_CAPACITY: usize = RANK_NINE as usize;

/// Grid cell a container (or a card inside it) is drawn at.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub column: u8,
    pub row: u8,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContainerId {
    TempCell(u8),
    FlowerCell,
    Foundation(u8),
    WorkStack(u8),
}

impl ContainerId {
    /// Every container of the board, in slot order.
    pub fn all() -> impl Iterator<Item = ContainerId> {
        (0..GameConfig::TEMP_CELLS as u8)
            .map(ContainerId::TempCell)
            .chain(std::iter::once(ContainerId::FlowerCell))
            .chain((0..GameConfig::FOUNDATIONS as u8).map(ContainerId::Foundation))
            .chain((0..GameConfig::WORK_STACKS as u8).map(ContainerId::WorkStack))
    }

    pub fn foundations() -> impl Iterator<Item = ContainerId> {
        (0..GameConfig::FOUNDATIONS as u8).map(ContainerId::Foundation)
    }

    /// False for identifiers pointing past the fixed layout, e.g. `WorkStack(9)`.
    pub fn is_valid(self) -> bool {
        match self {
            ContainerId::TempCell(i) => (i as usize) < GameConfig::TEMP_CELLS,
            ContainerId::FlowerCell => true,
            ContainerId::Foundation(i) => (i as usize) < GameConfig::FOUNDATIONS,
            ContainerId::WorkStack(i) => (i as usize) < GameConfig::WORK_STACKS,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            ContainerId::TempCell(i) => i as usize,
            ContainerId::FlowerCell => FLOWER_SLOT,
            ContainerId::Foundation(i) => FOUNDATION_START + i as usize,
            ContainerId::WorkStack(i) => WORK_STACK_START + i as usize,
        }
    }

    pub fn position(self) -> Position {
        let (column, row) = match self {
            ContainerId::TempCell(i) => (i, 0),
            ContainerId::FlowerCell => (4, 0),
            ContainerId::Foundation(i) => (5 + i, 0),
            ContainerId::WorkStack(i) => (i, 1),
        };
        Position { column, row }
    }

    /// Parses the short labels used in text front ends: `t0`, `fl`, `f2`, `w7`.
    pub fn parse(label: &str) -> Option<ContainerId> {
        let label = label.trim().to_ascii_lowercase();
        if label == "fl" {
            return Some(ContainerId::FlowerCell);
        }
        let mut chars = label.chars();
        let kind = chars.next()?;
        let index = chars.as_str().parse::<u8>().ok()?;
        let id = match kind {
            't' => ContainerId::TempCell(index),
            'f' => ContainerId::Foundation(index),
            'w' => ContainerId::WorkStack(index),
            _ => return None,
        };
        id.is_valid().then_some(id)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContainerId::TempCell(i) => write!(f, "t{i}"),
            ContainerId::FlowerCell => write!(f, "fl"),
            ContainerId::Foundation(i) => write!(f, "f{i}"),
            ContainerId::WorkStack(i) => write!(f, "w{i}"),
        }
    }
}

/// One place on the board that holds cards.
///
/// `add` and `remove` assume the caller checked `can_accept` first and only
/// removes cards the container owns; they keep the deck's back-references and
/// `next` links in step with the container's own membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Container {
    TempCell {
        index: u8,
        card: Option<CardId>,
        collapsed: bool,
    },
    FlowerCell {
        card: Option<CardId>,
    },
    Foundation {
        index: u8,
        cards: ArrayVec<CardId, FOUNDATION_CAPACITY>,
    },
    WorkStack {
        index: u8,
        cards: Vec<CardId>,
    },
}

impl Container {
    pub fn new(id: ContainerId) -> Self {
        match id {
            ContainerId::TempCell(index) => Container::TempCell {
                index,
                card: None,
                collapsed: false,
            },
            ContainerId::FlowerCell => Container::FlowerCell { card: None },
            ContainerId::Foundation(index) => Container::Foundation {
                index,
                cards: ArrayVec::new(),
            },
            ContainerId::WorkStack(index) => Container::WorkStack {
                index,
                cards: Vec::new(),
            },
        }
    }

    pub fn id(&self) -> ContainerId {
        match self {
            Container::TempCell { index, .. } => ContainerId::TempCell(*index),
            Container::FlowerCell { .. } => ContainerId::FlowerCell,
            Container::Foundation { index, .. } => ContainerId::Foundation(*index),
            Container::WorkStack { index, .. } => ContainerId::WorkStack(*index),
        }
    }

    /// Cards from the base of the container to its top.
    pub fn cards(&self) -> &[CardId] {
        match self {
            Container::TempCell { card, .. } | Container::FlowerCell { card } => match card {
                Some(card) => std::slice::from_ref(card),
                None => &[],
            },
            Container::Foundation { cards, .. } => cards.as_slice(),
            Container::WorkStack { cards, .. } => cards.as_slice(),
        }
    }

    pub fn top(&self) -> Option<CardId> {
        self.cards().last().copied()
    }

    pub fn len(&self) -> usize {
        self.cards().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards().is_empty()
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self, Container::TempCell { collapsed: true, .. })
    }

    /// An empty temp cell that has not been locked by a collapse.
    pub fn is_free_cell(&self) -> bool {
        matches!(
            self,
            Container::TempCell {
                card: None,
                collapsed: false,
                ..
            }
        )
    }

    pub fn can_accept(&self, card: CardId, deck: &Deck) -> bool {
        let candidate = deck.card(card);
        let carries_cards = deck.next_of(card).is_some();
        match self {
            Container::TempCell {
                card: held,
                collapsed,
                ..
            } => !*collapsed && held.is_none() && !carries_cards,
            Container::FlowerCell { card: held } => {
                candidate.is_flower() && held.is_none() && !carries_cards
            }
            Container::Foundation { cards, .. } => {
                if candidate.is_special() || carries_cards || cards.is_full() {
                    return false;
                }
                match cards.last() {
                    None => candidate.rank == RANK_ONE,
                    Some(&top) => {
                        let top = deck.card(top);
                        are_card_ranks_sequential(&top, &candidate) && top.suit == candidate.suit
                    }
                }
            }
            Container::WorkStack { cards, .. } => match cards.last() {
                None => true,
                Some(&top) => deck.card(top).can_receive(&candidate),
            },
        }
    }

    /// Places `card` here. A work stack takes the whole chain linked above `card`.
    pub fn add(&mut self, card: CardId, deck: &mut Deck) {
        let id = self.id();
        match self {
            Container::TempCell { card: held, .. } | Container::FlowerCell { card: held } => {
                *held = Some(card);
                deck.set_container(card, Some(id));
            }
            Container::Foundation { cards, .. } => {
                if let Some(&below) = cards.last() {
                    deck.set_next(below, Some(card));
                }
                deck.set_container(card, Some(id));
                cards.push(card);
            }
            Container::WorkStack { cards, .. } => {
                for moved in deck.run_from(card) {
                    if let Some(&below) = cards.last() {
                        deck.set_next(below, Some(moved));
                    }
                    deck.set_container(moved, Some(id));
                    cards.push(moved);
                }
            }
        }
    }

    /// Takes `card` out, returning every card that left with it (base first).
    ///
    /// Work stacks cut the sequence at `card` and hand back the run above it
    /// with its `next` links intact. Foundations only give up their top card.
    pub fn remove(&mut self, card: CardId, deck: &mut Deck) -> Result<Vec<CardId>, EngineError> {
        let container = self.id();
        let not_owned = EngineError::NotOwned { card, container };
        match self {
            Container::TempCell { card: held, .. } | Container::FlowerCell { card: held } => {
                if *held != Some(card) {
                    return Err(not_owned);
                }
                *held = None;
                deck.set_container(card, None);
                deck.set_next(card, None);
                Ok(vec![card])
            }
            Container::Foundation { cards, .. } => {
                if cards.last() != Some(&card) {
                    return Err(not_owned);
                }
                cards.pop();
                if let Some(&below) = cards.last() {
                    deck.set_next(below, None);
                }
                deck.set_container(card, None);
                Ok(vec![card])
            }
            Container::WorkStack { cards, .. } => {
                let idx = cards.iter().position(|&c| c == card).ok_or(not_owned)?;
                if idx > 0 {
                    deck.set_next(cards[idx - 1], None);
                }
                let run = cards.split_off(idx);
                for &moved in &run {
                    deck.set_container(moved, None);
                }
                Ok(run)
            }
        }
    }

    /// Locks an empty temp cell for the rest of the game.
    pub fn collapse(&mut self) -> bool {
        if !self.is_free_cell() {
            return false;
        }
        if let Container::TempCell { collapsed, .. } = self {
            *collapsed = true;
        }
        true
    }
}
