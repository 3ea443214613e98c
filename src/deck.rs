//! The 40-card deck: canonical composition, the card arena the board works
//! against, and the opening deal.

use crate::card::{Card, CardId, Suit, RANK_NINE, RANK_ONE, SUITS};
use crate::config::GameConfig;
use crate::container::{Container, ContainerId};
use crate::error::EngineError;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Where a card currently sits and which card is stacked directly on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub container: Option<ContainerId>,
    pub next: Option<CardId>,
}

/// Flat arena of every card in play, addressed by [`CardId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    placements: Vec<Placement>,
}

/// Numbered cards 1..=9 then four dragons for each suit, then the flower.
pub fn generate_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(GameConfig::DECK_SIZE);
    for suit in SUITS {
        deck.extend((RANK_ONE..=RANK_NINE).map(|rank| Card::new(rank, suit)));
        deck.extend((0..GameConfig::DRAGONS_PER_SUIT).map(|_| Card::dragon(suit)));
    }
    deck.push(Card::FLOWER);
    deck
}

fn composition_key(card: &Card) -> (Suit, u8) {
    (card.suit, card.rank)
}

impl Deck {
    /// Most cards a deck can hold while every card keeps a distinct [`CardId`].
    pub const MAX_CARDS: usize = u8::MAX as usize + 1;

    pub fn new(cards: Vec<Card>) -> Result<Self, EngineError> {
        if cards.len() > Self::MAX_CARDS {
            return Err(EngineError::MalformedDeck(format!(
                "{} cards do not fit in card ids",
                cards.len()
            )));
        }
        Ok(Self::from_cards(cards))
    }

    fn from_cards(cards: Vec<Card>) -> Self {
        let placements = vec![Placement::default(); cards.len()];
        Self { cards, placements }
    }

    pub fn standard() -> Self {
        Self::from_cards(generate_deck())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> {
        (0..=u8::MAX).take(self.cards.len()).map(CardId)
    }

    /// Whether the deck holds exactly the cards of [`generate_deck`].
    pub fn is_standard(&self) -> bool {
        let mut ours = self.cards.clone();
        let mut canonical = generate_deck();
        ours.sort_by_key(composition_key);
        canonical.sort_by_key(composition_key);
        ours == canonical
    }

    pub fn get(&self, id: CardId) -> Option<Card> {
        self.cards.get(id.index()).copied()
    }

    pub fn card(&self, id: CardId) -> Card {
        self.cards[id.index()]
    }

    pub fn placement(&self, id: CardId) -> Placement {
        self.placements[id.index()]
    }

    pub fn container_of(&self, id: CardId) -> Option<ContainerId> {
        self.placements[id.index()].container
    }

    pub fn next_of(&self, id: CardId) -> Option<CardId> {
        self.placements[id.index()].next
    }

    pub(crate) fn set_container(&mut self, id: CardId, container: Option<ContainerId>) {
        self.placements[id.index()].container = container;
    }

    pub(crate) fn set_next(&mut self, id: CardId, next: Option<CardId>) {
        self.placements[id.index()].next = next;
    }

    /// Every card id showing this face.
    pub fn find(&self, card: Card) -> impl Iterator<Item = CardId> + '_ {
        self.ids().filter(move |&id| self.card(id) == card)
    }

    /// Nothing on top, or what is on top could legally have been placed there.
    pub fn is_free_to_move(&self, id: CardId) -> bool {
        match self.next_of(id) {
            None => true,
            Some(next) => self.card(id).can_receive(&self.card(next)),
        }
    }

    /// `id` followed by the chain of cards linked above it.
    pub fn run_from(&self, id: CardId) -> Vec<CardId> {
        let mut run = vec![id];
        let mut current = id;
        while let Some(next) = self.next_of(current) {
            run.push(next);
            current = next;
        }
        run
    }

    /// Every card of the chain from `id` upward sits legally on the one below.
    pub fn is_legal_run(&self, id: CardId) -> bool {
        self.run_from(id)
            .windows(2)
            .all(|pair| self.card(pair[0]).can_receive(&self.card(pair[1])))
    }
}

/// Shuffles the deck and spreads it over `work_stacks`.
///
/// Each stack gets `len / stacks` cards in stack order; the `len % stacks`
/// leftovers go one each to the leftmost stacks, drawn from the end of the
/// shuffled order.
pub fn deal<R: Rng + ?Sized>(
    deck: &mut Deck,
    work_stacks: &mut [Container],
    rng: &mut R,
) -> Result<(), EngineError> {
    if deck.len() != GameConfig::DECK_SIZE || !deck.is_standard() {
        return Err(EngineError::MalformedDeck(format!(
            "expected the {} standard cards, got {}",
            GameConfig::DECK_SIZE,
            deck.len()
        )));
    }
    if let Some(placed) = deck.ids().find(|&id| deck.container_of(id).is_some()) {
        return Err(EngineError::MalformedDeck(format!(
            "card {placed} is already on the board"
        )));
    }
    if work_stacks.is_empty() {
        return Err(EngineError::MalformedDeck("no work stacks to deal into".into()));
    }
    if let Some(stack) = work_stacks
        .iter()
        .find(|stack| !matches!(stack, Container::WorkStack { .. }) || !stack.is_empty())
    {
        return Err(EngineError::MalformedDeck(format!(
            "cannot deal into {}",
            stack.id()
        )));
    }

    let mut order: Vec<CardId> = deck.ids().collect();
    order.shuffle(rng);

    let n = order.len() / work_stacks.len();
    for (i, stack) in work_stacks.iter_mut().enumerate() {
        for &card in &order[i * n..(i + 1) * n] {
            stack.add(card, deck);
        }
    }
    let leftovers = order.len() % work_stacks.len();
    for (i, stack) in work_stacks.iter_mut().take(leftovers).enumerate() {
        stack.add(order[order.len() - 1 - i], deck);
    }
    Ok(())
}
