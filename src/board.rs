use crate::card::{CardId, Suit, RANK_NINE, SUITS};
use crate::config::GameConfig;
use crate::container::{Container, ContainerId, Position, WORK_STACK_START};
use crate::deck::{deal, Deck};
use crate::error::EngineError;
use crate::moves::Selection;
use crate::snapshot::{BoardSnapshot, CardView, CollapseButton, ContainerView};
use rand::{rngs::StdRng, thread_rng, Rng, SeedableRng};
use std::fmt;
use tracing::info;

/// All containers, the deck, and the one piece of interaction state.
#[derive(Clone, Debug)]
pub struct Board {
    seed: u64,
    pub(crate) deck: Deck,
    pub(crate) containers: Vec<Container>,
    pub(crate) selection: Selection,
    collapse_enabled: [bool; SUITS.len()],
    retired_suits: Vec<Suit>,
    won: bool,
}

impl Board {
    pub fn new(config: &GameConfig) -> Result<Self, EngineError> {
        let seed = config.seed.unwrap_or_else(|| thread_rng().gen());
        Self::with_seed(seed)
    }

    /// A freshly dealt board. The same seed always yields the same deal.
    pub fn with_seed(seed: u64) -> Result<Self, EngineError> {
        let mut board = Self::empty_with_seed(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        deal(
            &mut board.deck,
            &mut board.containers[WORK_STACK_START..],
            &mut rng,
        )?;
        board.refresh_collapse();
        info!(seed, "dealt new game");
        Ok(board)
    }

    fn empty_with_seed(seed: u64) -> Self {
        Self {
            seed,
            deck: Deck::standard(),
            containers: ContainerId::all().map(Container::new).collect(),
            selection: Selection::Idle,
            collapse_enabled: [false; SUITS.len()],
            retired_suits: Vec::new(),
            won: false,
        }
    }

    /// Throws the current game away and deals a new one from a fresh seed.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        *self = Self::with_seed(thread_rng().gen())?;
        Ok(())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// `None` for identifiers outside the fixed layout.
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        if !id.is_valid() {
            return None;
        }
        self.containers.get(id.slot())
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    fn containers_of<'a>(
        &'a self,
        ids: impl Iterator<Item = ContainerId> + 'a,
    ) -> impl Iterator<Item = &'a Container> + 'a {
        ids.map(move |id| &self.containers[id.slot()])
    }

    pub fn temp_cells(&self) -> impl Iterator<Item = &Container> + '_ {
        self.containers_of((0..GameConfig::TEMP_CELLS as u8).map(ContainerId::TempCell))
    }

    pub fn foundations(&self) -> impl Iterator<Item = &Container> + '_ {
        self.containers_of(ContainerId::foundations())
    }

    pub fn work_stacks(&self) -> impl Iterator<Item = &Container> + '_ {
        self.containers[WORK_STACK_START..].iter()
    }

    pub fn flower_cell(&self) -> &Container {
        &self.containers[ContainerId::FlowerCell.slot()]
    }

    pub fn is_collapse_enabled(&self, suit: Suit) -> bool {
        suit_slot(suit).is_some_and(|slot| self.collapse_enabled[slot])
    }

    /// Suits whose dragons have been collapsed, in the order it happened.
    pub fn retired_suits(&self) -> &[Suit] {
        &self.retired_suits
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Dragons of `suit` sitting on top of a work stack or in a temp cell.
    pub fn exposed_dragons(&self, suit: Suit) -> usize {
        let on_stacks = self
            .work_stacks()
            .filter_map(Container::top)
            .filter(|&top| self.deck.card(top).is_dragon(suit))
            .count();
        let in_cells = self
            .temp_cells()
            .filter_map(Container::top)
            .filter(|&card| self.deck.card(card).is_dragon(suit))
            .count();
        on_stacks + in_cells
    }

    /// A temp cell is open for the collapse, either empty or already holding
    /// one of the suit's dragons.
    pub fn has_free_cell(&self, suit: Suit) -> bool {
        self.temp_cells().any(|cell| {
            cell.is_free_cell()
                || cell
                    .top()
                    .is_some_and(|card| self.deck.card(card).is_dragon(suit))
        })
    }

    pub fn can_collapse(&self, suit: Suit) -> bool {
        self.exposed_dragons(suit) == GameConfig::DRAGONS_PER_SUIT && self.has_free_cell(suit)
    }

    pub(crate) fn refresh_collapse(&mut self) {
        for (slot, suit) in SUITS.into_iter().enumerate() {
            self.collapse_enabled[slot] = self.can_collapse(suit);
        }
    }

    /// Retires the four exposed dragons of `suit` and locks one empty temp cell.
    pub(crate) fn collapse_dragons(&mut self, suit: Suit) -> Result<Vec<CardId>, EngineError> {
        let mut retired = Vec::with_capacity(GameConfig::DRAGONS_PER_SUIT);
        for container in self.containers.iter_mut() {
            if !matches!(
                container,
                Container::WorkStack { .. } | Container::TempCell { .. }
            ) {
                continue;
            }
            if let Some(top) = container.top() {
                if self.deck.card(top).is_dragon(suit) {
                    retired.extend(container.remove(top, &mut self.deck)?);
                }
            }
        }
        let locked = self
            .containers
            .iter_mut()
            .find(|container| container.is_free_cell())
            .map(|cell| {
                cell.collapse();
                cell.id()
            });
        self.retired_suits.push(suit);
        info!(?suit, ?locked, retired = retired.len(), "collapsed dragons");
        Ok(retired)
    }

    /// All three foundations complete and the flower cell taken.
    pub fn check_win(&self) -> bool {
        self.foundations()
            .all(|foundation| foundation.len() == RANK_NINE as usize)
            && !self.flower_cell().is_empty()
    }

    /// Recomputes collapse buttons and the win state. True only on the call
    /// that first sees the board won.
    pub(crate) fn refresh(&mut self) -> bool {
        self.refresh_collapse();
        if self.won || !self.check_win() {
            return false;
        }
        self.won = true;
        info!(seed = self.seed, "game won");
        true
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let containers = self
            .containers
            .iter()
            .map(|container| ContainerView {
                id: container.id(),
                position: container.id().position(),
                collapsed: container.is_collapsed(),
                cards: container.cards().to_vec(),
            })
            .collect();
        let cards = self
            .deck
            .ids()
            .map(|id| {
                let placement = self.deck.placement(id);
                CardView {
                    id,
                    card: self.deck.card(id),
                    container: placement.container,
                    next: placement.next,
                    position: placement.container.map(|at| self.card_position(id, at)),
                }
            })
            .collect();
        let collapse = SUITS
            .into_iter()
            .map(|suit| CollapseButton {
                suit,
                enabled: self.is_collapse_enabled(suit),
            })
            .collect();
        BoardSnapshot {
            seed: self.seed,
            containers,
            cards,
            selected: self.selection.selected(),
            collapse,
            retired_suits: self.retired_suits.clone(),
            won: self.won,
        }
    }

    fn card_position(&self, card: CardId, at: ContainerId) -> Position {
        let mut position = at.position();
        if let ContainerId::WorkStack(_) = at {
            let depth = self.containers[at.slot()]
                .cards()
                .iter()
                .position(|&c| c == card)
                .unwrap_or_default();
            position.row += depth as u8;
        }
        position
    }
}

fn suit_slot(suit: Suit) -> Option<usize> {
    SUITS.iter().position(|&s| s == suit)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.snapshot())
    }
}

#[cfg(test)]
impl Board {
    /// Generated deck, nothing dealt.
    pub(crate) fn empty() -> Self {
        Self::empty_with_seed(0)
    }

    /// Puts the first unplaced copy of `card` onto `to`, skipping acceptance rules.
    pub(crate) fn place(&mut self, card: crate::card::Card, to: ContainerId) -> CardId {
        let id = self
            .deck
            .find(card)
            .find(|&id| self.deck.container_of(id).is_none())
            .expect("an unplaced copy of the card");
        self.containers[to.slot()].add(id, &mut self.deck);
        self.refresh_collapse();
        id
    }

    pub(crate) fn id_of(&self, card: crate::card::Card) -> CardId {
        self.deck.find(card).next().expect("card in deck")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    fn fill_foundation(board: &mut Board, index: u8, suit: Suit, up_to: u8) {
        for rank in 1..=up_to {
            board.place(Card::new(rank, suit), ContainerId::Foundation(index));
        }
    }

    #[test]
    fn seeded_boards_match() {
        let a = Board::with_seed(99).expect("deal");
        let b = Board::with_seed(99).expect("deal");
        assert_eq!(a.containers, b.containers);
        assert_eq!(a.seed(), 99);
        assert!(a.work_stacks().all(|stack| stack.len() == 5));
        assert!(a.temp_cells().all(Container::is_empty));
        assert!(a.foundations().all(Container::is_empty));
        assert!(a.flower_cell().is_empty());
        assert_eq!(a.selection(), Selection::Idle);
        assert!(!a.is_won());
    }

    #[test]
    fn new_game_redeals() {
        let mut board = Board::new(&GameConfig::with_seed(5)).expect("deal");
        board.won = true;
        board.new_game().expect("deal");
        assert!(!board.is_won());
        assert_eq!(
            board.work_stacks().map(Container::len).sum::<usize>(),
            GameConfig::DECK_SIZE
        );
    }

    #[test]
    fn win_needs_full_foundations_and_the_flower() {
        let mut board = Board::empty();
        fill_foundation(&mut board, 0, Suit::Black, 9);
        fill_foundation(&mut board, 1, Suit::Red, 9);
        fill_foundation(&mut board, 2, Suit::Green, 8);
        board.place(Card::FLOWER, ContainerId::FlowerCell);
        assert!(!board.check_win());

        let mut board = Board::empty();
        fill_foundation(&mut board, 0, Suit::Black, 9);
        fill_foundation(&mut board, 1, Suit::Red, 9);
        fill_foundation(&mut board, 2, Suit::Green, 9);
        assert!(!board.check_win());

        board.place(Card::FLOWER, ContainerId::FlowerCell);
        assert!(board.check_win());
        assert!(board.refresh());
        assert!(!board.refresh());
        assert!(board.is_won());
    }

    #[test]
    fn collapse_needs_all_four_exposed_and_a_cell() {
        let mut board = Board::empty();
        for stack in 0..3 {
            board.place(Card::dragon(Suit::Red), ContainerId::WorkStack(stack));
        }
        assert_eq!(board.exposed_dragons(Suit::Red), 3);
        assert!(!board.is_collapse_enabled(Suit::Red));

        board.place(Card::dragon(Suit::Red), ContainerId::TempCell(0));
        assert_eq!(board.exposed_dragons(Suit::Red), 4);
        assert!(board.is_collapse_enabled(Suit::Red));
        assert!(!board.is_collapse_enabled(Suit::Green));

        // Buried dragons do not count.
        let mut board = Board::empty();
        for stack in 0..4 {
            board.place(Card::dragon(Suit::Green), ContainerId::WorkStack(stack));
        }
        board.place(Card::new(3, Suit::Red), ContainerId::WorkStack(3));
        assert_eq!(board.exposed_dragons(Suit::Green), 3);
        assert!(!board.is_collapse_enabled(Suit::Green));
    }

    #[test]
    fn occupied_cells_block_collapse_unless_they_hold_the_suit() {
        let mut board = Board::empty();
        for stack in 0..4 {
            board.place(Card::dragon(Suit::Black), ContainerId::WorkStack(stack));
        }
        for cell in 0..3 {
            board.place(Card::new(cell + 1, Suit::Red), ContainerId::TempCell(cell));
        }
        assert_eq!(board.exposed_dragons(Suit::Black), 4);
        assert!(!board.has_free_cell(Suit::Black));
        assert!(!board.is_collapse_enabled(Suit::Black));
    }

    #[test]
    fn collapse_retires_dragons_and_locks_one_cell() {
        let mut board = Board::empty();
        board.place(Card::new(5, Suit::Green), ContainerId::TempCell(0));
        board.place(Card::dragon(Suit::Black), ContainerId::TempCell(1));
        for (stack, suit) in [Suit::Red, Suit::Black, Suit::Green].into_iter().enumerate() {
            board.place(Card::new(9, suit), ContainerId::WorkStack(stack as u8));
            board.place(Card::dragon(Suit::Black), ContainerId::WorkStack(stack as u8));
        }
        assert!(board.is_collapse_enabled(Suit::Black));

        let retired = board.collapse_dragons(Suit::Black).expect("collapse");
        board.refresh();
        assert_eq!(retired.len(), 4);
        assert_eq!(board.exposed_dragons(Suit::Black), 0);
        assert!(retired
            .iter()
            .all(|&dragon| board.deck().container_of(dragon).is_none()));
        let locked: Vec<ContainerId> = board
            .temp_cells()
            .filter(|cell| cell.is_collapsed())
            .map(Container::id)
            .collect();
        // The vacated cell is the first empty one here.
        assert_eq!(locked, vec![ContainerId::TempCell(1)]);
        assert!(!board.is_collapse_enabled(Suit::Black));
        assert_eq!(board.retired_suits(), &[Suit::Black]);
    }

    #[test]
    fn snapshot_positions() {
        let mut board = Board::empty();
        let base = board.place(Card::new(9, Suit::Green), ContainerId::WorkStack(4));
        let on_top = board.place(Card::new(8, Suit::Red), ContainerId::WorkStack(4));
        let one = board.place(Card::new(1, Suit::Red), ContainerId::Foundation(1));
        let two = board.place(Card::new(2, Suit::Red), ContainerId::Foundation(1));

        let snapshot = board.snapshot();
        let at = |id: CardId| snapshot.card(id).and_then(|view| view.position);
        assert_eq!(at(base).map(|p| (p.column, p.row)), Some((4, 1)));
        assert_eq!(at(on_top).map(|p| (p.column, p.row)), Some((4, 2)));
        assert_eq!(at(one), at(two));
        assert_eq!(snapshot.card(base).and_then(|view| view.next), Some(on_top));
        assert_eq!(snapshot.containers.len(), GameConfig::CONTAINERS);
        assert!(at(board.id_of(Card::FLOWER)).is_none());
    }
}
