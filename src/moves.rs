use crate::board::Board;
use crate::card::{CardId, Suit};
use crate::container::ContainerId;
use crate::error::EngineError;
use crate::snapshot::BoardSnapshot;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Interaction state: at most one card picked up, waiting for a target.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    Idle,
    Selected(CardId),
}

impl Selection {
    pub fn selected(self) -> Option<CardId> {
        match self {
            Selection::Idle => None,
            Selection::Selected(card) => Some(card),
        }
    }
}

/// What the presentation layer forwards to the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    CardClicked(CardId),
    ContainerClicked(ContainerId),
    CollapseClicked(Suit),
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub card: CardId,
    pub from: ContainerId,
    pub to: ContainerId,
}

impl Move {
    pub fn pretty_string(&self, board: &Board) -> String {
        format!(
            "{} {}: {} -> {}",
            self.card,
            board.deck().card(self.card).pretty_string(),
            self.from,
            self.to
        )
    }
}

/// Result of one gesture, handed back to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// The move applied by this gesture, if any.
    pub applied: Option<Move>,
    /// Suit whose dragons this gesture collapsed.
    pub collapsed: Option<Suit>,
    /// Set once, on the gesture that completed the game.
    pub won: bool,
    pub snapshot: BoardSnapshot,
}

impl Update {
    pub fn changed(&self) -> bool {
        self.applied.is_some() || self.collapsed.is_some()
    }
}

impl Board {
    pub fn handle(&mut self, gesture: Gesture) -> Result<Update, EngineError> {
        match gesture {
            Gesture::CardClicked(card) => self.card_clicked(card),
            Gesture::ContainerClicked(target) => self.container_clicked(target),
            Gesture::CollapseClicked(suit) => self.collapse_button_clicked(suit),
        }
    }

    pub fn card_clicked(&mut self, card: CardId) -> Result<Update, EngineError> {
        if self.deck.get(card).is_none() {
            trace!(%card, "unknown card clicked");
            self.selection = Selection::Idle;
            return Ok(self.finish(None, None));
        }
        let target = self.deck.container_of(card);
        let applied = match self.selection {
            Selection::Idle => {
                match target {
                    Some(ContainerId::Foundation(_)) | None => {}
                    Some(_) => {
                        debug!(%card, "selected");
                        self.selection = Selection::Selected(card);
                    }
                }
                None
            }
            Selection::Selected(selected) if selected == card => {
                self.selection = Selection::Idle;
                self.auto_drop(card)?
            }
            Selection::Selected(selected) => {
                self.selection = Selection::Idle;
                match target {
                    Some(target) => self.try_move(selected, target)?,
                    None => None,
                }
            }
        };
        Ok(self.finish(applied, None))
    }

    /// A click on the empty area of a container.
    pub fn container_clicked(&mut self, target: ContainerId) -> Result<Update, EngineError> {
        let applied = match self.selection {
            Selection::Idle => None,
            Selection::Selected(selected) => {
                self.selection = Selection::Idle;
                self.try_move(selected, target)?
            }
        };
        Ok(self.finish(applied, None))
    }

    pub fn collapse_button_clicked(&mut self, suit: Suit) -> Result<Update, EngineError> {
        self.selection = Selection::Idle;
        let collapsed = if self.is_collapse_enabled(suit) {
            self.collapse_dragons(suit)?;
            Some(suit)
        } else {
            trace!(?suit, "collapse button disabled");
            None
        };
        Ok(self.finish(None, collapsed))
    }

    /// Sends `card` to the first foundation, or else the flower cell, that takes it.
    pub fn auto_drop(&mut self, card: CardId) -> Result<Option<Move>, EngineError> {
        let target = ContainerId::foundations()
            .chain(std::iter::once(ContainerId::FlowerCell))
            .find(|&to| self.accepts(card, to));
        match target {
            Some(to) => self.transfer(card, to).map(Some),
            None => Ok(None),
        }
    }

    /// Would moving `card` (and whatever sits on it) onto `to` be legal right now.
    pub fn accepts(&self, card: CardId, to: ContainerId) -> bool {
        if self.deck.get(card).is_none() {
            return false;
        }
        let (Some(from), Some(target)) = (self.deck.container_of(card), self.container(to)) else {
            return false;
        };
        from != to && self.deck.is_legal_run(card) && target.can_accept(card, &self.deck)
    }

    /// Every container `card` could be moved onto, in board order.
    pub fn legal_targets(&self, card: CardId) -> Vec<ContainerId> {
        ContainerId::all()
            .filter(|&to| self.accepts(card, to))
            .collect()
    }

    /// Every legal move of a selectable card.
    pub fn valid_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for card in self.deck.ids() {
            let Some(from) = self.deck.container_of(card) else {
                continue;
            };
            if let ContainerId::Foundation(_) = from {
                continue;
            }
            moves.extend(
                self.legal_targets(card)
                    .into_iter()
                    .map(|to| Move { card, from, to }),
            );
        }
        moves
    }

    fn try_move(&mut self, card: CardId, to: ContainerId) -> Result<Option<Move>, EngineError> {
        if !self.accepts(card, to) {
            trace!(%card, %to, "target rejected");
            return Ok(None);
        }
        self.transfer(card, to).map(Some)
    }

    /// Moves `card` and its run from wherever it sits onto `to`.
    fn transfer(&mut self, card: CardId, to: ContainerId) -> Result<Move, EngineError> {
        let from = self
            .deck
            .container_of(card)
            .ok_or(EngineError::Unplaced(card))?;
        let moved = self.containers[from.slot()].remove(card, &mut self.deck)?;
        self.containers[to.slot()].add(card, &mut self.deck);
        debug!(%card, %from, %to, carried = moved.len(), "moved");
        Ok(Move { card, from, to })
    }

    fn finish(&mut self, applied: Option<Move>, collapsed: Option<Suit>) -> Update {
        let won = if applied.is_some() || collapsed.is_some() {
            self.refresh()
        } else {
            false
        };
        Update {
            applied,
            collapsed,
            won,
            snapshot: self.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    #[test]
    fn foundation_cards_cannot_be_picked_up() {
        let mut board = Board::empty();
        let one = board.place(Card::new(1, Suit::Red), ContainerId::Foundation(0));
        let update = board.card_clicked(one).expect("click");
        assert_eq!(board.selection(), Selection::Idle);
        assert!(!update.changed());
    }

    #[test]
    fn click_card_then_card_moves() {
        let mut board = Board::empty();
        let six = board.place(Card::new(6, Suit::Black), ContainerId::WorkStack(0));
        let five = board.place(Card::new(5, Suit::Green), ContainerId::WorkStack(1));

        board.card_clicked(five).expect("select");
        assert_eq!(board.selection(), Selection::Selected(five));
        let update = board.card_clicked(six).expect("target");

        assert_eq!(
            update.applied,
            Some(Move {
                card: five,
                from: ContainerId::WorkStack(1),
                to: ContainerId::WorkStack(0)
            })
        );
        assert_eq!(board.selection(), Selection::Idle);
        assert_eq!(board.deck().next_of(six), Some(five));
        assert!(board.container(ContainerId::WorkStack(1)).is_some_and(|s| s.is_empty()));
    }

    #[test]
    fn invalid_target_cancels_silently() {
        let mut board = Board::empty();
        let six = board.place(Card::new(6, Suit::Black), ContainerId::WorkStack(0));
        let five = board.place(Card::new(5, Suit::Black), ContainerId::WorkStack(1));
        let before = board.snapshot();

        board.card_clicked(five).expect("select");
        let update = board.card_clicked(six).expect("target");
        assert_eq!(update.applied, None);
        assert_eq!(board.selection(), Selection::Idle);
        assert_eq!(update.snapshot, before);
    }

    #[test]
    fn container_click_fills_empty_cells() {
        let mut board = Board::empty();
        let two = board.place(Card::new(2, Suit::Red), ContainerId::WorkStack(0));

        // Nothing selected: a container click does nothing.
        assert!(!board.container_clicked(ContainerId::TempCell(2)).expect("click").changed());

        board.card_clicked(two).expect("select");
        let update = board.container_clicked(ContainerId::TempCell(2)).expect("click");
        assert_eq!(update.applied.map(|m| m.to), Some(ContainerId::TempCell(2)));
        assert_eq!(board.deck().container_of(two), Some(ContainerId::TempCell(2)));
    }

    #[test]
    fn reclick_drops_to_foundation_then_flower() {
        let mut board = Board::empty();
        let one = board.place(Card::new(1, Suit::Green), ContainerId::WorkStack(0));
        let flower = board.place(Card::FLOWER, ContainerId::WorkStack(1));
        let dragon = board.place(Card::dragon(Suit::Green), ContainerId::WorkStack(2));

        board.card_clicked(one).expect("select");
        let update = board.card_clicked(one).expect("drop");
        assert_eq!(update.applied.map(|m| m.to), Some(ContainerId::Foundation(0)));

        board.card_clicked(flower).expect("select");
        let update = board.card_clicked(flower).expect("drop");
        assert_eq!(update.applied.map(|m| m.to), Some(ContainerId::FlowerCell));

        board.card_clicked(dragon).expect("select");
        let update = board.card_clicked(dragon).expect("drop");
        assert_eq!(update.applied, None);
        assert_eq!(board.selection(), Selection::Idle);
        assert_eq!(board.deck().container_of(dragon), Some(ContainerId::WorkStack(2)));
    }

    #[test]
    fn runs_move_together_but_illegal_chains_do_not() {
        let mut board = Board::empty();
        let eight = board.place(Card::new(8, Suit::Green), ContainerId::WorkStack(0));
        let seven = board.place(Card::new(7, Suit::Red), ContainerId::WorkStack(1));
        let six = board.place(Card::new(6, Suit::Black), ContainerId::WorkStack(1));

        board.card_clicked(seven).expect("select");
        board.container_clicked(ContainerId::WorkStack(0)).expect("move");
        let stack = board.container(ContainerId::WorkStack(0)).expect("stack");
        assert_eq!(stack.cards(), &[eight, seven, six]);

        // A dealt pile may link cards that do not form a run.
        let nine = board.place(Card::new(9, Suit::Red), ContainerId::WorkStack(2));
        let dragon = board.place(Card::dragon(Suit::Red), ContainerId::WorkStack(2));
        assert!(board.legal_targets(nine).is_empty());
        board.card_clicked(nine).expect("select");
        let update = board.container_clicked(ContainerId::WorkStack(3)).expect("move");
        assert_eq!(update.applied, None);
        assert_eq!(board.deck().next_of(nine), Some(dragon));
    }

    #[test]
    fn stale_and_unknown_targets_are_no_ops() {
        let mut board = Board::empty();
        let card = board.place(Card::new(4, Suit::Red), ContainerId::WorkStack(0));
        board.card_clicked(card).expect("select");
        let update = board
            .container_clicked(ContainerId::WorkStack(200))
            .expect("click");
        assert_eq!(update.applied, None);
        assert_eq!(board.selection(), Selection::Idle);

        let update = board.card_clicked(CardId(250)).expect("click");
        assert!(!update.changed());
    }

    #[test]
    fn collapse_button_only_works_when_enabled() {
        let mut board = Board::empty();
        for stack in 0..4 {
            board.place(Card::dragon(Suit::Green), ContainerId::WorkStack(stack));
        }
        let update = board.collapse_button_clicked(Suit::Red).expect("click");
        assert_eq!(update.collapsed, None);

        let five = board.place(Card::new(5, Suit::Red), ContainerId::WorkStack(5));
        board.card_clicked(five).expect("select");
        let update = board.handle(Gesture::CollapseClicked(Suit::Green)).expect("click");
        assert_eq!(update.collapsed, Some(Suit::Green));
        assert_eq!(board.selection(), Selection::Idle);
        assert!(update.snapshot.containers.iter().any(|view| view.collapsed));
        assert_eq!(board.exposed_dragons(Suit::Green), 0);
    }

    #[test]
    fn valid_moves_skip_foundations() {
        let mut board = Board::empty();
        board.place(Card::new(1, Suit::Black), ContainerId::Foundation(0));
        let two = board.place(Card::new(2, Suit::Black), ContainerId::WorkStack(0));
        let moves = board.valid_moves();
        assert!(moves.iter().all(|m| m.card == two));
        assert!(moves.iter().any(|m| m.to == ContainerId::Foundation(0)));
        assert!(moves.iter().any(|m| m.to == ContainerId::TempCell(0)));
        assert!(moves.iter().any(|m| m.to == ContainerId::WorkStack(1)));
        assert!(!moves.iter().any(|m| m.to == ContainerId::FlowerCell));
    }
}
