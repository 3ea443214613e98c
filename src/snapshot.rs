//! Read-only picture of a board for the presentation layer.

use crate::card::{Card, CardId, Suit};
use crate::container::{ContainerId, Position};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerView {
    pub id: ContainerId,
    pub position: Position,
    pub collapsed: bool,
    /// Base first.
    pub cards: Vec<CardId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: CardId,
    pub card: Card,
    pub container: Option<ContainerId>,
    pub next: Option<CardId>,
    pub position: Option<Position>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseButton {
    pub suit: Suit,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub seed: u64,
    pub containers: Vec<ContainerView>,
    pub cards: Vec<CardView>,
    pub selected: Option<CardId>,
    pub collapse: Vec<CollapseButton>,
    pub retired_suits: Vec<Suit>,
    pub won: bool,
}

impl BoardSnapshot {
    pub fn card(&self, id: CardId) -> Option<&CardView> {
        self.cards.get(id.index())
    }

    pub fn container(&self, id: ContainerId) -> Option<&ContainerView> {
        self.containers.iter().find(|view| view.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn cell(&self, card: Option<CardId>) -> String {
        let Some(view) = card.and_then(|id| self.card(id)) else {
            return "    ".to_string();
        };
        let label = format!("{:<2}{:>2}", view.card.name(), view.id.0);
        let painted = view.card.suit.paint(&label);
        if self.selected == Some(view.id) {
            painted.reversed().to_string()
        } else {
            painted.to_string()
        }
    }

    fn slot(&self, view: &ContainerView) -> String {
        if view.collapsed {
            return "[XXXX]".dimmed().to_string();
        }
        format!("[{}]", self.cell(view.cards.last().copied()))
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "seed {}", self.seed)?;
        for button in &self.collapse {
            let state = if button.enabled { "ready" } else { "-" };
            write!(f, "  {}:{}", button.suit.letter(), state)?;
        }
        if self.won {
            write!(f, "  {}", "WON".green().bold())?;
        }
        writeln!(f)?;

        let (top_row, work_stacks): (Vec<&ContainerView>, Vec<&ContainerView>) = self
            .containers
            .iter()
            .partition(|view| !matches!(view.id, ContainerId::WorkStack(_)));
        top_row
            .iter()
            .try_for_each(|view| write!(f, "{:<3}{} ", view.id.to_string(), self.slot(view)))?;
        writeln!(f)?;

        work_stacks
            .iter()
            .try_for_each(|view| write!(f, "  {:<5}", view.id.to_string()))?;
        writeln!(f)?;
        let depth = work_stacks
            .iter()
            .map(|view| view.cards.len())
            .max()
            .unwrap_or_default();
        for row in 0..depth {
            work_stacks
                .iter()
                .try_for_each(|view| write!(f, " {} ", self.cell(view.cards.get(row).copied())))?;
            writeln!(f)?;
        }
        Ok(())
    }
}
