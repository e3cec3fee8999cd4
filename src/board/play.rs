// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use anyhow::{bail, Context, Result};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::ops::Index;

use super::check::is_in_check;
use super::material::{Color, Piece};
use super::moves::{LegalMoves, Move, MoveError, MoveType};
use super::position::{MatingMaterial, Pos, Position, Squares};
use super::square::Coordinate;
use super::Turn;
use crate::game::{DrawReason, GameResult};

/// Plies without a capture, castling or pawn move that make a draw.
pub const FIFTY_MOVE_PLIES: usize = 100;

/// Occurrences of the same layout, the current one included, that make a draw.
pub const REPETITION_COUNT: usize = 3;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoardState {
    #[default]
    Regular,
    Check,
    CheckMate,
    StaleMate,
}

/// Plays both sides of a game, one validated move at a time.
///
/// A failed move leaves the board exactly as it was: validation works on
/// copies of the layout and nothing is written until the move is known to
/// be legal.
#[derive(Debug, Clone, Default)]
pub struct BoardManager {
    position: Position,
}

impl BoardManager {
    /// A game from the standard starting arrangement.
    pub fn new() -> Self {
        Self::from_position(Position::new())
    }

    /// A game from a custom arrangement built with `Position::set_contents`.
    pub fn from_position(position: Position) -> Self {
        let mut board = Self { position };
        board.update_board_state();
        board
    }

    /// Rebuilds a game from the standard arrangement by applying `moves`
    /// as recorded, without validating them.
    pub fn from_moves(moves: &[Move]) -> Self {
        let mut position = Position::new();
        for mv in moves {
            position.apply_move(*mv);
        }
        Self::from_position(position)
    }

    /// Rebuilds a game from the standard arrangement, validating every move.
    pub fn replay(moves: &[Move]) -> Result<Self> {
        Self::replay_from(Position::new(), moves)
    }

    /// Like `replay`, starting from a custom arrangement.
    pub fn replay_from(position: Position, moves: &[Move]) -> Result<Self> {
        let mut board = Self::from_position(position);
        for (ply, mv) in moves.iter().enumerate() {
            let played = board
                .perform_move(mv.from(), mv.to())
                .with_context(|| format!("ply {}: {} -> {}", ply + 1, mv.from(), mv.to()))?;
            if played.kind() != mv.kind() {
                bail!(
                    "ply {}: recorded as {:?} but plays as {:?}",
                    ply + 1,
                    mv.kind(),
                    played.kind()
                );
            }
        }
        Ok(board)
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn board_state(&self) -> BoardState {
        self.position.state()
    }

    /// Validates and applies the move from `from` to `to` for the side to
    /// play, then recomputes the board state.
    pub fn perform_move(&mut self, from: Coordinate, to: Coordinate) -> Result<Move, MoveError> {
        let mv = self.validate_move(from, to).map_err(|err| {
            debug!("{} {from} -> {to} rejected: {err}", self.turn());
            err
        })?;
        self.position.apply_move(mv);
        let state = self.update_board_state();
        debug!(
            "ply {}: {:?} {from} -> {to} ({:?}), board is {state:?}",
            self.position.history().len(),
            mv.piece(),
            mv.kind()
        );
        Ok(mv)
    }

    /// Recomputes whether the side to play is in check, checkmated or
    /// stalemated.
    pub fn update_board_state(&mut self) -> BoardState {
        let color = self.turn();
        let in_check = is_in_check(color, &self.position);
        let can_move = self.has_legal_move();
        let state = match (in_check, can_move) {
            (true, false) => BoardState::CheckMate,
            (true, true) => BoardState::Check,
            (false, false) => BoardState::StaleMate,
            (false, true) => BoardState::Regular,
        };
        trace!("{color} to play: in_check={in_check} can_move={can_move} -> {state:?}");
        self.position.set_state(state);
        state
    }

    /// True if the current layout has stood on the board `REPETITION_COUNT`
    /// times since the last capture, castling or en passant capture.
    pub fn check_threefold_repetition(&self) -> bool {
        let history = self.position.history();
        if history.is_empty() {
            return false;
        }
        let current = self.position.squares();
        let (mut squares, window) = match history.iter().rposition(|mv| mv.kind() != MoveType::Quiet) {
            Some(index) => (self.position.replay_squares(&history[..=index]), &history[index + 1..]),
            None => (*self.position.initial_squares(), history),
        };
        let mut occurrences = 1;
        for mv in window {
            if squares == *current {
                occurrences += 1;
            }
            squares.apply(mv);
        }
        occurrences >= REPETITION_COUNT
    }

    /// True if each of the last `FIFTY_MOVE_PLIES` plies was a quiet move
    /// by a piece other than a pawn.
    pub fn check_fifty_move_rule(&self) -> bool {
        let history = self.position.history();
        history.len() >= FIFTY_MOVE_PLIES
            && history[history.len() - FIFTY_MOVE_PLIES..]
                .iter()
                .all(|mv| mv.kind() == MoveType::Quiet && !mv.is_pawn_move())
    }

    /// True if neither side can possibly mate, using chess.com's heuristic:
    /// a lone king or a single minor piece against a lone king or a single
    /// minor piece. Two knights are not treated as insufficient.
    pub fn check_insufficient_material(&self) -> bool {
        use MatingMaterial::*;
        let material = self.position.mating_material();
        match (*material.white(), *material.black()) {
            (Sufficient, _) | (_, Sufficient) => false,
            (LoneKing, _) | (_, LoneKing) => true,
            (TwoKnights, _) | (_, TwoKnights) => false,
            _ => true,
        }
    }

    /// The outcome of the game, if it is over.
    pub fn game_result(&self) -> Option<GameResult> {
        match self.board_state() {
            BoardState::CheckMate => Some(GameResult::Win(!self.turn())),
            BoardState::StaleMate => Some(GameResult::Draw(DrawReason::StaleMate)),
            _ if self.check_threefold_repetition() => Some(GameResult::Draw(DrawReason::Repetition)),
            _ if self.check_fifty_move_rule() => Some(GameResult::Draw(DrawReason::FiftyMoves)),
            _ if self.check_insufficient_material() => Some(GameResult::Draw(DrawReason::Insufficient)),
            _ => None,
        }
    }
}

impl Turn for BoardManager {
    #[inline]
    fn turn(&self) -> Color {
        self.position.turn()
    }
}

impl AsRef<Position> for BoardManager {
    fn as_ref(&self) -> &Position {
        &self.position
    }
}

impl AsRef<Squares> for BoardManager {
    fn as_ref(&self) -> &Squares {
        self.position.squares()
    }
}

impl Pos for BoardManager {}

impl LegalMoves for BoardManager {}

impl Index<Coordinate> for BoardManager {
    type Output = Option<Piece>;
    fn index(&self, index: Coordinate) -> &Self::Output {
        self.position.index(index)
    }
}
