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

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::castling::Castling;
use super::check::is_in_check;
use super::geometry::{candidate_squares, king_moves, pawn_attacks};
use super::material::{Color, Piece, PieceKind};
use super::position::{is_path_clear, Pos, Position};
use super::square::{Coordinate, Mask};
use super::Turn;

use PieceKind::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("Not a legal move")]
    InvalidMove,
    #[error("Move would leave the king in check")]
    KingExposedToCheck,
}
use MoveError::*;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveType {
    /// To an empty square.
    Quiet,
    Capture,
    Castling,
    EnPassant,
}

/// A validated move as recorded in the game log.
///
/// `piece` is the piece as it stood on `from` before moving. A pawn that
/// promotes is still recorded as a pawn.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Coordinate,
    to: Coordinate,
    piece: Piece,
    kind: MoveType,
}

impl Move {
    pub fn new(from: Coordinate, to: Coordinate, piece: Piece, kind: MoveType) -> Self {
        Self {
            from,
            to,
            piece,
            kind,
        }
    }
    #[inline]
    pub fn from(&self) -> Coordinate {
        self.from
    }
    #[inline]
    pub fn to(&self) -> Coordinate {
        self.to
    }
    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }
    #[inline]
    pub fn kind(&self) -> MoveType {
        self.kind
    }
    #[inline]
    pub fn is_pawn_move(&self) -> bool {
        self.piece.kind().is_pawn()
    }
}

/// Classifies a move of a `color` piece onto `to` by what stands there:
/// nothing is quiet, an enemy piece is a capture, a friendly piece is
/// not a move at all.
pub fn classify<P: Pos + ?Sized>(color: Color, pos: &P, to: Coordinate) -> Option<MoveType> {
    match pos.contents(to) {
        None => Some(MoveType::Quiet),
        Some(piece) if piece.color() != color => Some(MoveType::Capture),
        Some(_) => None,
    }
}

/// The validation pipeline for moves of the side to play.
pub trait LegalMoves: AsRef<Position> {
    /// Candidate squares for the piece on `from`, with pawn diagonals kept
    /// only when there is something to take and king jumps kept only when
    /// castling is allowed. Occupancy and king safety are not checked.
    fn eligible_squares(&self, from: Coordinate) -> Mask {
        let pos: &Position = self.as_ref();
        let piece = match pos.contents(from) {
            Some(piece) => piece,
            None => return Mask::empty(),
        };
        let candidates = candidate_squares(piece, from);
        match piece.kind() {
            Pawn => {
                let attacks = pawn_attacks(piece.color(), from);
                let mut targets = pos.occupied_by(!piece.color());
                if let Some(target) = self.en_passant_target(from) {
                    targets |= target;
                }
                (candidates - attacks) | (attacks & targets)
            }
            King => (candidates & king_moves(from)) | pos.castling_destinations(piece.color()),
            _ => candidates,
        }
    }

    /// The square the pawn on `from` may move to by capturing en passant.
    ///
    /// Only the move immediately after an enemy pawn's double advance
    /// qualifies, and only for a pawn beside where it landed.
    fn en_passant_target(&self, from: Coordinate) -> Option<Coordinate> {
        let pos: &Position = self.as_ref();
        let pawn = pos.contents(from).filter(|piece| piece.kind() == Pawn)?;
        let last = pos.last_move()?;
        let qualifies = last.piece().is(!pawn.color(), Pawn)
            && (last.to().rank() - last.from().rank()).abs() == 2
            && last.to().rank() == from.rank()
            && (last.to().file() - from.file()).abs() == 1;
        if qualifies {
            Coordinate::try_new(last.to().file(), from.rank() + pawn.color().forward())
        } else {
            None
        }
    }

    /// Classifies the move of the piece on `from` to `to`, applying the
    /// rules particular to its kind. `None` means the move is illegal.
    fn classify_move(&self, from: Coordinate, to: Coordinate) -> Option<MoveType> {
        let pos: &Position = self.as_ref();
        let piece = pos.contents(from)?;
        let kind = classify(piece.color(), pos, to)?;
        let offset = to - from;
        match piece.kind() {
            // pawns never capture straight ahead
            Pawn if offset.x == 0 => match kind {
                MoveType::Capture => None,
                _ => is_path_clear(pos, from, to).then_some(kind),
            },
            Pawn => match kind {
                MoveType::Quiet if self.en_passant_target(from) == Some(to) => Some(MoveType::EnPassant),
                MoveType::Quiet => None,
                _ => Some(kind),
            },
            King if offset.x.abs() > 1 => match kind {
                MoveType::Quiet => Some(MoveType::Castling),
                _ => None,
            },
            Bishop | Rook | Queen => is_path_clear(pos, from, to).then_some(kind),
            King | Knight => Some(kind),
        }
    }

    fn validate_move(&self, from: Coordinate, to: Coordinate) -> Result<Move, MoveError> {
        if !from.in_bounds() || !to.in_bounds() {
            trace!("rejecting {from} -> {to}: off the board");
            return Err(InvalidMove);
        }
        let pos: &Position = self.as_ref();
        let piece = pos
            .contents(from)
            .filter(|piece| piece.color() == pos.turn())
            .ok_or_else(|| {
                trace!("rejecting {from} -> {to}: no {} piece on {from}", pos.turn());
                InvalidMove
            })?;
        if !self.eligible_squares(from).contains(to) {
            trace!("rejecting {from} -> {to}: not a candidate for {:?}", piece.kind());
            return Err(InvalidMove);
        }
        let kind = self.classify_move(from, to).ok_or_else(|| {
            trace!("rejecting {from} -> {to}: occupied or blocked");
            InvalidMove
        })?;
        let mv = Move::new(from, to, piece, kind);
        if is_in_check(piece.color(), &pos.squares().after(&mv)) {
            trace!("rejecting {from} -> {to}: king left in check");
            return Err(KingExposedToCheck);
        }
        Ok(mv)
    }

    /// Squares the piece on `from` can legally move to.
    fn legal_destinations(&self, from: Coordinate) -> Mask {
        Mask::from_squares(
            self.eligible_squares(from)
                .iter()
                .filter(|&to| self.validate_move(from, to).is_ok()),
        )
    }

    /// Every legal move for the side to play.
    fn legal_moves(&self) -> Vec<Move> {
        let pos: &Position = self.as_ref();
        pos.occupied_by(pos.turn())
            .iter()
            .flat_map(|from| {
                self.eligible_squares(from)
                    .iter()
                    .filter_map(move |to| self.validate_move(from, to).ok())
            })
            .collect()
    }

    fn has_legal_move(&self) -> bool {
        let pos: &Position = self.as_ref();
        pos.occupied_by(pos.turn())
            .iter()
            .any(|from| !self.legal_destinations(from).is_empty())
    }
}

impl LegalMoves for Position {}

#[cfg(test)]
mod tests {
    use super::*;

    use Color::*;

    fn sq(file: i8, rank: i8) -> Coordinate {
        Coordinate::new(file, rank)
    }

    fn play(pos: &mut Position, from: (i8, i8), to: (i8, i8)) -> Move {
        let mv = pos.validate_move(sq(from.0, from.1), sq(to.0, to.1)).unwrap();
        pos.apply_move(mv);
        mv
    }

    #[test]
    fn test_classify() {
        let pos = Position::new();
        assert_eq!(classify(White, &pos, sq(4, 3)), Some(MoveType::Quiet));
        assert_eq!(classify(White, &pos, sq(4, 6)), Some(MoveType::Capture));
        assert_eq!(classify(White, &pos, sq(4, 1)), None);
    }
    #[test]
    fn test_standard_start_moves() {
        let pos = Position::new();
        assert_eq!(pos.legal_moves().len(), 20);
        assert_eq!(
            pos.legal_destinations(sq(1, 0)),
            Mask::from_squares([sq(0, 2), sq(2, 2)])
        );
        assert!(pos.legal_destinations(sq(0, 0)).is_empty());
        // not black's turn
        assert!(pos.legal_destinations(sq(1, 7)).is_empty());
    }
    #[test]
    fn test_double_advance_is_quiet() {
        let mut pos = Position::new();
        let mv = play(&mut pos, (4, 1), (4, 3));
        assert_eq!(mv.kind(), MoveType::Quiet);
        assert_eq!(pos.turn(), Black);
    }
    #[test]
    fn test_double_advance_blocked() {
        let mut pos = Position::new();
        play(&mut pos, (6, 0), (5, 2));
        play(&mut pos, (4, 6), (4, 4));
        // f3 knight blocks the f-pawn entirely
        assert_eq!(pos.validate_move(sq(5, 1), sq(5, 3)), Err(InvalidMove));
        assert_eq!(pos.validate_move(sq(5, 1), sq(5, 2)), Err(InvalidMove));
    }
    #[test]
    fn test_pawn_cannot_capture_forward() {
        let mut pos = Position::new();
        play(&mut pos, (4, 1), (4, 3));
        play(&mut pos, (4, 6), (4, 4));
        assert_eq!(pos.validate_move(sq(4, 3), sq(4, 4)), Err(InvalidMove));
    }
    #[test]
    fn test_pawn_diagonal_capture() {
        let mut pos = Position::new();
        play(&mut pos, (4, 1), (4, 3));
        play(&mut pos, (3, 6), (3, 4));
        let mv = play(&mut pos, (4, 3), (3, 4));
        assert_eq!(mv.kind(), MoveType::Capture);
        assert_eq!(pos.contents(sq(3, 4)), Some(Piece::WP));
    }
    #[test]
    fn test_pawn_diagonal_without_target() {
        let pos = Position::new();
        assert_eq!(pos.validate_move(sq(4, 1), sq(5, 2)), Err(InvalidMove));
    }
    #[test]
    fn test_en_passant() {
        let mut pos = Position::new();
        play(&mut pos, (4, 1), (4, 3));
        play(&mut pos, (0, 6), (0, 5));
        play(&mut pos, (4, 3), (4, 4));
        play(&mut pos, (3, 6), (3, 4));
        assert_eq!(pos.en_passant_target(sq(4, 4)), Some(sq(3, 5)));
        let mv = play(&mut pos, (4, 4), (3, 5));
        assert_eq!(mv.kind(), MoveType::EnPassant);
        assert_eq!(pos.contents(sq(3, 5)), Some(Piece::WP));
        assert_eq!(pos.contents(sq(3, 4)), None);
        assert_eq!(pos.contents(sq(4, 4)), None);
    }
    #[test]
    fn test_en_passant_only_immediately() {
        let mut pos = Position::new();
        play(&mut pos, (4, 1), (4, 3));
        play(&mut pos, (0, 6), (0, 5));
        play(&mut pos, (4, 3), (4, 4));
        play(&mut pos, (3, 6), (3, 4));
        play(&mut pos, (7, 1), (7, 2));
        play(&mut pos, (0, 5), (0, 4));
        assert_eq!(pos.en_passant_target(sq(4, 4)), None);
        assert_eq!(pos.validate_move(sq(4, 4), sq(3, 5)), Err(InvalidMove));
    }
    #[test]
    fn test_single_advance_gives_no_en_passant() {
        let mut pos = Position::new();
        play(&mut pos, (4, 1), (4, 3));
        play(&mut pos, (3, 6), (3, 5));
        play(&mut pos, (4, 3), (4, 4));
        play(&mut pos, (3, 5), (3, 4));
        assert_eq!(pos.en_passant_target(sq(4, 4)), None);
    }
    #[test]
    fn test_slider_blocked() {
        let pos = Position::new();
        assert_eq!(pos.validate_move(sq(2, 0), sq(4, 2)), Err(InvalidMove));
        assert_eq!(pos.validate_move(sq(3, 0), sq(3, 3)), Err(InvalidMove));
    }
    #[test]
    fn test_own_piece_destination() {
        let pos = Position::new();
        assert_eq!(pos.validate_move(sq(1, 0), sq(3, 1)), Err(InvalidMove));
    }
    #[test]
    fn test_off_board() {
        let pos = Position::new();
        assert_eq!(pos.validate_move(sq(4, 1), sq(4, 8)), Err(InvalidMove));
        assert_eq!(pos.validate_move(sq(-1, 0), sq(0, 0)), Err(InvalidMove));
    }
    #[test]
    fn test_pinned_piece_exposes_king() {
        let pos = Position::empty()
            .set_contents(sq(4, 0), Some(Piece::WK))
            .set_contents(sq(4, 1), Some(Piece::WB))
            .set_contents(sq(4, 7), Some(Piece::BR))
            .set_contents(sq(0, 7), Some(Piece::BK));
        assert_eq!(pos.validate_move(sq(4, 1), sq(3, 2)), Err(KingExposedToCheck));
        // not a bishop move at all
        assert_eq!(pos.validate_move(sq(4, 1), sq(4, 2)), Err(InvalidMove));
        assert!(pos.legal_destinations(sq(4, 1)).is_empty());
    }
    #[test]
    fn test_king_cannot_step_into_check() {
        let pos = Position::empty()
            .set_contents(sq(4, 0), Some(Piece::WK))
            .set_contents(sq(3, 7), Some(Piece::BR))
            .set_contents(sq(0, 7), Some(Piece::BK));
        assert_eq!(pos.validate_move(sq(4, 0), sq(3, 0)), Err(KingExposedToCheck));
        assert!(pos.validate_move(sq(4, 0), sq(5, 0)).is_ok());
    }
    #[test]
    fn test_castling_classified() {
        let pos = Position::empty()
            .set_contents(sq(4, 0), Some(Piece::WK))
            .set_contents(sq(7, 0), Some(Piece::WR))
            .set_contents(sq(4, 7), Some(Piece::BK));
        let mv = pos.validate_move(sq(4, 0), sq(6, 0)).unwrap();
        assert_eq!(mv.kind(), MoveType::Castling);
        // no rook on the queen side
        assert_eq!(pos.validate_move(sq(4, 0), sq(2, 0)), Err(InvalidMove));
    }
    #[test]
    fn test_promotion_square_is_quiet() {
        let pos = Position::empty()
            .set_contents(sq(4, 0), Some(Piece::WK))
            .set_contents(sq(0, 6), Some(Piece::WP))
            .set_contents(sq(7, 7), Some(Piece::BK));
        let mv = pos.validate_move(sq(0, 6), sq(0, 7)).unwrap();
        assert_eq!(mv.kind(), MoveType::Quiet);
        assert!(mv.is_pawn_move());
    }
}
