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

use once_cell::sync::Lazy;
use std::ops::Index;
use strum::IntoEnumIterator;

use super::castling::CastlingSide;
use super::material::{Color, Pair, Piece, PieceKind};
use super::moves::{Move, MoveType};
use super::play::BoardState;
use super::square::{Coordinate, Mask};
use super::Turn;

use Color::*;
use PieceKind::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatingMaterial {
    Sufficient,
    TwoKnights,
    OneKnight,
    OneBishop,
    LoneKing,
}

/// The contents of all 64 squares.
///
/// `Squares` is a plain value: probing a move means copying it and
/// applying the move to the copy (see [`Squares::after`]), which leaves
/// the original untouched. Equality compares piece identity only, so it
/// answers "is this the same layout" regardless of which pieces have moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Squares([Option<Piece>; 64]);

impl Squares {
    pub const fn empty() -> Self {
        Self([None; 64])
    }

    pub fn standard() -> Self {
        const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut squares = Self::empty();
        for color in Color::iter() {
            for (file, kind) in (0i8..).zip(BACK_RANK) {
                let _ = squares.place(Coordinate::new(file, color.back_rank()), Piece::new(color, kind));
                let _ = squares.place(Coordinate::new(file, color.pawn_rank()), Piece::new(color, Pawn));
            }
        }
        squares
    }

    /// The piece on `square`. Off-board squares are always empty.
    #[inline]
    pub fn get(&self, square: Coordinate) -> Option<Piece> {
        if square.in_bounds() {
            self.0[square.to_index()]
        } else {
            None
        }
    }

    /// Puts `piece` on `square`, returning whatever stood there before.
    /// Off-board squares are left alone.
    pub fn place(&mut self, square: Coordinate, piece: Piece) -> Option<Piece> {
        if !square.in_bounds() {
            return None;
        }
        self.0[square.to_index()].replace(piece)
    }

    pub fn remove(&mut self, square: Coordinate) -> Option<Piece> {
        if !square.in_bounds() {
            return None;
        }
        self.0[square.to_index()].take()
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Coordinate, Piece)> + '_ {
        self.0
            .iter()
            .copied()
            .enumerate()
            .filter_map(|(index, piece)| piece.map(|piece| (Coordinate::from_index(index), piece)))
    }

    /// Applies a fully validated move: relocates the piece, moves the rook
    /// when castling, removes the pawn taken en passant and promotes a pawn
    /// that reaches the far rank to a queen. Every piece that moves is
    /// flagged as moved.
    pub fn apply(&mut self, mv: &Move) {
        let (from, to) = (mv.from(), mv.to());
        let piece = mv.piece();
        let _ = self.remove(from);
        let landed = if piece.kind() == Pawn && to.rank() == (!piece.color()).back_rank() {
            Piece::new(piece.color(), Queen)
        } else {
            piece
        };
        let _ = self.place(to, landed.into_moved());
        match mv.kind() {
            MoveType::Castling => {
                let side = CastlingSide::from_king_move(from, to);
                let color = piece.color();
                if let Some(rook) = self.remove(side.rook_src(color)) {
                    let _ = self.place(side.rook_dest(color), rook.into_moved());
                }
            }
            MoveType::EnPassant => {
                // the captured pawn sits beside the mover, not on `to`
                let _ = self.remove(Coordinate::new(to.file(), from.rank()));
            }
            MoveType::Quiet | MoveType::Capture => {}
        }
    }

    /// A copy of this layout with `mv` applied.
    pub fn after(&self, mv: &Move) -> Self {
        let mut squares = *self;
        squares.apply(mv);
        squares
    }

    /// A copy of this layout with whatever stands on `from` moved to `to`
    /// and nothing else changed.
    pub fn relocated(&self, from: Coordinate, to: Coordinate) -> Self {
        let mut squares = *self;
        if let Some(piece) = squares.remove(from) {
            let _ = squares.place(to, piece);
        }
        squares
    }

    /// Mirror image across the middle of the board with colors swapped.
    #[cfg(test)]
    pub(crate) fn flipped(&self) -> Self {
        let mut squares = Self::empty();
        for (square, piece) in self.pieces() {
            let mirrored = Coordinate::new(square.file(), 7 - square.rank());
            let _ = squares.place(mirrored, Piece::new(!piece.color(), piece.kind()));
        }
        squares
    }
}

impl Index<Coordinate> for Squares {
    type Output = Option<Piece>;
    fn index(&self, index: Coordinate) -> &Self::Output {
        if index.in_bounds() {
            &self.0[index.to_index()]
        } else {
            &None
        }
    }
}

impl AsRef<Squares> for Squares {
    fn as_ref(&self) -> &Squares {
        self
    }
}

impl Pos for Squares {}

/// A game in progress: the current layout, the layout the game started
/// from, the move log and the last computed board state.
///
/// The log only grows. Whose turn it is follows from its length.
#[derive(Debug, Clone)]
pub struct Position {
    initial: Squares,
    squares: Squares,
    history: Vec<Move>,
    state: BoardState,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard starting arrangement.
    pub fn new() -> Self {
        Self::from_squares(Squares::standard())
    }

    /// A board with no pieces, to be populated with `set_contents`.
    pub fn empty() -> Self {
        Self::from_squares(Squares::empty())
    }

    pub fn from_squares(squares: Squares) -> Self {
        Self {
            initial: squares,
            squares,
            history: Vec::new(),
            state: BoardState::Regular,
        }
    }

    /// Sets up a square before the game starts. The starting layout used
    /// for replays is updated along with the current one.
    pub fn set_contents(mut self, square: Coordinate, value: Option<Piece>) -> Self {
        debug_assert!(self.history.is_empty());
        match value {
            Some(piece) => {
                let _ = self.squares.place(square, piece);
            }
            None => {
                let _ = self.squares.remove(square);
            }
        }
        self.initial = self.squares;
        self
    }

    #[inline]
    pub fn squares(&self) -> &Squares {
        &self.squares
    }

    #[inline]
    pub fn initial_squares(&self) -> &Squares {
        &self.initial
    }

    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    #[inline]
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    #[inline]
    pub fn state(&self) -> BoardState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: BoardState) {
        self.state = state;
    }

    pub(crate) fn apply_move(&mut self, mv: Move) {
        self.squares.apply(&mv);
        self.history.push(mv);
    }

    /// The layout reached by playing `moves` from this game's starting layout.
    pub fn replay_squares(&self, moves: &[Move]) -> Squares {
        moves.iter().fold(self.initial, |mut squares, mv| {
            squares.apply(mv);
            squares
        })
    }

    pub fn mating_material(&self) -> Pair<MatingMaterial> {
        Pair::new(self.material_of(White), self.material_of(Black))
    }

    fn material_of(&self, side: Color) -> MatingMaterial {
        let mut knights = 0;
        let mut bishops = 0;
        for (_, piece) in self.squares.pieces().filter(|(_, p)| p.color() == side) {
            match piece.kind() {
                King => {}
                Knight => knights += 1,
                Bishop => bishops += 1,
                Pawn | Rook | Queen => return MatingMaterial::Sufficient,
            }
        }
        match (knights, bishops) {
            (0, 0) => MatingMaterial::LoneKing,
            (1, 0) => MatingMaterial::OneKnight,
            (0, 1) => MatingMaterial::OneBishop,
            (2, 0) => MatingMaterial::TwoKnights,
            _ => MatingMaterial::Sufficient,
        }
    }
}

impl Turn for Position {
    #[inline]
    fn turn(&self) -> Color {
        if self.history.len() % 2 == 0 {
            White
        } else {
            Black
        }
    }
}

impl Index<Coordinate> for Position {
    type Output = Option<Piece>;
    #[inline]
    fn index(&self, index: Coordinate) -> &Self::Output {
        &self.squares[index]
    }
}

impl AsRef<Squares> for Position {
    fn as_ref(&self) -> &Squares {
        &self.squares
    }
}

impl AsRef<Self> for Position {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl Pos for Position {}

/// Read access to a layout.
pub trait Pos: AsRef<Squares> {
    #[inline]
    fn contents(&self, square: Coordinate) -> Option<Piece> {
        let squares: &Squares = self.as_ref();
        squares.get(square)
    }
    #[inline]
    fn is_vacant(&self, square: Coordinate) -> bool {
        self.contents(square).is_none()
    }
    fn occupied(&self) -> Mask {
        let squares: &Squares = self.as_ref();
        Mask::from_squares(squares.pieces().map(|(square, _)| square))
    }
    fn occupied_by(&self, color: Color) -> Mask {
        let squares: &Squares = self.as_ref();
        Mask::from_squares(
            squares
                .pieces()
                .filter(|(_, piece)| piece.color() == color)
                .map(|(square, _)| square),
        )
    }
    /// Where the king of `color` stands, found by scanning the board.
    fn king(&self, color: Color) -> Option<Coordinate> {
        let squares: &Squares = self.as_ref();
        squares
            .pieces()
            .find(|(_, piece)| piece.is(color, King))
            .map(|(square, _)| square)
    }
}

/// Squares strictly between `from` and `to`. Empty unless the two share a
/// file, a rank or a diagonal.
#[inline]
pub fn between(from: Coordinate, to: Coordinate) -> Mask {
    SQUARES_BETWEEN[from.to_index() * 64 + to.to_index()]
}

/// True if nothing stands strictly between `from` and `to`. The squares
/// must lie on one file, rank or diagonal; any other pair is rejected.
/// The destination itself is not examined.
pub fn is_path_clear<P: Pos + ?Sized>(pos: &P, from: Coordinate, to: Coordinate) -> bool {
    if (to - from).to_unit().is_none() {
        return false;
    }
    (between(from, to) & pos.occupied()).is_empty()
}

static SQUARES_BETWEEN: Lazy<[Mask; 64 * 64]> = Lazy::new(|| {
    fn squares_between(start: Coordinate, end: Coordinate) -> Mask {
        let mut mask = Mask::empty();
        if let Some(step) = (end - start).to_unit() {
            let mut next = start + step;
            while let Some(square) = next {
                if square == end {
                    break;
                }
                mask |= square;
                next = square + step;
            }
        }
        mask
    }

    let mut array = [Mask::empty(); 64 * 64];
    for start in Coordinate::iter() {
        for end in Coordinate::iter() {
            array[start.to_index() * 64 + end.to_index()] = squares_between(start, end);
        }
    }
    array
});

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(file: i8, rank: i8) -> Coordinate {
        Coordinate::new(file, rank)
    }

    #[test]
    fn test_standard_layout() {
        let pos = Position::new();
        assert_eq!(pos.contents(sq(4, 0)), Some(Piece::WK));
        assert_eq!(pos.contents(sq(3, 7)), Some(Piece::BQ));
        assert_eq!(pos.contents(sq(0, 6)), Some(Piece::BP));
        assert_eq!(pos.occupied().len(), 32);
        assert_eq!(pos.occupied_by(White).len(), 16);
        assert!(pos.is_vacant(sq(4, 4)));
        assert_eq!(pos.turn(), White);
    }
    #[test]
    fn test_king_lookup() {
        let pos = Position::new();
        assert_eq!(pos.king(White), Some(sq(4, 0)));
        assert_eq!(pos.king(Black), Some(sq(4, 7)));
        assert_eq!(Position::empty().king(White), None);
    }
    #[test]
    fn test_between_horizontal() {
        let mask = between(sq(0, 2), sq(4, 2));
        assert_eq!(mask.len(), 3);
        assert!(!mask.contains(sq(0, 2)));
        assert!(mask.contains(sq(1, 2)));
        assert!(mask.contains(sq(3, 2)));
        assert!(!mask.contains(sq(4, 2)));
    }
    #[test]
    fn test_between_vertical_downward() {
        let mask = between(sq(2, 7), sq(2, 1));
        assert_eq!(mask.len(), 5);
        assert!(mask.contains(sq(2, 6)));
        assert!(mask.contains(sq(2, 2)));
        assert!(!mask.contains(sq(2, 1)));
    }
    #[test]
    fn test_between_diagonal() {
        let mask = between(sq(7, 2), sq(5, 4));
        assert_eq!(mask.len(), 1);
        assert!(mask.contains(sq(6, 3)));
    }
    #[test]
    fn test_between_adjacent_and_unaligned() {
        assert!(between(sq(6, 3), sq(5, 4)).is_empty());
        assert!(between(sq(0, 0), sq(7, 4)).is_empty());
    }
    #[test]
    fn test_path_clear() {
        let pos = Position::new();
        assert!(!is_path_clear(&pos, sq(0, 0), sq(0, 3)));
        assert!(is_path_clear(&pos, sq(0, 1), sq(0, 3)));
        // knight jump is neither straight nor diagonal
        assert!(!is_path_clear(&pos, sq(1, 0), sq(2, 2)));
    }
    #[test]
    fn test_apply_castling_moves_rook() {
        let mut squares = Squares::empty();
        let _ = squares.place(sq(4, 0), Piece::WK);
        let _ = squares.place(sq(7, 0), Piece::WR);
        squares.apply(&Move::new(sq(4, 0), sq(6, 0), Piece::WK, MoveType::Castling));
        assert_eq!(squares.get(sq(6, 0)), Some(Piece::WK));
        assert_eq!(squares.get(sq(5, 0)), Some(Piece::WR));
        assert!(squares.get(sq(5, 0)).is_some_and(|rook| rook.has_moved()));
        assert_eq!(squares.get(sq(7, 0)), None);
    }
    #[test]
    fn test_apply_promotes_to_queen() {
        let mut squares = Squares::empty();
        let _ = squares.place(sq(1, 6), Piece::WP);
        squares.apply(&Move::new(sq(1, 6), sq(1, 7), Piece::WP, MoveType::Quiet));
        assert_eq!(squares.get(sq(1, 7)), Some(Piece::WQ));
    }
    #[test]
    fn test_off_board_squares_are_ignored() {
        let mut squares = Squares::empty();
        assert_eq!(squares.place(sq(-1, 0), Piece::WK), None);
        assert_eq!(squares.place(sq(8, 7), Piece::BK), None);
        assert_eq!(squares, Squares::empty());
        assert_eq!(squares.remove(sq(0, 8)), None);
        assert_eq!(squares[sq(-1, 3)], None);
        let pos = Position::new().set_contents(sq(8, 0), Some(Piece::WQ));
        assert_eq!(pos.squares(), &Squares::standard());
    }
    #[test]
    fn test_after_leaves_original() {
        let squares = Squares::standard();
        let mv = Move::new(sq(4, 1), sq(4, 3), Piece::WP, MoveType::Quiet);
        let moved = squares.after(&mv);
        assert_eq!(squares, Squares::standard());
        assert_ne!(moved, squares);
        assert_eq!(moved.get(sq(4, 3)), Some(Piece::WP));
    }
    #[test]
    fn test_set_contents_updates_initial_layout() {
        let pos = Position::empty()
            .set_contents(sq(4, 0), Some(Piece::WK))
            .set_contents(sq(4, 7), Some(Piece::BK));
        assert_eq!(pos.initial_squares(), pos.squares());
        assert_eq!(pos.replay_squares(&[]), *pos.squares());
    }
    #[test]
    fn test_mating_material() {
        let pos = Position::empty()
            .set_contents(sq(4, 0), Some(Piece::WK))
            .set_contents(sq(1, 0), Some(Piece::WN))
            .set_contents(sq(6, 0), Some(Piece::WN))
            .set_contents(sq(4, 7), Some(Piece::BK))
            .set_contents(sq(2, 7), Some(Piece::BB));
        let material = pos.mating_material();
        assert_eq!(material[White], MatingMaterial::TwoKnights);
        assert_eq!(material[Black], MatingMaterial::OneBishop);
        assert_eq!(Position::new().mating_material()[White], MatingMaterial::Sufficient);
    }
}
