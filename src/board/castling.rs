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
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use super::check::is_in_check;
use super::material::{Color, PieceKind};
use super::position::{between, Pos, Position};
use super::square::{Coordinate, Mask};

use PieceKind::*;

const KING_FILE: i8 = 4;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}
use CastlingSide::*;

impl CastlingSide {
    /// The side a king move of two files toward `to` castles on.
    #[inline]
    pub fn from_king_move(from: Coordinate, to: Coordinate) -> Self {
        if to.file() > from.file() {
            KingSide
        } else {
            QueenSide
        }
    }
    #[inline]
    pub const fn rook_file(&self) -> i8 {
        match self {
            KingSide => 7,
            QueenSide => 0,
        }
    }
    #[inline]
    pub const fn rook_dest_file(&self) -> i8 {
        match self {
            KingSide => 5,
            QueenSide => 3,
        }
    }
    #[inline]
    pub const fn king_dest_file(&self) -> i8 {
        match self {
            KingSide => 6,
            QueenSide => 2,
        }
    }
    #[inline]
    pub fn king_src(&self, color: Color) -> Coordinate {
        Coordinate::new(KING_FILE, color.back_rank())
    }
    #[inline]
    pub fn king_dest(&self, color: Color) -> Coordinate {
        Coordinate::new(self.king_dest_file(), color.back_rank())
    }
    #[inline]
    pub fn rook_src(&self, color: Color) -> Coordinate {
        Coordinate::new(self.rook_file(), color.back_rank())
    }
    #[inline]
    pub fn rook_dest(&self, color: Color) -> Coordinate {
        Coordinate::new(self.rook_dest_file(), color.back_rank())
    }
    /// Squares that must be empty: everything between king and rook.
    pub fn blocking_lane(&self, color: Color) -> Mask {
        between(self.king_src(color), self.rook_src(color))
    }
    /// Squares the king stands on, crosses and lands on. None may be attacked.
    pub fn king_path(&self, color: Color) -> Mask {
        let king_src = self.king_src(color);
        let king_dest = self.king_dest(color);
        between(king_src, king_dest) | king_src | king_dest
    }
}

/// Castling eligibility, decided from the board and the move log.
pub trait Castling: AsRef<Position> {
    fn can_castle(&self, color: Color, side: CastlingSide) -> bool {
        let pos: &Position = self.as_ref();
        let king_src = side.king_src(color);
        let rook_src = side.rook_src(color);

        let king_unmoved = pos
            .contents(king_src)
            .is_some_and(|piece| piece.is(color, King) && !piece.has_moved())
            && !pos
                .history()
                .iter()
                .any(|mv| mv.piece().is(color, King));
        if !king_unmoved {
            trace!("{color} cannot castle {side:?}: king has moved");
            return false;
        }

        let rook_unmoved = pos
            .contents(rook_src)
            .is_some_and(|piece| piece.is(color, Rook) && !piece.has_moved())
            && !pos.history().iter().any(|mv| mv.from() == rook_src);
        if !rook_unmoved {
            trace!("{color} cannot castle {side:?}: rook has moved");
            return false;
        }

        if !(side.blocking_lane(color) & pos.occupied()).is_empty() {
            trace!("{color} cannot castle {side:?}: lane is blocked");
            return false;
        }

        let squares = pos.squares();
        let attacked = side
            .king_path(color)
            .iter()
            .any(|square| is_in_check(color, &squares.relocated(king_src, square)));
        if attacked {
            trace!("{color} cannot castle {side:?}: king path is attacked");
            return false;
        }
        true
    }

    /// King destinations for every side `color` may castle on right now.
    fn castling_destinations(&self, color: Color) -> Mask {
        Mask::from_squares(
            CastlingSide::iter()
                .filter(|&side| self.can_castle(color, side))
                .map(|side| side.king_dest(color)),
        )
    }
}

impl Castling for Position {}
