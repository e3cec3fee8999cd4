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

//! Rules engine for standard chess
//!
//! A _board_ decides whether a proposed move is legal, classifies it,
//! applies it and evaluates the resulting game state. The following
//! features are supported:
//!
//! [x] Standard chess rules, including castling and en passant
//! [x] Automatic promotion to a queen
//! [x] Distinguish illegal moves from moves that expose the king
//! [x] Check, checkmate and stalemate detection
//! [x] Enforce three-fold repetition rule
//! [x] Enforce fifty-move rule
//! [x] Recognize insufficient mating material (using chess.com's heuristics)
//! [x] Custom starting arrangements
//! [x] Validated and unchecked reconstruction from a move log
//! [ ] Under-promotion
//! [ ] Chess960 rules
//!
//! Some of the key abstractions include:
//!
//! * A `Coordinate` is a (file, rank) pair. Files and ranks both run
//!   from 0 to 7; White's pieces start on ranks 0 and 1. A coordinate
//!   may be built off the board, but only in-bounds coordinates can be
//!   looked up.
//!
//! * A `Mask` is a 64-bit (u64) value in which each bit maps to a
//!   square on the board. Masks represent sets of squares such as a
//!   piece's candidate destinations. They combine with `|`, `|=`, `&`,
//!   and `-`, and `iter()` walks the squares in either
//!   direction.
//!
//! * A `Piece` is a `PieceKind` of a specific `Color` plus a flag that
//!   records whether it has ever moved. The flag does not take part in
//!   equality.
//!
//! * `Squares` is the plain 64-square layout. It is `Copy`, so probing
//!   a move (for king safety or castling through check) always works on
//!   a copy; the real layout is only written once a move is legal.
//!
//! * A `Position` holds the current `Squares`, the layout the game
//!   started from, the append-only move log and the last computed
//!   `BoardState`. Whose turn it is follows from the log's length.
//!
//! * `candidate_squares` gives a piece's geometry on an empty board,
//!   `is_path_clear` checks the squares a slider passes over and
//!   `is_in_check` answers whether a king is attacked.
//!
//! * The `LegalMoves` trait is the validation pipeline (candidates,
//!   castling and en passant eligibility, classification, path and king
//!   safety). The `Castling` trait decides castling eligibility from the
//!   board and the move log.
//!
//! * `BoardManager` plays both sides: `perform_move` validates and
//!   applies a move, after which the board state is recomputed. Draw
//!   conditions are evaluated on request by replaying the move log.
//!

mod castling;
mod check;
mod geometry;
mod material;
mod moves;
mod play;
mod position;
mod square;

pub use castling::*;
pub use check::*;
pub use geometry::*;
pub use material::*;
pub use moves::*;
pub use play::*;
pub use position::*;
pub use square::*;

pub trait Turn {
    fn turn(&self) -> Color;
}
