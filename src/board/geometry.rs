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

//! Move geometry: where a piece could go from a square on an empty board.
//!
//! Nothing here looks at other pieces, whose turn it is or whether the
//! king is safe. Every table is clipped to the board.

use once_cell::sync::Lazy;
use strum::IntoEnumIterator;

use super::material::{Color, Pair, Piece, PieceKind};
use super::square::{Coordinate, Direction, Mask, Offset};

use Color::*;
use PieceKind::*;

/// All squares `piece` could reach from `origin`, ignoring occupancy.
///
/// Kings include the two squares two files away on the same rank, since
/// castling is decided later. Pawns include both forward diagonals, which
/// callers prune unless there is something to capture.
pub fn candidate_squares(piece: Piece, origin: Coordinate) -> Mask {
    if !origin.in_bounds() {
        return Mask::empty();
    }
    match piece.kind() {
        King => KING_MOVES[origin] | CASTLING_MOVES[origin],
        Queen => QUEEN_MOVES[origin],
        Rook => ROOK_MOVES[origin],
        Bishop => BISHOP_MOVES[origin],
        Knight => KNIGHT_MOVES[origin],
        Pawn => PAWN_ADVANCES[piece.color()][origin] | PAWN_ATTACKS[piece.color()][origin],
    }
}

#[inline]
pub(super) fn king_moves(square: Coordinate) -> Mask {
    KING_MOVES[square]
}

#[inline]
pub(super) fn knight_moves(square: Coordinate) -> Mask {
    KNIGHT_MOVES[square]
}

/// The two diagonal squares one rank ahead of `square` for `color`.
#[inline]
pub(super) fn pawn_attacks(color: Color, square: Coordinate) -> Mask {
    PAWN_ATTACKS[color][square]
}

fn table<F>(f: F) -> [Mask; 64]
where
    F: Fn(Coordinate) -> Mask,
{
    let mut array = [Mask::empty(); 64];
    for square in Coordinate::iter() {
        array[square] = f(square);
    }
    array
}

fn offsets(square: Coordinate, offsets: &[(i8, i8)]) -> Mask {
    Mask::from_squares(
        offsets
            .iter()
            .filter_map(|&(x, y)| square + Offset::new(x, y)),
    )
}

fn rays<I>(square: Coordinate, directions: I) -> Mask
where
    I: Iterator<Item = Direction>,
{
    Mask::from_squares(directions.flat_map(|direction| square.ray(direction)))
}

static KING_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    table(|square| Mask::from_squares(Direction::iter().filter_map(|dir| square + dir)))
});

static CASTLING_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| table(|square| offsets(square, &[(-2, 0), (2, 0)])));

static KNIGHT_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    table(|square| {
        offsets(
            square,
            &[(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)],
        )
    })
});

static ROOK_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| table(|square| rays(square, Direction::orthogonals())));

static BISHOP_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| table(|square| rays(square, Direction::diagonals())));

static QUEEN_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| table(|square| ROOK_MOVES[square] | BISHOP_MOVES[square]));

static PAWN_ADVANCES: Lazy<Pair<[Mask; 64]>> = Lazy::new(|| {
    let advances = |color: Color| {
        table(move |square| {
            let forward = color.forward();
            let mut mask = offsets(square, &[(0, forward)]);
            if square.rank() == color.pawn_rank() {
                mask |= offsets(square, &[(0, 2 * forward)]);
            }
            mask
        })
    };
    Pair::new(advances(White), advances(Black))
});

static PAWN_ATTACKS: Lazy<Pair<[Mask; 64]>> = Lazy::new(|| {
    let attacks = |color: Color| {
        table(move |square| {
            let forward = color.forward();
            offsets(square, &[(-1, forward), (1, forward)])
        })
    };
    Pair::new(attacks(White), attacks(Black))
});

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sq(file: i8, rank: i8) -> Coordinate {
        Coordinate::new(file, rank)
    }

    #[test]
    fn test_knight_in_corner() {
        let mask = candidate_squares(Piece::WN, sq(0, 0));
        assert_eq!(mask, Mask::from_squares([sq(1, 2), sq(2, 1)]));
    }
    #[test]
    fn test_knight_in_center() {
        assert_eq!(candidate_squares(Piece::BN, sq(3, 3)).len(), 8);
    }
    #[test]
    fn test_king_includes_castling_squares() {
        let mask = candidate_squares(Piece::WK, sq(4, 0));
        assert_eq!(mask.len(), 7);
        assert!(mask.contains(sq(6, 0)));
        assert!(mask.contains(sq(2, 0)));
        assert!(!mask.contains(sq(4, 2)));
    }
    #[test]
    fn test_rook_covers_file_and_rank() {
        let mask = candidate_squares(Piece::WR, sq(0, 0));
        assert_eq!(mask.len(), 14);
        assert!(mask.contains(sq(0, 7)));
        assert!(mask.contains(sq(7, 0)));
        assert!(!mask.contains(sq(0, 0)));
    }
    #[test]
    fn test_bishop_covers_both_diagonals() {
        let mask = candidate_squares(Piece::BB, sq(3, 3));
        assert_eq!(mask.len(), 13);
        assert!(mask.contains(sq(0, 0)));
        assert!(mask.contains(sq(0, 6)));
        assert!(mask.contains(sq(6, 0)));
        assert!(mask.contains(sq(7, 7)));
    }
    #[test]
    fn test_queen_is_rook_plus_bishop() {
        let origin = sq(2, 5);
        assert_eq!(
            candidate_squares(Piece::WQ, origin),
            candidate_squares(Piece::WR, origin) | candidate_squares(Piece::WB, origin)
        );
    }
    #[test]
    fn test_pawn_double_advance_only_from_start() {
        let start = candidate_squares(Piece::WP, sq(4, 1));
        assert_eq!(start, Mask::from_squares([sq(4, 2), sq(4, 3), sq(3, 2), sq(5, 2)]));
        let later = candidate_squares(Piece::WP, sq(4, 2));
        assert_eq!(later, Mask::from_squares([sq(4, 3), sq(3, 3), sq(5, 3)]));
    }
    #[test]
    fn test_black_pawn_moves_down() {
        let mask = candidate_squares(Piece::BP, sq(0, 6));
        assert_eq!(mask, Mask::from_squares([sq(0, 5), sq(0, 4), sq(1, 5)]));
    }
    #[test]
    fn test_pawn_on_far_rank_has_no_candidates() {
        assert!(candidate_squares(Piece::WP, sq(3, 7)).is_empty());
    }
    #[test]
    fn test_off_board_origin() {
        assert!(candidate_squares(Piece::WQ, sq(8, 0)).is_empty());
        assert!(candidate_squares(Piece::WN, sq(-1, 3)).is_empty());
    }

    fn any_piece() -> impl Strategy<Value = Piece> {
        (0usize..6, any::<bool>()).prop_map(|(kind, white)| {
            let kind = PieceKind::from_index(kind);
            if white {
                Piece::white(kind)
            } else {
                Piece::black(kind)
            }
        })
    }

    proptest! {
        #[test]
        fn candidates_stay_on_board(piece in any_piece(), file in 0i8..8, rank in 0i8..8) {
            let origin = sq(file, rank);
            let mask = candidate_squares(piece, origin);
            prop_assert!(!mask.contains(origin));
            for square in mask.iter() {
                prop_assert!(square.in_bounds());
            }
        }
    }
}
