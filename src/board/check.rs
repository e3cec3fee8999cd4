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

use super::geometry::{king_moves, knight_moves, pawn_attacks};
use super::material::{Color, PieceKind};
use super::position::Pos;
use super::square::{Coordinate, Direction, Mask};

use PieceKind::*;

/// True if the king of `color` is attacked.
///
/// A board without a king of that color is never in check. Probing code
/// relies on this to evaluate partial or hypothetical layouts.
pub fn is_in_check<P: Pos + ?Sized>(color: Color, pos: &P) -> bool {
    match pos.king(color) {
        Some(king) => is_attacked(king, color, pos),
        None => false,
    }
}

/// True if a piece of `color` standing on `square` would be attacked by
/// the other side.
pub fn is_attacked<P: Pos + ?Sized>(square: Coordinate, color: Color, pos: &P) -> bool {
    let enemy = !color;
    attacked_along(square, enemy, Direction::orthogonals(), pos, PieceKind::slides_orthogonally)
        || attacked_along(square, enemy, Direction::diagonals(), pos, PieceKind::slides_diagonally)
        || any_enemy(knight_moves(square), enemy, Knight, pos)
        || any_enemy(pawn_attacks(color, square), enemy, Pawn, pos)
        || any_enemy(king_moves(square), enemy, King, pos)
}

/// Walks each ray outward; only the first piece on a ray counts.
fn attacked_along<P, I, F>(square: Coordinate, enemy: Color, directions: I, pos: &P, slides: F) -> bool
where
    P: Pos + ?Sized,
    I: Iterator<Item = Direction>,
    F: Fn(&PieceKind) -> bool,
{
    directions
        .filter_map(|direction| square.ray(direction).find_map(|sq| pos.contents(sq)))
        .any(|piece| piece.color() == enemy && slides(&piece.kind()))
}

fn any_enemy<P: Pos + ?Sized>(squares: Mask, enemy: Color, kind: PieceKind, pos: &P) -> bool {
    squares
        .iter()
        .any(|sq| pos.contents(sq).is_some_and(|piece| piece.is(enemy, kind)))
}
