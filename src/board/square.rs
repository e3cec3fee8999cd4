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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::successors;
use std::ops::{Add, BitAnd, BitOr, BitOrAssign, Sub};
use std::ops::{Index, IndexMut};
use strum_macros::EnumIter;

pub const BOARD_SIZE: i8 = 8;

/// A square on the board addressed by file (column) and rank (row).
///
/// Both components are zero-based: `(0, 0)` is White's queen-side rook
/// square and `(7, 7)` is Black's king-side rook square. A coordinate may
/// be built off the board (callers can hand us anything), but only
/// in-bounds coordinates index into a board or a `Mask`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    file: i8,
    rank: i8,
}

impl Coordinate {
    #[inline]
    pub const fn new(file: i8, rank: i8) -> Self {
        Self { file, rank }
    }

    #[inline]
    pub const fn try_new(file: i8, rank: i8) -> Option<Self> {
        let coordinate = Self::new(file, rank);
        if coordinate.in_bounds() {
            Some(coordinate)
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        debug_assert!(index < 64);
        Self::new((index % 8) as i8, (index / 8) as i8)
    }

    pub fn iter() -> impl Iterator<Item = Coordinate> {
        (0..64).map(Self::from_index)
    }

    #[inline]
    pub const fn file(&self) -> i8 {
        self.file
    }
    #[inline]
    pub const fn rank(&self) -> i8 {
        self.rank
    }
    #[inline]
    pub const fn in_bounds(&self) -> bool {
        self.file >= 0 && self.file < BOARD_SIZE && self.rank >= 0 && self.rank < BOARD_SIZE
    }
    #[inline]
    pub const fn to_index(&self) -> usize {
        debug_assert!(self.in_bounds());
        (self.rank * BOARD_SIZE + self.file) as usize
    }
    #[inline]
    pub const fn to_mask(&self) -> Mask {
        Mask::new(1u64 << self.to_index())
    }

    /// Squares from here toward the edge of the board in `direction`,
    /// nearest first. The starting square is not included.
    pub fn ray(self, direction: Direction) -> impl Iterator<Item = Coordinate> {
        successors(self + direction, move |&square| square + direction)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.file, self.rank)
    }
}

impl From<Coordinate> for usize {
    fn from(value: Coordinate) -> Self {
        value.to_index()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i8,
    pub y: i8,
}

impl Offset {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Reduces a straight or exactly diagonal offset to a single step.
    /// Any other offset (including zero) has no unit.
    pub fn to_unit(self) -> Option<Self> {
        let (x, y) = match (self.x, self.y) {
            (0, 0) => return None,
            (x, y) if x == 0 || y == 0 || x.abs() == y.abs() => (x.signum(), y.signum()),
            _ => return None,
        };
        Some(Self { x, y })
    }
}

impl Add<Offset> for Coordinate {
    type Output = Option<Coordinate>;
    fn add(self, rhs: Offset) -> Self::Output {
        Coordinate::try_new(self.file + rhs.x, self.rank + rhs.y)
    }
}

impl Add<&Offset> for Coordinate {
    type Output = Option<Coordinate>;
    fn add(self, rhs: &Offset) -> Self::Output {
        self + *rhs
    }
}

impl Sub for Coordinate {
    type Output = Offset;
    fn sub(self, rhs: Self) -> Self::Output {
        Offset::new(self.file - rhs.file, self.rank - rhs.rank)
    }
}

impl Index<Coordinate> for [Mask; 64] {
    type Output = Mask;
    fn index(&self, square: Coordinate) -> &Self::Output {
        &self[square.to_index()]
    }
}

impl IndexMut<Coordinate> for [Mask; 64] {
    fn index_mut(&mut self, square: Coordinate) -> &mut Self::Output {
        &mut self[square.to_index()]
    }
}

/// Compass directions as seen from White's side of the board: `Up` walks
/// toward rank 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    UpLeft,
    Up,
    UpRight,
    Left,
    Right,
    DownLeft,
    Down,
    DownRight,
}

use Direction::{Down, DownLeft, DownRight, Left, Right, Up, UpLeft, UpRight};

impl Direction {
    pub fn orthogonals() -> impl Iterator<Item = Self> {
        [Up, Left, Right, Down].into_iter()
    }
    pub fn diagonals() -> impl Iterator<Item = Self> {
        [UpLeft, UpRight, DownLeft, DownRight].into_iter()
    }
}

impl From<Direction> for Offset {
    fn from(value: Direction) -> Self {
        match value {
            UpLeft => Self::new(-1, 1),
            Up => Self::new(0, 1),
            UpRight => Self::new(1, 1),
            Left => Self::new(-1, 0),
            Right => Self::new(1, 0),
            DownLeft => Self::new(-1, -1),
            Down => Self::new(0, -1),
            DownRight => Self::new(1, -1),
        }
    }
}

impl Add<Direction> for Coordinate {
    type Output = Option<Coordinate>;
    fn add(self, rhs: Direction) -> Self::Output {
        let offset: Offset = rhs.into();
        self + offset
    }
}

/// A set of squares, one bit per square (bit `rank * 8 + file`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask(u64);

impl Mask {
    #[inline]
    pub const fn new(val: u64) -> Self {
        Self(val)
    }

    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_squares<I>(squares: I) -> Self
    where
        I: IntoIterator<Item = Coordinate>,
    {
        squares
            .into_iter()
            .fold(Self::empty(), |mask, square| mask | square)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Off-board coordinates are never members.
    #[inline]
    pub const fn contains(&self, square: Coordinate) -> bool {
        square.in_bounds() && (self.0 & square.to_mask().0) != 0
    }

    pub fn iter(&self) -> MaskIter {
        MaskIter(self.0)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..BOARD_SIZE).rev() {
            for file in 0..BOARD_SIZE {
                let square = Coordinate::new(file, rank);
                write!(f, "{}", if self.contains(square) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Sub for Mask {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 & !rhs.0)
    }
}

impl BitOr for Mask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitOr<Coordinate> for Mask {
    type Output = Self;
    fn bitor(self, rhs: Coordinate) -> Self {
        Self(self.0 | rhs.to_mask().0)
    }
}

impl BitOrAssign<Coordinate> for Mask {
    fn bitor_assign(&mut self, rhs: Coordinate) {
        self.0 |= rhs.to_mask().0;
    }
}

impl BitAnd for Mask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskIter(u64);

impl Iterator for MaskIter {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(Coordinate::from_index(index))
    }
}

impl DoubleEndedIterator for MaskIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let index = 63 - self.0.leading_zeros() as usize;
        self.0 &= !(1u64 << index);
        Some(Coordinate::from_index(index))
    }
}
