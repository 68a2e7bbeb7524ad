//! Tetromino kinds, shape templates and block skins

use rand::Rng;

/// The 7 tetromino kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I, // long bar
    O, // square
    J,
    L,
    Z,
    T,
    S,
}

impl TetrominoKind {
    /// All kinds, in template order
    pub fn all() -> [TetrominoKind; 7] {
        [
            TetrominoKind::I,
            TetrominoKind::O,
            TetrominoKind::J,
            TetrominoKind::L,
            TetrominoKind::Z,
            TetrominoKind::T,
            TetrominoKind::S,
        ]
    }

    /// Raw template cells as (x, y), y growing downward.
    ///
    /// Templates are not normalized to any pivot; `Piece::reset_position`
    /// aligns them at spawn.
    pub fn template(&self) -> [(i32, i32); 4] {
        match self {
            // I O
            // I
            // I
            // I
            TetrominoKind::I => [(0, 0), (0, 1), (0, 2), (0, 3)],
            TetrominoKind::O => [(0, 0), (0, 1), (1, 0), (1, 1)],
            // JJ     LL
            //  J     L.
            //  J     L.
            TetrominoKind::J => [(0, 0), (1, 0), (1, 1), (1, 2)],
            TetrominoKind::L => [(0, 0), (0, 1), (0, 2), (1, 0)],
            // ZZ.    .T.    .SS
            // .ZZ    TTT    SS.
            TetrominoKind::Z => [(0, 0), (1, 0), (1, 1), (2, 1)],
            TetrominoKind::T => [(0, 1), (1, 1), (1, 0), (2, 1)],
            TetrominoKind::S => [(0, 1), (1, 1), (1, 0), (2, 0)],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TetrominoKind::I => "I",
            TetrominoKind::O => "O",
            TetrominoKind::J => "J",
            TetrominoKind::L => "L",
            TetrominoKind::Z => "Z",
            TetrominoKind::T => "T",
            TetrominoKind::S => "S",
        }
    }
}

/// Block colors available to the colored skin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockColor {
    Blue,
    Green,
    Yellow,
    Red,
    Orange,
    LightBlue,
    Purple,
}

impl BlockColor {
    pub fn all() -> [BlockColor; 7] {
        [
            BlockColor::Blue,
            BlockColor::Green,
            BlockColor::Yellow,
            BlockColor::Red,
            BlockColor::Orange,
            BlockColor::LightBlue,
            BlockColor::Purple,
        ]
    }
}

/// Number of face tiles in the photo-block skin set
pub const FACE_COUNT: u8 = 7;

/// Opaque per-block appearance token stored in the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skin {
    Color(BlockColor),
    /// Photo block: index into the face tile set
    Face(u8),
}

/// How skins are assigned when a piece spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkinStyle {
    /// One random color shared by all four blocks
    #[default]
    Colored,
    /// Each block gets its own random face tile
    Photo,
}

impl SkinStyle {
    /// Pick the four block skins for a freshly spawned piece
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> [Skin; 4] {
        match self {
            SkinStyle::Colored => {
                let colors = BlockColor::all();
                [Skin::Color(colors[rng.gen_range(0..colors.len())]); 4]
            }
            SkinStyle::Photo => std::array::from_fn(|_| Skin::Face(rng.gen_range(0..FACE_COUNT))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_templates_have_distinct_cells() {
        for kind in TetrominoKind::all() {
            let cells: HashSet<_> = kind.template().into_iter().collect();
            assert_eq!(cells.len(), 4, "{} has overlapping cells", kind.name());
        }
    }

    #[test]
    fn test_templates_start_at_origin() {
        for kind in TetrominoKind::all() {
            let template = kind.template();
            assert_eq!(template.iter().map(|c| c.0).min(), Some(0));
            assert_eq!(template.iter().map(|c| c.1).min(), Some(0));
        }
    }

    #[test]
    fn test_colored_skin_is_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let skins = SkinStyle::Colored.pick(&mut rng);
            assert!(skins.iter().all(|s| *s == skins[0]));
            assert!(matches!(skins[0], Skin::Color(_)));
        }
    }

    #[test]
    fn test_photo_skin_uses_faces() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            for skin in SkinStyle::Photo.pick(&mut rng) {
                match skin {
                    Skin::Face(idx) => assert!(idx < FACE_COUNT),
                    other => panic!("unexpected skin {:?}", other),
                }
            }
        }
    }
}
