//! Level definitions: JSON loading, validation and board construction.
//!
//! ```json
//! {
//!   "id": 1, "name": "Tutorial", "rows": 8, "cols": 8, "moves": 10,
//!   "elements": ["smartphone", "energy", "sim", "message", "phone"],
//!   "goals": [{ "type": "phone", "count": 3 }, { "type": "box_full", "count": 2 }],
//!   "grid": [[{ "type": "energy" }, null, { "type": "box", "strength": 2 },
//!             { "type": "ice", "strength": 1, "content": { "type": "sim" } },
//!             { "type": "random" }, { "type": "discoball", "isHelper": true }]]
//! }
//! ```
//!
//! `null` cells are holes. An omitted or empty `grid` means every cell is
//! `random`. Random cells are drawn so the starting board has no ready-made
//! match; refills during play are not filtered. A starting board must also
//! offer at least one legal swap, so a deadlocked opening gets its free
//! element tiles re-typed in place until one appears.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell, Tile};
use crate::cascade::has_available_moves;
use crate::error::LevelError;
use crate::goals::{Goal, Goals};
use crate::rng::TileRng;
use crate::types::{Coord, ElementKind, GoalKind, HelperKind, MAX_BOARD_EDGE, MAX_RESHUFFLES};

const TUTORIAL_JSON: &str = include_str!("../levels/tutorial.json");

/// One authored grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Box<CellSpec>>,
    #[serde(
        default,
        rename = "helperType",
        alias = "helper",
        skip_serializing_if = "Option::is_none"
    )]
    pub helper: Option<String>,
    #[serde(default, rename = "isHelper", skip_serializing_if = "std::ops::Not::not")]
    pub is_helper: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u32,
}

/// A cell after name resolution, before randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Planned {
    Hole,
    Fixed(Cell),
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub rows: u8,
    pub cols: u8,
    pub moves: u32,
    pub elements: Vec<String>,
    pub goals: Vec<GoalSpec>,
    #[serde(default)]
    pub grid: Vec<Vec<Option<CellSpec>>>,
}

impl LevelDefinition {
    /// Parse and validate.
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        let level: LevelDefinition = serde_json::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    /// The bundled 8x8 tutorial level.
    pub fn tutorial() -> Result<Self, LevelError> {
        Self::from_json(TUTORIAL_JSON)
    }

    pub fn vocabulary(&self) -> usize {
        self.elements.len()
    }

    pub fn element_kind(&self, name: &str) -> Option<ElementKind> {
        self.elements
            .iter()
            .position(|e| e == name)
            .map(|i| ElementKind(i as u8))
    }

    pub fn element_name(&self, kind: ElementKind) -> &str {
        self.elements
            .get(kind.index())
            .map(String::as_str)
            .unwrap_or("?")
    }

    pub fn goal_name(&self, goal: GoalKind) -> &str {
        match goal {
            GoalKind::Element(kind) => self.element_name(kind),
            GoalKind::BoxCleared => "box_full",
        }
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.cols == 0 || self.rows == 0 || self.cols > MAX_BOARD_EDGE || self.rows > MAX_BOARD_EDGE {
            return Err(LevelError::Dimensions {
                cols: self.cols,
                rows: self.rows,
                max: MAX_BOARD_EDGE,
            });
        }
        if self.elements.len() < 3 || self.elements.len() > u8::MAX as usize {
            return Err(LevelError::Vocabulary(self.elements.len()));
        }
        if self.moves == 0 {
            return Err(LevelError::NoMoves);
        }
        self.goal_list()?;
        self.plan()?;
        Ok(())
    }

    /// Goals with their full targets.
    pub fn goal_list(&self) -> Result<Goals, LevelError> {
        self.goals
            .iter()
            .map(|g| {
                let kind = if g.kind == "box_full" {
                    GoalKind::BoxCleared
                } else {
                    self.element_kind(&g.kind)
                        .map(GoalKind::Element)
                        .ok_or_else(|| LevelError::UnknownGoal(g.kind.clone()))?
                };
                Ok(Goal::new(kind, g.count))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Goals::new)
    }

    fn plan(&self) -> Result<Vec<Planned>, LevelError> {
        let total = self.cols as usize * self.rows as usize;
        if self.grid.is_empty() {
            return Ok(vec![Planned::Random; total]);
        }
        if self.grid.len() != self.rows as usize {
            return Err(LevelError::RowCount {
                expected: self.rows,
                found: self.grid.len(),
            });
        }

        let mut out = Vec::with_capacity(total);
        for (row, cells) in self.grid.iter().enumerate() {
            if cells.len() != self.cols as usize {
                return Err(LevelError::RowWidth {
                    row,
                    expected: self.cols,
                    found: cells.len(),
                });
            }
            for (col, spec) in cells.iter().enumerate() {
                out.push(match spec {
                    None => Planned::Hole,
                    Some(spec) => self.resolve(spec, col, row)?,
                });
            }
        }
        Ok(out)
    }

    fn resolve(&self, spec: &CellSpec, col: usize, row: usize) -> Result<Planned, LevelError> {
        let strength = |obstacle: &'static str| -> Result<u8, LevelError> {
            match spec.strength.unwrap_or(1) {
                s @ 1..=2 => Ok(s),
                s => Err(LevelError::Strength {
                    obstacle,
                    strength: s,
                }),
            }
        };

        match spec.kind.as_str() {
            "random" => Ok(Planned::Random),
            "box" => Ok(Planned::Fixed(Cell::Box {
                strength: strength("box")?,
            })),
            "ice" => {
                let strength = strength("ice")?;
                let inner = spec
                    .content
                    .as_deref()
                    .ok_or(LevelError::IceWithoutContent { col, row })?;
                let kind = self
                    .element_kind(&inner.kind)
                    .ok_or_else(|| LevelError::UnknownElement(inner.kind.clone()))?;
                Ok(Planned::Fixed(Cell::Tile(Tile::iced(kind, strength))))
            }
            "helper" => {
                let name = spec.helper.as_deref().unwrap_or_default();
                let helper = HelperKind::from_str(name)
                    .ok_or_else(|| LevelError::UnknownHelper(name.to_string()))?;
                Ok(Planned::Fixed(Cell::Tile(Tile::helper(helper))))
            }
            name => {
                if let Some(kind) = self.element_kind(name) {
                    return Ok(Planned::Fixed(Cell::Tile(Tile::element(kind))));
                }
                let helper_name = spec.helper.as_deref().unwrap_or(name);
                match HelperKind::from_str(helper_name) {
                    Some(helper) => Ok(Planned::Fixed(Cell::Tile(Tile::helper(helper)))),
                    None if spec.is_helper => Err(LevelError::UnknownHelper(helper_name.to_string())),
                    None => Err(LevelError::UnknownCell(name.to_string())),
                }
            }
        }
    }

    /// Build the starting board.
    pub fn build_board(&self, rng: &mut dyn TileRng) -> Result<Board, LevelError> {
        let plan = self.plan()?;
        let mut board = Board::new(self.cols, self.rows);
        let vocabulary = self.vocabulary();

        for (i, planned) in plan.into_iter().enumerate() {
            let at = Coord::new(
                (i % self.cols as usize) as i8,
                (i / self.cols as usize) as i8,
            );
            match planned {
                Planned::Hole => board.make_hole(at),
                Planned::Fixed(cell) => board.set(at, cell),
                Planned::Random => {
                    let kind = draw_without_run(&board, at, vocabulary, rng);
                    board.set(at, Cell::Tile(Tile::element(kind)));
                }
            }
        }
        Ok(board)
    }

    /// Build the starting board and make sure it has a legal swap.
    ///
    /// A deadlocked layout has every free element tile re-drawn in place,
    /// up to `MAX_RESHUFFLES` times. Holes, boxes, ice and helpers keep
    /// their cells, and the re-drawn board still has no ready-made match.
    pub fn build_playable_board(&self, rng: &mut dyn TileRng) -> Result<Board, LevelError> {
        let mut board = self.build_board(rng)?;
        let mut attempts = 0;
        while !has_available_moves(&board) {
            if attempts == MAX_RESHUFFLES {
                return Err(LevelError::Unplayable(MAX_RESHUFFLES));
            }
            attempts += 1;
            redraw_free_tiles(&mut board, self.vocabulary(), rng);
        }
        if attempts > 0 {
            tracing::debug!(level = self.id, attempts, "redrew a deadlocked opening");
        }
        Ok(board)
    }
}

/// A random kind that does not finish a run with already-placed cells.
fn draw_without_run(board: &Board, at: Coord, vocabulary: usize, rng: &mut dyn TileRng) -> ElementKind {
    let first = rng.pick(vocabulary);
    (0..vocabulary)
        .map(|step| ElementKind(((first + step) % vocabulary) as u8))
        .find(|k| !completes_run(board, at, *k))
        .unwrap_or(ElementKind(first as u8))
}

/// Re-type every free element tile in row-major order.
fn redraw_free_tiles(board: &mut Board, vocabulary: usize, rng: &mut dyn TileRng) {
    let free: Vec<Coord> = board
        .coords()
        .filter(|at| board.get(*at).matchable_kind().is_some())
        .collect();
    for &at in &free {
        board.set(at, Cell::Empty);
    }
    for at in free {
        let kind = draw_without_run(board, at, vocabulary, rng);
        board.set(at, Cell::Tile(Tile::element(kind)));
    }
}

/// Would placing `kind` at `at` finish a run of three with the two cells to
/// its left or the two above? Only already-placed cells are considered.
fn completes_run(board: &Board, at: Coord, kind: ElementKind) -> bool {
    let same = |c: Coord| board.try_get(c).and_then(|cell| cell.matchable_kind()) == Some(kind);
    (same(at.offset(-1, 0)) && same(at.offset(-2, 0))) || (same(at.offset(0, -1)) && same(at.offset(0, -2)))
}
