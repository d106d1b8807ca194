use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect {
        client_version: u32,
    },
    ChangeDirection {
        dx: i32,
        dy: i32,
    },
    Restart,
    Disconnect,

    Connected {
        session_id: u32,
    },
    State(RawSnapshot),
    Disconnected {
        reason: String,
    },
}

/// Coordinate list as the server may encode it.
///
/// Servers may emit tuples, nested lists or flat arrays interchangeably;
/// all three normalize to the same cell sequence.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Coords {
    Pairs(Vec<(i32, i32)>),
    Nested(Vec<Vec<i32>>),
    Flat(Vec<i32>),
}

impl Coords {
    pub fn into_cells(self) -> Vec<Cell> {
        match self {
            Coords::Pairs(pairs) => pairs.into_iter().map(|(x, y)| Cell::new(x, y)).collect(),
            Coords::Nested(rows) => rows
                .into_iter()
                .filter(|row| row.len() >= 2)
                .map(|row| Cell::new(row[0], row[1]))
                .collect(),
            Coords::Flat(values) => values
                .chunks_exact(2)
                .map(|pair| Cell::new(pair[0], pair[1]))
                .collect(),
        }
    }
}

/// Game state exactly as pushed by the server, before normalization.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawSnapshot {
    pub w: u32,
    pub h: u32,
    pub snake: Option<Coords>,
    pub food: Option<Coords>,
    pub score: Option<u32>,
    pub alive: bool,
    pub speed: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Normalized, strictly-typed game state. Replaced wholesale on every message.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub w: u32,
    pub h: u32,
    /// Head first.
    pub snake: Vec<Cell>,
    pub food: Option<Cell>,
    pub score: u32,
    pub alive: bool,
    pub speed: Option<f32>,
}

impl From<RawSnapshot> for Snapshot {
    fn from(raw: RawSnapshot) -> Self {
        let snake = raw.snake.map(Coords::into_cells).unwrap_or_default();
        let food = raw
            .food
            .and_then(|coords| coords.into_cells().into_iter().next());

        Snapshot {
            w: raw.w.max(1),
            h: raw.h.max(1),
            snake,
            food,
            score: raw.score.unwrap_or(0),
            alive: raw.alive,
            speed: raw.speed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn to_packet(self) -> Packet {
        let (dx, dy) = self.vector();
        Packet::ChangeDirection { dx, dy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn raw(snake: Option<Coords>, food: Option<Coords>) -> RawSnapshot {
        RawSnapshot {
            w: 30,
            h: 20,
            snake,
            food,
            score: Some(3),
            alive: true,
            speed: Some(0.12),
        }
    }

    #[test]
    fn test_direction_vectors() {
        assert_eq!(Direction::Up.vector(), (0, -1));
        assert_eq!(Direction::Down.vector(), (0, 1));
        assert_eq!(Direction::Left.vector(), (-1, 0));
        assert_eq!(Direction::Right.vector(), (1, 0));
    }

    #[test]
    fn test_direction_to_packet() {
        match Direction::Left.to_packet() {
            Packet::ChangeDirection { dx, dy } => {
                assert_eq!(dx, -1);
                assert_eq!(dy, 0);
            }
            _ => panic!("Wrong packet type for direction"),
        }
    }

    #[test]
    fn test_normalize_pairs() {
        let snapshot = Snapshot::from(raw(
            Some(Coords::Pairs(vec![(15, 10), (14, 10), (13, 10)])),
            Some(Coords::Pairs(vec![(3, 4)])),
        ));
        assert_eq!(snapshot.snake.len(), 3);
        assert_eq!(snapshot.snake.first(), Some(&Cell::new(15, 10)));
        assert_eq!(snapshot.food, Some(Cell::new(3, 4)));
        assert_eq!(snapshot.score, 3);
        assert_approx_eq!(snapshot.speed.unwrap(), 0.12, 1e-6);
    }

    #[test]
    fn test_normalize_nested_skips_short_rows() {
        let snapshot = Snapshot::from(raw(
            Some(Coords::Nested(vec![vec![1, 2], vec![7], vec![3, 4, 99]])),
            Some(Coords::Nested(vec![vec![5, 6]])),
        ));
        assert_eq!(snapshot.snake, vec![Cell::new(1, 2), Cell::new(3, 4)]);
        assert_eq!(snapshot.food, Some(Cell::new(5, 6)));
    }

    #[test]
    fn test_normalize_flat_drops_dangling_value() {
        let snapshot = Snapshot::from(raw(
            Some(Coords::Flat(vec![1, 1, 2, 1, 9])),
            Some(Coords::Flat(vec![8, 8])),
        ));
        assert_eq!(snapshot.snake, vec![Cell::new(1, 1), Cell::new(2, 1)]);
        assert_eq!(snapshot.food, Some(Cell::new(8, 8)));
    }

    #[test]
    fn test_normalize_missing_fields() {
        let snapshot = Snapshot::from(RawSnapshot {
            w: 0,
            h: 0,
            snake: None,
            food: Some(Coords::Flat(vec![])),
            score: None,
            alive: false,
            speed: None,
        });
        assert_eq!(snapshot.w, 1);
        assert_eq!(snapshot.h, 1);
        assert!(snapshot.snake.is_empty());
        assert_eq!(snapshot.food, None);
        assert_eq!(snapshot.score, 0);
        assert!(!snapshot.alive);
    }

    #[test]
    fn test_packet_serialization_connect() {
        let packet = Packet::Connect { client_version: 42 };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Connect { client_version } => assert_eq!(client_version, 42),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_state() {
        let snapshot = raw(
            Some(Coords::Flat(vec![4, 4, 3, 4])),
            Some(Coords::Pairs(vec![(9, 9)])),
        );
        let packet = Packet::State(snapshot.clone());

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::State(received) => assert_eq!(received, snapshot),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }
}
