use std::fmt::Display;

/// The thirteen NBT tag kinds, in their on-the-wire numeric order.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Kind {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl Kind {
    /// Converts a wire byte into a `Kind`, rejecting anything outside `0..=12`.
    pub fn from_u8(value: u8) -> Option<Kind> {
        Some(match value {
            0 => Kind::End,
            1 => Kind::Byte,
            2 => Kind::Short,
            3 => Kind::Int,
            4 => Kind::Long,
            5 => Kind::Float,
            6 => Kind::Double,
            7 => Kind::ByteArray,
            8 => Kind::String,
            9 => Kind::List,
            10 => Kind::Compound,
            11 => Kind::IntArray,
            12 => Kind::LongArray,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}", self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_valid_ids() {
        for id in 0..=12u8 {
            assert_eq!(Kind::from_u8(id).unwrap().as_u8(), id);
        }
    }

    #[test]
    fn rejects_out_of_range_ids() {
        assert!(Kind::from_u8(13).is_none());
        assert!(Kind::from_u8(255).is_none());
    }
}
