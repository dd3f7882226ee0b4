use std::convert::TryFrom;

use awesome_error::Result;
use awesome_pool::Value;

/// Row window of a select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// `LIMIT ?`
    Count(u64),
    /// `LIMIT ?, ?` with (offset, count)
    Range(u64, u64),
}

impl Limit {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::Count(_) => "LIMIT ?",
            Self::Range(..) => "LIMIT ?, ?",
        }
    }

    /// Values bound to the limit placeholders, in placeholder order.
    /// Numbers above `i64::MAX` are rejected.
    pub fn params(&self) -> Result<Vec<Value>> {
        match *self {
            Self::Count(n) => Ok(vec![bound(n)?]),
            Self::Range(offset, count) => Ok(vec![bound(offset)?, bound(count)?]),
        }
    }
}

fn bound(n: u64) -> Result<Value> {
    i64::try_from(n)
        .map(Value::I64)
        .map_err(|_| awesome_error::argument!("Invalid limit value: {}", n))
}

impl From<u64> for Limit {
    fn from(n: u64) -> Self {
        Self::Count(n)
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Self::Range(offset, count)
    }
}

impl TryFrom<&[u64]> for Limit {
    type Error = awesome_error::Error;

    /// A one element slice is a count, two elements are (offset, count)
    fn try_from(v: &[u64]) -> std::result::Result<Self, Self::Error> {
        match *v {
            [n] => Ok(Self::Count(n)),
            [offset, count] => Ok(Self::Range(offset, count)),
            _ => Err(awesome_error::argument!("Invalid limit value: {:?}", v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice() {
        assert_eq!(Limit::try_from(&[5u64][..]).unwrap(), Limit::Count(5));
        assert_eq!(Limit::try_from(&[10u64, 5][..]).unwrap(), Limit::Range(10, 5));
        assert_eq!(
            Limit::Range(10, 5).params().unwrap(),
            vec![Value::I64(10), Value::I64(5)]
        );
    }

    #[test]
    fn too_large() {
        for limit in [Limit::Count(u64::MAX), Limit::Range(0, i64::MAX as u64 + 1)] {
            let err = limit.params().unwrap_err();
            assert!(matches!(err, awesome_error::Error::Argument(_)));
        }
        assert_eq!(
            Limit::Count(i64::MAX as u64).params().unwrap(),
            vec![Value::I64(i64::MAX)]
        );
    }

    #[test]
    fn bad_shapes() {
        for v in [&[][..], &[1u64, 2, 3][..]] {
            let err = Limit::try_from(v).unwrap_err();
            assert!(matches!(err, awesome_error::Error::Argument(_)));
        }
    }
}
